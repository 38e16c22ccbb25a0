//! HTTP API server for controlling vitals monitoring
//!
//! This module provides a REST API around the monitoring session:
//! - POST /vitals/start - Start monitoring
//! - POST /vitals/stop - Stop monitoring and return the summary
//! - GET /vitals/status - Query session state and stats
//! - POST /vitals/metrics - Push a metrics batch
//! - PUT /vitals/permission - Update the camera permission
//! - GET /health - Health check

mod handlers;
mod routes;
mod state;

pub use routes::create_router;
pub use state::AppState;
