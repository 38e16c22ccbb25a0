use super::handlers;
use super::state::AppState;
use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::trace::TraceLayer;

/// Create the HTTP router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Monitoring control
        .route("/vitals/start", post(handlers::start_monitoring))
        .route("/vitals/stop", post(handlers::stop_monitoring))
        // Session queries and inputs
        .route("/vitals/status", get(handlers::get_status))
        .route("/vitals/metrics", post(handlers::push_metrics))
        .route("/vitals/permission", put(handlers::set_permission))
        // Add tracing middleware for request logging
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
