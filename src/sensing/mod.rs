//! Sensing collaborator boundary
//!
//! The vitals SDK is opaque: it accepts lifecycle calls and emits batches of
//! computed pulse-rate samples. This module defines that seam:
//! - `MetricsBatch`, the unit delivered on the feed
//! - `SensingBackend`, the lifecycle + feed contract
//! - `PermissionQuery`, the one-shot camera permission lookup
//! - `ReplayBackend`, which plays back a recorded session

pub mod backend;
pub mod batch;
pub mod permission;
pub mod replay;

pub use backend::{IdleBackend, SensingBackend, SensingBackendConfig, SensingBackendFactory, SensingSource};
pub use batch::MetricsBatch;
pub use permission::{PermissionQuery, PermissionState, StaticPermission};
pub use replay::ReplayBackend;
