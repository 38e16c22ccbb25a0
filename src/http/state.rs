use crate::session::MonitoringService;
use std::sync::Arc;

/// Shared application state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// The monitoring session controlled by this server
    pub service: Arc<MonitoringService>,
}

impl AppState {
    pub fn new(service: Arc<MonitoringService>) -> Self {
        Self { service }
    }
}
