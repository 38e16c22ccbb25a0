pub mod config;
pub mod http;
pub mod sensing;
pub mod session;
pub mod storage;

pub use config::Config;
pub use http::{create_router, AppState};
pub use sensing::{
    IdleBackend, MetricsBatch, PermissionQuery, PermissionState, ReplayBackend, SensingBackend,
    SensingBackendConfig, SensingBackendFactory, SensingSource, StaticPermission,
};
pub use session::{
    AccumulatedStats, MonitoringService, SessionController, SessionError, SessionSnapshot,
    SessionState, StatsAccumulator,
};
pub use storage::StatsStore;
