use serde::{Deserialize, Serialize};

/// Camera permission as reported by the platform
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionState {
    /// Not yet queried, or the user has not answered the prompt
    #[default]
    Unknown,
    Granted,
    Denied,
}

/// One-shot camera permission lookup
///
/// Platform implementations typically show a prompt on first use and resolve
/// once the user answers.
#[async_trait::async_trait]
pub trait PermissionQuery: Send + Sync {
    async fn query(&self) -> PermissionState;
}

/// Permission query that always answers with a fixed state
///
/// Used where the permission is decided out-of-band (config, tests).
#[derive(Debug, Clone, Copy)]
pub struct StaticPermission(pub PermissionState);

#[async_trait::async_trait]
impl PermissionQuery for StaticPermission {
    async fn query(&self) -> PermissionState {
        self.0
    }
}
