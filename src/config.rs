use anyhow::Result;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use crate::sensing::{PermissionState, SensingBackendConfig, SensingSource};

#[derive(Debug, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub sensing: SensingConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
    pub http: HttpConfig,
}

#[derive(Debug, Deserialize)]
pub struct HttpConfig {
    pub bind: String,
    pub port: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Replay,
    Idle,
}

#[derive(Debug, Deserialize)]
pub struct SensingConfig {
    pub source: SourceKind,
    #[serde(default)]
    pub replay_path: Option<String>,
    pub batch_interval_ms: u64,
    /// Answer given to the camera permission query
    #[serde(default)]
    pub camera_permission: PermissionState,
}

#[derive(Debug, Deserialize)]
pub struct StorageConfig {
    pub persist_stats: bool,
    pub stats_path: String,
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}

impl SensingConfig {
    pub fn source(&self) -> Result<SensingSource> {
        match self.source {
            SourceKind::Replay => {
                let Some(path) = &self.replay_path else {
                    anyhow::bail!("sensing.replay_path is required for the replay source");
                };
                Ok(SensingSource::Replay(expand_path(path)))
            }
            SourceKind::Idle => Ok(SensingSource::Idle),
        }
    }

    pub fn backend_config(&self) -> SensingBackendConfig {
        SensingBackendConfig {
            batch_interval: Duration::from_millis(self.batch_interval_ms),
            ..SensingBackendConfig::default()
        }
    }
}

impl StorageConfig {
    pub fn stats_path(&self) -> PathBuf {
        expand_path(&self.stats_path)
    }
}

fn expand_path(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).into_owned())
}
