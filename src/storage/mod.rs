//! Best-effort cache of the last session summary
//!
//! Stored as a small JSON key-value file so a restarted monitor can show the
//! previous session's pulse-rate summary before a new one begins.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::session::AccumulatedStats;

/// On-disk layout, keyed by fixed names
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CachedStats {
    #[serde(default)]
    has_stats: bool,
    #[serde(default)]
    min_pulse_rate: i64,
    #[serde(default)]
    max_pulse_rate: i64,
    #[serde(default)]
    average_pulse_rate: i64,
}

/// File-backed session summary cache
#[derive(Debug, Clone)]
pub struct StatsStore {
    path: PathBuf,
}

impl StatsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the cached summary
    ///
    /// Returns `None` when nothing has been cached yet.
    pub fn load(&self) -> Result<Option<AccumulatedStats>> {
        if !self.path.exists() {
            debug!("No cached stats at {}", self.path.display());
            return Ok(None);
        }

        let contents = fs::read_to_string(&self.path).context("Failed to read stats cache")?;
        let cached: CachedStats =
            serde_json::from_str(&contents).context("Failed to parse stats cache")?;

        if !cached.has_stats {
            return Ok(None);
        }

        Ok(Some(AccumulatedStats {
            min: cached.min_pulse_rate,
            max: cached.max_pulse_rate,
            average: cached.average_pulse_rate,
        }))
    }

    /// Overwrite the cache with a new summary
    pub fn save(&self, stats: &AccumulatedStats) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).context("Failed to create stats cache directory")?;
        }

        let cached = CachedStats {
            has_stats: true,
            min_pulse_rate: stats.min,
            max_pulse_rate: stats.max,
            average_pulse_rate: stats.average,
        };

        let json = serde_json::to_string_pretty(&cached)?;
        fs::write(&self.path, json).context("Failed to write stats cache")?;

        info!("Cached session stats to {}", self.path.display());
        Ok(())
    }
}
