use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use super::stats::{AccumulatedStats, StatsAccumulator};
use crate::sensing::{MetricsBatch, PermissionState, SensingBackend};

/// Errors surfaced by session control
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("Camera permission denied; enable camera access to start monitoring")]
    PermissionDenied,
}

/// Whether vitals monitoring is on
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    #[default]
    Disabled,
    Enabled,
}

/// Callback invoked with the new stats whenever they change
pub type StatsObserver = Box<dyn FnMut(&AccumulatedStats) + Send>;

/// Point-in-time view of a monitoring session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSnapshot {
    /// Identifier of the current or last session
    pub session_id: Option<String>,

    pub state: SessionState,

    pub permission: PermissionState,

    pub stats: AccumulatedStats,

    /// Number of samples collected in the current or last session
    pub sample_count: usize,

    /// When the current or last session started
    pub started_at: Option<DateTime<Utc>>,

    /// Seconds since `started_at`
    pub duration_secs: f64,

    /// Status text from the sensing backend
    pub status_hint: String,

    /// Summary cached from an earlier run, if any
    pub previous: Option<AccumulatedStats>,
}

/// Monitoring session state machine
///
/// Gates metric batches on the session state, gates starts on the camera
/// permission, and drives the sensing backend lifecycle. Not designed for
/// concurrent use; wrap it in a single mutex or own it from one task.
pub struct SessionController {
    sensing: Box<dyn SensingBackend>,
    accumulator: StatsAccumulator,
    state: SessionState,
    permission: PermissionState,
    observers: Vec<StatsObserver>,
    session_id: Option<String>,
    started_at: Option<DateTime<Utc>>,
}

impl SessionController {
    pub fn new(sensing: Box<dyn SensingBackend>) -> Self {
        Self {
            sensing,
            accumulator: StatsAccumulator::new(),
            state: SessionState::Disabled,
            permission: PermissionState::Unknown,
            observers: Vec::new(),
            session_id: None,
            started_at: None,
        }
    }

    /// Start monitoring
    ///
    /// Rejected while the camera permission is denied. Starting an enabled
    /// session is a no-op and keeps the collected samples.
    pub fn request_start(&mut self) -> Result<(), SessionError> {
        if self.permission == PermissionState::Denied {
            warn!("Start rejected: camera permission denied");
            return Err(SessionError::PermissionDenied);
        }

        if self.state == SessionState::Enabled {
            warn!("Monitoring already started");
            return Ok(());
        }

        let session_id = format!("session-{}", uuid::Uuid::new_v4());
        info!("Starting vitals monitoring: {}", session_id);

        self.state = SessionState::Enabled;
        self.session_id = Some(session_id);
        self.started_at = Some(Utc::now());
        self.update_stats(|acc| {
            acc.reset();
            acc.stats()
        });

        if let Err(e) = self.sensing.start_processing() {
            error!("Failed to start processing on {}: {}", self.sensing.name(), e);
        }
        if let Err(e) = self.sensing.start_recording() {
            error!("Failed to start recording on {}: {}", self.sensing.name(), e);
        }

        Ok(())
    }

    /// Stop monitoring and return the final stats
    pub fn request_stop(&mut self) -> AccumulatedStats {
        if self.state == SessionState::Disabled {
            debug!("Monitoring not active");
            return self.accumulator.stats();
        }

        info!(
            "Stopping vitals monitoring: {}",
            self.session_id.as_deref().unwrap_or("-")
        );

        self.state = SessionState::Disabled;

        if let Err(e) = self.sensing.stop_processing() {
            error!("Failed to stop processing on {}: {}", self.sensing.name(), e);
        }
        if let Err(e) = self.sensing.stop_recording() {
            error!("Failed to stop recording on {}: {}", self.sensing.name(), e);
        }

        let stats = self.update_stats(StatsAccumulator::finalize);

        info!(
            "Session summary: min={} max={} avg={} bpm over {} samples",
            stats.min,
            stats.max,
            stats.average,
            self.accumulator.sample_count()
        );

        stats
    }

    /// Handle a batch from the metrics feed
    ///
    /// Returns `None` when the batch was discarded because monitoring is off.
    pub fn on_metrics_event(&mut self, batch: &MetricsBatch) -> Option<AccumulatedStats> {
        if self.state != SessionState::Enabled {
            debug!("Discarding metrics batch: monitoring disabled");
            return None;
        }

        if !batch.is_initialized {
            debug!("Ignoring uninitialized metrics batch");
        }

        Some(self.update_stats(|acc| acc.ingest(batch)))
    }

    /// Record the result of the camera permission query
    ///
    /// A denial does not stop a running session; it only blocks the next start.
    pub fn set_permission_state(&mut self, state: PermissionState) {
        info!("Camera permission: {:?}", state);

        if state == PermissionState::Denied && self.state == SessionState::Enabled {
            warn!("Camera permission denied while monitoring; session left running");
        }

        self.permission = state;
    }

    /// Register a stats observer
    pub fn subscribe(&mut self, observer: impl FnMut(&AccumulatedStats) + Send + 'static) {
        self.observers.push(Box::new(observer));
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_enabled(&self) -> bool {
        self.state == SessionState::Enabled
    }

    pub fn permission_state(&self) -> PermissionState {
        self.permission
    }

    pub fn stats(&self) -> AccumulatedStats {
        self.accumulator.stats()
    }

    pub fn sample_count(&self) -> usize {
        self.accumulator.sample_count()
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    pub fn status_hint(&self) -> String {
        self.sensing.status_hint()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let duration_secs = self
            .started_at
            .map(|t| Utc::now().signed_duration_since(t).num_milliseconds() as f64 / 1000.0)
            .unwrap_or(0.0);

        SessionSnapshot {
            session_id: self.session_id.clone(),
            state: self.state,
            permission: self.permission,
            stats: self.accumulator.stats(),
            sample_count: self.accumulator.sample_count(),
            started_at: self.started_at,
            duration_secs,
            status_hint: self.sensing.status_hint(),
            previous: None,
        }
    }

    /// Apply `f` to the accumulator and notify observers if the stats changed
    fn update_stats(
        &mut self,
        f: impl FnOnce(&mut StatsAccumulator) -> AccumulatedStats,
    ) -> AccumulatedStats {
        let before = self.accumulator.stats();
        let after = f(&mut self.accumulator);

        if after != before {
            for observer in self.observers.iter_mut() {
                observer(&after);
            }
        }

        after
    }
}
