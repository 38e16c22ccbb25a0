use anyhow::{Context, Result};
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::info;

use super::batch::MetricsBatch;
use super::replay::ReplayBackend;

/// Configuration for a sensing backend
#[derive(Debug, Clone)]
pub struct SensingBackendConfig {
    /// Delay between consecutive batches on the feed
    pub batch_interval: Duration,
    /// Capacity of the metrics feed channel
    pub feed_capacity: usize,
}

impl Default for SensingBackendConfig {
    fn default() -> Self {
        Self {
            batch_interval: Duration::from_millis(500),
            feed_capacity: 100,
        }
    }
}

/// Vitals sensing collaborator
///
/// Wraps the opaque SDK that turns camera frames into pulse-rate metrics.
/// Lifecycle calls only signal the SDK; they never block.
pub trait SensingBackend: Send {
    /// Take the metrics feed
    ///
    /// Batches arrive on the returned receiver while processing is active.
    /// The feed can only be taken once.
    fn subscribe(&mut self) -> Result<mpsc::Receiver<MetricsBatch>>;

    /// Begin camera capture and metric extraction
    fn start_processing(&mut self) -> Result<()>;

    /// Stop camera capture and metric extraction
    fn stop_processing(&mut self) -> Result<()>;

    /// Begin recording the measurement
    fn start_recording(&mut self) -> Result<()>;

    /// Stop recording the measurement
    fn stop_recording(&mut self) -> Result<()>;

    /// Check if the backend is currently processing
    fn is_processing(&self) -> bool;

    /// Human-readable status for display
    fn status_hint(&self) -> String {
        String::new()
    }

    /// Get backend name for logging
    fn name(&self) -> &str;
}

/// Where metric batches come from
#[derive(Debug, Clone)]
pub enum SensingSource {
    /// Play back a JSON-lines recording of batches
    Replay(PathBuf),
    /// Never emit; batches are pushed in by the caller
    Idle,
}

/// Sensing backend factory
pub struct SensingBackendFactory;

impl SensingBackendFactory {
    pub fn create(
        source: SensingSource,
        config: SensingBackendConfig,
    ) -> Result<Box<dyn SensingBackend>> {
        match source {
            SensingSource::Replay(path) => {
                let backend = ReplayBackend::open(&path, config)
                    .with_context(|| format!("Failed to open replay {}", path.display()))?;
                Ok(Box::new(backend))
            }
            SensingSource::Idle => Ok(Box::new(IdleBackend::new(config))),
        }
    }
}

/// Backend without a camera: tracks lifecycle flags and keeps the feed open
pub struct IdleBackend {
    config: SensingBackendConfig,
    feed_tx: Option<mpsc::Sender<MetricsBatch>>,
    processing: bool,
    recording: bool,
}

impl IdleBackend {
    pub fn new(config: SensingBackendConfig) -> Self {
        Self {
            config,
            feed_tx: None,
            processing: false,
            recording: false,
        }
    }

    pub fn is_recording(&self) -> bool {
        self.recording
    }
}

impl SensingBackend for IdleBackend {
    fn subscribe(&mut self) -> Result<mpsc::Receiver<MetricsBatch>> {
        if self.feed_tx.is_some() {
            anyhow::bail!("Metrics feed already taken");
        }

        let (tx, rx) = mpsc::channel(self.config.feed_capacity);
        // Held so the feed stays open for the lifetime of the backend
        self.feed_tx = Some(tx);
        Ok(rx)
    }

    fn start_processing(&mut self) -> Result<()> {
        info!("Idle backend: processing started");
        self.processing = true;
        Ok(())
    }

    fn stop_processing(&mut self) -> Result<()> {
        info!("Idle backend: processing stopped");
        self.processing = false;
        Ok(())
    }

    fn start_recording(&mut self) -> Result<()> {
        self.recording = true;
        Ok(())
    }

    fn stop_recording(&mut self) -> Result<()> {
        self.recording = false;
        Ok(())
    }

    fn is_processing(&self) -> bool {
        self.processing
    }

    fn status_hint(&self) -> String {
        if self.processing {
            "Waiting for metrics".to_string()
        } else {
            "Idle".to_string()
        }
    }

    fn name(&self) -> &str {
        "idle"
    }
}
