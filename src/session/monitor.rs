use anyhow::Result;
use std::sync::Arc;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use super::controller::{SessionController, SessionError, SessionSnapshot};
use super::stats::AccumulatedStats;
use crate::sensing::{MetricsBatch, PermissionQuery, PermissionState, SensingBackend};
use crate::storage::StatsStore;

/// Async front for a monitoring session
///
/// All access to the controller goes through one mutex, shared by the
/// metrics feed pump, HTTP handlers and the CLI.
pub struct MonitoringService {
    /// Session state machine and accumulator
    controller: Arc<Mutex<SessionController>>,

    /// Latest stats, updated by the controller's observer
    stats_rx: watch::Receiver<AccumulatedStats>,

    /// Handle for the metrics feed pump task
    pump_handle: Mutex<Option<JoinHandle<()>>>,

    /// Best-effort cache of the last session summary
    store: Option<StatsStore>,

    /// Summary loaded from the cache at startup
    previous: Option<AccumulatedStats>,
}

impl MonitoringService {
    /// Create a service around a sensing backend
    ///
    /// Takes the backend's metrics feed and spawns the pump task, so this must
    /// be called from within a tokio runtime.
    pub fn new(mut sensing: Box<dyn SensingBackend>) -> Result<Self> {
        info!("Creating monitoring service with {} backend", sensing.name());

        let mut feed = sensing.subscribe()?;

        let (stats_tx, stats_rx) = watch::channel(AccumulatedStats::default());
        let mut controller = SessionController::new(sensing);
        controller.subscribe(move |stats| {
            stats_tx.send_replace(*stats);
        });

        let controller = Arc::new(Mutex::new(controller));

        let pump_controller = Arc::clone(&controller);
        let pump = tokio::spawn(async move {
            info!("Metrics feed pump started");

            while let Some(batch) = feed.recv().await {
                let mut controller = pump_controller.lock().await;
                controller.on_metrics_event(&batch);
            }

            info!("Metrics feed closed");
        });

        Ok(Self {
            controller,
            stats_rx,
            pump_handle: Mutex::new(Some(pump)),
            store: None,
            previous: None,
        })
    }

    /// Attach a stats cache; the previous summary is loaded immediately
    pub fn with_store(mut self, store: StatsStore) -> Self {
        self.previous = match store.load() {
            Ok(previous) => previous,
            Err(e) => {
                warn!("Failed to load cached stats: {}", e);
                None
            }
        };
        self.store = Some(store);
        self
    }

    /// Run the permission query and record the answer
    pub async fn resolve_permission(&self, query: &dyn PermissionQuery) -> PermissionState {
        let state = query.query().await;
        self.set_permission_state(state).await;
        state
    }

    pub async fn set_permission_state(&self, state: PermissionState) {
        self.controller.lock().await.set_permission_state(state);
    }

    /// Start monitoring
    pub async fn start(&self) -> Result<(), SessionError> {
        self.controller.lock().await.request_start()
    }

    /// Stop monitoring, cache the summary and return it
    pub async fn stop(&self) -> AccumulatedStats {
        let (stats, had_samples) = {
            let mut controller = self.controller.lock().await;
            let was_enabled = controller.is_enabled();
            let stats = controller.request_stop();
            (stats, was_enabled && controller.sample_count() > 0)
        };

        if had_samples {
            if let Some(store) = &self.store {
                if let Err(e) = store.save(&stats) {
                    error!("Failed to cache session stats: {}", e);
                }
            }
        }

        stats
    }

    /// Feed a batch directly, bypassing the sensing backend
    pub async fn push_batch(&self, batch: &MetricsBatch) -> Option<AccumulatedStats> {
        self.controller.lock().await.on_metrics_event(batch)
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        let mut snapshot = self.controller.lock().await.snapshot();
        snapshot.previous = self.previous;
        snapshot
    }

    /// Receiver that observes every stats change
    pub fn watch_stats(&self) -> watch::Receiver<AccumulatedStats> {
        self.stats_rx.clone()
    }

    /// Wait until the sensing backend closes its metrics feed
    pub async fn wait_for_feed_end(&self) {
        let handle = self.pump_handle.lock().await.take();

        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                error!("Metrics feed pump panicked: {}", e);
            }
        }
    }

    /// Stop monitoring and tear down the pump task
    pub async fn shutdown(&self) -> AccumulatedStats {
        let stats = self.stop().await;

        if let Some(handle) = self.pump_handle.lock().await.take() {
            handle.abort();
        }

        info!("Monitoring service shut down");
        stats
    }
}
