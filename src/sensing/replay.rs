// Replay backend
//
// Plays back a recorded session: one JSON-encoded MetricsBatch per line.
// Batches are emitted at a fixed interval while processing is active.
// Stopping pauses at the current position and starting again resumes.
// Once every batch has been sent the feed closes.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use super::backend::{SensingBackend, SensingBackendConfig};
use super::batch::MetricsBatch;

type FeedSlot = Mutex<Option<mpsc::Sender<MetricsBatch>>>;

/// Sensing backend that replays recorded metric batches
pub struct ReplayBackend {
    config: SensingBackendConfig,
    batches: Arc<Vec<MetricsBatch>>,
    /// Feed sender, parked here while no replay task holds it
    feed_tx: Arc<FeedSlot>,
    subscribed: bool,
    task: Option<JoinHandle<()>>,
    /// Index of the next batch to send
    cursor: Arc<AtomicUsize>,
    processing: Arc<AtomicBool>,
    recording: bool,
}

impl ReplayBackend {
    /// Load a JSON-lines recording
    pub fn open(path: impl AsRef<Path>, config: SensingBackendConfig) -> Result<Self> {
        let path = path.as_ref();
        info!("Opening replay file: {}", path.display());

        let contents = fs::read_to_string(path).context("Failed to read replay file")?;
        let batches = Self::parse(&contents)?;

        info!("Replay loaded: {} batches", batches.len());

        Ok(Self::from_batches(batches, config))
    }

    /// Replay an in-memory sequence of batches
    pub fn from_batches(batches: Vec<MetricsBatch>, config: SensingBackendConfig) -> Self {
        Self {
            config,
            batches: Arc::new(batches),
            feed_tx: Arc::new(Mutex::new(None)),
            subscribed: false,
            task: None,
            cursor: Arc::new(AtomicUsize::new(0)),
            processing: Arc::new(AtomicBool::new(false)),
            recording: false,
        }
    }

    /// Parse JSON lines; blank lines are skipped
    pub fn parse(contents: &str) -> Result<Vec<MetricsBatch>> {
        contents
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(i, line)| {
                serde_json::from_str::<MetricsBatch>(line)
                    .with_context(|| format!("Invalid metrics batch on line {}", i + 1))
            })
            .collect()
    }

    pub fn total_batches(&self) -> usize {
        self.batches.len()
    }

    /// Number of batches already sent on the feed
    pub fn position(&self) -> usize {
        self.cursor.load(Ordering::SeqCst)
    }

    pub fn is_recording(&self) -> bool {
        self.recording
    }

    fn lock_slot(slot: &FeedSlot) -> MutexGuard<'_, Option<mpsc::Sender<MetricsBatch>>> {
        slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn task_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }
}

impl SensingBackend for ReplayBackend {
    fn subscribe(&mut self) -> Result<mpsc::Receiver<MetricsBatch>> {
        if self.subscribed {
            anyhow::bail!("Metrics feed already taken");
        }

        let (tx, rx) = mpsc::channel(self.config.feed_capacity);
        *Self::lock_slot(&self.feed_tx) = Some(tx);
        self.subscribed = true;
        Ok(rx)
    }

    fn start_processing(&mut self) -> Result<()> {
        if self.processing.load(Ordering::SeqCst) {
            warn!("Replay already processing");
            return Ok(());
        }

        let runtime = Handle::try_current().context("Replay requires a tokio runtime")?;

        // The slot lock orders this against a replay task deciding to pause
        let mut slot = Self::lock_slot(&self.feed_tx);
        self.processing.store(true, Ordering::SeqCst);

        let tx = match slot.take() {
            Some(tx) => tx,
            None if self.task_running() => {
                info!("Replay resumed before pausing");
                return Ok(());
            }
            None => {
                self.processing.store(false, Ordering::SeqCst);
                anyhow::bail!("Replay feed not subscribed or already exhausted");
            }
        };
        drop(slot);

        let batches = Arc::clone(&self.batches);
        let cursor = Arc::clone(&self.cursor);
        let processing = Arc::clone(&self.processing);
        let slot = Arc::clone(&self.feed_tx);
        let interval = self.config.batch_interval;

        let task = runtime.spawn(async move {
            info!("Replay task started at batch {}", cursor.load(Ordering::SeqCst));

            loop {
                if !processing.load(Ordering::SeqCst) {
                    let mut parked = Self::lock_slot(&slot);
                    if !processing.load(Ordering::SeqCst) {
                        info!("Replay paused at batch {}", cursor.load(Ordering::SeqCst));
                        *parked = Some(tx);
                        return;
                    }
                }

                let index = cursor.load(Ordering::SeqCst);
                let Some(batch) = batches.get(index).cloned() else {
                    break;
                };

                if tx.send(batch).await.is_err() {
                    warn!("Metrics feed closed by receiver");
                    break;
                }
                cursor.store(index + 1, Ordering::SeqCst);

                tokio::time::sleep(interval).await;
            }

            processing.store(false, Ordering::SeqCst);
            info!("Replay finished after {} batches", cursor.load(Ordering::SeqCst));
            // Dropping tx closes the feed
        });
        self.task = Some(task);

        Ok(())
    }

    fn stop_processing(&mut self) -> Result<()> {
        self.processing.store(false, Ordering::SeqCst);
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
        self.processing.load(Ordering::SeqCst)
    }

    fn status_hint(&self) -> String {
        let position = self.position();
        let total = self.total_batches();

        if position >= total && total > 0 {
            "Replay complete".to_string()
        } else if self.is_processing() {
            format!("Replaying {}/{}", position, total)
        } else {
            "Idle".to_string()
        }
    }

    fn name(&self) -> &str {
        "replay"
    }
}
