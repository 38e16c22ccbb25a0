use serde::{Deserialize, Serialize};

use crate::sensing::MetricsBatch;

/// Summary statistics over the pulse-rate samples of a session
///
/// Each field is the real-valued aggregate rounded half away from zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccumulatedStats {
    /// Lowest pulse rate (bpm)
    pub min: i64,

    /// Highest pulse rate (bpm)
    pub max: i64,

    /// Mean pulse rate (bpm)
    pub average: i64,
}

/// Running collection of pulse-rate samples with derived min/max/average
///
/// The exposed stats are always recomputed from the full collection, never
/// tracked incrementally.
#[derive(Debug, Clone, Default)]
pub struct StatsAccumulator {
    samples: Vec<f64>,
    stats: AccumulatedStats,
}

impl StatsAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear all samples and zero the stats
    pub fn reset(&mut self) {
        self.samples.clear();
        self.stats = AccumulatedStats::default();
    }

    /// Append a batch of samples and recompute over the whole collection
    ///
    /// Uninitialized or empty batches leave everything untouched.
    pub fn ingest(&mut self, batch: &MetricsBatch) -> AccumulatedStats {
        if !batch.is_initialized || batch.pulse_rates.is_empty() {
            return self.stats;
        }

        self.samples.extend_from_slice(&batch.pulse_rates);
        self.recompute();
        self.stats
    }

    /// Recompute the stats at session end
    ///
    /// With no samples the last computed stats stand.
    pub fn finalize(&mut self) -> AccumulatedStats {
        self.recompute();
        self.stats
    }

    pub fn stats(&self) -> AccumulatedStats {
        self.stats
    }

    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    fn recompute(&mut self) {
        if self.samples.is_empty() {
            return;
        }

        let min = self.samples.iter().copied().fold(f64::INFINITY, f64::min);
        let max = self.samples.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let mean = self.samples.iter().sum::<f64>() / self.samples.len() as f64;

        self.stats = AccumulatedStats {
            min: min.round() as i64,
            max: max.round() as i64,
            average: mean.round() as i64,
        };
    }
}
