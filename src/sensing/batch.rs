use serde::{Deserialize, Serialize};

/// A group of pulse-rate samples delivered together by the sensing SDK
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsBatch {
    /// Milliseconds since processing started
    #[serde(default)]
    pub timestamp_ms: u64,

    /// Whether the SDK considers this batch valid; uninitialized batches are dropped
    #[serde(default = "default_initialized")]
    pub is_initialized: bool,

    /// Pulse-rate samples in beats per minute
    #[serde(default)]
    pub pulse_rates: Vec<f64>,
}

fn default_initialized() -> bool {
    true
}

impl MetricsBatch {
    /// Create an initialized batch stamped at 0 ms
    pub fn new(pulse_rates: Vec<f64>) -> Self {
        Self {
            timestamp_ms: 0,
            is_initialized: true,
            pulse_rates,
        }
    }

    /// A batch the SDK has not finished populating
    pub fn uninitialized() -> Self {
        Self {
            timestamp_ms: 0,
            is_initialized: false,
            pulse_rates: Vec::new(),
        }
    }

    pub fn with_timestamp(mut self, timestamp_ms: u64) -> Self {
        self.timestamp_ms = timestamp_ms;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.pulse_rates.is_empty()
    }
}
