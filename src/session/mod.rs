//! Vitals monitoring session
//!
//! This module provides:
//! - `StatsAccumulator`: running min/max/average over pulse-rate samples
//! - `SessionController`: the enabled/disabled state machine, gated on camera permission
//! - `MonitoringService`: async wrapper that pumps the sensing feed into the controller

mod controller;
mod monitor;
mod stats;

pub use controller::{SessionController, SessionError, SessionSnapshot, SessionState, StatsObserver};
pub use monitor::MonitoringService;
pub use stats::{AccumulatedStats, StatsAccumulator};
