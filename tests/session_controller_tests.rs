// Tests for the monitoring session state machine
//
// A recording mock stands in for the sensing SDK so the lifecycle calls the
// controller makes can be checked.

use anyhow::Result;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use vitals_monitor::{
    AccumulatedStats, MetricsBatch, PermissionState, SensingBackend, SessionController,
    SessionError, SessionState,
};

#[derive(Clone, Default)]
struct CallLog(Arc<Mutex<Vec<&'static str>>>);

impl CallLog {
    fn push(&self, call: &'static str) {
        self.0.lock().unwrap().push(call);
    }

    fn calls(&self) -> Vec<&'static str> {
        self.0.lock().unwrap().clone()
    }
}

struct MockSensing {
    log: CallLog,
    processing: bool,
    fail_start: bool,
}

impl SensingBackend for MockSensing {
    fn subscribe(&mut self) -> Result<mpsc::Receiver<MetricsBatch>> {
        let (_tx, rx) = mpsc::channel(1);
        Ok(rx)
    }

    fn start_processing(&mut self) -> Result<()> {
        self.log.push("start_processing");
        if self.fail_start {
            anyhow::bail!("camera unavailable");
        }
        self.processing = true;
        Ok(())
    }

    fn stop_processing(&mut self) -> Result<()> {
        self.log.push("stop_processing");
        self.processing = false;
        Ok(())
    }

    fn start_recording(&mut self) -> Result<()> {
        self.log.push("start_recording");
        Ok(())
    }

    fn stop_recording(&mut self) -> Result<()> {
        self.log.push("stop_recording");
        Ok(())
    }

    fn is_processing(&self) -> bool {
        self.processing
    }

    fn status_hint(&self) -> String {
        if self.processing {
            "Measuring".to_string()
        } else {
            "Idle".to_string()
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}

fn controller() -> (SessionController, CallLog) {
    let log = CallLog::default();
    let sensing = MockSensing {
        log: log.clone(),
        processing: false,
        fail_start: false,
    };
    (SessionController::new(Box::new(sensing)), log)
}

fn batch(rates: &[f64]) -> MetricsBatch {
    MetricsBatch::new(rates.to_vec())
}

#[test]
fn test_initial_state() {
    let (ctrl, log) = controller();

    assert_eq!(ctrl.state(), SessionState::Disabled);
    assert_eq!(ctrl.permission_state(), PermissionState::Unknown);
    assert_eq!(ctrl.stats(), AccumulatedStats::default());
    assert_eq!(ctrl.sample_count(), 0);
    assert!(ctrl.session_id().is_none());
    assert!(log.calls().is_empty());
}

#[test]
fn test_start_signals_sensing_and_enables() {
    let (mut ctrl, log) = controller();

    ctrl.request_start().unwrap();

    assert_eq!(ctrl.state(), SessionState::Enabled);
    assert!(ctrl.session_id().unwrap().starts_with("session-"));
    assert!(ctrl.started_at().is_some());
    assert_eq!(ctrl.status_hint(), "Measuring");
    assert_eq!(log.calls(), vec!["start_processing", "start_recording"]);
}

#[test]
fn test_start_with_unknown_permission_is_allowed() {
    let (mut ctrl, _log) = controller();

    assert!(ctrl.request_start().is_ok());
    assert!(ctrl.is_enabled());
}

#[test]
fn test_start_rejected_when_permission_denied() {
    let (mut ctrl, log) = controller();
    ctrl.set_permission_state(PermissionState::Denied);

    let result = ctrl.request_start();

    assert_eq!(result, Err(SessionError::PermissionDenied));
    assert_eq!(ctrl.state(), SessionState::Disabled);
    assert!(log.calls().is_empty());
}

#[test]
fn test_start_after_permission_granted() {
    let (mut ctrl, _log) = controller();
    ctrl.set_permission_state(PermissionState::Denied);
    assert!(ctrl.request_start().is_err());

    ctrl.set_permission_state(PermissionState::Granted);

    assert!(ctrl.request_start().is_ok());
    assert_eq!(ctrl.state(), SessionState::Enabled);
}

#[test]
fn test_denied_while_enabled_keeps_session_running() {
    let (mut ctrl, _log) = controller();
    ctrl.request_start().unwrap();

    ctrl.set_permission_state(PermissionState::Denied);

    assert_eq!(ctrl.state(), SessionState::Enabled);
    assert!(ctrl.on_metrics_event(&batch(&[70.0])).is_some());

    ctrl.request_stop();
    assert_eq!(ctrl.request_start(), Err(SessionError::PermissionDenied));
}

#[test]
fn test_metrics_ignored_when_disabled() {
    let (mut ctrl, _log) = controller();

    let result = ctrl.on_metrics_event(&batch(&[60.0, 70.0, 80.0]));

    assert!(result.is_none());
    assert_eq!(ctrl.sample_count(), 0);
    assert_eq!(ctrl.stats(), AccumulatedStats::default());
}

#[test]
fn test_metrics_accumulate_when_enabled() {
    let (mut ctrl, _log) = controller();
    ctrl.request_start().unwrap();

    ctrl.on_metrics_event(&batch(&[60.0, 70.0]));
    let stats = ctrl.on_metrics_event(&batch(&[80.0, 90.0])).unwrap();

    assert_eq!(stats, AccumulatedStats { min: 60, max: 90, average: 75 });
    assert_eq!(ctrl.sample_count(), 4);
}

#[test]
fn test_metrics_after_stop_are_discarded() {
    let (mut ctrl, _log) = controller();
    ctrl.request_start().unwrap();
    ctrl.on_metrics_event(&batch(&[72.0]));
    ctrl.request_stop();

    assert!(ctrl.on_metrics_event(&batch(&[150.0])).is_none());
    assert_eq!(ctrl.sample_count(), 1);
    assert_eq!(ctrl.stats().max, 72);
}

#[test]
fn test_stop_finalizes_and_signals_sensing() {
    let (mut ctrl, log) = controller();
    ctrl.request_start().unwrap();
    ctrl.on_metrics_event(&batch(&[65.0, 75.0, 85.0]));

    let stats = ctrl.request_stop();

    assert_eq!(stats, AccumulatedStats { min: 65, max: 85, average: 75 });
    assert_eq!(ctrl.state(), SessionState::Disabled);
    assert_eq!(
        log.calls(),
        vec!["start_processing", "start_recording", "stop_processing", "stop_recording"]
    );
}

#[test]
fn test_stop_with_no_data_keeps_zeros() {
    let (mut ctrl, _log) = controller();
    ctrl.request_start().unwrap();

    assert_eq!(ctrl.request_stop(), AccumulatedStats::default());
}

#[test]
fn test_stop_when_disabled_is_noop() {
    let (mut ctrl, log) = controller();

    assert_eq!(ctrl.request_stop(), AccumulatedStats::default());
    assert_eq!(ctrl.state(), SessionState::Disabled);
    assert!(log.calls().is_empty());
}

#[test]
fn test_start_while_enabled_keeps_samples() {
    let (mut ctrl, log) = controller();
    ctrl.request_start().unwrap();
    ctrl.on_metrics_event(&batch(&[70.0, 80.0]));
    let session_id = ctrl.session_id().map(str::to_string);

    assert!(ctrl.request_start().is_ok());

    assert_eq!(ctrl.sample_count(), 2);
    assert_eq!(ctrl.stats().average, 75);
    assert_eq!(ctrl.session_id().map(str::to_string), session_id);
    assert_eq!(log.calls(), vec!["start_processing", "start_recording"]);
}

#[test]
fn test_new_session_resets_stats() {
    let (mut ctrl, _log) = controller();
    ctrl.request_start().unwrap();
    ctrl.on_metrics_event(&batch(&[100.0, 110.0]));
    ctrl.request_stop();
    assert_eq!(ctrl.stats().average, 105);

    ctrl.request_start().unwrap();

    assert_eq!(ctrl.stats(), AccumulatedStats::default());
    assert_eq!(ctrl.sample_count(), 0);
}

#[test]
fn test_sensing_failure_does_not_block_start() {
    let log = CallLog::default();
    let sensing = MockSensing {
        log: log.clone(),
        processing: false,
        fail_start: true,
    };
    let mut ctrl = SessionController::new(Box::new(sensing));

    assert!(ctrl.request_start().is_ok());
    assert_eq!(ctrl.state(), SessionState::Enabled);
    assert_eq!(log.calls(), vec!["start_processing", "start_recording"]);
}

#[test]
fn test_observers_see_every_change() {
    let (mut ctrl, _log) = controller();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    ctrl.subscribe(move |stats| sink.lock().unwrap().push(*stats));

    ctrl.request_start().unwrap();
    ctrl.on_metrics_event(&batch(&[60.0]));
    ctrl.on_metrics_event(&batch(&[60.0])); // unchanged, no notification
    ctrl.on_metrics_event(&batch(&[90.0]));
    ctrl.request_stop();
    ctrl.request_start().unwrap();

    let seen = seen.lock().unwrap().clone();
    assert_eq!(
        seen,
        vec![
            AccumulatedStats { min: 60, max: 60, average: 60 },
            AccumulatedStats { min: 60, max: 90, average: 70 },
            AccumulatedStats::default(),
        ]
    );
}

#[test]
fn test_snapshot_reflects_session() {
    let (mut ctrl, _log) = controller();
    ctrl.set_permission_state(PermissionState::Granted);
    ctrl.request_start().unwrap();
    ctrl.on_metrics_event(&batch(&[66.0, 68.0]));

    let snapshot = ctrl.snapshot();

    assert_eq!(snapshot.state, SessionState::Enabled);
    assert_eq!(snapshot.permission, PermissionState::Granted);
    assert_eq!(snapshot.sample_count, 2);
    assert_eq!(snapshot.stats.average, 67);
    assert_eq!(snapshot.status_hint, "Measuring");
    assert!(snapshot.duration_secs >= 0.0);
    assert!(snapshot.previous.is_none());
}
