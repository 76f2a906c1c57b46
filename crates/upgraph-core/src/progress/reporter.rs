//! The reporter contract and the tick-based leaf reporter.

use super::listener::{ListenerRef, ListenerSet};
use super::state::{ExecutionState, ProgressReport, TransitionError};
use parking_lot::Mutex;
use std::sync::Arc;

/// An observable source of progress snapshots.
///
/// Mutating calls on one reporter must be serialized by whoever drives it;
/// listener delivery order is only guaranteed under that discipline.
pub trait ProgressReporter: Send + Sync {
    /// The current snapshot.
    fn report(&self) -> ProgressReport;

    /// Register a listener; returns false if it was already registered.
    fn add_listener(&self, listener: ListenerRef) -> bool;

    /// Unregister a listener; returns false if it was not registered.
    fn remove_listener(&self, listener: &ListenerRef) -> bool;

    /// Synchronously deliver the current snapshot to every listener.
    fn request_progress_report(&self);

    fn state(&self) -> ExecutionState {
        self.report().state
    }
}

pub type ReporterRef = Arc<dyn ProgressReporter>;

/// Scale of the liveness curve used when the tick total is unknown.
const UNKNOWN_TOTAL_SCALE: f64 = i32::MAX as f64;

struct TickState {
    ticks: u64,
    report: ProgressReport,
}

/// Leaf reporter driven by explicit ticks and state changes.
///
/// With a known total, percent is `round(100 * ticks / total)`. With an
/// unknown total it follows a slow logarithmic curve that only signals
/// liveness; reaching COMPLETED always forces 100.
pub struct TickProgressReporter {
    total: Option<u64>,
    inner: Mutex<TickState>,
    listeners: ListenerSet,
}

impl TickProgressReporter {
    /// Reporter expecting `total` ticks.
    pub fn new(total: u64) -> Self {
        Self::with_total(Some(total))
    }

    /// Reporter with no known tick total.
    pub fn unknown() -> Self {
        Self::with_total(None)
    }

    fn with_total(total: Option<u64>) -> Self {
        Self {
            total,
            inner: Mutex::new(TickState {
                ticks: 0,
                report: ProgressReport::PENDING,
            }),
            listeners: ListenerSet::new(),
        }
    }

    /// Expected tick count, `None` when unknown.
    pub fn total(&self) -> Option<u64> {
        self.total
    }

    pub fn ticks(&self) -> u64 {
        self.inner.lock().ticks
    }

    /// Record one unit of work. Ignored once the reporter is terminal.
    pub fn increment(&self) {
        let report = {
            let mut inner = self.inner.lock();
            if inner.report.state.is_terminal() {
                return;
            }
            inner.ticks = inner.ticks.saturating_add(1);
            let percent = tick_percent(inner.ticks, self.total).max(inner.report.percent);
            if percent == inner.report.percent {
                return;
            }
            inner.report.percent = percent;
            inner.report
        };
        self.listeners.notify(report);
    }

    /// Move to `state`. The state must change and the move must be allowed by
    /// the execution state machine.
    pub fn update_state(&self, state: ExecutionState) -> Result<(), TransitionError> {
        let report = {
            let mut inner = self.inner.lock();
            inner.report.state = inner.report.state.transition(state)?;
            if state == ExecutionState::Completed {
                inner.report.percent = 100;
            }
            inner.report
        };
        self.listeners.notify(report);
        Ok(())
    }
}

fn tick_percent(ticks: u64, total: Option<u64>) -> u8 {
    let ratio = match total {
        Some(0) => 0.0,
        Some(total) => ticks as f64 / total as f64,
        None if ticks == 0 => 0.0,
        None => (ticks as f64).ln() / UNKNOWN_TOTAL_SCALE.ln(),
    };
    (ratio * 100.0).round().clamp(0.0, 100.0) as u8
}

impl ProgressReporter for TickProgressReporter {
    fn report(&self) -> ProgressReport {
        self.inner.lock().report
    }

    fn add_listener(&self, listener: ListenerRef) -> bool {
        self.listeners.add(listener)
    }

    fn remove_listener(&self, listener: &ListenerRef) -> bool {
        self.listeners.remove(listener)
    }

    fn request_progress_report(&self) {
        self.listeners.notify(self.report());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::listener::RecordingListener;
    use ExecutionState::*;

    #[test]
    fn test_known_total_percent() {
        let reporter = TickProgressReporter::new(3);
        reporter.update_state(Running).unwrap();
        reporter.increment();
        assert_eq!(reporter.report(), ProgressReport::new(Running, 33));
        reporter.increment();
        assert_eq!(reporter.report().percent, 67);
        reporter.increment();
        reporter.increment();
        assert_eq!(reporter.report().percent, 100);
        assert_eq!(reporter.ticks(), 4);
    }

    #[test]
    fn test_unknown_total_is_logarithmic() {
        assert_eq!(tick_percent(0, None), 0);
        assert_eq!(tick_percent(1, None), 0);
        assert_eq!(tick_percent(1000, None), 32);
        assert!(tick_percent(1_000_000, None) < 100);
        assert_eq!(tick_percent(i32::MAX as u64, None), 100);
    }

    #[test]
    fn test_completed_forces_full_percent() {
        let reporter = TickProgressReporter::unknown();
        reporter.update_state(Running).unwrap();
        reporter.increment();
        reporter.update_state(Completed).unwrap();
        assert_eq!(reporter.report(), ProgressReport::new(Completed, 100));
    }

    #[test]
    fn test_state_must_change() {
        let reporter = TickProgressReporter::new(1);
        assert_eq!(
            reporter.update_state(Pending),
            Err(TransitionError::Unchanged { state: Pending })
        );
        assert!(reporter.update_state(Completed).is_err());
        assert_eq!(reporter.state(), Pending);
    }

    #[test]
    fn test_terminal_reporter_ignores_ticks() {
        let reporter = TickProgressReporter::new(2);
        reporter.update_state(Running).unwrap();
        reporter.update_state(Failed).unwrap();
        reporter.increment();
        assert_eq!(reporter.ticks(), 0);
        assert_eq!(reporter.report().percent, 0);
    }

    #[test]
    fn test_listeners_see_every_change() {
        let reporter = TickProgressReporter::new(2);
        let recorder = RecordingListener::new();
        reporter.add_listener(recorder.clone());

        reporter.update_state(Running).unwrap();
        reporter.increment();
        reporter.increment();
        reporter.update_state(Completed).unwrap();

        assert_eq!(
            recorder.reports(),
            vec![
                ProgressReport::new(Running, 0),
                ProgressReport::new(Running, 50),
                ProgressReport::new(Running, 100),
                ProgressReport::new(Completed, 100),
            ]
        );

        reporter.request_progress_report();
        assert_eq!(recorder.reports().len(), 5);
    }
}
