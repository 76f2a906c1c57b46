//! Progress listeners and the listener set shared by every reporter.

use super::state::{ExecutionState, ProgressReport};
use parking_lot::Mutex;
use std::sync::Arc;

/// Receives progress snapshots from a reporter.
pub trait ProgressListener: Send + Sync {
    fn on_progress(&self, report: ProgressReport);
}

/// Shared handle to a listener. Identity is the allocation, so the same
/// handle added twice is one listener.
pub type ListenerRef = Arc<dyn ProgressListener>;

/// Set of listeners with identity-based add/remove.
#[derive(Default)]
pub struct ListenerSet {
    listeners: Mutex<Vec<ListenerRef>>,
}

impl ListenerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a listener; returns false if it was already present.
    pub fn add(&self, listener: ListenerRef) -> bool {
        let mut listeners = self.listeners.lock();
        if listeners.iter().any(|l| same_listener(l, &listener)) {
            return false;
        }
        listeners.push(listener);
        true
    }

    /// Remove a listener; returns false if it was not present.
    pub fn remove(&self, listener: &ListenerRef) -> bool {
        let mut listeners = self.listeners.lock();
        let before = listeners.len();
        listeners.retain(|l| !same_listener(l, listener));
        listeners.len() != before
    }

    pub fn len(&self) -> usize {
        self.listeners.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Deliver a report to every listener, in registration order.
    ///
    /// The set is snapshotted first so listeners may add or remove listeners
    /// while being notified.
    pub fn notify(&self, report: ProgressReport) {
        let snapshot: Vec<ListenerRef> = self.listeners.lock().clone();
        for listener in snapshot {
            listener.on_progress(report);
        }
    }
}

fn same_listener(a: &ListenerRef, b: &ListenerRef) -> bool {
    Arc::as_ptr(a) as *const () == Arc::as_ptr(b) as *const ()
}

/// Listener that keeps every report it receives.
#[derive(Default)]
pub struct RecordingListener {
    reports: Mutex<Vec<ProgressReport>>,
}

impl RecordingListener {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// All reports received so far.
    pub fn reports(&self) -> Vec<ProgressReport> {
        self.reports.lock().clone()
    }

    /// The distinct states seen, in order of first appearance after each change.
    pub fn states(&self) -> Vec<ExecutionState> {
        let mut states: Vec<ExecutionState> = Vec::new();
        for report in self.reports.lock().iter() {
            if states.last() != Some(&report.state) {
                states.push(report.state);
            }
        }
        states
    }

    pub fn last(&self) -> Option<ProgressReport> {
        self.reports.lock().last().copied()
    }
}

impl ProgressListener for RecordingListener {
    fn on_progress(&self, report: ProgressReport) {
        self.reports.lock().push(report);
    }
}

struct FnListener<F>(F);

impl<F> ProgressListener for FnListener<F>
where
    F: Fn(ProgressReport) + Send + Sync,
{
    fn on_progress(&self, report: ProgressReport) {
        (self.0)(report)
    }
}

/// Wrap a closure as a listener.
pub fn listener_fn<F>(f: F) -> ListenerRef
where
    F: Fn(ProgressReport) + Send + Sync + 'static,
{
    Arc::new(FnListener(f))
}
