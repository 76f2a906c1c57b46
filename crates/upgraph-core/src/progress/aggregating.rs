//! Reporter whose progress is rolled up from child reporters.

use super::aggregator::{DefaultExecutionStateAggregator, ExecutionStateAggregator};
use super::listener::{ListenerRef, ListenerSet, ProgressListener};
use super::reporter::{ProgressReporter, ReporterRef};
use super::state::{ExecutionState, ProgressReport, TransitionError};
use parking_lot::{Mutex, ReentrantMutex};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

struct ChildSlot {
    reporter: ReporterRef,
    listener: ListenerRef,
    last: ProgressReport,
}

struct AggregateState {
    children: Vec<ChildSlot>,
    report: ProgressReport,
}

/// Listener installed on one child; caches nothing itself, it forwards the
/// child's report into the parent's slot for that child.
struct ChildListener {
    parent: Weak<AggregatingProgressReporter>,
    index: usize,
}

impl ProgressListener for ChildListener {
    fn on_progress(&self, report: ProgressReport) {
        if let Some(parent) = self.parent.upgrade() {
            parent.child_updated(self.index, report);
        }
    }
}

/// Aggregates the reports of a fixed set of children.
///
/// State is `aggregate(child states)`; percent is the rounded mean of the
/// children's percentages, or 100 once COMPLETED. When the aggregate state
/// becomes terminal every child listener is removed, exactly once.
///
/// Recalculation and delivery share one re-entrant lock so listeners never
/// observe an older snapshot after a newer one, even when children report
/// from different threads.
pub struct AggregatingProgressReporter {
    aggregator: Arc<dyn ExecutionStateAggregator>,
    state: Mutex<AggregateState>,
    delivery: ReentrantMutex<()>,
    listeners: ListenerSet,
    detached: AtomicBool,
}

impl AggregatingProgressReporter {
    /// Aggregate `children` with the default state aggregator.
    pub fn new(children: Vec<ReporterRef>) -> Arc<Self> {
        Self::with_aggregator(children, Arc::new(DefaultExecutionStateAggregator))
    }

    pub fn with_aggregator(
        children: Vec<ReporterRef>,
        aggregator: Arc<dyn ExecutionStateAggregator>,
    ) -> Arc<Self> {
        let reporter = Arc::new_cyclic(|weak: &Weak<Self>| {
            let slots: Vec<ChildSlot> = children
                .into_iter()
                .enumerate()
                .map(|(index, reporter)| ChildSlot {
                    last: reporter.report(),
                    listener: Arc::new(ChildListener {
                        parent: weak.clone(),
                        index,
                    }),
                    reporter,
                })
                .collect();
            let report = if slots.is_empty() {
                ProgressReport::PENDING
            } else {
                compute(aggregator.as_ref(), &slots, 0)
            };
            Self {
                aggregator,
                state: Mutex::new(AggregateState {
                    children: slots,
                    report,
                }),
                delivery: ReentrantMutex::new(()),
                listeners: ListenerSet::new(),
                detached: AtomicBool::new(false),
            }
        });

        let attach: Vec<(ReporterRef, ListenerRef)> = reporter
            .state
            .lock()
            .children
            .iter()
            .map(|slot| (slot.reporter.clone(), slot.listener.clone()))
            .collect();
        for (child, listener) in attach {
            child.add_listener(listener);
        }
        reporter
    }

    pub fn child_count(&self) -> usize {
        self.state.lock().children.len()
    }

    /// True once the child listeners have been removed.
    pub fn is_detached(&self) -> bool {
        self.detached.load(Ordering::SeqCst)
    }

    /// Force FAILED and detach from the children.
    ///
    /// Returns false if the reporter had already detached, in which case
    /// nothing is delivered.
    pub fn terminate_with_failure(&self) -> bool {
        let _delivery = self.delivery.lock();
        if self.detached.swap(true, Ordering::SeqCst) {
            return false;
        }
        let report = {
            let mut state = self.state.lock();
            state.report = ProgressReport::new(ExecutionState::Failed, state.report.percent);
            state.report
        };
        self.listeners.notify(report);
        self.detach_children();
        true
    }

    /// Run an aggregate with no children to completion.
    ///
    /// With nothing to aggregate, the reporter walks PENDING, RUNNING,
    /// COMPLETED itself. Fails if children exist or it has already moved.
    pub fn complete_empty(&self) -> Result<(), TransitionError> {
        let _delivery = self.delivery.lock();
        for next in [ExecutionState::Running, ExecutionState::Completed] {
            let report = {
                let mut state = self.state.lock();
                if !state.children.is_empty() {
                    return Err(TransitionError::InvalidTransition {
                        from: state.report.state,
                        to: next,
                    });
                }
                let moved = state.report.state.transition(next)?;
                let percent = if moved == ExecutionState::Completed { 100 } else { 0 };
                state.report = ProgressReport::new(moved, percent);
                state.report
            };
            self.listeners.notify(report);
        }
        self.detached.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn child_updated(&self, index: usize, report: ProgressReport) {
        let _delivery = self.delivery.lock();
        if self.detached.load(Ordering::SeqCst) {
            return;
        }
        let next = {
            let mut state = self.state.lock();
            let Some(slot) = state.children.get_mut(index) else {
                return;
            };
            slot.last = report;

            let previous = state.report;
            let next = compute(self.aggregator.as_ref(), &state.children, previous.percent);
            if next == previous {
                return;
            }
            if next.state != previous.state && !previous.state.can_transition_to(next.state) {
                panic!(
                    "aggregated state moved {} -> {}, which the state machine forbids",
                    previous.state, next.state
                );
            }
            state.report = next;
            next
        };

        let terminal = next.state.is_terminal();
        if terminal {
            self.detached.store(true, Ordering::SeqCst);
        }
        self.listeners.notify(next);
        if terminal {
            self.detach_children();
        }
    }

    fn detach_children(&self) {
        let attached: Vec<(ReporterRef, ListenerRef)> = self
            .state
            .lock()
            .children
            .iter()
            .map(|slot| (slot.reporter.clone(), slot.listener.clone()))
            .collect();
        for (child, listener) in attached {
            child.remove_listener(&listener);
        }
    }
}

fn compute(
    aggregator: &dyn ExecutionStateAggregator,
    children: &[ChildSlot],
    floor: u8,
) -> ProgressReport {
    let states: Vec<ExecutionState> = children.iter().map(|c| c.last.state).collect();
    let state = aggregator.aggregate(&states);
    let percent = if state == ExecutionState::Completed {
        100
    } else {
        let sum: u32 = children.iter().map(|c| u32::from(c.last.percent)).sum();
        (f64::from(sum) / children.len() as f64).round() as u8
    };
    ProgressReport::new(state, percent.max(floor))
}

impl ProgressReporter for AggregatingProgressReporter {
    fn report(&self) -> ProgressReport {
        self.state.lock().report
    }

    fn add_listener(&self, listener: ListenerRef) -> bool {
        self.listeners.add(listener)
    }

    fn remove_listener(&self, listener: &ListenerRef) -> bool {
        self.listeners.remove(listener)
    }

    fn request_progress_report(&self) {
        let _delivery = self.delivery.lock();
        self.listeners.notify(self.report());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::listener::RecordingListener;
    use crate::progress::reporter::TickProgressReporter;
    use ExecutionState::*;

    fn leaves(n: usize) -> Vec<Arc<TickProgressReporter>> {
        (0..n).map(|_| Arc::new(TickProgressReporter::new(2))).collect()
    }

    fn refs(leaves: &[Arc<TickProgressReporter>]) -> Vec<ReporterRef> {
        leaves.iter().map(|l| l.clone() as ReporterRef).collect()
    }

    #[test]
    fn test_mean_percent_and_state() {
        let children = leaves(2);
        let parent = AggregatingProgressReporter::new(refs(&children));
        assert_eq!(parent.report(), ProgressReport::PENDING);

        children[0].update_state(Running).unwrap();
        assert_eq!(parent.report(), ProgressReport::new(Running, 0));

        children[0].increment();
        assert_eq!(parent.report().percent, 25);
        children[0].increment();
        children[0].update_state(Completed).unwrap();
        assert_eq!(parent.report(), ProgressReport::new(Running, 50));

        children[1].update_state(Running).unwrap();
        children[1].update_state(Completed).unwrap();
        assert_eq!(parent.report(), ProgressReport::new(Completed, 100));
        assert!(parent.is_detached());
    }

    #[test]
    fn test_detaches_once_terminal() {
        let children = leaves(1);
        let parent = AggregatingProgressReporter::new(refs(&children));
        let recorder = RecordingListener::new();
        parent.add_listener(recorder.clone());

        children[0].update_state(Running).unwrap();
        children[0].update_state(Failed).unwrap();
        assert_eq!(parent.state(), Failed);
        assert!(parent.is_detached());

        let delivered = recorder.reports().len();
        parent.request_progress_report();
        assert_eq!(recorder.reports().len(), delivered + 1);
        assert!(!parent.terminate_with_failure());
    }

    #[test]
    fn test_terminate_with_failure_is_idempotent() {
        let children = leaves(2);
        let parent = AggregatingProgressReporter::new(refs(&children));
        let recorder = RecordingListener::new();
        parent.add_listener(recorder.clone());

        children[0].update_state(Running).unwrap();
        children[0].update_state(Failed).unwrap();
        // One child failed while the other is pending: still RUNNING.
        assert_eq!(parent.state(), Running);

        assert!(parent.terminate_with_failure());
        assert!(!parent.terminate_with_failure());
        assert_eq!(parent.state(), Failed);
        assert_eq!(recorder.states(), vec![Running, Failed]);

        // Detached: later child activity no longer reaches the parent.
        children[1].update_state(Running).unwrap();
        assert_eq!(parent.state(), Failed);
    }

    #[test]
    fn test_nested_aggregates_roll_up() {
        let inner_children = leaves(2);
        let inner = AggregatingProgressReporter::new(refs(&inner_children));
        let sibling = Arc::new(TickProgressReporter::new(1));
        let outer =
            AggregatingProgressReporter::new(vec![inner.clone() as ReporterRef, sibling.clone()]);

        for child in &inner_children {
            child.update_state(Running).unwrap();
            child.update_state(Completed).unwrap();
        }
        assert_eq!(inner.report(), ProgressReport::new(Completed, 100));
        assert_eq!(outer.report(), ProgressReport::new(Running, 50));

        sibling.update_state(Running).unwrap();
        sibling.update_state(Completed).unwrap();
        assert_eq!(outer.report(), ProgressReport::new(Completed, 100));
    }

    #[test]
    fn test_empty_aggregate_completes_itself() {
        let parent = AggregatingProgressReporter::new(Vec::new());
        let recorder = RecordingListener::new();
        parent.add_listener(recorder.clone());

        parent.complete_empty().unwrap();
        assert_eq!(
            recorder.reports(),
            vec![
                ProgressReport::new(Running, 0),
                ProgressReport::new(Completed, 100)
            ]
        );
        assert!(parent.complete_empty().is_err());
    }

    #[test]
    fn test_complete_empty_rejects_children() {
        let parent = AggregatingProgressReporter::new(refs(&leaves(1)));
        assert!(parent.complete_empty().is_err());
        assert_eq!(parent.state(), Pending);
    }
}
