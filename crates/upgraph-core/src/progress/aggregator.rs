//! Rolling child execution states up into a parent state.

use super::state::ExecutionState;

/// Maps a set of child states to the parent's state.
pub trait ExecutionStateAggregator: Send + Sync {
    /// Aggregate at least one child state.
    fn aggregate(&self, states: &[ExecutionState]) -> ExecutionState;
}

/// The standard aggregation order.
///
/// Identical states pass through. Otherwise the first rule that matches wins:
/// any RUNNING or PENDING child gives RUNNING, then SUSPENDED, CANCELLED,
/// FAILED, and COMPLETED last. This order keeps every valid child transition
/// mapped onto a valid (or no-op) parent transition.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultExecutionStateAggregator;

impl ExecutionStateAggregator for DefaultExecutionStateAggregator {
    fn aggregate(&self, states: &[ExecutionState]) -> ExecutionState {
        use ExecutionState::*;

        let Some((first, rest)) = states.split_first() else {
            return Pending;
        };
        if rest.iter().all(|s| s == first) {
            return *first;
        }

        let any = |wanted: &[ExecutionState]| states.iter().any(|s| wanted.contains(s));
        if any(&[Running, Pending]) {
            Running
        } else if any(&[Suspended]) {
            Suspended
        } else if any(&[Cancelled]) {
            Cancelled
        } else if any(&[Failed]) {
            Failed
        } else {
            Completed
        }
    }
}
