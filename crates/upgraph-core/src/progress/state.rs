//! Execution state machine and progress snapshots.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Lifecycle state of a progress reporter.
///
/// ```text
/// PENDING ──> RUNNING ──> COMPLETED | FAILED | CANCELLED
///               │  ^
///               v  │
///             SUSPENDED ──> CANCELLED
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExecutionState {
    Pending,
    Running,
    Suspended,
    Cancelled,
    Failed,
    Completed,
}

impl ExecutionState {
    /// Every state, in declaration order.
    pub const ALL: [ExecutionState; 6] = [
        ExecutionState::Pending,
        ExecutionState::Running,
        ExecutionState::Suspended,
        ExecutionState::Cancelled,
        ExecutionState::Failed,
        ExecutionState::Completed,
    ];

    /// Terminal states have no outgoing transitions.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            ExecutionState::Cancelled | ExecutionState::Failed | ExecutionState::Completed
        )
    }

    /// Whether the state machine allows moving from `self` to `to`.
    pub fn can_transition_to(self, to: ExecutionState) -> bool {
        use ExecutionState::*;
        matches!(
            (self, to),
            (Pending, Running)
                | (Running, Cancelled)
                | (Running, Completed)
                | (Running, Failed)
                | (Running, Suspended)
                | (Suspended, Running)
                | (Suspended, Cancelled)
        )
    }

    /// Validate a transition, returning the new state.
    pub fn transition(self, to: ExecutionState) -> Result<ExecutionState, TransitionError> {
        if self == to {
            return Err(TransitionError::Unchanged { state: self });
        }
        if self.is_terminal() {
            return Err(TransitionError::FromTerminalState { state: self, to });
        }
        if !self.can_transition_to(to) {
            return Err(TransitionError::InvalidTransition { from: self, to });
        }
        Ok(to)
    }
}

impl std::fmt::Display for ExecutionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExecutionState::Pending => write!(f, "PENDING"),
            ExecutionState::Running => write!(f, "RUNNING"),
            ExecutionState::Suspended => write!(f, "SUSPENDED"),
            ExecutionState::Cancelled => write!(f, "CANCELLED"),
            ExecutionState::Failed => write!(f, "FAILED"),
            ExecutionState::Completed => write!(f, "COMPLETED"),
        }
    }
}

/// Rejected state change.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("invalid transition from {from} to {to}")]
    InvalidTransition {
        from: ExecutionState,
        to: ExecutionState,
    },
    #[error("cannot leave terminal state {state} (requested {to})")]
    FromTerminalState {
        state: ExecutionState,
        to: ExecutionState,
    },
    #[error("state is already {state}")]
    Unchanged { state: ExecutionState },
}

/// A point-in-time `(state, percent)` snapshot of a reporter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProgressReport {
    pub state: ExecutionState,
    /// 0 to 100, never decreasing within one reporter's lifetime.
    pub percent: u8,
}

impl ProgressReport {
    pub const PENDING: ProgressReport = ProgressReport {
        state: ExecutionState::Pending,
        percent: 0,
    };

    pub fn new(state: ExecutionState, percent: u8) -> Self {
        Self {
            state,
            percent: percent.min(100),
        }
    }
}

impl Default for ProgressReport {
    fn default() -> Self {
        Self::PENDING
    }
}

impl std::fmt::Display for ProgressReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}%", self.state, self.percent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ExecutionState::*;

    #[test]
    fn test_valid_transitions() {
        assert_eq!(Pending.transition(Running), Ok(Running));
        assert_eq!(Running.transition(Suspended), Ok(Suspended));
        assert_eq!(Suspended.transition(Running), Ok(Running));
        assert_eq!(Suspended.transition(Cancelled), Ok(Cancelled));
        for end in [Cancelled, Completed, Failed] {
            assert!(Running.can_transition_to(end));
        }
    }

    #[test]
    fn test_invalid_transitions() {
        assert_eq!(
            Pending.transition(Completed),
            Err(TransitionError::InvalidTransition {
                from: Pending,
                to: Completed
            })
        );
        assert!(Suspended.transition(Completed).is_err());
        assert!(Running.transition(Pending).is_err());
        assert_eq!(
            Running.transition(Running),
            Err(TransitionError::Unchanged { state: Running })
        );
    }

    #[test]
    fn test_terminal_states_have_no_exits() {
        for terminal in ExecutionState::ALL.into_iter().filter(|s| s.is_terminal()) {
            for to in ExecutionState::ALL {
                assert!(!terminal.can_transition_to(to));
            }
            assert!(matches!(
                terminal.transition(Running),
                Err(TransitionError::FromTerminalState { .. })
            ));
        }
        assert!(!Running.is_terminal());
        assert!(!Suspended.is_terminal());
    }

    #[test]
    fn test_report_serializes_for_listeners() {
        let report = ProgressReport::new(Running, 150);
        assert_eq!(report.percent, 100);
        let json = serde_json::to_string(&report).unwrap();
        assert_eq!(json, r#"{"state":"RUNNING","percent":100}"#);
        assert_eq!(report.to_string(), "RUNNING 100%");
    }
}
