//! Error types for upgrade resolution and execution.

use crate::progress::TransitionError;
use thiserror::Error;
use upgraph_version::{Version, VersionError};

/// Boxed error raised by domain work inside a leaf task.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors raised while resolving or executing an upgrade.
///
/// Wrapping tasks return the error of the failing child unchanged.
#[derive(Debug, Error)]
pub enum UpgradeError {
    /// The persisted version is not the one a step expects to start from.
    #[error("expected version {expected} but store is at {actual}")]
    VersionMismatch {
        /// Source version of the step.
        expected: Version,
        /// Version read from the context.
        actual: Version,
    },

    /// No registered persistence context satisfies the request.
    #[error("no persistence context of type {type_name}{}", qualifier_suffix(.qualifier))]
    PersistenceContextNotFound {
        /// Requested type.
        type_name: &'static str,
        /// Requested qualifier, if any.
        qualifier: Option<String>,
    },

    /// A reporter was driven through a forbidden state change.
    #[error(transparent)]
    Transition(#[from] TransitionError),

    /// A version operation failed on a shape mismatch.
    #[error(transparent)]
    Version(#[from] VersionError),

    /// Tasks run at most once.
    #[error("task {task} has already been executed")]
    AlreadyExecuted {
        /// Name of the task.
        task: String,
    },

    /// The executor refused a job because it was shut down.
    #[error("executor has been shut down")]
    ExecutorShutdown,

    /// A worker dropped a job without reporting a result.
    #[error("worker lost while running task {task}")]
    WorkerLost {
        /// Name of the task.
        task: String,
    },

    /// The context's version is not reachable through the upgrade graph.
    #[error("upgrade from {current} to {target} is not supported")]
    Unsupported {
        /// Version read from the context.
        current: Version,
        /// Target of the factory.
        target: Version,
    },

    /// Domain work inside a task failed.
    #[error("task {task} failed: {source}")]
    Failed {
        /// Name of the task.
        task: String,
        /// Underlying error.
        #[source]
        source: BoxError,
    },
}

impl UpgradeError {
    /// Wrap a domain error raised by the named task.
    pub fn failed(task: impl Into<String>, source: impl Into<BoxError>) -> Self {
        UpgradeError::Failed {
            task: task.into(),
            source: source.into(),
        }
    }
}

fn qualifier_suffix(qualifier: &Option<String>) -> String {
    match qualifier {
        Some(q) => format!(" qualified {:?}", q),
        None => String::new(),
    }
}

/// Result alias for upgrade operations.
pub type Result<T> = std::result::Result<T, UpgradeError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::ExecutionState;

    #[test]
    fn test_messages() {
        let err = UpgradeError::VersionMismatch {
            expected: Version::initial(),
            actual: Version::scalar(0, 0, 1),
        };
        assert_eq!(
            err.to_string(),
            r#"expected version "0.0.0" but store is at "0.0.1""#
        );

        let err = UpgradeError::PersistenceContextNotFound {
            type_name: "Connection",
            qualifier: Some("audit".into()),
        };
        assert_eq!(
            err.to_string(),
            r#"no persistence context of type Connection qualified "audit""#
        );
    }

    #[test]
    fn test_failed_keeps_source() {
        let err = UpgradeError::failed("create-table", "disk full");
        assert_eq!(err.to_string(), "task create-table failed: disk full");
        let source = std::error::Error::source(&err).map(|s| s.to_string());
        assert_eq!(source.as_deref(), Some("disk full"));
    }

    #[test]
    fn test_transition_is_transparent() {
        let err: UpgradeError = TransitionError::Unchanged {
            state: ExecutionState::Running,
        }
        .into();
        assert_eq!(err.to_string(), "state is already RUNNING");
    }
}
