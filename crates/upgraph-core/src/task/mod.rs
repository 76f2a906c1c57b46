//! Task primitives.
//!
//! A task is a named, single-use unit of work that owns one progress
//! reporter. Leaf tasks do domain work; aggregate tasks compose children and
//! derive their progress from the children's reporters.

pub mod delegating;
pub mod executor;
pub mod leaf;
pub mod parallel;
pub mod serial;

pub use delegating::DelegatingTask;
pub use executor::{Executor, InlineExecutor, Job, JobHandle, ThreadPool, ThreadPoolConfig};
pub use leaf::{LeafTask, TrivialTask};
pub use parallel::ParallelAggregateTask;
pub use serial::SerialAggregateTask;

use crate::error::{Result, UpgradeError};
use crate::progress::{ListenerRef, ProgressReport, ReporterRef};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A single-invocation unit of upgrade work.
pub trait Task: Send + Sync {
    /// Diagnostic name; not an identity.
    fn name(&self) -> &str;

    /// The reporter this task drives.
    fn reporter(&self) -> ReporterRef;

    /// Run to completion. A second call fails with
    /// [`UpgradeError::AlreadyExecuted`].
    fn execute(&self) -> Result<()>;

    fn add_listener(&self, listener: ListenerRef) -> bool {
        self.reporter().add_listener(listener)
    }

    fn remove_listener(&self, listener: &ListenerRef) -> bool {
        self.reporter().remove_listener(listener)
    }

    fn request_progress_report(&self) {
        self.reporter().request_progress_report()
    }

    fn report(&self) -> ProgressReport {
        self.reporter().report()
    }
}

pub type TaskRef = Arc<dyn Task>;

impl std::fmt::Debug for dyn Task {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Task({}, {})", self.name(), self.report())
    }
}

/// Guard enforcing single execution.
#[derive(Debug, Default)]
pub(crate) struct RunOnce(AtomicBool);

impl RunOnce {
    pub(crate) fn claim(&self, task: &str) -> Result<()> {
        if self.0.swap(true, Ordering::SeqCst) {
            return Err(UpgradeError::AlreadyExecuted {
                task: task.to_string(),
            });
        }
        Ok(())
    }
}
