//! Delegating task: one inner task plus bookkeeping around it.

use super::{RunOnce, Task, TaskRef};
use crate::error::Result;
use crate::progress::{
    AggregatingProgressReporter, ExecutionState, ProgressReporter, ReporterRef,
    TickProgressReporter,
};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::warn;

type Hook = Box<dyn FnOnce() -> Result<()> + Send>;

/// Wraps a delegate with optional work before and after it.
///
/// The before and after hooks are tracked by an internal two-tick reporter;
/// the task's progress is the equal-weight aggregate of that reporter and the
/// delegate's.
pub struct DelegatingTask {
    name: String,
    delegate: TaskRef,
    internal: Arc<TickProgressReporter>,
    reporter: Arc<AggregatingProgressReporter>,
    before: Mutex<Option<Hook>>,
    after: Mutex<Option<Hook>>,
    once: RunOnce,
}

impl DelegatingTask {
    pub fn new(name: impl Into<String>, delegate: TaskRef) -> Self {
        let internal = Arc::new(TickProgressReporter::new(2));
        let reporter =
            AggregatingProgressReporter::new(vec![internal.clone() as ReporterRef, delegate.reporter()]);
        Self {
            name: name.into(),
            delegate,
            internal,
            reporter,
            before: Mutex::new(None),
            after: Mutex::new(None),
            once: RunOnce::default(),
        }
    }

    /// Work to run before the delegate.
    pub fn with_before<F>(self, hook: F) -> Self
    where
        F: FnOnce() -> Result<()> + Send + 'static,
    {
        *self.before.lock() = Some(Box::new(hook));
        self
    }

    /// Work to run after the delegate succeeded.
    pub fn with_after<F>(self, hook: F) -> Self
    where
        F: FnOnce() -> Result<()> + Send + 'static,
    {
        *self.after.lock() = Some(Box::new(hook));
        self
    }

    pub fn delegate(&self) -> &TaskRef {
        &self.delegate
    }

    fn run(&self) -> Result<()> {
        self.internal.update_state(ExecutionState::Running)?;
        if let Some(hook) = self.before.lock().take() {
            hook()?;
        }
        self.internal.increment();

        self.delegate.execute()?;

        if let Some(hook) = self.after.lock().take() {
            hook()?;
        }
        self.internal.increment();
        self.internal.update_state(ExecutionState::Completed)?;
        Ok(())
    }
}

impl Task for DelegatingTask {
    fn name(&self) -> &str {
        &self.name
    }

    fn reporter(&self) -> ReporterRef {
        self.reporter.clone()
    }

    fn execute(&self) -> Result<()> {
        self.once.claim(&self.name)?;
        self.run().map_err(|err| {
            warn!(task = %self.name, error = %err, "delegating task failed");
            if !self.internal.state().is_terminal() {
                self.internal.update_state(ExecutionState::Failed).ok();
            }
            self.reporter.terminate_with_failure();
            err
        })
    }
}
