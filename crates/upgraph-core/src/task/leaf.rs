//! Leaf tasks: domain work driving a tick reporter.

use super::{RunOnce, Task};
use crate::error::Result;
use crate::progress::{ExecutionState, ProgressReporter, ReporterRef, TickProgressReporter};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, warn};

type LeafWork = Box<dyn FnOnce(&TickProgressReporter) -> Result<()> + Send>;

/// A task running one closure against its own tick reporter.
///
/// The closure may call [`TickProgressReporter::increment`] and may set
/// terminal states itself. Whatever it leaves non-terminal is finished here:
/// COMPLETED on success, FAILED on error.
pub struct LeafTask {
    name: String,
    reporter: Arc<TickProgressReporter>,
    work: Mutex<Option<LeafWork>>,
    once: RunOnce,
}

impl LeafTask {
    /// A leaf expecting `ticks` increments.
    pub fn new<F>(name: impl Into<String>, ticks: u64, work: F) -> Self
    where
        F: FnOnce(&TickProgressReporter) -> Result<()> + Send + 'static,
    {
        Self::with_reporter(name, TickProgressReporter::new(ticks), work)
    }

    /// A leaf whose amount of work is not known up front.
    pub fn unknown<F>(name: impl Into<String>, work: F) -> Self
    where
        F: FnOnce(&TickProgressReporter) -> Result<()> + Send + 'static,
    {
        Self::with_reporter(name, TickProgressReporter::unknown(), work)
    }

    fn with_reporter<F>(name: impl Into<String>, reporter: TickProgressReporter, work: F) -> Self
    where
        F: FnOnce(&TickProgressReporter) -> Result<()> + Send + 'static,
    {
        Self {
            name: name.into(),
            reporter: Arc::new(reporter),
            work: Mutex::new(Some(Box::new(work))),
            once: RunOnce::default(),
        }
    }

    /// Concrete handle to the tick reporter.
    pub fn ticks(&self) -> &Arc<TickProgressReporter> {
        &self.reporter
    }
}

impl Task for LeafTask {
    fn name(&self) -> &str {
        &self.name
    }

    fn reporter(&self) -> ReporterRef {
        self.reporter.clone()
    }

    fn execute(&self) -> Result<()> {
        self.once.claim(&self.name)?;
        let Some(work) = self.work.lock().take() else {
            return Ok(());
        };

        debug!(task = %self.name, "starting");
        self.reporter.update_state(ExecutionState::Running)?;
        match work(&self.reporter) {
            Ok(()) => {
                if !self.reporter.state().is_terminal() {
                    self.reporter.update_state(ExecutionState::Completed)?;
                }
                debug!(task = %self.name, "completed");
                Ok(())
            }
            Err(err) => {
                warn!(task = %self.name, error = %err, "failed");
                if !self.reporter.state().is_terminal() {
                    self.reporter.update_state(ExecutionState::Failed)?;
                }
                Err(err)
            }
        }
    }
}

/// A zero-argument unit of work adapted to a one-tick leaf.
pub struct TrivialTask(LeafTask);

impl TrivialTask {
    pub fn new<F>(name: impl Into<String>, work: F) -> Self
    where
        F: FnOnce() -> Result<()> + Send + 'static,
    {
        TrivialTask(LeafTask::new(name, 1, move |ticks| {
            work()?;
            ticks.increment();
            Ok(())
        }))
    }
}

impl Task for TrivialTask {
    fn name(&self) -> &str {
        self.0.name()
    }

    fn reporter(&self) -> ReporterRef {
        self.0.reporter()
    }

    fn execute(&self) -> Result<()> {
        self.0.execute()
    }
}
