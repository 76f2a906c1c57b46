//! Serial aggregate: children run in order on the calling thread.

use super::{RunOnce, Task, TaskRef};
use crate::error::Result;
use crate::progress::{AggregatingProgressReporter, ReporterRef};
use std::sync::Arc;
use tracing::{debug, warn};

/// Runs its children strictly in list order.
///
/// The first failing child marks the aggregate FAILED and its error is
/// returned as is; later children never run.
pub struct SerialAggregateTask {
    name: String,
    children: Vec<TaskRef>,
    reporter: Arc<AggregatingProgressReporter>,
    once: RunOnce,
}

impl SerialAggregateTask {
    pub fn new(name: impl Into<String>, children: Vec<TaskRef>) -> Self {
        let reporter =
            AggregatingProgressReporter::new(children.iter().map(|c| c.reporter()).collect());
        Self {
            name: name.into(),
            children,
            reporter,
            once: RunOnce::default(),
        }
    }

    pub fn children(&self) -> &[TaskRef] {
        &self.children
    }

    /// Concrete handle to the aggregating reporter.
    pub fn aggregate(&self) -> &Arc<AggregatingProgressReporter> {
        &self.reporter
    }
}

impl Task for SerialAggregateTask {
    fn name(&self) -> &str {
        &self.name
    }

    fn reporter(&self) -> ReporterRef {
        self.reporter.clone()
    }

    fn execute(&self) -> Result<()> {
        self.once.claim(&self.name)?;
        if self.children.is_empty() {
            self.reporter.complete_empty()?;
            return Ok(());
        }

        debug!(task = %self.name, children = self.children.len(), "running serially");
        for child in &self.children {
            if let Err(err) = child.execute() {
                warn!(task = %self.name, child = %child.name(), error = %err, "child failed");
                self.reporter.terminate_with_failure();
                return Err(err);
            }
        }
        Ok(())
    }
}
