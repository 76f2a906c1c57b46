//! Parallel aggregate: children run concurrently on a caller-owned executor.

use super::executor::{Executor, JobHandle};
use super::{RunOnce, Task, TaskRef};
use crate::error::Result;
use crate::progress::{AggregatingProgressReporter, ReporterRef};
use std::sync::Arc;
use tracing::{debug, warn};

/// Submits every child to an executor, then waits for each in submission
/// order.
///
/// The first wait that returns an error marks the aggregate FAILED and that
/// error is returned immediately. Children already submitted keep running;
/// they are not cancelled.
pub struct ParallelAggregateTask {
    name: String,
    children: Vec<TaskRef>,
    executor: Arc<dyn Executor>,
    reporter: Arc<AggregatingProgressReporter>,
    once: RunOnce,
}

impl ParallelAggregateTask {
    pub fn new(name: impl Into<String>, children: Vec<TaskRef>, executor: Arc<dyn Executor>) -> Self {
        let reporter =
            AggregatingProgressReporter::new(children.iter().map(|c| c.reporter()).collect());
        Self {
            name: name.into(),
            children,
            executor,
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

    fn fail<T>(&self, err: crate::error::UpgradeError) -> Result<T> {
        warn!(task = %self.name, error = %err, "parallel child failed");
        self.reporter.terminate_with_failure();
        Err(err)
    }
}

impl Task for ParallelAggregateTask {
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

        debug!(task = %self.name, children = self.children.len(), "submitting in parallel");
        let mut handles: Vec<JobHandle> = Vec::with_capacity(self.children.len());
        for child in &self.children {
            let job_child = child.clone();
            match self
                .executor
                .submit(child.name(), Box::new(move || job_child.execute()))
            {
                Ok(handle) => handles.push(handle),
                Err(err) => return self.fail(err),
            }
        }

        for handle in handles {
            if let Err(err) = handle.join() {
                return self.fail(err);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::UpgradeError;
    use crate::progress::{ExecutionState, ProgressReport};
    use crate::task::{InlineExecutor, TrivialTask};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_inline_parallel_completes() {
        let count = Arc::new(AtomicUsize::new(0));
        let children: Vec<TaskRef> = (0..3)
            .map(|i| {
                let count = count.clone();
                Arc::new(TrivialTask::new(format!("t{}", i), move || {
                    count.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                })) as TaskRef
            })
            .collect();
        let task = ParallelAggregateTask::new("parallel", children, Arc::new(InlineExecutor));

        task.execute().unwrap();
        assert_eq!(count.load(Ordering::SeqCst), 3);
        assert_eq!(task.report(), ProgressReport::new(ExecutionState::Completed, 100));
    }

    #[test]
    fn test_first_failure_in_submission_order_wins() {
        let children: Vec<TaskRef> = vec![
            Arc::new(TrivialTask::new("ok", || Ok(()))),
            Arc::new(TrivialTask::new("first", || Err(UpgradeError::failed("first", "x")))),
            Arc::new(TrivialTask::new("second", || Err(UpgradeError::failed("second", "y")))),
        ];
        let task = ParallelAggregateTask::new("parallel", children, Arc::new(InlineExecutor));

        let err = task.execute().unwrap_err();
        assert!(matches!(err, UpgradeError::Failed { ref task, .. } if task == "first"));
        assert_eq!(task.report().state, ExecutionState::Failed);
    }

    #[test]
    fn test_empty_parallel_completes() {
        let task = ParallelAggregateTask::new("empty", Vec::new(), Arc::new(InlineExecutor));
        task.execute().unwrap();
        assert_eq!(task.report().state, ExecutionState::Completed);
    }
}
