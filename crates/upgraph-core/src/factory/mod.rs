//! Turning graphs into executable upgrade definitions.

pub mod composite;
pub mod graph_factory;

pub use composite::CompositeUpgradeDefinitionFactory;
pub use graph_factory::GraphUpgradeDefinitionFactory;

use crate::context::ContextRef;
use crate::error::Result;
use crate::task::{SerialAggregateTask, Task, TaskRef};
use std::sync::Arc;
use upgraph_version::Version;

/// Produces the tasks that bring a context's store to a target version.
pub trait UpgradeDefinitionFactory: Send + Sync {
    /// Whether the context's current version can be upgraded (or already is
    /// at the target).
    fn is_upgrade_supported(&self, ctx: &ContextRef) -> Result<bool>;

    /// Resolve the path from the context's current version to the target.
    fn create(&self, ctx: &ContextRef) -> Result<UpgradeDefinition>;

    fn target_version(&self) -> Version;
}

pub type FactoryRef = Arc<dyn UpgradeDefinitionFactory>;

/// An ordered list of tasks making up one resolved upgrade.
#[derive(Default)]
pub struct UpgradeDefinition {
    tasks: Vec<TaskRef>,
}

impl UpgradeDefinition {
    pub fn new(tasks: Vec<TaskRef>) -> Self {
        Self { tasks }
    }

    /// Nothing to do: the store is already at the target.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn tasks(&self) -> &[TaskRef] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn into_tasks(self) -> Vec<TaskRef> {
        self.tasks
    }

    /// Fold the definition into one serial task with a single root reporter.
    pub fn into_task(self, name: impl Into<String>) -> SerialAggregateTask {
        SerialAggregateTask::new(name, self.tasks)
    }
}

impl std::fmt::Debug for UpgradeDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.tasks.iter().map(|t| t.name()))
            .finish()
    }
}
