//! Factory resolving a single graph.

use super::{UpgradeDefinition, UpgradeDefinitionFactory};
use crate::context::ContextRef;
use crate::error::{Result, UpgradeError};
use crate::graph::{Edge, Graph};
use crate::task::{SerialAggregateTask, TaskRef, TrivialTask};
use std::sync::Arc;
use tracing::{debug, info};
use upgraph_version::Version;

/// Resolves upgrades along one [`Graph`].
///
/// Every edge on the path becomes a serial task of three steps: check that
/// the store is at the edge's source and record the transition marker, run
/// the edge's task, then record the edge's target.
#[derive(Debug, Clone)]
pub struct GraphUpgradeDefinitionFactory {
    graph: Arc<Graph>,
}

impl GraphUpgradeDefinitionFactory {
    pub fn new(graph: impl Into<Arc<Graph>>) -> Self {
        Self {
            graph: graph.into(),
        }
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    fn step(edge: &Edge, ctx: &ContextRef) -> TaskRef {
        let source = edge.source().clone();
        let target = edge.target().clone();
        let name = format!("{} -> {}", source, target);

        let begin = {
            let ctx = ctx.clone();
            let (source, target) = (source.clone(), target.clone());
            TrivialTask::new(format!("begin {}", name), move || {
                let actual = ctx.version()?;
                if actual != source {
                    return Err(UpgradeError::VersionMismatch {
                        expected: source,
                        actual,
                    });
                }
                let marker = source.transition_to(&target)?;
                info!(from = %source, marker = %marker, "recording transition");
                ctx.set_version(marker)
            })
        };

        let finish = {
            let ctx = ctx.clone();
            TrivialTask::new(format!("finish {}", name), move || {
                info!(version = %target, "recording version");
                ctx.set_version(target)
            })
        };

        let work = edge.create_task(ctx);
        Arc::new(SerialAggregateTask::new(
            name,
            vec![Arc::new(begin), work, Arc::new(finish)],
        ))
    }
}

impl From<Graph> for GraphUpgradeDefinitionFactory {
    fn from(graph: Graph) -> Self {
        Self::new(graph)
    }
}

impl UpgradeDefinitionFactory for GraphUpgradeDefinitionFactory {
    fn is_upgrade_supported(&self, ctx: &ContextRef) -> Result<bool> {
        let current = ctx.version()?;
        Ok(self.graph.contains_node(&current) || current == *self.graph.terminal_version())
    }

    fn create(&self, ctx: &ContextRef) -> Result<UpgradeDefinition> {
        let current = ctx.version()?;
        let terminal = self.graph.terminal_version();
        if current == *terminal {
            debug!(version = %current, "already at target");
            return Ok(UpgradeDefinition::empty());
        }
        if !self.graph.contains_node(&current) {
            return Err(UpgradeError::Unsupported {
                current,
                target: terminal.clone(),
            });
        }

        let tasks: Vec<TaskRef> = self
            .graph
            .extract_path(&current)
            .iter()
            .map(|edge| Self::step(edge, ctx))
            .collect();
        debug!(from = %current, to = %terminal, steps = tasks.len(), "resolved upgrade");
        Ok(UpgradeDefinition::new(tasks))
    }

    fn target_version(&self) -> Version {
        self.graph.terminal_version().clone()
    }
}
