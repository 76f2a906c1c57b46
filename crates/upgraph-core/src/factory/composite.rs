//! Factory combining independently versioned sub-systems.

use super::{FactoryRef, UpgradeDefinition, UpgradeDefinitionFactory};
use crate::context::{ContextRef, FilteredUpgradeContext};
use crate::error::Result;
use crate::task::{SerialAggregateTask, TaskRef};
use std::sync::Arc;
use tracing::debug;
use upgraph_version::{Selector, Version};

/// Combines child factories into one composite version.
///
/// Ordered composites map children onto positions of a list version;
/// unordered composites map them onto keys of a map version. Each child sees
/// only its own sub-component through a [`FilteredUpgradeContext`].
pub struct CompositeUpgradeDefinitionFactory {
    layout: Layout,
    children: Vec<(Selector, FactoryRef)>,
}

/// Shape of the composite version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Layout {
    Ordered,
    Unordered,
}

impl CompositeUpgradeDefinitionFactory {
    /// Child `i` owns position `i` of a list version.
    pub fn ordered(children: impl IntoIterator<Item = FactoryRef>) -> Self {
        Self {
            layout: Layout::Ordered,
            children: children
                .into_iter()
                .enumerate()
                .map(|(i, f)| (Selector::Index(i), f))
                .collect(),
        }
    }

    /// Each child owns one key of a map version. A repeated key replaces the
    /// earlier child.
    pub fn unordered<K: Into<String>>(children: impl IntoIterator<Item = (K, FactoryRef)>) -> Self {
        let mut out: Vec<(Selector, FactoryRef)> = Vec::new();
        for (key, factory) in children {
            let selector = Selector::Key(key.into());
            match out.iter_mut().find(|(s, _)| *s == selector) {
                Some(slot) => slot.1 = factory,
                None => out.push((selector, factory)),
            }
        }
        Self {
            layout: Layout::Unordered,
            children: out,
        }
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    fn views<'a>(
        &'a self,
        ctx: &'a ContextRef,
    ) -> impl Iterator<Item = (&'a Selector, &'a FactoryRef, ContextRef)> + 'a {
        self.children.iter().map(move |(selector, factory)| {
            let view: ContextRef = Arc::new(FilteredUpgradeContext::new(ctx.clone(), selector.clone()));
            (selector, factory, view)
        })
    }
}

impl UpgradeDefinitionFactory for CompositeUpgradeDefinitionFactory {
    fn is_upgrade_supported(&self, ctx: &ContextRef) -> Result<bool> {
        for (selector, factory, view) in self.views(ctx) {
            if !factory.is_upgrade_supported(&view)? {
                debug!(child = %selector, "composite child cannot be upgraded");
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn create(&self, ctx: &ContextRef) -> Result<UpgradeDefinition> {
        let mut tasks: Vec<TaskRef> = Vec::new();
        for (selector, factory, view) in self.views(ctx) {
            let definition = factory.create(&view)?;
            if definition.is_empty() {
                continue;
            }
            debug!(child = %selector, steps = definition.len(), "composite child resolved");
            tasks.push(Arc::new(SerialAggregateTask::new(
                selector.to_string(),
                definition.into_tasks(),
            )));
        }
        Ok(UpgradeDefinition::new(tasks))
    }

    fn target_version(&self) -> Version {
        let targets = self.children.iter().map(|(s, f)| (s, f.target_version()));
        match self.layout {
            Layout::Ordered => Version::list(targets.map(|(_, v)| v)),
            Layout::Unordered => Version::map(targets.filter_map(|(s, v)| match s {
                Selector::Key(k) => Some((k.clone(), v)),
                Selector::Index(_) => None,
            })),
        }
    }
}
