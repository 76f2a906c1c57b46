//! The upgrade runner: check, resolve, execute.

use crate::config::UpgradeConfig;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};
use upgraph_core::{
    ContextRef, FactoryRef, ListenerRef, ProgressReport, Result, Task, UpgradeDefinition,
    UpgradeContext, UpgradeDefinitionFactory, UpgradeError,
};
use upgraph_version::Version;

/// What an upgrade run did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpgradeOutcome {
    /// Version read before anything ran.
    pub from: Version,
    /// Version read after the run (equal to `from` for dry runs).
    pub to: Version,
    /// Target of the factory.
    pub target: Version,
    /// Top-level tasks the resolved definition contained.
    pub planned: usize,
    /// Top-level tasks executed.
    pub tasks_executed: usize,
    /// Whether the upgrade could be resolved at all.
    pub supported: bool,
    pub dry_run: bool,
    /// Final report of the root task, if one ran.
    pub report: Option<ProgressReport>,
}

impl UpgradeOutcome {
    /// True when the store ended at the target.
    pub fn is_up_to_date(&self) -> bool {
        self.to == self.target
    }
}

/// Runs one factory against contexts, forwarding progress to listeners.
pub struct Upgrader {
    factory: FactoryRef,
    config: UpgradeConfig,
    listeners: Vec<ListenerRef>,
}

impl Upgrader {
    pub fn new(factory: impl Into<FactoryRef>, config: UpgradeConfig) -> Self {
        Self {
            factory: factory.into(),
            config,
            listeners: Vec::new(),
        }
    }

    /// Runner with the default configuration.
    pub fn with_factory<F: UpgradeDefinitionFactory + 'static>(factory: F) -> Self {
        Self::new(Arc::new(factory) as FactoryRef, UpgradeConfig::default())
    }

    /// Deliver the root task's progress to `listener`.
    pub fn with_listener(mut self, listener: ListenerRef) -> Self {
        self.listeners.push(listener);
        self
    }

    pub fn config(&self) -> &UpgradeConfig {
        &self.config
    }

    pub fn target_version(&self) -> Version {
        self.factory.target_version()
    }

    /// Resolve the tasks for `ctx` without running them.
    pub fn plan(&self, ctx: &ContextRef) -> Result<UpgradeDefinition> {
        self.factory.create(ctx)
    }

    /// Bring the store behind `ctx` to the target version.
    pub fn run(&self, ctx: &ContextRef) -> Result<UpgradeOutcome> {
        let from = ctx.version()?;
        let target = self.factory.target_version();
        let mut outcome = UpgradeOutcome {
            from: from.clone(),
            to: from.clone(),
            target: target.clone(),
            planned: 0,
            tasks_executed: 0,
            supported: true,
            dry_run: self.config.dry_run,
            report: None,
        };

        if !self.factory.is_upgrade_supported(ctx)? {
            if self.config.require_supported {
                return Err(UpgradeError::Unsupported {
                    current: from,
                    target,
                });
            }
            warn!(current = %from, target = %target, "upgrade not supported, skipping");
            outcome.supported = false;
            return Ok(outcome);
        }

        let definition = self.factory.create(ctx)?;
        outcome.planned = definition.len();
        if definition.is_empty() {
            info!(version = %from, "store is up to date");
            return Ok(outcome);
        }
        if self.config.dry_run {
            info!(from = %from, to = %target, tasks = ?definition, "dry run, nothing executed");
            return Ok(outcome);
        }

        info!(from = %from, to = %target, tasks = outcome.planned, "upgrading");
        let root = definition.into_task(self.config.root_task_name());
        for listener in &self.listeners {
            root.add_listener(listener.clone());
        }
        root.execute()?;

        outcome.tasks_executed = root.children().len();
        outcome.report = Some(root.report());
        outcome.to = ctx.version()?;
        info!(version = %outcome.to, "upgrade finished");
        Ok(outcome)
    }
}
