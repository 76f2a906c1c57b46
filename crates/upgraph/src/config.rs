//! Upgrade runner configuration.

/// Configuration for an [`Upgrader`](crate::Upgrader).
#[derive(Debug, Clone, Default)]
pub struct UpgradeConfig {
    /// Resolve and report the plan without executing any task.
    pub dry_run: bool,
    /// Fail with `UpgradeError::Unsupported` when the store's version is not
    /// reachable, instead of returning an outcome with nothing executed.
    pub require_supported: bool,
    /// Name of the root task wrapping the whole upgrade.
    pub root_name: Option<String>,
}

impl UpgradeConfig {
    /// Configuration that fails on unsupported versions.
    pub fn strict() -> Self {
        Self {
            require_supported: true,
            ..Default::default()
        }
    }

    /// Set dry-run mode.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Set whether unsupported versions are an error.
    pub fn require_supported(mut self, require: bool) -> Self {
        self.require_supported = require;
        self
    }

    /// Set the root task name.
    pub fn root_name(mut self, name: impl Into<String>) -> Self {
        self.root_name = Some(name.into());
        self
    }

    pub(crate) fn root_task_name(&self) -> &str {
        self.root_name.as_deref().unwrap_or("upgrade")
    }
}
