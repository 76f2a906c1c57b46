//! In-memory upgrade context.

use super::logger::{Logger, LoggerRegistry};
use super::persistence::{ErasedContext, PersistenceRegistry, Registration};
use super::UpgradeContext;
use crate::error::Result;
use parking_lot::Mutex;
use std::any::TypeId;
use std::sync::Arc;
use tracing::info;
use upgraph_version::Version;

/// Keeps the version in memory and remembers every version recorded.
///
/// Embedders with a real store usually implement [`UpgradeContext`]
/// themselves; this one serves tests and dry runs.
pub struct SimpleUpgradeContext {
    version: Mutex<Version>,
    history: Mutex<Vec<Version>>,
    loggers: LoggerRegistry,
    persistence: PersistenceRegistry,
}

impl SimpleUpgradeContext {
    pub fn new(version: Version) -> Self {
        Self {
            version: Mutex::new(version),
            history: Mutex::new(Vec::new()),
            loggers: LoggerRegistry::new(),
            persistence: PersistenceRegistry::new(),
        }
    }

    /// A context for a store nothing has been applied to.
    pub fn initial() -> Self {
        Self::new(Version::initial())
    }

    pub fn with_persistence<T: Send + Sync + 'static>(mut self, registration: Registration<T>) -> Self {
        self.persistence.register(registration);
        self
    }

    /// Every version passed to `set_version`, oldest first.
    pub fn history(&self) -> Vec<Version> {
        self.history.lock().clone()
    }

    pub fn into_shared(self) -> Arc<Self> {
        Arc::new(self)
    }
}

impl Default for SimpleUpgradeContext {
    fn default() -> Self {
        Self::initial()
    }
}

impl UpgradeContext for SimpleUpgradeContext {
    fn version(&self) -> Result<Version> {
        Ok(self.version.lock().clone())
    }

    fn set_version(&self, version: Version) -> Result<()> {
        info!(version = %version, "recording version");
        self.history.lock().push(version.clone());
        *self.version.lock() = version;
        Ok(())
    }

    fn logger(&self, consumer: TypeId, name: &'static str) -> Arc<Logger> {
        self.loggers.get(consumer, name)
    }

    fn persistence_context(
        &self,
        type_id: TypeId,
        type_name: &'static str,
        qualifier: Option<&str>,
    ) -> Result<ErasedContext> {
        self.persistence.find(type_id, type_name, qualifier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::UpgradeContextExt;

    struct Schema(u32);

    #[test]
    fn test_version_and_history() {
        let ctx = SimpleUpgradeContext::initial();
        assert!(ctx.version().unwrap().is_initial());

        ctx.set_version(Version::scalar(0, 0, 1)).unwrap();
        ctx.set_version(Version::scalar(0, 0, 2)).unwrap();
        assert_eq!(ctx.version().unwrap(), Version::scalar(0, 0, 2));
        assert_eq!(
            ctx.history(),
            vec![Version::scalar(0, 0, 1), Version::scalar(0, 0, 2)]
        );
    }

    #[test]
    fn test_typed_helpers() {
        let ctx = SimpleUpgradeContext::initial().with_persistence(Registration::new(Schema(7)));
        assert_eq!(ctx.persistence::<Schema>().unwrap().0, 7);
        assert!(ctx.qualified_persistence::<Schema>("other").is_err());

        let a = ctx.logger_for::<Schema>();
        let b = ctx.logger_for::<Schema>();
        assert!(Arc::ptr_eq(&a, &b));
    }
}
