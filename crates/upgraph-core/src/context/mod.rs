//! The upgrade context: where tasks read and record the store's version and
//! find loggers and persistence contexts.

pub mod filtered;
pub mod logger;
pub mod persistence;
pub mod simple;

pub use filtered::FilteredUpgradeContext;
pub use logger::{Logger, LoggerRegistry};
pub use persistence::{ErasedContext, PersistenceRegistry, Registration};
pub use simple::SimpleUpgradeContext;

use crate::error::Result;
use std::any::{self, TypeId};
use std::sync::Arc;
use upgraph_version::Version;

/// Access to one store's version and collaborators.
///
/// Implementations are shared between tasks, possibly across threads.
pub trait UpgradeContext: Send + Sync {
    /// The version currently persisted.
    fn version(&self) -> Result<Version>;

    /// Persist a new version.
    fn set_version(&self, version: Version) -> Result<()>;

    /// The logger for a consumer type.
    fn logger(&self, consumer: TypeId, name: &'static str) -> Arc<Logger>;

    /// The first registered persistence context exposing the requested type,
    /// as an erased `Arc<T>`. Fails with
    /// [`UpgradeError::PersistenceContextNotFound`](crate::UpgradeError::PersistenceContextNotFound).
    fn persistence_context(
        &self,
        type_id: TypeId,
        type_name: &'static str,
        qualifier: Option<&str>,
    ) -> Result<ErasedContext>;
}

/// Typed helpers over [`UpgradeContext`].
pub trait UpgradeContextExt: UpgradeContext {
    fn logger_for<T: ?Sized + 'static>(&self) -> Arc<Logger> {
        self.logger(TypeId::of::<T>(), any::type_name::<T>())
    }

    fn persistence<T: ?Sized + Send + Sync + 'static>(&self) -> Result<Arc<T>> {
        let erased = self.persistence_context(TypeId::of::<T>(), any::type_name::<T>(), None)?;
        persistence::downcast(erased, None)
    }

    fn qualified_persistence<T: ?Sized + Send + Sync + 'static>(
        &self,
        qualifier: &str,
    ) -> Result<Arc<T>> {
        let erased =
            self.persistence_context(TypeId::of::<T>(), any::type_name::<T>(), Some(qualifier))?;
        persistence::downcast(erased, Some(qualifier))
    }
}

impl<C: UpgradeContext + ?Sized> UpgradeContextExt for C {}

pub type ContextRef = Arc<dyn UpgradeContext>;
