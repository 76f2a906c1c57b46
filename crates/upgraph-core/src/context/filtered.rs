//! A view of a context restricted to one sub-component of its version.

use super::logger::Logger;
use super::persistence::ErasedContext;
use super::{ContextRef, UpgradeContext};
use crate::error::Result;
use std::any::TypeId;
use std::sync::Arc;
use upgraph_version::{Selector, Version};

/// Decorator that reads and writes only `selector` of the inner context's
/// version and forwards everything else unchanged.
///
/// Composite factories hand one of these to each child, so a child written
/// against a plain scalar version works inside a list or map. Errors from the
/// inner context are returned as is.
pub struct FilteredUpgradeContext {
    inner: ContextRef,
    selector: Selector,
}

impl FilteredUpgradeContext {
    pub fn new(inner: ContextRef, selector: impl Into<Selector>) -> Self {
        Self {
            inner,
            selector: selector.into(),
        }
    }

    pub fn selector(&self) -> &Selector {
        &self.selector
    }

    pub fn inner(&self) -> &ContextRef {
        &self.inner
    }
}

impl UpgradeContext for FilteredUpgradeContext {
    fn version(&self) -> Result<Version> {
        Ok(self.inner.version()?.get(self.selector.clone())?)
    }

    fn set_version(&self, version: Version) -> Result<()> {
        let mut outer = self.inner.version()?;
        if let Selector::Index(index) = self.selector {
            // Positions before this one that were never recorded read as INITIAL.
            while outer.len() < index {
                outer = outer.replace(outer.len(), Version::initial())?;
            }
        }
        let outer = outer.replace(self.selector.clone(), version)?;
        self.inner.set_version(outer)
    }

    fn logger(&self, consumer: TypeId, name: &'static str) -> Arc<Logger> {
        self.inner.logger(consumer, name)
    }

    fn persistence_context(
        &self,
        type_id: TypeId,
        type_name: &'static str,
        qualifier: Option<&str>,
    ) -> Result<ErasedContext> {
        self.inner.persistence_context(type_id, type_name, qualifier)
    }
}
