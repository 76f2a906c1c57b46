//! Registry of persistence contexts (connections, stores, clients).
//!
//! A context is registered once under its concrete type and, explicitly,
//! under every capability (trait object type) it should be found by.
//! Lookups scan registrations in order and return the first match.

use crate::error::{Result, UpgradeError};
use std::any::{self, Any, TypeId};
use std::sync::Arc;

/// Type-erased `Arc<T>` for some registered view type `T`.
pub type ErasedContext = Arc<dyn Any + Send + Sync>;

struct View {
    type_id: TypeId,
    type_name: &'static str,
    value: ErasedContext,
}

impl View {
    fn of<T: ?Sized + Send + Sync + 'static>(value: Arc<T>) -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: any::type_name::<T>(),
            value: Arc::new(value),
        }
    }
}

/// One context being registered, with the views it can be found by.
pub struct Registration<T: Send + Sync + 'static> {
    value: Arc<T>,
    qualifier: Option<String>,
    views: Vec<View>,
}

impl<T: Send + Sync + 'static> Registration<T> {
    /// Register `value` under its concrete type.
    pub fn new(value: T) -> Self {
        Self::shared(Arc::new(value))
    }

    /// Register an already shared context.
    pub fn shared(value: Arc<T>) -> Self {
        Self {
            views: vec![View::of(value.clone())],
            value,
            qualifier: None,
        }
    }

    /// Only match lookups that ask for this qualifier.
    pub fn qualified(mut self, qualifier: impl Into<String>) -> Self {
        self.qualifier = Some(qualifier.into());
        self
    }

    /// Also expose the context as `U`, usually a trait object:
    ///
    /// ```rust
    /// # use std::sync::Arc;
    /// # use upgraph_core::context::Registration;
    /// trait Store: Send + Sync {}
    /// struct Memory;
    /// impl Store for Memory {}
    ///
    /// let registration = Registration::new(Memory).with_capability(|m| m as Arc<dyn Store>);
    /// ```
    pub fn with_capability<U, F>(mut self, view: F) -> Self
    where
        U: ?Sized + Send + Sync + 'static,
        F: FnOnce(Arc<T>) -> Arc<U>,
    {
        self.views.push(View::of(view(self.value.clone())));
        self
    }
}

struct Entry {
    qualifier: Option<String>,
    views: Vec<View>,
}

/// Ordered set of persistence context registrations.
#[derive(Default)]
pub struct PersistenceRegistry {
    entries: Vec<Entry>,
}

impl PersistenceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<T: Send + Sync + 'static>(&mut self, registration: Registration<T>) {
        self.entries.push(Entry {
            qualifier: registration.qualifier,
            views: registration.views,
        });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// First registration exposing `type_id` and, if given, carrying
    /// `qualifier`. Without a qualifier any registration matches.
    ///
    /// The returned value is an `Arc<T>` for the requested `T`, boxed as
    /// [`ErasedContext`].
    pub fn find(
        &self,
        type_id: TypeId,
        type_name: &'static str,
        qualifier: Option<&str>,
    ) -> Result<ErasedContext> {
        self.entries
            .iter()
            .filter(|entry| qualifier.is_none() || entry.qualifier.as_deref() == qualifier)
            .flat_map(|entry| entry.views.iter())
            .find(|view| view.type_id == type_id)
            .map(|view| view.value.clone())
            .ok_or_else(|| UpgradeError::PersistenceContextNotFound {
                type_name,
                qualifier: qualifier.map(str::to_string),
            })
    }

    /// Names of every registered view, in registration order.
    pub fn view_names(&self) -> Vec<&'static str> {
        self.entries
            .iter()
            .flat_map(|entry| entry.views.iter().map(|v| v.type_name))
            .collect()
    }

    /// Typed lookup.
    pub fn get<T: ?Sized + Send + Sync + 'static>(&self, qualifier: Option<&str>) -> Result<Arc<T>> {
        let erased = self.find(TypeId::of::<T>(), any::type_name::<T>(), qualifier)?;
        downcast(erased, qualifier)
    }
}

/// Recover the `Arc<T>` stored in an erased context.
pub fn downcast<T: ?Sized + Send + Sync + 'static>(
    erased: ErasedContext,
    qualifier: Option<&str>,
) -> Result<Arc<T>> {
    erased
        .downcast_ref::<Arc<T>>()
        .cloned()
        .ok_or_else(|| UpgradeError::PersistenceContextNotFound {
            type_name: any::type_name::<T>(),
            qualifier: qualifier.map(str::to_string),
        })
}
