//! Per-consumer loggers backed by `tracing`.

use parking_lot::Mutex;
use std::any::{self, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A named logger handed to upgrade steps.
///
/// Events go through `tracing` with the consumer's type name in the
/// `logger` field, so any subscriber can filter on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Logger {
    name: &'static str,
}

impl Logger {
    pub fn new(name: &'static str) -> Self {
        Self { name }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn debug(&self, message: impl fmt::Display) {
        tracing::debug!(logger = self.name, "{}", message);
    }

    pub fn info(&self, message: impl fmt::Display) {
        tracing::info!(logger = self.name, "{}", message);
    }

    pub fn warn(&self, message: impl fmt::Display) {
        tracing::warn!(logger = self.name, "{}", message);
    }

    pub fn error(&self, message: impl fmt::Display) {
        tracing::error!(logger = self.name, "{}", message);
    }
}

/// Lazily created loggers, one per consumer type, kept for the registry's
/// lifetime.
#[derive(Debug, Default)]
pub struct LoggerRegistry {
    loggers: Mutex<HashMap<TypeId, Arc<Logger>>>,
}

impl LoggerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The logger for a consumer identified by type id and name.
    pub fn get(&self, consumer: TypeId, name: &'static str) -> Arc<Logger> {
        self.loggers
            .lock()
            .entry(consumer)
            .or_insert_with(|| Arc::new(Logger::new(name)))
            .clone()
    }

    /// The logger for consumer type `T`.
    pub fn for_type<T: ?Sized + 'static>(&self) -> Arc<Logger> {
        self.get(TypeId::of::<T>(), any::type_name::<T>())
    }

    pub fn len(&self) -> usize {
        self.loggers.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
