//! Upgraph - schema upgrades over a version graph
//!
//! Describe how a store moves between versions as a graph of steps, then let
//! the [`Upgrader`] resolve the path from the store's current version and run
//! it with hierarchical progress reporting.
//!
//! # Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use upgraph::{
//!     listener_fn, ContextRef, Graph, GraphUpgradeDefinitionFactory, SimpleUpgradeContext,
//!     TaskRef, TrivialTask, Upgrader, Version,
//! };
//!
//! let graph = Graph::builder()
//!     .edge(Version::initial(), Version::scalar(1, 0, 0), |_: &ContextRef| {
//!         Arc::new(TrivialTask::new("create tables", || Ok(()))) as TaskRef
//!     })
//!     .edge(Version::scalar(1, 0, 0), Version::scalar(1, 1, 0), |_: &ContextRef| {
//!         Arc::new(TrivialTask::new("add index", || Ok(()))) as TaskRef
//!     })
//!     .build()
//!     .unwrap();
//!
//! let upgrader = Upgrader::with_factory(GraphUpgradeDefinitionFactory::new(graph))
//!     .with_listener(listener_fn(|report| println!("{}", report)));
//!
//! let ctx: ContextRef = Arc::new(SimpleUpgradeContext::initial());
//! let outcome = upgrader.run(&ctx).unwrap();
//! assert_eq!(outcome.to, Version::scalar(1, 1, 0));
//! ```
//!
//! # Composite stores
//!
//! Independently versioned sub-systems combine through
//! [`CompositeUpgradeDefinitionFactory`]: ordered children share a list
//! version (`["1.0.0", "0.2.0"]`), named children a map version
//! (`{"core": "1.0.0", "search": "0.2.0"}`).

mod config;
mod upgrader;

pub use config::UpgradeConfig;
pub use upgrader::{UpgradeOutcome, Upgrader};

// Re-export the version model
pub use upgraph_version::{parse, ParseError, ScalarVersion, Selector, Shape, Version, VersionError};

// Re-export the engine
pub use upgraph_core::{
    listener_fn, BoxError, CompositeUpgradeDefinitionFactory, ContextRef, DelegatingTask, Edge,
    ExecutionState, Executor, FactoryRef, FilteredUpgradeContext, Graph, GraphBuilder, GraphError,
    GraphUpgradeDefinitionFactory, InlineExecutor, LeafTask, ListenerRef, Logger,
    ParallelAggregateTask, ProgressListener, ProgressReport, ProgressReporter, RecordingListener,
    Registration, Result, SerialAggregateTask, SimpleUpgradeContext, Task, TaskRef, ThreadPool,
    ThreadPoolConfig, TrivialTask, UpgradeContext, UpgradeContextExt, UpgradeDefinition,
    UpgradeDefinitionFactory, UpgradeError,
};

/// Full engine API.
pub mod engine {
    pub use upgraph_core::*;
}
