//! Upgraph core engine
//!
//! Resolves a graph of version transitions into ordered tasks and runs them
//! while rolling progress and execution state up a reporter hierarchy.
//!
//! # Overview
//!
//! - [`graph`]: versions as nodes, upgrade steps as edges, path extraction.
//! - [`factory`]: graph-based and composite factories producing an
//!   [`UpgradeDefinition`] for a context's current version.
//! - [`task`]: leaf, serial, parallel and delegating tasks plus executors.
//! - [`progress`]: the execution state machine, reporters and aggregation.
//! - [`context`]: the [`UpgradeContext`] contract and its helpers.
//!
//! # Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use upgraph_core::{
//!     ContextRef, Graph, GraphUpgradeDefinitionFactory, SimpleUpgradeContext, Task, TaskRef,
//!     TrivialTask, UpgradeContext, UpgradeDefinitionFactory,
//! };
//! use upgraph_version::Version;
//!
//! let graph = Graph::builder()
//!     .edge(Version::initial(), Version::scalar(0, 0, 1), |_: &ContextRef| {
//!         Arc::new(TrivialTask::new("create tables", || Ok(()))) as TaskRef
//!     })
//!     .build()
//!     .unwrap();
//!
//! let ctx: ContextRef = Arc::new(SimpleUpgradeContext::initial());
//! let factory = GraphUpgradeDefinitionFactory::new(graph);
//! for task in factory.create(&ctx).unwrap().tasks() {
//!     task.execute().unwrap();
//! }
//! assert_eq!(ctx.version().unwrap().to_string(), "\"0.0.1\"");
//! ```

pub mod context;
pub mod error;
pub mod factory;
pub mod graph;
pub mod progress;
pub mod task;

pub use context::{
    ContextRef, FilteredUpgradeContext, Logger, LoggerRegistry, PersistenceRegistry, Registration,
    SimpleUpgradeContext, UpgradeContext, UpgradeContextExt,
};
pub use error::{BoxError, Result, UpgradeError};
pub use factory::{
    CompositeUpgradeDefinitionFactory, FactoryRef, GraphUpgradeDefinitionFactory,
    UpgradeDefinition, UpgradeDefinitionFactory,
};
pub use graph::{Edge, Graph, GraphBuilder, GraphError, TaskFactory};
pub use progress::{
    listener_fn, AggregatingProgressReporter, DefaultExecutionStateAggregator, ExecutionState,
    ExecutionStateAggregator, ListenerRef, ProgressListener, ProgressReport, ProgressReporter,
    RecordingListener, ReporterRef, TickProgressReporter, TransitionError,
};
pub use task::{
    DelegatingTask, Executor, InlineExecutor, JobHandle, LeafTask, ParallelAggregateTask,
    SerialAggregateTask, Task, TaskRef, ThreadPool, ThreadPoolConfig, TrivialTask,
};
