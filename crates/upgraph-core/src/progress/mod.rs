//! Progress reporting and execution state aggregation.
//!
//! Every task owns one [`ProgressReporter`]. Leaf tasks drive a
//! [`TickProgressReporter`]; aggregate tasks expose an
//! [`AggregatingProgressReporter`] whose state is derived from their
//! children through an [`ExecutionStateAggregator`].

pub mod aggregating;
pub mod aggregator;
pub mod listener;
pub mod reporter;
pub mod state;

pub use aggregating::AggregatingProgressReporter;
pub use aggregator::{DefaultExecutionStateAggregator, ExecutionStateAggregator};
pub use listener::{listener_fn, ListenerRef, ListenerSet, ProgressListener, RecordingListener};
pub use reporter::{ProgressReporter, ReporterRef, TickProgressReporter};
pub use state::{ExecutionState, ProgressReport, TransitionError};
