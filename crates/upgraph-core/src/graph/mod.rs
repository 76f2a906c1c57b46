//! The upgrade graph: versions as nodes, upgrade steps as edges.

use crate::context::ContextRef;
use crate::task::TaskRef;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;
use upgraph_version::{Version, VersionError};

/// Builds the task performing one edge, given the context it will run against.
pub type TaskFactory = Arc<dyn Fn(&ContextRef) -> TaskRef + Send + Sync>;

/// Malformed graph data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    /// Two edges leave the same version.
    #[error("more than one edge leaves {source_version}")]
    DuplicateSource {
        /// The shared source.
        source_version: Version,
    },

    /// An edge does not move strictly forward.
    #[error("edge {source_version} -> {target} does not increase the version")]
    NonMonotonic {
        /// Source of the edge.
        source_version: Version,
        /// Target of the edge.
        target: Version,
    },

    /// Two versions in the graph cannot be ordered.
    #[error("cannot order {left} against {right}: {error}")]
    Incomparable {
        left: Version,
        right: Version,
        error: VersionError,
    },
}

/// A directed, strictly version-increasing step.
#[derive(Clone)]
pub struct Edge {
    source: Version,
    target: Version,
    factory: TaskFactory,
}

impl Edge {
    pub fn new<F>(source: Version, target: Version, factory: F) -> Self
    where
        F: Fn(&ContextRef) -> TaskRef + Send + Sync + 'static,
    {
        Self {
            source,
            target,
            factory: Arc::new(factory),
        }
    }

    pub fn source(&self) -> &Version {
        &self.source
    }

    pub fn target(&self) -> &Version {
        &self.target
    }

    /// Build the task for this step.
    pub fn create_task(&self, ctx: &ContextRef) -> TaskRef {
        (self.factory)(ctx)
    }

    fn check_monotonic(&self) -> Result<(), GraphError> {
        match self.target.compare(&self.source) {
            Ok(Ordering::Greater) => Ok(()),
            Ok(_) => Err(GraphError::NonMonotonic {
                source_version: self.source.clone(),
                target: self.target.clone(),
            }),
            Err(error) => Err(GraphError::Incomparable {
                left: self.target.clone(),
                right: self.source.clone(),
                error,
            }),
        }
    }
}

impl fmt::Debug for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Edge({} -> {})", self.source, self.target)
    }
}

/// Lookup from source version to its unique outgoing edge.
///
/// Built once and read-only afterwards. Construction rejects duplicate
/// sources and edges that do not increase the version.
#[derive(Clone)]
pub struct Graph {
    edges: Vec<Edge>,
    by_source: HashMap<Version, usize>,
    initial: Version,
    terminal: Version,
}

impl Graph {
    pub fn builder() -> GraphBuilder {
        GraphBuilder::default()
    }

    pub fn new(edges: impl IntoIterator<Item = Edge>) -> Result<Self, GraphError> {
        let edges: Vec<Edge> = edges.into_iter().collect();
        let mut by_source = HashMap::with_capacity(edges.len());
        for (index, edge) in edges.iter().enumerate() {
            edge.check_monotonic()?;
            if by_source.insert(edge.source.clone(), index).is_some() {
                return Err(GraphError::DuplicateSource {
                    source_version: edge.source.clone(),
                });
            }
        }

        let (initial, terminal) = match edges.split_first() {
            None => (Version::initial(), Version::initial()),
            Some((first, rest)) => {
                let mut min = first;
                let mut max = first;
                for edge in rest {
                    if ordered(&edge.source, &min.source)? == Ordering::Less {
                        min = edge;
                    }
                    if ordered(&edge.source, &max.source)? == Ordering::Greater {
                        max = edge;
                    }
                }
                (min.source.clone(), max.target.clone())
            }
        };

        Ok(Self {
            edges,
            by_source,
            initial,
            terminal,
        })
    }

    /// Edges in the order they were added.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// The edge leaving `version`, if any.
    pub fn edge_from(&self, version: &Version) -> Option<&Edge> {
        self.by_source.get(version).map(|&i| &self.edges[i])
    }

    /// True if `version` is the source or the target of some edge.
    pub fn contains_node(&self, version: &Version) -> bool {
        self.by_source.contains_key(version) || self.edges.iter().any(|e| e.target == *version)
    }

    /// The smallest source version; INITIAL for an empty graph.
    pub fn initial_version(&self) -> &Version {
        &self.initial
    }

    /// Target of the edge with the greatest source; INITIAL for an empty graph.
    pub fn terminal_version(&self) -> &Version {
        &self.terminal
    }

    /// Follow edges from `start` until no edge leaves the current version.
    ///
    /// # Panics
    ///
    /// If an edge does not move strictly forward. Graphs built through
    /// [`Graph::new`] never do; hitting this means the graph data is corrupt.
    pub fn extract_path(&self, start: &Version) -> Vec<Edge> {
        let mut path = Vec::new();
        let mut current = start.clone();
        while let Some(edge) = self.edge_from(&current) {
            assert!(
                matches!(edge.target.compare(&edge.source), Ok(Ordering::Greater)),
                "edge {} -> {} does not increase the version",
                edge.source,
                edge.target
            );
            path.push(edge.clone());
            current = edge.target.clone();
        }
        debug!(start = %start, steps = path.len(), end = %current, "extracted upgrade path");
        path
    }
}

fn ordered(left: &Version, right: &Version) -> Result<Ordering, GraphError> {
    left.compare(right).map_err(|error| GraphError::Incomparable {
        left: left.clone(),
        right: right.clone(),
        error,
    })
}

impl fmt::Debug for Graph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Graph")
            .field("edges", &self.edges)
            .field("terminal", &self.terminal)
            .finish()
    }
}

/// Collects edges for a [`Graph`].
#[derive(Default)]
pub struct GraphBuilder {
    edges: Vec<Edge>,
}

impl GraphBuilder {
    pub fn edge<F>(mut self, source: Version, target: Version, factory: F) -> Self
    where
        F: Fn(&ContextRef) -> TaskRef + Send + Sync + 'static,
    {
        self.edges.push(Edge::new(source, target, factory));
        self
    }

    pub fn add(mut self, edge: Edge) -> Self {
        self.edges.push(edge);
        self
    }

    pub fn build(self) -> Result<Graph, GraphError> {
        Graph::new(self.edges)
    }
}
