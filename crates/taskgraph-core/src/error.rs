//! Typed errors for graph construction and analysis.
//!
//! Only precondition violations are errors. A cyclic graph handed to the
//! topological sorter is an expected `None`, and unreachable nodes are
//! reported through sentinel distances, so neither appears here.

use std::path::PathBuf;

/// Errors raised by graph operations and the analysis pipeline.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    /// A node index fell outside `[0, node_count)`.
    #[error("node {node} out of range for graph with {node_count} nodes")]
    NodeOutOfRange {
        /// Offending node index.
        node: usize,
        /// Number of nodes in the graph.
        node_count: usize,
    },

    /// A component map did not cover the graph it was applied to.
    #[error("component map has {actual} entries, expected {expected}")]
    ComponentMapLength {
        /// Node count of the graph being contracted.
        expected: usize,
        /// Length of the supplied map.
        actual: usize,
    },

    /// A component map referenced a component past `component_count`.
    #[error("node {node} mapped to component {component}, but only {component_count} components exist")]
    ComponentOutOfRange {
        /// Node carrying the bad assignment.
        node: usize,
        /// Component it was assigned to.
        component: usize,
        /// Declared number of components.
        component_count: usize,
    },

    /// The condensation could not be ordered topologically.
    ///
    /// Contracting strongly connected components always yields a DAG, so
    /// this indicates a bug in the decomposition rather than bad input.
    #[error("condensation of {component_count} components is not acyclic")]
    CondensationCycle {
        /// Number of nodes in the condensation.
        component_count: usize,
    },
}

/// Errors raised while loading a graph description.
#[derive(Debug, thiserror::Error)]
pub enum InputError {
    /// The description file could not be read.
    #[error("failed to read graph description {}: {source}", path.display())]
    Io {
        /// Path that failed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The description was not valid JSON for the expected shape.
    #[error("malformed graph description: {0}")]
    Parse(#[from] serde_json::Error),

    /// The description parsed but violated a structural rule.
    #[error("invalid graph description: {0}")]
    Invalid(String),

    /// Building the graph from a validated description failed.
    #[error(transparent)]
    Graph(#[from] GraphError),
}
