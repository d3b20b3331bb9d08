//! Shortest and longest (critical) paths over a DAG.
//!
//! # Overview
//!
//! Both solvers take a topological order of the DAG and make a single
//! relaxation pass over it. Edges only point forward in that order, so once
//! a node is processed its distance is final; no priority queue is needed
//! and negative weights are harmless.
//!
//! | Mode      | Initial distance                  | Unreached | Relaxation |
//! |-----------|-----------------------------------|-----------|------------|
//! | shortest  | `0` at the source                 | `+inf`    | minimize   |
//! | longest   | `0` at every zero in-degree node  | `-inf`    | maximize   |
//!
//! The order is a precondition: handing in something that is not a
//! topological order of the same DAG yields wrong distances, not an error.
//!
//! # Path reconstruction
//!
//! Each solver records the predecessor that produced a node's final
//! distance. [`reconstruct_path`] walks those parent pointers back to a
//! parentless node and returns the path root first.

#![allow(clippy::module_name_repetitions)]

use serde::Serialize;
use tracing::{debug, instrument};

use crate::error::GraphError;
use crate::graph::Graph;
use crate::metrics::Metrics;

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// Distances and parent pointers from one solver run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PathResult {
    /// Best distance per node. `+inf` (shortest) or `-inf` (longest) means
    /// the node was never reached.
    pub dist: Vec<f64>,
    /// Predecessor on the best path, `None` for path roots and unreached
    /// nodes.
    pub parent: Vec<Option<usize>>,
}

impl PathResult {
    fn filled(n: usize, init: f64) -> Self {
        Self {
            dist: vec![init; n],
            parent: vec![None; n],
        }
    }

    /// Return `true` if `v` holds a finite distance.
    #[must_use]
    pub fn is_reachable(&self, v: usize) -> bool {
        self.dist.get(v).is_some_and(|d| d.is_finite())
    }

    /// Path from its root to `target`, or `None` when `target` is unreached
    /// or out of range.
    #[must_use]
    pub fn path_to(&self, target: usize) -> Option<Vec<usize>> {
        self.is_reachable(target)
            .then(|| reconstruct_path(&self.parent, target))
    }

    /// Node holding the maximum finite distance and that distance.
    ///
    /// Ties go to the lowest index. `None` when no node is reachable.
    #[must_use]
    pub fn critical_endpoint(&self) -> Option<(usize, f64)> {
        self.dist
            .iter()
            .copied()
            .enumerate()
            .filter(|(_, d)| d.is_finite())
            .fold(None, |best, (v, d)| match best {
                Some((_, bd)) if bd >= d => best,
                _ => Some((v, d)),
            })
    }
}

/// The longest path of a DAG.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CriticalPath {
    /// Sum of edge weights along the path.
    pub length: f64,
    /// Last node of the path.
    pub endpoint: usize,
    /// Nodes on the path, root first.
    pub path: Vec<usize>,
}

impl CriticalPath {
    /// Extract the critical path from a longest-path result.
    ///
    /// `None` for an empty graph.
    #[must_use]
    pub fn from_longest(result: &PathResult) -> Option<Self> {
        let (endpoint, length) = result.critical_endpoint()?;
        Some(Self {
            length,
            endpoint,
            path: reconstruct_path(&result.parent, endpoint),
        })
    }
}

// ---------------------------------------------------------------------------
// Solver
// ---------------------------------------------------------------------------

/// Path solver bound to one DAG.
#[derive(Debug, Clone, Copy)]
pub struct PathSolver<'g> {
    dag: &'g Graph,
}

impl<'g> PathSolver<'g> {
    /// Create a solver over `dag`.
    #[must_use]
    pub const fn new(dag: &'g Graph) -> Self {
        Self { dag }
    }

    /// Single-source shortest paths from `source`.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::NodeOutOfRange`] if `source` is not a node.
    #[instrument(skip(self, topo_order), fields(nodes = self.dag.node_count()))]
    pub fn shortest_from(
        &self,
        source: usize,
        topo_order: &[usize],
    ) -> Result<(PathResult, Metrics), GraphError> {
        let n = self.dag.node_count();
        if source >= n {
            return Err(GraphError::NodeOutOfRange {
                node: source,
                node_count: n,
            });
        }

        let mut metrics = Metrics::new();
        let mut result = PathResult::filled(n, f64::INFINITY);
        result.dist[source] = 0.0;

        metrics.start_timer();
        for &u in topo_order {
            let du = result.dist[u];
            if du == f64::INFINITY {
                continue;
            }
            for e in self.dag.neighbors(u) {
                metrics.relaxations += 1;
                let candidate = du + e.weight;
                if result.dist[e.to] > candidate {
                    result.dist[e.to] = candidate;
                    result.parent[e.to] = Some(u);
                }
            }
        }
        metrics.stop_timer();

        debug!(
            source,
            reached = result.dist.iter().filter(|d| d.is_finite()).count(),
            relaxations = metrics.relaxations,
            elapsed = %metrics.time_ms(),
            "shortest paths complete"
        );
        Ok((result, metrics))
    }

    /// Longest paths from every zero in-degree node.
    ///
    /// In-degrees are computed once up front, so the cost is `O(V + E)`.
    #[must_use]
    #[instrument(skip(self, topo_order), fields(nodes = self.dag.node_count()))]
    pub fn longest_path(&self, topo_order: &[usize]) -> (PathResult, Metrics) {
        let n = self.dag.node_count();
        let mut metrics = Metrics::new();
        let mut result = PathResult::filled(n, f64::NEG_INFINITY);

        let indeg = self.dag.in_degrees();
        for &v in topo_order {
            if indeg[v] == 0 {
                result.dist[v] = 0.0;
            }
        }

        metrics.start_timer();
        for &v in topo_order {
            let dv = result.dist[v];
            if dv == f64::NEG_INFINITY {
                continue;
            }
            for e in self.dag.neighbors(v) {
                metrics.relaxations += 1;
                let candidate = dv + e.weight;
                if result.dist[e.to] < candidate {
                    result.dist[e.to] = candidate;
                    result.parent[e.to] = Some(v);
                }
            }
        }
        metrics.stop_timer();

        debug!(
            critical_length = ?result.critical_endpoint().map(|(_, d)| d),
            relaxations = metrics.relaxations,
            elapsed = %metrics.time_ms(),
            "longest paths complete"
        );
        (result, metrics)
    }
}

/// Shortest paths from `source` over `dag` in `topo_order`.
///
/// # Errors
///
/// Returns [`GraphError::NodeOutOfRange`] if `source` is not a node.
pub fn shortest_paths(
    dag: &Graph,
    source: usize,
    topo_order: &[usize],
) -> Result<(PathResult, Metrics), GraphError> {
    PathSolver::new(dag).shortest_from(source, topo_order)
}

/// Longest paths over `dag` in `topo_order`.
#[must_use]
pub fn longest_path(dag: &Graph, topo_order: &[usize]) -> (PathResult, Metrics) {
    PathSolver::new(dag).longest_path(topo_order)
}

/// Walk parent pointers back from `target` and return the path root first.
///
/// A target without a parent yields `[target]`. The walk is capped at
/// `parent.len()` steps, so a malformed parent array cannot loop forever.
///
/// # Panics
///
/// Panics if `target` or any parent index is out of range.
#[must_use]
pub fn reconstruct_path(parent: &[Option<usize>], target: usize) -> Vec<usize> {
    let mut path: Vec<usize> = std::iter::successors(Some(target), |&v| parent[v])
        .take(parent.len())
        .collect();
    path.reverse();
    path
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
