//! Topological ordering by in-degree elimination (Kahn).
//!
//! Zero in-degree nodes are seeded into a FIFO queue in increasing index
//! order, and every node whose in-degree drops to zero is appended to the
//! back. The order is deterministic for a fixed adjacency representation,
//! but it is only one of the valid orders; it need not match a DFS-based
//! ordering.
//!
//! A graph with a cycle leaves some nodes with non-zero in-degree forever.
//! That is reported as `None`, never as an error: on arbitrary input it is
//! an expected outcome, and on a condensation it is the caller's invariant
//! to check.

use std::collections::VecDeque;

use tracing::{debug, instrument};

use crate::graph::Graph;
use crate::metrics::Metrics;

/// Compute a topological order of `dag`.
///
/// Returns `Some(order)` holding every node exactly once when `dag` is
/// acyclic, and `None` otherwise.
#[must_use]
#[instrument(skip(dag), fields(nodes = dag.node_count(), edges = dag.edge_count()))]
pub fn topological_order(dag: &Graph) -> (Option<Vec<usize>>, Metrics) {
    let mut metrics = Metrics::new();
    let n = dag.node_count();
    let mut indeg = dag.in_degrees();

    let mut queue: VecDeque<usize> = VecDeque::with_capacity(n);
    for (node, _) in indeg.iter().enumerate().filter(|&(_, &d)| d == 0) {
        queue.push_back(node);
        metrics.kahn_pushes += 1;
    }

    let mut order = Vec::with_capacity(n);
    metrics.start_timer();
    while let Some(u) = queue.pop_front() {
        metrics.kahn_pops += 1;
        order.push(u);
        for e in dag.neighbors(u) {
            indeg[e.to] -= 1;
            if indeg[e.to] == 0 {
                queue.push_back(e.to);
                metrics.kahn_pushes += 1;
            }
        }
    }
    metrics.stop_timer();

    debug!(
        ordered = order.len(),
        kahn_pushes = metrics.kahn_pushes,
        kahn_pops = metrics.kahn_pops,
        elapsed = %metrics.time_ms(),
        "topological sort complete"
    );

    if order.len() == n {
        (Some(order), metrics)
    } else {
        (None, metrics)
    }
}

/// Return `true` if `order` is a permutation of `dag`'s nodes in which every
/// edge points forward.
#[must_use]
pub fn is_topological_order(dag: &Graph, order: &[usize]) -> bool {
    let n = dag.node_count();
    if order.len() != n {
        return false;
    }
    let mut position = vec![usize::MAX; n];
    for (i, &node) in order.iter().enumerate() {
        if node >= n || position[node] != usize::MAX {
            return false;
        }
        position[node] = i;
    }
    dag.edges().all(|(u, e)| position[u] < position[e.to])
}
