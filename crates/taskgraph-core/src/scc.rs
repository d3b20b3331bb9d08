//! Strongly connected components (Tarjan).
//!
//! # Algorithm
//!
//! Depth-first search from every undiscovered node in increasing index
//! order, tracking a discovery index and a low-link per node plus a stack
//! of nodes whose component is still open. When a node's low-link equals
//! its discovery index it is a component root: the stack is popped down to
//! it and the popped nodes (in pop order) form one component.
//!
//! Components are numbered in the order their roots close. Every edge
//! between two components therefore points from a higher index to a lower
//! one, which callers may rely on for deterministic output given a fixed
//! adjacency order.
//!
//! The search keeps its own stack of `(node, next edge position)` frames
//! instead of recursing, so graph depth is limited by heap memory rather
//! than the native call stack. Discovery indices, low-links and component
//! order are identical to the recursive formulation.

#![allow(clippy::module_name_repetitions)]

use fixedbitset::FixedBitSet;
use serde::Serialize;
use tracing::{debug, instrument};

use crate::graph::Graph;
use crate::metrics::Metrics;

/// Output of an SCC decomposition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SccResult {
    /// Component lists, indexed by component. Members are in pop order.
    pub components: Vec<Vec<usize>>,
    /// Component index of every node.
    pub component_of: Vec<usize>,
}

impl SccResult {
    /// Number of components.
    #[must_use]
    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    /// Members of component `c`, or `None` if `c` is out of range.
    #[must_use]
    pub fn members(&self, c: usize) -> Option<&[usize]> {
        self.components.get(c).map(Vec::as_slice)
    }

    /// Return `true` if `a` and `b` lie in the same component.
    ///
    /// # Panics
    ///
    /// Panics if either node is out of range.
    #[must_use]
    pub fn same_component(&self, a: usize, b: usize) -> bool {
        self.component_of[a] == self.component_of[b]
    }

    /// Number of components with more than one member.
    #[must_use]
    pub fn cycle_count(&self) -> usize {
        self.components.iter().filter(|c| c.len() > 1).count()
    }

    /// Expand a sequence of component indices into original nodes.
    ///
    /// Each component contributes its members in stored order. Unknown
    /// component indices contribute nothing.
    #[must_use]
    pub fn expand(&self, component_path: &[usize]) -> Vec<usize> {
        component_path
            .iter()
            .filter_map(|&c| self.members(c))
            .flatten()
            .copied()
            .collect()
    }
}

/// One suspended DFS call: the node and the next adjacency position to scan.
#[derive(Debug, Clone, Copy)]
struct Frame {
    node: usize,
    next_edge: usize,
}

struct Tarjan {
    counter: usize,
    disc: Vec<Option<usize>>,
    low: Vec<usize>,
    on_stack: FixedBitSet,
    stack: Vec<usize>,
    component_of: Vec<usize>,
    components: Vec<Vec<usize>>,
    metrics: Metrics,
}

impl Tarjan {
    fn new(n: usize) -> Self {
        Self {
            counter: 0,
            disc: vec![None; n],
            low: vec![0; n],
            on_stack: FixedBitSet::with_capacity(n),
            stack: Vec::new(),
            component_of: vec![0; n],
            components: Vec::new(),
            metrics: Metrics::new(),
        }
    }

    fn enter(&mut self, u: usize) {
        self.disc[u] = Some(self.counter);
        self.low[u] = self.counter;
        self.counter += 1;
        self.metrics.dfs_visits += 1;
        self.stack.push(u);
        self.on_stack.insert(u);
    }

    fn run(mut self, g: &Graph) -> (SccResult, Metrics) {
        let mut frames: Vec<Frame> = Vec::new();

        self.metrics.start_timer();
        for root in 0..g.node_count() {
            if self.disc[root].is_some() {
                continue;
            }
            self.enter(root);
            frames.push(Frame {
                node: root,
                next_edge: 0,
            });

            while let Some(frame) = frames.last_mut() {
                let u = frame.node;
                let Some(edge) = g.neighbors(u).get(frame.next_edge) else {
                    // All edges of `u` scanned: return to the caller frame.
                    frames.pop();
                    if let Some(parent) = frames.last() {
                        let p = parent.node;
                        self.low[p] = self.low[p].min(self.low[u]);
                    }
                    if self.disc[u] == Some(self.low[u]) {
                        self.close_component(u);
                    }
                    continue;
                };
                frame.next_edge += 1;
                self.metrics.dfs_edges += 1;

                let v = edge.to;
                match self.disc[v] {
                    None => {
                        self.enter(v);
                        frames.push(Frame {
                            node: v,
                            next_edge: 0,
                        });
                    }
                    Some(dv) if self.on_stack.contains(v) => {
                        self.low[u] = self.low[u].min(dv);
                    }
                    // Already assigned to a closed component.
                    Some(_) => {}
                }
            }
        }
        self.metrics.stop_timer();

        (
            SccResult {
                components: self.components,
                component_of: self.component_of,
            },
            self.metrics,
        )
    }

    fn close_component(&mut self, root: usize) {
        let id = self.components.len();
        let mut component = Vec::new();
        while let Some(w) = self.stack.pop() {
            self.on_stack.set(w, false);
            self.component_of[w] = id;
            component.push(w);
            if w == root {
                break;
            }
        }
        self.components.push(component);
    }
}

/// Partition `g` into strongly connected components.
///
/// Total over any finite graph. For undirected graphs the components are
/// the connected components.
#[must_use]
#[instrument(skip(g), fields(nodes = g.node_count(), edges = g.edge_count()))]
pub fn compute_scc(g: &Graph) -> (SccResult, Metrics) {
    let (result, metrics) = Tarjan::new(g.node_count()).run(g);
    debug!(
        components = result.component_count(),
        cycles = result.cycle_count(),
        dfs_visits = metrics.dfs_visits,
        dfs_edges = metrics.dfs_edges,
        elapsed = %metrics.time_ms(),
        "scc decomposition complete"
    );
    (result, metrics)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
