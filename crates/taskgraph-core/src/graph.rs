//! Adjacency-list weighted graph and SCC contraction.
//!
//! # Overview
//!
//! [`Graph`] is the single graph representation shared by every stage of the
//! pipeline. Nodes are dense indices in `[0, n)`; each node owns an ordered
//! list of outgoing [`Edge`]s. Edge order is insertion order and is
//! observable: the SCC search, the topological sorter and the path solvers
//! all walk adjacency lists front to back, which is what makes their output
//! deterministic.
//!
//! ## Undirected graphs
//!
//! An undirected graph stores every inserted edge twice, once in each
//! endpoint's list, with the same weight.
//!
//! ## Condensation
//!
//! [`Graph::build_condensation`] contracts each strongly connected component
//! to one node. The result is a fresh directed graph; the input is never
//! mutated.

#![allow(clippy::module_name_repetitions)]

use std::collections::HashSet;

use petgraph::graph::DiGraph;
use serde::Serialize;

use crate::error::GraphError;

/// Weight given to every edge of a condensation.
pub const CONDENSATION_EDGE_WEIGHT: f64 = 1.0;

/// An outgoing edge: target node and weight.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Edge {
    /// Target node index.
    pub to: usize,
    /// Edge weight.
    pub weight: f64,
}

/// Weighted graph over nodes `0..n`, directed or undirected.
#[derive(Debug, Clone, PartialEq)]
pub struct Graph {
    directed: bool,
    adj: Vec<Vec<Edge>>,
}

impl Graph {
    /// Create a graph with `n` nodes and no edges.
    #[must_use]
    pub fn new(n: usize, directed: bool) -> Self {
        Self {
            directed,
            adj: vec![Vec::new(); n],
        }
    }

    /// Number of nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.adj.len()
    }

    /// Total number of stored adjacency entries.
    ///
    /// For undirected graphs each inserted edge is counted twice.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.adj.iter().map(Vec::len).sum()
    }

    /// Whether edges are directed.
    #[must_use]
    pub const fn is_directed(&self) -> bool {
        self.directed
    }

    /// Outgoing edges of `u`, in insertion order.
    ///
    /// # Panics
    ///
    /// Panics if `u` is out of range.
    #[must_use]
    pub fn neighbors(&self, u: usize) -> &[Edge] {
        &self.adj[u]
    }

    /// Iterate `(source, edge)` pairs node by node, edge by edge.
    pub fn edges(&self) -> impl Iterator<Item = (usize, &Edge)> + '_ {
        self.adj
            .iter()
            .enumerate()
            .flat_map(|(u, out)| out.iter().map(move |e| (u, e)))
    }

    /// Insert an edge `u → v` with weight `w`.
    ///
    /// Undirected graphs also receive `v → u` with the same weight.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::NodeOutOfRange`] if either endpoint is not a
    /// node of this graph. The graph is left unchanged.
    pub fn add_edge(&mut self, u: usize, v: usize, w: f64) -> Result<(), GraphError> {
        self.check_node(u)?;
        self.check_node(v)?;

        self.adj[u].push(Edge { to: v, weight: w });
        if !self.directed {
            self.adj[v].push(Edge { to: u, weight: w });
        }
        Ok(())
    }

    /// In-degree of every node, computed with one scan of all edges.
    #[must_use]
    pub fn in_degrees(&self) -> Vec<usize> {
        let mut indeg = vec![0usize; self.node_count()];
        for (_, e) in self.edges() {
            indeg[e.to] += 1;
        }
        indeg
    }

    /// Contract `g` along a component map.
    ///
    /// The result is a directed graph with `component_count` nodes holding
    /// one edge `a → b` (weight [`CONDENSATION_EDGE_WEIGHT`]) for every
    /// ordered pair of distinct components joined by at least one edge of
    /// `g`. Edges are inserted in the order their pair is first seen while
    /// walking `g` node by node, edge by edge.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::ComponentMapLength`] when `component_of` does
    /// not have one entry per node of `g`, and
    /// [`GraphError::ComponentOutOfRange`] when an entry is not below
    /// `component_count`.
    pub fn build_condensation(
        g: &Self,
        component_of: &[usize],
        component_count: usize,
    ) -> Result<Self, GraphError> {
        if component_of.len() != g.node_count() {
            return Err(GraphError::ComponentMapLength {
                expected: g.node_count(),
                actual: component_of.len(),
            });
        }
        if let Some((node, &component)) = component_of
            .iter()
            .enumerate()
            .find(|&(_, &c)| c >= component_count)
        {
            return Err(GraphError::ComponentOutOfRange {
                node,
                component,
                component_count,
            });
        }

        let mut dag = Self::new(component_count, true);
        let mut added: HashSet<(usize, usize)> = HashSet::new();

        for (u, e) in g.edges() {
            let (a, b) = (component_of[u], component_of[e.to]);
            if a != b && added.insert((a, b)) {
                dag.adj[a].push(Edge {
                    to: b,
                    weight: CONDENSATION_EDGE_WEIGHT,
                });
            }
        }

        Ok(dag)
    }

    /// BLAKE3 fingerprint of the graph structure.
    ///
    /// Covers the directed flag, node count and every adjacency list in
    /// order, so two graphs hash equal iff every stage of the pipeline sees
    /// the same input.
    #[must_use]
    pub fn content_hash(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&[u8::from(self.directed)]);
        hasher.update(&(self.node_count() as u64).to_le_bytes());
        for (u, e) in self.edges() {
            hasher.update(&(u as u64).to_le_bytes());
            hasher.update(&(e.to as u64).to_le_bytes());
            hasher.update(&e.weight.to_le_bytes());
        }
        format!("blake3:{}", hasher.finalize().to_hex())
    }

    /// Export as a petgraph `DiGraph`.
    ///
    /// Node weights are the original indices. Undirected graphs export both
    /// stored directions.
    #[must_use]
    pub fn to_petgraph(&self) -> DiGraph<usize, f64> {
        let mut pg = DiGraph::with_capacity(self.node_count(), self.edge_count());
        let nodes: Vec<_> = (0..self.node_count()).map(|i| pg.add_node(i)).collect();
        for (u, e) in self.edges() {
            pg.add_edge(nodes[u], nodes[e.to], e.weight);
        }
        pg
    }

    const fn check_node(&self, node: usize) -> Result<(), GraphError> {
        if node < self.adj.len() {
            Ok(())
        } else {
            Err(GraphError::NodeOutOfRange {
                node,
                node_count: self.adj.len(),
            })
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn targets(g: &Graph, u: usize) -> Vec<usize> {
        g.neighbors(u).iter().map(|e| e.to).collect()
    }

    #[test]
    fn directed_edge_stored_once() {
        let mut g = Graph::new(3, true);
        g.add_edge(0, 1, 2.5).unwrap();

        assert_eq!(g.edge_count(), 1);
        assert_eq!(g.neighbors(0), &[Edge { to: 1, weight: 2.5 }]);
        assert!(g.neighbors(1).is_empty());
    }

    #[test]
    fn undirected_edge_stored_in_both_lists() {
        let mut g = Graph::new(2, false);
        g.add_edge(0, 1, 4.0).unwrap();

        assert_eq!(g.edge_count(), 2);
        assert_eq!(g.neighbors(0), &[Edge { to: 1, weight: 4.0 }]);
        assert_eq!(g.neighbors(1), &[Edge { to: 0, weight: 4.0 }]);
    }

    #[test]
    fn out_of_range_edge_rejected_without_mutation() {
        let mut g = Graph::new(2, false);
        let err = g.add_edge(0, 2, 1.0).unwrap_err();

        assert_eq!(
            err,
            GraphError::NodeOutOfRange {
                node: 2,
                node_count: 2
            }
        );
        assert_eq!(g.edge_count(), 0, "failed insert must not touch adjacency");
    }

    #[test]
    fn adjacency_preserves_insertion_order() {
        let mut g = Graph::new(4, true);
        g.add_edge(0, 3, 1.0).unwrap();
        g.add_edge(0, 1, 1.0).unwrap();
        g.add_edge(0, 2, 1.0).unwrap();

        assert_eq!(targets(&g, 0), vec![3, 1, 2]);
    }

    #[test]
    fn in_degrees_count_every_edge() {
        let mut g = Graph::new(3, true);
        g.add_edge(0, 2, 1.0).unwrap();
        g.add_edge(1, 2, 1.0).unwrap();
        g.add_edge(0, 1, 1.0).unwrap();

        assert_eq!(g.in_degrees(), vec![0, 1, 2]);
    }

    // -----------------------------------------------------------------------
    // Condensation
    // -----------------------------------------------------------------------

    #[test]
    fn condensation_collapses_duplicate_pairs() {
        // 0,1 in component 0; 2 in component 1. Two edges cross 0 → 1.
        let mut g = Graph::new(3, true);
        g.add_edge(0, 1, 5.0).unwrap();
        g.add_edge(1, 0, 5.0).unwrap();
        g.add_edge(0, 2, 7.0).unwrap();
        g.add_edge(1, 2, 9.0).unwrap();

        let dag = Graph::build_condensation(&g, &[0, 0, 1], 2).unwrap();

        assert!(dag.is_directed());
        assert_eq!(dag.node_count(), 2);
        assert_eq!(dag.edge_count(), 1, "duplicate component pair collapsed");
        assert_eq!(
            dag.neighbors(0),
            &[Edge {
                to: 1,
                weight: CONDENSATION_EDGE_WEIGHT
            }]
        );
    }

    #[test]
    fn condensation_keeps_first_seen_order() {
        let mut g = Graph::new(4, true);
        g.add_edge(0, 3, 1.0).unwrap();
        g.add_edge(0, 2, 1.0).unwrap();
        g.add_edge(0, 1, 1.0).unwrap();
        g.add_edge(1, 3, 1.0).unwrap();

        let dag = Graph::build_condensation(&g, &[0, 1, 2, 3], 4).unwrap();

        assert_eq!(targets(&dag, 0), vec![3, 2, 1]);
        assert_eq!(targets(&dag, 1), vec![3]);
    }

    #[test]
    fn condensation_drops_intra_component_edges() {
        let mut g = Graph::new(2, true);
        g.add_edge(0, 1, 1.0).unwrap();
        g.add_edge(1, 0, 1.0).unwrap();
        g.add_edge(0, 0, 1.0).unwrap();

        let dag = Graph::build_condensation(&g, &[0, 0], 1).unwrap();
        assert_eq!(dag.edge_count(), 0);
    }

    #[test]
    fn condensation_does_not_mutate_input() {
        let mut g = Graph::new(2, true);
        g.add_edge(0, 1, 3.0).unwrap();
        let before = g.clone();

        let _ = Graph::build_condensation(&g, &[0, 1], 2).unwrap();
        assert_eq!(g, before);
    }

    #[test]
    fn condensation_rejects_short_component_map() {
        let g = Graph::new(3, true);
        let err = Graph::build_condensation(&g, &[0, 0], 1).unwrap_err();
        assert_eq!(
            err,
            GraphError::ComponentMapLength {
                expected: 3,
                actual: 2
            }
        );
    }

    #[test]
    fn condensation_rejects_component_past_count() {
        let g = Graph::new(2, true);
        let err = Graph::build_condensation(&g, &[0, 2], 2).unwrap_err();
        assert_eq!(
            err,
            GraphError::ComponentOutOfRange {
                node: 1,
                component: 2,
                component_count: 2
            }
        );
    }

    // -----------------------------------------------------------------------
    // Hashing / export
    // -----------------------------------------------------------------------

    #[test]
    fn content_hash_tracks_edges_and_order() {
        let mut a = Graph::new(3, true);
        a.add_edge(0, 1, 1.0).unwrap();
        a.add_edge(0, 2, 1.0).unwrap();

        let mut b = Graph::new(3, true);
        b.add_edge(0, 2, 1.0).unwrap();
        b.add_edge(0, 1, 1.0).unwrap();

        assert!(a.content_hash().starts_with("blake3:"));
        assert_eq!(a.content_hash(), a.clone().content_hash());
        assert_ne!(a.content_hash(), b.content_hash(), "edge order is part of the hash");
    }

    #[test]
    fn content_hash_distinguishes_directedness() {
        assert_ne!(
            Graph::new(2, true).content_hash(),
            Graph::new(2, false).content_hash()
        );
    }

    #[test]
    fn petgraph_export_matches_structure() {
        let mut g = Graph::new(3, false);
        g.add_edge(0, 1, 2.0).unwrap();
        g.add_edge(1, 2, 3.0).unwrap();

        let pg = g.to_petgraph();
        assert_eq!(pg.node_count(), 3);
        assert_eq!(pg.edge_count(), 4);
    }
}
