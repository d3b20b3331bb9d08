//! End-to-end analysis: SCC → condensation → topological order → paths.
//!
//! ```text
//! Graph (may contain cycles)
//!        ↓  scc::compute_scc
//! SccResult (components, component_of)
//!        ↓  Graph::build_condensation
//! condensation DAG (one node per component, unit weights)
//!        ↓  topo::topological_order
//! component order
//!        ↓  dag_path::{shortest_from, longest_path}
//! shortest distances from the source's component, critical path
//! ```
//!
//! Every stage's [`Metrics`] is collected into the returned
//! [`MetricsReport`]. A run either completes or fails as a whole; partial
//! results are never returned.

use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::config::AnalysisConfig;
use crate::dag_path::{CriticalPath, PathResult, PathSolver};
use crate::error::GraphError;
use crate::graph::Graph;
use crate::metrics::{Metrics, MetricsReport};
use crate::scc::{SccResult, compute_scc};
use crate::topo::topological_order;

/// Which optional stages to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalysisOptions {
    /// Run the shortest-path solver when a source is given.
    pub shortest_paths: bool,
    /// Run the longest-path solver.
    pub critical_path: bool,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            shortest_paths: true,
            critical_path: true,
        }
    }
}

impl From<&AnalysisConfig> for AnalysisOptions {
    fn from(config: &AnalysisConfig) -> Self {
        Self {
            shortest_paths: config.shortest_paths,
            critical_path: config.critical_path,
        }
    }
}

/// Shortest paths over the condensation from the source's component.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShortestPaths {
    /// Source node in the original graph.
    pub source: usize,
    /// Component containing `source`; the solver's start node.
    pub source_component: usize,
    /// Component-level distances and parents.
    pub result: PathResult,
}

/// Everything derived from one graph.
#[derive(Debug, Clone)]
pub struct Analysis {
    /// Fingerprint of the input graph.
    pub content_hash: String,
    /// Component decomposition of the input.
    pub scc: SccResult,
    /// Condensation DAG over component indices.
    pub condensation: Graph,
    /// Topological order of the condensation.
    pub order: Vec<usize>,
    /// Shortest paths, when a source was given and the stage enabled.
    pub shortest: Option<ShortestPaths>,
    /// Longest-path distances, when the stage is enabled.
    pub longest: Option<PathResult>,
    /// Critical path of the condensation, when non-empty.
    pub critical_path: Option<CriticalPath>,
    /// Per-stage counters and timings.
    pub metrics: MetricsReport,
}

impl Analysis {
    /// Original nodes in component topological order.
    #[must_use]
    pub fn expanded_order(&self) -> Vec<usize> {
        self.scc.expand(&self.order)
    }

    /// Original nodes along the critical component path.
    #[must_use]
    pub fn expanded_critical_path(&self) -> Option<Vec<usize>> {
        self.critical_path
            .as_ref()
            .map(|cp| self.scc.expand(&cp.path))
    }

    /// Component-level path from the source's component to component
    /// `target`, or `None` when no source was given or `target` is
    /// unreached.
    #[must_use]
    pub fn shortest_path_to(&self, target: usize) -> Option<Vec<usize>> {
        self.shortest.as_ref()?.result.path_to(target)
    }
}

/// Run the full pipeline with every stage enabled.
///
/// # Errors
///
/// See [`analyze_with`].
pub fn analyze(g: &Graph, source: Option<usize>) -> Result<Analysis, GraphError> {
    analyze_with(g, source, AnalysisOptions::default())
}

/// Run the full pipeline.
///
/// # Errors
///
/// Returns [`GraphError::NodeOutOfRange`] for an out-of-range `source`, and
/// [`GraphError::CondensationCycle`] if the condensation cannot be ordered,
/// which would indicate a defect in the decomposition.
#[instrument(skip(g), fields(nodes = g.node_count(), edges = g.edge_count()))]
pub fn analyze_with(
    g: &Graph,
    source: Option<usize>,
    options: AnalysisOptions,
) -> Result<Analysis, GraphError> {
    if let Some(s) = source.filter(|&s| s >= g.node_count()) {
        return Err(GraphError::NodeOutOfRange {
            node: s,
            node_count: g.node_count(),
        });
    }

    let mut report = MetricsReport::default();

    let (scc, m) = compute_scc(g);
    report.record("scc", m);

    let mut m = Metrics::new();
    m.start_timer();
    let condensation =
        Graph::build_condensation(g, &scc.component_of, scc.component_count())?;
    m.stop_timer();
    report.record("condense", m);

    let (order, m) = topological_order(&condensation);
    report.record("topo", m);
    let Some(order) = order else {
        warn!(
            components = condensation.node_count(),
            "condensation failed to sort"
        );
        return Err(GraphError::CondensationCycle {
            component_count: condensation.node_count(),
        });
    };

    let solver = PathSolver::new(&condensation);

    let shortest = match source {
        Some(source) if options.shortest_paths => {
            let source_component = scc.component_of[source];
            let (result, m) = solver.shortest_from(source_component, &order)?;
            report.record("shortest", m);
            Some(ShortestPaths {
                source,
                source_component,
                result,
            })
        }
        _ => None,
    };

    let (longest, critical_path) = if options.critical_path {
        let (result, m) = solver.longest_path(&order);
        report.record("longest", m);
        let cp = CriticalPath::from_longest(&result);
        (Some(result), cp)
    } else {
        (None, None)
    };

    info!(
        components = scc.component_count(),
        cycles = scc.cycle_count(),
        condensation_edges = condensation.edge_count(),
        critical_length = ?critical_path.as_ref().map(|cp| cp.length),
        "analysis complete"
    );

    Ok(Analysis {
        content_hash: g.content_hash(),
        scc,
        condensation,
        order,
        shortest,
        longest,
        critical_path,
        metrics: report,
    })
}
