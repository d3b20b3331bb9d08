#![forbid(unsafe_code)]
//! taskgraph-core library.
//!
//! Structural analysis of weighted task/dependency graphs: strongly
//! connected components, condensation into a DAG, topological ordering,
//! and shortest / longest (critical) paths over the condensation.
//!
//! # Conventions
//!
//! - **Errors**: library operations return typed errors from [`error`];
//!   configuration loading uses `anyhow::Result`.
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `debug!`). Stage
//!   entry points are `#[instrument]`ed.
//! - **Metrics**: every stage returns its own [`metrics::Metrics`] value;
//!   there is no global counter state.
//!
//! # Example
//!
//! ```
//! use taskgraph_core::{Graph, analyze};
//!
//! let mut g = Graph::new(3, true);
//! g.add_edge(0, 1, 1.0)?;
//! g.add_edge(1, 0, 1.0)?;
//! g.add_edge(1, 2, 4.0)?;
//!
//! let analysis = analyze(&g, Some(0))?;
//! assert_eq!(analysis.scc.component_count(), 2);
//! assert_eq!(analysis.critical_path.map(|cp| cp.length), Some(1.0));
//! # Ok::<(), taskgraph_core::GraphError>(())
//! ```

pub mod config;
pub mod dag_path;
pub mod error;
pub mod graph;
pub mod input;
pub mod metrics;
pub mod pipeline;
pub mod scc;
pub mod topo;

pub use dag_path::{CriticalPath, PathResult, PathSolver, longest_path, reconstruct_path, shortest_paths};
pub use error::{GraphError, InputError};
pub use graph::{Edge, Graph};
pub use input::{EdgeSpec, GraphSpec};
pub use metrics::{Metrics, MetricsReport};
pub use pipeline::{Analysis, AnalysisOptions, analyze, analyze_with};
pub use scc::{SccResult, compute_scc};
pub use topo::topological_order;
