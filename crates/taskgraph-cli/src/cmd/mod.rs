pub mod analyze;
pub mod check;
pub mod condense;

use std::path::Path;

use anyhow::Context;
use taskgraph_core::{Graph, GraphSpec};

/// Read, validate and build the graph described by `path`.
pub fn load_graph(path: &Path) -> anyhow::Result<(GraphSpec, Graph)> {
    let spec = GraphSpec::from_path(path)
        .with_context(|| format!("failed to load graph from {}", path.display()))?;
    let graph = spec
        .to_graph()
        .with_context(|| format!("failed to build graph from {}", path.display()))?;
    Ok((spec, graph))
}
