//! `tg check`: validate a graph file and test whether it is already a DAG.

use std::io::Write;
use std::path::PathBuf;

use clap::Args;
use serde::Serialize;
use taskgraph_core::{MetricsReport, topological_order};

use crate::output::{OutputMode, format_nodes, pretty_kv, pretty_section, render_mode};

/// Arguments for `tg check`.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Graph description (JSON).
    #[arg(value_name = "FILE")]
    pub file: PathBuf,
}

#[derive(Debug, Serialize)]
struct CheckOutput {
    file: String,
    directed: bool,
    nodes: usize,
    edges: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    source: Option<usize>,
    content_hash: String,
    acyclic: bool,
    /// Topological order of the raw graph, when it has one.
    #[serde(skip_serializing_if = "Option::is_none")]
    order: Option<Vec<usize>>,
}

/// Execute `tg check`.
pub fn run_check(args: &CheckArgs, output: OutputMode) -> anyhow::Result<MetricsReport> {
    let (spec, graph) = super::load_graph(&args.file)?;

    let (order, metrics) = topological_order(&graph);
    let mut report = MetricsReport::default();
    report.record("topo", metrics);

    let payload = CheckOutput {
        file: args.file.display().to_string(),
        directed: spec.directed,
        nodes: spec.n,
        edges: spec.edges.len(),
        source: spec.source,
        content_hash: graph.content_hash(),
        acyclic: order.is_some(),
        order,
    };

    render_mode(output, &payload, render_check_text, render_check_pretty)?;
    Ok(report)
}

fn render_check_text(report: &CheckOutput, w: &mut dyn Write) -> std::io::Result<()> {
    writeln!(w, "ok {}", report.file)?;
    writeln!(w, "nodes {}", report.nodes)?;
    writeln!(w, "edges {}", report.edges)?;
    writeln!(w, "directed {}", report.directed)?;
    writeln!(w, "hash {}", report.content_hash)?;
    writeln!(w, "acyclic {}", report.acyclic)
}

fn render_check_pretty(report: &CheckOutput, w: &mut dyn Write) -> std::io::Result<()> {
    pretty_section(w, &format!("Check: {}", report.file))?;
    pretty_kv(w, "Nodes", report.nodes.to_string())?;
    pretty_kv(w, "Edges", report.edges.to_string())?;
    pretty_kv(w, "Directed", report.directed.to_string())?;
    if let Some(source) = report.source {
        pretty_kv(w, "Source", source.to_string())?;
    }
    pretty_kv(w, "Hash", &report.content_hash)?;
    match &report.order {
        Some(order) => pretty_kv(w, "Acyclic", format!("yes, order {}", format_nodes(order))),
        None => pretty_kv(w, "Acyclic", "no, run `tg analyze` to condense cycles"),
    }
}
