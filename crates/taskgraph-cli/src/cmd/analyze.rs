//! `tg analyze`: full pipeline report for one graph file.

use std::io::Write;
use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use serde::Serialize;
use taskgraph_core::config::EffectiveConfig;
use taskgraph_core::{Analysis, AnalysisOptions, MetricsReport, analyze_with};

use crate::output::{
    OutputMode, format_distance, format_nodes, pretty_kv, pretty_rule, pretty_section,
    render_mode,
};

/// Arguments for `tg analyze`.
#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Graph description (JSON).
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Source node for shortest paths; overrides `source` in the file.
    #[arg(long, value_name = "N")]
    pub source: Option<usize>,
}

#[derive(Debug, Serialize)]
struct AnalyzeOutput {
    file: String,
    content_hash: String,
    directed: bool,
    nodes: usize,
    edges: usize,
    components: Vec<Vec<usize>>,
    condensation: Vec<Vec<usize>>,
    order: Vec<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    expanded_order: Option<Vec<usize>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    shortest: Option<ShortestOutput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    critical_path: Option<CriticalPathOutput>,
}

#[derive(Debug, Serialize)]
struct ShortestOutput {
    source: usize,
    source_component: usize,
    /// `None` marks an unreachable component.
    distances: Vec<Option<f64>>,
    paths: Vec<Option<Vec<usize>>>,
}

#[derive(Debug, Serialize)]
struct CriticalPathOutput {
    length: f64,
    endpoint: usize,
    path: Vec<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    expanded_path: Option<Vec<usize>>,
}

impl AnalyzeOutput {
    fn new(
        file: String,
        directed: bool,
        edges: usize,
        analysis: &Analysis,
        expand: bool,
    ) -> Self {
        let shortest = analysis.shortest.as_ref().map(|sp| ShortestOutput {
            source: sp.source,
            source_component: sp.source_component,
            distances: sp
                .result
                .dist
                .iter()
                .map(|d| d.is_finite().then_some(*d))
                .collect(),
            paths: (0..sp.result.dist.len())
                .map(|c| sp.result.path_to(c))
                .collect(),
        });

        let critical_path = analysis.critical_path.as_ref().map(|cp| CriticalPathOutput {
            length: cp.length,
            endpoint: cp.endpoint,
            path: cp.path.clone(),
            expanded_path: expand.then(|| analysis.scc.expand(&cp.path)),
        });

        Self {
            file,
            content_hash: analysis.content_hash.clone(),
            directed,
            nodes: analysis.scc.component_of.len(),
            edges,
            components: analysis.scc.components.clone(),
            condensation: (0..analysis.condensation.node_count())
                .map(|c| {
                    analysis
                        .condensation
                        .neighbors(c)
                        .iter()
                        .map(|e| e.to)
                        .collect()
                })
                .collect(),
            order: analysis.order.clone(),
            expanded_order: expand.then(|| analysis.expanded_order()),
            shortest,
            critical_path,
        }
    }
}

/// Execute `tg analyze`.
pub fn run_analyze(
    args: &AnalyzeArgs,
    output: OutputMode,
    config: &EffectiveConfig,
) -> anyhow::Result<MetricsReport> {
    let (spec, graph) = super::load_graph(&args.file)?;
    let source = args.source.or(spec.source);
    let options = AnalysisOptions::from(&config.project.analysis);

    let analysis = analyze_with(&graph, source, options)
        .with_context(|| format!("failed to analyze {}", args.file.display()))?;

    let payload = AnalyzeOutput::new(
        args.file.display().to_string(),
        graph.is_directed(),
        spec.edges.len(),
        &analysis,
        config.project.analysis.expand_components,
    );

    render_mode(
        output,
        &payload,
        render_analyze_text,
        render_analyze_pretty,
    )?;

    Ok(analysis.metrics)
}

fn render_analyze_text(report: &AnalyzeOutput, w: &mut dyn Write) -> std::io::Result<()> {
    for (i, members) in report.components.iter().enumerate() {
        writeln!(w, "Component {i}: {}", format_nodes(members))?;
    }

    writeln!(w, "Condensation:")?;
    for (c, targets) in report.condensation.iter().enumerate() {
        writeln!(w, "  {c} -> {}", format_nodes(targets))?;
    }

    writeln!(w, "Topological order: {}", format_nodes(&report.order))?;
    if let Some(order) = &report.expanded_order {
        writeln!(w, "Task order: {}", format_nodes(order))?;
    }

    if let Some(sp) = &report.shortest {
        writeln!(
            w,
            "Shortest paths from component {} (source {}):",
            sp.source_component, sp.source
        )?;
        for (c, (dist, path)) in sp.distances.iter().zip(&sp.paths).enumerate() {
            match (dist, path) {
                (Some(d), Some(p)) => {
                    writeln!(w, "  {c}: {} via {}", format_distance(*d), format_nodes(p))?;
                }
                _ => writeln!(w, "  {c}: unreachable")?,
            }
        }
    }

    if let Some(cp) = &report.critical_path {
        writeln!(w, "Critical path length: {}", cp.length)?;
        writeln!(w, "Critical path endpoint: {}", cp.endpoint)?;
        writeln!(w, "Critical path: {}", format_nodes(&cp.path))?;
        if let Some(expanded) = &cp.expanded_path {
            writeln!(w, "Critical tasks: {}", format_nodes(expanded))?;
        }
    }

    Ok(())
}

fn render_analyze_pretty(report: &AnalyzeOutput, w: &mut dyn Write) -> std::io::Result<()> {
    pretty_section(w, &format!("Analysis: {}", report.file))?;
    pretty_kv(w, "Nodes", report.nodes.to_string())?;
    pretty_kv(w, "Edges", report.edges.to_string())?;
    pretty_kv(w, "Directed", report.directed.to_string())?;
    pretty_kv(w, "Hash", &report.content_hash)?;

    writeln!(w)?;
    pretty_section(w, &format!("Components ({})", report.components.len()))?;
    for (i, members) in report.components.iter().enumerate() {
        let marker = if members.len() > 1 { "  (cycle)" } else { "" };
        writeln!(w, "  Component {i}: {}{marker}", format_nodes(members))?;
    }

    writeln!(w)?;
    pretty_section(w, "Condensation")?;
    for (c, targets) in report.condensation.iter().enumerate() {
        if targets.is_empty() {
            writeln!(w, "  {c}")?;
        } else {
            writeln!(w, "  {c} -> {}", format_nodes(targets))?;
        }
    }

    writeln!(w)?;
    pretty_section(w, "Order")?;
    pretty_kv(w, "Components", format_nodes(&report.order))?;
    if let Some(order) = &report.expanded_order {
        pretty_kv(w, "Tasks", format_nodes(order))?;
    }

    if let Some(sp) = &report.shortest {
        writeln!(w)?;
        pretty_section(
            w,
            &format!(
                "Shortest paths from component {} (source {})",
                sp.source_component, sp.source
            ),
        )?;
        for (c, (dist, path)) in sp.distances.iter().zip(&sp.paths).enumerate() {
            let dist = dist.map_or_else(|| "unreachable".to_string(), format_distance);
            match path {
                Some(p) => writeln!(w, "  {c:>4}  {dist:>12}  {}", format_nodes(p))?,
                None => writeln!(w, "  {c:>4}  {dist:>12}")?,
            }
        }
    }

    if let Some(cp) = &report.critical_path {
        writeln!(w)?;
        pretty_section(w, "Critical path")?;
        pretty_kv(w, "Length", cp.length.to_string())?;
        pretty_kv(w, "Endpoint", cp.endpoint.to_string())?;
        pretty_kv(w, "Components", format_nodes(&cp.path))?;
        if let Some(expanded) = &cp.expanded_path {
            pretty_kv(w, "Tasks", format_nodes(expanded))?;
        }
    }

    pretty_rule(w)
}
