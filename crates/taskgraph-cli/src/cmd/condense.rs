//! `tg condense`: print the component DAG.

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use petgraph::dot::{Config, Dot};
use serde::Serialize;
use taskgraph_core::{Analysis, AnalysisOptions, MetricsReport, analyze_with};

use crate::output::{OutputMode, format_nodes, pretty_kv, pretty_section, render_mode};

/// Arguments for `tg condense`.
#[derive(Args, Debug)]
pub struct CondenseArgs {
    /// Graph description (JSON).
    #[arg(value_name = "FILE")]
    pub file: PathBuf,
}

#[derive(Debug, Serialize)]
struct CondenseOutput {
    components: Vec<Vec<usize>>,
    edges: Vec<ComponentEdge>,
    order: Vec<usize>,
}

#[derive(Debug, Serialize)]
struct ComponentEdge {
    from: usize,
    to: usize,
}

impl CondenseOutput {
    fn new(analysis: &Analysis) -> Self {
        Self {
            components: analysis.scc.components.clone(),
            edges: analysis
                .condensation
                .edges()
                .map(|(from, e)| ComponentEdge { from, to: e.to })
                .collect(),
            order: analysis.order.clone(),
        }
    }
}

/// Execute `tg condense`.
pub fn run_condense(args: &CondenseArgs, output: OutputMode) -> anyhow::Result<MetricsReport> {
    let (_, graph) = super::load_graph(&args.file)?;

    // Only the condensation and its order are needed here.
    let options = AnalysisOptions {
        shortest_paths: false,
        critical_path: false,
    };
    let analysis = analyze_with(&graph, None, options)
        .with_context(|| format!("failed to condense {}", args.file.display()))?;

    if output == OutputMode::Dot {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        write_dot(&analysis, &mut out)?;
    } else {
        render_mode(
            output,
            &CondenseOutput::new(&analysis),
            render_condense_text,
            render_condense_pretty,
        )?;
    }

    Ok(analysis.metrics)
}

/// Render the condensation as Graphviz DOT, labelling each component node
/// with its members.
fn write_dot(analysis: &Analysis, w: &mut dyn Write) -> io::Result<()> {
    let labeled = analysis.condensation.to_petgraph().map(
        |_, &c| {
            let members = analysis.scc.members(c).unwrap_or_default();
            format!("C{c} {}", format_nodes(members))
        },
        |_, _| "",
    );
    write!(w, "{}", Dot::with_config(&labeled, &[Config::EdgeNoLabel]))
}

fn render_condense_text(report: &CondenseOutput, w: &mut dyn Write) -> io::Result<()> {
    for (i, members) in report.components.iter().enumerate() {
        writeln!(w, "Component {i}: {}", format_nodes(members))?;
    }
    for edge in &report.edges {
        writeln!(w, "{} -> {}", edge.from, edge.to)?;
    }
    writeln!(w, "Topological order: {}", format_nodes(&report.order))
}

fn render_condense_pretty(report: &CondenseOutput, w: &mut dyn Write) -> io::Result<()> {
    pretty_section(
        w,
        &format!(
            "Condensation ({} components, {} edges)",
            report.components.len(),
            report.edges.len()
        ),
    )?;
    for (i, members) in report.components.iter().enumerate() {
        let targets: Vec<usize> = report
            .edges
            .iter()
            .filter(|e| e.from == i)
            .map(|e| e.to)
            .collect();
        if targets.is_empty() {
            writeln!(w, "  C{i} {}", format_nodes(members))?;
        } else {
            writeln!(w, "  C{i} {} -> {}", format_nodes(members), format_nodes(&targets))?;
        }
    }
    writeln!(w)?;
    pretty_kv(w, "Order", format_nodes(&report.order))
}
