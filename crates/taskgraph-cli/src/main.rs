#![forbid(unsafe_code)]

mod cmd;
mod output;

use clap::{Parser, Subcommand};
use output::{CliError, OutputMode, render_error};
use std::env;
use std::path::PathBuf;
use std::process::ExitCode;
use taskgraph_core::MetricsReport;
use taskgraph_core::config::{CliOverrides, resolve_config};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "tg: dependency graph analysis (cycles, order, critical path)",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit per-stage timing report to stderr.
    #[arg(long, global = true)]
    timing: bool,

    /// Output format.
    #[arg(long, global = true, value_enum)]
    format: Option<OutputMode>,

    /// Use this config file instead of ./taskgraph.toml.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        about = "Analyze a dependency graph",
        long_about = "Collapse cycles into components, order the component DAG, and report shortest paths and the critical path.",
        after_help = "EXAMPLES:\n    # Full report\n    tg analyze tasks.json\n\n    # Shortest paths from node 3\n    tg analyze tasks.json --source 3\n\n    # Emit machine-readable output\n    tg analyze tasks.json --format json"
    )]
    Analyze(cmd::analyze::AnalyzeArgs),

    #[command(
        about = "Print the condensation",
        long_about = "Print the DAG of strongly connected components.",
        after_help = "EXAMPLES:\n    # Component list and edges\n    tg condense tasks.json\n\n    # Render with Graphviz\n    tg condense tasks.json --format dot | dot -Tsvg > tasks.svg"
    )]
    Condense(cmd::condense::CondenseArgs),

    #[command(
        about = "Validate a graph file",
        long_about = "Validate a graph description and report whether it is already acyclic.",
        after_help = "EXAMPLES:\n    # Validate a file\n    tg check tasks.json\n\n    # Emit machine-readable output\n    tg check tasks.json --format json"
    )]
    Check(cmd::check::CheckArgs),
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("TASKGRAPH_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose || env::var("DEBUG").is_ok() {
            "taskgraph=debug,info"
        } else {
            "taskgraph=info,warn"
        })
    });

    let format = env::var("TASKGRAPH_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn run(cli: &Cli, output: &mut OutputMode) -> anyhow::Result<()> {
    let project_root = env::current_dir()?;
    let overrides = CliOverrides {
        config_path: cli.config.as_deref(),
        format: cli.format.map(OutputMode::as_str),
        timing: cli.timing,
    };
    let config = resolve_config(&project_root, &overrides)?;
    if let Some(mode) = OutputMode::from_resolved(&config.resolved_output) {
        *output = mode;
    }

    let metrics: MetricsReport = match &cli.command {
        Commands::Analyze(args) => cmd::analyze::run_analyze(args, *output, &config)?,
        Commands::Condense(args) => cmd::condense::run_condense(args, *output)?,
        Commands::Check(args) => cmd::check::run_check(args, *output)?,
    };

    if config.timing {
        if metrics.is_empty() {
            eprintln!("timing report: no samples recorded");
        } else {
            eprintln!("timing report:");
            eprintln!("{}", metrics.display_table());
            eprintln!("timing report (json):");
            eprintln!("{}", serde_json::to_string_pretty(&metrics.to_json())?);
        }
    }

    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if cli.verbose {
        info!("Verbose mode enabled");
    }

    // Errors before config resolution still honour an explicit --format.
    let mut output = cli.format.unwrap_or(OutputMode::Text);
    match run(&cli, &mut output) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if render_error(output, &CliError::from_anyhow(&err)).is_err() {
                eprintln!("error: {err:#}");
            }
            ExitCode::FAILURE
        }
    }
}
