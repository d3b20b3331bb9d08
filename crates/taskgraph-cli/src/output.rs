//! Shared output layer for pretty/text/JSON/DOT parity across commands.
//!
//! Every command handler receives an [`OutputMode`] and formats its output
//! accordingly: pretty output for humans, compact text for pipes, stable
//! JSON, or Graphviz DOT for commands that emit a graph.
//!
//! # Output mode resolution
//!
//! Precedence (highest wins):
//! 1. `--format` flag
//! 2. `FORMAT` env var
//! 3. `[report] output` in `taskgraph.toml`, then the user config
//! 4. Default: [`OutputMode::Pretty`] if stdout is a TTY; [`OutputMode::Text`] if piped.
//!
//! The merge itself lives in `taskgraph_core::config::resolve_config`; this
//! module only maps the resolved name back to a mode.

use clap::ValueEnum;
use serde::Serialize;
use std::io::{self, Write};

use taskgraph_core::{GraphError, InputError};

/// Shared width for human pretty separators.
pub const PRETTY_RULE_WIDTH: usize = 72;

/// Write a horizontal separator used by pretty human output.
pub fn pretty_rule(w: &mut dyn Write) -> io::Result<()> {
    writeln!(w, "{:-<width$}", "", width = PRETTY_RULE_WIDTH)
}

/// Write a section heading followed by a separator.
pub fn pretty_section(w: &mut dyn Write, heading: &str) -> io::Result<()> {
    writeln!(w, "{heading}")?;
    pretty_rule(w)
}

/// Render a left-aligned key/value line in human output.
pub fn pretty_kv(w: &mut dyn Write, key: &str, value: impl AsRef<str>) -> io::Result<()> {
    writeln!(w, "{:<16} {}", format!("{key}:"), value.as_ref())
}

/// Output modes supported by the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputMode {
    /// Human-optimized output (sections, visual framing).
    Pretty,
    /// Plain line-oriented text for pipes.
    Text,
    /// Machine-readable JSON, one document per run.
    Json,
    /// Graphviz DOT; commands without a graph fall back to text.
    Dot,
}

impl OutputMode {
    /// Canonical name, as accepted by `--format` and the config files.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pretty => "pretty",
            Self::Text => "text",
            Self::Json => "json",
            Self::Dot => "dot",
        }
    }

    /// Map a canonical name produced by config resolution back to a mode.
    pub fn from_resolved(name: &str) -> Option<Self> {
        match name {
            "pretty" => Some(Self::Pretty),
            "text" => Some(Self::Text),
            "json" => Some(Self::Json),
            "dot" => Some(Self::Dot),
            _ => None,
        }
    }
}

/// Render a serializable value with explicit pretty/text renderers.
///
/// DOT mode uses the text renderer.
pub fn render_mode<T: Serialize>(
    mode: OutputMode,
    value: &T,
    text_fn: impl FnOnce(&T, &mut dyn Write) -> io::Result<()>,
    pretty_fn: impl FnOnce(&T, &mut dyn Write) -> io::Result<()>,
) -> anyhow::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    render_to(&mut out, mode, value, text_fn, pretty_fn)
}

fn render_to<T: Serialize>(
    out: &mut dyn Write,
    mode: OutputMode,
    value: &T,
    text_fn: impl FnOnce(&T, &mut dyn Write) -> io::Result<()>,
    pretty_fn: impl FnOnce(&T, &mut dyn Write) -> io::Result<()>,
) -> anyhow::Result<()> {
    match mode {
        OutputMode::Json => {
            serde_json::to_writer_pretty(&mut *out, value)?;
            writeln!(out)?;
        }
        OutputMode::Text | OutputMode::Dot => text_fn(value, out)?,
        OutputMode::Pretty => pretty_fn(value, out)?,
    }
    Ok(())
}

/// A structured error with optional suggestion and error code.
#[derive(Debug, Serialize)]
pub struct CliError {
    /// Human-readable error message.
    pub message: String,
    /// Optional suggestion for how to fix the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    /// Machine-readable error code (e.g. "invalid_input", "parse_error").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
}

impl CliError {
    /// Create a simple error with just a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            suggestion: None,
            error_code: None,
        }
    }

    /// Create an error with a suggestion and error code.
    pub fn with_details(
        message: impl Into<String>,
        suggestion: impl Into<String>,
        error_code: impl Into<String>,
    ) -> Self {
        Self {
            message: message.into(),
            suggestion: Some(suggestion.into()),
            error_code: Some(error_code.into()),
        }
    }

    /// Classify an `anyhow` chain, picking up typed library errors anywhere
    /// in it. The message keeps the full context chain.
    pub fn from_anyhow(err: &anyhow::Error) -> Self {
        let message = format!("{err:#}");
        for cause in err.chain() {
            if let Some(input) = cause.downcast_ref::<InputError>() {
                return Self::classify_input(message, input);
            }
            if let Some(graph) = cause.downcast_ref::<GraphError>() {
                return Self::classify_graph(message, graph);
            }
        }
        Self::new(message)
    }

    fn classify_input(message: String, err: &InputError) -> Self {
        match err {
            InputError::Io { .. } => Self::with_details(
                message,
                "check that the graph file exists and is readable",
                "io_error",
            ),
            InputError::Parse(_) => Self::with_details(
                message,
                "expected {\"directed\": bool, \"n\": int, \"edges\": [{\"u\", \"v\", \"w\"}]}",
                "parse_error",
            ),
            InputError::Invalid(_) => Self::with_details(
                message,
                "node indices must lie in 0..n and weights must be finite",
                "invalid_input",
            ),
            InputError::Graph(graph) => Self::classify_graph(message, graph),
        }
    }

    fn classify_graph(message: String, err: &GraphError) -> Self {
        match err {
            GraphError::NodeOutOfRange { node_count, .. } => Self::with_details(
                message,
                format!("pick a source in 0..{node_count}"),
                "node_out_of_range",
            ),
            _ => Self {
                message,
                suggestion: None,
                error_code: Some("internal".to_string()),
            },
        }
    }
}

/// Render an error to stderr in the requested format.
pub fn render_error(mode: OutputMode, error: &CliError) -> anyhow::Result<()> {
    let stderr = io::stderr();
    let mut out = stderr.lock();
    write_error(&mut out, mode, error)
}

fn write_error(out: &mut dyn Write, mode: OutputMode, error: &CliError) -> anyhow::Result<()> {
    match mode {
        OutputMode::Json => {
            let wrapper = serde_json::json!({
                "error": error,
            });
            serde_json::to_writer_pretty(&mut *out, &wrapper)?;
            writeln!(out)?;
        }
        OutputMode::Pretty | OutputMode::Text | OutputMode::Dot => {
            writeln!(out, "error: {}", error.message)?;
            if let Some(ref suggestion) = error.suggestion {
                writeln!(out, "  suggestion: {suggestion}")?;
            }
        }
    }
    Ok(())
}

/// Format a distance for human output; unreached nodes hold infinities.
pub fn format_distance(d: f64) -> String {
    if d.is_finite() {
        format!("{d}")
    } else {
        "unreachable".to_string()
    }
}

/// Format a node list as `[a, b, c]`.
pub fn format_nodes(nodes: &[usize]) -> String {
    format!("{nodes:?}")
}
