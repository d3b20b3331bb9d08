use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};

/// File name of the project-level configuration.
pub const PROJECT_CONFIG_FILE: &str = "taskgraph.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub report: ReportConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Compute shortest paths when a source node is known.
    #[serde(default = "default_true")]
    pub shortest_paths: bool,
    /// Compute the critical (longest) path of the condensation.
    #[serde(default = "default_true")]
    pub critical_path: bool,
    /// Expand component-level orders and paths into original nodes.
    #[serde(default = "default_true")]
    pub expand_components: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            shortest_paths: default_true(),
            critical_path: default_true(),
            expand_components: default_true(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Append the per-stage metrics table to reports.
    #[serde(default)]
    pub timing: bool,
    /// Preferred output mode (`pretty`, `text`, `json`, `dot`).
    #[serde(default)]
    pub output: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UserConfig {
    #[serde(default)]
    pub output: Option<String>,
    #[serde(default)]
    pub timing: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectiveConfig {
    pub project: ProjectConfig,
    pub user: UserConfig,
    pub resolved_output: String,
    pub timing: bool,
}

/// Command-line overrides applied on top of files and environment.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides<'a> {
    /// Explicit config file; replaces `taskgraph.toml` discovery.
    pub config_path: Option<&'a Path>,
    /// `--format` value.
    pub format: Option<&'a str>,
    /// `--timing` flag.
    pub timing: bool,
}

/// Load `taskgraph.toml` from `project_root`, or defaults when absent.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_project_config(project_root: &Path) -> Result<ProjectConfig> {
    let path = project_root.join(PROJECT_CONFIG_FILE);
    if !path.exists() {
        return Ok(ProjectConfig::default());
    }
    load_config_file(&path)
}

/// Load a project configuration from an explicit path.
///
/// Unlike [`load_project_config`], a missing file is an error.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn load_config_file(path: &Path) -> Result<ProjectConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<ProjectConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

/// Load `taskgraph/config.toml` from the platform config directory.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_user_config() -> Result<UserConfig> {
    let Some(path) = user_config_path() else {
        return Ok(UserConfig::default());
    };
    if !path.exists() {
        return Ok(UserConfig::default());
    }

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<UserConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("taskgraph/config.toml"))
}

/// Merge defaults, user file, project file, environment and CLI flags.
///
/// Precedence, highest first: CLI flags, environment (`FORMAT`,
/// `TASKGRAPH_TIMING`), project file, user file, defaults.
///
/// # Errors
///
/// Returns an error if a present config file is malformed, if an explicit
/// `config_path` is missing, or if the CLI format is not a known mode.
pub fn resolve_config(project_root: &Path, cli: &CliOverrides<'_>) -> Result<EffectiveConfig> {
    let project = match cli.config_path {
        Some(path) => load_config_file(path)?,
        None => load_project_config(project_root)?,
    };
    let user = load_user_config()?;

    let env_format = env::var("FORMAT").ok();
    let resolved_output = resolve_output(
        cli.format,
        env_format.as_deref(),
        project.report.output.as_deref(),
        user.output.as_deref(),
        std::io::stdout().is_terminal(),
    )?;

    let env_timing = env::var("TASKGRAPH_TIMING").ok();
    let timing = resolve_timing(cli.timing, env_timing.as_deref(), &project, &user);

    Ok(EffectiveConfig {
        project,
        user,
        resolved_output,
        timing,
    })
}

fn normalize_output_mode(raw: &str) -> Option<&'static str> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "pretty" | "human" => Some("pretty"),
        "text" | "table" => Some("text"),
        "json" => Some("json"),
        "dot" | "graphviz" => Some("dot"),
        _ => None,
    }
}

fn resolve_output(
    cli_format: Option<&str>,
    env_format: Option<&str>,
    project_output: Option<&str>,
    user_output: Option<&str>,
    is_tty: bool,
) -> Result<String> {
    if let Some(raw) = cli_format {
        return normalize_output_mode(raw)
            .map(str::to_string)
            .with_context(|| format!("Unknown output format '{raw}'"));
    }

    // Unknown values from softer sources fall through.
    for candidate in [env_format, project_output, user_output].into_iter().flatten() {
        if let Some(mode) = normalize_output_mode(candidate) {
            return Ok(mode.to_string());
        }
    }

    if is_tty {
        Ok("pretty".to_string())
    } else {
        Ok("text".to_string())
    }
}

fn resolve_timing(
    cli_timing: bool,
    env_timing: Option<&str>,
    project: &ProjectConfig,
    user: &UserConfig,
) -> bool {
    if cli_timing {
        return true;
    }
    if let Some(value) = env_timing {
        return is_truthy(value);
    }
    project.report.timing || user.timing.unwrap_or(false)
}

fn is_truthy(value: &str) -> bool {
    value.eq_ignore_ascii_case("1")
        || value.eq_ignore_ascii_case("true")
        || value.eq_ignore_ascii_case("yes")
        || value.eq_ignore_ascii_case("on")
}

const fn default_true() -> bool {
    true
}
