//! Per-stage instrumentation counters and elapsed time.
//!
//! Every algorithm stage creates a fresh [`Metrics`], bumps its counters at
//! well-defined events and returns it next to its result. Nothing here is
//! global: two runs never share counters, and a stage's metrics are
//! read-only once the stage returns.
//!
//! | Counter        | Incremented when |
//! |----------------|------------------|
//! | `dfs_visits`   | the SCC search enters a node |
//! | `dfs_edges`    | the SCC search examines an outgoing edge |
//! | `kahn_pushes`  | the topological sorter enqueues a node (seeding included) |
//! | `kahn_pops`    | the topological sorter dequeues a node |
//! | `relaxations`  | a path solver examines an edge for relaxation |

use std::time::{Duration, Instant};

use serde::Serialize;
use serde_json::json;

/// Counters and elapsed time for one stage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Metrics {
    /// Nodes entered by the SCC search.
    pub dfs_visits: u64,
    /// Edges examined by the SCC search.
    pub dfs_edges: u64,
    /// Queue pushes in the topological sorter.
    pub kahn_pushes: u64,
    /// Queue pops in the topological sorter.
    pub kahn_pops: u64,
    /// Edges examined by the path solvers.
    pub relaxations: u64,
    /// Wall-clock time between the last `start_timer` / `stop_timer` pair.
    #[serde(serialize_with = "serialize_micros")]
    pub elapsed: Duration,
    #[serde(skip)]
    started: Option<Instant>,
}

impl Metrics {
    /// Fresh metrics with every counter at zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin timing. A second call restarts the clock.
    pub fn start_timer(&mut self) {
        self.started = Some(Instant::now());
    }

    /// Stop timing and record the elapsed time since `start_timer`.
    ///
    /// Without a matching `start_timer` the recorded time is left as is.
    pub fn stop_timer(&mut self) {
        if let Some(started) = self.started.take() {
            self.elapsed = started.elapsed();
        }
    }

    /// Elapsed time formatted in milliseconds, e.g. `"0.042 ms"`.
    #[must_use]
    pub fn time_ms(&self) -> String {
        format!("{:.3} ms", self.elapsed.as_secs_f64() * 1e3)
    }
}

/// Metrics tagged with the stage that produced them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageMetrics {
    /// Stage name (`scc`, `condense`, `topo`, `shortest`, `longest`).
    pub stage: &'static str,
    /// Counters and timing for the stage.
    pub metrics: Metrics,
}

/// Metrics for every stage of one pipeline run, in execution order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MetricsReport {
    /// Per-stage entries.
    pub stages: Vec<StageMetrics>,
}

impl MetricsReport {
    /// Append a stage's metrics.
    pub fn record(&mut self, stage: &'static str, metrics: Metrics) {
        self.stages.push(StageMetrics { stage, metrics });
    }

    /// Returns true when no stage was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Look up a stage by name.
    #[must_use]
    pub fn stage(&self, name: &str) -> Option<&Metrics> {
        self.stages
            .iter()
            .find(|s| s.stage == name)
            .map(|s| &s.metrics)
    }

    /// Total elapsed time over all stages.
    #[must_use]
    pub fn total_elapsed(&self) -> Duration {
        self.stages.iter().map(|s| s.metrics.elapsed).sum()
    }

    /// Render the report as JSON.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        let stages = self
            .stages
            .iter()
            .map(|s| {
                json!({
                    "stage": s.stage,
                    "dfs_visits": s.metrics.dfs_visits,
                    "dfs_edges": s.metrics.dfs_edges,
                    "kahn_pushes": s.metrics.kahn_pushes,
                    "kahn_pops": s.metrics.kahn_pops,
                    "relaxations": s.metrics.relaxations,
                    "elapsed_us": s.metrics.elapsed.as_micros(),
                })
            })
            .collect::<Vec<_>>();

        json!({ "stages": stages, "total_us": self.total_elapsed().as_micros() })
    }

    /// Render the report as a table for terminal output.
    #[must_use]
    pub fn display_table(&self) -> String {
        if self.stages.is_empty() {
            return "No stage metrics recorded.".to_string();
        }

        let mut out = String::new();
        out.push_str("stage       visits    edges   pushes     pops   relax     time\n");
        out.push_str("--------------------------------------------------------------\n");

        for s in &self.stages {
            let m = &s.metrics;
            out.push_str(&format!(
                "{:<10} {:>7} {:>8} {:>8} {:>8} {:>7} {:>8}\n",
                s.stage,
                m.dfs_visits,
                m.dfs_edges,
                m.kahn_pushes,
                m.kahn_pops,
                m.relaxations,
                format_duration(m.elapsed)
            ));
        }

        out
    }
}

fn serialize_micros<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u128(d.as_micros())
}

fn format_duration(duration: Duration) -> String {
    let micros = duration.as_micros();

    if micros >= 1_000_000 {
        let secs = micros / 1_000_000;
        let millis = (micros % 1_000_000) / 1_000;
        format!("{secs}.{millis:03}s")
    } else if micros >= 1_000 {
        let millis = micros / 1_000;
        let rem = micros % 1_000;
        format!("{millis}.{rem:03}ms")
    } else {
        format!("{micros}us")
    }
}
