//! JSON graph description.
//!
//! ```json
//! {
//!   "directed": true,
//!   "n": 5,
//!   "edges": [ { "u": 0, "v": 1, "w": 1.0 } ],
//!   "source": 0
//! }
//! ```
//!
//! `directed` defaults to `true`, `w` to `1.0`, and `source` is optional.
//! [`GraphSpec::validate`] rejects out-of-range endpoints or source and
//! non-finite weights before any graph is built.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::InputError;
use crate::graph::Graph;

/// One weighted edge of a description.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EdgeSpec {
    /// Source node.
    pub u: usize,
    /// Target node.
    pub v: usize,
    /// Weight.
    #[serde(default = "default_weight")]
    pub w: f64,
}

/// A graph as read from a description file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphSpec {
    /// Whether edges are directed.
    #[serde(default = "default_true")]
    pub directed: bool,
    /// Number of nodes.
    pub n: usize,
    /// Edge list, in insertion order.
    #[serde(default)]
    pub edges: Vec<EdgeSpec>,
    /// Optional source node for shortest paths.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<usize>,
}

impl GraphSpec {
    /// Parse and validate a JSON description.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::Parse`] for malformed JSON and
    /// [`InputError::Invalid`] when validation fails.
    pub fn from_json_str(text: &str) -> Result<Self, InputError> {
        let spec: Self = serde_json::from_str(text)?;
        spec.validate()?;
        Ok(spec)
    }

    /// Read, parse and validate a JSON description file.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::Io`] if the file cannot be read, otherwise as
    /// [`GraphSpec::from_json_str`].
    #[instrument]
    pub fn from_path(path: &Path) -> Result<Self, InputError> {
        let text = std::fs::read_to_string(path).map_err(|source| InputError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    /// Check every edge endpoint, weight and the source against `n`.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::Invalid`] naming the first offending entry.
    pub fn validate(&self) -> Result<(), InputError> {
        for (i, e) in self.edges.iter().enumerate() {
            if e.u >= self.n || e.v >= self.n {
                return Err(InputError::Invalid(format!(
                    "edge {i} ({} -> {}) references a node outside 0..{}",
                    e.u, e.v, self.n
                )));
            }
            if !e.w.is_finite() {
                return Err(InputError::Invalid(format!(
                    "edge {i} ({} -> {}) has non-finite weight {}",
                    e.u, e.v, e.w
                )));
            }
        }
        if let Some(source) = self.source {
            if source >= self.n {
                return Err(InputError::Invalid(format!(
                    "source {source} is outside 0..{}",
                    self.n
                )));
            }
        }
        Ok(())
    }

    /// Build the described graph, inserting edges in listed order.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::Graph`] if an edge is out of range, which only
    /// happens when the description was mutated after validation.
    pub fn to_graph(&self) -> Result<Graph, InputError> {
        let mut g = Graph::new(self.n, self.directed);
        for e in &self.edges {
            g.add_edge(e.u, e.v, e.w)?;
        }
        Ok(g)
    }
}

const fn default_true() -> bool {
    true
}

const fn default_weight() -> f64 {
    1.0
}
