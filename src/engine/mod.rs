// src/engine/mod.rs

//! The flow execution engine.
//!
//! - [`state`] holds the observable per-node execution state pushed to the
//!   presentation layer. It never gates scheduling; only the run context
//!   does.
//! - [`context`] owns the per-run output store shared by concurrently
//!   running nodes.
//! - [`orchestrator`] is the scheduler proper: root selection, readiness
//!   gating, concurrent branch execution with join-on-reconvergence,
//!   streaming forwarding, and failure containment.

use std::time::Duration;

pub mod context;
pub mod orchestrator;
pub mod state;

pub use context::RunContext;
pub use orchestrator::{NodeOutcome, Orchestrator};
pub use state::{NodeExecutionState, NodeStatus};

/// Caller-supplied options for one run.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Node types treated as terminal sinks: their outputs are collected as
    /// run results and they are never recursed past.
    pub sink_types: Vec<String>,

    /// Node types treated as opaque boundaries for preview forwarding: a
    /// sink behind one of these belongs to that node's branch, not to the
    /// streaming producer's.
    pub boundary_types: Vec<String>,

    /// Credential forwarded to executors that call generation backends.
    pub api_key: Option<String>,

    /// Optional artificial pacing delay before each node starts, for
    /// perceptible step-by-step feedback. Correctness never depends on it.
    pub step_delay: Option<Duration>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            sink_types: vec!["preview".to_string()],
            boundary_types: Vec::new(),
            api_key: None,
            step_delay: None,
        }
    }
}

impl RunOptions {
    pub fn is_sink_type(&self, node_type: &str) -> bool {
        self.sink_types.iter().any(|s| s == node_type)
    }
}
