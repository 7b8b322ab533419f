// src/executor/contract.rs

//! The executor contract: the entire surface through which a node
//! implementation talks to the outside world.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::engine::context::RunContext;
use crate::engine::state::NodeExecutionState;
use crate::engine::RunOptions;
use crate::errors::{FlowError, Result};
use crate::graph::model::{DEFAULT_INPUT_HANDLE, Node};

/// What an executor returns on success.
///
/// Created once per node execution, folded into the run context by the
/// orchestrator, never mutated afterwards.
#[derive(Debug, Clone, Default)]
pub struct ExecuteResult {
    /// Primary output string; this is what downstream edges carry.
    pub output: String,

    /// Optional secondary named output channels (e.g. distinct string,
    /// image and audio channels for a fan-in sink). Only surfaced through
    /// the state callback, never forwarded along edges.
    pub named_outputs: HashMap<String, Value>,

    /// Optional reasoning trace from the backend.
    pub reasoning: Option<String>,

    /// Opaque debug metadata (request ids, token counts, timings).
    pub debug: Option<Value>,
}

impl ExecuteResult {
    pub fn from_output(output: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            ..Self::default()
        }
    }
}

/// One streamed partial result from an executor.
#[derive(Debug, Clone, Default)]
pub struct StreamChunk {
    /// Accumulated partial output so far (not a delta).
    pub output: String,
    pub debug: Option<Value>,
    pub reasoning: Option<String>,
}

/// Callback invoked by executors for each streamed partial result.
pub type StreamCallback = Arc<dyn Fn(StreamChunk) + Send + Sync>;

/// Callback invoked on every observable node status transition.
pub type StateCallback = Arc<dyn Fn(&str, NodeExecutionState) + Send + Sync>;

/// Everything an executor gets to see while running one node.
#[derive(Clone)]
pub struct ExecutionContext {
    /// The node being executed.
    pub node: Node,

    /// Collected handle-to-value input map (see `graph::query::collect_inputs`).
    pub inputs: HashMap<String, Value>,

    /// Shared per-run output store. Executors normally only read from this;
    /// the orchestrator records this node's own outputs after success.
    pub run_context: Arc<RunContext>,

    /// Caller-supplied run options (credentials, pacing, sink types).
    pub options: RunOptions,

    /// Cooperative cancellation token. Executors doing their own I/O must
    /// watch this during long calls.
    pub cancel: CancellationToken,

    /// Streaming callback for partial results.
    pub stream: StreamCallback,

    /// State-change callback (rarely needed by executors directly; the
    /// orchestrator emits the standard transitions).
    pub on_state_change: StateCallback,
}

impl ExecutionContext {
    /// Input value for a handle, if connected and produced.
    pub fn input(&self, handle: &str) -> Option<&Value> {
        self.inputs.get(handle)
    }

    /// Input value for a handle as a string slice.
    pub fn input_str(&self, handle: &str) -> Option<&str> {
        self.inputs.get(handle).and_then(|v| v.as_str())
    }

    /// Input string for a handle, failing with a descriptive error when the
    /// connection is missing.
    pub fn require_input_str(&self, handle: &str) -> Result<&str> {
        self.input_str(handle).ok_or_else(|| FlowError::MissingInput {
            node: self.node.id.clone(),
            handle: handle.to_string(),
        })
    }

    /// First available input value: the canonical default slot if present,
    /// otherwise the lexicographically first handle (deterministic even
    /// though the map is unordered).
    pub fn first_input(&self) -> Option<&Value> {
        if let Some(v) = self.inputs.get(DEFAULT_INPUT_HANDLE) {
            return Some(v);
        }
        self.inputs
            .iter()
            .min_by(|(a, _), (b, _)| a.cmp(b))
            .map(|(_, v)| v)
    }

    /// Forward a streamed partial result to observers.
    pub fn emit(&self, chunk: StreamChunk) {
        (self.stream)(chunk);
    }
}

/// The pluggable unit of work behind a node type tag.
///
/// Implementations fail by returning a descriptive error on malformed
/// input, missing required connections, or backend failure, never a
/// partial or ambiguous success.
#[async_trait]
pub trait NodeExecutor: Send + Sync {
    /// The type tag this executor handles.
    fn node_type(&self) -> &str;

    /// Run one node to completion.
    async fn execute(&self, ctx: &ExecutionContext) -> Result<ExecuteResult>;

    /// If true, the orchestrator writes the synthetic `done` pulse marker
    /// after a successful run.
    fn has_pulse_output(&self) -> bool {
        false
    }

    /// If true, the orchestrator forwards this node's running/streaming/
    /// error state to reachable preview sinks so long-running generation is
    /// visible before the node itself finishes.
    fn tracks_downstream_preview(&self) -> bool {
        false
    }
}
