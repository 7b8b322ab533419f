//! Fake executors and observers for engine tests.
//!
//! No fake talks to any backend: they compute deterministic outputs from
//! their inputs so tests can assert exactly what flowed where, and record
//! execution order / state transitions for assertions.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;

use flowdag::errors::{FlowError, Result};
use flowdag::executor::{ExecuteResult, ExecutionContext, NodeExecutor, StateCallback, StreamChunk};
use flowdag::{NodeExecutionState, NodeStatus};

/// Shared record of which node ids executed, in start order.
pub type ExecutionLog = Arc<Mutex<Vec<String>>>;

pub fn new_log() -> ExecutionLog {
    Arc::new(Mutex::new(Vec::new()))
}

/// Render a collected input map deterministically: handles sorted, joined
/// as `handle=value` with `|` separators.
pub fn render_inputs(inputs: &HashMap<String, Value>) -> String {
    let mut pairs: Vec<(&String, &Value)> = inputs.iter().collect();
    pairs.sort_by(|(a, _), (b, _)| a.cmp(b));
    pairs
        .into_iter()
        .map(|(handle, value)| match value {
            Value::String(s) => format!("{handle}={s}"),
            other => format!("{handle}={other}"),
        })
        .collect::<Vec<_>>()
        .join("|")
}

/// Identity-ish executor: records its execution and returns its rendered
/// input map (so joins show exactly which values arrived on which handles).
/// Capability flags are configurable per instance.
pub struct RecordingExecutor {
    node_type: String,
    log: ExecutionLog,
    pulse: bool,
    preview: bool,
}

impl RecordingExecutor {
    pub fn new(node_type: &str, log: ExecutionLog) -> Self {
        Self {
            node_type: node_type.to_string(),
            log,
            pulse: false,
            preview: false,
        }
    }

    pub fn with_pulse_output(mut self) -> Self {
        self.pulse = true;
        self
    }

    pub fn with_downstream_preview(mut self) -> Self {
        self.preview = true;
        self
    }
}

#[async_trait]
impl NodeExecutor for RecordingExecutor {
    fn node_type(&self) -> &str {
        &self.node_type
    }

    async fn execute(&self, ctx: &ExecutionContext) -> Result<ExecuteResult> {
        self.log.lock().unwrap().push(ctx.node.id.clone());
        Ok(ExecuteResult::from_output(render_inputs(&ctx.inputs)))
    }

    fn has_pulse_output(&self) -> bool {
        self.pulse
    }

    fn tracks_downstream_preview(&self) -> bool {
        self.preview
    }
}

/// Always fails with a backend error (records the attempt first).
pub struct FailingExecutor {
    node_type: String,
    log: ExecutionLog,
    preview: bool,
}

impl FailingExecutor {
    pub fn new(node_type: &str, log: ExecutionLog) -> Self {
        Self {
            node_type: node_type.to_string(),
            log,
            preview: false,
        }
    }

    pub fn with_downstream_preview(mut self) -> Self {
        self.preview = true;
        self
    }
}

#[async_trait]
impl NodeExecutor for FailingExecutor {
    fn node_type(&self) -> &str {
        &self.node_type
    }

    async fn execute(&self, ctx: &ExecutionContext) -> Result<ExecuteResult> {
        self.log.lock().unwrap().push(ctx.node.id.clone());
        Err(FlowError::Backend(format!(
            "simulated failure in {}",
            ctx.node.id
        )))
    }

    fn tracks_downstream_preview(&self) -> bool {
        self.preview
    }
}

/// Emits a sequence of cumulative partial chunks through the streaming
/// callback, then returns the final chunk as its output. Tracks downstream
/// previews like a real generation executor.
pub struct StreamingExecutor {
    node_type: String,
    chunks: Vec<String>,
}

impl StreamingExecutor {
    pub fn new(node_type: &str, chunks: Vec<String>) -> Self {
        Self {
            node_type: node_type.to_string(),
            chunks,
        }
    }
}

#[async_trait]
impl NodeExecutor for StreamingExecutor {
    fn node_type(&self) -> &str {
        &self.node_type
    }

    async fn execute(&self, ctx: &ExecutionContext) -> Result<ExecuteResult> {
        for chunk in &self.chunks {
            ctx.emit(StreamChunk {
                output: chunk.clone(),
                ..StreamChunk::default()
            });
            // Yield so interleaving with observers is realistic.
            tokio::task::yield_now().await;
        }
        let output = self.chunks.last().cloned().unwrap_or_default();
        Ok(ExecuteResult::from_output(output))
    }

    fn tracks_downstream_preview(&self) -> bool {
        true
    }
}

/// Records every state-change callback invocation for assertions.
#[derive(Clone, Default)]
pub struct StateRecorder {
    events: Arc<Mutex<Vec<(String, NodeExecutionState)>>>,
}

impl StateRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn callback(&self) -> StateCallback {
        let events = Arc::clone(&self.events);
        Arc::new(move |node_id, state| {
            events.lock().unwrap().push((node_id.to_string(), state));
        })
    }

    pub fn events(&self) -> Vec<(String, NodeExecutionState)> {
        self.events.lock().unwrap().clone()
    }

    /// All statuses observed for a node, in order.
    pub fn statuses_of(&self, node_id: &str) -> Vec<NodeStatus> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|(id, _)| id == node_id)
            .map(|(_, state)| state.status)
            .collect()
    }

    pub fn last_status(&self, node_id: &str) -> Option<NodeStatus> {
        self.statuses_of(node_id).last().copied()
    }

    /// All state snapshots observed for a node, in order.
    pub fn states_of(&self, node_id: &str) -> Vec<NodeExecutionState> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|(id, _)| id == node_id)
            .map(|(_, state)| state.clone())
            .collect()
    }

    /// Whether the node was never mentioned by any callback.
    pub fn is_untouched(&self, node_id: &str) -> bool {
        self.statuses_of(node_id).is_empty()
    }
}
