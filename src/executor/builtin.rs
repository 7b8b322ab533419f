// src/executor/builtin.rs

//! Executors the engine ships with.
//!
//! Real generation executors (text/image/audio backends) live with the
//! application and are registered by the caller; the engine itself only
//! carries the passthrough fallback and the text source node every canvas
//! graph starts from.

use async_trait::async_trait;
use serde_json::Value;

use crate::errors::{FlowError, Result};
use crate::executor::contract::{ExecuteResult, ExecutionContext, NodeExecutor};

/// Forwards the first available input value unchanged.
///
/// Also used by the registry as the fallback for unknown node types, so an
/// unrecognised node behaves as a wire rather than aborting the run.
pub struct PassthroughExecutor;

#[async_trait]
impl NodeExecutor for PassthroughExecutor {
    fn node_type(&self) -> &str {
        "passthrough"
    }

    async fn execute(&self, ctx: &ExecutionContext) -> Result<ExecuteResult> {
        let output = match ctx.first_input() {
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => String::new(),
        };
        Ok(ExecuteResult::from_output(output))
    }
}

/// Returns the node's configured `data["text"]`, ignoring inputs.
pub struct TextExecutor;

#[async_trait]
impl NodeExecutor for TextExecutor {
    fn node_type(&self) -> &str {
        "text"
    }

    async fn execute(&self, ctx: &ExecutionContext) -> Result<ExecuteResult> {
        let text = ctx
            .node
            .data
            .get("text")
            .and_then(|v| v.as_str())
            .ok_or_else(|| FlowError::InvalidNodeData {
                node: ctx.node.id.clone(),
                reason: "expected a string field \"text\"".to_string(),
            })?;
        Ok(ExecuteResult::from_output(text))
    }
}
