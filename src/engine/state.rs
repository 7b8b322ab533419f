// src/engine/state.rs

//! Observable per-node execution state.
//!
//! This is pushed outward through the state-change callback on every
//! transition and every streamed chunk. It is observational only: the
//! orchestrator's scheduling decisions are driven exclusively by the run
//! context.

use std::collections::HashMap;

use serde::Serialize;
use serde_json::Value;

use crate::executor::contract::{ExecuteResult, StreamChunk};

/// Node lifecycle: `Idle -> Running -> {Success, Error}` (terminal).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeStatus {
    Idle,
    Running,
    Success,
    Error,
}

impl NodeStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, NodeStatus::Success | NodeStatus::Error)
    }
}

/// One observable snapshot of a node's execution.
#[derive(Debug, Clone, Serialize)]
pub struct NodeExecutionState {
    pub status: NodeStatus,

    /// Streamed or final primary output.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,

    /// Secondary named output channels from the execute result.
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub named_outputs: HashMap<String, Value>,

    /// For preview sinks mirrored from an upstream producer: the type tag
    /// of the node producing their eventual content.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub producer_type: Option<String>,
}

impl NodeExecutionState {
    fn bare(status: NodeStatus) -> Self {
        Self {
            status,
            output: None,
            error: None,
            reasoning: None,
            named_outputs: HashMap::new(),
            producer_type: None,
        }
    }

    pub fn running() -> Self {
        Self::bare(NodeStatus::Running)
    }

    /// Running state for a preview sink, hinting at which node type is
    /// producing its eventual content.
    pub fn running_preview(producer_type: &str) -> Self {
        Self {
            producer_type: Some(producer_type.to_string()),
            ..Self::bare(NodeStatus::Running)
        }
    }

    /// Streaming update carrying a partial chunk.
    pub fn streaming(chunk: &StreamChunk, producer_type: Option<&str>) -> Self {
        Self {
            output: Some(chunk.output.clone()),
            reasoning: chunk.reasoning.clone(),
            producer_type: producer_type.map(|t| t.to_string()),
            ..Self::bare(NodeStatus::Running)
        }
    }

    /// Terminal success with the full result payload.
    pub fn success(result: &ExecuteResult) -> Self {
        Self {
            output: Some(result.output.clone()),
            reasoning: result.reasoning.clone(),
            named_outputs: result.named_outputs.clone(),
            ..Self::bare(NodeStatus::Success)
        }
    }

    /// Terminal error, optionally attributed to an upstream producer when
    /// mirrored onto a preview sink.
    pub fn failed(message: &str, producer_type: Option<&str>) -> Self {
        Self {
            error: Some(message.to_string()),
            producer_type: producer_type.map(|t| t.to_string()),
            ..Self::bare(NodeStatus::Error)
        }
    }
}
