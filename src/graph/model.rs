// src/graph/model.rs

//! Node and edge types for one flow run.
//!
//! Nodes and edges are supplied as immutable lists for the duration of a
//! run; the engine never adds or removes them. Field names follow the
//! canvas editor's JSON export (`type`, `sourceHandle`, `targetHandle`).

use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Reserved handle name marking a pulse edge: it carries no payload value,
/// only a completion signal.
pub const DONE_HANDLE: &str = "done";

/// Canonical input slot used when an edge has no explicit `targetHandle`.
pub const DEFAULT_INPUT_HANDLE: &str = "prompt";

/// A graph vertex representing one unit of work, typed by a tag that
/// selects its executor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    /// Unique, stable identifier.
    pub id: String,

    /// Type tag selecting the executor for this node.
    #[serde(rename = "type")]
    pub node_type: String,

    /// Opaque, executor-defined key/value bag carrying configuration and,
    /// after execution, result fields.
    #[serde(default)]
    pub data: Value,
}

impl Node {
    pub fn new(id: impl Into<String>, node_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            node_type: node_type.into(),
            data: Value::Null,
        }
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = data;
        self
    }
}

/// A directed connection from one node's named output to another node's
/// named input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edge {
    pub id: String,
    pub source: String,
    pub target: String,

    /// Which output of the source is carried; absence means the primary
    /// output. The reserved value [`DONE_HANDLE`] makes this a pulse edge.
    #[serde(rename = "sourceHandle", default, skip_serializing_if = "Option::is_none")]
    pub source_handle: Option<String>,

    /// Which logical input slot on the target receives the value; absence
    /// defaults to [`DEFAULT_INPUT_HANDLE`].
    #[serde(rename = "targetHandle", default, skip_serializing_if = "Option::is_none")]
    pub target_handle: Option<String>,
}

impl Edge {
    pub fn new(
        id: impl Into<String>,
        source: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            target: target.into(),
            source_handle: None,
            target_handle: None,
        }
    }

    pub fn with_source_handle(mut self, handle: impl Into<String>) -> Self {
        self.source_handle = Some(handle.into());
        self
    }

    pub fn with_target_handle(mut self, handle: impl Into<String>) -> Self {
        self.target_handle = Some(handle.into());
        self
    }

    /// Whether this edge carries only a completion signal.
    pub fn is_pulse(&self) -> bool {
        self.source_handle.as_deref() == Some(DONE_HANDLE)
    }
}

/// Synthetic completion record written for nodes whose executor declares a
/// pulse output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PulseMarker {
    pub fired: bool,
    #[serde(rename = "firedAt")]
    pub fired_at: u128,
}

impl PulseMarker {
    /// A marker stamped with the current wall-clock time.
    pub fn now() -> Self {
        let fired_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or(0);
        Self {
            fired: true,
            fired_at,
        }
    }
}

/// Snapshot of what has completed so far in a run.
///
/// Two kinds of entries: the primary output string per completed node, and
/// the synthetic pulse marker per completed node whose executor declares a
/// pulse output. Pure query functions take this by reference; the
/// engine's `RunContext` owns the mutable original behind a mutex.
#[derive(Debug, Clone, Default)]
pub struct ExecutedOutputs {
    pub outputs: HashMap<String, String>,
    pub pulses: HashMap<String, PulseMarker>,
}

impl ExecutedOutputs {
    /// Whether the given node has produced its primary output.
    pub fn contains(&self, node_id: &str) -> bool {
        self.outputs.contains_key(node_id)
    }

    /// Resolve the value an edge from `source` with the given source handle
    /// would carry, or `None` if the source has not executed (or declares no
    /// pulse, for pulse edges).
    pub fn resolve(&self, source: &str, source_handle: Option<&str>) -> Option<Value> {
        if source_handle == Some(DONE_HANDLE) {
            let marker = self.pulses.get(source)?;
            // Serializing a PulseMarker cannot fail.
            serde_json::to_value(marker).ok()
        } else {
            self.outputs
                .get(source)
                .map(|s| Value::String(s.clone()))
        }
    }
}
