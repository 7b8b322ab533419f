// src/engine/context.rs

//! Per-run output store.
//!
//! Created fresh per execution and discarded at run end. Nodes running on
//! concurrent branches share it by `Arc`; every access goes through the
//! mutex, so there is no disjoint-write contract to violate. Locks are
//! never held across await points.

use tokio::sync::Mutex;
use tracing::debug;

use crate::graph::model::{ExecutedOutputs, PulseMarker};

#[derive(Debug, Default)]
pub struct RunContext {
    executed: Mutex<ExecutedOutputs>,
    /// Outputs of completed terminal sinks, in completion order.
    sink_outputs: Mutex<Vec<String>>,
}

impl RunContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a node's primary output, marking it completed.
    pub async fn record_output(&self, node_id: &str, output: &str) {
        let mut executed = self.executed.lock().await;
        executed
            .outputs
            .insert(node_id.to_string(), output.to_string());
        debug!(node = %node_id, "recorded node output");
    }

    /// Write the synthetic pulse marker for a node whose executor declares
    /// a pulse output.
    pub async fn record_pulse(&self, node_id: &str) {
        let mut executed = self.executed.lock().await;
        executed
            .pulses
            .insert(node_id.to_string(), PulseMarker::now());
        debug!(node = %node_id, "recorded pulse marker");
    }

    /// Record a terminal sink's output as a run result.
    pub async fn record_sink_output(&self, output: String) {
        self.sink_outputs.lock().await.push(output);
    }

    /// Whether the given node has completed (produced its primary output).
    pub async fn is_completed(&self, node_id: &str) -> bool {
        self.executed.lock().await.contains(node_id)
    }

    /// Ids of all completed nodes, in no particular order.
    pub async fn completed_ids(&self) -> Vec<String> {
        self.executed.lock().await.outputs.keys().cloned().collect()
    }

    /// Point-in-time copy of everything produced so far.
    pub async fn snapshot(&self) -> ExecutedOutputs {
        self.executed.lock().await.clone()
    }

    /// The most recently completed sink's output, if any.
    pub async fn last_sink_output(&self) -> Option<String> {
        self.sink_outputs.lock().await.last().cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn records_outputs_and_pulses_independently() {
        let ctx = RunContext::new();
        ctx.record_output("a", "value").await;
        assert!(ctx.is_completed("a").await);
        assert!(!ctx.is_completed("b").await);

        let snapshot = ctx.snapshot().await;
        assert_eq!(snapshot.outputs.get("a").map(String::as_str), Some("value"));
        assert!(snapshot.pulses.is_empty());
        assert_eq!(ctx.completed_ids().await, vec!["a".to_string()]);

        ctx.record_pulse("a").await;
        let snapshot = ctx.snapshot().await;
        assert!(snapshot.pulses.get("a").is_some_and(|m| m.fired));
    }

    #[tokio::test]
    async fn last_sink_output_is_most_recent() {
        let ctx = RunContext::new();
        assert_eq!(ctx.last_sink_output().await, None);
        ctx.record_sink_output("first".to_string()).await;
        ctx.record_sink_output("second".to_string()).await;
        assert_eq!(ctx.last_sink_output().await.as_deref(), Some("second"));
    }
}
