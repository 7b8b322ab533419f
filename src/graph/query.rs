// src/graph/query.rs

//! Pure structural queries over the node/edge lists.
//!
//! All functions here are deterministic given their inputs and never fail
//! for absent edges or nodes; they return empty collections instead. Each
//! call is an O(E) scan; graphs are small and correctness wins over
//! caching.

use std::collections::{HashMap, HashSet, VecDeque};

use serde_json::Value;

use crate::graph::model::{DEFAULT_INPUT_HANDLE, Edge, ExecutedOutputs, Node};

/// Edges leaving the given node.
pub fn outgoing<'a>(edges: &'a [Edge], node_id: &str) -> Vec<&'a Edge> {
    edges.iter().filter(|e| e.source == node_id).collect()
}

/// Edges targeting the given node.
pub fn incoming<'a>(edges: &'a [Edge], node_id: &str) -> Vec<&'a Edge> {
    edges.iter().filter(|e| e.target == node_id).collect()
}

/// Breadth-first search from `start`, collecting every reachable node whose
/// type is in `sink_types`, without crossing nodes whose type is in
/// `boundary_types`.
///
/// A boundary node can itself be collected if it is also a sink type, but
/// its outgoing edges are never expanded: a sink behind an intermediate
/// generator must not receive partial text meant for a different branch.
/// The start node expands regardless of its own type.
pub fn downstream_sinks_of(
    nodes: &[Node],
    edges: &[Edge],
    start: &str,
    sink_types: &[String],
    boundary_types: &[String],
) -> Vec<String> {
    let types: HashMap<&str, &str> = nodes
        .iter()
        .map(|n| (n.id.as_str(), n.node_type.as_str()))
        .collect();

    let mut sinks = Vec::new();
    let mut visited: HashSet<&str> = HashSet::new();
    let mut queue: VecDeque<&str> = VecDeque::new();

    visited.insert(start);
    queue.push_back(start);

    while let Some(current) = queue.pop_front() {
        for edge in edges.iter().filter(|e| e.source == current) {
            let target = edge.target.as_str();
            if !visited.insert(target) {
                continue;
            }
            let Some(ty) = types.get(target) else {
                // Edge pointing at a node not in the list; skip quietly.
                continue;
            };

            if sink_types.iter().any(|s| s == ty) {
                sinks.push(target.to_string());
            }

            // Opaque boundaries are collected (if sinks) but never expanded.
            if !boundary_types.iter().any(|b| b == ty) {
                queue.push_back(target);
            }
        }
    }

    sinks
}

/// Build the handle-to-value input map for a node from the outputs produced
/// so far.
///
/// For every incoming edge whose source has already executed: the key is the
/// edge's `targetHandle` (or [`DEFAULT_INPUT_HANDLE`] if absent) and the
/// value is the pulse marker when `sourceHandle` is the reserved `done`
/// handle, otherwise the source's primary output string. Edges from
/// unexecuted sources are silently skipped; the caller only collects inputs
/// once readiness is confirmed.
pub fn collect_inputs(
    node_id: &str,
    edges: &[Edge],
    executed: &ExecutedOutputs,
) -> HashMap<String, Value> {
    let mut inputs = HashMap::new();

    for edge in edges.iter().filter(|e| e.target == node_id) {
        let Some(value) = executed.resolve(&edge.source, edge.source_handle.as_deref()) else {
            continue;
        };
        let handle = edge
            .target_handle
            .clone()
            .unwrap_or_else(|| DEFAULT_INPUT_HANDLE.to_string());
        inputs.insert(handle, value);
    }

    inputs
}
