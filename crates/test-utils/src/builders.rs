#![allow(dead_code)]

use flowdag::{Edge, Node};
use serde_json::Value;

/// Builder for node/edge lists to simplify test setup. Edge ids are
/// generated (`e0`, `e1`, ...) since the engine never inspects them.
pub struct GraphBuilder {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    next_edge: usize,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            edges: Vec::new(),
            next_edge: 0,
        }
    }

    pub fn node(mut self, id: &str, node_type: &str) -> Self {
        self.nodes.push(Node::new(id, node_type));
        self
    }

    pub fn node_with_data(mut self, id: &str, node_type: &str, data: Value) -> Self {
        self.nodes.push(Node::new(id, node_type).with_data(data));
        self
    }

    /// Text source node with configured content (the canonical root).
    pub fn text_node(self, id: &str, text: &str) -> Self {
        self.node_with_data(id, "text", serde_json::json!({ "text": text }))
    }

    pub fn edge(mut self, source: &str, target: &str) -> Self {
        let edge = Edge::new(self.next_edge_id(), source, target);
        self.edges.push(edge);
        self
    }

    pub fn edge_to_handle(mut self, source: &str, target: &str, target_handle: &str) -> Self {
        let edge = Edge::new(self.next_edge_id(), source, target)
            .with_target_handle(target_handle);
        self.edges.push(edge);
        self
    }

    pub fn edge_with_handles(
        mut self,
        source: &str,
        source_handle: &str,
        target: &str,
        target_handle: &str,
    ) -> Self {
        let edge = Edge::new(self.next_edge_id(), source, target)
            .with_source_handle(source_handle)
            .with_target_handle(target_handle);
        self.edges.push(edge);
        self
    }

    pub fn build(self) -> (Vec<Node>, Vec<Edge>) {
        (self.nodes, self.edges)
    }

    fn next_edge_id(&mut self) -> String {
        let id = format!("e{}", self.next_edge);
        self.next_edge += 1;
        id
    }
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}
