// src/executor/registry.rs

//! Type tag to executor lookup table.
//!
//! Populated once at startup. Lookup failure is not fatal: the orchestrator
//! resolves unknown types to a passthrough behaviour so experimental node
//! types stay inert instead of breaking the run.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::warn;

use crate::executor::builtin::{PassthroughExecutor, TextExecutor};
use crate::executor::contract::NodeExecutor;

pub struct ExecutorRegistry {
    executors: HashMap<String, Arc<dyn NodeExecutor>>,
    passthrough: Arc<dyn NodeExecutor>,
}

impl ExecutorRegistry {
    /// An empty registry (unknown types still resolve to passthrough).
    pub fn new() -> Self {
        Self {
            executors: HashMap::new(),
            passthrough: Arc::new(PassthroughExecutor),
        }
    }

    /// Registry with the built-in executors registered.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(TextExecutor));
        registry
    }

    /// Register an executor under its own type tag, replacing any previous
    /// registration for that tag.
    pub fn register(&mut self, executor: Arc<dyn NodeExecutor>) {
        self.executors
            .insert(executor.node_type().to_string(), executor);
    }

    /// Exact lookup, `None` for unknown tags.
    pub fn get(&self, node_type: &str) -> Option<&Arc<dyn NodeExecutor>> {
        self.executors.get(node_type)
    }

    pub fn contains(&self, node_type: &str) -> bool {
        self.executors.contains_key(node_type)
    }

    /// All registered type tags.
    pub fn node_types(&self) -> Vec<&str> {
        self.executors.keys().map(|s| s.as_str()).collect()
    }

    /// Resolve a type tag to an executor, falling back to passthrough for
    /// unknown tags.
    pub fn resolve(&self, node_type: &str) -> Arc<dyn NodeExecutor> {
        match self.executors.get(node_type) {
            Some(executor) => Arc::clone(executor),
            None => {
                warn!(
                    node_type = %node_type,
                    "no executor registered for node type; using passthrough"
                );
                Arc::clone(&self.passthrough)
            }
        }
    }
}

impl Default for ExecutorRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}
