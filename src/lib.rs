// src/lib.rs

//! flowdag, an embeddable flow execution engine.
//!
//! Takes a finalized, already-validated graph of typed nodes and
//! handle-addressed edges and drives it to completion: resolving data
//! dependencies, running independent branches concurrently, joining
//! branches that reconverge, forwarding streamed partial results to preview
//! sinks, and isolating per-branch failures so one broken node does not
//! abort unrelated work.
//!
//! The engine's boundary is the [`executor::NodeExecutor`] contract: what
//! running a node of a given type means is pluggable, registered in an
//! [`executor::ExecutorRegistry`] by type tag. Observable progress flows
//! out through a state-change callback; scheduling itself is driven only by
//! the per-run output store.

pub mod engine;
pub mod errors;
pub mod executor;
pub mod graph;

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

pub use engine::{NodeExecutionState, NodeStatus, Orchestrator, RunContext, RunOptions};
pub use errors::{FlowError, Result};
pub use executor::{
    ExecuteResult, ExecutionContext, ExecutorRegistry, NodeExecutor, StateCallback,
    StreamCallback, StreamChunk,
};
pub use graph::{DEFAULT_INPUT_HANDLE, DONE_HANDLE, Edge, Node, PulseMarker};

/// Execute a flow graph end to end with the built-in executor registry.
///
/// The single public entry point for callers that don't register their own
/// executors. `on_state_change` is invoked on every status transition and
/// every streamed chunk; per-node failures surface only there, never through
/// this function's error channel. The returned value is the most recently
/// completed sink's output (a convenience for single-sink graphs).
///
/// Fails fast with [`FlowError::Cancelled`] if `cancel` is already
/// triggered, and with [`FlowError::NothingToExecute`] if the graph has no
/// executable roots.
pub async fn run(
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    on_state_change: StateCallback,
    options: RunOptions,
    cancel: CancellationToken,
) -> Result<Option<String>> {
    let orchestrator = Orchestrator::with_builtins();
    orchestrator
        .run(nodes, edges, on_state_change, options, cancel)
        .await
}

/// Same as [`run`], but over a caller-assembled executor registry.
pub async fn run_with_registry(
    registry: Arc<ExecutorRegistry>,
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    on_state_change: StateCallback,
    options: RunOptions,
    cancel: CancellationToken,
) -> Result<Option<String>> {
    Orchestrator::new(registry)
        .run(nodes, edges, on_state_change, options, cancel)
        .await
}
