// src/engine/orchestrator.rs

//! The scheduler proper.
//!
//! Walks the graph from its roots, enforcing a readiness gate per node
//! (every upstream source completed), running independent branches
//! concurrently and joining reconverging ones through a map of shared
//! in-flight futures, forwarding streamed partial results to reachable
//! preview sinks, and containing per-node failures so one broken branch
//! never aborts unrelated work.

use std::collections::HashMap;
use std::sync::Arc;

use futures::FutureExt;
use futures::future::{BoxFuture, Shared, join_all};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::engine::RunOptions;
use crate::engine::context::RunContext;
use crate::engine::state::NodeExecutionState;
use crate::errors::{FlowError, Result};
use crate::executor::contract::{ExecutionContext, StateCallback, StreamCallback, StreamChunk};
use crate::executor::registry::ExecutorRegistry;
use crate::graph::model::{Edge, Node};
use crate::graph::query::{collect_inputs, downstream_sinks_of, incoming, outgoing};

/// How one node's in-flight execution ended, fanned out to every waiter of
/// its shared handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeOutcome {
    /// Executed and recorded its output.
    Completed,
    /// Executor failed; dependents never become ready.
    Failed,
    /// Never executed: cancelled, or its dependencies were not satisfied.
    Skipped,
}

/// Joinable completion handle for one node, shared by every dependent that
/// awaits it. Late-arriving dependents attach to the already-started
/// execution instead of starting a duplicate.
type NodeHandle = Shared<BoxFuture<'static, NodeOutcome>>;

/// Shared state for one run, threaded through the node futures.
struct RunState {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    registry: Arc<ExecutorRegistry>,
    context: Arc<RunContext>,
    on_state_change: StateCallback,
    options: RunOptions,
    cancel: CancellationToken,
    inflight: Mutex<HashMap<String, NodeHandle>>,
}

impl RunState {
    fn node(&self, node_id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == node_id)
    }

    fn emit(&self, node_id: &str, state: NodeExecutionState) {
        (self.on_state_change)(node_id, state);
    }

    /// Readiness gate: every edge targeting the node has a completed source.
    async fn deps_satisfied(&self, node_id: &str) -> bool {
        let snapshot = self.context.snapshot().await;
        incoming(&self.edges, node_id)
            .iter()
            .all(|edge| snapshot.contains(&edge.source))
    }
}

pub struct Orchestrator {
    registry: Arc<ExecutorRegistry>,
}

impl Orchestrator {
    pub fn new(registry: Arc<ExecutorRegistry>) -> Self {
        Self { registry }
    }

    /// Registry-backed orchestrator with the built-in executors.
    pub fn with_builtins() -> Self {
        Self::new(Arc::new(ExecutorRegistry::with_builtins()))
    }

    /// Drive the graph to completion.
    ///
    /// Fails only for configuration errors (no executable roots) or a run
    /// that is already cancelled; per-node failures are contained and
    /// observable solely through the state callback. Returns the most
    /// recently completed sink's output as a convenience for single-sink
    /// graphs.
    pub async fn run(
        &self,
        nodes: Vec<Node>,
        edges: Vec<Edge>,
        on_state_change: StateCallback,
        options: RunOptions,
        cancel: CancellationToken,
    ) -> Result<Option<String>> {
        if cancel.is_cancelled() {
            debug!("run invoked with an already-cancelled token");
            return Err(FlowError::Cancelled);
        }

        // A root has no incoming edges and at least one outgoing edge.
        // Disconnected sinks are inert: never executed.
        let roots: Vec<String> = nodes
            .iter()
            .filter(|n| {
                incoming(&edges, &n.id).is_empty() && !outgoing(&edges, &n.id).is_empty()
            })
            .map(|n| n.id.clone())
            .collect();

        if roots.is_empty() {
            return Err(FlowError::NothingToExecute);
        }

        info!(?roots, node_count = nodes.len(), "starting flow run");

        let state = Arc::new(RunState {
            nodes,
            edges,
            registry: Arc::clone(&self.registry),
            context: Arc::new(RunContext::new()),
            on_state_change,
            options,
            cancel,
            inflight: Mutex::new(HashMap::new()),
        });

        let mut handles = Vec::with_capacity(roots.len());
        for root in &roots {
            handles.push(node_handle(&state, root).await);
        }
        join_all(handles).await;

        let result = state.context.last_sink_output().await;
        info!(has_result = result.is_some(), "flow run finished");
        Ok(result)
    }
}

/// Get the node's in-flight handle, creating and registering it on first
/// request. This is what makes diamond-shaped reconvergence execute the
/// downstream node exactly once.
async fn node_handle(state: &Arc<RunState>, node_id: &str) -> NodeHandle {
    let mut inflight = state.inflight.lock().await;
    if let Some(handle) = inflight.get(node_id) {
        return handle.clone();
    }
    let handle: NodeHandle = execute_node(Arc::clone(state), node_id.to_string()).shared();
    inflight.insert(node_id.to_string(), handle.clone());
    handle
}

/// Existing in-flight handles of a node's direct upstream neighbours.
/// Handles are not created here: an upstream with no handle either already
/// completed or will never run.
async fn upstream_handles(state: &Arc<RunState>, node_id: &str) -> Vec<NodeHandle> {
    let inflight = state.inflight.lock().await;
    incoming(&state.edges, node_id)
        .iter()
        .filter_map(|edge| inflight.get(&edge.source).cloned())
        .collect()
}

/// Execute one node end to end. Never returns an error: failures are
/// recorded as the node's terminal state and reported as [`NodeOutcome`].
///
/// Boxed rather than an `async fn`: the future awaits the handles of other
/// nodes, whose futures in turn come from this function, and the type
/// erasure is what keeps that recursion well-founded for the compiler.
fn execute_node(state: Arc<RunState>, node_id: String) -> BoxFuture<'static, NodeOutcome> {
    Box::pin(async move {
        // A cancelled run stops scheduling new nodes at the engine level;
        // executors additionally watch the token during their own I/O.
        if state.cancel.is_cancelled() {
            debug!(node = %node_id, "run cancelled; node not started");
            return NodeOutcome::Skipped;
        }

        if state.context.is_completed(&node_id).await {
            return NodeOutcome::Completed;
        }

        let Some(node) = state.node(&node_id).cloned() else {
            warn!(node = %node_id, "edge references a node not in the graph; skipping");
            return NodeOutcome::Skipped;
        };

        // Readiness gate: wait on upstream in-flight handles (no polling),
        // then re-check. Still unsatisfied means an upstream failed or was
        // never started; the node stays idle.
        if !state.deps_satisfied(&node_id).await {
            let upstream = upstream_handles(&state, &node_id).await;
            join_all(upstream).await;

            if !state.deps_satisfied(&node_id).await {
                debug!(node = %node_id, "dependencies not satisfied; leaving node idle");
                return NodeOutcome::Skipped;
            }
        }

        if state.cancel.is_cancelled() {
            debug!(node = %node_id, "run cancelled while waiting on dependencies");
            return NodeOutcome::Skipped;
        }

        // Optional pacing for perceptible step-by-step feedback.
        if let Some(delay) = state.options.step_delay {
            tokio::time::sleep(delay).await;
        }

        let executor = state.registry.resolve(&node.node_type);

        // Sinks that should see this node's running/streaming/error state
        // live.
        let preview_sinks: Vec<String> = if executor.tracks_downstream_preview() {
            downstream_sinks_of(
                &state.nodes,
                &state.edges,
                &node_id,
                &state.options.sink_types,
                &state.options.boundary_types,
            )
        } else {
            Vec::new()
        };

        debug!(node = %node_id, node_type = %node.node_type, "node starting");
        state.emit(&node_id, NodeExecutionState::running());
        for sink in &preview_sinks {
            state.emit(sink, NodeExecutionState::running_preview(&node.node_type));
        }

        let inputs = collect_inputs(&node_id, &state.edges, &state.context.snapshot().await);

        let stream: StreamCallback = {
            let state = Arc::clone(&state);
            let node_id = node_id.clone();
            let node_type = node.node_type.clone();
            let sinks = preview_sinks.clone();
            Arc::new(move |chunk: StreamChunk| {
                state.emit(&node_id, NodeExecutionState::streaming(&chunk, None));
                for sink in &sinks {
                    state.emit(sink, NodeExecutionState::streaming(&chunk, Some(&node_type)));
                }
            })
        };

        let ctx = ExecutionContext {
            node: node.clone(),
            inputs,
            run_context: Arc::clone(&state.context),
            options: state.options.clone(),
            cancel: state.cancel.clone(),
            stream,
            on_state_change: Arc::clone(&state.on_state_change),
        };

        match executor.execute(&ctx).await {
            Ok(result) => {
                state.context.record_output(&node_id, &result.output).await;
                if executor.has_pulse_output() {
                    state.context.record_pulse(&node_id).await;
                }
                state.emit(&node_id, NodeExecutionState::success(&result));
                debug!(node = %node_id, "node completed");

                if state.options.is_sink_type(&node.node_type) {
                    // Terminal sink: collect the run result, do not recurse.
                    state.context.record_sink_output(result.output).await;
                    return NodeOutcome::Completed;
                }

                // Fan out to every now-ready target and join them together.
                // Targets still waiting on another branch are started by
                // whichever upstream completes last.
                let mut children = Vec::new();
                for edge in outgoing(&state.edges, &node_id) {
                    if state.deps_satisfied(&edge.target).await {
                        children.push(node_handle(&state, &edge.target).await);
                    }
                }
                join_all(children).await;

                // Child failures are their own terminal states; this node
                // still completed.
                NodeOutcome::Completed
            }
            Err(error) => {
                warn!(node = %node_id, %error, "node failed; containing failure to this branch");
                let message = error.to_string();
                state.emit(&node_id, NodeExecutionState::failed(&message, None));
                for sink in &preview_sinks {
                    state.emit(
                        sink,
                        NodeExecutionState::failed(&message, Some(&node.node_type)),
                    );
                }
                NodeOutcome::Failed
            }
        }
    })
}
