// tests/run_entry.rs

//! Run entry behaviour: root detection, configuration errors, and
//! fail-fast cancellation before any node is touched.

use std::error::Error;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use flowdag::executor::ExecutorRegistry;
use flowdag::{FlowError, NodeStatus, RunOptions, run, run_with_registry};
use flowdag_test_utils::builders::GraphBuilder;
use flowdag_test_utils::fake_executor::{ExecutionLog, RecordingExecutor, StateRecorder, new_log};
use flowdag_test_utils::{init_tracing, with_timeout};

type TestResult = Result<(), Box<dyn Error>>;

fn registry(log: &ExecutionLog) -> Arc<ExecutorRegistry> {
    let mut registry = ExecutorRegistry::with_builtins();
    registry.register(Arc::new(RecordingExecutor::new("transform", log.clone())));
    registry.register(Arc::new(RecordingExecutor::new("preview", log.clone())));
    Arc::new(registry)
}

#[tokio::test]
async fn node_without_incoming_edges_runs_immediately() -> TestResult {
    init_tracing();

    let (nodes, edges) = GraphBuilder::new()
        .text_node("A", "root value")
        .node("B", "preview")
        .edge("A", "B")
        .build();

    let log = new_log();
    let recorder = StateRecorder::new();

    let result = with_timeout(run_with_registry(
        registry(&log),
        nodes,
        edges,
        recorder.callback(),
        RunOptions::default(),
        CancellationToken::new(),
    ))
    .await?;

    assert_eq!(recorder.last_status("A"), Some(NodeStatus::Success));
    assert_eq!(result.as_deref(), Some("prompt=root value"));
    Ok(())
}

#[tokio::test]
async fn pre_cancelled_run_fails_fast_and_touches_nothing() -> TestResult {
    init_tracing();

    let (nodes, edges) = GraphBuilder::new()
        .text_node("A", "seed")
        .node("B", "preview")
        .edge("A", "B")
        .build();

    let log = new_log();
    let recorder = StateRecorder::new();

    let cancel = CancellationToken::new();
    cancel.cancel();

    let result = run_with_registry(
        registry(&log),
        nodes,
        edges,
        recorder.callback(),
        RunOptions::default(),
        cancel,
    )
    .await;

    let err = result.expect_err("pre-cancelled run must fail");
    assert!(matches!(err, FlowError::Cancelled));
    assert!(err.is_cancellation());

    assert!(log.lock().unwrap().is_empty(), "zero nodes executed");
    assert!(recorder.events().is_empty(), "zero state transitions emitted");
    Ok(())
}

#[tokio::test]
async fn graph_without_roots_is_a_configuration_error() -> TestResult {
    init_tracing();

    // A single unconnected non-sink node: no incoming, but also no
    // outgoing edges, so nothing is executable.
    let (nodes, edges) = GraphBuilder::new().node("lonely", "transform").build();

    let err = run(
        nodes,
        edges,
        StateRecorder::new().callback(),
        RunOptions::default(),
        CancellationToken::new(),
    )
    .await
    .expect_err("no roots must fail the run synchronously");

    assert!(matches!(err, FlowError::NothingToExecute));
    Ok(())
}

#[tokio::test]
async fn empty_graph_is_a_configuration_error() -> TestResult {
    init_tracing();

    let err = run(
        Vec::new(),
        Vec::new(),
        StateRecorder::new().callback(),
        RunOptions::default(),
        CancellationToken::new(),
    )
    .await
    .expect_err("empty graph must fail");

    assert!(matches!(err, FlowError::NothingToExecute));
    Ok(())
}

#[tokio::test]
async fn disconnected_sink_is_inert() -> TestResult {
    init_tracing();

    // A sink with no edges at all is never executed; the connected part of
    // the graph runs normally.
    let (nodes, edges) = GraphBuilder::new()
        .text_node("A", "seed")
        .node("P", "preview")
        .node("orphan", "preview")
        .edge("A", "P")
        .build();

    let log = new_log();
    let recorder = StateRecorder::new();

    let result = with_timeout(run_with_registry(
        registry(&log),
        nodes,
        edges,
        recorder.callback(),
        RunOptions::default(),
        CancellationToken::new(),
    ))
    .await?;

    assert_eq!(result.as_deref(), Some("prompt=seed"));
    assert!(recorder.is_untouched("orphan"));
    assert!(!log.lock().unwrap().contains(&"orphan".to_string()));
    Ok(())
}

#[tokio::test]
async fn unknown_node_type_is_inert_passthrough_not_fatal() -> TestResult {
    init_tracing();

    // "mystery" has no registered executor: the registry falls back to
    // passthrough, so the value flows through unchanged.
    let (nodes, edges) = GraphBuilder::new()
        .text_node("A", "seed")
        .node("M", "mystery")
        .node("P", "preview")
        .edge("A", "M")
        .edge("M", "P")
        .build();

    let log = new_log();
    let recorder = StateRecorder::new();

    let result = with_timeout(run_with_registry(
        registry(&log),
        nodes,
        edges,
        recorder.callback(),
        RunOptions::default(),
        CancellationToken::new(),
    ))
    .await?;

    assert_eq!(recorder.last_status("M"), Some(NodeStatus::Success));
    assert_eq!(result.as_deref(), Some("prompt=seed"));
    Ok(())
}
