// src/errors.rs

//! Crate-wide error type and `Result` alias.
//!
//! Run-level errors are deliberately narrow: the public `run` entry point
//! only ever fails with configuration or cancellation errors. Per-node
//! execution failures are contained by the orchestrator and surface through
//! the state-change callback instead.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FlowError {
    /// The run was cancelled before or during execution.
    #[error("run cancelled")]
    Cancelled,

    /// The graph contains no executable root nodes.
    #[error("nothing to execute: graph has no root nodes")]
    NothingToExecute,

    /// An executor required an input connection that was not present.
    #[error("node {node}: missing required input \"{handle}\"")]
    MissingInput { node: String, handle: String },

    /// A node's data bag did not contain what its executor expects.
    #[error("node {node}: invalid node data: {reason}")]
    InvalidNodeData { node: String, reason: String },

    /// A generation backend reported a failure.
    #[error("backend error: {0}")]
    Backend(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl FlowError {
    /// Whether this error represents an intentional abort rather than a
    /// genuine failure, so callers can suppress user-facing noise.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, FlowError::Cancelled)
    }
}

pub type Result<T> = std::result::Result<T, FlowError>;
