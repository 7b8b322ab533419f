// src/executor/mod.rs

//! Pluggable node execution layer.
//!
//! The orchestrator never knows what running a node of a given type means;
//! it resolves the node's type tag through the [`registry`] and invokes the
//! resulting [`NodeExecutor`] through the narrow [`ExecutionContext`]
//! surface. This is the seam tests use to substitute fake executors.
//!
//! - [`contract`] defines the `NodeExecutor` trait, the execution context,
//!   and the result/streaming types.
//! - [`registry`] maps type tags to executors, with a passthrough fallback
//!   for unknown types.
//! - [`builtin`] contains the executors the engine ships with.

pub mod builtin;
pub mod contract;
pub mod registry;

pub use builtin::{PassthroughExecutor, TextExecutor};
pub use contract::{
    ExecuteResult, ExecutionContext, NodeExecutor, StateCallback, StreamCallback, StreamChunk,
};
pub use registry::ExecutorRegistry;
