// src/graph/mod.rs

//! Graph data model and structural queries.
//!
//! - [`model`] defines the node/edge types handed to the engine by the
//!   editor or persistence layer, plus the executed-output snapshot types.
//! - [`query`] contains pure, stateless functions answering structural
//!   questions (neighbours, reachable sinks, input collection).
//!
//! The engine assumes the graph is already validated upstream: acyclic,
//! with unique node ids and edges referencing existing nodes.

pub mod model;
pub mod query;

pub use model::{DEFAULT_INPUT_HANDLE, DONE_HANDLE, Edge, ExecutedOutputs, Node, PulseMarker};
pub use query::{collect_inputs, downstream_sinks_of, incoming, outgoing};
