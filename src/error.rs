//! Crate-wide error type.
//!
//! Load and config failures, graph integrity violations, and disclosure
//! misuse all surface as [`LnGraphError`].

use thiserror::Error;

/// Every fallible operation in lngraph returns this error.
#[derive(Debug, Error)]
pub enum LnGraphError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The record payload parsed, but its top level is not an array.
    #[error("record payload must be a JSON array of row objects, got {0}")]
    NotAnArray(&'static str),

    /// A `{nodes, links}` payload whose parts have the wrong shape.
    #[error("malformed graph payload: {0}")]
    MalformedGraph(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("invalid color: {0:?}")]
    InvalidColor(String),

    /// Kahn's sort could not consume these nodes; they sit on or behind a cycle.
    #[error("cycle detected among {} node(s): {}", remaining.len(), remaining.join(", "))]
    CycleDetected { remaining: Vec<String> },

    #[error("self-loop on node {0}")]
    SelfLoop(String),

    #[error("unknown node: {0}")]
    UnknownNode(String),

    #[error("node is not visible in the current view: {0}")]
    NodeNotVisible(String),

    #[error("unsupported: {0}")]
    Unsupported(String),

    #[error("{0}")]
    Other(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, LnGraphError>;
