//! Error types for nodeflow.
//!
//! Errors fall into three groups that are handled very differently:
//!
//! - Graph errors (`ValidationError`, `CycleError`) reject a workflow before
//!   any node runs.
//! - `NodeError` is scoped to a single node. The engine records it in the
//!   node's report and skips the node's dependents; it never aborts the
//!   evaluation on its own.
//! - Everything else in `NodeflowError` is an infrastructure fault
//!   (serialization, I/O, task failure) and aborts the current operation.
//!
//! Every variant carries a stable code (`E101`, `E201`, ...) that is also
//! surfaced by the HTTP API.

use crate::flow::ValidationError;
use crate::types::NodeId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// A cycle found in a workflow graph.
///
/// `nodes` lists the IDs along the cycle. When produced by the graph
/// builder it is the path of a back edge, starting at the node the back
/// edge returns to. When produced by the scheduler it is every node left
/// unordered, sorted ascending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleError {
    /// Node IDs participating in the cycle.
    pub nodes: Vec<NodeId>,
}

impl CycleError {
    /// Create a cycle error from the participating node IDs.
    pub fn new(nodes: Vec<NodeId>) -> Self {
        Self { nodes }
    }
}

impl fmt::Display for CycleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path: Vec<&str> = self.nodes.iter().map(NodeId::as_str).collect();
        write!(f, "cycle detected through nodes [{}]", path.join(", "))
    }
}

impl std::error::Error for CycleError {}

/// Failure of a single node evaluation.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NodeError {
    /// A declared required input had no value when the node was invoked.
    #[error("E201: node '{node_id}' is missing required input '{port}'")]
    MissingInput {
        /// The node that could not run.
        node_id: NodeId,
        /// The input port without a value.
        port: String,
    },

    /// The computation exceeded its time budget.
    #[error("E202: node '{node_id}' exceeded its time budget of {timeout_ms}ms")]
    Timeout {
        /// The node that timed out.
        node_id: NodeId,
        /// The budget that was exceeded.
        timeout_ms: u64,
    },

    /// The computation returned an error, panicked, or produced invalid outputs.
    #[error("E203: computation for node '{node_id}' failed: {cause}")]
    ComputationFailed {
        /// The failing node.
        node_id: NodeId,
        /// What went wrong.
        cause: String,
    },

    /// No computation is registered for the node's type tag.
    #[error("E204: no computation registered for type '{node_type}' (node '{node_id}')")]
    UnregisteredType {
        /// The node carrying the unknown tag.
        node_id: NodeId,
        /// The unknown tag.
        node_type: String,
    },
}

impl NodeError {
    /// Get the error code (e.g., "E201").
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingInput { .. } => "E201",
            Self::Timeout { .. } => "E202",
            Self::ComputationFailed { .. } => "E203",
            Self::UnregisteredType { .. } => "E204",
        }
    }

    /// Short machine-readable name of the failure kind.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissingInput { .. } => "missing_input",
            Self::Timeout { .. } => "timeout",
            Self::ComputationFailed { .. } => "computation_failed",
            Self::UnregisteredType { .. } => "unregistered_type",
        }
    }

    /// The node this error belongs to.
    #[must_use]
    pub fn node_id(&self) -> &NodeId {
        match self {
            Self::MissingInput { node_id, .. }
            | Self::Timeout { node_id, .. }
            | Self::ComputationFailed { node_id, .. }
            | Self::UnregisteredType { node_id, .. } => node_id,
        }
    }
}

/// Error returned by a computation.
///
/// The executor wraps it into `NodeError::ComputationFailed`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ComputeError {
    /// An input value had the wrong shape for this computation.
    #[error("invalid input '{port}': {message}")]
    InvalidInput {
        /// The offending input port.
        port: String,
        /// What was wrong with it.
        message: String,
    },

    /// The node configuration is missing a key or holds an unusable value.
    #[error("invalid config '{key}': {message}")]
    InvalidConfig {
        /// The offending configuration key.
        key: String,
        /// What was wrong with it.
        message: String,
    },

    /// Any other failure.
    #[error("{0}")]
    Failed(String),
}

impl ComputeError {
    /// Create an invalid input error.
    pub fn invalid_input(port: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidInput {
            port: port.into(),
            message: message.into(),
        }
    }

    /// Create an invalid config error.
    pub fn invalid_config(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            key: key.into(),
            message: message.into(),
        }
    }

    /// Create a generic failure.
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }
}

/// The main error type for nodeflow operations.
#[derive(Error, Debug)]
pub enum NodeflowError {
    // =========================================================================
    // Graph Errors (E100-E199)
    // =========================================================================
    /// The workflow failed structural validation.
    #[error("E101: {0}")]
    Validation(#[from] ValidationError),

    /// The workflow contains a cycle.
    #[error("E102: {0}")]
    Cycle(#[from] CycleError),

    // =========================================================================
    // Node Errors (E200-E299)
    // =========================================================================
    /// A single node failed. Carries its own code.
    #[error(transparent)]
    Node(#[from] NodeError),

    // =========================================================================
    // Engine Errors (E300-E399)
    // =========================================================================
    /// A node state transition that the lifecycle does not allow.
    #[error("E301: invalid state transition for node '{node_id}': {from} -> {to}")]
    InvalidTransition {
        /// The node whose state was being changed.
        node_id: NodeId,
        /// Current state.
        from: String,
        /// Requested state.
        to: String,
    },

    /// A spawned evaluation task failed outside of the node computation.
    #[error("E302: evaluation task failed: {0}")]
    TaskFailed(String),

    // =========================================================================
    // Configuration/Serialization Errors (E800-E899)
    // =========================================================================
    /// Failed to parse a workflow document.
    #[error("E801: failed to parse workflow: {cause}")]
    Parse {
        /// Parser error message.
        cause: String,
    },

    /// A configuration value could not be used.
    #[error("E802: invalid configuration value for '{field}': {cause}")]
    ConfigValue {
        /// The configuration field.
        field: String,
        /// Why the value was rejected.
        cause: String,
    },

    /// Serialization of a value or result failed.
    #[error("E804: serialization error: {0}")]
    Serialization(String),

    // =========================================================================
    // I/O Errors (E900-E999)
    // =========================================================================
    /// Filesystem failure.
    #[error("E901: I/O error at {path}: {cause}")]
    Io {
        /// The path involved.
        path: PathBuf,
        /// Underlying error.
        cause: String,
    },

    /// Socket or listener failure.
    #[error("E902: network error: {cause}")]
    Network {
        /// Underlying error.
        cause: String,
    },
}

impl NodeflowError {
    /// Get the error code (e.g., "E101").
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "E101",
            Self::Cycle(_) => "E102",
            Self::Node(e) => e.code(),
            Self::InvalidTransition { .. } => "E301",
            Self::TaskFailed(_) => "E302",
            Self::Parse { .. } => "E801",
            Self::ConfigValue { .. } => "E802",
            Self::Serialization(_) => "E804",
            Self::Io { .. } => "E901",
            Self::Network { .. } => "E902",
        }
    }

    /// Whether the error was caused by the submitted workflow rather than
    /// by the engine. Such errors map to a rejected request.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::Validation(_) | Self::Cycle(_) | Self::Parse { .. }
        )
    }

    /// Check if this error is a configuration error.
    #[must_use]
    pub fn is_config_error(&self) -> bool {
        matches!(self, Self::ConfigValue { .. })
    }
}

/// Result type alias using `NodeflowError`.
pub type Result<T> = std::result::Result<T, NodeflowError>;
