//! Evaluation results.

use super::state::NodeState;
use nodeflow_core::{NodeError, NodeId, Value};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Overall outcome of an evaluation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvaluationStatus {
    /// Every node succeeded.
    Completed,
    /// At least one node failed; the rest ran on a best-effort basis.
    CompletedWithFailures,
    /// The caller cancelled the evaluation.
    Cancelled,
    /// Strict mode stopped the evaluation at the first failure.
    Aborted,
    /// The graph was refused before any node ran.
    Rejected,
    /// The engine faulted; no result was produced.
    Failed,
}

impl EvaluationStatus {
    /// Snake-case name as used on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::CompletedWithFailures => "completed_with_failures",
            Self::Cancelled => "cancelled",
            Self::Aborted => "aborted",
            Self::Rejected => "rejected",
            Self::Failed => "failed",
        }
    }

    /// Whether the evaluation fully succeeded.
    pub fn is_success(self) -> bool {
        self == Self::Completed
    }
}

impl fmt::Display for EvaluationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a node never ran.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum SkipReason {
    /// A node feeding one of its inputs failed or was skipped.
    Upstream {
        /// The input port whose feed did not settle.
        input_port: String,
        /// The feeding node.
        source: NodeId,
        /// The feeding node's output port.
        source_port: String,
        /// The failed node at the origin of the chain.
        root: NodeId,
    },
    /// The caller cancelled the evaluation before the node started.
    Cancelled,
    /// Strict mode stopped scheduling before the node started.
    Aborted,
}

/// Outcome of one node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeReport {
    /// Final lifecycle state.
    pub status: NodeState,
    /// Failure detail for failed nodes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<NodeError>,
    /// Skip detail for skipped nodes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip: Option<SkipReason>,
}

impl NodeReport {
    /// Report for a succeeded node.
    pub fn succeeded() -> Self {
        Self {
            status: NodeState::Succeeded,
            error: None,
            skip: None,
        }
    }

    /// Report for a failed node.
    pub fn failed(error: NodeError) -> Self {
        Self {
            status: NodeState::Failed,
            error: Some(error),
            skip: None,
        }
    }

    /// Report for a skipped node.
    pub fn skipped(reason: SkipReason) -> Self {
        Self {
            status: NodeState::Skipped,
            error: None,
            skip: Some(reason),
        }
    }
}

/// Result of one `evaluate` call.
///
/// Holds no timings or generated identifiers, so evaluating the same graph
/// twice yields equal results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    /// Overall status.
    pub status: EvaluationStatus,
    /// Topological order the nodes were considered in.
    pub order: Vec<NodeId>,
    /// Waves of mutually independent nodes.
    pub waves: Vec<Vec<NodeId>>,
    /// Every produced value keyed `"node.port"`.
    pub outputs: BTreeMap<String, Value>,
    /// Values produced by nodes without outgoing edges, keyed `"node.port"`.
    pub terminal_outputs: BTreeMap<String, Value>,
    /// Per-node reports.
    pub nodes: BTreeMap<NodeId, NodeReport>,
}

impl EvaluationResult {
    /// Report for one node.
    pub fn node(&self, id: &str) -> Option<&NodeReport> {
        self.nodes.get(id)
    }

    /// Final state of one node.
    pub fn node_status(&self, id: &str) -> Option<NodeState> {
        self.node(id).map(|r| r.status)
    }

    /// Value produced on `node.port`.
    pub fn output(&self, node: &str, port: &str) -> Option<&Value> {
        self.outputs.get(&format!("{node}.{port}"))
    }

    /// Number of nodes in the given state.
    pub fn count(&self, state: NodeState) -> usize {
        self.nodes.values().filter(|r| r.status == state).count()
    }

    /// Errors of all failed nodes, ordered by node ID.
    pub fn failures(&self) -> impl Iterator<Item = &NodeError> {
        self.nodes.values().filter_map(|r| r.error.as_ref())
    }

    /// Whether the evaluation fully succeeded.
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}
