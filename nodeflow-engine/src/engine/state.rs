//! Per-node lifecycle.
//!
//! ```text
//! Pending -> Ready -> Running -> Succeeded
//!                             -> Failed
//! Pending | Ready -> Skipped
//! ```

use crate::graph::{Graph, NodeIndex};
use nodeflow_core::{NodeflowError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of one node during an evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeState {
    /// Not yet considered.
    Pending,
    /// Dependencies settled, inputs resolved, waiting for a slot.
    Ready,
    /// Computation in progress.
    Running,
    /// Computation finished and outputs were published.
    Succeeded,
    /// Computation failed.
    Failed,
    /// Never ran.
    Skipped,
}

impl NodeState {
    /// Lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Ready => "ready",
            Self::Running => "running",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
            Self::Skipped => "skipped",
        }
    }

    /// Whether no further transition is possible.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::Skipped)
    }

    /// Whether the lifecycle allows moving to `next`.
    pub fn can_transition_to(self, next: NodeState) -> bool {
        use NodeState::*;
        matches!(
            (self, next),
            (Pending, Ready)
                | (Ready, Running)
                | (Running, Succeeded)
                | (Running, Failed)
                | (Pending, Skipped)
                | (Ready, Skipped)
        )
    }
}

impl fmt::Display for NodeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// States of every node in a graph, indexed by arena position.
#[derive(Debug)]
pub(crate) struct StateTable<'g> {
    graph: &'g Graph,
    states: Vec<NodeState>,
}

impl<'g> StateTable<'g> {
    pub(crate) fn new(graph: &'g Graph) -> Self {
        Self {
            graph,
            states: vec![NodeState::Pending; graph.len()],
        }
    }

    pub(crate) fn get(&self, idx: NodeIndex) -> NodeState {
        self.states[idx.index()]
    }

    /// Apply a transition, rejecting anything the lifecycle forbids.
    pub(crate) fn transition(&mut self, idx: NodeIndex, next: NodeState) -> Result<()> {
        let current = self.states[idx.index()];
        if !current.can_transition_to(next) {
            return Err(NodeflowError::InvalidTransition {
                node_id: self.graph.node(idx).id.clone(),
                from: current.to_string(),
                to: next.to_string(),
            });
        }
        self.states[idx.index()] = next;
        Ok(())
    }

    /// Apply several transitions in order.
    pub(crate) fn advance(&mut self, idx: NodeIndex, path: &[NodeState]) -> Result<()> {
        path.iter().try_for_each(|next| self.transition(idx, *next))
    }

    pub(crate) fn count(&self, state: NodeState) -> usize {
        self.states.iter().filter(|s| **s == state).count()
    }
}
