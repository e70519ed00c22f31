//! Per-evaluation execution context.

use nodeflow_core::{NodeId, Value};
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap, HashSet};

#[derive(Debug, Default)]
struct ContextState {
    outputs: HashMap<(NodeId, String), Value>,
    completed: HashSet<NodeId>,
    failed: HashSet<NodeId>,
}

/// Outputs produced so far in one evaluation.
///
/// Created at the start of an evaluation and dropped at its end. A node's
/// outputs are published in a single write when it succeeds, so readers
/// never observe a partially published node.
#[derive(Debug, Default)]
pub struct ExecutionContext {
    state: RwLock<ContextState>,
}

impl ExecutionContext {
    /// Create an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish all outputs of a succeeded node and mark it completed.
    ///
    /// Returns `false` without writing anything if the node was already
    /// completed or failed.
    pub fn publish(&self, node_id: &NodeId, outputs: BTreeMap<String, Value>) -> bool {
        let mut state = self.state.write();
        if state.completed.contains(node_id) || state.failed.contains(node_id) {
            return false;
        }
        for (port, value) in outputs {
            state.outputs.insert((node_id.clone(), port), value);
        }
        state.completed.insert(node_id.clone());
        true
    }

    /// Mark a node failed. Failed nodes never publish outputs.
    pub fn mark_failed(&self, node_id: &NodeId) {
        let mut state = self.state.write();
        if !state.completed.contains(node_id) {
            state.failed.insert(node_id.clone());
        }
    }

    /// Value produced on one output port, if any.
    pub fn get(&self, node_id: &NodeId, port: &str) -> Option<Value> {
        self.state
            .read()
            .outputs
            .get(&(node_id.clone(), port.to_string()))
            .cloned()
    }

    /// Whether the node completed successfully.
    pub fn is_completed(&self, node_id: &NodeId) -> bool {
        self.state.read().completed.contains(node_id)
    }

    /// Whether the node failed.
    pub fn is_failed(&self, node_id: &NodeId) -> bool {
        self.state.read().failed.contains(node_id)
    }

    /// Number of completed nodes.
    pub fn completed_count(&self) -> usize {
        self.state.read().completed.len()
    }

    /// Number of failed nodes.
    pub fn failed_count(&self) -> usize {
        self.state.read().failed.len()
    }

    /// All produced values keyed `"node.port"`.
    pub fn outputs(&self) -> BTreeMap<String, Value> {
        self.state
            .read()
            .outputs
            .iter()
            .map(|((node, port), value)| (format!("{node}.{port}"), value.clone()))
            .collect()
    }
}
