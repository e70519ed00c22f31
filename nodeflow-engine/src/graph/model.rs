//! Validated graph representation.
//!
//! Nodes live in an arena (`Vec<GraphNode>`) addressed by `NodeIndex`.
//! Edges are index pairs kept in one list, with per-node incoming and
//! outgoing edge index lists. A `Graph` can only be obtained from the
//! builder, so every value of this type satisfies the structural
//! invariants checked there: unique IDs, resolvable ports, compatible
//! types, fed required inputs and no cycles.

use nodeflow_core::flow::{InputPort, PortType};
use nodeflow_core::{NodeId, Value};
use std::collections::{BTreeMap, HashMap};

/// Position of a node in the graph's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeIndex(pub(crate) usize);

impl NodeIndex {
    /// Raw arena position.
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

/// A node with its resolved port declarations.
#[derive(Debug, Clone)]
pub struct GraphNode {
    /// Node ID.
    pub id: NodeId,
    /// Type tag selecting the computation.
    pub node_type: String,
    /// Input port declarations.
    pub inputs: BTreeMap<String, InputPort>,
    /// Output port declarations.
    pub outputs: BTreeMap<String, PortType>,
    /// Literal values bound to input ports.
    pub values: BTreeMap<String, Value>,
    /// Configuration payload.
    pub config: Value,
    /// Per-node time budget override.
    pub timeout_ms: Option<u64>,
}

/// A directed edge between two node ports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphEdge {
    /// Source node.
    pub source: NodeIndex,
    /// Output port on the source node.
    pub source_port: String,
    /// Target node.
    pub target: NodeIndex,
    /// Input port on the target node.
    pub target_port: String,
}

/// An immutable, validated workflow graph.
#[derive(Debug, Clone)]
pub struct Graph {
    pub(crate) nodes: Vec<GraphNode>,
    pub(crate) edges: Vec<GraphEdge>,
    pub(crate) index: HashMap<NodeId, NodeIndex>,
    pub(crate) outgoing: Vec<Vec<usize>>,
    pub(crate) incoming: Vec<Vec<usize>>,
}

impl Graph {
    pub(crate) fn from_parts(nodes: Vec<GraphNode>, edges: Vec<GraphEdge>) -> Self {
        let index = nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (n.id.clone(), NodeIndex(i)))
            .collect();
        let mut outgoing = vec![Vec::new(); nodes.len()];
        let mut incoming = vec![Vec::new(); nodes.len()];
        for (i, edge) in edges.iter().enumerate() {
            outgoing[edge.source.0].push(i);
            incoming[edge.target.0].push(i);
        }
        Self {
            nodes,
            edges,
            index,
            outgoing,
            incoming,
        }
    }

    /// Number of nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the graph has no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Node at an arena position.
    ///
    /// # Panics
    /// Panics if the index does not come from this graph.
    #[must_use]
    pub fn node(&self, idx: NodeIndex) -> &GraphNode {
        &self.nodes[idx.0]
    }

    /// Look up a node by ID.
    pub fn node_by_id(&self, id: &str) -> Option<&GraphNode> {
        self.index.get(id).map(|&idx| self.node(idx))
    }

    /// Arena position of a node ID.
    pub fn index_of(&self, id: &str) -> Option<NodeIndex> {
        self.index.get(id).copied()
    }

    /// All nodes with their positions, in submission order.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeIndex, &GraphNode)> {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeIndex(i), n))
    }

    /// All edges.
    pub fn edges(&self) -> &[GraphEdge] {
        &self.edges
    }

    /// Edges leaving a node.
    pub fn outgoing_edges(&self, idx: NodeIndex) -> impl Iterator<Item = &GraphEdge> {
        self.outgoing[idx.0].iter().map(|&e| &self.edges[e])
    }

    /// Edges entering a node.
    pub fn incoming_edges(&self, idx: NodeIndex) -> impl Iterator<Item = &GraphEdge> {
        self.incoming[idx.0].iter().map(|&e| &self.edges[e])
    }

    /// Edges feeding one input port, ordered by source node ID then port.
    pub fn feeds(&self, idx: NodeIndex, port: &str) -> Vec<&GraphEdge> {
        let mut edges: Vec<&GraphEdge> = self
            .incoming_edges(idx)
            .filter(|e| e.target_port == port)
            .collect();
        edges.sort_by(|a, b| {
            self.node(a.source)
                .id
                .cmp(&self.node(b.source).id)
                .then_with(|| a.source_port.cmp(&b.source_port))
        });
        edges
    }

    /// Distinct downstream nodes, ordered by node ID.
    pub fn successors(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        self.sorted_unique(self.outgoing_edges(idx).map(|e| e.target))
    }

    /// Distinct upstream nodes, ordered by node ID.
    pub fn predecessors(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        self.sorted_unique(self.incoming_edges(idx).map(|e| e.source))
    }

    /// Whether a node has no outgoing edges.
    #[must_use]
    pub fn is_terminal(&self, idx: NodeIndex) -> bool {
        self.outgoing[idx.0].is_empty()
    }

    /// Node positions ordered by node ID.
    pub fn indices_by_id(&self) -> Vec<NodeIndex> {
        self.sorted_unique((0..self.nodes.len()).map(NodeIndex))
    }

    fn sorted_unique(&self, iter: impl Iterator<Item = NodeIndex>) -> Vec<NodeIndex> {
        let mut out: Vec<NodeIndex> = iter.collect();
        out.sort_by(|a, b| self.node(*a).id.cmp(&self.node(*b).id));
        out.dedup();
        out
    }
}
