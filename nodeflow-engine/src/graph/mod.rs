//! Graph model: validated nodes, ports and edges.
//!
//! [`build_graph`] and [`GraphBuilder`] turn submitted definitions into a
//! [`Graph`], rejecting anything structurally invalid before evaluation.

mod builder;
mod model;

pub use builder::{build_graph, GraphBuilder};
pub use model::{Graph, GraphEdge, GraphNode, NodeIndex};
