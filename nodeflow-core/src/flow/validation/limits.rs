//! Size limits applied to submitted workflows.

use super::error::{ValidationError, ValidationErrorKind};

/// Limits that bound the size of a workflow before it is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphLimits {
    /// Maximum document size in bytes (default: 10MB).
    pub max_document_bytes: usize,
    /// Maximum number of nodes (default: 10,000).
    pub max_nodes: usize,
    /// Maximum number of edges (default: 50,000).
    pub max_edges: usize,
    /// Maximum number of declared ports on one node (default: 256).
    pub max_ports_per_node: usize,
}

impl Default for GraphLimits {
    fn default() -> Self {
        Self {
            max_document_bytes: 10 * 1024 * 1024,
            max_nodes: 10_000,
            max_edges: 50_000,
            max_ports_per_node: 256,
        }
    }
}

impl GraphLimits {
    /// Create limits with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set maximum document size.
    pub fn with_max_document_bytes(mut self, bytes: usize) -> Self {
        self.max_document_bytes = bytes;
        self
    }

    /// Set maximum node count.
    pub fn with_max_nodes(mut self, count: usize) -> Self {
        self.max_nodes = count;
        self
    }

    /// Set maximum edge count.
    pub fn with_max_edges(mut self, count: usize) -> Self {
        self.max_edges = count;
        self
    }

    /// Set maximum ports per node.
    pub fn with_max_ports_per_node(mut self, count: usize) -> Self {
        self.max_ports_per_node = count;
        self
    }

    /// Reject a raw document before parsing it.
    pub fn check_document_size(&self, len: usize) -> Result<(), ValidationError> {
        exceeds("workflow", "document size (bytes)", len, self.max_document_bytes)
    }

    /// Reject workflows with too many nodes or edges.
    pub fn check_counts(&self, nodes: usize, edges: usize) -> Result<(), ValidationError> {
        exceeds("nodes", "node count", nodes, self.max_nodes)?;
        exceeds("edges", "edge count", edges, self.max_edges)
    }

    /// Reject a node declaring too many ports.
    pub fn check_ports(&self, location: &str, ports: usize) -> Result<(), ValidationError> {
        exceeds(location, "port count", ports, self.max_ports_per_node)
    }
}

fn exceeds(location: &str, what: &str, actual: usize, max: usize) -> Result<(), ValidationError> {
    if actual > max {
        return Err(ValidationError::new(
            ValidationErrorKind::LimitExceeded,
            location,
            format!("{what} ({actual}) exceeds maximum allowed ({max})"),
        ));
    }
    Ok(())
}
