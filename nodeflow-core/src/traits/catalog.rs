//! Port catalog seam used during graph construction.

use super::ComputationInfo;

/// Something that knows the default ports of node type tags.
///
/// The graph builder consults a catalog to reject unknown type tags and to
/// fill in ports for nodes that declare none.
pub trait PortCatalog: Send + Sync {
    /// Describe the computation registered for `node_type`, if any.
    fn describe(&self, node_type: &str) -> Option<ComputationInfo>;
}
