//! Registry mapping node type tags to computations.

use crate::error::ComputeError;
use crate::traits::{
    Computation, ComputationInfo, ComputeInput, FnComputation, NodeOutputs, PortCatalog,
};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Registry of computations keyed by their fully qualified type tag.
///
/// Built once at startup, then shared read-only (typically behind an `Arc`)
/// by every evaluation.
#[derive(Default, Clone)]
pub struct ComputationRegistry {
    entries: HashMap<String, Arc<dyn Computation>>,
}

impl ComputationRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a computation under the tag reported by its `info()`.
    ///
    /// A later registration with the same tag replaces the earlier one.
    pub fn register<C: Computation + 'static>(&mut self, computation: C) -> &mut Self {
        let name = computation.info().name;
        if self.entries.insert(name.clone(), Arc::new(computation)).is_some() {
            tracing::debug!(node_type = %name, "Replaced registered computation");
        }
        self
    }

    /// Register a synchronous function as a computation.
    pub fn register_fn<F>(&mut self, info: ComputationInfo, func: F) -> &mut Self
    where
        F: Fn(ComputeInput) -> Result<NodeOutputs, ComputeError> + Send + Sync + 'static,
    {
        self.register(FnComputation::new(info, func))
    }

    /// Get the computation for a type tag.
    pub fn get(&self, node_type: &str) -> Option<Arc<dyn Computation>> {
        self.entries.get(node_type).cloned()
    }

    /// Check whether a type tag is registered.
    pub fn contains(&self, node_type: &str) -> bool {
        self.entries.contains_key(node_type)
    }

    /// Metadata for every registered computation, sorted by tag.
    pub fn list(&self) -> Vec<ComputationInfo> {
        let mut infos: Vec<ComputationInfo> = self.entries.values().map(|c| c.info()).collect();
        infos.sort_by(|a, b| a.name.cmp(&b.name));
        infos
    }

    /// Number of registered computations.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl PortCatalog for ComputationRegistry {
    fn describe(&self, node_type: &str) -> Option<ComputationInfo> {
        self.entries.get(node_type).map(|c| c.info())
    }
}

impl fmt::Debug for ComputationRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&String> = self.entries.keys().collect();
        names.sort();
        f.debug_struct("ComputationRegistry")
            .field("entries", &names)
            .finish()
    }
}
