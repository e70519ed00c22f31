//! Workflow definition - the top-level document submitted for evaluation.

use super::validation::GraphLimits;
use super::{EdgeDefinition, NodeDefinition, ValidationError, ValidationErrorKind};
use crate::error::{NodeflowError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A workflow graph: nodes and the edges connecting them.
///
/// # Example
///
/// ```yaml
/// name: add_then_double
/// nodes:
///   - id: add
///     type: math::add
///     inputs: { a: number, b: number }
///     outputs: { sum: number }
///     values: { a: 2, b: 3 }
///   - id: double
///     type: math::double
///     inputs: { x: number }
///     outputs: { doubled: number }
/// edges:
///   - from: add.sum
///     to: double.x
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkflowDefinition {
    /// Optional human-readable name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Nodes in submission order.
    #[serde(default)]
    pub nodes: Vec<NodeDefinition>,

    /// Edges connecting node ports.
    #[serde(default)]
    pub edges: Vec<EdgeDefinition>,
}

impl WorkflowDefinition {
    /// Create an empty workflow.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Add a node.
    pub fn with_node(mut self, node: NodeDefinition) -> Self {
        self.nodes.push(node);
        self
    }

    /// Add an edge.
    pub fn with_edge(mut self, edge: EdgeDefinition) -> Self {
        self.edges.push(edge);
        self
    }

    /// Add an edge from `"node.port"` strings.
    pub fn connect(self, from: &str, to: &str) -> Self {
        self.with_edge(EdgeDefinition::parse(from, to))
    }

    /// Parse a workflow from JSON text.
    pub fn from_json(json: &str) -> Result<Self> {
        Self::from_json_with_limits(json, &GraphLimits::default())
    }

    /// Parse a workflow from JSON text, rejecting oversized documents first.
    pub fn from_json_with_limits(json: &str, limits: &GraphLimits) -> Result<Self> {
        limits.check_document_size(json.len())?;
        serde_json::from_str(json).map_err(|e| NodeflowError::Parse {
            cause: e.to_string(),
        })
    }

    /// Parse a workflow from YAML text.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Self::from_yaml_with_limits(yaml, &GraphLimits::default())
    }

    /// Parse a workflow from YAML text, rejecting oversized documents first.
    pub fn from_yaml_with_limits(yaml: &str, limits: &GraphLimits) -> Result<Self> {
        limits.check_document_size(yaml.len())?;
        serde_yaml::from_str(yaml).map_err(|e| NodeflowError::Parse {
            cause: e.to_string(),
        })
    }

    /// Load a workflow from a file. `.json` files are parsed as JSON,
    /// anything else as YAML (which also accepts JSON documents).
    pub fn from_file(path: &Path) -> Result<Self> {
        let limits = GraphLimits::default();
        let metadata = std::fs::metadata(path).map_err(|e| NodeflowError::Io {
            path: path.to_path_buf(),
            cause: e.to_string(),
        })?;
        if metadata.len() > limits.max_document_bytes as u64 {
            return Err(ValidationError::new(
                ValidationErrorKind::LimitExceeded,
                "workflow",
                format!(
                    "file size ({} bytes) exceeds maximum allowed ({} bytes)",
                    metadata.len(),
                    limits.max_document_bytes
                ),
            )
            .into());
        }

        let content = std::fs::read_to_string(path).map_err(|e| NodeflowError::Io {
            path: path.to_path_buf(),
            cause: e.to_string(),
        })?;

        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            Self::from_json_with_limits(&content, &limits)
        } else {
            Self::from_yaml_with_limits(&content, &limits)
        }
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| NodeflowError::Serialization(e.to_string()))
    }

    /// Look up a node definition by ID.
    pub fn node(&self, id: &str) -> Option<&NodeDefinition> {
        self.nodes.iter().find(|n| n.id == id)
    }
}
