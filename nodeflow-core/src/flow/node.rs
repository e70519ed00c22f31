//! Node definition as submitted by callers.

use super::port::{InputPort, PortType};
use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A node in a submitted workflow.
///
/// # Example
///
/// ```yaml
/// nodes:
///   - id: add
///     type: math::add
///     inputs: { a: number, b: number }
///     outputs: { sum: number }
///     values: { a: 2, b: 3 }
///
///   - id: double
///     type: math::double
///     inputs: { x: number }
///     outputs: { doubled: number }
///     timeout_ms: 500
/// ```
///
/// Port maps may be omitted when the type tag is known to the registry;
/// the registry's default ports are used instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeDefinition {
    /// Unique node ID within the workflow.
    pub id: String,

    /// Type tag selecting the computation (e.g., "math::add").
    #[serde(rename = "type")]
    pub node_type: String,

    /// Declared input ports.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub inputs: BTreeMap<String, InputPort>,

    /// Declared output ports and the types they produce.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub outputs: BTreeMap<String, PortType>,

    /// Literal values feeding input ports without an edge.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub values: BTreeMap<String, Value>,

    /// Opaque configuration handed to the computation.
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub config: Value,

    /// Time budget override for this node (milliseconds).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
}

impl NodeDefinition {
    /// Create a node with no declared ports.
    pub fn new(id: impl Into<String>, node_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            node_type: node_type.into(),
            inputs: BTreeMap::new(),
            outputs: BTreeMap::new(),
            values: BTreeMap::new(),
            config: Value::null(),
            timeout_ms: None,
        }
    }

    /// Declare an input port.
    pub fn with_input(mut self, name: impl Into<String>, port: impl Into<InputPort>) -> Self {
        self.inputs.insert(name.into(), port.into());
        self
    }

    /// Declare an output port.
    pub fn with_output(mut self, name: impl Into<String>, port_type: PortType) -> Self {
        self.outputs.insert(name.into(), port_type);
        self
    }

    /// Bind a literal value to an input port.
    pub fn with_value(mut self, port: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(port.into(), value.into());
        self
    }

    /// Set the configuration payload.
    pub fn with_config(mut self, config: impl Into<Value>) -> Self {
        self.config = config.into();
        self
    }

    /// Override the time budget.
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }

    /// Whether the node declares no ports at all.
    #[must_use]
    pub fn has_no_ports(&self) -> bool {
        self.inputs.is_empty() && self.outputs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deserialize_full_node() {
        let yaml = r#"
id: add
type: math::add
inputs:
  a: number
  b: { type: number, required: false }
outputs:
  sum: number
values:
  a: 2
config:
  note: hello
timeout_ms: 250
"#;
        let node: NodeDefinition = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(node.id, "add");
        assert_eq!(node.node_type, "math::add");
        assert_eq!(node.inputs["a"], InputPort::new(PortType::Number));
        assert!(!node.inputs["b"].required);
        assert_eq!(node.outputs["sum"], PortType::Number);
        assert_eq!(node.values["a"], Value::int(2));
        assert_eq!(node.config.get_field("note"), Some(&json!("hello")));
        assert_eq!(node.timeout_ms, Some(250));
    }

    #[test]
    fn ports_default_to_empty() {
        let node: NodeDefinition =
            serde_json::from_str(r#"{"id": "src", "type": "std::data_source"}"#).unwrap();
        assert!(node.has_no_ports());
        assert!(node.config.is_null());
        assert!(node.timeout_ms.is_none());
    }

    #[test]
    fn ui_fields_are_ignored() {
        let node: NodeDefinition = serde_json::from_str(
            r#"{"id": "n1", "type": "std::filter", "position": {"x": 10, "y": 20}}"#,
        )
        .unwrap();
        assert_eq!(node.id, "n1");
    }

    #[test]
    fn builder_methods() {
        let node = NodeDefinition::new("double", "math::double")
            .with_input("x", PortType::Number)
            .with_output("doubled", PortType::Number)
            .with_timeout_ms(100);
        assert_eq!(node.inputs.len(), 1);
        assert_eq!(node.outputs.len(), 1);
        assert_eq!(node.timeout_ms, Some(100));
        assert!(!node.has_no_ports());
    }
}
