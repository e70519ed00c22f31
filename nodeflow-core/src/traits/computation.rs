//! Computation trait and related types.

use crate::error::ComputeError;
use crate::flow::{InputPort, PortType};
use crate::types::NodeId;
use crate::value::Value;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Metadata about a computation: its tag, description and default ports.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComputationInfo {
    /// Fully qualified type tag (e.g., "math::add").
    pub name: String,
    /// Namespace (e.g., "math").
    pub namespace: String,
    /// Short name (e.g., "add").
    pub short_name: String,
    /// What the computation does.
    pub description: String,
    /// Default input ports.
    pub inputs: BTreeMap<String, InputPort>,
    /// Default output ports.
    pub outputs: BTreeMap<String, PortType>,
}

impl ComputationInfo {
    /// Create info for `namespace::name` with no ports.
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        let namespace = namespace.into();
        let short_name = name.into();
        Self {
            name: format!("{namespace}::{short_name}"),
            namespace,
            short_name,
            description: String::new(),
            inputs: BTreeMap::new(),
            outputs: BTreeMap::new(),
        }
    }

    /// Set the description.
    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = desc.into();
        self
    }

    /// Add a default input port.
    pub fn with_input(mut self, name: impl Into<String>, port: impl Into<InputPort>) -> Self {
        self.inputs.insert(name.into(), port.into());
        self
    }

    /// Add a default output port.
    pub fn with_output(mut self, name: impl Into<String>, port_type: PortType) -> Self {
        self.outputs.insert(name.into(), port_type);
        self
    }
}

/// Everything a computation receives for one invocation.
#[derive(Debug, Clone)]
pub struct ComputeInput {
    /// The node being evaluated.
    pub node_id: NodeId,
    /// Resolved input values keyed by port. Unfed optional ports are absent.
    pub inputs: BTreeMap<String, Value>,
    /// The node's configuration payload.
    pub config: Value,
    /// Output ports declared on the node, in name order.
    pub output_ports: Vec<String>,
}

impl ComputeInput {
    /// Create an input with no configuration and no declared outputs.
    pub fn new(node_id: impl Into<NodeId>, inputs: BTreeMap<String, Value>) -> Self {
        Self {
            node_id: node_id.into(),
            inputs,
            config: Value::null(),
            output_ports: Vec::new(),
        }
    }

    /// Set the configuration.
    pub fn with_config(mut self, config: impl Into<Value>) -> Self {
        self.config = config.into();
        self
    }

    /// Set the declared output ports.
    pub fn with_output_ports(mut self, ports: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.output_ports = ports.into_iter().map(Into::into).collect();
        self
    }

    /// Value on an input port, if present.
    pub fn input(&self, port: &str) -> Option<&Value> {
        self.inputs.get(port)
    }

    /// Value on an input port, failing when absent.
    pub fn require(&self, port: &str) -> Result<&Value, ComputeError> {
        self.input(port)
            .ok_or_else(|| ComputeError::invalid_input(port, "no value"))
    }

    /// Numeric value on an input port.
    pub fn number(&self, port: &str) -> Result<f64, ComputeError> {
        let value = self.require(port)?;
        value
            .as_f64()
            .ok_or_else(|| ComputeError::invalid_input(port, format!("expected a number, got {value}")))
    }

    /// The only input value, for computations that accept one input under
    /// any port name.
    pub fn sole_input(&self) -> Result<(&str, &Value), ComputeError> {
        let mut iter = self.inputs.iter();
        match (iter.next(), iter.next()) {
            (Some((port, value)), None) => Ok((port.as_str(), value)),
            (None, _) => Err(ComputeError::failed("expected one input, got none")),
            _ => Err(ComputeError::failed(format!(
                "expected one input, got {}",
                self.inputs.len()
            ))),
        }
    }

    /// Configuration entry by dot path.
    pub fn config_value(&self, key: &str) -> Option<Value> {
        self.config.get_field(key).map(|v| Value(v.clone()))
    }

    /// String configuration entry.
    pub fn config_str(&self, key: &str) -> Option<String> {
        self.config
            .get_field(key)
            .and_then(|v| v.as_str())
            .map(str::to_string)
    }

    /// Required configuration entry.
    pub fn require_config(&self, key: &str) -> Result<Value, ComputeError> {
        self.config_value(key)
            .ok_or_else(|| ComputeError::invalid_config(key, "missing"))
    }
}

/// Values produced by one computation.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeOutputs {
    /// A single unnamed value, routed to the node's sole output port.
    Single(Value),
    /// Values keyed by output port. Ports left out produce nothing.
    Ports(BTreeMap<String, Value>),
}

impl NodeOutputs {
    /// A single unnamed value.
    pub fn single(value: impl Into<Value>) -> Self {
        Self::Single(value.into())
    }

    /// No values at all.
    pub fn none() -> Self {
        Self::Ports(BTreeMap::new())
    }

    /// Start or extend a port map with one value.
    pub fn with(self, port: impl Into<String>, value: impl Into<Value>) -> Self {
        let mut ports = match self {
            Self::Ports(ports) => ports,
            Self::Single(_) => BTreeMap::new(),
        };
        ports.insert(port.into(), value.into());
        Self::Ports(ports)
    }
}

/// A boxed future for async computations.
pub type ComputeFuture<'a> = Pin<Box<dyn Future<Output = Result<NodeOutputs, ComputeError>> + Send + 'a>>;

/// The function behind a node type tag.
///
/// Computations are registered once and shared across evaluations, so they
/// must not keep per-evaluation state.
///
/// # Example
///
/// ```ignore
/// struct Double;
///
/// impl Computation for Double {
///     fn info(&self) -> ComputationInfo {
///         ComputationInfo::new("math", "double")
///             .with_input("x", PortType::Number)
///             .with_output("doubled", PortType::Number)
///     }
///
///     fn compute<'a>(&'a self, input: ComputeInput) -> ComputeFuture<'a> {
///         Box::pin(async move { Ok(NodeOutputs::single(input.number("x")? * 2.0)) })
///     }
/// }
/// ```
pub trait Computation: Send + Sync {
    /// Get metadata about this computation.
    fn info(&self) -> ComputationInfo;

    /// Run the computation on resolved inputs.
    fn compute<'a>(&'a self, input: ComputeInput) -> ComputeFuture<'a>;
}

type ComputeFn = dyn Fn(ComputeInput) -> Result<NodeOutputs, ComputeError> + Send + Sync;

/// A computation backed by a plain synchronous function.
///
/// The function runs on the blocking thread pool, so a slow function still
/// honours the executor's time budget.
#[derive(Clone)]
pub struct FnComputation {
    info: ComputationInfo,
    func: Arc<ComputeFn>,
}

impl FnComputation {
    /// Wrap a function.
    pub fn new<F>(info: ComputationInfo, func: F) -> Self
    where
        F: Fn(ComputeInput) -> Result<NodeOutputs, ComputeError> + Send + Sync + 'static,
    {
        Self {
            info,
            func: Arc::new(func),
        }
    }
}

impl fmt::Debug for FnComputation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnComputation")
            .field("name", &self.info.name)
            .finish()
    }
}

impl Computation for FnComputation {
    fn info(&self) -> ComputationInfo {
        self.info.clone()
    }

    fn compute<'a>(&'a self, input: ComputeInput) -> ComputeFuture<'a> {
        let func = Arc::clone(&self.func);
        Box::pin(async move {
            tokio::task::spawn_blocking(move || func(input))
                .await
                .map_err(|e| ComputeError::failed(format!("computation panicked: {e}")))?
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn info_builds_qualified_name() {
        let info = ComputationInfo::new("math", "add")
            .with_description("Sum inputs")
            .with_input("a", PortType::Number)
            .with_output("sum", PortType::Number);
        assert_eq!(info.name, "math::add");
        assert_eq!(info.short_name, "add");
        assert!(info.inputs["a"].required);
        assert_eq!(info.outputs["sum"], PortType::Number);
    }

    #[test]
    fn compute_input_accessors() {
        let mut inputs = BTreeMap::new();
        inputs.insert("x".to_string(), Value::int(4));
        let input = ComputeInput::new("n", inputs)
            .with_config(serde_json::json!({"separator": "-"}));

        assert_eq!(input.number("x").unwrap(), 4.0);
        assert!(input.number("y").is_err());
        assert_eq!(input.sole_input().unwrap().0, "x");
        assert_eq!(input.config_str("separator").as_deref(), Some("-"));
        assert!(input.require_config("missing").is_err());
    }

    #[test]
    fn outputs_builder() {
        let outputs = NodeOutputs::none().with("a", 1i64).with("b", "x");
        match outputs {
            NodeOutputs::Ports(ports) => {
                assert_eq!(ports.len(), 2);
                assert_eq!(ports["a"], Value::int(1));
            }
            NodeOutputs::Single(_) => panic!("expected ports"),
        }
    }

    #[tokio::test]
    async fn fn_computation_runs_on_blocking_pool() {
        let comp = FnComputation::new(ComputationInfo::new("test", "triple"), |input| {
            Ok(NodeOutputs::single(input.number("x")? * 3.0))
        });
        let mut inputs = BTreeMap::new();
        inputs.insert("x".to_string(), Value::int(2));

        let out = comp.compute(ComputeInput::new("t", inputs)).await.unwrap();
        assert_eq!(out, NodeOutputs::single(6.0));
    }

    #[tokio::test]
    async fn fn_computation_panic_becomes_error() {
        let comp = FnComputation::new(ComputationInfo::new("test", "boom"), |_| {
            panic!("boom")
        });
        let err = comp
            .compute(ComputeInput::new("t", BTreeMap::new()))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("panicked"));
    }
}
