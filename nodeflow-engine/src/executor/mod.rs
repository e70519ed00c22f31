//! Node executor.
//!
//! Runs one node's computation against already-resolved inputs:
//!
//! 1. Every required input must be present, otherwise `MissingInput`.
//! 2. The type tag is looked up in the registry, otherwise `UnregisteredType`.
//! 3. The computation runs in its own task under the node's time budget,
//!    so a panic or an overrun is contained (`ComputationFailed`, `Timeout`).
//! 4. Produced values are routed to declared output ports and type-checked.
//!
//! [`NodeExecutor::run`] additionally publishes the outputs into the
//! [`ExecutionContext`], and only when the node succeeded.

mod context;

pub use context::ExecutionContext;

use crate::graph::GraphNode;
use nodeflow_core::traits::{ComputeInput, NodeOutputs};
use nodeflow_core::{ComputationRegistry, NodeError, Value};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinError;
use tracing::Instrument;

/// Values produced by a node, keyed by output port.
pub type PortValues = BTreeMap<String, Value>;

/// Executes single nodes.
#[derive(Debug, Clone)]
pub struct NodeExecutor {
    registry: Arc<ComputationRegistry>,
    default_timeout: Duration,
}

impl NodeExecutor {
    /// Create an executor with a default per-node time budget.
    pub fn new(registry: Arc<ComputationRegistry>, default_timeout: Duration) -> Self {
        Self {
            registry,
            default_timeout,
        }
    }

    /// The registry computations are resolved from.
    pub fn registry(&self) -> &Arc<ComputationRegistry> {
        &self.registry
    }

    /// Time budget for a node: its own override or the default.
    pub fn timeout_for(&self, node: &GraphNode) -> Duration {
        node.timeout_ms
            .map(Duration::from_millis)
            .unwrap_or(self.default_timeout)
    }

    /// Execute a node and return its outputs.
    pub async fn execute(
        &self,
        node: &GraphNode,
        inputs: BTreeMap<String, Value>,
    ) -> Result<PortValues, NodeError> {
        let timeout = self.timeout_for(node);
        let timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        let span = tracing::info_span!(
            "node_execution",
            node_id = %node.id,
            node_type = %node.node_type,
            timeout_ms = %timeout_ms,
        );

        async move {
            let started = Instant::now();
            tracing::debug!(inputs = inputs.len(), "Executing node");

            let result = self.execute_inner(node, inputs, timeout, timeout_ms).await;
            let elapsed_ms = started.elapsed().as_millis() as u64;
            match &result {
                Ok(outputs) => {
                    tracing::debug!(outputs = outputs.len(), elapsed_ms, "Node completed");
                }
                Err(e) => {
                    tracing::warn!(kind = e.kind(), error = %e, elapsed_ms, "Node failed");
                }
            }
            result
        }
        .instrument(span)
        .await
    }

    /// Execute a node and publish its outputs into `ctx` on success.
    /// On failure the node is marked failed and nothing is published.
    pub async fn run(
        &self,
        node: &GraphNode,
        inputs: BTreeMap<String, Value>,
        ctx: &ExecutionContext,
    ) -> Result<(), NodeError> {
        match self.execute(node, inputs).await {
            Ok(outputs) => {
                ctx.publish(&node.id, outputs);
                Ok(())
            }
            Err(e) => {
                ctx.mark_failed(&node.id);
                Err(e)
            }
        }
    }

    async fn execute_inner(
        &self,
        node: &GraphNode,
        inputs: BTreeMap<String, Value>,
        timeout: Duration,
        timeout_ms: u64,
    ) -> Result<PortValues, NodeError> {
        if let Some(port) = node
            .inputs
            .iter()
            .find(|(port, decl)| decl.required && !inputs.contains_key(*port))
            .map(|(port, _)| port.clone())
        {
            return Err(NodeError::MissingInput {
                node_id: node.id.clone(),
                port,
            });
        }

        let Some(computation) = self.registry.get(&node.node_type) else {
            return Err(NodeError::UnregisteredType {
                node_id: node.id.clone(),
                node_type: node.node_type.clone(),
            });
        };

        let input = ComputeInput {
            node_id: node.id.clone(),
            inputs,
            config: node.config.clone(),
            output_ports: node.outputs.keys().cloned().collect(),
        };

        let mut handle = tokio::spawn(async move { computation.compute(input).await });
        let joined = match tokio::time::timeout(timeout, &mut handle).await {
            Ok(joined) => joined,
            Err(_elapsed) => {
                handle.abort();
                return Err(NodeError::Timeout {
                    node_id: node.id.clone(),
                    timeout_ms,
                });
            }
        };

        let produced = match joined {
            Ok(Ok(produced)) => produced,
            Ok(Err(e)) => return Err(computation_failed(node, e.to_string())),
            Err(e) => return Err(computation_failed(node, join_error_message(e))),
        };

        route_outputs(node, produced)
    }
}

/// Map produced values onto declared output ports and type-check them.
fn route_outputs(node: &GraphNode, produced: NodeOutputs) -> Result<PortValues, NodeError> {
    let ports = match produced {
        NodeOutputs::Single(value) => {
            let mut declared = node.outputs.keys();
            match (declared.next(), declared.next()) {
                (Some(port), None) => BTreeMap::from([(port.clone(), value)]),
                _ => {
                    return Err(computation_failed(
                        node,
                        format!(
                            "returned a single value but the node declares {} output ports",
                            node.outputs.len()
                        ),
                    ))
                }
            }
        }
        NodeOutputs::Ports(ports) => ports,
    };

    for (port, value) in &ports {
        let Some(&declared) = node.outputs.get(port) else {
            return Err(computation_failed(
                node,
                format!("produced a value on undeclared output port '{port}'"),
            ));
        };
        if !value.conforms_to(declared) {
            return Err(computation_failed(
                node,
                format!(
                    "output '{port}' is declared {declared} but the value is {}",
                    value.port_type()
                ),
            ));
        }
    }
    Ok(ports)
}

fn computation_failed(node: &GraphNode, cause: String) -> NodeError {
    NodeError::ComputationFailed {
        node_id: node.id.clone(),
        cause,
    }
}

fn join_error_message(err: JoinError) -> String {
    if !err.is_panic() {
        return "computation task was cancelled".to_string();
    }
    let payload = err.into_panic();
    let message = payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic payload".to_string());
    format!("computation panicked: {message}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use nodeflow_core::flow::{InputPort, PortType};
    use nodeflow_core::traits::{Computation, ComputationInfo, ComputeFuture};
    use nodeflow_core::{ComputeError, NodeId};

    struct Sleep;

    impl Computation for Sleep {
        fn info(&self) -> ComputationInfo {
            ComputationInfo::new("test", "sleep")
        }

        fn compute<'a>(&'a self, _input: ComputeInput) -> ComputeFuture<'a> {
            Box::pin(async move {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Ok(NodeOutputs::none())
            })
        }
    }

    struct Panics;

    impl Computation for Panics {
        fn info(&self) -> ComputationInfo {
            ComputationInfo::new("test", "panic")
        }

        fn compute<'a>(&'a self, _input: ComputeInput) -> ComputeFuture<'a> {
            Box::pin(async move { panic!("kaboom") })
        }
    }

    fn registry() -> Arc<ComputationRegistry> {
        let mut registry = ComputationRegistry::new();
        registry
            .register_fn(ComputationInfo::new("math", "double"), |input| {
                let (_, value) = input.sole_input()?;
                let x = value
                    .as_f64()
                    .ok_or_else(|| ComputeError::failed("not a number"))?;
                Ok(NodeOutputs::single(x * 2.0))
            })
            .register_fn(ComputationInfo::new("test", "emit"), |input| {
                let port = input.config_str("port").unwrap_or_else(|| "out".into());
                Ok(NodeOutputs::none().with(port, input.config_value("value").unwrap_or_default()))
            })
            .register_fn(ComputationInfo::new("test", "fail"), |_| {
                Err(ComputeError::failed("deliberate"))
            })
            .register(Sleep)
            .register(Panics);
        Arc::new(registry)
    }

    fn node(id: &str, node_type: &str) -> GraphNode {
        GraphNode {
            id: NodeId::from(id),
            node_type: node_type.to_string(),
            inputs: BTreeMap::new(),
            outputs: BTreeMap::new(),
            values: BTreeMap::new(),
            config: Value::null(),
            timeout_ms: None,
        }
    }

    fn double_node() -> GraphNode {
        let mut n = node("double", "math::double");
        n.inputs.insert("x".into(), InputPort::new(PortType::Number));
        n.outputs.insert("doubled".into(), PortType::Number);
        n
    }

    fn executor() -> NodeExecutor {
        NodeExecutor::new(registry(), Duration::from_secs(5))
    }

    fn inputs(pairs: &[(&str, Value)]) -> BTreeMap<String, Value> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[tokio::test]
    async fn single_value_routes_to_sole_output() {
        let out = executor()
            .execute(&double_node(), inputs(&[("x", Value::int(5))]))
            .await
            .unwrap();
        assert_eq!(out.get("doubled"), Some(&Value::float(10.0)));
    }

    #[tokio::test]
    async fn missing_required_input() {
        let err = executor()
            .execute(&double_node(), BTreeMap::new())
            .await
            .unwrap_err();
        assert_eq!(
            err,
            NodeError::MissingInput {
                node_id: NodeId::from("double"),
                port: "x".into()
            }
        );
    }

    #[tokio::test]
    async fn optional_input_may_be_absent() {
        let mut n = node("e", "test::emit");
        n.inputs
            .insert("x".into(), InputPort::new(PortType::Any).optional());
        n.outputs.insert("out".into(), PortType::Any);
        assert!(executor().execute(&n, BTreeMap::new()).await.is_ok());
    }

    #[tokio::test]
    async fn unregistered_type() {
        let err = executor()
            .execute(&node("n", "math::nope"), BTreeMap::new())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "unregistered_type");
    }

    #[tokio::test]
    async fn computation_error_is_captured() {
        let err = executor()
            .execute(&node("f", "test::fail"), BTreeMap::new())
            .await
            .unwrap_err();
        match err {
            NodeError::ComputationFailed { cause, .. } => assert_eq!(cause, "deliberate"),
            other => panic!("unexpected {other}"),
        }
    }

    #[tokio::test]
    async fn panic_is_captured() {
        let err = executor()
            .execute(&node("p", "test::panic"), BTreeMap::new())
            .await
            .unwrap_err();
        match err {
            NodeError::ComputationFailed { cause, .. } => assert!(cause.contains("kaboom")),
            other => panic!("unexpected {other}"),
        }
    }

    #[tokio::test]
    async fn node_timeout_override_applies() {
        let mut n = node("slow", "test::sleep");
        n.timeout_ms = Some(20);
        let err = executor().execute(&n, BTreeMap::new()).await.unwrap_err();
        assert_eq!(
            err,
            NodeError::Timeout {
                node_id: NodeId::from("slow"),
                timeout_ms: 20
            }
        );
    }

    #[tokio::test]
    async fn undeclared_output_port_fails() {
        let mut n = node("e", "test::emit");
        n.outputs.insert("out".into(), PortType::Any);
        n.config = serde_json::json!({"port": "other", "value": 1}).into();
        let err = executor().execute(&n, BTreeMap::new()).await.unwrap_err();
        assert_eq!(err.kind(), "computation_failed");
        assert!(err.to_string().contains("undeclared output port 'other'"));
    }

    #[tokio::test]
    async fn output_type_is_checked() {
        let mut n = node("e", "test::emit");
        n.outputs.insert("out".into(), PortType::Number);
        n.config = serde_json::json!({"value": "text"}).into();
        let err = executor().execute(&n, BTreeMap::new()).await.unwrap_err();
        assert!(err.to_string().contains("declared number"));
    }

    #[tokio::test]
    async fn single_value_needs_exactly_one_output_port() {
        let mut n = double_node();
        n.outputs.insert("extra".into(), PortType::Number);
        let err = executor()
            .execute(&n, inputs(&[("x", Value::int(1))]))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("declares 2 output ports"));
    }

    #[tokio::test]
    async fn run_publishes_only_on_success() {
        let exec = executor();
        let ctx = ExecutionContext::new();

        exec.run(&double_node(), inputs(&[("x", Value::int(2))]), &ctx)
            .await
            .unwrap();
        assert_eq!(
            ctx.get(&NodeId::from("double"), "doubled"),
            Some(Value::float(4.0))
        );

        let failing = node("f", "test::fail");
        assert!(exec.run(&failing, BTreeMap::new(), &ctx).await.is_err());
        assert!(ctx.is_failed(&failing.id));
        assert!(!ctx.is_completed(&failing.id));
    }
}
