//! Common test utilities for integration tests.

#![allow(dead_code)]

use nodeflow_core::prelude::*;
use nodeflow_engine::engine::{EngineConfig, EvaluationEngine};
use nodeflow_nodes::register_standard;
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Tracks how many timed computations run at once.
#[derive(Debug, Default)]
pub struct ConcurrencyGauge {
    running: AtomicUsize,
    peak: AtomicUsize,
    calls: AtomicUsize,
}

impl ConcurrencyGauge {
    /// Highest number of timed computations observed running together.
    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    /// Total number of timed invocations.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

/// Sleeps for `config.ms` while recording concurrency on a shared gauge.
pub struct TimedComputation {
    gauge: Arc<ConcurrencyGauge>,
}

impl Computation for TimedComputation {
    fn info(&self) -> ComputationInfo {
        ComputationInfo::new("test", "timed").with_output("out", PortType::Number)
    }

    fn compute<'a>(&'a self, input: ComputeInput) -> ComputeFuture<'a> {
        Box::pin(async move {
            let ms = input
                .config_value("ms")
                .and_then(|v| v.inner().as_u64())
                .unwrap_or(20);

            self.gauge.calls.fetch_add(1, Ordering::SeqCst);
            let now = self.gauge.running.fetch_add(1, Ordering::SeqCst) + 1;
            self.gauge.peak.fetch_max(now, Ordering::SeqCst);

            tokio::time::sleep(Duration::from_millis(ms)).await;

            self.gauge.running.fetch_sub(1, Ordering::SeqCst);
            Ok(NodeOutputs::single(now as i64))
        })
    }
}

/// Standard computations plus a `test::timed` bound to `gauge` and a
/// `test::fail` that always errors.
pub fn test_registry(gauge: Arc<ConcurrencyGauge>) -> Arc<ComputationRegistry> {
    let mut registry = ComputationRegistry::new();
    register_standard(&mut registry);
    registry
        .register(TimedComputation { gauge })
        .register_fn(
            ComputationInfo::new("test", "fail")
                .with_input("in", InputPort::new(PortType::Any).optional())
                .with_output("out", PortType::Any),
            |_| Err(ComputeError::failed("deliberate failure")),
        );
    Arc::new(registry)
}

/// Engine over [`test_registry`] with the given configuration.
pub fn engine_with(config: EngineConfig) -> EvaluationEngine {
    EvaluationEngine::new(test_registry(Arc::default()), config)
}

/// Engine over [`test_registry`] with default configuration.
pub fn engine() -> EvaluationEngine {
    engine_with(EngineConfig::default())
}

/// A `math::constant` node emitting `value`.
pub fn constant(id: &str, value: i64) -> NodeDefinition {
    NodeDefinition::new(id, "math::constant").with_config(json!({ "value": value }))
}

/// A node that always fails.
pub fn failing(id: &str) -> NodeDefinition {
    NodeDefinition::new(id, "test::fail")
}

/// A `math::double` node with default ports.
pub fn double(id: &str) -> NodeDefinition {
    NodeDefinition::new(id, "math::double")
}

/// `add(a=2, b=3) -> sum` wired into `double(x) -> doubled`.
pub fn add_then_double() -> WorkflowDefinition {
    WorkflowDefinition::new()
        .with_name("add_then_double")
        .with_node(
            NodeDefinition::new("add", "math::add")
                .with_input("a", PortType::Number)
                .with_input("b", PortType::Number)
                .with_output("sum", PortType::Number)
                .with_value("a", 2i64)
                .with_value("b", 3i64),
        )
        .with_node(
            NodeDefinition::new("double", "math::double")
                .with_input("x", PortType::Number)
                .with_output("doubled", PortType::Number),
        )
        .connect("add.sum", "double.x")
}

/// `add_then_double` as a JSON document.
pub fn add_then_double_json() -> String {
    json!({
        "name": "add_then_double",
        "nodes": [
            {
                "id": "add",
                "type": "math::add",
                "inputs": {"a": "number", "b": "number"},
                "outputs": {"sum": "number"},
                "values": {"a": 2, "b": 3}
            },
            {
                "id": "double",
                "type": "math::double",
                "inputs": {"x": "number"},
                "outputs": {"doubled": "number"}
            }
        ],
        "edges": [{"from": "add.sum", "to": "double.x"}]
    })
    .to_string()
}

/// A chain of `n` timed nodes, `p0 -> p1 -> ...`, each sleeping `ms`.
pub fn timed_chain(n: usize, ms: u64) -> WorkflowDefinition {
    let mut workflow = WorkflowDefinition::new();
    for i in 0..n {
        let mut node = NodeDefinition::new(format!("p{i}"), "test::timed")
            .with_output("out", PortType::Number)
            .with_config(json!({ "ms": ms }));
        if i > 0 {
            node = node.with_input("in", PortType::Number);
        }
        workflow = workflow.with_node(node);
        if i > 0 {
            workflow = workflow.connect(&format!("p{}.out", i - 1), &format!("p{i}.in"));
        }
    }
    workflow
}

/// `n` independent timed nodes, each sleeping `ms`.
pub fn timed_fan(n: usize, ms: u64) -> WorkflowDefinition {
    (0..n).fold(WorkflowDefinition::new(), |workflow, i| {
        workflow.with_node(
            NodeDefinition::new(format!("p{i}"), "test::timed").with_config(json!({ "ms": ms })),
        )
    })
}
