//! Evaluation engine.
//!
//! Orchestrates the graph builder, the scheduler and the node executor:
//!
//! 1. Order the graph and group it into waves
//! 2. For each wave, skip nodes with a failed or skipped feed, resolve the
//!    inputs of the rest from the [`ExecutionContext`] and run them
//!    concurrently (bounded by `max_concurrent_nodes`)
//! 3. Aggregate outputs and per-node reports into an [`EvaluationResult`]
//!
//! Node failures are recorded, never propagated. Only infrastructure faults
//! (a task join failure, a lifecycle violation) surface as `Err`.

mod config;
mod result;
mod state;

pub use config::{EngineConfig, FailureMode};
pub use result::{EvaluationResult, EvaluationStatus, NodeReport, SkipReason};
pub use state::NodeState;

use crate::executor::{ExecutionContext, NodeExecutor};
use crate::graph::{Graph, GraphBuilder, GraphNode, NodeIndex};
use crate::scheduler;
use nodeflow_core::flow::WorkflowDefinition;
use nodeflow_core::{
    ComputationRegistry, EvaluationId, NodeError, NodeId, NodeflowError, Result, Value,
};
use state::StateTable;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{instrument, Instrument};

/// Why the engine stopped starting nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Halt {
    Cancelled,
    Aborted,
}

impl Halt {
    fn reason(self) -> SkipReason {
        match self {
            Self::Cancelled => SkipReason::Cancelled,
            Self::Aborted => SkipReason::Aborted,
        }
    }
}

/// What a spawned node task reports back.
enum TaskOutcome {
    /// Cancellation or abort was observed before the computation started.
    NotStarted(Halt),
    /// The computation ran.
    Executed(std::result::Result<(), NodeError>),
}

/// The public entry point for evaluating workflow graphs.
///
/// The engine itself is stateless between calls; every `evaluate` creates
/// its own [`ExecutionContext`] and drops it on return.
#[derive(Debug, Clone)]
pub struct EvaluationEngine {
    registry: Arc<ComputationRegistry>,
    executor: Arc<NodeExecutor>,
    config: EngineConfig,
}

impl EvaluationEngine {
    /// Create an engine over a computation registry.
    pub fn new(registry: Arc<ComputationRegistry>, config: EngineConfig) -> Self {
        let executor = Arc::new(NodeExecutor::new(
            Arc::clone(&registry),
            config.node_timeout(),
        ));
        Self {
            registry,
            executor,
            config,
        }
    }

    /// The engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The computation registry.
    pub fn registry(&self) -> &Arc<ComputationRegistry> {
        &self.registry
    }

    /// Build a graph from a wire definition.
    ///
    /// The registry acts as port catalog: unknown type tags are rejected and
    /// nodes declaring no ports get the computation's defaults.
    #[instrument(skip_all, fields(nodes = workflow.nodes.len(), edges = workflow.edges.len()))]
    pub fn build(&self, workflow: &WorkflowDefinition) -> Result<Graph> {
        GraphBuilder::new()
            .with_limits(self.config.limits.clone())
            .with_catalog(self.registry.as_ref())
            .build_definition(workflow)
    }

    /// Build and evaluate a wire definition.
    pub async fn evaluate_definition(
        &self,
        workflow: &WorkflowDefinition,
    ) -> Result<EvaluationResult> {
        let graph = self.build(workflow)?;
        self.evaluate(&graph).await
    }

    /// Evaluate a graph to completion.
    pub async fn evaluate(&self, graph: &Graph) -> Result<EvaluationResult> {
        self.evaluate_with_cancel(graph, CancellationToken::new())
            .await
    }

    /// Evaluate a graph, stopping early when `cancel` fires.
    ///
    /// Once cancelled no further node starts. Running nodes finish or time
    /// out; the rest are skipped and the status is `cancelled`.
    pub async fn evaluate_with_cancel(
        &self,
        graph: &Graph,
        cancel: CancellationToken,
    ) -> Result<EvaluationResult> {
        self.evaluate_as(EvaluationId::new(), graph, cancel).await
    }

    /// Like [`evaluate_with_cancel`](Self::evaluate_with_cancel), logging
    /// under a caller-chosen evaluation ID.
    ///
    /// The ID only labels the `evaluation` span; it is not part of the
    /// result.
    pub async fn evaluate_as(
        &self,
        evaluation_id: EvaluationId,
        graph: &Graph,
        cancel: CancellationToken,
    ) -> Result<EvaluationResult> {
        let span = tracing::info_span!(
            "evaluation",
            evaluation_id = %evaluation_id,
            nodes = graph.len(),
            edges = graph.edge_count(),
            strict = self.config.is_strict(),
        );
        self.run(graph, cancel).instrument(span).await
    }

    async fn run(&self, graph: &Graph, cancel: CancellationToken) -> Result<EvaluationResult> {
        let order = scheduler::order_indices(graph)?;
        let waves = scheduler::wave_indices(graph)?;
        tracing::info!(waves = waves.len(), "Evaluation started");

        let ctx = Arc::new(ExecutionContext::new());
        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrent_nodes.max(1)));
        // Fired internally by strict mode on the first failure.
        let abort = CancellationToken::new();

        let mut states = StateTable::new(graph);
        let mut reports: Vec<Option<NodeReport>> = vec![None; graph.len()];
        let mut halted: Option<Halt> = None;
        let mut saw_failure = false;

        for wave in &waves {
            if halted.is_none() && cancel.is_cancelled() {
                halted = Some(Halt::Cancelled);
            }

            let mut tasks: JoinSet<(NodeIndex, TaskOutcome)> = JoinSet::new();

            for &idx in wave {
                let node = graph.node(idx);

                if let Some(halt) = halted {
                    states.transition(idx, NodeState::Skipped)?;
                    reports[idx.index()] = Some(NodeReport::skipped(halt.reason()));
                    continue;
                }

                if let Some(reason) = upstream_skip(graph, idx, &reports) {
                    tracing::debug!(node_id = %node.id, ?reason, "Skipping node");
                    states.transition(idx, NodeState::Skipped)?;
                    reports[idx.index()] = Some(NodeReport::skipped(reason));
                    continue;
                }

                states.transition(idx, NodeState::Ready)?;
                let inputs = resolve_inputs(graph, idx, &ctx);

                let node: GraphNode = node.clone();
                let executor = Arc::clone(&self.executor);
                let ctx = Arc::clone(&ctx);
                let semaphore = Arc::clone(&semaphore);
                let cancel = cancel.clone();
                let abort = abort.clone();

                tasks.spawn(
                    async move {
                        // A closed semaphore means the evaluation is being torn down.
                        let Ok(_permit) = semaphore.acquire_owned().await else {
                            return (idx, TaskOutcome::NotStarted(Halt::Aborted));
                        };
                        if cancel.is_cancelled() {
                            return (idx, TaskOutcome::NotStarted(Halt::Cancelled));
                        }
                        if abort.is_cancelled() {
                            return (idx, TaskOutcome::NotStarted(Halt::Aborted));
                        }
                        let result = executor.run(&node, inputs, &ctx).await;
                        (idx, TaskOutcome::Executed(result))
                    }
                    .in_current_span(),
                );
            }

            while let Some(joined) = tasks.join_next().await {
                let (idx, outcome) = joined.map_err(|e| {
                    tracing::error!(error = %e, "Node task join error");
                    NodeflowError::TaskFailed(e.to_string())
                })?;

                let report = match outcome {
                    TaskOutcome::NotStarted(halt) => {
                        states.transition(idx, NodeState::Skipped)?;
                        halted.get_or_insert(halt);
                        NodeReport::skipped(halt.reason())
                    }
                    TaskOutcome::Executed(Ok(())) => {
                        states.advance(idx, &[NodeState::Running, NodeState::Succeeded])?;
                        NodeReport::succeeded()
                    }
                    TaskOutcome::Executed(Err(error)) => {
                        states.advance(idx, &[NodeState::Running, NodeState::Failed])?;
                        saw_failure = true;
                        if self.config.is_strict() && !abort.is_cancelled() {
                            tracing::warn!(node_id = %error.node_id(), "Strict mode: stopping at first failure");
                            abort.cancel();
                            halted.get_or_insert(Halt::Aborted);
                        }
                        NodeReport::failed(error)
                    }
                };
                reports[idx.index()] = Some(report);
            }
        }

        // A token fired during the last wave leaves nothing to skip.
        let cancelled = reports
            .iter()
            .flatten()
            .any(|r| r.skip == Some(SkipReason::Cancelled))
            || (cancel.is_cancelled() && halted != Some(Halt::Aborted));

        let status = if cancelled {
            EvaluationStatus::Cancelled
        } else if self.config.is_strict() && saw_failure {
            EvaluationStatus::Aborted
        } else if saw_failure {
            EvaluationStatus::CompletedWithFailures
        } else {
            EvaluationStatus::Completed
        };

        let result = self.collect(graph, status, &order, &waves, reports, &ctx)?;
        tracing::info!(
            status = %result.status,
            succeeded = states.count(NodeState::Succeeded),
            failed = states.count(NodeState::Failed),
            skipped = states.count(NodeState::Skipped),
            "Evaluation finished"
        );
        Ok(result)
    }

    fn collect(
        &self,
        graph: &Graph,
        status: EvaluationStatus,
        order: &[NodeIndex],
        waves: &[Vec<NodeIndex>],
        reports: Vec<Option<NodeReport>>,
        ctx: &ExecutionContext,
    ) -> Result<EvaluationResult> {
        let ids = |indices: &[NodeIndex]| -> Vec<NodeId> {
            indices.iter().map(|&i| graph.node(i).id.clone()).collect()
        };

        let mut nodes = BTreeMap::new();
        for (idx, report) in graph.nodes().map(|(idx, _)| idx).zip(reports) {
            let node_id = graph.node(idx).id.clone();
            let Some(report) = report else {
                return Err(NodeflowError::TaskFailed(format!(
                    "node '{node_id}' never reached a final state"
                )));
            };
            nodes.insert(node_id, report);
        }

        let mut terminal_outputs = BTreeMap::new();
        for (idx, node) in graph.nodes() {
            if !graph.is_terminal(idx) {
                continue;
            }
            for port in node.outputs.keys() {
                if let Some(value) = ctx.get(&node.id, port) {
                    terminal_outputs.insert(format!("{}.{port}", node.id), value);
                }
            }
        }

        Ok(EvaluationResult {
            status,
            order: ids(order),
            waves: waves.iter().map(|w| ids(w.as_slice())).collect(),
            outputs: ctx.outputs(),
            terminal_outputs,
            nodes,
        })
    }
}

/// Skip reason for a node with a feed that failed or was skipped.
///
/// Ports are checked in name order and feeds in source order, so the
/// reported port is deterministic.
fn upstream_skip(
    graph: &Graph,
    idx: NodeIndex,
    reports: &[Option<NodeReport>],
) -> Option<SkipReason> {
    let node = graph.node(idx);
    for port in node.inputs.keys() {
        for edge in graph.feeds(idx, port) {
            let Some(report) = &reports[edge.source.index()] else {
                continue;
            };
            let source = &graph.node(edge.source).id;
            let root = match (&report.status, &report.skip) {
                (NodeState::Failed, _) => source.clone(),
                (NodeState::Skipped, Some(SkipReason::Upstream { root, .. })) => root.clone(),
                (NodeState::Skipped, _) => source.clone(),
                _ => continue,
            };
            return Some(SkipReason::Upstream {
                input_port: port.clone(),
                source: source.clone(),
                source_port: edge.source_port.clone(),
                root,
            });
        }
    }
    None
}

/// Collect input values for a node from its literals and upstream outputs.
///
/// A multi port receives an array: the literal first, then edge values in
/// source order. Ports with nothing available are left out so the executor
/// can report `MissingInput`.
fn resolve_inputs(graph: &Graph, idx: NodeIndex, ctx: &ExecutionContext) -> BTreeMap<String, Value> {
    let node = graph.node(idx);
    let mut inputs = BTreeMap::new();

    for (port, decl) in &node.inputs {
        let literal = node.values.get(port).cloned();
        let fed = graph
            .feeds(idx, port)
            .into_iter()
            .filter_map(|edge| ctx.get(&graph.node(edge.source).id, &edge.source_port));

        if decl.multi {
            let items: Vec<Value> = literal.into_iter().chain(fed).collect();
            if !items.is_empty() {
                inputs.insert(port.clone(), Value::array(items));
            }
        } else if let Some(value) = literal.or_else(|| fed.into_iter().next()) {
            inputs.insert(port.clone(), value);
        }
    }
    inputs
}

#[cfg(test)]
mod tests {
    use super::*;
    use nodeflow_core::flow::{InputPort, NodeDefinition, PortType};
    use nodeflow_core::traits::{ComputationInfo, NodeOutputs};
    use nodeflow_core::ComputeError;

    fn registry() -> Arc<ComputationRegistry> {
        let mut registry = ComputationRegistry::new();
        registry
            .register_fn(
                ComputationInfo::new("test", "const")
                    .with_output("out", PortType::Number),
                |input| Ok(NodeOutputs::single(input.require_config("value")?)),
            )
            .register_fn(
                ComputationInfo::new("test", "sum")
                    .with_input("in", InputPort::new(PortType::Number).multi())
                    .with_output("out", PortType::Number),
                |input| {
                    let items = input
                        .require("in")?
                        .as_array()
                        .ok_or_else(|| ComputeError::invalid_input("in", "expected array"))?;
                    let total: i64 = items.iter().filter_map(|v| v.as_i64()).sum();
                    Ok(NodeOutputs::single(total))
                },
            )
            .register_fn(
                ComputationInfo::new("test", "fail")
                    .with_input("in", InputPort::new(PortType::Any).optional())
                    .with_output("out", PortType::Any),
                |_| Err(ComputeError::failed("deliberate")),
            );
        Arc::new(registry)
    }

    fn constant(id: &str, value: i64) -> NodeDefinition {
        NodeDefinition::new(id, "test::const").with_config(serde_json::json!({ "value": value }))
    }

    #[tokio::test]
    async fn fan_in_is_ordered_literal_first() {
        let workflow = WorkflowDefinition::new()
            .with_node(constant("b", 2))
            .with_node(constant("a", 1))
            .with_node(NodeDefinition::new("s", "test::sum").with_value("in", Value::int(10)))
            .connect("b.out", "s.in")
            .connect("a.out", "s.in");

        let engine = EvaluationEngine::new(registry(), EngineConfig::default());
        let graph = engine.build(&workflow).unwrap();

        let ctx = ExecutionContext::new();
        ctx.publish(&"a".into(), BTreeMap::from([("out".to_string(), Value::int(1))]));
        ctx.publish(&"b".into(), BTreeMap::from([("out".to_string(), Value::int(2))]));
        let inputs = resolve_inputs(&graph, graph.index_of("s").unwrap(), &ctx);
        assert_eq!(
            inputs.get("in"),
            Some(&Value::array([Value::int(10), Value::int(1), Value::int(2)]))
        );

        let result = engine.evaluate(&graph).await.unwrap();
        assert_eq!(result.status, EvaluationStatus::Completed);
        assert_eq!(result.output("s", "out"), Some(&Value::int(13)));
        assert_eq!(result.terminal_outputs.len(), 1);
    }

    #[tokio::test]
    async fn skip_reason_points_at_root_failure() {
        let workflow = WorkflowDefinition::new()
            .with_node(NodeDefinition::new("f", "test::fail"))
            .with_node(NodeDefinition::new("s1", "test::sum"))
            .with_node(NodeDefinition::new("s2", "test::sum"))
            .connect("f.out", "s1.in")
            .connect("s1.out", "s2.in");

        let engine = EvaluationEngine::new(registry(), EngineConfig::default());
        let result = engine.evaluate_definition(&workflow).await.unwrap();

        assert_eq!(result.status, EvaluationStatus::CompletedWithFailures);
        assert_eq!(
            result.node("s2").unwrap().skip,
            Some(SkipReason::Upstream {
                input_port: "in".into(),
                source: "s1".into(),
                source_port: "out".into(),
                root: "f".into(),
            })
        );
    }

    #[tokio::test]
    async fn empty_graph_completes() {
        let engine = EvaluationEngine::new(registry(), EngineConfig::default());
        let result = engine
            .evaluate_definition(&WorkflowDefinition::new())
            .await
            .unwrap();
        assert_eq!(result.status, EvaluationStatus::Completed);
        assert!(result.nodes.is_empty());
        assert!(result.waves.is_empty());
    }

    #[tokio::test]
    async fn build_rejects_unknown_type() {
        let engine = EvaluationEngine::new(registry(), EngineConfig::default());
        let workflow =
            WorkflowDefinition::new().with_node(NodeDefinition::new("x", "test::missing"));
        let err = engine.evaluate_definition(&workflow).await.unwrap_err();
        assert!(err.is_client_error());
    }
}
