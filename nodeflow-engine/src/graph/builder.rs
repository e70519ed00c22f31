//! Graph construction and structural validation.

use super::model::{Graph, GraphEdge, GraphNode, NodeIndex};
use nodeflow_core::error::{CycleError, Result};
use nodeflow_core::flow::{
    EdgeDefinition, GraphLimits, NodeDefinition, ValidationError, ValidationErrorKind,
    WorkflowDefinition,
};
use nodeflow_core::traits::PortCatalog;
use nodeflow_core::NodeId;
use std::collections::HashMap;

/// Build a graph from node and edge definitions with default limits and
/// no port catalog.
///
/// Fails with `NodeflowError::Validation` or `NodeflowError::Cycle`; no
/// partial graph is ever returned.
pub fn build_graph(nodes: Vec<NodeDefinition>, edges: Vec<EdgeDefinition>) -> Result<Graph> {
    GraphBuilder::new().build(nodes, edges)
}

/// Configurable graph builder.
///
/// Validation stops at the first problem found, checking in this order:
/// size limits, node declarations, literal values, edges, unfed required
/// inputs, and finally cycles.
pub struct GraphBuilder<'a> {
    limits: GraphLimits,
    catalog: Option<&'a dyn PortCatalog>,
}

impl Default for GraphBuilder<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> GraphBuilder<'a> {
    /// Create a builder with default limits and no catalog.
    pub fn new() -> Self {
        Self {
            limits: GraphLimits::default(),
            catalog: None,
        }
    }

    /// Set size limits.
    pub fn with_limits(mut self, limits: GraphLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Use a catalog to reject unknown type tags and to supply ports for
    /// nodes that declare none.
    pub fn with_catalog(mut self, catalog: &'a dyn PortCatalog) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Build a graph from a workflow definition.
    pub fn build_definition(&self, workflow: &WorkflowDefinition) -> Result<Graph> {
        self.build(workflow.nodes.clone(), workflow.edges.clone())
    }

    /// Build a graph from node and edge definitions.
    pub fn build(&self, nodes: Vec<NodeDefinition>, edges: Vec<EdgeDefinition>) -> Result<Graph> {
        self.limits.check_counts(nodes.len(), edges.len())?;

        let graph_nodes = self.resolve_nodes(nodes)?;
        let graph = Graph::from_parts(graph_nodes, Vec::new());

        check_literal_values(&graph)?;
        let graph_edges = resolve_edges(&graph, edges)?;
        let graph = Graph::from_parts(graph.nodes, graph_edges);

        check_feeds(&graph)?;
        if let Some(cycle) = find_cycle(&graph) {
            return Err(cycle.into());
        }

        tracing::debug!(
            nodes = graph.len(),
            edges = graph.edge_count(),
            "Graph built"
        );
        Ok(graph)
    }

    fn resolve_nodes(&self, nodes: Vec<NodeDefinition>) -> Result<Vec<GraphNode>> {
        let mut seen: HashMap<String, usize> = HashMap::with_capacity(nodes.len());
        let mut out = Vec::with_capacity(nodes.len());

        for (i, def) in nodes.into_iter().enumerate() {
            let location = format!("nodes[{i}]");
            if def.id.trim().is_empty() {
                return Err(ValidationError::missing_field(location, "id").into());
            }
            if def.node_type.trim().is_empty() {
                return Err(ValidationError::missing_field(location, "type").into());
            }
            if seen.insert(def.id.clone(), i).is_some() {
                return Err(ValidationError::duplicate_id(location, &def.id).into());
            }

            let location = format!("nodes.{}", def.id);
            let mut def = def;
            if let Some(catalog) = self.catalog {
                let Some(info) = catalog.describe(&def.node_type) else {
                    return Err(ValidationError::new(
                        ValidationErrorKind::UnknownNodeType,
                        location,
                        format!("no computation registered for type '{}'", def.node_type),
                    )
                    .into());
                };
                if def.has_no_ports() {
                    def.inputs = info.inputs;
                    def.outputs = info.outputs;
                }
            }
            self.limits
                .check_ports(&location, def.inputs.len() + def.outputs.len())?;

            out.push(GraphNode {
                id: NodeId::new(def.id),
                node_type: def.node_type,
                inputs: def.inputs,
                outputs: def.outputs,
                values: def.values,
                config: def.config,
                timeout_ms: def.timeout_ms,
            });
        }
        Ok(out)
    }
}

fn check_literal_values(graph: &Graph) -> Result<()> {
    for (_, node) in graph.nodes() {
        for (port, value) in &node.values {
            let location = format!("nodes.{}.values.{}", node.id, port);
            let Some(decl) = node.inputs.get(port) else {
                return Err(
                    ValidationError::unknown_port(location, node.id.as_str(), port, "input").into(),
                );
            };
            if !value.conforms_to(decl.port_type) {
                return Err(ValidationError::new(
                    ValidationErrorKind::InvalidValue,
                    location,
                    format!(
                        "literal of type {} does not fit port of type {}",
                        value.port_type(),
                        decl.port_type
                    ),
                )
                .into());
            }
        }
    }
    Ok(())
}

fn resolve_edges(graph: &Graph, edges: Vec<EdgeDefinition>) -> Result<Vec<GraphEdge>> {
    let mut out = Vec::with_capacity(edges.len());

    for (i, def) in edges.into_iter().enumerate() {
        let location = format!("edges[{i}]");
        let Some(source) = graph.index_of(&def.source) else {
            return Err(ValidationError::unknown_node(location, &def.source).into());
        };
        let Some(target) = graph.index_of(&def.target) else {
            return Err(ValidationError::unknown_node(location, &def.target).into());
        };

        let source_node = graph.node(source);
        let target_node = graph.node(target);
        let Some(&source_type) = source_node.outputs.get(&def.source_port) else {
            return Err(ValidationError::unknown_port(
                location,
                &def.source,
                &def.source_port,
                "output",
            )
            .into());
        };
        let Some(target_decl) = target_node.inputs.get(&def.target_port) else {
            return Err(ValidationError::unknown_port(
                location,
                &def.target,
                &def.target_port,
                "input",
            )
            .into());
        };

        if !source_type.is_compatible_with(target_decl.port_type) {
            return Err(ValidationError::new(
                ValidationErrorKind::TypeMismatch,
                location,
                format!(
                    "{} produces {} but {} expects {}",
                    def.from_ref(),
                    source_type,
                    def.to_ref(),
                    target_decl.port_type
                ),
            )
            .into());
        }

        out.push(GraphEdge {
            source,
            source_port: def.source_port,
            target,
            target_port: def.target_port,
        });
    }
    Ok(out)
}

/// Every non-multi input is fed at most once; every required input is fed.
fn check_feeds(graph: &Graph) -> Result<()> {
    for (idx, node) in graph.nodes() {
        for (port, decl) in &node.inputs {
            let location = format!("nodes.{}.inputs.{}", node.id, port);
            let feeds = feed_count(graph, idx, node, port);
            if feeds > 1 && !decl.multi {
                return Err(ValidationError::new(
                    ValidationErrorKind::DuplicateFeed,
                    location,
                    format!("input '{port}' is fed {feeds} times but accepts one feed"),
                )
                .into());
            }
            if feeds == 0 && decl.required {
                return Err(ValidationError::new(
                    ValidationErrorKind::UnfedInput,
                    location,
                    format!("required input '{port}' has no incoming edge or literal value"),
                )
                .into());
            }
        }
    }
    Ok(())
}

fn feed_count(graph: &Graph, idx: NodeIndex, node: &GraphNode, port: &str) -> usize {
    let edges = graph
        .incoming_edges(idx)
        .filter(|e| e.target_port == port)
        .count();
    edges + usize::from(node.values.contains_key(port))
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    OnPath,
    Done,
}

/// Depth-first cycle search.
///
/// Roots are visited in ascending ID order and so are the successors of
/// each node, which makes the reported cycle deterministic. The cycle is
/// the slice of the current path starting at the node the back edge
/// returns to.
fn find_cycle(graph: &Graph) -> Option<CycleError> {
    let mut marks = vec![Mark::Unvisited; graph.len()];
    let successors: Vec<Vec<NodeIndex>> = (0..graph.len())
        .map(|i| graph.successors(NodeIndex(i)))
        .collect();

    for root in graph.indices_by_id() {
        if marks[root.0] != Mark::Unvisited {
            continue;
        }

        let mut path: Vec<NodeIndex> = vec![root];
        let mut cursors: Vec<usize> = vec![0];
        marks[root.0] = Mark::OnPath;

        while let Some(&current) = path.last() {
            let depth = path.len() - 1;
            let next = successors[current.0].get(cursors[depth]).copied();
            cursors[depth] += 1;

            match next {
                Some(succ) => match marks[succ.0] {
                    Mark::Unvisited => {
                        marks[succ.0] = Mark::OnPath;
                        path.push(succ);
                        cursors.push(0);
                    }
                    Mark::OnPath => {
                        let start = path.iter().position(|&n| n == succ).unwrap_or(0);
                        let nodes = path[start..]
                            .iter()
                            .map(|&n| graph.node(n).id.clone())
                            .collect();
                        return Some(CycleError::new(nodes));
                    }
                    Mark::Done => {}
                },
                None => {
                    marks[current.0] = Mark::Done;
                    path.pop();
                    cursors.pop();
                }
            }
        }
    }
    None
}
