//! Evaluation order and wave grouping.

use crate::graph::{Graph, NodeIndex};
use nodeflow_core::error::CycleError;
use nodeflow_core::NodeId;
use std::cmp::Reverse;
use std::collections::BinaryHeap;

/// Nodes in an order where every node follows all of its dependencies.
///
/// Among nodes that are ready at the same time the one with the smallest ID
/// goes first, so the order is fully determined by the graph.
pub fn order(graph: &Graph) -> Result<Vec<NodeId>, CycleError> {
    Ok(order_indices(graph)?
        .into_iter()
        .map(|idx| graph.node(idx).id.clone())
        .collect())
}

/// Like [`order`], returning arena positions.
pub fn order_indices(graph: &Graph) -> Result<Vec<NodeIndex>, CycleError> {
    let mut in_degree: Vec<usize> = (0..graph.len())
        .map(|i| graph.incoming_edges(NodeIndex(i)).count())
        .collect();

    let mut ready: BinaryHeap<Reverse<(&NodeId, NodeIndex)>> = graph
        .nodes()
        .filter(|(idx, _)| in_degree[idx.0] == 0)
        .map(|(idx, node)| Reverse((&node.id, idx)))
        .collect();

    let mut sorted = Vec::with_capacity(graph.len());
    while let Some(Reverse((_, idx))) = ready.pop() {
        sorted.push(idx);
        for edge in graph.outgoing_edges(idx) {
            let degree = &mut in_degree[edge.target.0];
            *degree -= 1;
            if *degree == 0 {
                ready.push(Reverse((&graph.node(edge.target).id, edge.target)));
            }
        }
    }

    if sorted.len() != graph.len() {
        let mut residual: Vec<NodeId> = graph
            .nodes()
            .filter(|(idx, _)| in_degree[idx.0] > 0)
            .map(|(_, node)| node.id.clone())
            .collect();
        residual.sort();
        return Err(CycleError::new(residual));
    }

    Ok(sorted)
}

/// Nodes grouped into waves.
///
/// Wave `k` holds every node whose dependencies all lie in waves before
/// `k`; nodes inside one wave are independent of each other and sorted by
/// ID. Concatenating the waves yields a valid evaluation order.
pub fn waves(graph: &Graph) -> Result<Vec<Vec<NodeId>>, CycleError> {
    Ok(wave_indices(graph)?
        .into_iter()
        .map(|wave| {
            wave.into_iter()
                .map(|idx| graph.node(idx).id.clone())
                .collect()
        })
        .collect())
}

/// Like [`waves`], returning arena positions.
pub fn wave_indices(graph: &Graph) -> Result<Vec<Vec<NodeIndex>>, CycleError> {
    let sorted = order_indices(graph)?;

    let mut level = vec![0usize; graph.len()];
    for &idx in &sorted {
        level[idx.0] = graph
            .incoming_edges(idx)
            .map(|edge| level[edge.source.0] + 1)
            .max()
            .unwrap_or(0);
    }

    let depth = sorted.iter().map(|idx| level[idx.0] + 1).max().unwrap_or(0);
    let mut grouped: Vec<Vec<NodeIndex>> = vec![Vec::new(); depth];
    for idx in sorted {
        grouped[level[idx.0]].push(idx);
    }
    for wave in &mut grouped {
        wave.sort_by(|a, b| graph.node(*a).id.cmp(&graph.node(*b).id));
    }
    Ok(grouped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{GraphEdge, GraphNode};
    use nodeflow_core::Value;
    use std::collections::BTreeMap;

    /// Build a graph directly, bypassing validation, so cycles reach the
    /// scheduler.
    fn raw_graph(ids: &[&str], edges: &[(&str, &str)]) -> Graph {
        let nodes: Vec<GraphNode> = ids
            .iter()
            .map(|id| GraphNode {
                id: NodeId::from(*id),
                node_type: "test::node".to_string(),
                inputs: BTreeMap::new(),
                outputs: BTreeMap::new(),
                values: BTreeMap::new(),
                config: Value::null(),
                timeout_ms: None,
            })
            .collect();
        let pos = |id: &str| NodeIndex(ids.iter().position(|x| *x == id).unwrap());
        let edges = edges
            .iter()
            .map(|(from, to)| GraphEdge {
                source: pos(from),
                source_port: "out".to_string(),
                target: pos(to),
                target_port: "in".to_string(),
            })
            .collect();
        Graph::from_parts(nodes, edges)
    }

    fn ids(list: &[&str]) -> Vec<NodeId> {
        list.iter().map(|s| NodeId::from(*s)).collect()
    }

    #[test]
    fn linear_order() {
        let graph = raw_graph(&["c", "b", "a"], &[("a", "b"), ("b", "c")]);
        assert_eq!(order(&graph).unwrap(), ids(&["a", "b", "c"]));
    }

    #[test]
    fn ties_break_by_ascending_id() {
        let graph = raw_graph(
            &["root", "z", "m", "a", "end"],
            &[
                ("root", "z"),
                ("root", "m"),
                ("root", "a"),
                ("z", "end"),
                ("m", "end"),
                ("a", "end"),
            ],
        );
        assert_eq!(order(&graph).unwrap(), ids(&["root", "a", "m", "z", "end"]));
    }

    #[test]
    fn independent_roots_in_id_order() {
        let graph = raw_graph(&["b", "c", "a"], &[]);
        assert_eq!(order(&graph).unwrap(), ids(&["a", "b", "c"]));
    }

    #[test]
    fn parallel_edges_between_same_pair() {
        let graph = raw_graph(&["a", "b"], &[("a", "b"), ("a", "b")]);
        assert_eq!(order(&graph).unwrap(), ids(&["a", "b"]));
        assert_eq!(waves(&graph).unwrap(), vec![ids(&["a"]), ids(&["b"])]);
    }

    #[test]
    fn cycle_reports_residual_nodes_sorted() {
        let graph = raw_graph(
            &["start", "y", "x", "after"],
            &[("start", "x"), ("x", "y"), ("y", "x"), ("y", "after")],
        );
        let err = order(&graph).unwrap_err();
        assert_eq!(err.nodes, ids(&["after", "x", "y"]));
    }

    #[test]
    fn two_node_cycle() {
        let graph = raw_graph(&["B", "A"], &[("A", "B"), ("B", "A")]);
        assert_eq!(order(&graph).unwrap_err().nodes, ids(&["A", "B"]));
    }

    #[test]
    fn diamond_waves() {
        let graph = raw_graph(
            &["d", "c", "b", "a"],
            &[("a", "b"), ("a", "c"), ("b", "d"), ("c", "d")],
        );
        assert_eq!(
            waves(&graph).unwrap(),
            vec![ids(&["a"]), ids(&["b", "c"]), ids(&["d"])]
        );
    }

    #[test]
    fn wave_level_follows_longest_path() {
        let graph = raw_graph(
            &["a", "b", "c", "solo"],
            &[("a", "b"), ("b", "c"), ("a", "c")],
        );
        assert_eq!(
            waves(&graph).unwrap(),
            vec![ids(&["a", "solo"]), ids(&["b"]), ids(&["c"])]
        );
    }

    #[test]
    fn empty_graph() {
        let graph = raw_graph(&[], &[]);
        assert!(order(&graph).unwrap().is_empty());
        assert!(waves(&graph).unwrap().is_empty());
    }
}
