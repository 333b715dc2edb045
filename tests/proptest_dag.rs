//! Property-based tests for the DAG verdict.

use pipeline_analyzer::parse::{PipelineEdge, PipelineNode, PipelinePayload, Position};
use pipeline_analyzer::validate;
use proptest::prelude::*;

fn build(node_count: usize, edges: &[(usize, usize)]) -> PipelinePayload {
    PipelinePayload {
        nodes: (0..node_count)
            .map(|i| PipelineNode {
                id: format!("n{}", i),
                node_type: "text".into(),
                data: Default::default(),
                position: Position { x: 0.0, y: 0.0 },
            })
            .collect(),
        edges: edges
            .iter()
            .enumerate()
            .map(|(i, (s, t))| PipelineEdge {
                id: format!("e{}", i),
                source: format!("n{}", s),
                target: format!("n{}", t),
                source_handle: None,
                target_handle: None,
            })
            .collect(),
    }
}

prop_compose! {
    /// Edges that only point from a lower to a higher index: always acyclic.
    fn arb_forward_graph()(node_count in 2usize..30)(
        node_count in Just(node_count),
        pairs in prop::collection::vec((0..node_count, 0..node_count), 0..60)
    ) -> (usize, Vec<(usize, usize)>) {
        let edges = pairs
            .into_iter()
            .filter(|(a, b)| a != b)
            .map(|(a, b)| (a.min(b), a.max(b)))
            .collect();
        (node_count, edges)
    }
}

proptest! {
    #[test]
    fn forward_edges_are_always_dag((node_count, edges) in arb_forward_graph()) {
        let result = validate::analyze(&build(node_count, &edges));
        prop_assert!(result.is_dag);
        prop_assert_eq!(result.num_nodes, node_count);
        prop_assert_eq!(result.num_edges, edges.len());
    }

    #[test]
    fn a_back_edge_over_a_forward_path_makes_a_cycle(
        (node_count, mut edges) in arb_forward_graph()
    ) {
        // Chain 0 -> 1 -> ... -> last guarantees a path for the back edge to close.
        edges.extend((0..node_count - 1).map(|i| (i, i + 1)));
        edges.push((node_count - 1, 0));
        let result = validate::analyze(&build(node_count, &edges));
        prop_assert!(!result.is_dag);
    }

    #[test]
    fn no_edges_is_always_dag(node_count in 0usize..50) {
        let result = validate::analyze(&build(node_count, &[]));
        prop_assert!(result.is_dag);
        prop_assert_eq!(result.num_edges, 0);
    }

    #[test]
    fn any_dangling_edge_is_never_dag(
        (node_count, mut edges) in arb_forward_graph(),
        slot in 0usize..60
    ) {
        edges.insert(slot.min(edges.len()), (0, node_count + 7));
        let result = validate::analyze(&build(node_count, &edges));
        prop_assert!(!result.is_dag);
    }

    #[test]
    fn verdict_is_deterministic(
        node_count in 1usize..15,
        pairs in prop::collection::vec((0usize..15, 0usize..15), 0..40)
    ) {
        let edges: Vec<_> = pairs
            .into_iter()
            .map(|(a, b)| (a % node_count, b % node_count))
            .collect();
        let payload = build(node_count, &edges);
        prop_assert_eq!(validate::analyze(&payload), validate::analyze(&payload));
    }
}
