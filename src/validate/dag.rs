//! Cycle detection by Kahn's algorithm.

use std::collections::VecDeque;

use petgraph::Direction;
use petgraph::graph::NodeIndex;
use petgraph::visit::EdgeRef;

use crate::error::PipelineError;
use crate::parse::graph::PipelineGraph;

/// Result of one Kahn pass over a graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KahnOutcome {
    /// Nodes in the order they were removed from the worklist.
    pub order: Vec<NodeIndex>,
    /// Nodes never reaching in-degree 0: on a cycle or only reachable from one.
    pub blocked: Vec<NodeIndex>,
    pub total: usize,
}

impl KahnOutcome {
    pub fn is_acyclic(&self) -> bool {
        self.order.len() == self.total
    }
}

fn fault(message: impl Into<String>) -> PipelineError {
    PipelineError::analyze("A001", message)
}

/// Run Kahn's algorithm. The worklist is seeded in node submission order and
/// drained FIFO, so the resulting order is deterministic.
///
/// `Err` is only returned for internal bookkeeping inconsistencies.
pub fn kahn(graph: &PipelineGraph) -> Result<KahnOutcome, PipelineError> {
    let g = &graph.graph;
    let total = g.node_count();

    let mut in_degree = vec![0usize; total];
    for edge in g.edge_references() {
        let slot = in_degree
            .get_mut(edge.target().index())
            .ok_or_else(|| fault(format!("Edge '{}' targets a node outside the graph", edge.weight().id)))?;
        *slot += 1;
    }

    let mut worklist: VecDeque<NodeIndex> = g
        .node_indices()
        .filter(|n| in_degree[n.index()] == 0)
        .collect();

    let mut order = Vec::with_capacity(total);
    while let Some(current) = worklist.pop_front() {
        order.push(current);

        for next in g.neighbors_directed(current, Direction::Outgoing) {
            let degree = in_degree
                .get_mut(next.index())
                .ok_or_else(|| fault(format!("Node '{}' is outside the graph", g[next])))?;
            *degree = degree
                .checked_sub(1)
                .ok_or_else(|| fault(format!("In-degree of node '{}' went negative", g[next])))?;
            if *degree == 0 {
                worklist.push_back(next);
            }
        }
    }

    let blocked = g
        .node_indices()
        .filter(|n| in_degree[n.index()] > 0)
        .collect();

    Ok(KahnOutcome {
        order,
        blocked,
        total,
    })
}

/// Returns node ids in topological order, or the ids left on or behind a
/// cycle.
pub fn topological_order(graph: &PipelineGraph) -> Result<Vec<String>, Vec<PipelineError>> {
    let outcome = kahn(graph).map_err(|e| vec![e])?;

    if outcome.is_acyclic() {
        return Ok(outcome
            .order
            .into_iter()
            .map(|idx| graph.graph[idx].clone())
            .collect());
    }

    Err(outcome
        .blocked
        .into_iter()
        .map(|idx| {
            let id = &graph.graph[idx];
            PipelineError::structure(
                "D003",
                format!("Node '{}' is part of, or only reachable through, a cycle", id),
                None,
            )
        })
        .collect())
}
