//! petgraph-based directed graph wrapper for a submitted pipeline.
//!
//! Parallel edges and self-loops are kept as submitted: every edge counts
//! toward in-degree bookkeeping. Duplicate node ids collapse onto the first
//! occurrence.

use std::collections::HashMap;

use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};

use super::types::PipelinePayload;
use crate::error::PipelineError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeLabel {
    pub id: String,
    pub source_handle: Option<String>,
    pub target_handle: Option<String>,
}

pub struct PipelineGraph {
    pub graph: DiGraph<String, EdgeLabel>,
    pub node_indices: HashMap<String, NodeIndex>,
}

impl PipelineGraph {
    /// Build the graph. Fails with every dangling edge reference found.
    pub fn build(payload: &PipelinePayload) -> Result<Self, Vec<PipelineError>> {
        let mut graph = DiGraph::with_capacity(payload.nodes.len(), payload.edges.len());
        let mut node_indices = HashMap::with_capacity(payload.nodes.len());
        let mut errors = Vec::new();

        for node in &payload.nodes {
            if node_indices.contains_key(&node.id) {
                continue;
            }
            let idx = graph.add_node(node.id.clone());
            node_indices.insert(node.id.clone(), idx);
        }

        for (i, edge) in payload.edges.iter().enumerate() {
            let source_idx = node_indices.get(&edge.source);
            let target_idx = node_indices.get(&edge.target);

            if source_idx.is_none() {
                errors.push(PipelineError::structure(
                    "R001",
                    format!(
                        "Edge '{}' references unknown source node '{}'",
                        edge.id, edge.source
                    ),
                    Some(format!("/edges/{}/source", i)),
                ));
            }
            if target_idx.is_none() {
                errors.push(PipelineError::structure(
                    "R002",
                    format!(
                        "Edge '{}' references unknown target node '{}'",
                        edge.id, edge.target
                    ),
                    Some(format!("/edges/{}/target", i)),
                ));
            }

            if let (Some(&s), Some(&t)) = (source_idx, target_idx) {
                graph.add_edge(
                    s,
                    t,
                    EdgeLabel {
                        id: edge.id.clone(),
                        source_handle: edge.source_handle.clone(),
                        target_handle: edge.target_handle.clone(),
                    },
                );
            }
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(PipelineGraph { graph, node_indices })
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Node ids in submission order (first occurrence of each id).
    pub fn node_ids(&self) -> impl Iterator<Item = &str> {
        self.graph.node_indices().map(|idx| self.graph[idx].as_str())
    }

    /// Target ids of every outgoing edge, one entry per edge.
    pub fn successors(&self, node_id: &str) -> Vec<&str> {
        let Some(&idx) = self.node_indices.get(node_id) else {
            return vec![];
        };
        self.graph
            .neighbors_directed(idx, Direction::Outgoing)
            .map(|n| self.graph[n].as_str())
            .collect()
    }

    pub fn incoming_count(&self, node_id: &str) -> usize {
        let Some(&idx) = self.node_indices.get(node_id) else {
            return 0;
        };
        self.graph.edges_directed(idx, Direction::Incoming).count()
    }

    pub fn outgoing_count(&self, node_id: &str) -> usize {
        self.successors(node_id).len()
    }
}
