//! Structural diagnostics (R001–R002, D001–D003).
//!
//! These explain why a pipeline is not a valid DAG. They never change the
//! verdict computed by `analyze`.

use std::collections::HashSet;

use crate::error::PipelineError;
use crate::parse::graph::PipelineGraph;
use crate::parse::types::PipelinePayload;

use super::dag;

/// Run all structural rules. Returns all errors found.
pub fn validate_structural(payload: &PipelinePayload) -> Vec<PipelineError> {
    let mut errors = Vec::new();

    d001_unique_node_ids(payload, &mut errors);
    d002_no_self_loops(payload, &mut errors);

    match PipelineGraph::build(payload) {
        Ok(graph) => d003_no_cycles(&graph, &mut errors),
        // Cycle detection is skipped when references dangle.
        Err(dangling) => errors.extend(dangling),
    }

    errors
}

fn d001_unique_node_ids(payload: &PipelinePayload, errors: &mut Vec<PipelineError>) {
    let mut seen = HashSet::new();
    for (i, node) in payload.nodes.iter().enumerate() {
        if !seen.insert(node.id.as_str()) {
            errors.push(PipelineError::structure(
                "D001",
                format!("Duplicate node id '{}'", node.id),
                Some(format!("/nodes/{}/id", i)),
            ));
        }
    }
}

fn d002_no_self_loops(payload: &PipelinePayload, errors: &mut Vec<PipelineError>) {
    for (i, edge) in payload.edges.iter().enumerate() {
        if edge.source == edge.target {
            errors.push(PipelineError::structure(
                "D002",
                format!("Edge '{}' loops on node '{}'", edge.id, edge.source),
                Some(format!("/edges/{}", i)),
            ));
        }
    }
}

fn d003_no_cycles(graph: &PipelineGraph, errors: &mut Vec<PipelineError>) {
    match dag::topological_order(graph) {
        Ok(_) => {}
        Err(blocked) => errors.extend(blocked),
    }
}
