//! Graph analysis phase.
//!
//! `analyze` never fails once the payload has the right shape: dangling
//! references, cycles and internal faults all surface as `is_dag: false`.

pub mod dag;
pub mod structural;

use std::panic::{self, AssertUnwindSafe};

use serde_json::Value;
use tracing::{debug, error};

use crate::error::PipelineError;
use crate::parse::graph::PipelineGraph;
use crate::parse::schema;
use crate::parse::types::{AnalysisResult, PipelinePayload};

/// Count nodes and edges and decide whether the pipeline is a valid DAG.
pub fn analyze(payload: &PipelinePayload) -> AnalysisResult {
    analyze_with(payload, check_dag)
}

fn analyze_with<F>(payload: &PipelinePayload, check: F) -> AnalysisResult
where
    F: FnOnce(&PipelinePayload) -> Result<bool, PipelineError>,
{
    let num_nodes = payload.nodes.len();
    let num_edges = payload.edges.len();

    let is_dag = match panic::catch_unwind(AssertUnwindSafe(|| check(payload))) {
        Ok(Ok(is_dag)) => is_dag,
        Ok(Err(fault)) => {
            error!(%fault, "DAG check failed, reporting pipeline as invalid");
            false
        }
        Err(_) => {
            error!("DAG check panicked, reporting pipeline as invalid");
            false
        }
    };

    debug!(num_nodes, num_edges, is_dag, "pipeline analyzed");

    AnalysisResult {
        num_nodes,
        num_edges,
        is_dag,
    }
}

/// Shape-check an untyped payload, then analyze it.
pub fn analyze_value(value: &Value) -> Result<AnalysisResult, Vec<PipelineError>> {
    let payload = schema::validate_payload(value)?;
    Ok(analyze(&payload))
}

/// Validate the pipeline's structure and return every diagnostic.
pub fn diagnose(payload: &PipelinePayload) -> Vec<PipelineError> {
    structural::validate_structural(payload)
}

fn check_dag(payload: &PipelinePayload) -> Result<bool, PipelineError> {
    let graph = match PipelineGraph::build(payload) {
        Ok(graph) => graph,
        Err(dangling) => {
            debug!(dangling = dangling.len(), "edges reference unknown nodes");
            return Ok(false);
        }
    };

    Ok(dag::kahn(&graph)?.is_acyclic())
}
