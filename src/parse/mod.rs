//! Parse phase: JSON → shape check → Rust types + graph construction.

pub mod graph;
pub mod schema;
pub mod types;

pub use graph::PipelineGraph;
pub use types::*;

use serde_json::Value;

use crate::error::PipelineError;

/// Deserialize request text into an untyped JSON value.
pub fn parse_json(json: &str) -> Result<Value, Vec<PipelineError>> {
    serde_json::from_str::<Value>(json).map_err(|e| {
        vec![PipelineError::parse(
            "P001",
            format!("Failed to parse pipeline JSON: {}", e),
        )]
    })
}

/// Parse JSON text and validate it into a `PipelinePayload` in one step.
pub fn parse(json: &str) -> Result<PipelinePayload, Vec<PipelineError>> {
    let value = parse_json(json)?;
    schema::validate_payload(&value)
}

/// Parse JSON and build the graph in one step.
pub fn parse_and_build(json: &str) -> Result<(PipelinePayload, PipelineGraph), Vec<PipelineError>> {
    let payload = parse(json)?;
    let graph = PipelineGraph::build(&payload)?;
    Ok((payload, graph))
}
