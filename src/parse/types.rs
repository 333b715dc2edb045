//! Rust types mirroring the editor's pipeline JSON.
//!
//! These types are the serde target for `{ nodes, edges }` payloads once the
//! schema check has passed. Field names follow the editor (camelCase handles).

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// =============================================================================
// PAYLOAD
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelinePayload {
    pub nodes: Vec<PipelineNode>,
    pub edges: Vec<PipelineEdge>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineNode {
    pub id: String,
    #[serde(rename = "type")]
    pub node_type: String,
    /// Node-type specific settings. Never inspected by the analyzer.
    pub data: Map<String, Value>,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_handle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_handle: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

// =============================================================================
// RESULT
// =============================================================================

/// Outcome of analyzing one payload. Serialized with snake_case keys, which is
/// the wire shape of both the local and the delegated path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub num_nodes: usize,
    pub num_edges: usize,
    pub is_dag: bool,
}
