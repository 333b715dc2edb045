use pipeline_analyzer::parse::{PipelineEdge, PipelineNode, PipelinePayload, Position};
use serde_json::{Value, json};

// =============================================================================
// Payload builders
// =============================================================================

pub fn node(id: &str) -> PipelineNode {
    PipelineNode {
        id: id.into(),
        node_type: "text".into(),
        data: Default::default(),
        position: Position { x: 0.0, y: 0.0 },
    }
}

pub fn edge(id: &str, source: &str, target: &str) -> PipelineEdge {
    PipelineEdge {
        id: id.into(),
        source: source.into(),
        target: target.into(),
        source_handle: None,
        target_handle: None,
    }
}

/// Payload from node ids and `(source, target)` pairs. Edge ids are `e0`, `e1`, ...
pub fn payload(nodes: &[&str], edges: &[(&str, &str)]) -> PipelinePayload {
    PipelinePayload {
        nodes: nodes.iter().map(|id| node(id)).collect(),
        edges: edges
            .iter()
            .enumerate()
            .map(|(i, (s, t))| edge(&format!("e{}", i), s, t))
            .collect(),
    }
}

/// Same as `payload`, as the JSON the editor would submit.
pub fn payload_json(nodes: &[&str], edges: &[(&str, &str)]) -> Value {
    json!({
        "nodes": nodes
            .iter()
            .map(|id| json!({ "id": id, "type": "text", "data": {}, "position": { "x": 0, "y": 0 } }))
            .collect::<Vec<_>>(),
        "edges": edges
            .iter()
            .enumerate()
            .map(|(i, (s, t))| json!({ "id": format!("e{}", i), "source": s, "target": t }))
            .collect::<Vec<_>>(),
    })
}
