//! Route-level tests through `api::dispatch`, no sockets involved.

#[allow(dead_code)]
mod helpers;

use helpers::*;
use pipeline_analyzer::api::{AppState, dispatch};
use pipeline_analyzer::parse::{self, AnalysisResult};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};

async fn post(state: &AppState, path: &str, body: &Value) -> (u16, Value) {
    let bytes = serde_json::to_vec(body).unwrap();
    let response = dispatch(state, "POST", path, &bytes).await;
    (response.status, response.body.unwrap_or(Value::Null))
}

async fn get(state: &AppState, path: &str) -> (u16, Value) {
    let response = dispatch(state, "GET", path, b"").await;
    (response.status, response.body.unwrap_or(Value::Null))
}

// =============================================================================
// Analysis endpoint
// =============================================================================

#[tokio::test]
async fn parse_endpoint_returns_counts_and_verdict() {
    let state = AppState::default();
    let payload: Value = serde_json::from_str(include_str!("fixtures/scenario_b_two_cycle.json")).unwrap();
    let (status, body) = post(&state, "/api/pipelines/parse", &payload).await;

    assert_eq!(status, 200);
    assert_eq!(body, json!({ "num_nodes": 2, "num_edges": 2, "is_dag": false }));
}

#[tokio::test]
async fn result_wire_shape() {
    let state = AppState::default();
    let (_, body) = post(&state, "/api/pipelines/parse", &payload_json(&["n1", "n2"], &[("n1", "n2")])).await;
    let result: AnalysisResult = serde_json::from_value(body).unwrap();

    insta::assert_json_snapshot!(result, @r###"
    {
      "num_nodes": 2,
      "num_edges": 1,
      "is_dag": true
    }
    "###);
}

#[tokio::test]
async fn schema_failure_is_400_with_details_and_no_verdict() {
    let state = AppState::default();
    let payload: Value =
        serde_json::from_str(include_str!("fixtures/scenario_d_missing_node_id.json")).unwrap();
    let (status, body) = post(&state, "/api/pipelines/parse", &payload).await;

    assert_eq!(status, 400);
    assert_eq!(body["error"], "Invalid pipeline data");
    assert!(body.get("is_dag").is_none());

    let details = parse::parse(include_str!("fixtures/scenario_d_missing_node_id.json")).unwrap_err();
    assert_eq!(body["details"], serde_json::to_value(&details).unwrap());
    insta::assert_json_snapshot!(details, @r###"
    [
      {
        "code": "S001",
        "phase": "schema",
        "message": "Missing required field 'id'",
        "path": "/nodes/0/id"
      }
    ]
    "###);
}

#[tokio::test]
async fn malformed_body_is_400() {
    let state = AppState::default();
    let response = dispatch(&state, "POST", "/api/pipelines/parse", b"{\"nodes\":").await;
    assert_eq!(response.status, 400);
    let body = response.body.unwrap();
    assert_eq!(body["details"][0]["code"], "P001");
}

// =============================================================================
// Pipeline CRUD
// =============================================================================

#[tokio::test]
async fn create_get_list_update_delete() {
    let state = AppState::default();
    let new = json!({
        "name": "Summarizer",
        "nodes": payload_json(&["a", "b"], &[])["nodes"],
        "edges": [{ "id": "e", "source": "a", "target": "b" }]
    });

    let (status, created) = post(&state, "/api/pipelines", &new).await;
    assert_eq!(status, 201);
    let id = created["id"].as_str().unwrap().to_string();
    assert_eq!(created["name"], "Summarizer");
    assert_eq!(created["createdAt"], created["updatedAt"]);

    let (status, fetched) = get(&state, &format!("/api/pipelines/{}", id)).await;
    assert_eq!(status, 200);
    assert_eq!(fetched, created);

    let (status, listed) = get(&state, "/api/pipelines").await;
    assert_eq!(status, 200);
    assert_eq!(listed.as_array().unwrap().len(), 1);

    let patch = serde_json::to_vec(&json!({ "name": "Renamed" })).unwrap();
    let response = dispatch(&state, "PATCH", &format!("/api/pipelines/{}", id), &patch).await;
    assert_eq!(response.status, 200);
    let body = response.body.unwrap();
    assert_eq!(body["name"], "Renamed");
    assert_eq!(body["edges"], created["edges"]);

    let response = dispatch(&state, "DELETE", &format!("/api/pipelines/{}", id), b"").await;
    assert_eq!(response.status, 204);
    assert!(response.body.is_none());

    let (status, body) = get(&state, &format!("/api/pipelines/{}", id)).await;
    assert_eq!(status, 404);
    assert_eq!(body, json!({ "error": "Pipeline not found" }));
}

#[tokio::test]
async fn create_requires_name_nodes_and_edges() {
    let state = AppState::default();
    let (status, body) = post(&state, "/api/pipelines", &json!({ "name": "no graph" })).await;
    assert_eq!(status, 400);
    assert_eq!(body["error"], "Invalid pipeline");
}

#[tokio::test]
async fn unknown_or_malformed_ids_are_404() {
    let state = AppState::default();
    let (status, _) = get(&state, "/api/pipelines/not-a-uuid").await;
    assert_eq!(status, 404);
    let (status, _) = get(&state, "/api/pipelines/3f2504e0-4f89-41d3-9a0c-0305e82c3301").await;
    assert_eq!(status, 404);
}

// =============================================================================
// Misc routes
// =============================================================================

#[tokio::test]
async fn health_and_root() {
    let state = AppState::default();
    assert_eq!(get(&state, "/health").await, (200, json!({ "status": "healthy" })));
    assert_eq!(get(&state, "/").await.0, 200);
}

#[tokio::test]
async fn query_strings_are_ignored_for_routing() {
    let state = AppState::default();
    assert_eq!(get(&state, "/health?source=lb").await.0, 200);
}

#[tokio::test]
async fn preflight_and_unknown_routes() {
    let state = AppState::default();
    assert_eq!(dispatch(&state, "OPTIONS", "/api/pipelines/parse", b"").await.status, 204);
    assert_eq!(get(&state, "/api/nope").await, (404, json!({ "error": "Not found" })));
    assert_eq!(dispatch(&state, "PUT", "/api/pipelines", b"{}").await.status, 404);
}
