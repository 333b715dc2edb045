use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::error;
use uuid::Uuid;

use super::{ApiResponse, AppState};
use crate::error::PipelineError;
use crate::store::{NewPipeline, PipelineUpdate};

pub(super) fn root() -> ApiResponse {
    ApiResponse::json(200, json!({ "message": "Pipeline analysis API" }))
}

pub(super) fn health() -> ApiResponse {
    ApiResponse::json(200, json!({ "status": "healthy" }))
}

fn invalid(error: &str, details: Vec<PipelineError>) -> ApiResponse {
    ApiResponse::json(400, json!({ "error": error, "details": details }))
}

fn decode_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, Vec<PipelineError>> {
    serde_json::from_slice::<T>(body).map_err(|e| {
        vec![PipelineError::parse(
            "P001",
            format!("Failed to parse request body: {}", e),
        )]
    })
}

pub(super) async fn parse_pipeline(state: &AppState, body: &[u8]) -> ApiResponse {
    let payload = match decode_body::<Value>(body) {
        Ok(payload) => payload,
        Err(details) => return invalid("Invalid pipeline data", details),
    };

    match state.gateway.resolve(&payload).await.into_outcome() {
        Ok(result) => ApiResponse::json(200, result),
        Err(details) => invalid("Invalid pipeline data", details),
    }
}

pub(super) fn list_pipelines(state: &AppState) -> ApiResponse {
    match state.store.list() {
        Ok(pipelines) => ApiResponse::json(200, pipelines),
        Err(e) => {
            error!(%e, "listing pipelines failed");
            ApiResponse::error(500, "Failed to fetch pipelines")
        }
    }
}

pub(super) fn create_pipeline(state: &AppState, body: &[u8]) -> ApiResponse {
    let new = match decode_body::<NewPipeline>(body) {
        Ok(new) => new,
        Err(details) => return invalid("Invalid pipeline", details),
    };

    match state.store.create(new) {
        Ok(pipeline) => ApiResponse::json(201, pipeline),
        Err(e) => {
            error!(%e, "creating pipeline failed");
            ApiResponse::error(500, "Failed to create pipeline")
        }
    }
}

pub(super) fn get_pipeline(state: &AppState, id: &str) -> ApiResponse {
    let Ok(id) = Uuid::parse_str(id) else {
        return ApiResponse::error(404, "Pipeline not found");
    };

    match state.store.get(id) {
        Ok(Some(pipeline)) => ApiResponse::json(200, pipeline),
        Ok(None) => ApiResponse::error(404, "Pipeline not found"),
        Err(e) => {
            error!(%e, %id, "fetching pipeline failed");
            ApiResponse::error(500, "Failed to fetch pipeline")
        }
    }
}

pub(super) fn update_pipeline(state: &AppState, id: &str, body: &[u8]) -> ApiResponse {
    let Ok(id) = Uuid::parse_str(id) else {
        return ApiResponse::error(404, "Pipeline not found");
    };
    let update = match decode_body::<PipelineUpdate>(body) {
        Ok(update) => update,
        Err(details) => return invalid("Invalid pipeline", details),
    };

    match state.store.update(id, update) {
        Ok(Some(pipeline)) => ApiResponse::json(200, pipeline),
        Ok(None) => ApiResponse::error(404, "Pipeline not found"),
        Err(e) => {
            error!(%e, %id, "updating pipeline failed");
            ApiResponse::error(500, "Failed to update pipeline")
        }
    }
}

pub(super) fn delete_pipeline(state: &AppState, id: &str) -> ApiResponse {
    let Ok(id) = Uuid::parse_str(id) else {
        return ApiResponse::error(404, "Pipeline not found");
    };

    match state.store.delete(id) {
        Ok(true) => ApiResponse::no_content(),
        Ok(false) => ApiResponse::error(404, "Pipeline not found"),
        Err(e) => {
            error!(%e, %id, "deleting pipeline failed");
            ApiResponse::error(500, "Failed to delete pipeline")
        }
    }
}
