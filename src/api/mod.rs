//! Transport-agnostic request handling.
//!
//! `dispatch` maps a method, a path and a raw body onto a status code and an
//! optional JSON body. The HTTP front door in `server` is a thin shell around
//! it, which keeps every route testable without a socket.

mod handlers;

use std::sync::Arc;

use serde::Serialize;
use serde_json::{Value, json};

use crate::gateway::AnalysisGateway;
use crate::store::{MemoryStore, PipelineStore};

#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Option<Value>,
}

impl ApiResponse {
    pub fn json(status: u16, body: impl Serialize) -> Self {
        match serde_json::to_value(body) {
            Ok(body) => Self {
                status,
                body: Some(body),
            },
            Err(e) => Self::error(500, format!("Failed to encode response: {}", e)),
        }
    }

    pub fn error(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            body: Some(json!({ "error": message.into() })),
        }
    }

    pub fn no_content() -> Self {
        Self {
            status: 204,
            body: None,
        }
    }
}

/// Shared state handed to every request.
#[derive(Clone)]
pub struct AppState {
    pub gateway: AnalysisGateway,
    pub store: Arc<dyn PipelineStore>,
}

impl AppState {
    pub fn new(gateway: AnalysisGateway, store: Arc<dyn PipelineStore>) -> Self {
        Self { gateway, store }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(AnalysisGateway::local(), Arc::new(MemoryStore::new()))
    }
}

/// Route one request.
pub async fn dispatch(state: &AppState, method: &str, path: &str, body: &[u8]) -> ApiResponse {
    let path = path.split('?').next().unwrap_or_default();
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    match (method, segments.as_slice()) {
        ("OPTIONS", _) => ApiResponse::no_content(),
        ("GET", []) => handlers::root(),
        ("GET", ["health"]) => handlers::health(),
        ("POST", ["api", "pipelines", "parse"]) => handlers::parse_pipeline(state, body).await,
        ("GET", ["api", "pipelines"]) => handlers::list_pipelines(state),
        ("POST", ["api", "pipelines"]) => handlers::create_pipeline(state, body),
        ("GET", ["api", "pipelines", id]) => handlers::get_pipeline(state, id),
        ("PATCH", ["api", "pipelines", id]) => handlers::update_pipeline(state, id, body),
        ("DELETE", ["api", "pipelines", id]) => handlers::delete_pipeline(state, id),
        _ => ApiResponse::error(404, "Not found"),
    }
}
