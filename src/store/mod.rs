//! Pipeline persistence.
//!
//! Stores named pipelines as submitted. Nothing here re-validates the graph;
//! callers run `validate::analyze` first if they care.

mod memory;

pub use memory::MemoryStore;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::error::StoreError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pipeline {
    pub id: Uuid,
    pub name: String,
    pub nodes: Vec<Value>,
    pub edges: Vec<Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body of a create request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPipeline {
    pub name: String,
    pub nodes: Vec<Value>,
    pub edges: Vec<Value>,
}

/// Body of an update request. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub nodes: Option<Vec<Value>>,
    #[serde(default)]
    pub edges: Option<Vec<Value>>,
}

/// Repository over persisted pipelines. Implementations are shared across
/// request handlers, hence `Send + Sync`.
pub trait PipelineStore: Send + Sync {
    fn create(&self, pipeline: NewPipeline) -> Result<Pipeline, StoreError>;

    fn get(&self, id: Uuid) -> Result<Option<Pipeline>, StoreError>;

    /// All pipelines, oldest first.
    fn list(&self) -> Result<Vec<Pipeline>, StoreError>;

    fn update(&self, id: Uuid, update: PipelineUpdate) -> Result<Option<Pipeline>, StoreError>;

    /// Returns whether a pipeline was removed.
    fn delete(&self, id: Uuid) -> Result<bool, StoreError>;
}
