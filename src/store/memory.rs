use chrono::Utc;
use indexmap::IndexMap;
use parking_lot::RwLock;
use uuid::Uuid;

use super::{NewPipeline, Pipeline, PipelineStore, PipelineUpdate};
use crate::error::StoreError;

/// In-process store. Contents are lost when the process exits.
#[derive(Debug, Default)]
pub struct MemoryStore {
    pipelines: RwLock<IndexMap<Uuid, Pipeline>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.pipelines.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.pipelines.read().is_empty()
    }
}

impl PipelineStore for MemoryStore {
    fn create(&self, pipeline: NewPipeline) -> Result<Pipeline, StoreError> {
        let now = Utc::now();
        let stored = Pipeline {
            id: Uuid::new_v4(),
            name: pipeline.name,
            nodes: pipeline.nodes,
            edges: pipeline.edges,
            created_at: now,
            updated_at: now,
        };
        self.pipelines.write().insert(stored.id, stored.clone());
        Ok(stored)
    }

    fn get(&self, id: Uuid) -> Result<Option<Pipeline>, StoreError> {
        Ok(self.pipelines.read().get(&id).cloned())
    }

    fn list(&self) -> Result<Vec<Pipeline>, StoreError> {
        Ok(self.pipelines.read().values().cloned().collect())
    }

    fn update(&self, id: Uuid, update: PipelineUpdate) -> Result<Option<Pipeline>, StoreError> {
        let mut pipelines = self.pipelines.write();
        let Some(existing) = pipelines.get_mut(&id) else {
            return Ok(None);
        };

        if let Some(name) = update.name {
            existing.name = name;
        }
        if let Some(nodes) = update.nodes {
            existing.nodes = nodes;
        }
        if let Some(edges) = update.edges {
            existing.edges = edges;
        }
        existing.updated_at = Utc::now();

        Ok(Some(existing.clone()))
    }

    fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        // shift_remove keeps list() in creation order
        Ok(self.pipelines.write().shift_remove(&id).is_some())
    }
}
