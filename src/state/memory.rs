use anyhow::Result;
use async_trait::async_trait;
use dashmap::DashMap;

use super::models::{ResourceState, StateFilter};
use super::store::StateStore;

/// In-memory state store backed by a DashMap. Safe for concurrent access
/// across distinct resource ids; per-id serialization is the engine's job.
#[derive(Default)]
pub struct MemoryStore {
    states: DashMap<String, ResourceState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StateStore for MemoryStore {
    async fn initialize(&self) -> Result<()> {
        Ok(())
    }

    async fn save_state(&self, state: &ResourceState) -> Result<()> {
        self.states
            .insert(state.resource_id.clone(), state.clone());
        Ok(())
    }

    async fn get_state(&self, resource_id: &str) -> Result<Option<ResourceState>> {
        Ok(self.states.get(resource_id).map(|s| s.value().clone()))
    }

    async fn list(&self, filter: &StateFilter) -> Result<Vec<ResourceState>> {
        let mut states: Vec<ResourceState> = self
            .states
            .iter()
            .filter(|entry| filter.matches(entry.value()))
            .map(|entry| entry.value().clone())
            .collect();
        states.sort_by(|a, b| a.resource_id.cmp(&b.resource_id));
        Ok(states)
    }

    async fn delete(&self, resource_id: &str) -> Result<()> {
        self.states.remove(resource_id);
        Ok(())
    }
}
