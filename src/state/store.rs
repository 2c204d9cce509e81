use anyhow::Result;
use async_trait::async_trait;

use super::models::{ResourceState, StateFilter};

/// Pluggable state store trait.
/// Implemented by SQLite (durable, single host) and an in-memory DashMap
/// store (embedding and tests).
///
/// A successful `save_state` must be visible to the next `get_state` issued
/// after it returns: the orchestrator interleaves reads and writes within
/// one logical operation.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Initialize the store (create tables where applicable).
    async fn initialize(&self) -> Result<()>;

    /// Insert or update the record for `state.resource_id`.
    async fn save_state(&self, state: &ResourceState) -> Result<()>;

    /// Fetch the record for a resource id, if any.
    async fn get_state(&self, resource_id: &str) -> Result<Option<ResourceState>>;

    /// List records matching the filter, ordered by resource id.
    async fn list(&self, filter: &StateFilter) -> Result<Vec<ResourceState>>;

    /// Hard-delete a record. Distinct from the `deleted` status; used for
    /// cleanup and tests, not part of the normal lifecycle. Deleting an
    /// unknown id is a no-op.
    async fn delete(&self, resource_id: &str) -> Result<()>;
}
