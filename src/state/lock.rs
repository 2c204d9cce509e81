use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Per-resource-id lock table. Operations on the same resource id must be
/// serialized across their read-state / call-backend / write-state sequence;
/// operations on distinct ids run concurrently.
#[derive(Default)]
pub struct ResourceLocks {
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl ResourceLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the exclusive lock for a resource id, waiting if another
    /// operation holds it. The guard releases on drop.
    pub async fn acquire(&self, resource_id: &str) -> OwnedMutexGuard<()> {
        let lock = self
            .locks
            .entry(resource_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        lock.lock_owned().await
    }
}
