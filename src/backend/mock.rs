use anyhow::Result;
use async_trait::async_trait;
use dashmap::DashMap;
use serde::Serialize;

use super::{
    ActionType, LiveState, PlatformAction, PlatformBackend, PlatformPlan, PlatformResult,
};
use crate::state::models::{ConfigMap, ManagedResource};

/// Live resource as tracked by the mock backend.
#[derive(Debug, Clone, Serialize)]
struct MockLiveResource {
    status: String,
    endpoint: String,
    config: ConfigMap,
    created_at: String,
}

/// In-memory backend used for tests and dry deployments. Tracks its own
/// live-resource table so plan/status observe state independent of the
/// engine's store, the same way a cloud backend would.
#[derive(Debug)]
pub struct MockBackend {
    platform: String,
    live: DashMap<String, MockLiveResource>,
}

impl MockBackend {
    pub fn new(platform: &str) -> Self {
        Self {
            platform: platform.to_string(),
            live: DashMap::new(),
        }
    }
}

#[async_trait]
impl PlatformBackend for MockBackend {
    fn platform(&self) -> &str {
        &self.platform
    }

    async fn plan(&self, resource: &ManagedResource) -> Result<PlatformPlan> {
        let action = match self.live.get(&resource.resource_id) {
            Some(existing) if existing.status == "running" => {
                if existing.config == resource.config {
                    PlatformAction {
                        action: ActionType::Noop,
                        resource: resource.resource_id.clone(),
                        detail: "resource already running".to_string(),
                    }
                } else {
                    PlatformAction {
                        action: ActionType::Update,
                        resource: resource.resource_id.clone(),
                        detail: format!(
                            "reconcile {} {:?} with desired configuration",
                            self.platform, resource.resource_id
                        ),
                    }
                }
            }
            _ => PlatformAction {
                action: ActionType::Create,
                resource: resource.resource_id.clone(),
                detail: format!("create {} {:?}", self.platform, resource.resource_id),
            },
        };

        Ok(PlatformPlan {
            provider: self.platform.clone(),
            resource: resource.resource_id.clone(),
            actions: vec![action],
        })
    }

    async fn apply(&self, resource: &ManagedResource) -> Result<PlatformResult> {
        if let Some(mut existing) = self.live.get_mut(&resource.resource_id) {
            if existing.status == "running" {
                if existing.config == resource.config {
                    let state = serde_json::to_value(&*existing)?;
                    return Ok(PlatformResult {
                        success: true,
                        message: format!("{} {:?} already running", self.platform, resource.resource_id),
                        state,
                    });
                }
                existing.config = resource.config.clone();
                let state = serde_json::to_value(&*existing)?;
                return Ok(PlatformResult {
                    success: true,
                    message: format!("{} {:?} reconciled", self.platform, resource.resource_id),
                    state,
                });
            }
        }

        let created = MockLiveResource {
            status: "running".to_string(),
            endpoint: format!("mock://{}/{}", self.platform, resource.resource_id),
            config: resource.config.clone(),
            created_at: chrono::Utc::now().to_rfc3339(),
        };
        let state = serde_json::to_value(&created)?;
        self.live.insert(resource.resource_id.clone(), created);

        tracing::debug!(
            platform = %self.platform,
            resource = %resource.resource_id,
            "mock resource created"
        );

        Ok(PlatformResult {
            success: true,
            message: format!("{} {:?} created", self.platform, resource.resource_id),
            state,
        })
    }

    async fn status(&self, resource: &ManagedResource) -> Result<LiveState> {
        match self.live.get(&resource.resource_id) {
            Some(existing) => Ok(LiveState::new(
                &existing.status,
                serde_json::to_value(&*existing)?,
            )),
            None => Ok(LiveState::not_found()),
        }
    }

    async fn destroy(&self, resource: &ManagedResource) -> Result<()> {
        // Destroying an absent resource succeeds.
        self.live.remove(&resource.resource_id);
        Ok(())
    }
}
