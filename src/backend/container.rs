use anyhow::{bail, Result};
use async_trait::async_trait;
use dashmap::DashMap;
use serde::Serialize;

use super::{
    ActionType, LiveState, PlatformAction, PlatformBackend, PlatformPlan, PlatformResult,
};
use crate::state::models::{ConfigMap, ManagedResource};

/// Desired state of an application container, parsed from the flat
/// resource config.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContainerSpec {
    pub image: String,
    pub replicas: u64,
    pub cpu: String,
    pub memory: String,
    pub health_path: String,
}

impl ContainerSpec {
    /// Parse a spec from resource config. `image` is required; everything
    /// else falls back to defaults.
    pub fn from_config(config: &ConfigMap) -> Result<Self> {
        let image = match config.get("image").and_then(|v| v.as_str()) {
            Some(s) if !s.is_empty() => s.to_string(),
            _ => bail!("app container config requires 'image'"),
        };
        let replicas = match config.get("replicas") {
            None => 1,
            Some(v) => v
                .as_u64()
                .or_else(|| v.as_str().and_then(|s| s.parse().ok()))
                .unwrap_or(1),
        };
        let string_or = |key: &str, default: &str| {
            config
                .get(key)
                .and_then(|v| v.as_str())
                .unwrap_or(default)
                .to_string()
        };
        Ok(Self {
            image,
            replicas,
            cpu: string_or("cpu", "256m"),
            memory: string_or("memory", "512Mi"),
            health_path: string_or("health_path", "/healthz"),
        })
    }
}

#[derive(Debug, Clone, Serialize)]
struct ContainerDeployment {
    spec: ContainerSpec,
    status: String,
    endpoint: String,
}

/// Backend deploying application containers. Tracks deployments in memory;
/// a production variant renders the same spec into Kubernetes manifests or
/// an ECS task definition behind the identical contract.
#[derive(Debug)]
pub struct ContainerBackend {
    deployments: DashMap<String, ContainerDeployment>,
}

impl Default for ContainerBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl ContainerBackend {
    pub fn new() -> Self {
        Self {
            deployments: DashMap::new(),
        }
    }
}

#[async_trait]
impl PlatformBackend for ContainerBackend {
    fn platform(&self) -> &str {
        "app.container"
    }

    async fn plan(&self, resource: &ManagedResource) -> Result<PlatformPlan> {
        let spec = ContainerSpec::from_config(&resource.config)?;

        let action = match self.deployments.get(&resource.resource_id) {
            Some(existing) if existing.spec == spec => PlatformAction {
                action: ActionType::Noop,
                resource: resource.resource_id.clone(),
                detail: format!("app {:?} already at {}", resource.resource_id, spec.image),
            },
            Some(existing) => PlatformAction {
                action: ActionType::Update,
                resource: resource.resource_id.clone(),
                detail: format!(
                    "roll app {:?} from {} to {} ({} replicas)",
                    resource.resource_id, existing.spec.image, spec.image, spec.replicas
                ),
            },
            None => PlatformAction {
                action: ActionType::Create,
                resource: resource.resource_id.clone(),
                detail: format!(
                    "deploy app {:?} image {} ({} replicas)",
                    resource.resource_id, spec.image, spec.replicas
                ),
            },
        };

        Ok(PlatformPlan {
            provider: "app.container".to_string(),
            resource: resource.resource_id.clone(),
            actions: vec![action],
        })
    }

    async fn apply(&self, resource: &ManagedResource) -> Result<PlatformResult> {
        let spec = ContainerSpec::from_config(&resource.config)?;

        if let Some(existing) = self.deployments.get(&resource.resource_id) {
            if existing.status == "active" && existing.spec == spec {
                let state = serde_json::to_value(&*existing)?;
                return Ok(PlatformResult {
                    success: true,
                    message: format!("app {:?} already running", resource.resource_id),
                    state,
                });
            }
        }

        let deployment = ContainerDeployment {
            endpoint: format!("http://{}.local", resource.resource_id),
            status: "active".to_string(),
            spec,
        };
        let state = serde_json::to_value(&deployment)?;
        let message = format!(
            "app {:?} deployed ({} replicas)",
            resource.resource_id, deployment.spec.replicas
        );
        self.deployments
            .insert(resource.resource_id.clone(), deployment);

        tracing::info!(resource = %resource.resource_id, "app container deployed");

        Ok(PlatformResult {
            success: true,
            message,
            state,
        })
    }

    async fn status(&self, resource: &ManagedResource) -> Result<LiveState> {
        match self.deployments.get(&resource.resource_id) {
            Some(existing) => Ok(LiveState::new(
                &existing.status,
                serde_json::to_value(&*existing)?,
            )),
            None => Ok(LiveState::not_found()),
        }
    }

    async fn destroy(&self, resource: &ManagedResource) -> Result<()> {
        self.deployments.remove(&resource.resource_id);
        Ok(())
    }
}
