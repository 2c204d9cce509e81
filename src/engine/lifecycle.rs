use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::drift::{diff_configs, DriftReport};
use crate::backend::registry::BackendRegistry;
use crate::backend::{PlatformPlan, PlatformResult};
use crate::error::EngineError;
use crate::state::lock::ResourceLocks;
use crate::state::models::{ConfigMap, ManagedResource, ResourceState, ResourceStatus};
use crate::state::store::StateStore;

// ─── Operation Results ───────────────────────────────────────────────────────

/// Result of a successful apply, combining the backend outcome with the
/// stored status after the write.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplyOutcome {
    pub resource_id: String,
    pub success: bool,
    pub message: String,
    pub status: ResourceStatus,
    pub state: serde_json::Value,
}

/// Stored and live views of a resource, returned unreconciled: a transient
/// live-query failure must not corrupt durable state, so reconciliation is
/// left to the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusReport {
    pub resource_id: String,
    pub stored_status: ResourceStatus,
    pub live_status: String,
    pub live_detail: serde_json::Value,
    pub message: String,
}

/// Result of a destroy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DestroyOutcome {
    pub resource_id: String,
    pub destroyed: bool,
    pub status: ResourceStatus,
}

// ─── Engine ──────────────────────────────────────────────────────────────────

/// The lifecycle orchestrator. Each operation combines one state-store
/// read/write with exactly one backend call, under an exclusive
/// per-resource-id lock. The engine performs no background work and never
/// retries; retry policy belongs to the calling pipeline layer.
pub struct LifecycleEngine {
    store: Arc<dyn StateStore>,
    registry: Arc<BackendRegistry>,
    locks: ResourceLocks,
    op_timeout: Option<Duration>,
}

impl LifecycleEngine {
    pub fn new(store: Arc<dyn StateStore>, registry: Arc<BackendRegistry>) -> Self {
        Self {
            store,
            registry,
            locks: ResourceLocks::new(),
            op_timeout: None,
        }
    }

    /// Bound every backend call by a deadline. A call that exceeds it is
    /// treated as cancelled-after-issue: the stored record transitions to
    /// `error` with a "cancelled" message, since the live state is unknown.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.op_timeout = Some(timeout);
        self
    }

    pub fn registry(&self) -> &BackendRegistry {
        &self.registry
    }

    /// Run one backend call under the configured deadline.
    async fn backend_call<T, F>(
        &self,
        operation: &'static str,
        fut: F,
    ) -> Result<T, EngineError>
    where
        F: Future<Output = anyhow::Result<T>>,
    {
        match self.op_timeout {
            Some(deadline) => match tokio::time::timeout(deadline, fut).await {
                Ok(result) => result.map_err(|e| EngineError::backend(operation, e)),
                Err(_) => Err(EngineError::Cancelled(format!(
                    "{} deadline exceeded",
                    operation
                ))),
            },
            None => fut.await.map_err(|e| EngineError::backend(operation, e)),
        }
    }

    /// Best-effort persist of an `error` status after a failed backend
    /// call. The config baseline is left untouched so drift detection
    /// keeps a valid last-known-good snapshot.
    async fn record_error(&self, resource_id: &str, platform: &str, message: &str) {
        let mut state = match self.store.get_state(resource_id).await {
            Ok(Some(state)) => state,
            Ok(None) => ResourceState::new(resource_id, platform),
            Err(e) => {
                tracing::warn!(resource = %resource_id, error = %e, "failed to read state while recording error");
                return;
            }
        };
        state.status = ResourceStatus::Error;
        state.message = message.to_string();
        state.touch();
        if let Err(e) = self.store.save_state(&state).await {
            tracing::warn!(resource = %resource_id, error = %e, "failed to record error state");
        }
    }

    // ─── Plan ───────────────────────────────────────────────────────────────

    /// Compute the action set for a resource and persist a `planned` state,
    /// creating the record if absent. Read-only toward the backend; the
    /// stored status stays `active` if the resource is already running.
    /// Backend errors surface unchanged and persist nothing.
    pub async fn plan_resource(
        &self,
        resource_id: &str,
        platform: &str,
        config: ConfigMap,
    ) -> Result<PlatformPlan, EngineError> {
        let backend = self.registry.resolve(platform)?;
        let _guard = self.locks.acquire(resource_id).await;

        let resource = ManagedResource::new(resource_id, platform, config);
        let plan = self.backend_call("plan", backend.plan(&resource)).await?;

        let mut state = self
            .store
            .get_state(resource_id)
            .await
            .map_err(EngineError::Store)?
            .unwrap_or_else(|| ResourceState::new(resource_id, platform));

        if state.status != ResourceStatus::Active {
            state.status = ResourceStatus::Planned;
        }
        state.provider = platform.to_string();
        state.config = resource.config;
        state.message = if plan.is_noop() {
            "plan: no changes required".to_string()
        } else {
            format!("plan: {} action(s) pending", plan.actions.len())
        };
        state.touch();
        self.store
            .save_state(&state)
            .await
            .map_err(EngineError::Store)?;

        tracing::info!(
            resource = %resource_id,
            platform = %platform,
            actions = plan.actions.len(),
            "plan computed"
        );
        Ok(plan)
    }

    // ─── Apply ──────────────────────────────────────────────────────────────

    /// Provision the resource. On success the record becomes `active` and
    /// the config baseline is replaced by the applied config; on failure
    /// the record becomes `error` with the error text and the baseline is
    /// preserved. Calling apply before plan is permitted — the record is
    /// created on the fly.
    pub async fn apply_resource(
        &self,
        resource_id: &str,
        platform: &str,
        config: ConfigMap,
    ) -> Result<ApplyOutcome, EngineError> {
        let backend = self.registry.resolve(platform)?;
        let _guard = self.locks.acquire(resource_id).await;

        let resource = ManagedResource::new(resource_id, platform, config);
        let result: PlatformResult =
            match self.backend_call("apply", backend.apply(&resource)).await {
                Ok(result) if result.success => result,
                Ok(result) => {
                    self.record_error(resource_id, platform, &result.message).await;
                    return Err(EngineError::backend(
                        "apply",
                        anyhow::anyhow!("{}", result.message),
                    ));
                }
                Err(err) => {
                    self.record_error(resource_id, platform, &err.to_string()).await;
                    return Err(err);
                }
            };

        let mut state = self
            .store
            .get_state(resource_id)
            .await
            .map_err(EngineError::Store)?
            .unwrap_or_else(|| ResourceState::new(resource_id, platform));
        state.status = ResourceStatus::Active;
        state.provider = platform.to_string();
        state.config = resource.config;
        state.message = result.message.clone();
        state.touch();
        self.store
            .save_state(&state)
            .await
            .map_err(EngineError::Store)?;

        tracing::info!(resource = %resource_id, platform = %platform, "apply succeeded");

        Ok(ApplyOutcome {
            resource_id: resource_id.to_string(),
            success: true,
            message: result.message,
            status: ResourceStatus::Active,
            state: result.state,
        })
    }

    // ─── Status ─────────────────────────────────────────────────────────────

    /// Return the stored status alongside a live backend query. The stored
    /// record is not mutated; a backend-reported `not-found` is a valid
    /// live status (the resource may have been removed out-of-band), never
    /// a hard error.
    pub async fn status_resource(
        &self,
        resource_id: &str,
        platform: &str,
    ) -> Result<StatusReport, EngineError> {
        let backend = self.registry.resolve(platform)?;
        let _guard = self.locks.acquire(resource_id).await;

        let stored = self
            .store
            .get_state(resource_id)
            .await
            .map_err(EngineError::Store)?
            .ok_or_else(|| EngineError::ResourceNotFound(resource_id.to_string()))?;

        let resource = ManagedResource::new(resource_id, platform, stored.config.clone());
        let live = self
            .backend_call("status", backend.status(&resource))
            .await?;

        Ok(StatusReport {
            resource_id: resource_id.to_string(),
            stored_status: stored.status,
            live_status: live.status,
            live_detail: live.detail,
            message: stored.message,
        })
    }

    // ─── Destroy ────────────────────────────────────────────────────────────

    /// Tear the resource down. Idempotent: a resource already `deleted` in
    /// the store returns success without a backend call and without
    /// touching the stored message.
    pub async fn destroy_resource(
        &self,
        resource_id: &str,
        platform: &str,
    ) -> Result<DestroyOutcome, EngineError> {
        let backend = self.registry.resolve(platform)?;
        let _guard = self.locks.acquire(resource_id).await;

        let existing = self
            .store
            .get_state(resource_id)
            .await
            .map_err(EngineError::Store)?;

        if let Some(ref state) = existing {
            if state.status == ResourceStatus::Deleted {
                return Ok(DestroyOutcome {
                    resource_id: resource_id.to_string(),
                    destroyed: true,
                    status: ResourceStatus::Deleted,
                });
            }
        }

        let config = existing
            .as_ref()
            .map(|s| s.config.clone())
            .unwrap_or_default();
        let resource = ManagedResource::new(resource_id, platform, config);

        if let Err(err) = self
            .backend_call("destroy", backend.destroy(&resource))
            .await
        {
            self.record_error(resource_id, platform, &err.to_string()).await;
            return Err(err);
        }

        let mut state =
            existing.unwrap_or_else(|| ResourceState::new(resource_id, platform));
        state.status = ResourceStatus::Deleted;
        state.message = "resource destroyed".to_string();
        state.touch();
        self.store
            .save_state(&state)
            .await
            .map_err(EngineError::Store)?;

        tracing::info!(resource = %resource_id, platform = %platform, "destroy succeeded");

        Ok(DestroyOutcome {
            resource_id: resource_id.to_string(),
            destroyed: true,
            status: ResourceStatus::Deleted,
        })
    }

    // ─── Drift ──────────────────────────────────────────────────────────────

    /// Compare the stored config baseline against a caller-supplied current
    /// config. Never calls a backend. Fails with `ResourceNotFound` when no
    /// baseline exists.
    pub async fn detect_drift(
        &self,
        resource_id: &str,
        current: &ConfigMap,
    ) -> Result<DriftReport, EngineError> {
        let stored = self
            .store
            .get_state(resource_id)
            .await
            .map_err(EngineError::Store)?
            .ok_or_else(|| EngineError::ResourceNotFound(resource_id.to_string()))?;

        let diffs = diff_configs(&stored.config, current);
        Ok(DriftReport {
            resource_id: resource_id.to_string(),
            drifted: !diffs.is_empty(),
            diffs,
        })
    }
}
