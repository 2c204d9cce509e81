use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Flat key/value configuration for a resource. Values are opaque JSON
/// scalars or sub-structures; drift comparison treats nested values by
/// whole-value equality.
pub type ConfigMap = BTreeMap<String, serde_json::Value>;

// ─── Resource Status ────────────────────────────────────────────────────────

/// Lifecycle status of a managed resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceStatus {
    Pending,
    Planned,
    Creating,
    Active,
    Deleting,
    Deleted,
    Error,
}

impl ResourceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceStatus::Pending => "pending",
            ResourceStatus::Planned => "planned",
            ResourceStatus::Creating => "creating",
            ResourceStatus::Active => "active",
            ResourceStatus::Deleting => "deleting",
            ResourceStatus::Deleted => "deleted",
            ResourceStatus::Error => "error",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(ResourceStatus::Pending),
            "planned" => Some(ResourceStatus::Planned),
            "creating" => Some(ResourceStatus::Creating),
            // Some backends report "running" for a healthy resource.
            "active" | "running" => Some(ResourceStatus::Active),
            "deleting" => Some(ResourceStatus::Deleting),
            "deleted" => Some(ResourceStatus::Deleted),
            "error" => Some(ResourceStatus::Error),
            _ => None,
        }
    }
}

impl fmt::Display for ResourceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─── Managed Resource ───────────────────────────────────────────────────────

/// The logical unit under lifecycle management, as supplied by the caller.
/// Backends receive this for every operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManagedResource {
    pub resource_id: String,
    pub platform: String,
    pub config: ConfigMap,
}

impl ManagedResource {
    pub fn new(resource_id: &str, platform: &str, config: ConfigMap) -> Self {
        Self {
            resource_id: resource_id.to_string(),
            platform: platform.to_string(),
            config,
        }
    }
}

// ─── Resource State ─────────────────────────────────────────────────────────

/// Persisted record for one resource id. Created on the first successful
/// `plan`, never silently removed by the engine — `destroy` transitions it
/// to `deleted` and the record stays queryable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceState {
    pub resource_id: String,
    pub provider: String,
    pub status: ResourceStatus,
    /// Last configuration successfully planned or applied. Serves as the
    /// drift baseline; a failed apply leaves it untouched.
    pub config: ConfigMap,
    pub message: String,
    pub created_at: String,
    pub updated_at: String,
}

impl ResourceState {
    pub fn new(resource_id: &str, provider: &str) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            resource_id: resource_id.to_string(),
            provider: provider.to_string(),
            status: ResourceStatus::Pending,
            config: ConfigMap::new(),
            message: String::new(),
            created_at: now.clone(),
            updated_at: now,
        }
    }

    /// Refresh `updated_at` before a save.
    pub fn touch(&mut self) {
        self.updated_at = chrono::Utc::now().to_rfc3339();
    }
}

// ─── Query Filter ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct StateFilter {
    pub status: Option<ResourceStatus>,
    pub provider: Option<String>,
}

impl StateFilter {
    pub fn matches(&self, state: &ResourceState) -> bool {
        if let Some(status) = self.status {
            if state.status != status {
                return false;
            }
        }
        if let Some(ref provider) = self.provider {
            if &state.provider != provider {
                return false;
            }
        }
        true
    }
}
