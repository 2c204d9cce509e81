pub mod container;
pub mod mock;
pub mod registry;

use std::fmt;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::state::models::ManagedResource;

// ─── Plan ────────────────────────────────────────────────────────────────────

/// The kind of change a backend would make on apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionType {
    Create,
    Update,
    Noop,
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionType::Create => f.write_str("create"),
            ActionType::Update => f.write_str("update"),
            ActionType::Noop => f.write_str("noop"),
        }
    }
}

/// One step of a platform plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformAction {
    #[serde(rename = "type")]
    pub action: ActionType,
    pub resource: String,
    pub detail: String,
}

/// Read-only projection of what `apply` would do. Never mutates state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformPlan {
    pub provider: String,
    pub resource: String,
    pub actions: Vec<PlatformAction>,
}

impl PlatformPlan {
    /// True when every planned action is a noop.
    pub fn is_noop(&self) -> bool {
        self.actions.iter().all(|a| a.action == ActionType::Noop)
    }
}

// ─── Apply / Status ──────────────────────────────────────────────────────────

/// Outcome of a backend apply. `state` is an opaque backend-specific
/// snapshot (endpoint URL, replica count, ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformResult {
    pub success: bool,
    pub message: String,
    pub state: serde_json::Value,
}

/// Live status value backends report when the resource does not exist.
/// A resource removed out-of-band is not a hard error to the caller.
pub const STATUS_NOT_FOUND: &str = "not-found";

/// Live view of a resource as reported by a backend status query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiveState {
    pub status: String,
    pub detail: serde_json::Value,
}

impl LiveState {
    pub fn new(status: &str, detail: serde_json::Value) -> Self {
        Self {
            status: status.to_string(),
            detail,
        }
    }

    pub fn not_found() -> Self {
        Self {
            status: STATUS_NOT_FOUND.to_string(),
            detail: serde_json::Value::Null,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status == STATUS_NOT_FOUND
    }
}

// ─── Backend Contract ────────────────────────────────────────────────────────

/// Strategy implemented by every platform-specific backend. The lifecycle
/// engine depends only on this trait, never on a concrete backend type.
///
/// Invariants all implementations must honor identically:
/// - `plan` is read-only and safe to call any number of times. It reports
///   a noop action set when the resource already matches desired state.
/// - `apply` is safe to call when the resource is already running: it
///   either no-ops or reconciles, and never corrupts state on repeat.
/// - `status` reports [`LiveState::not_found`] for a resource that does
///   not exist, rather than failing.
/// - `destroy` is idempotent; destroying an absent resource succeeds.
#[async_trait]
pub trait PlatformBackend: Send + Sync + std::fmt::Debug {
    /// The platform name this backend serves, e.g. "kubernetes" or "ecs".
    fn platform(&self) -> &str;

    async fn plan(&self, resource: &ManagedResource) -> Result<PlatformPlan>;

    async fn apply(&self, resource: &ManagedResource) -> Result<PlatformResult>;

    async fn status(&self, resource: &ManagedResource) -> Result<LiveState>;

    async fn destroy(&self, resource: &ManagedResource) -> Result<()>;
}
