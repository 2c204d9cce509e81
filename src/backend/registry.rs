use std::sync::Arc;

use dashmap::DashMap;

use super::container::ContainerBackend;
use super::mock::MockBackend;
use super::PlatformBackend;
use crate::error::EngineError;

/// Registry mapping platform names to backend strategies. Backend selection
/// happens here, at resolution time, keyed by the platform name string —
/// callers never type-switch on concrete backends.
///
/// The registry is injected into the engine rather than held as a global,
/// so independent engine instances (e.g. in tests) never share state.
#[derive(Default)]
pub struct BackendRegistry {
    backends: DashMap<String, Arc<dyn PlatformBackend>>,
}

impl BackendRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry preloaded with mock backends for the known platform names
    /// plus the app-container backend. Real cloud backends are registered
    /// by the embedding platform.
    pub fn with_defaults() -> Self {
        let registry = Self::new();
        for platform in [
            "mock",
            "kubernetes",
            "ecs",
            "digitalocean.app",
            "argo.workflows",
        ] {
            registry.register(Arc::new(MockBackend::new(platform)));
        }
        registry.register(Arc::new(ContainerBackend::new()));
        registry
    }

    /// Register a backend under its platform name, replacing any existing
    /// registration for that name.
    pub fn register(&self, backend: Arc<dyn PlatformBackend>) {
        self.backends
            .insert(backend.platform().to_string(), backend);
    }

    /// Resolve the backend for a platform name.
    pub fn resolve(&self, platform: &str) -> Result<Arc<dyn PlatformBackend>, EngineError> {
        self.backends
            .get(platform)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| EngineError::BackendNotFound(platform.to_string()))
    }

    /// Registered platform names, sorted.
    pub fn platforms(&self) -> Vec<String> {
        let mut names: Vec<String> = self.backends.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }
}
