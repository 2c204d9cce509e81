use std::sync::Arc;

use serde_json::json;

use driftwood::backend::mock::MockBackend;
use driftwood::backend::registry::BackendRegistry;
use driftwood::engine::{diff_configs, DriftType, LifecycleEngine};
use driftwood::error::EngineError;
use driftwood::state::memory::MemoryStore;
use driftwood::state::models::ConfigMap;

fn cfg(pairs: &[(&str, serde_json::Value)]) -> ConfigMap {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

#[test]
fn test_identical_configs_produce_no_diffs() {
    let configs = [
        ConfigMap::new(),
        cfg(&[("region", json!("us-east-1"))]),
        cfg(&[
            ("region", json!("us-east-1")),
            ("replicas", json!(3)),
            ("pool", json!({"min": 1, "max": 5})),
        ]),
    ];
    for config in &configs {
        assert!(diff_configs(config, config).is_empty());
    }
}

#[test]
fn test_added_and_removed_keys() {
    // Stored {a:1, b:2} vs current {a:1, c:3}: exactly b removed and
    // c added, and no entry for a.
    let stored = cfg(&[("a", json!(1)), ("b", json!(2))]);
    let current = cfg(&[("a", json!(1)), ("c", json!(3))]);

    let diffs = diff_configs(&stored, &current);
    assert_eq!(diffs.len(), 2);
    assert!(diffs.iter().all(|d| d.key != "a"));

    let b = diffs.iter().find(|d| d.key == "b").unwrap();
    assert_eq!(b.diff_type, DriftType::Removed);
    assert_eq!(b.old_value, Some(json!(2)));
    assert_eq!(b.new_value, None);

    let c = diffs.iter().find(|d| d.key == "c").unwrap();
    assert_eq!(c.diff_type, DriftType::Added);
    assert_eq!(c.old_value, None);
    assert_eq!(c.new_value, Some(json!(3)));
}

#[test]
fn test_changed_value() {
    let stored = cfg(&[("region", json!("us-east-1"))]);
    let current = cfg(&[("region", json!("us-west-2"))]);

    let diffs = diff_configs(&stored, &current);
    assert_eq!(diffs.len(), 1);
    assert_eq!(diffs[0].key, "region");
    assert_eq!(diffs[0].diff_type, DriftType::Changed);
    assert_eq!(diffs[0].old_value, Some(json!("us-east-1")));
    assert_eq!(diffs[0].new_value, Some(json!("us-west-2")));
}

#[test]
fn test_nested_values_compare_by_whole_value() {
    // Nested structures are not recursively diffed: an equal sub-value
    // yields nothing, an unequal one yields a single changed diff for
    // the whole key.
    let stored = cfg(&[("pool", json!({"min": 1, "max": 5}))]);
    let same = cfg(&[("pool", json!({"min": 1, "max": 5}))]);
    assert!(diff_configs(&stored, &same).is_empty());

    let resized = cfg(&[("pool", json!({"min": 1, "max": 9}))]);
    let diffs = diff_configs(&stored, &resized);
    assert_eq!(diffs.len(), 1);
    assert_eq!(diffs[0].key, "pool");
    assert_eq!(diffs[0].diff_type, DriftType::Changed);
}

#[test]
fn test_diffs_are_sorted_by_key() {
    let stored = cfg(&[("zeta", json!(1)), ("beta", json!(2))]);
    let current = cfg(&[("alpha", json!(3)), ("beta", json!(4))]);

    let keys: Vec<String> = diff_configs(&stored, &current)
        .into_iter()
        .map(|d| d.key)
        .collect();
    assert_eq!(keys, vec!["alpha", "beta", "zeta"]);
}

#[tokio::test]
async fn test_drift_requires_a_baseline() {
    let store = Arc::new(MemoryStore::new());
    let registry = Arc::new(BackendRegistry::new());
    registry.register(Arc::new(MockBackend::new("mock")));
    let engine = LifecycleEngine::new(store, registry);

    let err = engine
        .detect_drift("unknown", &ConfigMap::new())
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::ResourceNotFound(_)));
}

#[tokio::test]
async fn test_drift_baseline_survives_failed_apply() {
    use anyhow::bail;
    use async_trait::async_trait;
    use driftwood::backend::{LiveState, PlatformBackend, PlatformPlan, PlatformResult};
    use driftwood::state::models::ManagedResource;

    #[derive(Debug)]
    struct BrokenBackend;

    #[async_trait]
    impl PlatformBackend for BrokenBackend {
        fn platform(&self) -> &str {
            "broken"
        }
        async fn plan(&self, _r: &ManagedResource) -> anyhow::Result<PlatformPlan> {
            bail!("down")
        }
        async fn apply(&self, _r: &ManagedResource) -> anyhow::Result<PlatformResult> {
            bail!("down")
        }
        async fn status(&self, _r: &ManagedResource) -> anyhow::Result<LiveState> {
            bail!("down")
        }
        async fn destroy(&self, _r: &ManagedResource) -> anyhow::Result<()> {
            bail!("down")
        }
    }

    let store = Arc::new(MemoryStore::new());
    let registry = Arc::new(BackendRegistry::new());
    registry.register(Arc::new(MockBackend::new("mock")));
    registry.register(Arc::new(BrokenBackend));
    let engine = LifecycleEngine::new(store, registry);

    engine
        .apply_resource("r1", "mock", cfg(&[("region", json!("us-east-1"))]))
        .await
        .unwrap();
    engine
        .apply_resource("r1", "broken", cfg(&[("region", json!("eu-west-1"))]))
        .await
        .unwrap_err();

    // The baseline is still the last successful apply, so drift against
    // it reports no differences.
    let report = engine
        .detect_drift("r1", &cfg(&[("region", json!("us-east-1"))]))
        .await
        .unwrap();
    assert!(!report.drifted);
    assert!(report.diffs.is_empty());
}
