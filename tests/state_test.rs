use serde_json::json;
use tempfile::TempDir;

use driftwood::state::memory::MemoryStore;
use driftwood::state::models::{ResourceState, ResourceStatus, StateFilter};
use driftwood::state::sqlite::SqliteStore;
use driftwood::state::store::StateStore;

fn make_state(resource_id: &str, provider: &str, status: ResourceStatus) -> ResourceState {
    let mut state = ResourceState::new(resource_id, provider);
    state.status = status;
    state.config.insert("region".to_string(), json!("us-east-1"));
    state
        .config
        .insert("node_count".to_string(), json!(3));
    state
}

// Shared suite run against every store implementation.
async fn run_store_suite(store: &dyn StateStore) {
    store.initialize().await.unwrap();

    // Save and read back, including a nested config value.
    let mut state = make_state("cluster-1", "kubernetes", ResourceStatus::Planned);
    state.config.insert(
        "node_pool".to_string(),
        json!({"min": 1, "max": 5}),
    );
    state.message = "plan: 1 action(s) pending".to_string();
    store.save_state(&state).await.unwrap();

    let got = store.get_state("cluster-1").await.unwrap().unwrap();
    assert_eq!(got.resource_id, "cluster-1");
    assert_eq!(got.provider, "kubernetes");
    assert_eq!(got.status, ResourceStatus::Planned);
    assert_eq!(got.message, "plan: 1 action(s) pending");
    assert_eq!(got.config.get("region"), Some(&json!("us-east-1")));
    assert_eq!(
        got.config.get("node_pool"),
        Some(&json!({"min": 1, "max": 5}))
    );

    // Missing id reads as None.
    assert!(store.get_state("nope").await.unwrap().is_none());

    // Upsert by resource id: a second save replaces status and message.
    let mut updated = got.clone();
    updated.status = ResourceStatus::Active;
    updated.message = "cluster created".to_string();
    updated.touch();
    store.save_state(&updated).await.unwrap();

    let got = store.get_state("cluster-1").await.unwrap().unwrap();
    assert_eq!(got.status, ResourceStatus::Active);
    assert_eq!(got.message, "cluster created");

    // List with filters.
    store
        .save_state(&make_state("svc-1", "ecs", ResourceStatus::Active))
        .await
        .unwrap();
    store
        .save_state(&make_state("svc-2", "ecs", ResourceStatus::Error))
        .await
        .unwrap();

    let all = store.list(&StateFilter::default()).await.unwrap();
    assert_eq!(all.len(), 3);
    // Ordered by resource id.
    let ids: Vec<&str> = all.iter().map(|s| s.resource_id.as_str()).collect();
    assert_eq!(ids, vec!["cluster-1", "svc-1", "svc-2"]);

    let active = store
        .list(&StateFilter {
            status: Some(ResourceStatus::Active),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(active.len(), 2);

    let ecs = store
        .list(&StateFilter {
            provider: Some("ecs".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(ecs.len(), 2);

    let active_ecs = store
        .list(&StateFilter {
            status: Some(ResourceStatus::Active),
            provider: Some("ecs".to_string()),
        })
        .await
        .unwrap();
    assert_eq!(active_ecs.len(), 1);
    assert_eq!(active_ecs[0].resource_id, "svc-1");

    // Hard delete removes the record; deleting again is a no-op.
    store.delete("svc-2").await.unwrap();
    assert!(store.get_state("svc-2").await.unwrap().is_none());
    store.delete("svc-2").await.unwrap();
}

#[tokio::test]
async fn test_memory_store_suite() {
    let store = MemoryStore::new();
    run_store_suite(&store).await;
}

#[tokio::test]
async fn test_sqlite_store_suite() {
    let store = SqliteStore::open_memory().unwrap();
    run_store_suite(&store).await;
}

#[tokio::test]
async fn test_sqlite_initialize_is_idempotent() {
    let store = SqliteStore::open_memory().unwrap();
    store.initialize().await.unwrap();
    store.initialize().await.unwrap();
}

#[tokio::test]
async fn test_sqlite_persists_across_reopen() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("driftwood.db");
    let db_path = db_path.to_str().unwrap();

    {
        let store = SqliteStore::open(db_path).unwrap();
        store.initialize().await.unwrap();
        store
            .save_state(&make_state("app-1", "app.container", ResourceStatus::Active))
            .await
            .unwrap();
    }

    let store = SqliteStore::open(db_path).unwrap();
    store.initialize().await.unwrap();
    let got = store.get_state("app-1").await.unwrap().unwrap();
    assert_eq!(got.provider, "app.container");
    assert_eq!(got.status, ResourceStatus::Active);
}

#[tokio::test]
async fn test_save_is_visible_to_next_get() {
    // Read-your-writes across interleaved saves, as the orchestrator
    // performs within a single operation.
    let store = SqliteStore::open_memory().unwrap();
    store.initialize().await.unwrap();

    for i in 0..10 {
        let mut state = make_state("res", "mock", ResourceStatus::Planned);
        state.message = format!("write {}", i);
        store.save_state(&state).await.unwrap();
        let got = store.get_state("res").await.unwrap().unwrap();
        assert_eq!(got.message, format!("write {}", i));
    }
}
