use std::sync::Arc;
use std::time::Duration;

use folio_store::folio_core::StorePath;
use folio_store::{
    MemoryStore, RemoteStore, RetryPolicy, RetryingStore, SimulatedFailure, StoreError,
    seed_if_empty,
};
use serde_json::json;

fn p(s: &str) -> StorePath {
    StorePath::parse(s).unwrap()
}

#[tokio::test(start_paused = true)]
async fn test_retrying_store_over_shared_memory_store() {
    let memory = Arc::new(MemoryStore::new("memory"));
    let store: Arc<dyn RemoteStore> =
        Arc::new(RetryingStore::new(Arc::clone(&memory), RetryPolicy::default()));

    seed_if_empty(store.as_ref(), &p("website"), json!({"services": [{"id": 1}]}))
        .await
        .unwrap();

    memory.fail_next(2, SimulatedFailure::Unavailable);
    let services = store.read(&p("website/services")).await.unwrap();
    assert_eq!(services, Some(json!([{"id": 1}])));
    assert_eq!(memory.operation_counts().reads, 4);
}

#[tokio::test]
async fn test_permission_errors_surface_immediately() {
    let memory = MemoryStore::new("memory");
    let store = RetryingStore::new(memory.clone(), RetryPolicy::default());

    memory.fail_next(1, SimulatedFailure::PermissionDenied);
    let err = store.write(&p("website/hero"), json!({"t": 1})).await.unwrap_err();
    assert!(matches!(err, StoreError::PermissionDenied { .. }));
    assert!(store.state().is_healthy());
}

#[tokio::test]
async fn test_watch_through_decorator_sees_pushes() {
    let memory = MemoryStore::new("memory");
    let store = RetryingStore::new(memory.clone(), RetryPolicy::none());
    let mut feed = store.watch(&p("contacts"));

    assert_eq!(feed.recv().await.unwrap().unwrap(), None);

    let key = store.push(&p("contacts"), json!({"name": "Ana"})).await.unwrap();
    let snapshot = tokio::time::timeout(Duration::from_secs(1), feed.recv())
        .await
        .unwrap()
        .unwrap()
        .unwrap()
        .unwrap();
    assert_eq!(snapshot[&key]["name"], "Ana");
}
