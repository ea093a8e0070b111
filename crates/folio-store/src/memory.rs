//! In-process real-time document store.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use folio_core::StorePath;
use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use serde_json::{Map, Value};
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, trace, warn};

use crate::error::StoreError;
use crate::feed::{ChangeFeed, FEED_CAPACITY, FeedSender};
use crate::store::RemoteStore;

/// Change notifications kept for slow watchers before they lag.
const CHANGE_BUFFER: usize = 256;

/// A change announced to watchers.
#[derive(Debug, Clone)]
enum Change {
    /// The subtree at this path was modified.
    Updated(StorePath),
    /// Watchers related to this path should report an error.
    Failed { path: StorePath, reason: String },
}

/// Failure injected into the next store operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimulatedFailure {
    /// Fail with `StoreError::Unavailable`
    Unavailable,
    /// Fail with `StoreError::Timeout`
    Timeout,
    /// Fail with `StoreError::PermissionDenied`
    PermissionDenied,
}

impl SimulatedFailure {
    fn to_error(self, path: &StorePath) -> StoreError {
        match self {
            Self::Unavailable => StoreError::unavailable("simulated outage"),
            Self::Timeout => StoreError::Timeout { millis: 0 },
            Self::PermissionDenied => StoreError::permission_denied(path.as_str()),
        }
    }
}

/// Operation counters of a `MemoryStore`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OperationCounts {
    pub reads: u64,
    pub writes: u64,
    pub pushes: u64,
    pub removes: u64,
    pub watches: u64,
}

#[derive(Debug, Default)]
struct Counters {
    reads: AtomicU64,
    writes: AtomicU64,
    pushes: AtomicU64,
    removes: AtomicU64,
    watches: AtomicU64,
}

#[derive(Debug, Default)]
struct Faults {
    /// Remaining operations that fail, and how.
    pending: u32,
    kind: Option<SimulatedFailure>,
    offline: bool,
}

#[derive(Debug)]
struct Inner {
    name: String,
    root: RwLock<Value>,
    changes: broadcast::Sender<Change>,
    counters: Counters,
    latency: Mutex<Duration>,
    faults: Mutex<Faults>,
}

/// A JSON document tree kept in memory, with change feeds.
///
/// Behaves like the hosted real-time store: `null` and empty objects are
/// never stored, writes notify every watcher whose path is an ancestor or
/// descendant of the written path, and pushed keys sort by creation time.
/// Clones share the same tree.
///
/// Latency and failures can be simulated for tests.
///
/// # Example
///
/// ```ignore
/// use folio_core::StorePath;
/// use folio_store::{MemoryStore, RemoteStore};
/// use serde_json::json;
///
/// let store = MemoryStore::new("memory");
/// let hero = StorePath::parse("website/hero")?;
/// store.write(&hero, json!({"title": "Folio"})).await?;
///
/// let website = StorePath::parse("website")?;
/// assert_eq!(store.read(&website).await?, Some(json!({"hero": {"title": "Folio"}})));
/// ```
#[derive(Debug, Clone)]
pub struct MemoryStore {
    inner: Arc<Inner>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new(name: impl Into<String>) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_BUFFER);
        Self {
            inner: Arc::new(Inner {
                name: name.into(),
                root: RwLock::new(Value::Null),
                changes,
                counters: Counters::default(),
                latency: Mutex::new(Duration::ZERO),
                faults: Mutex::new(Faults::default()),
            }),
        }
    }

    /// Creates a store holding `root` as its whole tree.
    pub fn with_root(name: impl Into<String>, root: Value) -> Self {
        let store = Self::new(name);
        *store.inner.root.write() = prune(root);
        store
    }

    /// Delays every read, write, push and remove by `latency`.
    pub fn set_latency(&self, latency: Duration) {
        *self.inner.latency.lock() = latency;
    }

    /// Makes the next `count` operations fail with `kind`.
    pub fn fail_next(&self, count: u32, kind: SimulatedFailure) {
        let mut faults = self.inner.faults.lock();
        faults.pending = count;
        faults.kind = Some(kind);
    }

    /// While offline, every operation fails with `StoreError::Unavailable`.
    pub fn set_offline(&self, offline: bool) {
        self.inner.faults.lock().offline = offline;
    }

    /// Sends an error to every watcher related to `path`.
    pub fn fail_watchers(&self, path: &StorePath, reason: impl Into<String>) {
        let _ = self.inner.changes.send(Change::Failed {
            path: path.clone(),
            reason: reason.into(),
        });
    }

    /// Returns the operation counters.
    pub fn operation_counts(&self) -> OperationCounts {
        let c = &self.inner.counters;
        OperationCounts {
            reads: c.reads.load(Ordering::Relaxed),
            writes: c.writes.load(Ordering::Relaxed),
            pushes: c.pushes.load(Ordering::Relaxed),
            removes: c.removes.load(Ordering::Relaxed),
            watches: c.watches.load(Ordering::Relaxed),
        }
    }

    /// Number of physical reads served so far.
    pub fn read_count(&self) -> u64 {
        self.inner.counters.reads.load(Ordering::Relaxed)
    }

    /// Number of feeds currently attached.
    pub fn watcher_count(&self) -> usize {
        self.inner.changes.receiver_count()
    }

    /// Copy of the whole tree.
    pub fn dump(&self) -> Value {
        self.inner.root.read().clone()
    }

    async fn simulate(&self, path: &StorePath) -> Result<(), StoreError> {
        let latency = *self.inner.latency.lock();
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
        self.inner.check_faults(path)
    }

    fn apply(&self, path: &StorePath, value: Value) -> Result<(), StoreError> {
        {
            let mut root = self.inner.root.write();
            set_at(&mut root, path, prune(value))?;
        }
        trace!(store = %self.inner.name, path = %path, "Applied write");
        let _ = self.inner.changes.send(Change::Updated(path.clone()));
        Ok(())
    }
}

impl Inner {
    fn check_faults(&self, path: &StorePath) -> Result<(), StoreError> {
        let mut faults = self.faults.lock();
        if faults.offline {
            return Err(StoreError::unavailable("store is offline"));
        }
        if faults.pending > 0 {
            faults.pending -= 1;
            if let Some(kind) = faults.kind {
                return Err(kind.to_error(path));
            }
        }
        Ok(())
    }

    fn snapshot(&self, path: &StorePath) -> Option<Value> {
        get_at(&self.root.read(), path).cloned()
    }
}

#[async_trait]
impl RemoteStore for MemoryStore {
    async fn read(&self, path: &StorePath) -> Result<Option<Value>, StoreError> {
        self.inner.counters.reads.fetch_add(1, Ordering::Relaxed);
        self.simulate(path).await?;
        Ok(self.inner.snapshot(path))
    }

    async fn write(&self, path: &StorePath, value: Value) -> Result<(), StoreError> {
        self.inner.counters.writes.fetch_add(1, Ordering::Relaxed);
        self.simulate(path).await?;
        self.apply(path, value)
    }

    async fn push(&self, path: &StorePath, value: Value) -> Result<String, StoreError> {
        self.inner.counters.pushes.fetch_add(1, Ordering::Relaxed);
        self.simulate(path).await?;
        let key = uuid::Uuid::now_v7().simple().to_string();
        self.apply(&path.child(&key)?, value)?;
        Ok(key)
    }

    async fn remove(&self, path: &StorePath) -> Result<(), StoreError> {
        self.inner.counters.removes.fetch_add(1, Ordering::Relaxed);
        self.simulate(path).await?;
        self.apply(path, Value::Null)
    }

    fn watch(&self, path: &StorePath) -> ChangeFeed {
        self.inner.counters.watches.fetch_add(1, Ordering::Relaxed);
        let (tx, feed) = ChangeFeed::channel(path.clone(), FEED_CAPACITY);
        let changes = self.inner.changes.subscribe();
        tokio::spawn(run_watch(Arc::clone(&self.inner), path.clone(), tx, changes));
        feed
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        if self.inner.faults.lock().offline {
            return Err(StoreError::unavailable("store is offline"));
        }
        Ok(())
    }

    fn name(&self) -> &str {
        &self.inner.name
    }
}

/// Feeds one watcher until its consumer goes away or the store is dropped.
async fn run_watch(
    inner: Arc<Inner>,
    path: StorePath,
    tx: FeedSender,
    mut changes: broadcast::Receiver<Change>,
) {
    let initial = match inner.check_faults(&path) {
        Ok(()) => Ok(inner.snapshot(&path)),
        Err(e) => Err(e),
    };
    let mut last = initial.as_ref().ok().cloned().flatten();
    if !tx.send(initial).await {
        return;
    }
    debug!(store = %inner.name, path = %path, "Watcher attached");

    loop {
        let change = tokio::select! {
            _ = tx.closed() => break,
            change = changes.recv() => change,
        };

        let snapshot = match change {
            Ok(Change::Updated(changed)) if changed.relates_to(&path) => {
                let current = inner.snapshot(&path);
                if current == last {
                    continue;
                }
                last = current.clone();
                Ok(current)
            },
            Ok(Change::Failed { path: failed, reason }) if failed.relates_to(&path) => {
                Err(StoreError::unavailable(reason))
            },
            Ok(_) => continue,
            Err(RecvError::Lagged(skipped)) => {
                warn!(path = %path, skipped, "Watcher lagged, re-reading");
                last = inner.snapshot(&path);
                Ok(last.clone())
            },
            Err(RecvError::Closed) => break,
        };

        if !tx.send(snapshot).await {
            break;
        }
    }

    debug!(store = %inner.name, path = %path, "Watcher detached");
}

/// Drops nulls and empty objects, which the store never keeps.
fn prune(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let map: Map<String, Value> = map
                .into_iter()
                .map(|(k, v)| (k, prune(v)))
                .filter(|(_, v)| !v.is_null())
                .collect();
            if map.is_empty() {
                Value::Null
            } else {
                Value::Object(map)
            }
        },
        other => other,
    }
}

fn get_at<'a>(root: &'a Value, path: &StorePath) -> Option<&'a Value> {
    let mut node = root;
    for segment in path.segments() {
        node = match node {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    (!node.is_null()).then_some(node)
}

fn set_at(root: &mut Value, path: &StorePath, value: Value) -> Result<(), StoreError> {
    let segments: Vec<&str> = path.segments().collect();
    set_in(root, &segments, value, path)?;
    if let Value::Object(map) = root
        && map.is_empty()
    {
        *root = Value::Null;
    }
    Ok(())
}

fn set_in(node: &mut Value, segments: &[&str], value: Value, path: &StorePath) -> Result<(), StoreError> {
    let Some((head, rest)) = segments.split_first() else {
        *node = value;
        return Ok(());
    };

    if !node.is_object() && !node.is_array() {
        if value.is_null() {
            return Ok(());
        }
        // Writing below a scalar replaces it, as the hosted store does.
        *node = Value::Object(Map::new());
    }

    match node {
        Value::Object(map) => {
            let child = map.entry(head.to_string()).or_insert(Value::Null);
            set_in(child, rest, value, path)?;
            if child.is_null() || matches!(child, Value::Object(m) if m.is_empty()) {
                map.remove(*head);
            }
        },
        Value::Array(items) => {
            let index = head.parse::<usize>().map_err(|_| {
                StoreError::invalid_path(path.as_str(), format!("'{head}' is not an array index"))
            })?;
            if index == items.len() {
                items.push(Value::Null);
            }
            let child = items.get_mut(index).ok_or_else(|| {
                StoreError::invalid_path(path.as_str(), format!("index {index} is out of bounds"))
            })?;
            set_in(child, rest, value, path)?;
        },
        _ => {},
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn p(s: &str) -> StorePath {
        StorePath::parse(s).unwrap()
    }

    #[tokio::test]
    async fn test_write_and_read_nested() {
        let store = MemoryStore::new("memory");
        store.write(&p("website/hero/title"), json!("Folio")).await.unwrap();

        assert_eq!(
            store.read(&p("website")).await.unwrap(),
            Some(json!({"hero": {"title": "Folio"}}))
        );
        assert_eq!(store.read(&p("website/about")).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_null_removes_and_prunes_parents() {
        let store = MemoryStore::with_root("memory", json!({"a": {"b": {"c": 1}}, "d": 2}));
        store.remove(&p("a/b/c")).await.unwrap();

        assert_eq!(store.dump(), json!({"d": 2}));
        store.write(&p("d"), Value::Null).await.unwrap();
        assert_eq!(store.dump(), Value::Null);
    }

    #[tokio::test]
    async fn test_array_index_paths() {
        let store = MemoryStore::with_root("memory", json!({"list": [{"status": "new"}]}));
        store.write(&p("list/0/status"), json!("read")).await.unwrap();
        assert_eq!(store.read(&p("list/0/status")).await.unwrap(), Some(json!("read")));

        let err = store.write(&p("list/5"), json!(1)).await.unwrap_err();
        assert!(matches!(err, StoreError::InvalidPath { .. }));
    }

    #[tokio::test]
    async fn test_push_keys_are_ordered() {
        let store = MemoryStore::new("memory");
        let first = store.push(&p("contacts"), json!({"n": 1})).await.unwrap();
        let second = store.push(&p("contacts"), json!({"n": 2})).await.unwrap();

        assert!(first < second);
        let contacts = store.read(&p("contacts")).await.unwrap().unwrap();
        assert_eq!(contacts[&first]["n"], 1);
        assert_eq!(store.operation_counts().pushes, 2);
    }

    #[tokio::test]
    async fn test_simulated_failures() {
        let store = MemoryStore::new("memory");
        store.fail_next(2, SimulatedFailure::Timeout);

        assert!(matches!(store.read(&p("a")).await, Err(StoreError::Timeout { .. })));
        assert!(store.read(&p("a")).await.is_err());
        assert!(store.read(&p("a")).await.is_ok());

        store.set_offline(true);
        assert!(store.health_check().await.unwrap_err().is_transient());
        store.set_offline(false);
        assert!(store.health_check().await.is_ok());
        assert_eq!(store.read_count(), 3);
    }

    #[tokio::test]
    async fn test_watch_initial_and_related_changes() {
        let store = MemoryStore::with_root("memory", json!({"website": {"team": [{"name": "Ana"}]}}));
        let mut feed = store.watch(&p("website/team"));

        let initial = feed.recv().await.unwrap().unwrap();
        assert_eq!(initial, Some(json!([{"name": "Ana"}])));

        // Unrelated path: no delivery.
        store.write(&p("contacts/x"), json!({"n": 1})).await.unwrap();
        // Ancestor write: delivered.
        store
            .write(&p("website"), json!({"team": [{"name": "Ana"}, {"name": "Leo"}]}))
            .await
            .unwrap();

        let next = feed.recv().await.unwrap().unwrap();
        assert_eq!(next.unwrap().as_array().unwrap().len(), 2);

        store.remove(&p("website/team")).await.unwrap();
        assert_eq!(feed.recv().await.unwrap().unwrap(), None);
    }

    #[tokio::test]
    async fn test_watch_error_and_detach() {
        let store = MemoryStore::new("memory");
        let mut feed = store.watch(&p("website/courses"));
        assert_eq!(feed.recv().await.unwrap().unwrap(), None);
        assert_eq!(store.watcher_count(), 1);

        store.fail_watchers(&p("website"), "permission revoked");
        assert!(feed.recv().await.unwrap().is_err());

        drop(feed);
        // Nudge the watcher so it notices the closed feed.
        tokio::time::timeout(Duration::from_secs(1), async {
            while store.watcher_count() > 0 {
                tokio::task::yield_now().await;
            }
        })
        .await
        .unwrap();
    }

    #[test]
    fn test_prune() {
        assert_eq!(prune(json!({"a": {}, "b": null, "c": 1})), json!({"c": 1}));
        assert_eq!(prune(json!({})), Value::Null);
        assert_eq!(prune(json!([1, 2])), json!([1, 2]));
    }
}
