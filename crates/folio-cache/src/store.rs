//! TTL cache with request deduplication.
//!
//! A key is in one of four states: fresh, expired, pending or absent.
//! A pending key has exactly one producer in flight; every concurrent
//! request for it joins that producer and receives the same `Arc`.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use serde::Serialize;
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{debug, trace};

use crate::error::DedupError;
use crate::metrics::CacheMetrics;

/// TTL applied when a caller does not give one.
pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

/// Outcome published to the requests waiting on a producer.
type Settled<V, E> = Option<Result<Arc<V>, Arc<E>>>;

struct Entry<V> {
    value: Arc<V>,
    expires_at: Instant,
}

impl<V> Entry<V> {
    fn is_fresh(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

struct Pending<V, E> {
    id: u64,
    rx: watch::Receiver<Settled<V, E>>,
}

struct Slots<V, E> {
    entries: HashMap<String, Entry<V>>,
    pending: HashMap<String, Pending<V, E>>,
}

struct Inner<V, E> {
    slots: Mutex<Slots<V, E>>,
    default_ttl: Duration,
    next_id: AtomicU64,
    metrics: CacheMetrics,
}

/// State of a single key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryState {
    /// Cached and not yet expired.
    Cached,
    /// Cached but past its TTL; the next read purges it.
    Stale,
    /// A producer is in flight.
    Pending,
    /// Nothing known about the key.
    Absent,
}

/// Point-in-time cache statistics.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    pub entries: usize,
    pub pending: usize,
    pub hits: u64,
    pub misses: u64,
    pub joins: u64,
    pub hit_rate: f64,
}

/// Keyed TTL cache that collapses concurrent misses into one producer.
///
/// Cloning is cheap; clones share the same entries.
pub struct CacheStore<V, E> {
    inner: Arc<Inner<V, E>>,
}

impl<V, E> Clone for CacheStore<V, E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<V, E> Default for CacheStore<V, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V, E> std::fmt::Debug for CacheStore<V, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let slots = self.inner.slots.lock();
        f.debug_struct("CacheStore")
            .field("entries", &slots.entries.len())
            .field("pending", &slots.pending.len())
            .field("default_ttl", &self.inner.default_ttl)
            .finish()
    }
}

impl<V, E> CacheStore<V, E> {
    /// Creates an empty cache with the default 5 minute TTL.
    pub fn new() -> Self {
        Self::with_default_ttl(DEFAULT_TTL)
    }

    /// Creates an empty cache with the given default TTL.
    pub fn with_default_ttl(default_ttl: Duration) -> Self {
        Self {
            inner: Arc::new(Inner {
                slots: Mutex::new(Slots {
                    entries: HashMap::new(),
                    pending: HashMap::new(),
                }),
                default_ttl,
                next_id: AtomicU64::new(1),
                metrics: CacheMetrics::new(),
            }),
        }
    }

    /// TTL used when none is given.
    pub fn default_ttl(&self) -> Duration {
        self.inner.default_ttl
    }

    /// Returns the cached value if it has not expired.
    ///
    /// An expired entry is removed.
    pub fn get(&self, key: &str) -> Option<Arc<V>> {
        let now = Instant::now();
        let mut slots = self.inner.slots.lock();
        let found = slots
            .entries
            .get(key)
            .map(|entry| (entry.is_fresh(now), Arc::clone(&entry.value)));
        match found {
            Some((true, value)) => Some(value),
            Some((false, _)) => {
                slots.entries.remove(key);
                self.inner.metrics.record_eviction("expired", 1);
                self.inner.metrics.update_entry_count(slots.entries.len());
                None
            },
            None => None,
        }
    }

    /// Stores a value, replacing any previous entry.
    pub fn set(&self, key: impl Into<String>, value: V, ttl: Option<Duration>) -> Arc<V> {
        let value = Arc::new(value);
        self.insert_arc(key.into(), Arc::clone(&value), ttl);
        value
    }

    fn insert_arc(&self, key: String, value: Arc<V>, ttl: Option<Duration>) {
        let expires_at = Instant::now() + ttl.unwrap_or(self.inner.default_ttl);
        let mut slots = self.inner.slots.lock();
        slots.entries.insert(key, Entry { value, expires_at });
        self.inner.metrics.update_entry_count(slots.entries.len());
    }

    /// Removes the entry and forgets any in-flight producer for the key.
    ///
    /// A producer that settles after the delete still answers its waiters
    /// but does not repopulate the cache.
    pub fn delete(&self, key: &str) -> bool {
        let mut slots = self.inner.slots.lock();
        let had_entry = slots.entries.remove(key).is_some();
        let had_pending = slots.pending.remove(key).is_some();
        if had_entry {
            self.inner.metrics.record_eviction("explicit", 1);
            self.inner.metrics.update_entry_count(slots.entries.len());
        }
        had_entry || had_pending
    }

    /// Removes every entry and pending record whose key matches.
    pub fn delete_where(&self, mut matches: impl FnMut(&str) -> bool) -> usize {
        let mut slots = self.inner.slots.lock();
        let before = slots.entries.len();
        slots.entries.retain(|key, _| !matches(key.as_str()));
        let removed = before - slots.entries.len();
        slots.pending.retain(|key, _| !matches(key.as_str()));
        self.inner.metrics.record_eviction("explicit", removed as u64);
        self.inner.metrics.update_entry_count(slots.entries.len());
        removed
    }

    /// Drops all entries and pending records.
    pub fn clear(&self) {
        let mut slots = self.inner.slots.lock();
        let removed = slots.entries.len();
        slots.entries.clear();
        slots.pending.clear();
        self.inner.metrics.record_eviction("cleared", removed as u64);
        self.inner.metrics.update_entry_count(0);
        debug!(removed, "Cache cleared");
    }

    /// Removes expired entries, returning how many were dropped.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut slots = self.inner.slots.lock();
        let before = slots.entries.len();
        slots.entries.retain(|_, entry| entry.is_fresh(now));
        let removed = before - slots.entries.len();
        self.inner.metrics.record_eviction("expired", removed as u64);
        self.inner.metrics.update_entry_count(slots.entries.len());
        removed
    }

    /// Reports the state of a key without changing it.
    pub fn state(&self, key: &str) -> EntryState {
        let now = Instant::now();
        let slots = self.inner.slots.lock();
        match slots.entries.get(key) {
            Some(entry) if entry.is_fresh(now) => EntryState::Cached,
            _ if slots.pending.contains_key(key) => EntryState::Pending,
            Some(_) => EntryState::Stale,
            None => EntryState::Absent,
        }
    }

    /// Keys of all stored entries, expired ones included, sorted.
    pub fn keys(&self) -> Vec<String> {
        let slots = self.inner.slots.lock();
        let mut keys: Vec<String> = slots.entries.keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.inner.slots.lock().entries.len()
    }

    /// Returns true if no entry is stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of producers in flight.
    pub fn pending_count(&self) -> usize {
        self.inner.slots.lock().pending.len()
    }

    /// Hit and miss counters plus current sizes.
    pub fn stats(&self) -> CacheStats {
        let (entries, pending) = {
            let slots = self.inner.slots.lock();
            (slots.entries.len(), slots.pending.len())
        };
        let metrics = &self.inner.metrics;
        CacheStats {
            entries,
            pending,
            hits: metrics.hits(),
            misses: metrics.misses(),
            joins: metrics.joins(),
            hit_rate: metrics.hit_rate(),
        }
    }
}

impl<V, E> CacheStore<V, E>
where
    V: Send + Sync + 'static,
    E: Send + Sync + 'static,
{
    /// Returns the cached value or runs `producer` to obtain it.
    ///
    /// Concurrent calls for a key that is not cached share one producer:
    /// the first caller starts it and the rest wait for its result. A
    /// success is cached for `ttl` (or the default); a failure is handed
    /// to every waiter and not cached.
    ///
    /// The producer runs on its own task, so dropping the caller does not
    /// cancel it. Must be called from within a Tokio runtime.
    pub async fn deduped_request<F, Fut>(
        &self,
        key: &str,
        ttl: Option<Duration>,
        producer: F,
    ) -> Result<Arc<V>, DedupError<E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>> + Send + 'static,
    {
        let (rx, start) = {
            let now = Instant::now();
            let mut slots = self.inner.slots.lock();

            let found = slots
                .entries
                .get(key)
                .map(|entry| (entry.is_fresh(now), Arc::clone(&entry.value)));
            match found {
                Some((true, value)) => {
                    self.inner.metrics.record_hit();
                    trace!(key = %key, "Cache hit");
                    return Ok(value);
                },
                Some((false, _)) => {
                    slots.entries.remove(key);
                    self.inner.metrics.record_eviction("expired", 1);
                },
                None => {},
            }

            if let Some(pending) = slots.pending.get(key) {
                self.inner.metrics.record_join();
                trace!(key = %key, "Joining in-flight request");
                (pending.rx.clone(), None)
            } else {
                self.inner.metrics.record_miss();
                let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
                let (tx, rx) = watch::channel(None);
                slots.pending.insert(
                    key.to_string(),
                    Pending {
                        id,
                        rx: rx.clone(),
                    },
                );
                (rx, Some((id, tx)))
            }
        };

        if let Some((id, tx)) = start {
            debug!(key = %key, "Cache miss, starting producer");
            let guard = SettleGuard {
                inner: Arc::clone(&self.inner),
                key: key.to_string(),
                id,
                ttl,
                tx: Some(tx),
            };
            let fut = producer();
            tokio::spawn(async move {
                let started = Instant::now();
                let result = fut.await;
                let outcome = if result.is_ok() { "success" } else { "failure" };
                guard
                    .inner
                    .metrics
                    .record_producer_duration(outcome, started.elapsed());
                guard.settle(result);
            });
        }

        wait_settled(key, rx).await
    }
}

async fn wait_settled<V, E>(
    key: &str,
    mut rx: watch::Receiver<Settled<V, E>>,
) -> Result<Arc<V>, DedupError<E>> {
    loop {
        let settled = rx.borrow_and_update().clone();
        if let Some(result) = settled {
            return result.map_err(DedupError::Failed);
        }
        if rx.changed().await.is_err() {
            // Sender gone: either it published right before dropping or it never will.
            let last = rx.borrow().clone();
            return match last {
                Some(result) => result.map_err(DedupError::Failed),
                None => Err(DedupError::Abandoned {
                    key: key.to_string(),
                }),
            };
        }
    }
}

/// Owns a producer's pending record until it settles.
///
/// If the producer task is dropped or panics first, the record is removed
/// and waiters observe [`DedupError::Abandoned`].
struct SettleGuard<V, E> {
    inner: Arc<Inner<V, E>>,
    key: String,
    id: u64,
    ttl: Option<Duration>,
    tx: Option<watch::Sender<Settled<V, E>>>,
}

impl<V, E> SettleGuard<V, E> {
    fn settle(mut self, result: Result<V, E>) {
        let result = result.map(Arc::new).map_err(Arc::new);
        {
            let mut slots = self.inner.slots.lock();
            let current = slots.pending.get(&self.key).is_some_and(|p| p.id == self.id);
            if current {
                slots.pending.remove(&self.key);
                if let Ok(value) = &result {
                    let ttl = self.ttl.unwrap_or(self.inner.default_ttl);
                    slots.entries.insert(
                        self.key.clone(),
                        Entry {
                            value: Arc::clone(value),
                            expires_at: Instant::now() + ttl,
                        },
                    );
                    self.inner.metrics.update_entry_count(slots.entries.len());
                }
            } else {
                debug!(key = %self.key, "Request settled after invalidation, result not cached");
            }
        }

        if let Some(tx) = self.tx.take() {
            tx.send_replace(Some(result));
        }
    }
}

impl<V, E> Drop for SettleGuard<V, E> {
    fn drop(&mut self) {
        if self.tx.is_none() {
            return;
        }
        let mut slots = self.inner.slots.lock();
        if slots.pending.get(&self.key).is_some_and(|p| p.id == self.id) {
            slots.pending.remove(&self.key);
        }
        debug!(key = %self.key, "Producer abandoned");
    }
}
