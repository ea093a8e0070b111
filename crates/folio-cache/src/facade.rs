//! Cached, deduplicated access to the remote store.

use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use folio_core::StorePath;
use folio_store::{RemoteStore, StoreError};
use futures::future::join_all;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::error::CacheError;
use crate::invalidation::InvalidationResult;
use crate::keys::store_key;
use crate::store::{CacheStats, CacheStore, DEFAULT_TTL};
use crate::subscription::{self, PumpConfig, Registry, Subscription, SubscriptionInfo};
use crate::throttle::DEFAULT_THROTTLE;

/// Façade settings.
#[derive(Debug, Clone)]
pub struct FacadeConfig {
    /// TTL of cached reads when the caller does not give one.
    pub default_ttl: Duration,
    /// Spacing of subscription deliveries when the caller does not give one.
    pub default_throttle: Duration,
    /// Drop cached reads related to a path after writing it.
    pub invalidate_on_write: bool,
}

impl Default for FacadeConfig {
    fn default() -> Self {
        Self {
            default_ttl: DEFAULT_TTL,
            default_throttle: DEFAULT_THROTTLE,
            invalidate_on_write: true,
        }
    }
}

/// Options of a one-shot read.
#[derive(Debug, Clone, Default)]
pub struct ReadOptions {
    /// Cache lifetime of the result.
    pub ttl: Option<Duration>,
    /// Skip the cache and read from the store.
    pub force_refresh: bool,
}

impl ReadOptions {
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            ttl: Some(ttl),
            ..Self::default()
        }
    }

    pub fn refresh() -> Self {
        Self {
            force_refresh: true,
            ..Self::default()
        }
    }
}

/// Options of a live subscription.
#[derive(Debug, Clone, Default)]
pub struct SubscribeOptions {
    /// Minimum spacing between deliveries.
    pub throttle: Option<Duration>,
    /// Deliver the last suppressed value when the window closes.
    pub trailing: bool,
    /// Value delivered when the path is empty or the feed reports an error.
    pub fallback: Value,
}

impl SubscribeOptions {
    pub fn with_throttle(mut self, throttle: Duration) -> Self {
        self.throttle = Some(throttle);
        self
    }

    pub fn with_trailing(mut self) -> Self {
        self.trailing = true;
        self
    }

    pub fn with_fallback(mut self, fallback: Value) -> Self {
        self.fallback = fallback;
        self
    }
}

/// A path that could not be preloaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreloadFailure {
    pub path: StorePath,
    pub error: String,
}

/// Outcome of [`DataFacade::preload`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PreloadReport {
    pub loaded: Vec<StorePath>,
    pub failed: Vec<PreloadFailure>,
}

impl PreloadReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

struct FacadeInner {
    store: Arc<dyn RemoteStore>,
    cache: CacheStore<Value, StoreError>,
    config: FacadeConfig,
    registry: Arc<Registry>,
}

/// Front door to the remote store.
///
/// One-shot reads go through a [`CacheStore`] keyed `store_<path>`, so
/// concurrent reads of a path share one store round-trip and repeated
/// reads within the TTL never leave the process. Live subscriptions are
/// throttled per subscriber. Writes go straight to the store and drop the
/// cached reads they affect.
///
/// Clones share the cache and the subscriptions.
#[derive(Clone)]
pub struct DataFacade {
    inner: Arc<FacadeInner>,
}

impl std::fmt::Debug for DataFacade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataFacade")
            .field("store", &self.inner.store.name())
            .field("cache", &self.inner.cache)
            .field("subscriptions", &self.inner.registry.len())
            .field("config", &self.inner.config)
            .finish()
    }
}

impl DataFacade {
    pub fn new(
        store: Arc<dyn RemoteStore>,
        cache: CacheStore<Value, StoreError>,
        config: FacadeConfig,
    ) -> Self {
        Self {
            inner: Arc::new(FacadeInner {
                store,
                cache,
                config,
                registry: Arc::new(Registry::default()),
            }),
        }
    }

    /// Façade with a fresh cache and default settings.
    pub fn with_store(store: Arc<dyn RemoteStore>) -> Self {
        let config = FacadeConfig::default();
        let cache = CacheStore::with_default_ttl(config.default_ttl);
        Self::new(store, cache, config)
    }

    pub fn store(&self) -> &Arc<dyn RemoteStore> {
        &self.inner.store
    }

    pub fn cache(&self) -> &CacheStore<Value, StoreError> {
        &self.inner.cache
    }

    pub fn config(&self) -> &FacadeConfig {
        &self.inner.config
    }

    /// Reads `path` through the cache.
    ///
    /// An empty path yields `Value::Null`, which is cached like any value.
    /// `force_refresh` drops the cached entry first.
    pub async fn get_once(
        &self,
        path: &StorePath,
        options: ReadOptions,
    ) -> Result<Arc<Value>, CacheError> {
        let key = store_key(path);
        if options.force_refresh {
            self.inner.cache.delete(&key);
        }
        let ttl = options.ttl.unwrap_or(self.inner.config.default_ttl);

        let store = Arc::clone(&self.inner.store);
        let target = path.clone();
        self.inner
            .cache
            .deduped_request(&key, Some(ttl), move || async move {
                match store.read(&target).await {
                    Ok(value) => Ok(value.unwrap_or(Value::Null)),
                    Err(e) => {
                        warn!(path = %target, error = %e, "Store read failed");
                        Err(e)
                    },
                }
            })
            .await
    }

    /// Opens a live, throttled subscription to `path`.
    ///
    /// The first delivery is the current value. Must be called from within
    /// a Tokio runtime.
    pub fn subscribe(&self, path: &StorePath, options: SubscribeOptions) -> Subscription {
        let window = options
            .throttle
            .unwrap_or(self.inner.config.default_throttle);
        let feed = self.inner.store.watch(path);
        subscription::spawn(
            &self.inner.registry,
            feed,
            PumpConfig {
                path: path.clone(),
                window,
                trailing: options.trailing,
                fallback: options.fallback,
            },
        )
    }

    /// Replaces the value at `path`. `Value::Null` removes it.
    pub async fn write(&self, path: &StorePath, value: Value) -> Result<(), StoreError> {
        self.inner.store.write(path, value).await?;
        self.after_write(path);
        Ok(())
    }

    /// Appends under `path` with a store-generated key, which is returned.
    pub async fn push(&self, path: &StorePath, value: Value) -> Result<String, StoreError> {
        let key = self.inner.store.push(path, value).await?;
        self.after_write(path);
        Ok(key)
    }

    /// Removes the value at `path`.
    pub async fn remove(&self, path: &StorePath) -> Result<(), StoreError> {
        self.inner.store.remove(path).await?;
        self.after_write(path);
        Ok(())
    }

    fn after_write(&self, path: &StorePath) {
        if self.inner.config.invalidate_on_write {
            self.inner.cache.invalidate_related(path);
        }
    }

    /// Runs independent operations concurrently and collects every outcome
    /// in input order. One failure does not affect the others; failures
    /// are logged with their index.
    pub async fn batch<T, E, Fut>(&self, operations: impl IntoIterator<Item = Fut>) -> Vec<Result<T, E>>
    where
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        let results = join_all(operations).await;
        for (index, result) in results.iter().enumerate() {
            if let Err(e) = result {
                error!(index, error = %e, "Batch operation failed");
            }
        }
        results
    }

    /// Reads every path into the cache concurrently.
    pub async fn preload(&self, paths: &[StorePath]) -> PreloadReport {
        let reads = paths
            .iter()
            .map(|path| self.get_once(path, ReadOptions::default()));
        let results = self.batch(reads).await;

        let mut report = PreloadReport::default();
        for (path, result) in paths.iter().zip(results) {
            match result {
                Ok(_) => report.loaded.push(path.clone()),
                Err(e) => report.failed.push(PreloadFailure {
                    path: path.clone(),
                    error: e.to_string(),
                }),
            }
        }

        if report.is_complete() {
            info!(paths = report.loaded.len(), "Critical data preloaded");
        } else {
            error!(
                loaded = report.loaded.len(),
                failed = report.failed.len(),
                "Failed to preload critical data"
            );
        }
        report
    }

    /// Drops cached reads of `path`, its ancestors and its descendants.
    pub fn invalidate(&self, path: &StorePath) -> InvalidationResult {
        self.inner.cache.invalidate_related(path)
    }

    /// Drops cached entries whose key matches a glob pattern.
    pub fn invalidate_matching(&self, pattern: &str) -> InvalidationResult {
        self.inner.cache.invalidate_by_pattern(pattern)
    }

    pub fn active_subscriptions(&self) -> Vec<SubscriptionInfo> {
        self.inner.registry.snapshot()
    }

    pub fn subscription_count(&self) -> usize {
        self.inner.registry.len()
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.inner.cache.stats()
    }

    /// Cancels every subscription and clears the cache.
    pub fn shutdown(&self) {
        let cancelled = self.inner.registry.cancel_all();
        self.inner.cache.clear();
        debug!(cancelled, "Data façade shut down");
    }
}
