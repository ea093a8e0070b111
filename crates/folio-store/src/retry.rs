//! Retry with exponential backoff for transient store failures.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use folio_core::StorePath;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::StoreError;
use crate::feed::ChangeFeed;
use crate::state::ConnectionState;
use crate::store::RemoteStore;

/// Configuration for retrying failed store operations.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Delay before the first retry.
    pub base_delay: Duration,
    /// Backoff multiplier between retries.
    pub backoff_multiplier: f64,
    /// Maximum delay between retries.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(1000),
            backoff_multiplier: 2.0,
            max_delay: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Delay before retry number `attempt` (0-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = self.backoff_multiplier.powi(attempt.min(i32::MAX as u32) as i32);
        let secs = self.base_delay.as_secs_f64() * factor;
        Duration::try_from_secs_f64(secs).map_or(self.max_delay, |delay| delay.min(self.max_delay))
    }
}

/// Runs `op` until it succeeds, fails permanently or runs out of retries.
///
/// Only transient errors (see `StoreError::is_transient`) are retried.
pub async fn retry<T, F, Fut>(policy: &RetryPolicy, operation: &str, mut op: F) -> Result<T, StoreError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, StoreError>>,
{
    let mut attempt = 0;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_transient() && attempt < policy.max_retries => {
                let delay = policy.delay_for(attempt);
                attempt += 1;
                metrics::counter!("folio_store_retries_total", "operation" => operation.to_string())
                    .increment(1);
                warn!(
                    operation,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "Store operation failed, retrying"
                );
                tokio::time::sleep(delay).await;
            },
            Err(e) => return Err(e),
        }
    }
}

/// A store wrapper that retries transient failures and tracks the
/// connection state.
///
/// Pushes are not retried: the store mints the key, so a retry after a
/// lost acknowledgement could append twice.
#[derive(Debug)]
pub struct RetryingStore<S> {
    inner: S,
    policy: RetryPolicy,
    state: Arc<ConnectionState>,
}

impl<S: RemoteStore> RetryingStore<S> {
    /// Wraps `inner` with the given policy.
    pub fn new(inner: S, policy: RetryPolicy) -> Self {
        Self {
            inner,
            policy,
            state: Arc::new(ConnectionState::new()),
        }
    }

    /// Returns the shared connection state.
    pub fn state(&self) -> Arc<ConnectionState> {
        Arc::clone(&self.state)
    }

    /// Returns the retry policy.
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Returns the wrapped store.
    pub fn inner(&self) -> &S {
        &self.inner
    }

    fn track<T>(&self, result: Result<T, StoreError>) -> Result<T, StoreError> {
        match &result {
            Ok(_) => self.state.record_success(),
            Err(e) if e.is_transient() => self.state.record_failure(e.to_string()),
            Err(_) => {},
        }
        result
    }
}

#[async_trait]
impl<S: RemoteStore> RemoteStore for RetryingStore<S> {
    async fn read(&self, path: &StorePath) -> Result<Option<Value>, StoreError> {
        let result = retry(&self.policy, "read", || self.inner.read(path)).await;
        self.track(result)
    }

    async fn write(&self, path: &StorePath, value: Value) -> Result<(), StoreError> {
        let result = retry(&self.policy, "write", || self.inner.write(path, value.clone())).await;
        self.track(result)
    }

    async fn push(&self, path: &StorePath, value: Value) -> Result<String, StoreError> {
        let result = self.inner.push(path, value).await;
        self.track(result)
    }

    async fn remove(&self, path: &StorePath) -> Result<(), StoreError> {
        let result = retry(&self.policy, "remove", || self.inner.remove(path)).await;
        self.track(result)
    }

    fn watch(&self, path: &StorePath) -> ChangeFeed {
        debug!(path = %path, "Opening change feed");
        self.inner.watch(path)
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        let result = self.inner.health_check().await;
        self.track(result)
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}
