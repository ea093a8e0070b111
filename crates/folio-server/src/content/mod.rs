//! Typed access to the site's content.
//!
//! `ContentService` sits on the data façade: reads go through the cache,
//! live views through throttled subscriptions, and every admin write is
//! checked against the allowlist and validated before the store is
//! touched.

mod catalog;
mod collection;
mod inbox;
mod live;
mod website;

pub use collection::Collection;
pub use inbox::InboxFeed;
pub use live::LiveFeed;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use folio_cache::{CacheError, DataFacade, ReadOptions, SubscribeOptions};
use folio_core::{AdminPolicy, FolioError, Principal, StorePath};
use folio_store::StoreError;
use parking_lot::Mutex;
use serde_json::Value;
use thiserror::Error;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Root of the site document.
pub const WEBSITE_ROOT: &str = "website";

/// Error of a content operation, labelled with what was attempted.
#[derive(Debug, Error)]
pub enum ContentError {
    /// Reading through the façade failed.
    #[error("failed to {action}: {source}")]
    Fetch {
        action: String,
        #[source]
        source: CacheError,
    },

    /// Writing to the store failed.
    #[error("failed to {action}: {source}")]
    Write {
        action: String,
        #[source]
        source: StoreError,
    },

    /// Validation, authorization, lookup or decoding failed.
    #[error(transparent)]
    Domain(#[from] FolioError),
}

impl ContentError {
    pub(crate) fn fetch(action: impl Into<String>, source: CacheError) -> Self {
        Self::Fetch {
            action: action.into(),
            source,
        }
    }

    pub(crate) fn write(action: impl Into<String>, source: StoreError) -> Self {
        Self::Write {
            action: action.into(),
            source,
        }
    }

    /// Returns true if retrying later may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Fetch { source, .. } => source.is_transient(),
            Self::Write { source, .. } => source.is_transient(),
            Self::Domain(_) => false,
        }
    }

    pub fn is_forbidden(&self) -> bool {
        matches!(self, Self::Domain(e) if e.is_forbidden())
    }

    pub fn is_unauthenticated(&self) -> bool {
        matches!(self, Self::Domain(e) if e.is_unauthenticated())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Domain(e) if e.is_not_found())
    }

    pub fn is_validation_error(&self) -> bool {
        matches!(self, Self::Domain(e) if e.is_validation_error())
    }
}

pub type ContentResult<T> = Result<T, ContentError>;

/// How live views are paced.
#[derive(Debug, Clone, Copy, Default)]
pub struct LiveSettings {
    /// Minimum spacing between deliveries; `None` uses the façade default.
    pub throttle: Option<Duration>,
    /// Deliver the last suppressed value when a window closes.
    pub trailing: bool,
}

/// Domain accessors over a shared `DataFacade`.
#[derive(Clone)]
pub struct ContentService {
    facade: DataFacade,
    policy: Arc<AdminPolicy>,
    live: LiveSettings,
    /// Serializa read-modify-write por path dentro del proceso
    write_locks: Arc<Mutex<HashMap<String, Arc<AsyncMutex<()>>>>>,
}

impl std::fmt::Debug for ContentService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentService")
            .field("facade", &self.facade)
            .field("admins", &self.policy.len())
            .field("live", &self.live)
            .finish()
    }
}

impl ContentService {
    pub fn new(facade: DataFacade, policy: AdminPolicy) -> Self {
        Self {
            facade,
            policy: Arc::new(policy),
            live: LiveSettings::default(),
            write_locks: Arc::default(),
        }
    }

    pub fn with_live_settings(mut self, live: LiveSettings) -> Self {
        self.live = live;
        self
    }

    pub fn facade(&self) -> &DataFacade {
        &self.facade
    }

    pub fn policy(&self) -> &AdminPolicy {
        &self.policy
    }

    /// Fails unless the principal is present and an administrator.
    pub fn authorize<'a>(&self, principal: Option<&'a Principal>) -> ContentResult<&'a Principal> {
        Ok(self.policy.authorize(principal)?)
    }

    pub(crate) fn subscribe_options(&self, fallback: Value) -> SubscribeOptions {
        let mut options = SubscribeOptions::default().with_fallback(fallback);
        if let Some(throttle) = self.live.throttle {
            options = options.with_throttle(throttle);
        }
        if self.live.trailing {
            options = options.with_trailing();
        }
        options
    }

    /// Reads `path` through the cache, labelling failures with `action`.
    pub(crate) async fn read(
        &self,
        path: &StorePath,
        options: ReadOptions,
        action: &str,
    ) -> ContentResult<Arc<Value>> {
        self.facade
            .get_once(path, options)
            .await
            .map_err(|e| ContentError::fetch(action, e))
    }

    /// Waits for exclusive write access to `path`.
    ///
    /// Other writers to the same path in this process wait until the guard
    /// is dropped. Writers from other processes still race.
    pub(crate) async fn lock_writes(&self, path: &StorePath) -> OwnedMutexGuard<()> {
        let lock = Arc::clone(
            self.write_locks
                .lock()
                .entry(path.as_str().to_string())
                .or_default(),
        );
        lock.lock_owned().await
    }

    pub(crate) async fn write(
        &self,
        path: &StorePath,
        value: Value,
        action: &str,
    ) -> ContentResult<()> {
        self.facade
            .write(path, value)
            .await
            .map_err(|e| ContentError::write(action, e))
    }
}

pub(crate) fn website_path(section: &str) -> ContentResult<StorePath> {
    Ok(StorePath::parse(WEBSITE_ROOT)?.child(section)?)
}

pub(crate) fn to_document<T: serde::Serialize>(value: &T, action: &str) -> ContentResult<Value> {
    serde_json::to_value(value).map_err(|e| ContentError::write(action, StoreError::from(e)))
}
