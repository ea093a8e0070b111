//! # Folio Cache
//!
//! Caching and live-data layer between the Folio content API and the
//! remote document store.
//!
//! - [`CacheStore`]: keyed TTL cache where concurrent misses share one
//!   producer and every caller receives the same `Arc`.
//! - [`DataFacade`]: cached one-shot reads, throttled subscriptions,
//!   writes that invalidate related reads, batches and preloading.
//!
//! ## Example
//!
//! ```ignore
//! use folio_cache::{DataFacade, ReadOptions, SubscribeOptions};
//! use folio_store::MemoryStore;
//!
//! let facade = DataFacade::with_store(Arc::new(MemoryStore::new("memory")));
//! let website = "website".parse()?;
//!
//! let snapshot = facade.get_once(&website, ReadOptions::default()).await?;
//! let mut live = facade.subscribe(&website, SubscribeOptions::default());
//! while let Some(value) = live.recv().await {
//!     println!("website changed: {value}");
//! }
//! ```

pub mod error;
pub mod facade;
pub mod invalidation;
pub mod keys;
pub mod metrics;
pub mod store;
pub mod subscription;
pub mod throttle;

// Re-exports
pub use error::{CacheError, DedupError};
pub use facade::{
    DataFacade, FacadeConfig, PreloadFailure, PreloadReport, ReadOptions, SubscribeOptions,
};
pub use invalidation::InvalidationResult;
pub use keys::{key_for, store_key};
pub use metrics::{CacheMetrics, register_cache_metrics};
pub use store::{CacheStats, CacheStore, DEFAULT_TTL, EntryState};
pub use subscription::{Subscription, SubscriptionHandle, SubscriptionInfo};
pub use throttle::{DEFAULT_THROTTLE, ThrottleState};
