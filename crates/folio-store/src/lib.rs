//! # Folio Store
//!
//! Remote document store abstraction for the Folio content layer.
//!
//! The hosted real-time store is reached through the `RemoteStore` trait:
//! path-addressed JSON reads and writes plus change feeds. This crate also
//! provides an in-memory implementation, a retrying decorator with
//! connection state, a background health monitor and seed loading.
//!
//! ## Example
//!
//! ```ignore
//! use folio_store::{MemoryStore, RemoteStore, RetryPolicy, RetryingStore};
//!
//! let store = RetryingStore::new(MemoryStore::new("memory"), RetryPolicy::default());
//! let mut feed = store.watch(&"website/services".parse()?);
//! while let Some(snapshot) = feed.recv().await {
//!     println!("services changed: {:?}", snapshot?);
//! }
//! ```

pub mod error;
pub mod feed;
pub mod memory;
pub mod monitor;
pub mod retry;
pub mod seed;
pub mod state;
pub mod store;

// Re-exports
pub use error::StoreError;
pub use feed::{ChangeFeed, FeedSender, Snapshot};
pub use memory::{MemoryStore, OperationCounts, SimulatedFailure};
pub use monitor::{HealthMonitor, MonitorConfig, MonitorHandle};
pub use retry::{RetryPolicy, RetryingStore, retry};
pub use seed::{SeedFormat, load_seed, seed_if_empty};
pub use state::{ConnectionReport, ConnectionState};
pub use store::RemoteStore;

// Re-export folio_core for consumers
pub use folio_core;
