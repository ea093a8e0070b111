//! Folio Server - HTTP content API for the agency website
//!
//! Serves cached public reads, form submissions, admin writes gated by an
//! email allowlist, server-sent live feeds, cache invalidation, health and
//! Prometheus metrics on top of `folio-cache`'s data façade.

pub mod content;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod server;
pub mod settings;
pub mod state;

pub use content::{ContentError, ContentService, LiveSettings};
pub use error::AppError;
pub use server::{create_router, create_router_with_metrics, run_server_with_state, shutdown_signal};
pub use settings::{Settings, SettingsError};
pub use state::AppState;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
