//! Metrics module for the Folio server.

pub mod http;
pub mod setup;

pub use setup::{MetricsError, build_metrics, init_metrics, register_all_metrics};
