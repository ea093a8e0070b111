//! Folio Core - Domain types and rules
//!
//! This crate provides the foundational types for the Folio content layer:
//! the records shown on the agency site, validated store paths, display
//! ordering, slugs, form validation and the admin allowlist.

pub mod auth;
pub mod error;
pub mod model;
pub mod ordering;
pub mod path;
pub mod record;
pub mod slug;
pub mod types;
pub mod validation;

pub use auth::{AdminPolicy, Principal};
pub use error::{FolioError, Result};
pub use model::*;
pub use ordering::OrderStatistics;
pub use path::StorePath;
pub use record::{Orderable, Record};
pub use types::{EntityId, InquiryStatus, MemberStatus, Millis, PublishStatus, now_millis};

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_defined() {
        assert!(!version().is_empty());
    }

    #[test]
    fn version_is_semver() {
        let v = version();
        assert_eq!(v.split('.').count(), 3, "Version should be semver");
    }
}
