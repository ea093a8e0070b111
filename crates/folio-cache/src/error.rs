//! Error types for the cache layer.

use std::sync::Arc;

use folio_store::StoreError;
use thiserror::Error;

/// Failure of a deduplicated request.
///
/// Every caller that joined the request receives the same `Arc`'d error.
/// Failures are never cached.
#[derive(Debug, Error)]
pub enum DedupError<E> {
    /// The producer failed.
    #[error(transparent)]
    Failed(Arc<E>),

    /// The producer stopped without settling (it panicked or its runtime
    /// shut down).
    #[error("request for '{key}' was abandoned before completing")]
    Abandoned { key: String },
}

impl<E> DedupError<E> {
    /// Returns the producer's error, if it produced one.
    pub fn source_error(&self) -> Option<&E> {
        match self {
            Self::Failed(e) => Some(e),
            Self::Abandoned { .. } => None,
        }
    }

    /// Returns true if the producer stopped without settling.
    pub fn is_abandoned(&self) -> bool {
        matches!(self, Self::Abandoned { .. })
    }
}

impl<E> Clone for DedupError<E> {
    fn clone(&self) -> Self {
        match self {
            Self::Failed(e) => Self::Failed(Arc::clone(e)),
            Self::Abandoned { key } => Self::Abandoned { key: key.clone() },
        }
    }
}

/// Error of a cached store read.
pub type CacheError = DedupError<StoreError>;

impl DedupError<StoreError> {
    /// Returns true if retrying the read later may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Failed(e) => e.is_transient(),
            Self::Abandoned { .. } => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_is_transparent() {
        let err: CacheError = DedupError::Failed(Arc::new(StoreError::unavailable("offline")));
        assert_eq!(err.to_string(), "store unavailable: offline");
        assert!(err.is_transient());
        assert!(err.source_error().is_some());
    }

    #[test]
    fn test_clone_shares_error() {
        let err: CacheError = DedupError::Failed(Arc::new(StoreError::Closed));
        let copy = err.clone();
        match (&err, &copy) {
            (DedupError::Failed(a), DedupError::Failed(b)) => assert!(Arc::ptr_eq(a, b)),
            _ => panic!("Expected Failed"),
        }
    }

    #[test]
    fn test_abandoned() {
        let err: CacheError = DedupError::Abandoned { key: "store_website".into() };
        assert!(err.is_abandoned());
        assert!(err.to_string().contains("store_website"));
        assert!(err.source_error().is_none());
    }
}
