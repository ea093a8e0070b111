//! Error types for document stores.

use std::path::PathBuf;

use folio_core::FolioError;

/// Errors that can occur when talking to a document store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The store cannot be reached.
    #[error("store unavailable: {reason}")]
    Unavailable { reason: String },

    /// The operation did not complete in time.
    #[error("operation timed out after {millis}ms")]
    Timeout { millis: u64 },

    /// The store's rules rejected the operation.
    #[error("permission denied at '{path}'")]
    PermissionDenied { path: String },

    /// The path cannot address a document.
    #[error("invalid path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    /// A value could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A seed file could not be parsed.
    #[error("parse error in {path}: {reason}")]
    Parse { path: PathBuf, reason: String },

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The store or feed has been shut down.
    #[error("store closed")]
    Closed,
}

impl StoreError {
    /// Creates a new unavailable error.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable {
            reason: reason.into(),
        }
    }

    /// Creates a new permission error.
    pub fn permission_denied(path: impl Into<String>) -> Self {
        Self::PermissionDenied { path: path.into() }
    }

    /// Creates a new invalid path error.
    pub fn invalid_path(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidPath {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Creates a new parse error.
    pub fn parse(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Returns true if this is a transient error that might succeed on retry.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Unavailable { .. } | Self::Timeout { .. })
    }
}

impl From<FolioError> for StoreError {
    fn from(err: FolioError) -> Self {
        match err {
            FolioError::InvalidPath { path, reason } => Self::InvalidPath { path, reason },
            other => Self::unavailable(other.to_string()),
        }
    }
}
