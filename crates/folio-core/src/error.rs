//! Error types for Folio.
//!
//! This module defines the domain-level error hierarchy shared by
//! the store, cache and server crates. All errors implement the standard
//! `std::error::Error` trait via `thiserror`.
//!
//! # Example
//!
//! ```
//! use folio_core::{FolioError, Result};
//!
//! fn title_of(raw: &str) -> Result<String> {
//!     if raw.trim().is_empty() {
//!         return Err(FolioError::validation_error("title", "Title is required"));
//!     }
//!     Ok(raw.trim().to_string())
//! }
//!
//! assert!(title_of("  ").unwrap_err().is_validation_error());
//! ```

use thiserror::Error;

/// Main error type for domain operations.
#[derive(Debug, Error)]
pub enum FolioError {
    /// A field failed validation before any store access.
    #[error("Validation error for field '{field}': {message}")]
    ValidationError {
        /// Field that failed validation
        field: String,
        /// Description of the validation failure
        message: String,
    },

    /// A record was not found in its collection.
    #[error("{entity} '{id}' not found")]
    NotFound {
        /// Entity label ("course", "project", ...)
        entity: String,
        /// Identifier that was requested
        id: String,
    },

    /// No principal was presented for an operation that needs one.
    #[error("Authentication required")]
    Unauthenticated,

    /// The principal is not allowed to perform the operation.
    #[error("Access denied for '{principal}': {reason}")]
    Forbidden {
        /// Email or uid of the caller
        principal: String,
        /// Why access was denied
        reason: String,
    },

    /// A store path is malformed.
    #[error("Invalid path '{path}': {reason}")]
    InvalidPath {
        /// The offending path
        path: String,
        /// Why it's invalid
        reason: String,
    },

    /// A stored document could not be decoded into its record type.
    #[error("Failed to decode '{path}': {message}")]
    DecodeError {
        /// Path of the document
        path: String,
        /// Description of the decode failure
        message: String,
        /// Underlying error
        #[source]
        cause: Option<serde_json::Error>,
    },

    /// Generic internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl FolioError {
    /// Creates a ValidationError.
    pub fn validation_error(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ValidationError {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Creates a NotFound error.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Creates a Forbidden error.
    pub fn forbidden(principal: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Forbidden {
            principal: principal.into(),
            reason: reason.into(),
        }
    }

    /// Creates an InvalidPath error.
    pub fn invalid_path(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidPath {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Creates a DecodeError from a serde failure.
    pub fn decode_error(path: impl Into<String>, cause: serde_json::Error) -> Self {
        Self::DecodeError {
            path: path.into(),
            message: cause.to_string(),
            cause: Some(cause),
        }
    }

    /// Creates an Internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Returns true if this is a validation error.
    pub fn is_validation_error(&self) -> bool {
        matches!(self, Self::ValidationError { .. })
    }

    /// Returns true if the record was not found.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns true if access was denied.
    pub fn is_forbidden(&self) -> bool {
        matches!(self, Self::Forbidden { .. })
    }

    /// Returns true if the caller did not identify itself.
    pub fn is_unauthenticated(&self) -> bool {
        matches!(self, Self::Unauthenticated)
    }
}

/// Type alias for Results with FolioError.
pub type Result<T> = std::result::Result<T, FolioError>;
