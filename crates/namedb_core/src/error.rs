//! Error types for core operations.
//!
//! Absence ("not found", "exhausted") is modeled as `Option`, never as an
//! error. Invariant breaches (history push with a decreasing height, pop of
//! a non-matching top) are fatal and panic instead of surfacing here; they
//! indicate corrupted state that must never occur under correct operation.

use namedb_store::StoreError;
use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Store error.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// A serialized record or history is corrupted.
    #[error("corrupted data: {message}")]
    Corrupted {
        /// Description of the corruption.
        message: String,
    },

    /// A value exceeds the limits of the record encoding.
    #[error("encoding limit exceeded: {message}")]
    EncodingLimit {
        /// Description of the oversized field.
        message: String,
    },
}

impl CoreError {
    /// Creates a corrupted-data error.
    pub fn corrupted(message: impl Into<String>) -> Self {
        Self::Corrupted {
            message: message.into(),
        }
    }

    /// Creates an encoding-limit error.
    pub fn encoding_limit(message: impl Into<String>) -> Self {
        Self::EncodingLimit {
            message: message.into(),
        }
    }
}
