//! Cart error types.
//!
//! Only [`CartError::ContextUnavailable`] and [`CartError::InvalidProduct`] are
//! ever returned to callers of cart operations. The persistence variants are
//! produced internally, logged, and recovered from.

use go_marketplace_core::{ProductError, SnapshotError};
use thiserror::Error;

/// Errors from a [`KeyValueStore`](crate::storage::KeyValueStore) backend.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem operation failed.
    #[error("I/O error for key {key}: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    /// The snapshot could not be encoded for storage.
    #[error("Failed to encode value: {0}")]
    Encode(#[from] serde_json::Error),

    /// The backend refused the operation.
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// Cart-level error type.
#[derive(Debug, Error)]
pub enum CartError {
    /// The cart was requested outside of a provider scope.
    #[error("use_cart must be called within a cart provider scope")]
    ContextUnavailable,

    /// Product input failed validation.
    #[error("Invalid product: {0}")]
    InvalidProduct(#[from] ProductError),

    /// Stored cart could not be read or decoded.
    #[error("Failed to read persisted cart: {0}")]
    PersistenceReadFailure(String),

    /// Cart could not be written to storage.
    #[error("Failed to persist cart: {0}")]
    PersistenceWriteFailure(#[from] StorageError),
}

impl From<serde_json::Error> for CartError {
    fn from(err: serde_json::Error) -> Self {
        Self::PersistenceReadFailure(err.to_string())
    }
}

impl From<SnapshotError> for CartError {
    fn from(err: SnapshotError) -> Self {
        Self::PersistenceReadFailure(err.to_string())
    }
}

/// Result type alias for `CartError`.
pub type Result<T> = std::result::Result<T, CartError>;
