//! The cache backend capability
//!
//! The store talks to its cache exclusively through [`CacheBackend`].
//! Concrete implementations own their client handle and transport; the
//! store only holds the trait object.
//!
//! ## Contract
//!
//! | Operation | Miss | Failure |
//! |-----------|------|---------|
//! | `get` | `Ok(None)` | `Err(_)` |
//! | `set` | n/a | `Err(_)` |
//! | `append` | creates the key | `Err(_)` |
//! | `flush` | n/a | `Err(_)` |
//! | `delete_prefix` | `Ok(0)` | `Err(Unsupported)` when not available |
//!
//! A `lifetime` of zero means the entry never expires. `append` must be
//! atomic with respect to other appends on the same key.

use std::time::Duration;
use thiserror::Error;

/// Failures reported by a cache backend
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    /// Key exceeds the backend's size limit
    #[error("key of {length} bytes exceeds the backend limit of {max}")]
    KeyTooLong {
        /// Key length in bytes
        length: usize,
        /// Backend limit in bytes
        max: usize,
    },

    /// The backend does not provide this operation
    #[error("operation not supported by backend: {0}")]
    Unsupported(&'static str),

    /// The backend could not be reached
    #[error("backend unavailable: {0}")]
    Unavailable(String),

    /// The backend refused a write
    #[error("write rejected: {0}")]
    WriteRejected(String),
}

/// Result type for backend operations
pub type BackendResult<T> = std::result::Result<T, BackendError>;

/// Key-value cache with expiration
pub trait CacheBackend: Send + Sync {
    /// Short backend name for logs
    fn name(&self) -> &'static str;

    /// Fetch the value stored at `key`
    fn get(&self, key: &str) -> BackendResult<Option<Vec<u8>>>;

    /// Store `value` at `key`, replacing any previous value
    fn set(&self, key: &str, value: &[u8], lifetime: Duration) -> BackendResult<()>;

    /// Append `value` to the value at `key`, creating it when missing
    ///
    /// Resets the key's expiration to `lifetime`.
    fn append(&self, key: &str, value: &[u8], lifetime: Duration) -> BackendResult<()>;

    /// Remove every key visible to this backend
    fn flush(&self) -> BackendResult<()>;

    /// Remove every key starting with `prefix`, returning how many were removed
    ///
    /// Backends without key enumeration keep the default, which reports
    /// [`BackendError::Unsupported`].
    fn delete_prefix(&self, _prefix: &str) -> BackendResult<usize> {
        Err(BackendError::Unsupported("delete_prefix"))
    }
}
