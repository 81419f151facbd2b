//! Unified error types for the profiler store.
//!
//! This module provides a clean error type that wraps internal errors
//! and presents a consistent interface to users.

use thiserror::Error;

/// All profiler store errors.
///
/// Misses and backend failures are not errors; they surface as `None`,
/// `false` or empty lists. What remains here stops an operation outright.
#[derive(Debug, Error)]
pub enum Error {
    /// A backend key would exceed the backend's size limit
    #[error("key too long: '{key}' is {length} bytes (max {max})")]
    Configuration {
        /// The offending key
        key: String,
        /// Its length in bytes
        length: usize,
        /// The limit
        max: usize,
    },

    /// The token collides with the index key or carries a separator
    #[error("invalid token '{token}': {reason}")]
    InvalidToken {
        /// The rejected token
        token: String,
        /// Why it was rejected
        reason: &'static str,
    },

    /// Stored parent/child links form a cycle
    #[error("cyclic profile data at token '{0}'")]
    CyclicData(String),

    /// A record could not be serialized
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Invalid store configuration
    #[error("invalid configuration: {0}")]
    Config(String),

    /// I/O error while loading configuration
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for profiler store operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Check if this error is retryable.
    ///
    /// Nothing the store reports changes on retry: key sizes and stored
    /// links are deterministic, and transient backend failures are not
    /// errors.
    pub fn is_retryable(&self) -> bool {
        false
    }

    /// Check if this is a key size violation.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Error::Configuration { .. })
    }

    /// Check if this is a rejected token.
    pub fn is_invalid_token(&self) -> bool {
        matches!(self, Error::InvalidToken { .. })
    }

    /// Check if this is a cyclic data error.
    pub fn is_cyclic(&self) -> bool {
        matches!(self, Error::CyclicData(_))
    }
}

// Convert from internal core errors
impl From<profiler_core::Error> for Error {
    fn from(e: profiler_core::Error) -> Self {
        use profiler_core::Error as CoreError;
        match e {
            CoreError::Configuration { key, length, max } => {
                Error::Configuration { key, length, max }
            }
            CoreError::InvalidToken { token, reason } => Error::InvalidToken { token, reason },
            CoreError::CyclicData { token } => Error::CyclicData(token),
            CoreError::Serialization(msg) => Error::Serialization(msg),
            CoreError::InvalidConfig(msg) => Error::Config(msg),
        }
    }
}
