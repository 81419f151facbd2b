//! Error types for the profiler core
//!
//! Only conditions that must stop an operation are errors. Cache misses and
//! backend failures are ordinary results (`None`, `false`, empty lists) and
//! never reach this type.

use thiserror::Error;

/// Core error type
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A derived backend key exceeds the backend's size limit
    ///
    /// Deterministic for a given token, so retrying never helps.
    #[error("key '{key}' is {length} bytes, exceeding the {max} byte limit")]
    Configuration {
        /// The offending key
        key: String,
        /// Its length in bytes
        length: usize,
        /// The limit it exceeded
        max: usize,
    },

    /// A token cannot be stored under its own key
    ///
    /// The token collides with the index key or carries a separator that
    /// the index line would rewrite.
    #[error("invalid token '{token}': {reason}")]
    InvalidToken {
        /// The rejected token
        token: String,
        /// Why it was rejected
        reason: &'static str,
    },

    /// Stored parent/child links form a cycle
    #[error("cyclic profile data detected at token '{token}'")]
    CyclicData {
        /// The token that was reached twice on one resolution path
        token: String,
    },

    /// A record could not be serialized
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Store configuration is invalid
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for core operations
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Check if this is a key size violation
    pub fn is_configuration(&self) -> bool {
        matches!(self, Error::Configuration { .. })
    }

    /// Check if this is a rejected token
    pub fn is_invalid_token(&self) -> bool {
        matches!(self, Error::InvalidToken { .. })
    }

    /// Check if this is a cyclic data error
    pub fn is_cyclic(&self) -> bool {
        matches!(self, Error::CyclicData { .. })
    }
}
