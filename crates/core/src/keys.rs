//! Backend key naming
//!
//! Every key is `<prefix><token>`; the shared index lives at
//! `<prefix>index`. Cache servers reject keys over 250 bytes outright, so
//! oversized keys fail here with [`Error::Configuration`] and are never
//! truncated.
//!
//! Tokens are checked before a key is built: the token `index` would land
//! on the index key itself, and tab, CR or LF would be rewritten in the
//! index line so the listed token no longer names the stored record. Both
//! fail with [`Error::InvalidToken`].

use crate::error::{Error, Result};

/// Default namespace prefix
pub const DEFAULT_PREFIX: &str = "sf_profiler_";

/// Suffix of the index key
pub const INDEX_SUFFIX: &str = "index";

/// Maximum key length in bytes accepted by cache backends
pub const MAX_KEY_LENGTH: usize = 250;

/// Derives and validates backend keys
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyNamer {
    prefix: String,
}

impl KeyNamer {
    /// Create a namer for the given prefix
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// The namespace prefix
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Key of the record stored for `token`
    pub fn item_key(&self, token: &str) -> Result<String> {
        check_token(token)?;
        Self::validate(format!("{}{}", self.prefix, token))
    }

    /// Key of the shared index log
    pub fn index_key(&self) -> Result<String> {
        Self::validate(format!("{}{}", self.prefix, INDEX_SUFFIX))
    }

    fn validate(key: String) -> Result<String> {
        let length = key.len();
        if length > MAX_KEY_LENGTH {
            return Err(Error::Configuration {
                key,
                length,
                max: MAX_KEY_LENGTH,
            });
        }
        Ok(key)
    }
}

fn check_token(token: &str) -> Result<()> {
    let reason = if token == INDEX_SUFFIX {
        "reserved for the index"
    } else if token.contains(['\t', '\r', '\n']) {
        "contains a field or line separator"
    } else {
        return Ok(());
    };
    Err(Error::InvalidToken {
        token: token.to_string(),
        reason,
    })
}

impl Default for KeyNamer {
    fn default() -> Self {
        Self::new(DEFAULT_PREFIX)
    }
}
