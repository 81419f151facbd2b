//! Store configuration
//!
//! ```toml
//! prefix = "sf_profiler_"
//! lifetime_secs = 86400
//! ```
//!
//! Every field is optional; missing fields take their defaults. A lifetime
//! of zero means stored profiles never expire.

use profiler_core::{Error, KeyNamer, Result, DEFAULT_PREFIX};
use serde::Deserialize;
use std::time::Duration;

/// Default profile lifetime: one day
pub const DEFAULT_LIFETIME_SECS: u64 = 86_400;

/// Settings for a [`ProfileStore`](crate::ProfileStore)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreConfig {
    /// Namespace prefix for every backend key
    pub prefix: String,
    /// Expiration passed to every store and append, in seconds
    pub lifetime_secs: u64,
}

impl StoreConfig {
    /// Parse a TOML document
    pub fn from_toml_str(source: &str) -> Result<Self> {
        toml::from_str(source).map_err(|e| Error::InvalidConfig(e.to_string()))
    }

    /// Expiration as a duration
    pub fn lifetime(&self) -> Duration {
        Duration::from_secs(self.lifetime_secs)
    }

    /// Check that every key this config produces can be valid
    pub fn validate(&self) -> Result<()> {
        if self.prefix.is_empty() {
            return Err(Error::InvalidConfig("prefix must not be empty".to_string()));
        }
        KeyNamer::new(self.prefix.clone())
            .index_key()
            .map_err(|e| Error::InvalidConfig(e.to_string()))?;
        Ok(())
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_PREFIX.to_string(),
            lifetime_secs: DEFAULT_LIFETIME_SECS,
        }
    }
}
