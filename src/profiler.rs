//! Main entry point for the profiler store.
//!
//! This module provides the `Profiler` struct, the primary entry point for
//! storing and querying request profiles.

use crate::error::{Error, Result};
use profiler_core::{FindQuery, Profile, ProfileSummary};
use profiler_engine::{ProfileStore, ProfileTree, StoreConfig};
use profiler_storage::{CacheBackend, MemoryBackend};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// The profiler store.
///
/// Create one with [`Profiler::builder`] over your cache backend, or with
/// [`Profiler::ephemeral`] for an in-process cache.
///
/// # Example
///
/// ```
/// use profiler_store::prelude::*;
///
/// let profiler = Profiler::ephemeral()?;
///
/// let profile = Profile::new("a1b2c3")
///     .with_ip("10.0.0.1")
///     .with_method("GET")
///     .with_url("/checkout");
/// assert!(profiler.write(&profile)?);
///
/// let listed = profiler.find("10.0.0.1", "", 10, "")?;
/// assert_eq!(listed[0].token, "a1b2c3");
///
/// let tree = profiler.read("a1b2c3")?.expect("profile was just written");
/// assert_eq!(tree.root_profile().url, "/checkout");
/// # Ok::<(), profiler_store::Error>(())
/// ```
#[derive(Clone)]
pub struct Profiler {
    store: ProfileStore,
}

impl Profiler {
    /// Create a builder for profiler configuration.
    pub fn builder() -> ProfilerBuilder {
        ProfilerBuilder::new()
    }

    /// Open a profiler over a fresh in-memory cache with default settings.
    ///
    /// All data is lost when the profiler is dropped.
    pub fn ephemeral() -> Result<Self> {
        Self::builder().open()
    }

    /// Store a profile and add it to the index.
    ///
    /// Returns `false` if the backend rejected the write.
    pub fn write(&self, profile: &Profile) -> Result<bool> {
        Ok(self.store.write(profile)?)
    }

    /// Read a profile with its parent chain and children.
    ///
    /// Returns `None` if the token is empty or nothing is stored under it.
    pub fn read(&self, token: &str) -> Result<Option<ProfileTree>> {
        Ok(self.store.read(token)?)
    }

    /// List indexed profiles by ip, url and method substrings.
    pub fn find(
        &self,
        ip: &str,
        url: &str,
        limit: usize,
        method: &str,
    ) -> Result<Vec<ProfileSummary>> {
        Ok(self.store.find(ip, url, limit, method)?)
    }

    /// List indexed profiles matching a query, including time bounds.
    pub fn find_with(&self, query: &FindQuery) -> Result<Vec<ProfileSummary>> {
        Ok(self.store.find_with(query)?)
    }

    /// Remove all stored profiles.
    ///
    /// Scoped to this store's prefix when the backend supports it,
    /// otherwise a full backend flush.
    pub fn purge(&self) -> Result<bool> {
        Ok(self.store.purge()?)
    }

    /// Rewrite the index with one line per token.
    ///
    /// Returns the number of lines removed, or `None` if the backend failed.
    pub fn compact_index(&self) -> Result<Option<usize>> {
        Ok(self.store.compact_index()?)
    }

    /// Get the underlying storage engine.
    pub fn store(&self) -> &ProfileStore {
        &self.store
    }
}

/// Builder for profiler configuration.
///
/// Settings are applied in order: defaults, then the config file (if any),
/// then explicit setter calls.
///
/// # Example
///
/// ```ignore
/// let profiler = Profiler::builder()
///     .config_file("profiler.toml")
///     .lifetime(Duration::from_secs(3600))
///     .backend(Arc::new(my_memcached_backend))
///     .open()?;
/// ```
#[derive(Default)]
pub struct ProfilerBuilder {
    config: Option<StoreConfig>,
    config_file: Option<PathBuf>,
    prefix: Option<String>,
    lifetime: Option<Duration>,
    backend: Option<Arc<dyn CacheBackend>>,
}

impl ProfilerBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an explicit configuration instead of the defaults.
    pub fn config(mut self, config: StoreConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Load settings from a TOML file when opening.
    pub fn config_file(mut self, path: impl AsRef<Path>) -> Self {
        self.config_file = Some(path.as_ref().to_path_buf());
        self
    }

    /// Set the key prefix.
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Set the profile lifetime.
    ///
    /// Backends expire in whole seconds, so a fractional lifetime is
    /// rounded up: 200ms becomes one second rather than zero, which would
    /// never expire. `Duration::ZERO` itself never expires.
    pub fn lifetime(mut self, lifetime: Duration) -> Self {
        self.lifetime = Some(lifetime);
        self
    }

    /// Use the given cache backend.
    ///
    /// Defaults to a fresh [`MemoryBackend`].
    pub fn backend(mut self, backend: Arc<dyn CacheBackend>) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Open the profiler.
    pub fn open(self) -> Result<Profiler> {
        let mut config = match &self.config_file {
            Some(path) => {
                let source = std::fs::read_to_string(path)?;
                StoreConfig::from_toml_str(&source).map_err(Error::from)?
            }
            None => self.config.unwrap_or_default(),
        };
        if let Some(prefix) = self.prefix {
            config.prefix = prefix;
        }
        if let Some(lifetime) = self.lifetime {
            config.lifetime_secs = whole_seconds(lifetime);
        }

        let backend: Arc<dyn CacheBackend> = match self.backend {
            Some(backend) => backend,
            None => Arc::new(MemoryBackend::new()),
        };
        debug!(backend = backend.name(), prefix = %config.prefix, lifetime_secs = config.lifetime_secs, "opening profiler");

        let store = ProfileStore::new(backend, &config)?;
        Ok(Profiler { store })
    }
}

fn whole_seconds(lifetime: Duration) -> u64 {
    let secs = lifetime.as_secs();
    if lifetime.subsec_nanos() > 0 {
        secs.saturating_add(1)
    } else {
        secs
    }
}
