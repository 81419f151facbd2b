//! ProfileStore: the storage engine facade
//!
//! ## Design: STATELESS FACADE
//!
//! ProfileStore holds the backend handle, the key namer and the lifetime.
//! No caches and no locks; every operation goes straight to the backend.
//!
//! ## Failure model
//!
//! | Condition | Result |
//! |-----------|--------|
//! | Key over the size limit | `Err(Error::Configuration)` before any backend call |
//! | Token `index` or containing tab/CR/LF | `Err(Error::InvalidToken)` before any backend call |
//! | Cyclic parent/child data | `Err(Error::CyclicData)` |
//! | Cache miss | `Ok(None)` / empty list |
//! | Backend failure | `Ok(false)` / `Ok(None)` / empty list, logged at warn |
//!
//! ## Write path
//!
//! `set` the record, then `append` the index line. The two calls are not
//! atomic: if the process stops in between, the record is readable by
//! token but invisible to `find`.

use crate::config::StoreConfig;
use crate::index_log::IndexLog;
use crate::tree::{ProfileTree, TreeBuilder};
use profiler_core::{
    FindQuery, IndexLine, KeyNamer, Profile, ProfileRecord, ProfileSummary, Result,
};
use profiler_storage::{BackendError, CacheBackend};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Profile storage over a cache backend
///
/// # Example
///
/// ```
/// use profiler_core::Profile;
/// use profiler_engine::{ProfileStore, StoreConfig};
/// use profiler_storage::MemoryBackend;
/// use std::sync::Arc;
///
/// let store = ProfileStore::new(Arc::new(MemoryBackend::new()), &StoreConfig::default()).unwrap();
/// let profile = Profile::new("a1b2c3").with_ip("10.0.0.1").with_url("/");
/// assert!(store.write(&profile).unwrap());
///
/// let tree = store.read("a1b2c3").unwrap().unwrap();
/// assert_eq!(tree.root_profile().ip, "10.0.0.1");
/// ```
#[derive(Clone)]
pub struct ProfileStore {
    backend: Arc<dyn CacheBackend>,
    index: IndexLog,
    namer: KeyNamer,
    lifetime: Duration,
}

impl ProfileStore {
    /// Create a store over `backend`
    ///
    /// Fails with `InvalidConfig` if the configuration cannot produce a
    /// valid index key.
    pub fn new(backend: Arc<dyn CacheBackend>, config: &StoreConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            index: IndexLog::new(backend.clone()),
            backend,
            namer: KeyNamer::new(config.prefix.clone()),
            lifetime: config.lifetime(),
        })
    }

    /// The backend handle
    pub fn backend(&self) -> &Arc<dyn CacheBackend> {
        &self.backend
    }

    /// The key namer
    pub fn namer(&self) -> &KeyNamer {
        &self.namer
    }

    /// Expiration applied to every write
    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }

    /// Store a profile and index it
    ///
    /// Returns `false` if the backend rejected the record or the index line.
    pub fn write(&self, profile: &Profile) -> Result<bool> {
        let item_key = self.namer.item_key(&profile.token)?;
        let index_key = self.namer.index_key()?;
        let bytes = ProfileRecord::encode(profile).to_bytes()?;

        if let Err(e) = self.backend.set(&item_key, &bytes, self.lifetime) {
            warn!(backend = self.backend.name(), key = %item_key, error = %e, "profile store failed");
            return Ok(false);
        }

        let line = IndexLine::format(profile);
        let indexed = self.index.append(&index_key, &line, self.lifetime);
        if indexed {
            debug!(token = %profile.token, "profile written");
        }
        Ok(indexed)
    }

    /// Read a profile and its relatives
    ///
    /// Returns `None` for an empty token, a miss, a backend failure or an
    /// undecodable record.
    pub fn read(&self, token: &str) -> Result<Option<ProfileTree>> {
        if token.is_empty() {
            return Ok(None);
        }
        let key = self.namer.item_key(token)?;

        let bytes = match self.backend.get(&key) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return Ok(None),
            Err(e) => {
                warn!(backend = self.backend.name(), key = %key, error = %e, "profile fetch failed");
                return Ok(None);
            }
        };
        let record = match ProfileRecord::from_bytes(&bytes) {
            Ok(record) => record,
            Err(e) => {
                warn!(key = %key, error = %e, "undecodable profile record");
                return Ok(None);
            }
        };

        TreeBuilder::new(self.backend.as_ref(), &self.namer)
            .build(token, record)
            .map(Some)
    }

    /// List indexed profiles
    ///
    /// Filters are substring matches; empty filters match everything.
    pub fn find(
        &self,
        ip: &str,
        url: &str,
        limit: usize,
        method: &str,
    ) -> Result<Vec<ProfileSummary>> {
        self.find_with(&FindQuery::new(limit).ip(ip).url(url).method(method))
    }

    /// List indexed profiles matching `query`
    pub fn find_with(&self, query: &FindQuery) -> Result<Vec<ProfileSummary>> {
        let index_key = self.namer.index_key()?;
        Ok(self.index.find(&index_key, query))
    }

    /// Remove every stored profile and the index
    ///
    /// Deletes only keys under this store's prefix when the backend can
    /// enumerate keys; otherwise flushes the whole backend, which also
    /// removes keys belonging to other users of the same cache.
    pub fn purge(&self) -> Result<bool> {
        let prefix = self.namer.prefix();
        match self.backend.delete_prefix(prefix) {
            Ok(removed) => {
                info!(backend = self.backend.name(), prefix, removed, "purged profiles by prefix");
                return Ok(true);
            }
            Err(BackendError::Unsupported(_)) => {}
            Err(e) => {
                warn!(backend = self.backend.name(), prefix, error = %e, "prefix purge failed");
                return Ok(false);
            }
        }

        match self.backend.flush() {
            Ok(()) => {
                info!(backend = self.backend.name(), "purged profiles by flushing backend");
                Ok(true)
            }
            Err(e) => {
                warn!(backend = self.backend.name(), error = %e, "backend flush failed");
                Ok(false)
            }
        }
    }

    /// Rewrite the index with one line per token
    ///
    /// Returns the number of lines removed, or `None` if the backend
    /// failed. See [`IndexLog::compact`].
    pub fn compact_index(&self) -> Result<Option<usize>> {
        let index_key = self.namer.index_key()?;
        Ok(self.index.compact(&index_key, self.lifetime))
    }
}
