//! In-memory cache backend
//!
//! Reference [`CacheBackend`] used by tests and ephemeral stores.
//!
//! # Design
//!
//! - DashMap: sharded map, each key's shard lock makes `append` atomic
//! - Per-entry deadline: expired entries read as misses and are removed lazily
//! - Key limit: keys over 250 bytes are rejected like a cache server would
//!
//! # Fault injection
//!
//! [`MemoryBackend::set_fail_writes`] and [`MemoryBackend::set_unavailable`]
//! make operations fail so callers can exercise their degraded paths, and
//! [`MemoryBackend::evict`] drops a key the way cache eviction would.

use crate::backend::{BackendError, BackendResult, CacheBackend};
use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tracing::debug;

/// Largest key accepted, in bytes
pub const MAX_KEY_BYTES: usize = 250;

#[derive(Debug)]
struct Entry {
    value: Vec<u8>,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.map_or(false, |deadline| now >= deadline)
    }
}

fn deadline(lifetime: Duration, now: Instant) -> Option<Instant> {
    if lifetime.is_zero() {
        None
    } else {
        now.checked_add(lifetime)
    }
}

/// In-process cache with expiration
///
/// # Example
///
/// ```
/// use profiler_storage::{CacheBackend, MemoryBackend};
/// use std::time::Duration;
///
/// let cache = MemoryBackend::new();
/// cache.set("k", b"v", Duration::ZERO).unwrap();
/// cache.append("k", b"w", Duration::ZERO).unwrap();
/// assert_eq!(cache.get("k").unwrap(), Some(b"vw".to_vec()));
/// ```
#[derive(Debug)]
pub struct MemoryBackend {
    entries: DashMap<String, Entry>,
    ops: AtomicU64,
    fail_writes: AtomicBool,
    unavailable: AtomicBool,
    prefix_delete: bool,
}

impl MemoryBackend {
    /// Create an empty backend
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
            ops: AtomicU64::new(0),
            fail_writes: AtomicBool::new(false),
            unavailable: AtomicBool::new(false),
            prefix_delete: true,
        }
    }

    /// Create a backend that cannot enumerate keys
    ///
    /// `delete_prefix` reports `Unsupported`, like a plain memcached client.
    pub fn without_prefix_delete() -> Self {
        Self {
            prefix_delete: false,
            ..Self::new()
        }
    }

    /// Make `set` and `append` fail while enabled
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Make every operation fail with `Unavailable` while enabled
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Drop a key as if the cache had evicted it
    ///
    /// Returns `true` if the key existed. Not counted as an operation.
    pub fn evict(&self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }

    /// Number of trait operations served so far
    pub fn op_count(&self) -> u64 {
        self.ops.load(Ordering::SeqCst)
    }

    /// Number of unexpired entries
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.entries
            .iter()
            .filter(|entry| !entry.value().is_expired(now))
            .count()
    }

    /// Check if no unexpired entries remain
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn begin(&self, key: Option<&str>) -> BackendResult<()> {
        self.ops.fetch_add(1, Ordering::SeqCst);
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(BackendError::Unavailable("memory backend offline".to_string()));
        }
        if let Some(key) = key {
            if key.len() > MAX_KEY_BYTES {
                return Err(BackendError::KeyTooLong {
                    length: key.len(),
                    max: MAX_KEY_BYTES,
                });
            }
        }
        Ok(())
    }

    fn begin_write(&self, key: &str) -> BackendResult<()> {
        self.begin(Some(key))?;
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(BackendError::WriteRejected(key.to_string()));
        }
        Ok(())
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl CacheBackend for MemoryBackend {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn get(&self, key: &str) -> BackendResult<Option<Vec<u8>>> {
        self.begin(Some(key))?;
        let now = Instant::now();

        if let Some(entry) = self.entries.get(key) {
            if !entry.is_expired(now) {
                return Ok(Some(entry.value.clone()));
            }
        } else {
            return Ok(None);
        }

        self.entries.remove_if(key, |_, entry| entry.is_expired(now));
        Ok(None)
    }

    fn set(&self, key: &str, value: &[u8], lifetime: Duration) -> BackendResult<()> {
        self.begin_write(key)?;
        let now = Instant::now();
        self.entries.insert(
            key.to_string(),
            Entry {
                value: value.to_vec(),
                expires_at: deadline(lifetime, now),
            },
        );
        Ok(())
    }

    fn append(&self, key: &str, value: &[u8], lifetime: Duration) -> BackendResult<()> {
        self.begin_write(key)?;
        let now = Instant::now();
        let mut entry = self
            .entries
            .entry(key.to_string())
            .or_insert_with(|| Entry {
                value: Vec::new(),
                expires_at: None,
            });
        if entry.is_expired(now) {
            entry.value.clear();
        }
        entry.value.extend_from_slice(value);
        entry.expires_at = deadline(lifetime, now);
        Ok(())
    }

    fn flush(&self) -> BackendResult<()> {
        self.begin(None)?;
        let removed = self.entries.len();
        self.entries.clear();
        debug!(removed, "memory backend flushed");
        Ok(())
    }

    fn delete_prefix(&self, prefix: &str) -> BackendResult<usize> {
        self.begin(None)?;
        if !self.prefix_delete {
            return Err(BackendError::Unsupported("delete_prefix"));
        }
        let mut removed = 0;
        self.entries.retain(|key, _| {
            let keep = !key.starts_with(prefix);
            if !keep {
                removed += 1;
            }
            keep
        });
        debug!(prefix, removed, "memory backend deleted prefix");
        Ok(removed)
    }
}
