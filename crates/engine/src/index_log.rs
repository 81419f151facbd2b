//! Append-only profile index
//!
//! The index is a single text value in the backend. Each write appends one
//! line; nothing is ever rewritten except by an explicit [`IndexLog::compact`].
//!
//! ## Listing semantics
//!
//! `find` scans lines in write order and collapses them by token:
//! - a token keeps the position of its first accepted line
//! - its data comes from its last accepted line
//! - every accepted line (including duplicates) consumes one unit of `limit`
//! - the scan stops as soon as `limit` reaches zero
//!
//! Malformed lines are skipped and the scan continues.

use profiler_core::{FindQuery, IndexLine, ProfileSummary};
use profiler_storage::CacheBackend;
use rustc_hash::FxHashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Collapse entries by token, keeping first position and last data
struct Collapsed<T> {
    positions: FxHashMap<String, usize>,
    entries: Vec<T>,
}

impl<T> Collapsed<T> {
    fn new() -> Self {
        Self {
            positions: FxHashMap::default(),
            entries: Vec::new(),
        }
    }

    fn insert(&mut self, token: String, entry: T) {
        match self.positions.get(&token) {
            Some(&position) => self.entries[position] = entry,
            None => {
                self.positions.insert(token, self.entries.len());
                self.entries.push(entry);
            }
        }
    }
}

/// Index log operations over a backend
#[derive(Clone)]
pub struct IndexLog {
    backend: Arc<dyn CacheBackend>,
}

impl IndexLog {
    /// Create an index log over `backend`
    pub fn new(backend: Arc<dyn CacheBackend>) -> Self {
        Self { backend }
    }

    /// Append one formatted line (with its trailing newline) to the index
    ///
    /// Returns `false` if the backend rejected the append.
    pub fn append(&self, key: &str, line: &str, lifetime: Duration) -> bool {
        match self.backend.append(key, line.as_bytes(), lifetime) {
            Ok(()) => true,
            Err(e) => {
                warn!(backend = self.backend.name(), key, error = %e, "index append failed");
                false
            }
        }
    }

    /// List index entries matching `query`
    ///
    /// A missing index or a failed fetch yields an empty list.
    pub fn find(&self, key: &str, query: &FindQuery) -> Vec<ProfileSummary> {
        let Some(blob) = self.fetch(key) else {
            return Vec::new();
        };

        let mut collapsed = Collapsed::new();
        let mut remaining = query.limit;
        for line in IndexLine::lines(&blob) {
            if remaining == 0 {
                break;
            }
            let Some(entry) = IndexLine::parse(line) else {
                debug!(key, line, "skipping malformed index line");
                continue;
            };
            if !query.matches(&entry) {
                continue;
            }
            collapsed.insert(entry.token.clone(), entry);
            remaining -= 1;
        }
        collapsed.entries
    }

    /// Rewrite the index with one line per token
    ///
    /// Each token keeps the position of its first line and the content of
    /// its last; malformed lines are dropped. An unbounded `find` returns
    /// the same entries before and after. Returns the number of lines
    /// removed, or `None` if the backend failed.
    ///
    /// This is a read-modify-write: lines appended between the fetch and
    /// the store are lost.
    pub fn compact(&self, key: &str, lifetime: Duration) -> Option<usize> {
        let blob = match self.backend.get(key) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return Some(0),
            Err(e) => {
                warn!(backend = self.backend.name(), key, error = %e, "index fetch failed");
                return None;
            }
        };

        // Kept lines are written back byte for byte; decoding is only used
        // to read the token and to reject malformed lines.
        let mut total = 0;
        let mut collapsed: Collapsed<&[u8]> = Collapsed::new();
        for raw in blob.split(|&b| b == b'\n').filter(|raw| !raw.is_empty()) {
            total += 1;
            if let Some(entry) = IndexLine::parse(&String::from_utf8_lossy(raw)) {
                collapsed.insert(entry.token, raw);
            }
        }

        let removed = total - collapsed.entries.len();
        if removed == 0 {
            return Some(0);
        }

        let mut rewritten = Vec::with_capacity(blob.len());
        for raw in &collapsed.entries {
            rewritten.extend_from_slice(raw);
            rewritten.push(b'\n');
        }
        match self.backend.set(key, &rewritten, lifetime) {
            Ok(()) => {
                debug!(key, removed, "index compacted");
                Some(removed)
            }
            Err(e) => {
                warn!(backend = self.backend.name(), key, error = %e, "index rewrite failed");
                None
            }
        }
    }

    fn fetch(&self, key: &str) -> Option<String> {
        match self.backend.get(key) {
            Ok(Some(bytes)) if !bytes.is_empty() => {
                Some(String::from_utf8_lossy(&bytes).into_owned())
            }
            Ok(_) => None,
            Err(e) => {
                warn!(backend = self.backend.name(), key, error = %e, "index fetch failed");
                None
            }
        }
    }
}
