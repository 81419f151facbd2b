//! Cache backends for the profiler store
//!
//! This crate defines the capability the store needs from a key-value
//! cache and ships the in-process reference implementation:
//! - [`CacheBackend`]: get / set / append / flush, plus optional prefix delete
//! - [`BackendError`]: failures reported by a backend
//! - [`MemoryBackend`]: DashMap-based cache with per-key expiry

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod backend;
pub mod memory;

pub use backend::{BackendError, BackendResult, CacheBackend};
pub use memory::MemoryBackend;
