//! Storage engine for request profiles
//!
//! Orchestrates the core codecs against a [`CacheBackend`]:
//! - [`IndexLog`]: append-only index, filtered listing, compaction
//! - [`TreeBuilder`] / [`ProfileTree`]: parent/child reconstruction on read
//! - [`ProfileStore`]: write / read / find / purge facade
//! - [`StoreConfig`]: prefix and lifetime settings
//!
//! [`CacheBackend`]: profiler_storage::CacheBackend

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod index_log;
pub mod store;
pub mod tree;

pub use config::StoreConfig;
pub use index_log::IndexLog;
pub use store::ProfileStore;
pub use tree::{NodeId, ProfileNode, ProfileTree, TreeBuilder};

pub use profiler_core::{Error, Result};
