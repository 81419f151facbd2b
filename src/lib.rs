//! # Profiler Store
//!
//! Storage for request profiles in an expiring key-value cache.
//!
//! Each profile is stored as one record under `<prefix><token>`; every write
//! also appends a line to a shared index at `<prefix>index` so profiles can
//! be listed by ip, url, method and time without touching each record. Reads
//! rebuild the parent chain and children of a profile from those flat
//! records.
//!
//! ## Quick Start
//!
//! ```
//! use profiler_store::prelude::*;
//!
//! let profiler = Profiler::ephemeral()?;
//!
//! let parent = Profile::new("aaa111").with_url("/page").with_child("bbb222");
//! let child = Profile::new("bbb222").with_url("/fragment").with_parent("aaa111");
//! profiler.write(&parent)?;
//! profiler.write(&child)?;
//!
//! let tree = profiler.read("bbb222")?.unwrap();
//! let up = tree.parent(tree.root()).unwrap();
//! assert_eq!(tree.profile(up).url, "/page");
//! # Ok::<(), profiler_store::Error>(())
//! ```
//!
//! ## Layers
//!
//! - `profiler-core`: profile types, key naming, record and index codecs
//! - `profiler-storage`: the [`CacheBackend`] trait and [`MemoryBackend`]
//! - `profiler-engine`: index log, tree builder, [`ProfileStore`]
//! - this crate: [`Profiler`] with builder-based configuration

#![warn(missing_docs)]

mod error;
mod profiler;

pub mod prelude;

// Re-export main entry points
pub use error::{Error, Result};
pub use profiler::{Profiler, ProfilerBuilder};

// Re-export layer types
pub use profiler_core::{FindQuery, Profile, ProfileSummary, MAX_KEY_LENGTH};
pub use profiler_engine::{NodeId, ProfileNode, ProfileStore, ProfileTree, StoreConfig};
pub use profiler_storage::{BackendError, CacheBackend, MemoryBackend};
