//! Core types for the profiler store
//!
//! This crate defines the pieces shared by every layer:
//! - [`Profile`] and [`ProfileSummary`]: the stored entity and its index view
//! - [`KeyNamer`]: backend key derivation and size validation
//! - [`ProfileRecord`]: the serialized per-token record
//! - [`IndexLine`] and [`FindQuery`]: the index log line codec and filter
//! - [`Error`]: the core error type

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod index;
pub mod keys;
pub mod profile;
pub mod record;

pub use error::{Error, Result};
pub use index::{FindQuery, IndexLine};
pub use keys::{KeyNamer, DEFAULT_PREFIX, INDEX_SUFFIX, MAX_KEY_LENGTH};
pub use profile::{Profile, ProfileSummary};
pub use record::ProfileRecord;
