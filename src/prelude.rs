//! Convenient imports for the profiler store.
//!
//! This module re-exports the most commonly used types so you can get started
//! with a single import:
//!
//! ```
//! use profiler_store::prelude::*;
//!
//! let profiler = Profiler::ephemeral()?;
//! profiler.write(&Profile::new("a1b2c3").with_collector_data(json!({"status": 200})))?;
//! # Ok::<(), profiler_store::Error>(())
//! ```

// Main entry point
pub use crate::profiler::{Profiler, ProfilerBuilder};

// Error handling
pub use crate::error::{Error, Result};

// Profile types
pub use crate::{FindQuery, NodeId, Profile, ProfileNode, ProfileSummary, ProfileTree};

// Backends
pub use crate::{CacheBackend, MemoryBackend};

// Re-export serde_json for convenience
pub use serde_json::json;
