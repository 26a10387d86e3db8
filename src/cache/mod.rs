//! Cache Module
//!
//! Provides in-memory caching with per-entry TTL expiration and a background sweep.

mod entry;
mod shared;
mod stats;
mod store;


// Re-export public types
pub use entry::CacheEntry;
pub use shared::Cache;
pub use stats::CacheStats;
pub use store::{CacheStore, Lookup};
