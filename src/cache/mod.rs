//! Cache Manager
//!
//! Namespaced TTL store that gates every expensive regeneration and
//! upstream pull. Each namespace has its own entry, TTL and memory budget.
//!
//! ## Guarantees
//!
//! - An entry is never returned once its age reaches its TTL
//! - Entry count never exceeds `max_entries` (LRU eviction)
//! - Memory estimate never exceeds `max_memory_bytes` (oldest-first eviction)
//! - Concurrent misses on one key trigger a single regeneration
//! - A value that fails its digest or decode check is evicted and reported
//!   as a miss

mod entry;
mod manager;
mod stats;

pub use entry::CacheEntry;
pub use manager::CacheManager;
pub use stats::{CacheStats, NamespaceStats};
