//! Cache diagnostics

use serde::Serialize;
use std::collections::BTreeMap;

/// Running counters for one namespace.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Counters {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub expirations: u64,
    pub inconsistencies: u64,
}

/// Point-in-time view of one namespace.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NamespaceStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub expirations: u64,
    pub inconsistencies: u64,
    pub memory_bytes: usize,
    pub max_entries: usize,
    pub max_memory_bytes: usize,
    pub ttl_secs: u64,
    pub oldest_entry_age_secs: Option<u64>,
    pub newest_entry_age_secs: Option<u64>,
}

impl NamespaceStats {
    /// Hits / (hits + misses), or `None` before the first lookup.
    pub fn hit_rate(&self) -> Option<f64> {
        let lookups = self.hits + self.misses;
        (lookups > 0).then(|| self.hits as f64 / lookups as f64)
    }
}

/// Diagnostics for the whole cache, for an operational/debug surface.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CacheStats {
    pub namespaces: BTreeMap<String, NamespaceStats>,
    /// Regenerations currently in flight
    pub inflight: usize,
}

impl CacheStats {
    pub fn total_entries(&self) -> usize {
        self.namespaces.values().map(|s| s.entries).sum()
    }

    pub fn total_memory_bytes(&self) -> usize {
        self.namespaces.values().map(|s| s.memory_bytes).sum()
    }
}
