//! Engine and cache error taxonomy
//!
//! Only `ForecastUnavailable` ever reaches a consumer. Every other variant is
//! absorbed inside the engine: upstream failures degrade to fallback values,
//! malformed records are dropped, cache inconsistencies become misses, and
//! insufficient data is surfaced as an explicit sentinel in the report.

use thiserror::Error;

/// Errors raised while producing a propagation report.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum EngineError {
    /// Feed timeout or network failure
    #[error("Upstream '{source_name}' unavailable: {reason}")]
    UpstreamUnavailable { source_name: String, reason: String },

    /// Too few samples for a statistical fit
    #[error("Insufficient data: need {needed}, have {available}")]
    InsufficientData { needed: usize, available: usize },

    /// A single snapshot or sounding failed schema validation
    #[error("Malformed reading: {0}")]
    MalformedReading(String),

    /// A stored cache value failed its integrity or type check
    #[error("Cache inconsistency in {namespace}/{key}: {reason}")]
    CacheInconsistency {
        namespace: String,
        key: String,
        reason: String,
    },

    /// Every upstream source failed and no last-good report exists
    #[error("Forecast unavailable: all upstream sources failed and no previous report exists")]
    ForecastUnavailable,
}

impl EngineError {
    pub fn upstream(source_name: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        EngineError::UpstreamUnavailable {
            source_name: source_name.into(),
            reason: reason.to_string(),
        }
    }
}

/// Errors raised by the cache manager itself.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CacheError {
    #[error("Unknown cache namespace: {0}")]
    UnknownNamespace(String),

    #[error("Failed to serialize value for {namespace}/{key}: {reason}")]
    Serialize {
        namespace: String,
        key: String,
        reason: String,
    },

    #[error("Entry {namespace}/{key} is {size} bytes, larger than the namespace budget of {budget} bytes")]
    EntryTooLarge {
        namespace: String,
        key: String,
        size: usize,
        budget: usize,
    },

    /// The coalesced regeneration failed; every waiter receives the same error
    #[error("Regeneration of {namespace}/{key} failed: {reason}")]
    Regeneration {
        namespace: String,
        key: String,
        reason: String,
    },
}
