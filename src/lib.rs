//! Skywave: Shortwave Propagation Forecasting
//!
//! Fuses solar indices, ionosonde soundings and live spot reports into a
//! ranked set of usable amateur bands with explicit confidence.
//!
//! ## Architecture
//!
//! - **Ionosphere**: MUF from nearby soundings, falling back to an SFI formula
//! - **Scoring**: per-band day/night quality on a 0-100 scale
//! - **Optimization**: ranked recommendation with storm/flux overrides
//! - **Trends**: bounded history and least-squares trend confidence
//! - **Validation**: accuracy of past recommendations against live activity
//! - **Cache**: namespaced TTL store gating every regeneration and upstream pull

pub mod alerts;
pub mod background;
pub mod cache;
pub mod config;
pub mod error;
pub mod ionosphere;
pub mod optimization;
pub mod pipeline;
pub mod scoring;
pub mod trends;
pub mod types;
pub mod validation;

// Re-export configuration
pub use config::SkywaveConfig;

// Re-export errors
pub use error::{CacheError, EngineError};

// Re-export commonly used types
pub use types::{
    AccuracyScore, AccuracyValue, Alert, Band, BandScore, Confidence, IonosondeSounding, Location, MufEstimate,
    MufAccuracy, MufMethod, PropagationReport, QualityLabel, Recommendation, SolarSnapshot, TrendEstimate, ValidationSample,
};

// Re-export engine components
pub use cache::{CacheManager, CacheStats};
pub use ionosphere::IonosphereModel;
pub use optimization::BandOptimizer;
pub use pipeline::{PropagationService, ReportGenerator, UpstreamFeed};
pub use scoring::score_bands;
pub use trends::{HistoricalBuffer, TrendAnalyzer};
pub use validation::ValidationEngine;
