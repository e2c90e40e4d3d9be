//! Report Pipeline
//!
//! ```text
//! UpstreamFeed --(timeout + cache)--> solar / ionosonde / spots
//!        |
//!        v
//! IonosphereModel -> BandQualityEngine -> TrendAnalyzer -> BandOptimizer
//!        -> ValidationEngine -> alerts -> publish (history, last good, cache)
//! ```
//!
//! Every stage after the fetch is synchronous. A report becomes visible only
//! once it is complete.

mod feed;
mod generator;
mod service;

pub use feed::{ReplayData, ReplayFeed, SyntheticBaseline, SyntheticFeed, UpstreamFeed};
pub use generator::{ReportGenerator, UpstreamInputs};
pub use service::PropagationService;
