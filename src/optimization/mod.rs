//! Band Optimizer
//!
//! Turns per-band scores into an ordered recommendation with rationale and
//! an overall confidence label. Pure and synchronous; identical inputs
//! always produce the identical ordering.

mod confidence;
mod optimizer;

pub use confidence::recommendation_confidence;
pub use optimizer::BandOptimizer;
