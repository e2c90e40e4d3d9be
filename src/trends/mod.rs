//! Historical trend analysis
//!
//! Each refresh cycle appends the current solar snapshot to a bounded
//! buffer per tracked parameter (SFI, K-index, A-index). Trends are ordinary
//! least-squares fits over that buffer; too few samples yields an explicit
//! `InsufficientData` estimate rather than a number.

mod analyzer;
mod buffer;

pub use analyzer::TrendAnalyzer;
pub use buffer::{HistoricalBuffer, TrendSample};
