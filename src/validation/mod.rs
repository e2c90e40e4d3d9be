//! Validation Engine
//!
//! Cross-checks recent recommendations against live activity reported by
//! spot networks, checks recent MUF estimates against later ionosonde
//! soundings, and summarises live activity per band for the report.

mod accuracy;
mod activity;
mod muf_accuracy;

pub use accuracy::{Prediction, ValidationEngine};
pub use activity::summarize_activity;
