//! Shared data structures for the propagation forecasting engine
//!
//! This module defines the core types flowing through one report cycle:
//! - Inputs: SolarSnapshot, IonosondeSounding, ValidationSample (normalized upstream readings)
//! - Derived state: Location, GeomagneticState, SolarCyclePhase
//! - Stage outputs: MufEstimate -> BandScore -> Recommendation
//! - Statistics: TrendEstimate, AccuracyScore
//! - Published output: PropagationReport

mod band;
mod geomagnetic;
mod muf;
mod readings;
mod recommendation;
mod report;
mod statistics;

pub use band::*;
pub use geomagnetic::*;
pub use muf::*;
pub use readings::*;
pub use recommendation::*;
pub use report::*;
pub use statistics::*;
