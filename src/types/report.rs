//! Published propagation report and operator alerts

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{
    AccuracyScore, Band, BandActivity, BandScore, GeomagneticState, Location, MufAccuracy, MufEstimate,
    Recommendation, SolarCyclePhase, SolarSnapshot, TrendEstimate,
};

// ============================================================================
// Alerts
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertSeverity {
    Info,
    Warning,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    GeomagneticStorm,
    Unsettled,
    SolarFlare,
    BandOpening,
    Greyline,
    QuietConditions,
}

/// Operator-facing notice derived from a finished report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub kind: AlertKind,
    pub severity: AlertSeverity,
    pub title: String,
    pub message: String,
}

// ============================================================================
// Report
// ============================================================================

/// Whether every upstream source contributed to this report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    Live,
    Degraded,
}

/// One complete forecast cycle. Built in full and then published; never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropagationReport {
    pub timestamp: DateTime<Utc>,
    pub location: Location,
    pub solar_snapshot: SolarSnapshot,
    pub geomagnetic: GeomagneticState,
    pub solar_cycle: SolarCyclePhase,
    pub is_daytime: bool,
    pub solar_elevation_deg: f64,
    pub muf_estimate: MufEstimate,
    pub band_scores: BTreeMap<Band, BandScore>,
    pub thresholds_version: u32,
    pub recommendation: Recommendation,
    pub trend_estimates: Vec<TrendEstimate>,
    pub accuracy_score: AccuracyScore,
    pub muf_accuracy: MufAccuracy,
    pub band_activity: BTreeMap<Band, BandActivity>,
    pub alerts: Vec<Alert>,
    pub status: ReportStatus,
    /// Fraction of expected upstream sources present this cycle (0-1)
    pub data_completeness: f64,
    pub missing_sources: Vec<String>,
}
