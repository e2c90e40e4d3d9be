//! Trend estimates, live-activity samples and accuracy scores

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::Band;

// ============================================================================
// Trends
// ============================================================================

/// Solar/geomagnetic parameter tracked by the trend analyzer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendParameter {
    Sfi,
    KIndex,
    AIndex,
}

impl TrendParameter {
    pub const ALL: [TrendParameter; 3] = [TrendParameter::Sfi, TrendParameter::KIndex, TrendParameter::AIndex];

    pub fn extract(self, snapshot: &super::SolarSnapshot) -> f64 {
        match self {
            TrendParameter::Sfi => snapshot.sfi,
            TrendParameter::KIndex => snapshot.k_index,
            TrendParameter::AIndex => snapshot.a_index,
        }
    }
}

impl std::fmt::Display for TrendParameter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TrendParameter::Sfi => write!(f, "sfi"),
            TrendParameter::KIndex => write!(f, "k_index"),
            TrendParameter::AIndex => write!(f, "a_index"),
        }
    }
}

/// Goodness-of-fit bucket for a trend line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TrendConfidence {
    InsufficientData,
    Low,
    Moderate,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Rising,
    Falling,
    Stable,
}

/// Least-squares trend of one parameter over the historical buffer.
///
/// `slope`, `r_squared` and `p_value` are `None` exactly when
/// `confidence == InsufficientData`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendEstimate {
    pub parameter: TrendParameter,
    /// Units of the parameter per hour
    pub slope: Option<f64>,
    pub r_squared: Option<f64>,
    /// Two-sided p-value of the slope under a Student's t test
    pub p_value: Option<f64>,
    pub confidence: TrendConfidence,
    pub direction: Option<TrendDirection>,
    pub sample_count: usize,
}

impl TrendEstimate {
    pub fn insufficient(parameter: TrendParameter, sample_count: usize) -> Self {
        Self {
            parameter,
            slope: None,
            r_squared: None,
            p_value: None,
            confidence: TrendConfidence::InsufficientData,
            direction: None,
            sample_count,
        }
    }

    pub fn is_insufficient(&self) -> bool {
        self.confidence == TrendConfidence::InsufficientData
    }
}

// ============================================================================
// Validation Samples
// ============================================================================

/// One live contact/spot reported by an activity network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationSample {
    /// MHz
    pub frequency: f64,
    pub mode: String,
    pub distance_km: f64,
    /// dB; not every network reports it
    #[serde(default)]
    pub snr: Option<f64>,
    pub source_network: String,
    pub timestamp: DateTime<Utc>,
}

impl ValidationSample {
    pub fn band(&self) -> Option<Band> {
        Band::from_frequency(self.frequency)
    }
}

/// Activity seen on one band in the current sample set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BandActivity {
    pub count: usize,
    pub avg_snr: Option<f64>,
    pub max_distance_km: f64,
    pub modes: BTreeSet<String>,
    pub networks: BTreeSet<String>,
}

// ============================================================================
// Accuracy
// ============================================================================

/// Accuracy value: a 0-100 score or an explicit insufficient-data sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccuracyValue {
    Score(f64),
    InsufficientData,
}

/// How well past recommendations were corroborated by live activity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccuracyScore {
    pub value: AccuracyValue,
    /// Networks that confirmed at least one predicted band
    pub contributing_sources: Vec<String>,
    pub window_secs: i64,
    pub predictions_checked: usize,
    pub predictions_confirmed: usize,
}

impl AccuracyScore {
    pub fn insufficient(window_secs: i64) -> Self {
        Self {
            value: AccuracyValue::InsufficientData,
            contributing_sources: Vec::new(),
            window_secs,
            predictions_checked: 0,
            predictions_confirmed: 0,
        }
    }

    pub fn score(&self) -> Option<f64> {
        match self.value {
            AccuracyValue::Score(v) => Some(v),
            AccuracyValue::InsufficientData => None,
        }
    }
}

/// How close past MUF estimates came to what ionosondes later measured.
///
/// Each qualifying sounding is paired with the latest report issued at or
/// before it. Errors are relative to the measured value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MufAccuracy {
    /// 100 x max(0, 1 - mean relative error), or insufficient data
    pub value: AccuracyValue,
    pub pairs: usize,
    pub mean_abs_error_mhz: Option<f64>,
    pub mean_error_pct: Option<f64>,
    pub min_error_pct: Option<f64>,
    pub max_error_pct: Option<f64>,
    /// Mean MUF(3000)/foF2 over paired soundings that report both
    pub observed_m_factor: Option<f64>,
    pub stations: Vec<String>,
    pub window_secs: i64,
}

impl MufAccuracy {
    pub fn insufficient(window_secs: i64) -> Self {
        Self {
            value: AccuracyValue::InsufficientData,
            pairs: 0,
            mean_abs_error_mhz: None,
            mean_error_pct: None,
            min_error_pct: None,
            max_error_pct: None,
            observed_m_factor: None,
            stations: Vec::new(),
            window_secs,
        }
    }

    pub fn score(&self) -> Option<f64> {
        match self.value {
            AccuracyValue::Score(v) => Some(v),
            AccuracyValue::InsufficientData => None,
        }
    }
}
