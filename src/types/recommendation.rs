//! Band scores, quality labels and the band recommendation

use serde::{Deserialize, Serialize};

use super::{Band, Confidence};

// ============================================================================
// Quality Labels
// ============================================================================

/// Qualitative band condition shown to operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum QualityLabel {
    Poor,
    Fair,
    Good,
    Excellent,
}

impl std::fmt::Display for QualityLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QualityLabel::Poor => write!(f, "Poor"),
            QualityLabel::Fair => write!(f, "Fair"),
            QualityLabel::Good => write!(f, "Good"),
            QualityLabel::Excellent => write!(f, "Excellent"),
        }
    }
}

/// Score -> label cut points on the 0-100 score scale.
///
/// Shared by every band. `version` is bumped whenever the cut points change
/// so published reports record which table produced their labels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LabelThresholds {
    #[serde(default = "default_thresholds_version")]
    pub version: u32,
    #[serde(default = "default_excellent")]
    pub excellent: f64,
    #[serde(default = "default_good")]
    pub good: f64,
    #[serde(default = "default_fair")]
    pub fair: f64,
}

fn default_thresholds_version() -> u32 { 1 }
fn default_excellent() -> f64 { 80.0 }
fn default_good() -> f64 { 60.0 }
fn default_fair() -> f64 { 40.0 }

impl Default for LabelThresholds {
    fn default() -> Self {
        Self {
            version: default_thresholds_version(),
            excellent: default_excellent(),
            good: default_good(),
            fair: default_fair(),
        }
    }
}

impl LabelThresholds {
    pub fn label_for(&self, score: f64) -> QualityLabel {
        if score >= self.excellent {
            QualityLabel::Excellent
        } else if score >= self.good {
            QualityLabel::Good
        } else if score >= self.fair {
            QualityLabel::Fair
        } else {
            QualityLabel::Poor
        }
    }
}

// ============================================================================
// Band Score
// ============================================================================

/// Day and night quality for one band, scored on 0-100.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BandScore {
    pub band: Band,
    pub day_score: f64,
    pub night_score: f64,
    pub day_label: QualityLabel,
    pub night_label: QualityLabel,
}

impl BandScore {
    /// Score and label for the current half of the day.
    pub fn current(&self, is_daytime: bool) -> (f64, QualityLabel) {
        if is_daytime {
            (self.day_score, self.day_label)
        } else {
            (self.night_score, self.night_label)
        }
    }
}

// ============================================================================
// Recommendation
// ============================================================================

/// Why the default MUF ranking was replaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverrideReason {
    /// Severe geomagnetic storm: low HF and 6m moved to the top
    GeomagneticStorm,
    /// Exceptional solar flux: highest HF bands moved to the top
    HighSolarFlux,
}

impl std::fmt::Display for OverrideReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OverrideReason::GeomagneticStorm => write!(f, "geomagnetic storm"),
            OverrideReason::HighSolarFlux => write!(f, "high solar flux"),
        }
    }
}

/// Prioritized band list with human-readable rationale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub ordered_bands: Vec<Band>,
    pub rationale: Vec<String>,
    pub override_reason: Option<OverrideReason>,
    pub confidence_label: Confidence,
}

impl Recommendation {
    /// The first `n` recommended bands.
    pub fn top(&self, n: usize) -> &[Band] {
        &self.ordered_bands[..n.min(self.ordered_bands.len())]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_follow_thresholds() {
        let t = LabelThresholds::default();
        assert_eq!(t.label_for(100.0), QualityLabel::Excellent);
        assert_eq!(t.label_for(80.0), QualityLabel::Excellent);
        assert_eq!(t.label_for(79.9), QualityLabel::Good);
        assert_eq!(t.label_for(60.0), QualityLabel::Good);
        assert_eq!(t.label_for(40.0), QualityLabel::Fair);
        assert_eq!(t.label_for(39.9), QualityLabel::Poor);
        assert_eq!(t.label_for(0.0), QualityLabel::Poor);
    }

    #[test]
    fn top_is_bounded() {
        let rec = Recommendation {
            ordered_bands: vec![Band::M20, Band::M40],
            rationale: vec![],
            override_reason: None,
            confidence_label: Confidence::Low,
        };
        assert_eq!(rec.top(3), &[Band::M20, Band::M40]);
        assert_eq!(rec.top(1), &[Band::M20]);
    }
}
