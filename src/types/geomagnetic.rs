//! Geomagnetic activity and solar-cycle classification

use serde::{Deserialize, Serialize};

// ============================================================================
// Storm Level
// ============================================================================

/// Geomagnetic storm classification derived from the planetary K-index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StormLevel {
    #[default]
    Quiet,
    Unsettled,
    Active,
    Storm,
    Severe,
}

impl StormLevel {
    /// Classify a K-index. `severe_k` is the configured severe-storm threshold.
    pub fn from_k_index(k: f64, severe_k: f64) -> Self {
        if k >= severe_k {
            StormLevel::Severe
        } else if k >= 5.0 {
            StormLevel::Storm
        } else if k >= 4.0 {
            StormLevel::Active
        } else if k >= 3.0 {
            StormLevel::Unsettled
        } else {
            StormLevel::Quiet
        }
    }
}

impl std::fmt::Display for StormLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StormLevel::Quiet => write!(f, "QUIET"),
            StormLevel::Unsettled => write!(f, "UNSETTLED"),
            StormLevel::Active => write!(f, "ACTIVE"),
            StormLevel::Storm => write!(f, "STORM"),
            StormLevel::Severe => write!(f, "SEVERE STORM"),
        }
    }
}

// ============================================================================
// Geomagnetic State
// ============================================================================

/// Geomagnetic conditions as seen from the observer's location.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeomagneticState {
    pub k_index: f64,
    pub a_index: f64,
    pub storm_level: StormLevel,
    /// Observer latitude in the dipole frame (degrees)
    pub geomagnetic_latitude: f64,
    /// Observer longitude in the dipole frame (degrees, 0-360)
    pub geomagnetic_longitude: f64,
}

impl GeomagneticState {
    pub fn is_storm(&self) -> bool {
        self.storm_level >= StormLevel::Storm
    }

    /// Observer sits under the auroral oval where HF absorption dominates.
    pub fn is_auroral(&self) -> bool {
        self.geomagnetic_latitude.abs() >= 60.0
    }
}

// ============================================================================
// Solar Cycle Phase
// ============================================================================

/// Coarse solar-cycle phase bucketed from the 10.7 cm flux.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolarCyclePhase {
    DeepMinimum,
    Minimum,
    EarlyRising,
    Rising,
    NearMaximum,
    Maximum,
}

impl SolarCyclePhase {
    pub fn from_sfi(sfi: f64) -> Self {
        if sfi >= 150.0 {
            SolarCyclePhase::Maximum
        } else if sfi >= 120.0 {
            SolarCyclePhase::NearMaximum
        } else if sfi >= 100.0 {
            SolarCyclePhase::Rising
        } else if sfi >= 80.0 {
            SolarCyclePhase::EarlyRising
        } else if sfi >= 60.0 {
            SolarCyclePhase::Minimum
        } else {
            SolarCyclePhase::DeepMinimum
        }
    }

    /// MUF multiplier for this phase; the high bands only open near maximum.
    pub fn muf_factor(self) -> f64 {
        match self {
            SolarCyclePhase::DeepMinimum => 0.90,
            SolarCyclePhase::Minimum => 0.94,
            SolarCyclePhase::EarlyRising => 0.97,
            SolarCyclePhase::Rising => 1.0,
            SolarCyclePhase::NearMaximum => 1.03,
            SolarCyclePhase::Maximum => 1.05,
        }
    }
}

impl std::fmt::Display for SolarCyclePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SolarCyclePhase::DeepMinimum => write!(f, "Deep minimum"),
            SolarCyclePhase::Minimum => write!(f, "Solar minimum"),
            SolarCyclePhase::EarlyRising => write!(f, "Early rising"),
            SolarCyclePhase::Rising => write!(f, "Rising"),
            SolarCyclePhase::NearMaximum => write!(f, "Near maximum"),
            SolarCyclePhase::Maximum => write!(f, "Solar maximum"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storm_level_buckets() {
        assert_eq!(StormLevel::from_k_index(1.0, 6.0), StormLevel::Quiet);
        assert_eq!(StormLevel::from_k_index(3.0, 6.0), StormLevel::Unsettled);
        assert_eq!(StormLevel::from_k_index(4.3, 6.0), StormLevel::Active);
        assert_eq!(StormLevel::from_k_index(5.0, 6.0), StormLevel::Storm);
        assert_eq!(StormLevel::from_k_index(6.0, 6.0), StormLevel::Severe);
        // A lower severe threshold promotes K=5 straight to severe
        assert_eq!(StormLevel::from_k_index(5.0, 5.0), StormLevel::Severe);
    }

    #[test]
    fn cycle_phase_factor_is_monotonic() {
        let phases = [40.0, 70.0, 90.0, 110.0, 130.0, 180.0].map(SolarCyclePhase::from_sfi);
        for pair in phases.windows(2) {
            assert!(pair[0] < pair[1]);
            assert!(pair[0].muf_factor() < pair[1].muf_factor());
        }
    }
}
