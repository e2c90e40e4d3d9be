//! MUF estimate and confidence levels

use serde::{Deserialize, Serialize};

/// Valid MUF range (MHz). Every published estimate is clipped into it.
pub const MUF_MIN_MHZ: f64 = 2.0;
pub const MUF_MAX_MHZ: f64 = 60.0;

/// Clip a raw MUF value into the published range. NaN maps to the floor.
pub fn clip_muf(value: f64) -> f64 {
    if value.is_nan() {
        return MUF_MIN_MHZ;
    }
    value.clamp(MUF_MIN_MHZ, MUF_MAX_MHZ)
}

/// Confidence attached to a MUF estimate or recommendation.
///
/// Ordered so that `min()` picks the weaker of two confidences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    #[default]
    None,
    Low,
    Moderate,
    High,
}

impl Confidence {
    /// One level weaker, saturating at `None`.
    pub fn downgrade(self) -> Self {
        match self {
            Confidence::High => Confidence::Moderate,
            Confidence::Moderate => Confidence::Low,
            Confidence::Low | Confidence::None => Confidence::None,
        }
    }
}

impl std::fmt::Display for Confidence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Confidence::None => write!(f, "none"),
            Confidence::Low => write!(f, "low"),
            Confidence::Moderate => write!(f, "moderate"),
            Confidence::High => write!(f, "high"),
        }
    }
}

/// Which path produced the MUF value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MufMethod {
    /// Weighted average of nearby ionosonde soundings
    Measured,
    /// Solar-flux formula
    Formula,
    /// Previous estimate reused because no live path was available
    Stale,
    /// Built-in safe value; nothing else was available
    Default,
}

impl std::fmt::Display for MufMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MufMethod::Measured => write!(f, "measured"),
            MufMethod::Formula => write!(f, "formula"),
            MufMethod::Stale => write!(f, "stale"),
            MufMethod::Default => write!(f, "default"),
        }
    }
}

/// Multiplicative corrections applied to the base MUF, in application order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MufAdjustments {
    pub seasonal: f64,
    pub solar_cycle: f64,
    pub diurnal: f64,
    pub geomagnetic_latitude: f64,
}

impl MufAdjustments {
    pub const IDENTITY: Self = Self {
        seasonal: 1.0,
        solar_cycle: 1.0,
        diurnal: 1.0,
        geomagnetic_latitude: 1.0,
    };

    pub fn combined(&self) -> f64 {
        self.seasonal * self.solar_cycle * self.diurnal * self.geomagnetic_latitude
    }
}

impl Default for MufAdjustments {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Maximum usable frequency for the observer's location at one instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MufEstimate {
    /// Always within [`MUF_MIN_MHZ`, `MUF_MAX_MHZ`]
    pub value_mhz: f64,
    pub method: MufMethod,
    pub confidence: Confidence,
    pub contributing_stations: Vec<String>,
    /// Value before the multiplicative corrections
    pub base_mhz: f64,
    pub adjustments: MufAdjustments,
}

impl MufEstimate {
    /// Safe fallback when neither soundings, solar data nor history exist.
    pub fn safe_default() -> Self {
        Self {
            value_mhz: crate::config::defaults::DEFAULT_MUF_MHZ,
            method: MufMethod::Default,
            confidence: Confidence::None,
            contributing_stations: Vec::new(),
            base_mhz: crate::config::defaults::DEFAULT_MUF_MHZ,
            adjustments: MufAdjustments::IDENTITY,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clip_bounds() {
        assert_eq!(clip_muf(0.5), MUF_MIN_MHZ);
        assert_eq!(clip_muf(95.0), MUF_MAX_MHZ);
        assert_eq!(clip_muf(f64::NAN), MUF_MIN_MHZ);
        assert_eq!(clip_muf(f64::INFINITY), MUF_MAX_MHZ);
        assert_eq!(clip_muf(21.3), 21.3);
    }

    #[test]
    fn confidence_ordering_and_downgrade() {
        assert!(Confidence::High > Confidence::Moderate);
        assert_eq!(Confidence::High.min(Confidence::Low), Confidence::Low);
        assert_eq!(Confidence::High.downgrade(), Confidence::Moderate);
        assert_eq!(Confidence::None.downgrade(), Confidence::None);
    }
}
