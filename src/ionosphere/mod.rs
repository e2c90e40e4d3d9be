//! Ionosphere Model
//!
//! Estimates the maximum usable frequency (MUF) for the observer.
//!
//! ## Estimation paths (first available wins)
//! 1. **Measured**: distance- and recency-weighted average of nearby ionosonde soundings
//! 2. **Formula**: SFI -> base critical frequency curve x K-dependent multiplier
//! 3. **Stale**: previous estimate, when neither soundings nor a live solar snapshot exist
//! 4. **Default**: fixed safe value with no confidence
//!
//! Formula values then pass through four multiplicative corrections in
//! fixed order: seasonal, solar cycle, diurnal, geomagnetic latitude.
//! Measured values are published as sounded; a sounding already reflects
//! the local hour, season and field. Every published value is clipped to
//! 2-60 MHz.

pub mod adjustments;
pub mod geomagnetic;
pub mod solar_position;

pub use geomagnetic::{geomagnetic_coordinates, geomagnetic_state};
pub use solar_position::{is_daytime, solar_elevation_deg, HORIZON_ELEVATION_DEG};

use chrono::{DateTime, Utc};
use statrs::statistics::Statistics;
use tracing::{debug, warn};

use crate::config::IonosphereConfig;
use crate::types::{
    clip_muf, Confidence, Freshness, IonosondeSounding, Location, MufAdjustments, MufEstimate,
    MufMethod, SolarSnapshot,
};

/// Weight floor so a distant or old station still counts for something.
const MIN_STATION_WEIGHT: f64 = 0.1;

/// K-index assumed for corrections when no snapshot is available.
const QUIET_K_INDEX: f64 = 2.0;

/// One sounding that passed selection, with its weight.
#[derive(Debug, Clone)]
struct WeightedStation {
    station_id: String,
    muf: f64,
    weight: f64,
}

/// MUF estimator. Stateless apart from its configuration; every call is independent.
#[derive(Debug, Clone)]
pub struct IonosphereModel {
    config: IonosphereConfig,
}

impl IonosphereModel {
    pub fn new(config: IonosphereConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &IonosphereConfig {
        &self.config
    }

    /// Estimate the MUF at `location` for instant `now`.
    ///
    /// `solar` is the snapshot fetched this cycle, or `None` when the solar
    /// feed failed. `previous` is the estimate from the
    /// last good report and is only used when no live path exists.
    pub fn estimate_muf(
        &self,
        location: &Location,
        solar: Option<&SolarSnapshot>,
        soundings: &[IonosondeSounding],
        now: DateTime<Utc>,
        previous: Option<&MufEstimate>,
    ) -> MufEstimate {
        let stations = self.select_stations(location, soundings, now);

        if !stations.is_empty() {
            let (base, confidence) = self.measured_base(&stations);
            return MufEstimate {
                value_mhz: clip_muf(base),
                method: MufMethod::Measured,
                confidence,
                contributing_stations: stations.into_iter().map(|s| s.station_id).collect(),
                base_mhz: base,
                adjustments: MufAdjustments::IDENTITY,
            };
        }

        if let Some(snapshot) = solar {
            let base = adjustments::base_critical_frequency(snapshot.sfi)
                * adjustments::formula_multiplier(snapshot.k_index);
            let adjustments = self.adjustments(location, Some(snapshot), now);
            // Formula path is capped at moderate
            let confidence = if snapshot.freshness == Freshness::Live && snapshot.k_index < 5.0 {
                Confidence::Moderate
            } else {
                Confidence::Low
            };
            return MufEstimate {
                value_mhz: clip_muf(base * adjustments.combined()),
                method: MufMethod::Formula,
                confidence,
                contributing_stations: Vec::new(),
                base_mhz: base,
                adjustments,
            };
        }

        if let Some(prev) = previous {
            warn!(value_mhz = prev.value_mhz, "No soundings or solar data, reusing previous MUF estimate");
            return MufEstimate {
                value_mhz: clip_muf(prev.value_mhz),
                method: MufMethod::Stale,
                confidence: prev.confidence.min(Confidence::Low),
                contributing_stations: prev.contributing_stations.clone(),
                base_mhz: prev.base_mhz,
                adjustments: prev.adjustments,
            };
        }

        warn!("No soundings, solar data or previous estimate, publishing safe default MUF");
        MufEstimate::safe_default()
    }

    /// Multiplicative corrections in application order.
    pub fn adjustments(&self, location: &Location, solar: Option<&SolarSnapshot>, now: DateTime<Utc>) -> MufAdjustments {
        let k_index = solar.map_or(QUIET_K_INDEX, |s| s.k_index);
        let (mlat, _) = geomagnetic_coordinates(location);
        let elevation = solar_elevation_deg(location, now);

        MufAdjustments {
            seasonal: adjustments::seasonal_factor(
                location.latitude,
                solar_position::day_of_year(now),
                &self.config,
            ),
            solar_cycle: solar.map_or(1.0, |s| adjustments::solar_cycle_factor(s.sfi)),
            diurnal: adjustments::diurnal_factor(elevation, &self.config),
            geomagnetic_latitude: adjustments::geomagnetic_latitude_factor(mlat, k_index, &self.config),
        }
    }

    /// Valid soundings within distance and age limits, weighted.
    fn select_stations(
        &self,
        location: &Location,
        soundings: &[IonosondeSounding],
        now: DateTime<Utc>,
    ) -> Vec<WeightedStation> {
        let max_distance = self.config.max_station_distance_km;
        let max_age = self.config.max_sounding_age_mins;

        soundings
            .iter()
            .filter_map(|s| {
                if let Err(e) = s.validate() {
                    warn!(error = %e, "Dropping malformed sounding");
                    return None;
                }
                let distance = s.distance_from(location);
                // Clock skew can put a sounding slightly in the future
                let age_mins = ((now - s.timestamp).num_seconds() as f64 / 60.0).max(0.0);
                if distance > max_distance || age_mins > max_age {
                    return None;
                }

                let distance_weight = (1.0 - distance / max_distance).max(MIN_STATION_WEIGHT);
                let recency_weight = (1.0 - age_mins / max_age).max(MIN_STATION_WEIGHT);
                let weight = distance_weight * recency_weight;
                debug!(
                    station = %s.station_id,
                    distance_km = distance,
                    age_mins,
                    weight,
                    muf = s.derived_muf(),
                    "Sounding selected"
                );
                Some(WeightedStation {
                    station_id: s.station_id.clone(),
                    muf: s.derived_muf(),
                    weight,
                })
            })
            .collect()
    }

    /// Weighted mean MUF and a confidence from station count and spread.
    fn measured_base(&self, stations: &[WeightedStation]) -> (f64, Confidence) {
        let total_weight: f64 = stations.iter().map(|s| s.weight).sum();
        let weighted = stations.iter().map(|s| s.muf * s.weight).sum::<f64>() / total_weight;

        if stations.len() < 2 {
            return (weighted, Confidence::Moderate);
        }

        let values: Vec<f64> = stations.iter().map(|s| s.muf).collect();
        let mean = values.iter().mean();
        let spread = if mean > 0.0 { values.iter().std_dev() / mean } else { f64::INFINITY };

        let confidence = if stations.len() >= self.config.high_confidence_min_stations
            && spread <= self.config.high_confidence_max_spread
        {
            Confidence::High
        } else if spread > self.config.low_confidence_min_spread {
            Confidence::Low
        } else {
            Confidence::Moderate
        };
        (weighted, confidence)
    }
}
