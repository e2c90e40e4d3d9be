//! Normalized upstream readings: location, solar snapshot, ionosonde soundings

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

// ============================================================================
// Location
// ============================================================================

/// Observer location in geographic coordinates (degrees, east-positive longitude).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

impl Location {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Great-circle distance to another point (km).
    pub fn distance_km(&self, lat: f64, lon: f64) -> f64 {
        const EARTH_RADIUS_KM: f64 = 6371.0;

        let lat1 = self.latitude.to_radians();
        let lat2 = lat.to_radians();
        let d_lat = (lat - self.latitude).to_radians();
        let d_lon = (lon - self.longitude).to_radians();

        let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
        EARTH_RADIUS_KM * c
    }

    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=360.0).contains(&self.longitude)
    }
}

// ============================================================================
// Solar Snapshot
// ============================================================================

/// How current a snapshot is relative to the cycle that uses it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Freshness {
    /// Fetched this cycle
    #[default]
    Live,
    /// Reused from the last good report because the feed was unavailable
    Cached,
    /// Built-in quiet-sun values; no feed data at all
    Fallback,
}

/// One fetch cycle's solar and geomagnetic indices. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolarSnapshot {
    /// 10.7 cm solar flux index (sfu)
    pub sfi: f64,
    /// Planetary A-index
    pub a_index: f64,
    /// Planetary K-index (0-9)
    pub k_index: f64,
    pub sunspot_number: f64,
    /// GOES long-channel X-ray flux (W/m^2)
    pub x_ray_flux: f64,
    pub timestamp: DateTime<Utc>,
    pub source: String,
    #[serde(default)]
    pub freshness: Freshness,
}

impl SolarSnapshot {
    /// Quiet-sun values used when no solar feed has ever answered.
    pub fn fallback(now: DateTime<Utc>) -> Self {
        Self {
            sfi: 100.0,
            a_index: 5.0,
            k_index: 2.0,
            sunspot_number: 50.0,
            x_ray_flux: 1.0e-7,
            timestamp: now,
            source: "fallback".to_string(),
            freshness: Freshness::Fallback,
        }
    }

    /// Copy of this snapshot re-tagged with a different freshness.
    pub fn with_freshness(&self, freshness: Freshness) -> Self {
        Self {
            freshness,
            ..self.clone()
        }
    }

    /// Schema check. A snapshot failing this is dropped as a malformed reading.
    pub fn validate(&self) -> Result<(), EngineError> {
        let fields = [
            ("sfi", self.sfi),
            ("a_index", self.a_index),
            ("k_index", self.k_index),
            ("sunspot_number", self.sunspot_number),
            ("x_ray_flux", self.x_ray_flux),
        ];
        for (name, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(EngineError::MalformedReading(format!(
                    "solar snapshot from {}: {name} = {value} is not a finite non-negative number",
                    self.source
                )));
            }
        }
        if self.k_index > 9.0 {
            return Err(EngineError::MalformedReading(format!(
                "solar snapshot from {}: k_index = {} exceeds 9",
                self.source, self.k_index
            )));
        }
        if self.sfi > 1000.0 {
            return Err(EngineError::MalformedReading(format!(
                "solar snapshot from {}: sfi = {} is implausible",
                self.source, self.sfi
            )));
        }
        Ok(())
    }
}

// ============================================================================
// Ionosonde Sounding
// ============================================================================

/// A single ionosonde measurement near the observer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IonosondeSounding {
    pub station_id: String,
    pub lat: f64,
    pub lon: f64,
    /// F2 critical frequency (MHz)
    #[serde(rename = "foF2")]
    pub fo_f2: f64,
    /// MUF for a 3000 km path (MHz), when the station reports it
    #[serde(default)]
    pub muf3000: Option<f64>,
    pub timestamp: DateTime<Utc>,
    /// Distance to the observer (km), if the collaborator already computed it
    #[serde(default)]
    pub distance_to_observer: Option<f64>,
}

impl IonosondeSounding {
    /// Schema check. Failing soundings are dropped; the rest are still used.
    pub fn validate(&self) -> Result<(), EngineError> {
        let bad = |reason: String| {
            Err(EngineError::MalformedReading(format!(
                "sounding {}: {reason}",
                self.station_id
            )))
        };

        if !self.lat.is_finite() || !(-90.0..=90.0).contains(&self.lat) {
            return bad(format!("latitude {} out of range", self.lat));
        }
        if !self.lon.is_finite() || !(-180.0..=360.0).contains(&self.lon) {
            return bad(format!("longitude {} out of range", self.lon));
        }
        if !self.fo_f2.is_finite() || self.fo_f2 <= 0.0 || self.fo_f2 > 30.0 {
            return bad(format!("foF2 {} outside (0, 30] MHz", self.fo_f2));
        }
        if let Some(muf) = self.muf3000 {
            if !muf.is_finite() || muf <= 0.0 || muf > 80.0 {
                return bad(format!("MUF(3000) {muf} outside (0, 80] MHz"));
            }
        }
        if let Some(d) = self.distance_to_observer {
            if !d.is_finite() || d < 0.0 {
                return bad(format!("distance {d} is negative or non-finite"));
            }
        }
        Ok(())
    }

    /// MUF(3000) as reported, or derived from foF2 with the standard M-factor.
    pub fn derived_muf(&self) -> f64 {
        const M_FACTOR_3000: f64 = 3.0;
        self.muf3000.unwrap_or(self.fo_f2 * M_FACTOR_3000)
    }

    /// Distance to the observer, computing it when the collaborator left it empty.
    pub fn distance_from(&self, observer: &Location) -> f64 {
        self.distance_to_observer.unwrap_or_else(|| {
            // Some networks publish 0..360 longitudes
            let lon = if self.lon > 180.0 { self.lon - 360.0 } else { self.lon };
            observer.distance_km(self.lat, lon)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sounding(fo_f2: f64, muf3000: Option<f64>) -> IonosondeSounding {
        IonosondeSounding {
            station_id: "BC840".to_string(),
            lat: 40.0,
            lon: -105.3,
            fo_f2,
            muf3000,
            timestamp: Utc.with_ymd_and_hms(2024, 3, 20, 18, 0, 0).unwrap(),
            distance_to_observer: None,
        }
    }

    #[test]
    fn haversine_known_distance() {
        // Boulder -> Washington DC is roughly 2400 km
        let boulder = Location::new(40.0, -105.3);
        let d = boulder.distance_km(38.9, -77.0);
        assert!((2300.0..2500.0).contains(&d), "got {d}");
    }

    #[test]
    fn derived_muf_prefers_reported_value() {
        assert_eq!(sounding(7.0, Some(24.0)).derived_muf(), 24.0);
        assert_eq!(sounding(7.0, None).derived_muf(), 21.0);
    }

    #[test]
    fn sounding_validation_rejects_bad_fof2() {
        assert!(sounding(0.0, None).validate().is_err());
        assert!(sounding(f64::NAN, None).validate().is_err());
        assert!(sounding(7.0, Some(-1.0)).validate().is_err());
        assert!(sounding(7.0, Some(22.0)).validate().is_ok());
    }

    #[test]
    fn distance_handles_0_360_longitudes() {
        let observer = Location::new(40.0, -100.0);
        let mut s = sounding(7.0, None);
        s.lon = 254.7; // == -105.3
        let d = s.distance_from(&observer);
        let direct = observer.distance_km(40.0, -105.3);
        assert!((d - direct).abs() < 1.0);
    }

    #[test]
    fn snapshot_validation() {
        let now = Utc::now();
        let mut snap = SolarSnapshot::fallback(now);
        assert!(snap.validate().is_ok());
        snap.k_index = 12.0;
        assert!(snap.validate().is_err());
        snap.k_index = 2.0;
        snap.sfi = f64::INFINITY;
        assert!(snap.validate().is_err());
    }
}
