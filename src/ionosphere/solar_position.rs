//! Low-precision solar position (NOAA / Astronomical Almanac approximation)
//!
//! Accurate to roughly 0.01 degree in declination between 1950 and 2050,
//! far better than the day/night ramp needs.

use chrono::{DateTime, Datelike, Utc};

use crate::types::Location;

/// Elevation of the sun's centre at sunrise/sunset including refraction (degrees).
pub const HORIZON_ELEVATION_DEG: f64 = -0.833;

/// Julian days since the J2000.0 epoch.
fn days_since_j2000(now: DateTime<Utc>) -> f64 {
    // Unix epoch is JD 2440587.5; J2000.0 is JD 2451545.0
    let unix_days = now.timestamp_millis() as f64 / 86_400_000.0;
    unix_days + 2_440_587.5 - 2_451_545.0
}

/// Solar elevation above the horizon for an observer (degrees).
///
/// Formula:
/// - Mean longitude L = 280.460 + 0.9856474 n
/// - Mean anomaly g = 357.528 + 0.9856003 n
/// - Ecliptic longitude λ = L + 1.915 sin g + 0.020 sin 2g
/// - Declination δ = asin(sin ε sin λ)
/// - Hour angle H = GMST + longitude - right ascension
/// - sin(elev) = sin φ sin δ + cos φ cos δ cos H
pub fn solar_elevation_deg(location: &Location, now: DateTime<Utc>) -> f64 {
    let n = days_since_j2000(now);

    let mean_longitude = (280.460 + 0.985_647_4 * n).rem_euclid(360.0);
    let mean_anomaly = (357.528 + 0.985_600_3 * n).rem_euclid(360.0).to_radians();
    let ecliptic_longitude = (mean_longitude
        + 1.915 * mean_anomaly.sin()
        + 0.020 * (2.0 * mean_anomaly).sin())
    .to_radians();
    let obliquity = (23.439 - 0.000_000_4 * n).to_radians();

    let declination = (obliquity.sin() * ecliptic_longitude.sin()).asin();
    let right_ascension = (obliquity.cos() * ecliptic_longitude.sin()).atan2(ecliptic_longitude.cos());

    let gmst_deg = (280.460_618_37 + 360.985_647_366_29 * n).rem_euclid(360.0);
    let hour_angle = (gmst_deg + location.longitude).to_radians() - right_ascension;

    let lat = location.latitude.to_radians();
    let sin_elev = lat.sin() * declination.sin() + lat.cos() * declination.cos() * hour_angle.cos();
    sin_elev.clamp(-1.0, 1.0).asin().to_degrees()
}

/// Sun is above the refracted horizon.
pub fn is_daytime(location: &Location, now: DateTime<Utc>) -> bool {
    solar_elevation_deg(location, now) > HORIZON_ELEVATION_DEG
}

/// Continuous day weight in [0, 1] from solar elevation.
///
/// Smoothstep from `-half_width` (full night) to `+half_width` (full day),
/// so the MUF never jumps at the terminator.
pub fn day_weight(elevation_deg: f64, half_width_deg: f64) -> f64 {
    if half_width_deg <= 0.0 {
        return if elevation_deg > HORIZON_ELEVATION_DEG { 1.0 } else { 0.0 };
    }
    let t = ((elevation_deg + half_width_deg) / (2.0 * half_width_deg)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Day of year (1-366) used by the seasonal terms.
pub fn day_of_year(now: DateTime<Utc>) -> u32 {
    now.ordinal()
}
