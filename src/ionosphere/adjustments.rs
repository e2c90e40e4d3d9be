//! Heuristic MUF curves and multiplicative corrections
//!
//! Every function here is pure and continuous in its inputs; the model
//! applies them in a fixed order (seasonal, solar cycle, diurnal,
//! geomagnetic latitude).

use std::f64::consts::PI;

use crate::config::IonosphereConfig;
use crate::types::SolarCyclePhase;

/// Knots of the SFI -> base foF2 curve (sfu, MHz). Flat beyond the last knot.
const CRITICAL_FREQUENCY_CURVE: [(f64, f64); 6] = [
    (0.0, 4.0),
    (60.0, 6.0),
    (100.0, 8.5),
    (150.0, 11.0),
    (200.0, 13.0),
    (300.0, 15.5),
];

/// Base F2 critical frequency for a solar flux (MHz).
///
/// Piecewise-linear and monotonic non-decreasing in SFI.
pub fn base_critical_frequency(sfi: f64) -> f64 {
    let sfi = if sfi.is_finite() { sfi.max(0.0) } else { 0.0 };
    for pair in CRITICAL_FREQUENCY_CURVE.windows(2) {
        let (x0, y0) = pair[0];
        let (x1, y1) = pair[1];
        if sfi <= x1 {
            return y0 + (y1 - y0) * (sfi - x0) / (x1 - x0);
        }
    }
    CRITICAL_FREQUENCY_CURVE[CRITICAL_FREQUENCY_CURVE.len() - 1].1
}

/// foF2 -> MUF multiplier: 2.5 in quiet conditions, falling to 2.0 at K >= 6.
pub fn formula_multiplier(k_index: f64) -> f64 {
    let t = ((k_index - 2.0) / 4.0).clamp(0.0, 1.0);
    2.5 - 0.5 * t
}

/// Weight of the seasonal terms for a geographic latitude.
///
/// Strongest at mid-latitudes (40 deg), floored at 0.2 near the equator and poles.
fn seasonal_latitude_weight(latitude: f64) -> f64 {
    (1.0 - (latitude.abs() - 40.0).abs() / 50.0).clamp(0.2, 1.0)
}

/// Seasonal factor from day of year.
///
/// Semi-annual term peaks at the equinoxes; annual term models the winter
/// anomaly and flips sign between hemispheres.
pub fn seasonal_factor(latitude: f64, day_of_year: u32, cfg: &IonosphereConfig) -> f64 {
    let doy = f64::from(day_of_year);
    let semiannual = (4.0 * PI * (doy - 80.0) / 365.25).cos();
    // +1 at the December solstice, -1 at the June solstice
    let annual = -(2.0 * PI * (doy - 172.0) / 365.25).cos();
    let hemisphere = if latitude >= 0.0 { 1.0 } else { -1.0 };

    let weight = seasonal_latitude_weight(latitude);
    1.0 + weight
        * (cfg.seasonal_semiannual_amplitude * semiannual
            + cfg.seasonal_annual_amplitude * annual * hemisphere)
}

/// Solar-cycle factor bucketed from SFI.
pub fn solar_cycle_factor(sfi: f64) -> f64 {
    SolarCyclePhase::from_sfi(sfi).muf_factor()
}

/// Diurnal factor: `night_factor` at night, 1.0 by day, smooth ramp between.
pub fn diurnal_factor(solar_elevation_deg: f64, cfg: &IonosphereConfig) -> f64 {
    let w = super::solar_position::day_weight(solar_elevation_deg, cfg.diurnal_ramp_half_width_deg);
    cfg.night_factor + (1.0 - cfg.night_factor) * w
}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t.clamp(0.0, 1.0)
}

/// Geomagnetic-latitude factor.
///
/// | abs(mlat)  | factor                          |
/// |------------|---------------------------------|
/// | <= 15      | equatorial enhancement          |
/// | 15 - 30    | ramp to 1.0                     |
/// | 30 - 55    | 1.0                             |
/// | 55 - 65    | ramp to auroral suppression     |
/// | >= 65      | auroral suppression             |
///
/// Above K=3 the high-latitude side is depressed further, scaled by how far
/// poleward the observer sits (zero at 45 deg, full at 65 deg).
pub fn geomagnetic_latitude_factor(geomagnetic_latitude: f64, k_index: f64, cfg: &IonosphereConfig) -> f64 {
    let m = geomagnetic_latitude.abs();
    let base = if m <= 15.0 {
        cfg.equatorial_enhancement
    } else if m <= 30.0 {
        lerp(cfg.equatorial_enhancement, 1.0, (m - 15.0) / 15.0)
    } else if m <= 55.0 {
        1.0
    } else if m <= 65.0 {
        lerp(1.0, cfg.auroral_suppression, (m - 55.0) / 10.0)
    } else {
        cfg.auroral_suppression
    };

    let poleward = ((m - 45.0) / 20.0).clamp(0.0, 1.0);
    let storm_depression = 1.0 - 0.04 * (k_index - 3.0).max(0.0) * poleward;
    base * storm_depression.max(0.5)
}
