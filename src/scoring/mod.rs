//! Band Quality Engine
//!
//! Scores every band for day and night on a 0-100 scale from the MUF
//! estimate and geomagnetic state. Pure functions only: identical inputs
//! always produce an identical mapping.
//!
//! ## Score = MUF ratio score x storm multiplier x diurnal multiplier
//!
//! - **MUF ratio**: f / MUF. Comfortable below 0.6, degrading through 0.85
//!   and 1.0, dead above 1.15.
//! - **Storm**: penalty grows with K above 2 and with frequency.
//! - **Diurnal**: D-layer absorption hits low bands by day; high bands
//!   close at night.
//! - **Flare**: M/X-class X-ray flux adds sunlit-side absorption to the day
//!   score, worst on the low bands.

use std::collections::BTreeMap;

use crate::config::ScoringConfig;
use crate::types::{clip_muf, Band, BandScore, GeomagneticState, MufEstimate, SolarSnapshot};

/// Daytime multiplier: absorption on the low bands.
fn day_multiplier(band: Band) -> f64 {
    match band {
        Band::M160 => 0.45,
        Band::M80 => 0.60,
        Band::M40 => 0.85,
        _ => 1.0,
    }
}

/// Night multiplier: low bands favoured, high bands fade even under the MUF.
fn night_multiplier(band: Band) -> f64 {
    match band {
        Band::M160 | Band::M80 | Band::M40 => 1.0,
        Band::M30 | Band::M20 => 0.95,
        Band::M17 => 0.85,
        Band::M15 => 0.75,
        Band::M12 => 0.70,
        Band::M10 => 0.65,
        Band::M6 => 0.60,
    }
}

/// Score from the frequency / MUF ratio, piecewise-linear and non-increasing.
///
/// | ratio       | score      |
/// |-------------|------------|
/// | <= 0.60     | 100        |
/// | 0.60 - 0.85 | 100 -> 80  |
/// | 0.85 - 1.00 | 80 -> 45   |
/// | 1.00 - 1.15 | 45 -> 0    |
/// | > 1.15      | 0          |
pub fn muf_ratio_score(frequency_mhz: f64, muf_mhz: f64) -> f64 {
    let ratio = frequency_mhz / muf_mhz.max(f64::EPSILON);
    if ratio <= 0.60 {
        100.0
    } else if ratio <= 0.85 {
        100.0 - 20.0 * (ratio - 0.60) / 0.25
    } else if ratio <= 1.0 {
        80.0 - 35.0 * (ratio - 0.85) / 0.15
    } else if ratio <= 1.15 {
        45.0 - 45.0 * (ratio - 1.0) / 0.15
    } else {
        0.0
    }
}

/// Storm multiplier in [1 - max_penalty, 1].
///
/// Zero penalty at K <= 2; at K = 9 the top of HF loses `max_penalty`, while
/// the low bands lose only 30% of that.
pub fn storm_multiplier(frequency_mhz: f64, k_index: f64, max_penalty: f64) -> f64 {
    let severity = ((k_index - 2.0).max(0.0) / 7.0).min(1.0);
    let frequency_weight = 0.3 + 0.7 * (frequency_mhz / 30.0).min(1.0);
    1.0 - max_penalty * severity * frequency_weight
}

/// Day and night MUF for one call.
///
/// The estimate describes "now"; the other half of the day is derived with
/// the configured night ratio.
pub fn day_night_muf(muf: &MufEstimate, is_daytime: bool, night_ratio: f64) -> (f64, f64) {
    if is_daytime {
        (muf.value_mhz, clip_muf(muf.value_mhz * night_ratio))
    } else {
        (clip_muf(muf.value_mhz / night_ratio), muf.value_mhz)
    }
}

/// Daytime absorption from a solar flare (GOES long-channel flux, W/m^2).
pub fn flare_multiplier(frequency_mhz: f64, x_ray_flux: f64) -> f64 {
    let high_band_relief = (frequency_mhz / 30.0).min(1.0);
    if x_ray_flux >= 1.0e-4 {
        0.5 + 0.5 * high_band_relief
    } else if x_ray_flux >= 1.0e-5 {
        0.8 + 0.2 * high_band_relief
    } else {
        1.0
    }
}

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

/// Score every band for day and night.
pub fn score_bands(
    muf: &MufEstimate,
    solar: &SolarSnapshot,
    geomagnetic: &GeomagneticState,
    is_daytime: bool,
    config: &ScoringConfig,
) -> BTreeMap<Band, BandScore> {
    let (day_muf, night_muf) = day_night_muf(muf, is_daytime, config.night_muf_ratio);
    let thresholds = &config.thresholds;

    Band::ALL
        .into_iter()
        .map(|band| {
            let f = band.frequency_mhz();
            let storm = storm_multiplier(f, geomagnetic.k_index, config.max_storm_penalty);
            let flare = flare_multiplier(f, solar.x_ray_flux);

            let day_score =
                round1((muf_ratio_score(f, day_muf) * storm * flare * day_multiplier(band)).clamp(0.0, 100.0));
            let night_score =
                round1((muf_ratio_score(f, night_muf) * storm * night_multiplier(band)).clamp(0.0, 100.0));

            let score = BandScore {
                band,
                day_score,
                night_score,
                day_label: thresholds.label_for(day_score),
                night_label: thresholds.label_for(night_score),
            };
            (band, score)
        })
        .collect()
}
