//! Core BandOptimizer: band scores -> prioritized, overridable recommendation

use std::cmp::Ordering;
use std::collections::BTreeMap;

use tracing::info;

use crate::config::OptimizerConfig;
use crate::types::{
    Band, BandScore, OverrideReason, Recommendation, SolarSnapshot, TrendDirection, TrendEstimate,
};

use super::confidence::recommendation_confidence;

/// Bands forced to the top during a severe geomagnetic storm.
const STORM_BANDS: [Band; 4] = [Band::M160, Band::M80, Band::M40, Band::M6];

/// Bands forced to the top under exceptional solar flux, highest first.
const HIGH_FLUX_BANDS: [Band; 3] = [Band::M10, Band::M12, Band::M15];

/// Rationale lines listing individual bands stop after this many.
const RATIONALE_TOP_BANDS: usize = 3;

/// Turns band scores into an ordered recommendation.
#[derive(Debug, Clone)]
pub struct BandOptimizer {
    config: OptimizerConfig,
}

impl BandOptimizer {
    pub fn new(config: OptimizerConfig) -> Self {
        Self { config }
    }

    /// Rank bands and attach rationale and a confidence label.
    ///
    /// Override priority (highest first):
    /// 1. Severe geomagnetic storm: low HF and 6m to the top
    /// 2. Exceptional solar flux: 10m, 12m, 15m to the top
    /// 3. Default ranking by label, then score, then lower band
    pub fn recommend(
        &self,
        band_scores: &BTreeMap<Band, BandScore>,
        is_daytime: bool,
        trend: &TrendEstimate,
        data_completeness: f64,
        solar: &SolarSnapshot,
    ) -> Recommendation {
        let mut ordered: Vec<&BandScore> = band_scores.values().collect();
        ordered.sort_by(|a, b| default_order(a, b, is_daytime));

        let override_reason = if solar.k_index >= self.config.severe_storm_k_index {
            Some(OverrideReason::GeomagneticStorm)
        } else if solar.sfi >= self.config.high_flux_sfi {
            Some(OverrideReason::HighSolarFlux)
        } else {
            None
        };

        let ordered_bands: Vec<Band> = match override_reason {
            Some(OverrideReason::GeomagneticStorm) => promote(&ordered, |b| STORM_BANDS.contains(&b), None),
            Some(OverrideReason::HighSolarFlux) => promote(
                &ordered,
                |b| HIGH_FLUX_BANDS.contains(&b),
                Some(|a: &Band, b: &Band| b.cmp(a)),
            ),
            None => ordered.iter().map(|s| s.band).collect(),
        };

        let mut rationale = Vec::new();
        match override_reason {
            Some(OverrideReason::GeomagneticStorm) => {
                info!(k_index = solar.k_index, "Storm override engaged");
                rationale.push(format!(
                    "Severe geomagnetic storm (K={:.1}): prioritising 160m/80m/40m and 6m regardless of MUF",
                    solar.k_index
                ));
            }
            Some(OverrideReason::HighSolarFlux) => {
                info!(sfi = solar.sfi, "High-flux override engaged");
                rationale.push(format!(
                    "Exceptional solar flux (SFI={:.0}): prioritising 10m/12m/15m",
                    solar.sfi
                ));
            }
            None => {
                rationale.push(format!(
                    "Ranked by {} band quality from MUF",
                    if is_daytime { "daytime" } else { "night-time" }
                ));
            }
        }

        for band in ordered_bands.iter().take(RATIONALE_TOP_BANDS) {
            if let Some(score) = band_scores.get(band) {
                let (value, label) = score.current(is_daytime);
                rationale.push(format!("{band}: {label} ({value:.0}/100)"));
            }
        }

        rationale.push(trend_rationale(trend));
        rationale.push(format!("Data completeness {:.0}%", data_completeness * 100.0));

        Recommendation {
            ordered_bands,
            rationale,
            override_reason,
            confidence_label: recommendation_confidence(trend, data_completeness, &self.config),
        }
    }
}

/// Label descending, score descending, lower band first.
fn default_order(a: &BandScore, b: &BandScore, is_daytime: bool) -> Ordering {
    let (a_score, a_label) = a.current(is_daytime);
    let (b_score, b_label) = b.current(is_daytime);
    b_label
        .cmp(&a_label)
        .then_with(|| b_score.total_cmp(&a_score))
        .then_with(|| a.band.cmp(&b.band))
}

/// Stable-partition `ordered` so bands matching `forced` come first.
///
/// The forced group keeps the default order unless `reorder` is given.
fn promote(
    ordered: &[&BandScore],
    forced: impl Fn(Band) -> bool,
    reorder: Option<fn(&Band, &Band) -> Ordering>,
) -> Vec<Band> {
    let (mut head, tail): (Vec<Band>, Vec<Band>) =
        ordered.iter().map(|s| s.band).partition(|b| forced(*b));
    if let Some(cmp) = reorder {
        head.sort_by(cmp);
    }
    head.extend(tail);
    head
}

fn trend_rationale(trend: &TrendEstimate) -> String {
    match (trend.slope, trend.direction) {
        (Some(slope), Some(direction)) => {
            let word = match direction {
                TrendDirection::Rising => "rising",
                TrendDirection::Falling => "falling",
                TrendDirection::Stable => "stable",
            };
            format!(
                "{} trend {word} ({slope:+.2}/h, R² {:.2})",
                trend.parameter,
                trend.r_squared.unwrap_or(0.0)
            )
        }
        _ => format!(
            "{} trend: insufficient data ({} samples)",
            trend.parameter, trend.sample_count
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Confidence, Freshness, LabelThresholds, TrendConfidence, TrendParameter};
    use chrono::Utc;

    fn scores(values: &[(Band, f64)]) -> BTreeMap<Band, BandScore> {
        let t = LabelThresholds::default();
        values
            .iter()
            .map(|&(band, s)| {
                (
                    band,
                    BandScore {
                        band,
                        day_score: s,
                        night_score: 100.0 - s,
                        day_label: t.label_for(s),
                        night_label: t.label_for(100.0 - s),
                    },
                )
            })
            .collect()
    }

    fn full_scores() -> BTreeMap<Band, BandScore> {
        scores(&[
            (Band::M160, 20.0),
            (Band::M80, 35.0),
            (Band::M40, 70.0),
            (Band::M30, 85.0),
            (Band::M20, 95.0),
            (Band::M17, 90.0),
            (Band::M15, 75.0),
            (Band::M12, 55.0),
            (Band::M10, 45.0),
            (Band::M6, 0.0),
        ])
    }

    fn solar(sfi: f64, k: f64) -> SolarSnapshot {
        SolarSnapshot {
            sfi,
            a_index: 5.0,
            k_index: k,
            sunspot_number: 100.0,
            x_ray_flux: 1e-6,
            timestamp: Utc::now(),
            source: "test".into(),
            freshness: Freshness::Live,
        }
    }

    fn good_trend() -> TrendEstimate {
        TrendEstimate {
            parameter: TrendParameter::Sfi,
            slope: Some(0.4),
            r_squared: Some(0.9),
            p_value: Some(0.001),
            confidence: TrendConfidence::High,
            direction: Some(TrendDirection::Rising),
            sample_count: 48,
        }
    }

    #[test]
    fn default_order_by_label_then_score() {
        let opt = BandOptimizer::new(OptimizerConfig::default());
        let rec = opt.recommend(&full_scores(), true, &good_trend(), 1.0, &solar(140.0, 2.0));
        assert_eq!(rec.override_reason, None);
        assert_eq!(&rec.ordered_bands[..4], &[Band::M20, Band::M17, Band::M30, Band::M15]);
        assert_eq!(rec.confidence_label, Confidence::High);
        assert_eq!(rec.ordered_bands.len(), 10);
    }

    #[test]
    fn exact_tie_prefers_lower_band() {
        let opt = BandOptimizer::new(OptimizerConfig::default());
        let tied = scores(&[(Band::M15, 70.0), (Band::M20, 70.0), (Band::M40, 70.0)]);
        let rec = opt.recommend(&tied, true, &good_trend(), 1.0, &solar(140.0, 2.0));
        assert_eq!(rec.ordered_bands, vec![Band::M40, Band::M20, Band::M15]);
    }

    #[test]
    fn ordering_is_reproducible() {
        let opt = BandOptimizer::new(OptimizerConfig::default());
        let a = opt.recommend(&full_scores(), false, &good_trend(), 0.67, &solar(120.0, 3.0));
        let b = opt.recommend(&full_scores(), false, &good_trend(), 0.67, &solar(120.0, 3.0));
        assert_eq!(a, b);
    }

    #[test]
    fn storm_override_puts_low_and_vhf_first() {
        let opt = BandOptimizer::new(OptimizerConfig::default());
        let rec = opt.recommend(&full_scores(), true, &good_trend(), 1.0, &solar(250.0, 6.0));
        assert_eq!(rec.override_reason, Some(OverrideReason::GeomagneticStorm));
        for band in rec.top(4) {
            assert!(band.is_low() || band.is_vhf(), "{band} in storm top 4");
        }
        assert!(rec.rationale[0].contains("storm"));
    }

    #[test]
    fn flux_override_puts_highest_bands_first() {
        let opt = BandOptimizer::new(OptimizerConfig::default());
        let rec = opt.recommend(&full_scores(), true, &good_trend(), 1.0, &solar(230.0, 2.0));
        assert_eq!(rec.override_reason, Some(OverrideReason::HighSolarFlux));
        assert_eq!(rec.top(3), &[Band::M10, Band::M12, Band::M15]);
        // Remaining bands keep default order
        assert_eq!(rec.ordered_bands[3], Band::M20);
    }

    #[test]
    fn insufficient_trend_lowers_confidence() {
        let opt = BandOptimizer::new(OptimizerConfig::default());
        let trend = TrendEstimate::insufficient(TrendParameter::Sfi, 2);
        let rec = opt.recommend(&full_scores(), true, &trend, 1.0, &solar(140.0, 2.0));
        assert_eq!(rec.confidence_label, Confidence::Moderate);
        assert!(rec.rationale.iter().any(|r| r.contains("insufficient data")));
    }
}
