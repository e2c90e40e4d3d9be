//! Per-band summary of live activity samples

use std::collections::BTreeMap;

use crate::types::{Band, BandActivity, ValidationSample};

/// Group samples by band. Samples outside every band allocation are skipped.
pub fn summarize_activity(samples: &[ValidationSample]) -> BTreeMap<Band, BandActivity> {
    let mut summary: BTreeMap<Band, (BandActivity, f64, usize)> = BTreeMap::new();

    for sample in samples {
        let Some(band) = sample.band() else {
            continue;
        };
        let (activity, snr_sum, snr_count) = summary.entry(band).or_insert_with(|| {
            (
                BandActivity {
                    count: 0,
                    avg_snr: None,
                    max_distance_km: 0.0,
                    modes: Default::default(),
                    networks: Default::default(),
                },
                0.0,
                0,
            )
        });
        activity.count += 1;
        if sample.distance_km.is_finite() {
            activity.max_distance_km = activity.max_distance_km.max(sample.distance_km);
        }
        activity.modes.insert(sample.mode.to_uppercase());
        activity.networks.insert(sample.source_network.clone());
        if let Some(snr) = sample.snr.filter(|s| s.is_finite()) {
            *snr_sum += snr;
            *snr_count += 1;
        }
    }

    summary
        .into_iter()
        .map(|(band, (mut activity, snr_sum, snr_count))| {
            if snr_count > 0 {
                activity.avg_snr = Some(snr_sum / snr_count as f64);
            }
            (band, activity)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn spot(freq: f64, mode: &str, snr: Option<f64>, network: &str, km: f64) -> ValidationSample {
        ValidationSample {
            frequency: freq,
            mode: mode.into(),
            distance_km: km,
            snr,
            source_network: network.into(),
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn groups_by_band() {
        let samples = vec![
            spot(14.074, "ft8", Some(-10.0), "pskreporter", 2500.0),
            spot(14.025, "CW", Some(-4.0), "rbn", 6100.0),
            spot(14.300, "SSB", None, "dxcluster", 900.0),
            spot(7.074, "FT8", Some(-15.0), "pskreporter", 1200.0),
            // Between allocations
            spot(11.5, "FT8", Some(0.0), "pskreporter", 10.0),
        ];
        let summary = summarize_activity(&samples);
        assert_eq!(summary.len(), 2);

        let s20 = &summary[&Band::M20];
        assert_eq!(s20.count, 3);
        assert_eq!(s20.avg_snr, Some(-7.0));
        assert_eq!(s20.max_distance_km, 6100.0);
        assert!(s20.modes.contains("FT8"));
        assert_eq!(s20.networks.len(), 3);

        assert_eq!(summary[&Band::M40].count, 1);
    }

    #[test]
    fn no_snr_reported_leaves_average_empty() {
        let summary = summarize_activity(&[spot(28.074, "FT8", None, "rbn", 100.0)]);
        assert_eq!(summary[&Band::M10].avg_snr, None);
    }
}
