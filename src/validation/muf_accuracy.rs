//! MUF estimates checked against later ionosonde soundings

use chrono::{DateTime, Duration, Utc};
use std::collections::BTreeSet;
use tracing::debug;

use super::accuracy::ValidationEngine;
use crate::types::{AccuracyValue, IonosondeSounding, MufAccuracy, MufMethod, PropagationReport};

impl ValidationEngine {
    /// Compare past MUF estimates with soundings taken after them.
    ///
    /// A sounding scores the latest in-window report issued at or before it,
    /// provided it is no more than `muf_pair_max_lag_mins` later and within
    /// `muf_pair_max_distance_km` of the report's location. Stale and default
    /// estimates are not predictions and are skipped.
    pub fn score_muf_accuracy<'a>(
        &self,
        report_history: impl IntoIterator<Item = &'a PropagationReport>,
        soundings: &[IonosondeSounding],
        window: Duration,
        now: DateTime<Utc>,
    ) -> MufAccuracy {
        let window_secs = window.num_seconds();
        let cutoff = now - window;
        let max_lag_secs = (self.config().muf_pair_max_lag_mins * 60.0) as i64;
        let max_distance = self.config().muf_pair_max_distance_km;

        let mut reports: Vec<&PropagationReport> = report_history
            .into_iter()
            .filter(|r| r.timestamp >= cutoff && r.timestamp <= now)
            .filter(|r| matches!(r.muf_estimate.method, MufMethod::Measured | MufMethod::Formula))
            .collect();
        reports.sort_by_key(|r| r.timestamp);

        let mut abs_errors = Vec::new();
        let mut pct_errors = Vec::new();
        let mut m_factors = Vec::new();
        let mut stations = BTreeSet::new();

        for sounding in soundings {
            if sounding.validate().is_err() || sounding.timestamp > now || sounding.timestamp < cutoff {
                continue;
            }
            let Some(report) = reports.iter().rev().find(|r| r.timestamp <= sounding.timestamp) else {
                continue;
            };
            let lag = (sounding.timestamp - report.timestamp).num_seconds();
            if lag > max_lag_secs || sounding.distance_from(&report.location) > max_distance {
                continue;
            }

            let measured = sounding.derived_muf();
            let abs_error = (report.muf_estimate.value_mhz - measured).abs();
            abs_errors.push(abs_error);
            pct_errors.push(abs_error / measured * 100.0);
            if let Some(muf3000) = sounding.muf3000 {
                m_factors.push(muf3000 / sounding.fo_f2);
            }
            stations.insert(sounding.station_id.clone());
        }

        if abs_errors.is_empty() {
            debug!(reports = reports.len(), soundings = soundings.len(), "No report/sounding pairs to score MUF");
            return MufAccuracy::insufficient(window_secs);
        }

        let pairs = abs_errors.len();
        let mean_pct = mean(&pct_errors);
        let value = (100.0 * (1.0 - mean_pct / 100.0)).clamp(0.0, 100.0);
        debug!(pairs, mean_error_pct = mean_pct, score = value, "MUF accuracy scored");

        MufAccuracy {
            value: AccuracyValue::Score(value),
            pairs,
            mean_abs_error_mhz: Some(mean(&abs_errors)),
            mean_error_pct: Some(mean_pct),
            min_error_pct: pct_errors.iter().copied().reduce(f64::min),
            max_error_pct: pct_errors.iter().copied().reduce(f64::max),
            observed_m_factor: (!m_factors.is_empty()).then(|| mean(&m_factors)),
            stations: stations.into_iter().collect(),
            window_secs,
        }
    }
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}
