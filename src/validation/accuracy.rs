//! Accuracy scoring of past recommendations against live activity
//!
//! Each past report contributes its top recommended bands as predictions.
//! A prediction is confirmed when at least one live sample on that band
//! arrives at or after the report and inside the window. Weights decay with
//! a half-life: older predictions count for less, and a confirmation earns
//! credit by the age of its freshest confirming sample. Predictions confirmed
//! by two or more independent networks earn a diversity bonus.

use chrono::{DateTime, Duration, Utc};
use std::collections::BTreeSet;
use tracing::debug;

use crate::config::ValidationConfig;
use crate::types::{AccuracyScore, AccuracyValue, Band, PropagationReport, ValidationSample};

/// The bands one past report recommended, and when.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub issued_at: DateTime<Utc>,
    pub bands: Vec<Band>,
}

impl Prediction {
    pub fn from_report(report: &PropagationReport, top_n: usize) -> Self {
        Self {
            issued_at: report.timestamp,
            bands: report.recommendation.top(top_n).to_vec(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ValidationEngine {
    config: ValidationConfig,
}

impl ValidationEngine {
    pub fn new(config: ValidationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    /// Score the report history against live samples within `window` of `now`.
    pub fn score_accuracy<'a>(
        &self,
        report_history: impl IntoIterator<Item = &'a PropagationReport>,
        samples: &[ValidationSample],
        window: Duration,
        now: DateTime<Utc>,
    ) -> AccuracyScore {
        let predictions: Vec<Prediction> = report_history
            .into_iter()
            .map(|r| Prediction::from_report(r, self.config.top_bands))
            .collect();
        self.score_predictions(&predictions, samples, window, now)
    }

    /// Score explicit predictions. Returns the insufficient-data sentinel
    /// when no samples or no predictions fall inside the window.
    pub fn score_predictions(
        &self,
        predictions: &[Prediction],
        samples: &[ValidationSample],
        window: Duration,
        now: DateTime<Utc>,
    ) -> AccuracyScore {
        let window_secs = window.num_seconds();
        let cutoff = now - window;
        let in_window = |t: DateTime<Utc>| t >= cutoff && t <= now;

        let recent_samples: Vec<&ValidationSample> =
            samples.iter().filter(|s| in_window(s.timestamp)).collect();
        let recent_predictions: Vec<&Prediction> =
            predictions.iter().filter(|p| in_window(p.issued_at)).collect();

        if recent_samples.is_empty() || recent_predictions.is_empty() {
            debug!(
                samples = recent_samples.len(),
                predictions = recent_predictions.len(),
                "Not enough data in window to score accuracy"
            );
            return AccuracyScore::insufficient(window_secs);
        }

        let mut total_weight = 0.0;
        let mut confirmed_weight = 0.0;
        let mut diverse_weight = 0.0;
        let mut checked = 0;
        let mut confirmed = 0;
        let mut sources: BTreeSet<String> = BTreeSet::new();

        for prediction in recent_predictions {
            let weight = self.decay_weight(now - prediction.issued_at);
            for &band in &prediction.bands {
                checked += 1;
                total_weight += weight;

                let confirming: Vec<&ValidationSample> = recent_samples
                    .iter()
                    .copied()
                    .filter(|s| s.timestamp >= prediction.issued_at && s.band() == Some(band))
                    .collect();
                let Some(freshest) = confirming.iter().map(|s| s.timestamp).max() else {
                    continue;
                };
                let networks: BTreeSet<&str> = confirming.iter().map(|s| s.source_network.as_str()).collect();

                let credit = weight * self.decay_weight(now - freshest);
                confirmed += 1;
                confirmed_weight += credit;
                if networks.len() >= 2 {
                    diverse_weight += credit;
                }
                sources.extend(networks.into_iter().map(str::to_string));
            }
        }

        if checked == 0 || total_weight <= 0.0 {
            return AccuracyScore::insufficient(window_secs);
        }

        let base = 100.0 * confirmed_weight / total_weight;
        let bonus = self.config.diversity_bonus * diverse_weight / total_weight;
        let value = (base + bonus).clamp(0.0, 100.0);

        debug!(checked, confirmed, score = value, "Accuracy scored");
        AccuracyScore {
            value: AccuracyValue::Score(value),
            contributing_sources: sources.into_iter().collect(),
            window_secs,
            predictions_checked: checked,
            predictions_confirmed: confirmed,
        }
    }

    /// 0.5 ^ (age / half_life); ages in the future count as fresh.
    /// Applied to both prediction age and confirming-sample age.
    fn decay_weight(&self, age: Duration) -> f64 {
        let age_hours = (age.num_seconds().max(0) as f64) / 3600.0;
        let half_life = self.config.half_life_hours.max(f64::EPSILON);
        0.5_f64.powf(age_hours / half_life)
    }
}
