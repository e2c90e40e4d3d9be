//! Recommendation confidence from trend quality and data completeness

use crate::config::OptimizerConfig;
use crate::types::{Confidence, TrendConfidence, TrendEstimate};

/// Combine trend confidence and data completeness into one label.
///
/// Both inputs must be adequate for `High`; the weaker of the two wins.
/// An insufficient-data trend drops the completeness level by one step.
pub fn recommendation_confidence(
    trend: &TrendEstimate,
    data_completeness: f64,
    config: &OptimizerConfig,
) -> Confidence {
    let completeness = completeness_level(data_completeness, config);
    match trend_level(trend.confidence) {
        Some(level) => level.min(completeness),
        None => completeness.downgrade(),
    }
}

/// Completeness: >= high bucket -> High, >= moderate bucket -> Moderate, else Low.
fn completeness_level(data_completeness: f64, config: &OptimizerConfig) -> Confidence {
    if !data_completeness.is_finite() || data_completeness <= 0.0 {
        return Confidence::None;
    }
    if data_completeness >= config.high_completeness {
        Confidence::High
    } else if data_completeness >= config.moderate_completeness {
        Confidence::Moderate
    } else {
        Confidence::Low
    }
}

/// `None` when the trend could not be fitted.
fn trend_level(confidence: TrendConfidence) -> Option<Confidence> {
    match confidence {
        TrendConfidence::High => Some(Confidence::High),
        TrendConfidence::Moderate => Some(Confidence::Moderate),
        TrendConfidence::Low => Some(Confidence::Low),
        TrendConfidence::InsufficientData => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{TrendDirection, TrendParameter};

    fn trend(confidence: TrendConfidence) -> TrendEstimate {
        if confidence == TrendConfidence::InsufficientData {
            return TrendEstimate::insufficient(TrendParameter::Sfi, 3);
        }
        TrendEstimate {
            parameter: TrendParameter::Sfi,
            slope: Some(0.5),
            r_squared: Some(0.8),
            p_value: Some(0.01),
            confidence,
            direction: Some(TrendDirection::Rising),
            sample_count: 24,
        }
    }

    #[test]
    fn high_needs_both_inputs_adequate() {
        let cfg = OptimizerConfig::default();
        assert_eq!(recommendation_confidence(&trend(TrendConfidence::High), 1.0, &cfg), Confidence::High);
        assert_eq!(
            recommendation_confidence(&trend(TrendConfidence::High), 0.67, &cfg),
            Confidence::Moderate
        );
        assert_eq!(recommendation_confidence(&trend(TrendConfidence::Low), 1.0, &cfg), Confidence::Low);
    }

    #[test]
    fn insufficient_trend_downgrades_one_level() {
        let cfg = OptimizerConfig::default();
        let insufficient = trend(TrendConfidence::InsufficientData);
        assert_eq!(recommendation_confidence(&insufficient, 1.0, &cfg), Confidence::Moderate);
        assert_eq!(recommendation_confidence(&insufficient, 0.6, &cfg), Confidence::Low);
        assert_eq!(recommendation_confidence(&insufficient, 0.3, &cfg), Confidence::None);
    }

    #[test]
    fn no_data_is_no_confidence() {
        let cfg = OptimizerConfig::default();
        assert_eq!(recommendation_confidence(&trend(TrendConfidence::High), 0.0, &cfg), Confidence::None);
    }
}
