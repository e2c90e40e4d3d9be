//! Least-squares trend fitting over the historical buffers
//!
//! Slope is in parameter units per hour of wall-clock time between samples,
//! so irregular refresh cadence does not distort the trend.

use statrs::distribution::{ContinuousCDF, StudentsT};
use std::collections::BTreeMap;
use tracing::debug;

use super::buffer::{HistoricalBuffer, TrendSample};
use crate::config::TrendConfig;
use crate::error::EngineError;
use crate::types::{SolarSnapshot, TrendConfidence, TrendDirection, TrendEstimate, TrendParameter};

/// Residual sum of squares below this is treated as a perfect fit.
const PERFECT_FIT_EPSILON: f64 = 1e-12;

/// Maintains one buffer per tracked parameter and fits trends on demand.
#[derive(Debug, Clone)]
pub struct TrendAnalyzer {
    buffers: BTreeMap<TrendParameter, HistoricalBuffer>,
    config: TrendConfig,
}

impl TrendAnalyzer {
    pub fn new(config: TrendConfig) -> Self {
        let buffers = TrendParameter::ALL
            .into_iter()
            .map(|p| (p, HistoricalBuffer::new(config.buffer_capacity)))
            .collect();
        Self { buffers, config }
    }

    /// Append one snapshot to every parameter buffer.
    ///
    /// Snapshots not newer than the latest buffered one are ignored, so a
    /// cached snapshot reused across cycles is counted once.
    pub fn append(&mut self, snapshot: &SolarSnapshot) -> bool {
        let newest = self
            .buffers
            .values()
            .filter_map(|b| b.latest())
            .map(|s| s.timestamp)
            .max();
        if newest.is_some_and(|t| snapshot.timestamp <= t) {
            debug!(timestamp = %snapshot.timestamp, "Snapshot already buffered, skipping");
            return false;
        }

        for (parameter, buffer) in &mut self.buffers {
            buffer.push(TrendSample {
                timestamp: snapshot.timestamp,
                value: parameter.extract(snapshot),
            });
        }
        true
    }

    pub fn sample_count(&self, parameter: TrendParameter) -> usize {
        self.buffers.get(&parameter).map_or(0, HistoricalBuffer::len)
    }

    /// Fit an OLS line to one parameter's buffer.
    ///
    /// Below `min_samples` the result is `InsufficientData` with no slope.
    pub fn compute_trend(&self, parameter: TrendParameter) -> TrendEstimate {
        let n = self.sample_count(parameter);
        match self.fit(parameter) {
            Ok(fit) => self.estimate_from_fit(parameter, n, &fit),
            Err(e) => {
                debug!(?parameter, error = %e, "Trend not fitted");
                TrendEstimate::insufficient(parameter, n)
            }
        }
    }

    fn fit(&self, parameter: TrendParameter) -> Result<LineFit, EngineError> {
        let needed = self.config.min_samples.max(2);
        let available = self.sample_count(parameter);
        let buffer = match self.buffers.get(&parameter) {
            Some(buffer) if available >= needed => buffer,
            _ => return Err(EngineError::InsufficientData { needed, available }),
        };

        let Some(origin) = buffer.iter().next().map(|s| s.timestamp) else {
            return Err(EngineError::InsufficientData { needed, available: 0 });
        };
        let points: Vec<(f64, f64)> = buffer
            .iter()
            .map(|s| ((s.timestamp - origin).num_seconds() as f64 / 3600.0, s.value))
            .collect();

        // All samples at one instant: a single usable point in time
        fit_line(&points).ok_or(EngineError::InsufficientData { needed, available: 1 })
    }

    fn estimate_from_fit(&self, parameter: TrendParameter, n: usize, fit: &LineFit) -> TrendEstimate {
        let confidence = if fit.r_squared >= self.config.r_squared_high {
            TrendConfidence::High
        } else if fit.r_squared >= self.config.r_squared_moderate {
            TrendConfidence::Moderate
        } else {
            TrendConfidence::Low
        };

        let direction = if fit.p_value > self.config.significance_level || fit.slope == 0.0 {
            TrendDirection::Stable
        } else if fit.slope > 0.0 {
            TrendDirection::Rising
        } else {
            TrendDirection::Falling
        };

        TrendEstimate {
            parameter,
            slope: Some(fit.slope),
            r_squared: Some(fit.r_squared),
            p_value: Some(fit.p_value),
            confidence,
            direction: Some(direction),
            sample_count: n,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct LineFit {
    slope: f64,
    r_squared: f64,
    p_value: f64,
}

/// Ordinary least squares with a two-sided t test on the slope.
///
/// Returns `None` when x has no spread.
fn fit_line(points: &[(f64, f64)]) -> Option<LineFit> {
    let n = points.len() as f64;
    let x_mean = points.iter().map(|p| p.0).sum::<f64>() / n;
    let y_mean = points.iter().map(|p| p.1).sum::<f64>() / n;

    let mut sxx = 0.0;
    let mut sxy = 0.0;
    let mut ss_tot = 0.0;
    for &(x, y) in points {
        sxx += (x - x_mean) * (x - x_mean);
        sxy += (x - x_mean) * (y - y_mean);
        ss_tot += (y - y_mean) * (y - y_mean);
    }
    if sxx.abs() < 1e-12 {
        return None;
    }

    let slope = sxy / sxx;
    let intercept = y_mean - slope * x_mean;
    let ss_res: f64 = points
        .iter()
        .map(|&(x, y)| {
            let r = y - (slope * x + intercept);
            r * r
        })
        .sum();

    // A constant series is fitted perfectly by a flat line
    let r_squared = if ss_tot < PERFECT_FIT_EPSILON {
        1.0
    } else {
        (1.0 - ss_res / ss_tot).clamp(0.0, 1.0)
    };

    let df = n - 2.0;
    let p_value = if ss_res < PERFECT_FIT_EPSILON {
        if slope.abs() < PERFECT_FIT_EPSILON { 1.0 } else { 0.0 }
    } else if df <= 0.0 {
        1.0
    } else {
        let std_err = (ss_res / df / sxx).sqrt();
        let t_stat = slope / std_err;
        match StudentsT::new(0.0, 1.0, df) {
            Ok(t_dist) => (2.0 * (1.0 - t_dist.cdf(t_stat.abs()))).clamp(0.0, 1.0),
            Err(_) => 1.0,
        }
    };

    Some(LineFit {
        slope,
        r_squared,
        p_value,
    })
}
