//! Report generator: one complete forecast cycle
//!
//! Fetches the three upstream sources in parallel (each under a timeout and
//! gated by its cache namespace), then runs the synchronous engine stages in
//! fixed order and publishes the finished report.

use arc_swap::ArcSwapOption;
use chrono::{DateTime, Utc};
use std::collections::VecDeque;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

use super::feed::UpstreamFeed;
use crate::alerts;
use crate::cache::CacheManager;
use crate::config::{defaults, SkywaveConfig};
use crate::error::EngineError;
use crate::ionosphere::{geomagnetic_state, solar_elevation_deg, IonosphereModel, HORIZON_ELEVATION_DEG};
use crate::optimization::BandOptimizer;
use crate::scoring::score_bands;
use crate::trends::TrendAnalyzer;
use crate::types::{
    Freshness, IonosondeSounding, MufMethod, PropagationReport, ReportStatus, SolarCyclePhase, SolarSnapshot,
    TrendEstimate, TrendParameter, ValidationSample,
};
use crate::validation::{summarize_activity, ValidationEngine};

/// Expected upstream sources per cycle, for data completeness.
const EXPECTED_SOURCES: usize = 3;

const SOURCE_SOLAR: &str = "solar";
const SOURCE_IONOSONDE: &str = "ionosonde";
const SOURCE_SPOTS: &str = "spots";

/// Outcome of the parallel upstream fetch.
#[derive(Debug)]
pub struct UpstreamInputs {
    pub solar: Result<SolarSnapshot, EngineError>,
    pub soundings: Result<Vec<IonosondeSounding>, EngineError>,
    pub samples: Result<Vec<ValidationSample>, EngineError>,
}

impl UpstreamInputs {
    pub fn all_failed(&self) -> bool {
        self.solar.is_err() && self.soundings.is_err() && self.samples.is_err()
    }
}

/// Owns the engine stages plus the only mutable shared state: the trend
/// buffers, the report history and the last published report.
pub struct ReportGenerator {
    config: SkywaveConfig,
    feed: Arc<dyn UpstreamFeed>,
    cache: Arc<CacheManager>,
    ionosphere: IonosphereModel,
    optimizer: BandOptimizer,
    validation: ValidationEngine,
    trends: Mutex<TrendAnalyzer>,
    history: Mutex<VecDeque<Arc<PropagationReport>>>,
    last_good: ArcSwapOption<PropagationReport>,
}

impl ReportGenerator {
    pub fn new(config: SkywaveConfig, feed: Arc<dyn UpstreamFeed>, cache: Arc<CacheManager>) -> Self {
        Self {
            ionosphere: IonosphereModel::new(config.ionosphere.clone()),
            optimizer: BandOptimizer::new(config.optimizer.clone()),
            validation: ValidationEngine::new(config.validation.clone()),
            trends: Mutex::new(TrendAnalyzer::new(config.trends.clone())),
            history: Mutex::new(VecDeque::with_capacity(config.validation.report_history)),
            last_good: ArcSwapOption::empty(),
            config,
            feed,
            cache,
        }
    }

    pub fn config(&self) -> &SkywaveConfig {
        &self.config
    }

    pub fn feed_name(&self) -> &str {
        self.feed.name()
    }

    /// Most recently published report, if any.
    pub fn last_good(&self) -> Option<Arc<PropagationReport>> {
        self.last_good.load_full()
    }

    /// Recent reports, oldest first.
    pub fn history(&self) -> Vec<Arc<PropagationReport>> {
        lock(&self.history).iter().cloned().collect()
    }

    // ========================================================================
    // Upstream
    // ========================================================================

    /// Run `fetch` under the upstream timeout, through the cache namespace.
    async fn fetch_cached<T, Fut>(&self, namespace: &str, key: &str, fetch: Fut) -> Result<T, EngineError>
    where
        T: serde::Serialize + serde::de::DeserializeOwned,
        Fut: Future<Output = anyhow::Result<T>>,
    {
        let limit = self.config.scheduler.upstream_timeout();
        let result = self
            .cache
            .get_or_insert_with(namespace, key, || async move {
                match timeout(limit, fetch).await {
                    Ok(result) => result,
                    Err(_) => Err(anyhow::anyhow!("timed out after {}s", limit.as_secs())),
                }
            })
            .await;
        result.map_err(|e| {
            let err = EngineError::upstream(format!("{}/{namespace}", self.feed.name()), e);
            warn!(error = %err, "Upstream fetch failed, degrading");
            err
        })
    }

    /// Fetch all three sources in parallel.
    pub async fn fetch_inputs(&self) -> UpstreamInputs {
        let location = self.config.station.location();
        let location_key = format!("{:.2},{:.2}", location.latitude, location.longitude);

        let (solar, soundings, samples) = futures::join!(
            self.fetch_cached(defaults::NAMESPACE_SOLAR, "latest", self.feed.fetch_solar()),
            self.fetch_cached(defaults::NAMESPACE_IONOSONDE, &location_key, self.feed.fetch_soundings(&location)),
            self.fetch_validation_samples(),
        );
        UpstreamInputs {
            solar,
            soundings,
            samples,
        }
    }

    /// Live-activity samples through the spots cache. Also used by the
    /// spots refresh task to keep that namespace warm.
    pub async fn fetch_validation_samples(&self) -> Result<Vec<ValidationSample>, EngineError> {
        self.fetch_cached(defaults::NAMESPACE_SPOTS, "latest", self.feed.fetch_validation_samples())
            .await
    }

    // ========================================================================
    // Generation
    // ========================================================================

    /// Produce and publish one report.
    ///
    /// Fails with `ForecastUnavailable` only when every upstream source
    /// failed and no report has ever been published.
    pub async fn generate(&self, now: DateTime<Utc>) -> Result<Arc<PropagationReport>, EngineError> {
        let inputs = self.fetch_inputs().await;
        let report = Arc::new(self.build_report(inputs, now)?);
        self.publish(Arc::clone(&report));
        Ok(report)
    }

    /// Run the engine stages on already-fetched inputs. Pure apart from the
    /// trend buffer append.
    pub fn build_report(&self, inputs: UpstreamInputs, now: DateTime<Utc>) -> Result<PropagationReport, EngineError> {
        let previous = self.last_good();
        if inputs.all_failed() && previous.is_none() {
            error!("All upstream sources failed and no previous report exists");
            return Err(EngineError::ForecastUnavailable);
        }

        let location = self.config.station.location();
        let mut missing_sources = Vec::new();

        let live_solar = match inputs.solar {
            Ok(snapshot) => match snapshot.validate() {
                Ok(()) => Some(snapshot),
                Err(e) => {
                    warn!(error = %e, "Dropping malformed solar snapshot");
                    None
                }
            },
            Err(_) => None,
        };
        if live_solar.is_none() {
            missing_sources.push(SOURCE_SOLAR.to_string());
        }
        let soundings = inputs.soundings.unwrap_or_else(|_| {
            missing_sources.push(SOURCE_IONOSONDE.to_string());
            Vec::new()
        });
        let samples = inputs.samples.unwrap_or_else(|_| {
            missing_sources.push(SOURCE_SPOTS.to_string());
            Vec::new()
        });

        // Scoring always needs indices: last good, then quiet-sun fallback
        let snapshot = match (&live_solar, &previous) {
            (Some(s), _) => s.clone(),
            (None, Some(prev)) => prev.solar_snapshot.with_freshness(Freshness::Cached),
            (None, None) => SolarSnapshot::fallback(now),
        };

        // Stage 1: MUF
        let muf_estimate = self.ionosphere.estimate_muf(
            &location,
            live_solar.as_ref(),
            &soundings,
            now,
            previous.as_ref().map(|p| &p.muf_estimate),
        );

        // Stage 2: band scores
        let geomagnetic = geomagnetic_state(&snapshot, &location, self.config.optimizer.severe_storm_k_index);
        let solar_elevation = solar_elevation_deg(&location, now);
        let is_daytime = solar_elevation > HORIZON_ELEVATION_DEG;
        let band_scores = score_bands(&muf_estimate, &snapshot, &geomagnetic, is_daytime, &self.config.scoring);

        // Stage 3: trends, then recommendation
        let trend_estimates = {
            let mut analyzer = lock(&self.trends);
            if let Some(s) = &live_solar {
                analyzer.append(s);
            }
            analyzer.compute_all()
        };
        let sfi_trend = trend_estimates
            .iter()
            .find(|t| t.parameter == TrendParameter::Sfi)
            .copied()
            .unwrap_or_else(|| TrendEstimate::insufficient(TrendParameter::Sfi, 0));

        let present = EXPECTED_SOURCES - missing_sources.len();
        let data_completeness = present as f64 / EXPECTED_SOURCES as f64;
        let recommendation =
            self.optimizer
                .recommend(&band_scores, is_daytime, &sfi_trend, data_completeness, &snapshot);

        // Stage 4: validation against past reports
        let (accuracy_score, muf_accuracy) = {
            let history = lock(&self.history);
            let window = self.config.validation.window();
            (
                self.validation
                    .score_accuracy(history.iter().map(|r| &**r), &samples, window, now),
                self.validation
                    .score_muf_accuracy(history.iter().map(|r| &**r), &soundings, window, now),
            )
        };
        let band_activity = summarize_activity(&samples);

        let status = if missing_sources.is_empty()
            && matches!(muf_estimate.method, MufMethod::Measured | MufMethod::Formula)
        {
            ReportStatus::Live
        } else {
            ReportStatus::Degraded
        };
        if matches!(muf_estimate.method, MufMethod::Stale | MufMethod::Default) {
            warn!(method = ?muf_estimate.method, "Publishing report without a live MUF");
        }

        let mut report = PropagationReport {
            timestamp: now,
            location,
            solar_cycle: SolarCyclePhase::from_sfi(snapshot.sfi),
            solar_snapshot: snapshot,
            geomagnetic,
            is_daytime,
            solar_elevation_deg: solar_elevation,
            muf_estimate,
            band_scores,
            thresholds_version: self.config.scoring.thresholds.version,
            recommendation,
            trend_estimates,
            accuracy_score,
            muf_accuracy,
            band_activity,
            alerts: Vec::new(),
            status,
            data_completeness,
            missing_sources,
        };
        report.alerts = alerts::evaluate(&report);
        Ok(report)
    }

    /// Swap in a finished report and append it to the history.
    fn publish(&self, report: Arc<PropagationReport>) {
        {
            let mut history = lock(&self.history);
            let capacity = self.config.validation.report_history.max(1);
            while history.len() >= capacity {
                history.pop_front();
            }
            history.push_back(Arc::clone(&report));
        }
        info!(
            muf_mhz = report.muf_estimate.value_mhz,
            method = ?report.muf_estimate.method,
            top_band = ?report.recommendation.ordered_bands.first(),
            status = ?report.status,
            alerts = report.alerts.len(),
            "Propagation report published"
        );
        debug!(completeness = report.data_completeness, missing = ?report.missing_sources, "Report sources");
        self.last_good.store(Some(report));
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::feed::{ReplayData, ReplayFeed};
    use crate::types::{AccuracyValue, Band, Location, OverrideReason};
    use chrono::TimeZone;

    fn config() -> SkywaveConfig {
        SkywaveConfig::default()
    }

    fn generator() -> ReportGenerator {
        let config = config();
        let cache = Arc::new(CacheManager::from_config(&config.cache));
        let feed: Arc<dyn UpstreamFeed> = Arc::new(ReplayFeed::new(ReplayData::default()));
        ReportGenerator::new(config, feed, cache)
    }

    fn spring_evening() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 20, 18, 40, 0).unwrap()
    }

    fn solar(sfi: f64, k: f64, now: DateTime<Utc>) -> SolarSnapshot {
        SolarSnapshot {
            sfi,
            a_index: 5.0,
            k_index: k,
            sunspot_number: 120.0,
            x_ray_flux: 1e-6,
            timestamp: now,
            source: "test".into(),
            freshness: Freshness::Live,
        }
    }

    fn inputs(solar: Option<SolarSnapshot>) -> UpstreamInputs {
        UpstreamInputs {
            solar: solar.ok_or_else(|| EngineError::upstream("solar", "down")),
            soundings: Ok(Vec::new()),
            samples: Ok(Vec::new()),
        }
    }

    #[test]
    fn formula_scenario() {
        let gen = generator();
        let now = spring_evening();
        let report = gen.build_report(inputs(Some(solar(150.0, 1.0, now))), now).unwrap();
        assert_eq!(report.muf_estimate.method, MufMethod::Formula);
        assert!((27.0..=33.0).contains(&report.muf_estimate.value_mhz));
        assert_eq!(report.status, ReportStatus::Live);
        assert_eq!(report.data_completeness, 1.0);
        assert_eq!(report.accuracy_score.value, AccuracyValue::InsufficientData);
        assert_eq!(report.band_scores.len(), Band::ALL.len());
    }

    #[test]
    fn storm_scenario_overrides_recommendation() {
        let gen = generator();
        let now = spring_evening();
        let report = gen.build_report(inputs(Some(solar(250.0, 6.0, now))), now).unwrap();
        assert_eq!(report.recommendation.override_reason, Some(OverrideReason::GeomagneticStorm));
        for band in report.recommendation.top(4) {
            assert!(band.is_low() || band.is_vhf());
        }
    }

    #[test]
    fn all_sources_down_without_history_is_unavailable() {
        let gen = generator();
        let failed = UpstreamInputs {
            solar: Err(EngineError::upstream("solar", "down")),
            soundings: Err(EngineError::upstream("ionosonde", "down")),
            samples: Err(EngineError::upstream("spots", "down")),
        };
        assert_eq!(
            gen.build_report(failed, spring_evening()).unwrap_err(),
            EngineError::ForecastUnavailable
        );
    }

    #[test]
    fn all_sources_down_with_history_reuses_last_good() {
        let gen = generator();
        let now = spring_evening();
        let first = gen.build_report(inputs(Some(solar(150.0, 1.0, now))), now).unwrap();
        gen.publish(Arc::new(first.clone()));

        let failed = UpstreamInputs {
            solar: Err(EngineError::upstream("solar", "down")),
            soundings: Err(EngineError::upstream("ionosonde", "down")),
            samples: Err(EngineError::upstream("spots", "down")),
        };
        let later = now + chrono::Duration::minutes(5);
        let report = gen.build_report(failed, later).unwrap();
        assert_eq!(report.muf_estimate.method, MufMethod::Stale);
        assert_eq!(report.muf_estimate.value_mhz, first.muf_estimate.value_mhz);
        assert_eq!(report.solar_snapshot.freshness, Freshness::Cached);
        assert_eq!(report.status, ReportStatus::Degraded);
        assert_eq!(report.data_completeness, 0.0);
        assert_eq!(report.missing_sources.len(), 3);
    }

    #[test]
    fn malformed_solar_is_dropped() {
        let gen = generator();
        let now = spring_evening();
        let mut bad = solar(150.0, 1.0, now);
        bad.k_index = f64::NAN;
        let report = gen.build_report(inputs(Some(bad)), now).unwrap();
        assert_eq!(report.muf_estimate.method, MufMethod::Default);
        assert_eq!(report.solar_snapshot.freshness, Freshness::Fallback);
        assert!(report.missing_sources.contains(&"solar".to_string()));
    }

    #[test]
    fn history_is_bounded() {
        let mut config = config();
        config.validation.report_history = 2;
        let cache = Arc::new(CacheManager::from_config(&config.cache));
        let feed: Arc<dyn UpstreamFeed> = Arc::new(ReplayFeed::new(ReplayData::default()));
        let gen = ReportGenerator::new(config, feed, cache);
        let now = spring_evening();
        for i in 0..5 {
            let t = now + chrono::Duration::minutes(i);
            let report = gen.build_report(inputs(Some(solar(150.0, 1.0, t))), t).unwrap();
            gen.publish(Arc::new(report));
        }
        assert_eq!(gen.history().len(), 2);
        assert_eq!(gen.last_good().unwrap().timestamp, now + chrono::Duration::minutes(4));
        assert_eq!(gen.last_good().unwrap().location, Location::new(40.0, -100.0));
    }
}
