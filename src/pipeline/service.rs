//! PropagationService: the read-mostly facade consumers call
//!
//! Reports are served from the `conditions` cache namespace. A cold miss
//! triggers one coalesced regeneration; background refresh writes fresh
//! reports through the same namespace.

use chrono::Utc;
use std::sync::Arc;
use tracing::warn;

use super::generator::ReportGenerator;
use crate::cache::{CacheManager, CacheStats};
use crate::config::defaults::{CONDITIONS_KEY, NAMESPACE_CONDITIONS};
use crate::error::{CacheError, EngineError};
use crate::types::PropagationReport;

#[derive(Clone)]
pub struct PropagationService {
    generator: Arc<ReportGenerator>,
    cache: Arc<CacheManager>,
}

impl PropagationService {
    pub fn new(generator: Arc<ReportGenerator>, cache: Arc<CacheManager>) -> Self {
        Self { generator, cache }
    }

    pub fn generator(&self) -> &Arc<ReportGenerator> {
        &self.generator
    }

    /// Current report, regenerating on a cold miss.
    ///
    /// Only `ForecastUnavailable` escapes; cache faults fall back to the last
    /// published report.
    pub async fn current_report(&self) -> Result<PropagationReport, EngineError> {
        let generator = Arc::clone(&self.generator);
        let result = self
            .cache
            .get_or_insert_with(NAMESPACE_CONDITIONS, CONDITIONS_KEY, || async move {
                let report = generator.generate(Utc::now()).await?;
                Ok(PropagationReport::clone(&report))
            })
            .await;

        match result {
            Ok(report) => Ok(report),
            Err(CacheError::Regeneration { .. }) => Err(EngineError::ForecastUnavailable),
            Err(e) => {
                warn!(error = %e, "Conditions cache unavailable, serving last published report");
                self.generator
                    .last_good()
                    .map(|r| PropagationReport::clone(&r))
                    .ok_or(EngineError::ForecastUnavailable)
            }
        }
    }

    /// Regenerate unconditionally and write the result through the cache.
    pub async fn refresh_conditions(&self) -> Result<Arc<PropagationReport>, EngineError> {
        let report = self.generator.generate(Utc::now()).await?;
        if let Err(e) = self.cache.set(NAMESPACE_CONDITIONS, CONDITIONS_KEY, &*report, None) {
            warn!(error = %e, "Failed to cache refreshed report");
        }
        Ok(report)
    }

    /// Keep the spots namespace warm between report cycles.
    pub async fn refresh_spots(&self) -> Result<usize, EngineError> {
        self.generator.fetch_validation_samples().await.map(|s| s.len())
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }
}
