//! Background refresh tasks
//!
//! One loop per cache namespace that needs regenerating, plus a cache-wide
//! sweep so expired entries are freed even when nobody reads them:
//!
//! - conditions: full report regeneration, written through the cache
//! - spots: keeps live-activity samples warm between report cycles
//! - sweep: drops expired entries across every namespace

mod scheduler;

pub use scheduler::{run_periodic, Schedule};

use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::cache::CacheManager;
use crate::config::SchedulerConfig;
use crate::pipeline::PropagationService;

/// Spawn every background loop. Each handle resolves to its cycle count once
/// `cancel` fires.
pub fn spawn_all(
    service: PropagationService,
    cache: Arc<CacheManager>,
    config: &SchedulerConfig,
    cancel: &CancellationToken,
) -> Vec<JoinHandle<u64>> {
    let conditions = {
        let service = service.clone();
        let schedule = Schedule {
            interval_secs: config.conditions_interval_secs,
            jitter_secs: config.jitter_secs,
        };
        tokio::spawn(run_periodic("conditions", schedule, cancel.clone(), move || {
            let service = service.clone();
            async move {
                match service.refresh_conditions().await {
                    Ok(report) => debug!(status = ?report.status, "Conditions refreshed"),
                    Err(e) => warn!(error = %e, "Conditions refresh failed"),
                }
            }
        }))
    };

    let spots = {
        let schedule = Schedule {
            interval_secs: config.spots_interval_secs,
            jitter_secs: config.jitter_secs,
        };
        tokio::spawn(run_periodic("spots", schedule, cancel.clone(), move || {
            let service = service.clone();
            async move {
                match service.refresh_spots().await {
                    Ok(count) => debug!(samples = count, "Spots refreshed"),
                    Err(e) => warn!(error = %e, "Spots refresh failed"),
                }
            }
        }))
    };

    let sweep = {
        let schedule = Schedule {
            interval_secs: config.sweep_interval_secs,
            jitter_secs: 0,
        };
        tokio::spawn(run_periodic("cache-sweep", schedule, cancel.clone(), move || {
            let cache = Arc::clone(&cache);
            async move {
                let removed = cache.sweep();
                if removed > 0 {
                    info!(removed, "Cache sweep complete");
                }
            }
        }))
    };

    vec![conditions, spots, sweep]
}
