//! Cache-gated service behaviour: coalescing, TTL expiry and background refresh.

mod common;

use chrono::Utc;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use common::{generator_with, solar, StubFeed};
use skywave::background::spawn_all;
use skywave::config::SchedulerConfig;
use skywave::{EngineError, PropagationReport, PropagationService};

fn service(feed: Arc<StubFeed>) -> PropagationService {
    let (generator, cache) = generator_with(feed);
    PropagationService::new(generator, cache)
}

#[tokio::test(start_paused = true)]
async fn concurrent_cold_reads_regenerate_once() {
    let feed = Arc::new(StubFeed {
        solar_delay: Duration::from_millis(200),
        ..StubFeed::healthy(solar(140.0, 2.0, Utc::now()))
    });
    let service = service(Arc::clone(&feed));

    let reads = (0..16).map(|_| {
        let service = service.clone();
        tokio::spawn(async move { service.current_report().await })
    });
    let reports: Vec<PropagationReport> = futures::future::join_all(reads)
        .await
        .into_iter()
        .map(|r| r.unwrap().unwrap())
        .collect();

    assert_eq!(feed.solar_calls(), 1);
    assert_eq!(service.generator().history().len(), 1);
    assert!(reports.iter().all(|r| r == &reports[0]));
}

#[tokio::test(start_paused = true)]
async fn cached_report_round_trips_unchanged() {
    let feed = Arc::new(StubFeed::healthy(solar(140.0, 2.0, Utc::now())));
    let service = service(feed);

    let first = service.current_report().await.unwrap();
    let second = service.current_report().await.unwrap();

    assert_eq!(first, second);
    let stats = service.cache_stats();
    let conditions = &stats.namespaces["conditions"];
    assert_eq!(conditions.entries, 1);
    assert_eq!(conditions.hits, 1);
    assert_eq!(service.generator().history().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn namespaces_expire_independently() {
    let feed = Arc::new(StubFeed::healthy(solar(140.0, 2.0, Utc::now())));
    let service = service(Arc::clone(&feed));

    service.current_report().await.unwrap();
    // Past the conditions and spots TTLs, inside the solar TTL
    tokio::time::advance(Duration::from_secs(301)).await;
    service.current_report().await.unwrap();

    assert_eq!(service.generator().history().len(), 2);
    assert_eq!(feed.solar_calls(), 1);
    assert_eq!(feed.sample_calls.load(Ordering::SeqCst), 2);
    assert_eq!(feed.sounding_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn unavailable_forecast_is_not_cached() {
    let feed = Arc::new(StubFeed::default());
    let service = service(Arc::clone(&feed));

    assert_eq!(service.current_report().await.unwrap_err(), EngineError::ForecastUnavailable);
    assert_eq!(service.current_report().await.unwrap_err(), EngineError::ForecastUnavailable);
    assert_eq!(feed.solar_calls(), 2);
    assert_eq!(service.cache_stats().total_entries(), 0);
}

#[tokio::test(start_paused = true)]
async fn background_tasks_keep_conditions_warm_and_stop_on_cancel() {
    let feed = Arc::new(StubFeed::healthy(solar(140.0, 2.0, Utc::now())));
    let (generator, cache) = generator_with(Arc::clone(&feed));
    let service = PropagationService::new(Arc::clone(&generator), Arc::clone(&cache));
    let cancel = CancellationToken::new();
    let config = SchedulerConfig {
        jitter_secs: 0,
        ..SchedulerConfig::default()
    };

    let handles = spawn_all(service.clone(), Arc::clone(&cache), &config, &cancel);
    tokio::time::sleep(Duration::from_secs(1)).await;

    // The first conditions cycle has already filled the cache
    assert_eq!(cache.stats().namespaces["conditions"].entries, 1);
    service.current_report().await.unwrap();
    assert_eq!(generator.history().len(), 1);

    cancel.cancel();
    let cycles: Vec<u64> = futures::future::join_all(handles)
        .await
        .into_iter()
        .map(|h| h.unwrap())
        .collect();
    assert_eq!(cycles.len(), 3);
    assert!(cycles.iter().all(|&c| c >= 1));
}
