//! End-to-end report generation against a stub upstream feed.

mod common;

use chrono::Duration as ChronoDuration;
use std::sync::Arc;
use std::time::Duration;

use common::{generator_with, sounding, solar, spot, spring_midday, StubFeed};
use skywave::types::{AlertKind, MufMethod, OverrideReason, ReportStatus};
use skywave::{AccuracyValue, Band, Confidence, EngineError};

#[tokio::test]
async fn formula_scenario_on_healthy_feeds() {
    let now = spring_midday();
    let feed = Arc::new(StubFeed::healthy(solar(150.0, 1.0, now)));
    let (generator, _cache) = generator_with(Arc::clone(&feed));

    let report = generator.generate(now).await.unwrap();

    assert_eq!(report.muf_estimate.method, MufMethod::Formula);
    assert!(
        (27.0..=33.0).contains(&report.muf_estimate.value_mhz),
        "MUF {} outside expected range",
        report.muf_estimate.value_mhz
    );
    assert_eq!(report.muf_estimate.confidence, Confidence::Moderate);
    assert_eq!(report.status, ReportStatus::Live);
    assert!(report.is_daytime);
    assert!(report.missing_sources.is_empty());
    assert_eq!(feed.solar_calls(), 1);
}

#[tokio::test]
async fn nearby_soundings_give_a_measured_estimate() {
    let now = spring_midday();
    let feed = Arc::new(StubFeed {
        soundings: Some(vec![
            sounding("BC840", 40.0, -105.3, 24.0, now - ChronoDuration::minutes(5)),
            sounding("AU930", 30.4, -97.7, 25.0, now - ChronoDuration::minutes(10)),
            sounding("IF843", 37.9, -75.5, 26.0, now - ChronoDuration::minutes(15)),
            sounding("FAR01", -33.9, 18.4, 9.0, now),
        ]),
        ..StubFeed::healthy(solar(150.0, 1.0, now))
    });
    let (generator, _cache) = generator_with(feed);

    let report = generator.generate(now).await.unwrap();

    assert_eq!(report.muf_estimate.method, MufMethod::Measured);
    assert_eq!(report.muf_estimate.contributing_stations.len(), 3);
    assert!(!report.muf_estimate.contributing_stations.contains(&"FAR01".to_string()));
    assert!((20.0..=30.0).contains(&report.muf_estimate.base_mhz));
}

#[tokio::test]
async fn storm_overrides_flux_and_raises_alert() {
    let now = spring_midday();
    let feed = Arc::new(StubFeed::healthy(solar(250.0, 6.0, now)));
    let (generator, _cache) = generator_with(feed);

    let report = generator.generate(now).await.unwrap();

    assert_eq!(
        report.recommendation.override_reason,
        Some(OverrideReason::GeomagneticStorm)
    );
    let mut top: Vec<Band> = report.recommendation.top(4).to_vec();
    top.sort();
    assert_eq!(top, vec![Band::M160, Band::M80, Band::M40, Band::M6]);
    assert!(report.alerts.iter().any(|a| a.kind == AlertKind::GeomagneticStorm));
}

#[tokio::test]
async fn zero_samples_stay_insufficient_across_cycles() {
    let now = spring_midday();
    let feed = Arc::new(StubFeed::healthy(solar(150.0, 1.0, now)));
    let (generator, _cache) = generator_with(feed);

    for i in 0..4 {
        let report = generator.generate(now + ChronoDuration::minutes(15 * i)).await.unwrap();
        assert_eq!(report.accuracy_score.value, AccuracyValue::InsufficientData);
        assert_eq!(report.accuracy_score.score(), None);
    }
    assert_eq!(generator.history().len(), 4);
}

#[tokio::test]
async fn confirmed_predictions_score_full_accuracy() {
    let t0 = spring_midday();
    let confirm_at = t0 + ChronoDuration::hours(1);
    let samples = Band::ALL
        .iter()
        .flat_map(|band| {
            let (lo, hi) = band.edges_mhz();
            let f = (lo + hi) / 2.0;
            [spot(f, "rbn", confirm_at), spot(f, "pskreporter", confirm_at)]
        })
        .collect();
    let feed = Arc::new(StubFeed {
        samples: Some(samples),
        ..StubFeed::healthy(solar(150.0, 1.0, t0))
    });
    let (generator, _cache) = generator_with(feed);

    // Samples after t0 are outside the first cycle's window
    let first = generator.generate(t0).await.unwrap();
    assert_eq!(first.accuracy_score.value, AccuracyValue::InsufficientData);

    let second = generator.generate(t0 + ChronoDuration::hours(1)).await.unwrap();
    assert_eq!(second.accuracy_score.score(), Some(100.0));
    assert_eq!(second.accuracy_score.predictions_checked, 3);
    assert_eq!(second.accuracy_score.contributing_sources.len(), 2);
    assert_eq!(second.band_activity.len(), Band::ALL.len());
}

#[tokio::test]
async fn later_soundings_score_the_published_muf() {
    let t0 = spring_midday();
    let feed = Arc::new(StubFeed {
        soundings: Some(vec![sounding("BC840", 40.0, -105.3, 20.0, t0 + ChronoDuration::minutes(20))]),
        ..StubFeed::healthy(solar(150.0, 1.0, t0))
    });
    let (generator, _cache) = generator_with(feed);

    let first = generator.generate(t0).await.unwrap();
    assert_eq!(first.muf_accuracy.value, AccuracyValue::InsufficientData);
    assert!((first.muf_estimate.value_mhz - 20.0).abs() < 1e-9);

    let second = generator.generate(t0 + ChronoDuration::minutes(30)).await.unwrap();
    assert_eq!(second.muf_accuracy.pairs, 1);
    assert!((second.muf_accuracy.score().unwrap() - 100.0).abs() < 1e-6);
    assert!((second.muf_accuracy.observed_m_factor.unwrap() - 3.2).abs() < 1e-9);
}

#[tokio::test]
async fn all_sources_failing_is_unavailable() {
    let feed = Arc::new(StubFeed::default());
    let (generator, _cache) = generator_with(feed);

    let err = generator.generate(spring_midday()).await.unwrap_err();
    assert_eq!(err, EngineError::ForecastUnavailable);
    assert!(generator.last_good().is_none());
    assert!(generator.history().is_empty());
}

#[tokio::test(start_paused = true)]
async fn slow_solar_feed_times_out_and_degrades() {
    let now = spring_midday();
    let feed = Arc::new(StubFeed {
        solar_delay: Duration::from_secs(60),
        soundings: Some(vec![
            sounding("BC840", 40.0, -105.3, 24.0, now),
            sounding("AU930", 30.4, -97.7, 25.0, now),
        ]),
        ..StubFeed::healthy(solar(150.0, 1.0, now))
    });
    let (generator, cache) = generator_with(feed);

    let report = generator.generate(now).await.unwrap();

    assert_eq!(report.missing_sources, vec!["solar".to_string()]);
    assert_eq!(report.status, ReportStatus::Degraded);
    assert_eq!(report.muf_estimate.method, MufMethod::Measured);
    assert!((report.data_completeness - 2.0 / 3.0).abs() < 1e-9);
    // Failed fetches are never cached
    assert_eq!(cache.stats().namespaces["solar"].entries, 0);
}
