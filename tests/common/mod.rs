//! Shared fixtures for integration tests.

#![allow(dead_code)]

use anyhow::{bail, Result};
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use skywave::pipeline::{ReportGenerator, UpstreamFeed};
use skywave::types::Freshness;
use skywave::{CacheManager, IonosondeSounding, Location, SolarSnapshot, SkywaveConfig, ValidationSample};

/// 12:40 local solar time at 40N 100W on the March equinox.
pub fn spring_midday() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 20, 18, 40, 0).unwrap()
}

pub fn solar(sfi: f64, k: f64, at: DateTime<Utc>) -> SolarSnapshot {
    SolarSnapshot {
        sfi,
        a_index: 6.0,
        k_index: k,
        sunspot_number: 110.0,
        x_ray_flux: 1.0e-6,
        timestamp: at,
        source: "stub".into(),
        freshness: Freshness::Live,
    }
}

pub fn sounding(id: &str, lat: f64, lon: f64, muf3000: f64, at: DateTime<Utc>) -> IonosondeSounding {
    IonosondeSounding {
        station_id: id.into(),
        lat,
        lon,
        fo_f2: muf3000 / 3.2,
        muf3000: Some(muf3000),
        timestamp: at,
        distance_to_observer: None,
    }
}

pub fn spot(frequency: f64, network: &str, at: DateTime<Utc>) -> ValidationSample {
    ValidationSample {
        frequency,
        mode: "FT8".into(),
        distance_km: 3000.0,
        snr: Some(-12.0),
        source_network: network.into(),
        timestamp: at,
    }
}

/// Call-counting feed with fixed answers. `None` makes that source fail.
#[derive(Default)]
pub struct StubFeed {
    pub solar: Option<SolarSnapshot>,
    pub soundings: Option<Vec<IonosondeSounding>>,
    pub samples: Option<Vec<ValidationSample>>,
    pub solar_delay: Duration,
    pub solar_calls: AtomicUsize,
    pub sounding_calls: AtomicUsize,
    pub sample_calls: AtomicUsize,
}

impl StubFeed {
    pub fn healthy(solar: SolarSnapshot) -> Self {
        Self {
            solar: Some(solar),
            soundings: Some(Vec::new()),
            samples: Some(Vec::new()),
            ..Self::default()
        }
    }

    pub fn solar_calls(&self) -> usize {
        self.solar_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl UpstreamFeed for StubFeed {
    async fn fetch_solar(&self) -> Result<SolarSnapshot> {
        self.solar_calls.fetch_add(1, Ordering::SeqCst);
        if !self.solar_delay.is_zero() {
            tokio::time::sleep(self.solar_delay).await;
        }
        match &self.solar {
            Some(s) => Ok(s.clone()),
            None => bail!("solar feed down"),
        }
    }

    async fn fetch_soundings(&self, _location: &Location) -> Result<Vec<IonosondeSounding>> {
        self.sounding_calls.fetch_add(1, Ordering::SeqCst);
        match &self.soundings {
            Some(s) => Ok(s.clone()),
            None => bail!("ionosonde network down"),
        }
    }

    async fn fetch_validation_samples(&self) -> Result<Vec<ValidationSample>> {
        self.sample_calls.fetch_add(1, Ordering::SeqCst);
        match &self.samples {
            Some(s) => Ok(s.clone()),
            None => bail!("spot networks down"),
        }
    }

    fn name(&self) -> &str {
        "stub"
    }
}

pub fn generator_with(feed: Arc<StubFeed>) -> (Arc<ReportGenerator>, Arc<CacheManager>) {
    let config = SkywaveConfig::default();
    let cache = Arc::new(CacheManager::from_config(&config.cache));
    let generator = Arc::new(ReportGenerator::new(config, feed, Arc::clone(&cache)));
    (generator, cache)
}
