//! Upstream feed abstraction.
//!
//! The engine never talks to the solar, ionosonde or spot networks itself.
//! Collaborators normalise those feeds and hand readings over through
//! [`UpstreamFeed`]. Two implementations ship with the crate: a JSON replay
//! file and a synthetic generator for demos and tests.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use serde::Deserialize;
use std::path::Path;
use std::sync::{Mutex, PoisonError};

use crate::types::{Band, Freshness, IonosondeSounding, Location, SolarSnapshot, ValidationSample};

/// Source of normalised readings for one report cycle.
///
/// Implementations own their transport, parsing and retries. The generator
/// wraps every call in a timeout and the cache, so a slow or failing feed
/// degrades the report rather than blocking it.
#[async_trait]
pub trait UpstreamFeed: Send + Sync + 'static {
    async fn fetch_solar(&self) -> Result<SolarSnapshot>;

    /// Soundings near `location`.
    async fn fetch_soundings(&self, location: &Location) -> Result<Vec<IonosondeSounding>>;

    async fn fetch_validation_samples(&self) -> Result<Vec<ValidationSample>>;

    /// Human-readable name for logging (e.g. "replay", "synthetic").
    fn name(&self) -> &str;
}

// ============================================================================
// Replay Feed (JSON file)
// ============================================================================

/// Contents of a replay file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReplayData {
    #[serde(default)]
    pub solar: Vec<SolarSnapshot>,
    #[serde(default)]
    pub soundings: Vec<IonosondeSounding>,
    #[serde(default)]
    pub samples: Vec<ValidationSample>,
}

/// Replays recorded readings.
///
/// Solar snapshots are served in order, one per fetch, and the last one is
/// repeated once the recording is exhausted. Soundings and samples are
/// served whole on every fetch.
#[derive(Debug)]
pub struct ReplayFeed {
    data: ReplayData,
    cursor: Mutex<usize>,
}

impl ReplayFeed {
    pub fn new(data: ReplayData) -> Self {
        Self {
            data,
            cursor: Mutex::new(0),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read replay file {}", path.display()))?;
        let data: ReplayData = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse replay file {}", path.display()))?;
        tracing::info!(
            path = %path.display(),
            solar = data.solar.len(),
            soundings = data.soundings.len(),
            samples = data.samples.len(),
            "Loaded replay data"
        );
        Ok(Self::new(data))
    }
}

#[async_trait]
impl UpstreamFeed for ReplayFeed {
    async fn fetch_solar(&self) -> Result<SolarSnapshot> {
        if self.data.solar.is_empty() {
            bail!("replay contains no solar snapshots");
        }
        let mut cursor = self.cursor.lock().unwrap_or_else(PoisonError::into_inner);
        let index = (*cursor).min(self.data.solar.len() - 1);
        *cursor = cursor.saturating_add(1);
        Ok(self.data.solar[index].clone())
    }

    async fn fetch_soundings(&self, _location: &Location) -> Result<Vec<IonosondeSounding>> {
        Ok(self.data.soundings.clone())
    }

    async fn fetch_validation_samples(&self) -> Result<Vec<ValidationSample>> {
        Ok(self.data.samples.clone())
    }

    fn name(&self) -> &str {
        "replay"
    }
}

// ============================================================================
// Synthetic Feed
// ============================================================================

/// Centre values for the synthetic feed.
#[derive(Debug, Clone, Copy)]
pub struct SyntheticBaseline {
    pub sfi: f64,
    pub k_index: f64,
    pub fo_f2: f64,
    /// Stations placed around the observer
    pub stations: usize,
    /// Spots generated per fetch
    pub spots: usize,
}

impl Default for SyntheticBaseline {
    fn default() -> Self {
        Self {
            sfi: 140.0,
            k_index: 2.0,
            fo_f2: 8.0,
            stations: 3,
            spots: 40,
        }
    }
}

const SPOT_NETWORKS: [&str; 3] = ["pskreporter", "rbn", "dxcluster"];
const SPOT_MODES: [&str; 4] = ["FT8", "CW", "SSB", "FT4"];

/// Gaussian noise around a fixed baseline. Seedable for reproducible tests.
pub struct SyntheticFeed {
    baseline: SyntheticBaseline,
    rng: Mutex<StdRng>,
}

impl SyntheticFeed {
    pub fn new(baseline: SyntheticBaseline) -> Self {
        Self {
            baseline,
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    pub fn with_seed(baseline: SyntheticBaseline, seed: u64) -> Self {
        Self {
            baseline,
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    fn with_rng<T>(&self, f: impl FnOnce(&mut StdRng) -> T) -> T {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut rng)
    }
}

/// Draw from N(mean, sd), or return the mean when `sd` is not usable.
fn noisy(rng: &mut StdRng, mean: f64, sd: f64) -> f64 {
    Normal::new(mean, sd).map_or(mean, |n| n.sample(rng))
}

#[async_trait]
impl UpstreamFeed for SyntheticFeed {
    async fn fetch_solar(&self) -> Result<SolarSnapshot> {
        let base = self.baseline;
        Ok(self.with_rng(|rng| {
            let k_index = noisy(rng, base.k_index, 0.5).clamp(0.0, 9.0).round();
            SolarSnapshot {
                sfi: noisy(rng, base.sfi, 4.0).clamp(60.0, 400.0),
                a_index: (k_index * k_index * 1.5 + noisy(rng, 2.0, 1.0)).clamp(0.0, 400.0),
                k_index,
                sunspot_number: ((base.sfi - 60.0) * 1.1 + noisy(rng, 0.0, 5.0)).max(0.0),
                x_ray_flux: 10f64.powf(noisy(rng, -6.3, 0.4)),
                timestamp: Utc::now(),
                source: "synthetic".into(),
                freshness: Freshness::Live,
            }
        }))
    }

    async fn fetch_soundings(&self, location: &Location) -> Result<Vec<IonosondeSounding>> {
        let base = self.baseline;
        let now = Utc::now();
        Ok(self.with_rng(|rng| {
            (0..base.stations)
                .map(|i| {
                    let lat = (location.latitude + rng.gen_range(-8.0..8.0)).clamp(-89.0, 89.0);
                    let lon = (location.longitude + rng.gen_range(-10.0..10.0) + 180.0).rem_euclid(360.0) - 180.0;
                    let fo_f2 = noisy(rng, base.fo_f2, 0.4).clamp(1.0, 20.0);
                    IonosondeSounding {
                        station_id: format!("SYN{i:02}"),
                        lat,
                        lon,
                        fo_f2,
                        muf3000: Some(fo_f2 * noisy(rng, 3.2, 0.1).clamp(2.5, 4.0)),
                        timestamp: now - Duration::minutes(rng.gen_range(0..30)),
                        distance_to_observer: None,
                    }
                })
                .collect()
        }))
    }

    async fn fetch_validation_samples(&self) -> Result<Vec<ValidationSample>> {
        let base = self.baseline;
        let now = Utc::now();
        // Crude open-band cut: spots land on bands below the synthetic MUF
        let muf = base.fo_f2 * 3.2;
        let open: Vec<Band> = Band::ALL.into_iter().filter(|b| b.frequency_mhz() < muf).collect();
        if open.is_empty() {
            return Ok(Vec::new());
        }
        Ok(self.with_rng(|rng| {
            (0..base.spots)
                .map(|_| {
                    let band = open[rng.gen_range(0..open.len())];
                    let (lo, hi) = band.edges_mhz();
                    ValidationSample {
                        frequency: rng.gen_range(lo..hi),
                        mode: SPOT_MODES[rng.gen_range(0..SPOT_MODES.len())].to_string(),
                        distance_km: rng.gen_range(300.0..12_000.0),
                        snr: Some(noisy(rng, -10.0, 6.0).round()),
                        source_network: SPOT_NETWORKS[rng.gen_range(0..SPOT_NETWORKS.len())].to_string(),
                        timestamp: now - Duration::seconds(rng.gen_range(0..1800)),
                    }
                })
                .collect()
        }))
    }

    fn name(&self) -> &str {
        "synthetic"
    }
}
