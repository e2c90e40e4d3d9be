//! Skywave Configuration - station location and every model constant as TOML values
//!
//! Each struct implements `Default` with the documented constants, so an
//! empty file (or no file at all) behaves exactly like the built-in model.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

use super::defaults;
use crate::types::{LabelThresholds, Location};

// ============================================================================
// Top-Level Config
// ============================================================================

/// Root configuration for one forecasting station.
///
/// Load with `SkywaveConfig::load()` which searches:
/// 1. `$SKYWAVE_CONFIG` env var
/// 2. `./skywave.toml`
/// 3. Built-in defaults
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SkywaveConfig {
    /// Observer identification and location
    #[serde(default)]
    pub station: StationConfig,

    /// MUF model tuning
    #[serde(default)]
    pub ionosphere: IonosphereConfig,

    /// Band scoring and label thresholds
    #[serde(default)]
    pub scoring: ScoringConfig,

    /// Recommendation overrides and confidence buckets
    #[serde(default)]
    pub optimizer: OptimizerConfig,

    /// Historical buffer and trend fitting
    #[serde(default)]
    pub trends: TrendConfig,

    /// Accuracy scoring against live activity
    #[serde(default)]
    pub validation: ValidationConfig,

    /// Per-namespace cache budgets
    #[serde(default)]
    pub cache: CacheConfig,

    /// Background task cadence and upstream timeouts
    #[serde(default)]
    pub scheduler: SchedulerConfig,
}

impl SkywaveConfig {
    /// Load configuration using the standard search order:
    /// 1. `$SKYWAVE_CONFIG` environment variable
    /// 2. `./skywave.toml` in the current working directory
    /// 3. Built-in defaults
    ///
    /// Environment overrides are applied on top of whichever source won.
    pub fn load() -> Self {
        let mut config = Self::load_from_search_path();
        config.apply_env_overrides();
        config
    }

    fn load_from_search_path() -> Self {
        // 1. Check env var
        if let Ok(path) = std::env::var("SKYWAVE_CONFIG") {
            let p = PathBuf::from(&path);
            if p.exists() {
                match Self::load_from_file(&p) {
                    Ok(config) => {
                        info!(path = %p.display(), station = %config.station.name, "Loaded config from SKYWAVE_CONFIG");
                        return config;
                    }
                    Err(e) => {
                        warn!(path = %p.display(), error = %e, "Failed to load config from SKYWAVE_CONFIG, falling back");
                    }
                }
            } else {
                warn!(path = %path, "SKYWAVE_CONFIG points to non-existent file, falling back");
            }
        }

        // 2. Check ./skywave.toml
        let local = PathBuf::from("skywave.toml");
        if local.exists() {
            match Self::load_from_file(&local) {
                Ok(config) => {
                    info!(station = %config.station.name, "Loaded config from ./skywave.toml");
                    return config;
                }
                Err(e) => {
                    warn!(error = %e, "Failed to load ./skywave.toml, using defaults");
                }
            }
        }

        // 3. Defaults
        info!("No skywave.toml found, using built-in defaults");
        Self::default()
    }

    /// Load from a specific TOML file path.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        Self::from_toml_str(&contents).map_err(|e| match e {
            ConfigError::Parse(_, inner) => ConfigError::Parse(path.to_path_buf(), inner),
            other => other,
        })
    }

    /// Parse and validate a TOML document. Unknown keys only warn.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        // Two-pass: check for unknown keys first (warnings only)
        for w in super::validation::validate_unknown_keys(contents) {
            warn!("{}", w);
        }

        let config: Self =
            toml::from_str(contents).map_err(|e| ConfigError::Parse(PathBuf::new(), e))?;
        config.validate()?;
        Ok(config)
    }

    /// `SKYWAVE_CONDITIONS_INTERVAL_SECS` beats TOML, which beats the default.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(raw) = std::env::var(defaults::CONDITIONS_INTERVAL_ENV) {
            match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => {
                    info!(secs, "Conditions interval overridden from environment");
                    self.scheduler.conditions_interval_secs = secs;
                }
                _ => {
                    warn!(value = %raw, "Ignoring invalid {}", defaults::CONDITIONS_INTERVAL_ENV);
                }
            }
        }
    }

    /// Serialize the current config to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::Serialize)
    }

    /// Save config to a file (used to write a starter template).
    pub fn save_to_file(&self, path: &Path) -> Result<(), ConfigError> {
        let contents = self.to_toml()?;
        std::fs::write(path, contents).map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        info!(path = %path.display(), "Config saved");
        Ok(())
    }

    /// Validate all values for internal consistency.
    ///
    /// Rules:
    /// - Label thresholds strictly descending, within 0-100
    /// - Station coordinates within geographic range
    /// - TTLs, capacities and intervals positive
    /// - Confidence buckets ordered
    /// - No NaN/Inf anywhere
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors: Vec<String> = Vec::new();

        // Station
        let s = &self.station;
        if !(-90.0..=90.0).contains(&s.latitude) {
            errors.push(format!("station.latitude = {} is outside -90..90", s.latitude));
        }
        if !(-180.0..=180.0).contains(&s.longitude) {
            errors.push(format!("station.longitude = {} is outside -180..180", s.longitude));
        }

        // Label thresholds: excellent > good > fair, all on the 0-100 scale
        let t = &self.scoring.thresholds;
        Self::check_descending(t.excellent, t.good, "scoring.thresholds.excellent/good", &mut errors);
        Self::check_descending(t.good, t.fair, "scoring.thresholds.good/fair", &mut errors);
        for (name, v) in [("excellent", t.excellent), ("good", t.good), ("fair", t.fair)] {
            if !(0.0..=100.0).contains(&v) {
                errors.push(format!("scoring.thresholds.{name} = {v} must be within 0-100"));
            }
        }
        if !(0.0..=1.0).contains(&self.scoring.night_muf_ratio) || self.scoring.night_muf_ratio == 0.0 {
            errors.push(format!(
                "scoring.night_muf_ratio = {} must be within (0, 1]",
                self.scoring.night_muf_ratio
            ));
        }
        if !(0.0..=1.0).contains(&self.scoring.max_storm_penalty) {
            errors.push(format!(
                "scoring.max_storm_penalty = {} must be within 0-1",
                self.scoring.max_storm_penalty
            ));
        }

        // Ionosphere
        let i = &self.ionosphere;
        if i.max_station_distance_km <= 0.0 {
            errors.push("ionosphere.max_station_distance_km must be > 0".to_string());
        }
        if i.max_sounding_age_mins <= 0.0 {
            errors.push("ionosphere.max_sounding_age_mins must be > 0".to_string());
        }
        if i.high_confidence_min_stations == 0 {
            errors.push("ionosphere.high_confidence_min_stations must be > 0".to_string());
        }
        Self::check_descending(
            i.low_confidence_min_spread,
            i.high_confidence_max_spread,
            "ionosphere.low_confidence_min_spread/high_confidence_max_spread",
            &mut errors,
        );
        if i.diurnal_ramp_half_width_deg <= 0.0 {
            errors.push("ionosphere.diurnal_ramp_half_width_deg must be > 0".to_string());
        }
        if !(0.0..=1.0).contains(&i.night_factor) || i.night_factor == 0.0 {
            errors.push(format!("ionosphere.night_factor = {} must be within (0, 1]", i.night_factor));
        }

        // Optimizer
        let o = &self.optimizer;
        if !(0.0..=9.0).contains(&o.severe_storm_k_index) {
            errors.push(format!(
                "optimizer.severe_storm_k_index = {} must be within 0-9",
                o.severe_storm_k_index
            ));
        }
        if o.high_flux_sfi <= 0.0 {
            errors.push("optimizer.high_flux_sfi must be > 0".to_string());
        }
        Self::check_descending(
            o.high_completeness,
            o.moderate_completeness,
            "optimizer.high_completeness/moderate_completeness",
            &mut errors,
        );
        if !(0.0..=1.0).contains(&o.high_completeness) || !(0.0..=1.0).contains(&o.moderate_completeness) {
            errors.push("optimizer completeness buckets must be within 0-1".to_string());
        }

        // Trends
        let tr = &self.trends;
        if tr.buffer_capacity == 0 {
            errors.push("trends.buffer_capacity must be > 0".to_string());
        }
        if tr.min_samples < 2 {
            errors.push(format!("trends.min_samples = {} must be >= 2", tr.min_samples));
        }
        if tr.min_samples > tr.buffer_capacity {
            errors.push(format!(
                "trends.min_samples ({}) cannot exceed trends.buffer_capacity ({})",
                tr.min_samples, tr.buffer_capacity
            ));
        }
        Self::check_descending(
            tr.r_squared_high,
            tr.r_squared_moderate,
            "trends.r_squared_high/r_squared_moderate",
            &mut errors,
        );
        if !(0.0..1.0).contains(&tr.significance_level) || tr.significance_level == 0.0 {
            errors.push(format!(
                "trends.significance_level = {} must be within (0, 1)",
                tr.significance_level
            ));
        }

        // Validation
        let v = &self.validation;
        if v.window_hours == 0 || v.window_hours > 24 * 30 {
            errors.push(format!("validation.window_hours = {} must be within 1-720", v.window_hours));
        }
        if v.top_bands == 0 {
            errors.push("validation.top_bands must be > 0".to_string());
        }
        if v.half_life_hours <= 0.0 {
            errors.push("validation.half_life_hours must be > 0".to_string());
        }
        if v.diversity_bonus < 0.0 {
            errors.push("validation.diversity_bonus cannot be negative".to_string());
        }
        if v.report_history == 0 {
            errors.push("validation.report_history must be > 0".to_string());
        }
        if !(v.muf_pair_max_lag_mins.is_finite() && v.muf_pair_max_lag_mins > 0.0) {
            errors.push(format!(
                "validation.muf_pair_max_lag_mins = {} must be > 0",
                v.muf_pair_max_lag_mins
            ));
        }
        if !(v.muf_pair_max_distance_km.is_finite() && v.muf_pair_max_distance_km > 0.0) {
            errors.push(format!(
                "validation.muf_pair_max_distance_km = {} must be > 0",
                v.muf_pair_max_distance_km
            ));
        }

        // Cache namespaces
        for (name, ns) in self.cache.namespaces() {
            if ns.max_entries == 0 {
                errors.push(format!("cache.{name}.max_entries must be > 0"));
            }
            if ns.ttl_secs == 0 {
                errors.push(format!("cache.{name}.ttl_secs must be > 0"));
            }
            if ns.max_memory_bytes == 0 {
                errors.push(format!("cache.{name}.max_memory_bytes must be > 0"));
            }
        }

        // Scheduler
        let sc = &self.scheduler;
        for (name, secs) in [
            ("conditions_interval_secs", sc.conditions_interval_secs),
            ("spots_interval_secs", sc.spots_interval_secs),
            ("sweep_interval_secs", sc.sweep_interval_secs),
            ("upstream_timeout_secs", sc.upstream_timeout_secs),
        ] {
            if secs == 0 {
                errors.push(format!("scheduler.{name} must be > 0"));
            }
        }

        for w in super::validation::plausibility_warnings(self) {
            warn!("{}", w);
        }

        // Reject NaN/Inf in any config value (sweep all f64 fields via serialization)
        if let Ok(s) = toml::to_string(self) {
            if s.contains("nan") || s.contains("inf") {
                errors.push(
                    "Config contains NaN or Inf values, all values must be finite numbers".to_string(),
                );
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    fn check_descending(upper: f64, lower: f64, name: &str, errors: &mut Vec<String>) {
        // NaN/Inf comparisons silently pass, catch them explicitly
        if !upper.is_finite() || !lower.is_finite() {
            errors.push(format!("{name}: values must be finite (got {upper}, {lower})"));
            return;
        }
        if upper <= lower {
            errors.push(format!("{name}: {upper:.3} must be greater than {lower:.3}"));
        }
    }
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(PathBuf, std::io::Error),
    Parse(PathBuf, toml::de::Error),
    Serialize(toml::ser::Error),
    Validation(Vec<String>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(path, e) => write!(f, "Config I/O error ({}): {}", path.display(), e),
            ConfigError::Parse(path, e) => {
                write!(f, "Config parse error ({}): {}", path.display(), e)
            }
            ConfigError::Serialize(e) => write!(f, "Config serialization error: {e}"),
            ConfigError::Validation(errors) => {
                writeln!(f, "Config validation failed:")?;
                for e in errors {
                    writeln!(f, "  - {e}")?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Station
// ============================================================================

/// Observer identification and location.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StationConfig {
    /// Station name / callsign, used in logs only
    #[serde(default = "default_station_name")]
    pub name: String,

    /// Geographic latitude (degrees north)
    #[serde(default = "default_latitude")]
    pub latitude: f64,

    /// Geographic longitude (degrees east, negative west)
    #[serde(default = "default_longitude")]
    pub longitude: f64,
}

fn default_station_name() -> String {
    "DEFAULT".to_string()
}
fn default_latitude() -> f64 { 40.0 }
fn default_longitude() -> f64 { -100.0 }

impl Default for StationConfig {
    fn default() -> Self {
        Self {
            name: default_station_name(),
            latitude: default_latitude(),
            longitude: default_longitude(),
        }
    }
}

impl StationConfig {
    pub fn location(&self) -> Location {
        Location::new(self.latitude, self.longitude)
    }
}

// ============================================================================
// Ionosphere
// ============================================================================

/// MUF estimation: sounding selection and the multiplicative corrections.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IonosphereConfig {
    #[serde(default = "default_max_station_distance")]
    pub max_station_distance_km: f64,

    #[serde(default = "default_max_sounding_age")]
    pub max_sounding_age_mins: f64,

    /// Stations needed before a measured estimate can be high confidence
    #[serde(default = "default_high_conf_stations")]
    pub high_confidence_min_stations: usize,

    /// Coefficient of variation at or below which the stations agree
    #[serde(default = "default_high_conf_spread")]
    pub high_confidence_max_spread: f64,

    /// Coefficient of variation above which the stations disagree
    #[serde(default = "default_low_conf_spread")]
    pub low_confidence_min_spread: f64,

    /// Half-width of the sunrise/sunset ramp in solar elevation (degrees)
    #[serde(default = "default_diurnal_half_width")]
    pub diurnal_ramp_half_width_deg: f64,

    /// MUF multiplier at full night
    #[serde(default = "default_night_factor")]
    pub night_factor: f64,

    /// Amplitude of the semi-annual (equinox) seasonal term
    #[serde(default = "default_semiannual_amplitude")]
    pub seasonal_semiannual_amplitude: f64,

    /// Amplitude of the annual (winter anomaly) seasonal term
    #[serde(default = "default_annual_amplitude")]
    pub seasonal_annual_amplitude: f64,

    /// MUF multiplier near the geomagnetic equator
    #[serde(default = "default_equatorial_enhancement")]
    pub equatorial_enhancement: f64,

    /// MUF multiplier inside the auroral zone
    #[serde(default = "default_auroral_suppression")]
    pub auroral_suppression: f64,
}

fn default_max_station_distance() -> f64 { defaults::MAX_STATION_DISTANCE_KM }
fn default_max_sounding_age() -> f64 { defaults::MAX_SOUNDING_AGE_MINS }
fn default_high_conf_stations() -> usize { 3 }
fn default_high_conf_spread() -> f64 { 0.15 }
fn default_low_conf_spread() -> f64 { 0.35 }
fn default_diurnal_half_width() -> f64 { defaults::DIURNAL_RAMP_HALF_WIDTH_DEG }
fn default_night_factor() -> f64 { defaults::NIGHT_MUF_RATIO }
fn default_semiannual_amplitude() -> f64 { 0.06 }
fn default_annual_amplitude() -> f64 { 0.04 }
fn default_equatorial_enhancement() -> f64 { 1.10 }
fn default_auroral_suppression() -> f64 { 0.80 }

impl Default for IonosphereConfig {
    fn default() -> Self {
        Self {
            max_station_distance_km: default_max_station_distance(),
            max_sounding_age_mins: default_max_sounding_age(),
            high_confidence_min_stations: default_high_conf_stations(),
            high_confidence_max_spread: default_high_conf_spread(),
            low_confidence_min_spread: default_low_conf_spread(),
            diurnal_ramp_half_width_deg: default_diurnal_half_width(),
            night_factor: default_night_factor(),
            seasonal_semiannual_amplitude: default_semiannual_amplitude(),
            seasonal_annual_amplitude: default_annual_amplitude(),
            equatorial_enhancement: default_equatorial_enhancement(),
            auroral_suppression: default_auroral_suppression(),
        }
    }
}

// ============================================================================
// Scoring
// ============================================================================

/// Band scoring. Scores are on a 0-100 scale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Score -> label cut points, identical for every band
    #[serde(default)]
    pub thresholds: LabelThresholds,

    /// Night MUF as a fraction of day MUF
    #[serde(default = "default_night_muf_ratio")]
    pub night_muf_ratio: f64,

    /// Largest fraction of a band's score a storm can remove (at K=9, top band)
    #[serde(default = "default_max_storm_penalty")]
    pub max_storm_penalty: f64,
}

fn default_night_muf_ratio() -> f64 { defaults::NIGHT_MUF_RATIO }
fn default_max_storm_penalty() -> f64 { 0.6 }

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            thresholds: LabelThresholds::default(),
            night_muf_ratio: default_night_muf_ratio(),
            max_storm_penalty: default_max_storm_penalty(),
        }
    }
}

// ============================================================================
// Optimizer
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizerConfig {
    /// K-index at or above which the storm override engages
    #[serde(default = "default_severe_storm_k")]
    pub severe_storm_k_index: f64,

    /// SFI at or above which the high-flux override engages
    #[serde(default = "default_high_flux_sfi")]
    pub high_flux_sfi: f64,

    /// Data completeness needed for a high confidence label
    #[serde(default = "default_high_completeness")]
    pub high_completeness: f64,

    /// Data completeness needed for a moderate confidence label
    #[serde(default = "default_moderate_completeness")]
    pub moderate_completeness: f64,
}

fn default_severe_storm_k() -> f64 { 6.0 }
fn default_high_flux_sfi() -> f64 { 200.0 }
fn default_high_completeness() -> f64 { 0.8 }
fn default_moderate_completeness() -> f64 { 0.5 }

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            severe_storm_k_index: default_severe_storm_k(),
            high_flux_sfi: default_high_flux_sfi(),
            high_completeness: default_high_completeness(),
            moderate_completeness: default_moderate_completeness(),
        }
    }
}

// ============================================================================
// Trends
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendConfig {
    /// Snapshots retained per parameter (168 = 7 days hourly)
    #[serde(default = "default_buffer_capacity")]
    pub buffer_capacity: usize,

    #[serde(default = "default_min_samples")]
    pub min_samples: usize,

    #[serde(default = "default_r2_high")]
    pub r_squared_high: f64,

    #[serde(default = "default_r2_moderate")]
    pub r_squared_moderate: f64,

    /// Slopes with a p-value above this are reported as stable
    #[serde(default = "default_significance")]
    pub significance_level: f64,
}

fn default_buffer_capacity() -> usize { defaults::TREND_BUFFER_CAPACITY }
fn default_min_samples() -> usize { defaults::MIN_TREND_SAMPLES }
fn default_r2_high() -> f64 { 0.7 }
fn default_r2_moderate() -> f64 { 0.4 }
fn default_significance() -> f64 { 0.05 }

impl Default for TrendConfig {
    fn default() -> Self {
        Self {
            buffer_capacity: default_buffer_capacity(),
            min_samples: default_min_samples(),
            r_squared_high: default_r2_high(),
            r_squared_moderate: default_r2_moderate(),
            significance_level: default_significance(),
        }
    }
}

// ============================================================================
// Validation
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    #[serde(default = "default_window_hours")]
    pub window_hours: u64,

    /// Recommended bands per report that are checked against activity
    #[serde(default = "default_top_bands")]
    pub top_bands: usize,

    /// Age at which a report's weight halves (hours)
    #[serde(default = "default_half_life")]
    pub half_life_hours: f64,

    /// Points added when independent networks confirm the same opening
    #[serde(default = "default_diversity_bonus")]
    pub diversity_bonus: f64,

    /// Recent reports kept for scoring
    #[serde(default = "default_report_history")]
    pub report_history: usize,

    /// Longest gap between a report and a sounding that scores its MUF (minutes)
    #[serde(default = "default_muf_pair_max_lag")]
    pub muf_pair_max_lag_mins: f64,

    /// Farthest sounding that scores a report's MUF (km)
    #[serde(default = "default_muf_pair_max_distance")]
    pub muf_pair_max_distance_km: f64,
}

fn default_window_hours() -> u64 { defaults::VALIDATION_WINDOW_HOURS }
fn default_top_bands() -> usize { 3 }
fn default_half_life() -> f64 { 3.0 }
fn default_diversity_bonus() -> f64 { 10.0 }
fn default_report_history() -> usize { defaults::REPORT_HISTORY_SIZE }
fn default_muf_pair_max_lag() -> f64 { defaults::MUF_PAIR_MAX_LAG_MINS }
fn default_muf_pair_max_distance() -> f64 { defaults::MAX_STATION_DISTANCE_KM }

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            window_hours: default_window_hours(),
            top_bands: default_top_bands(),
            half_life_hours: default_half_life(),
            diversity_bonus: default_diversity_bonus(),
            report_history: default_report_history(),
            muf_pair_max_lag_mins: default_muf_pair_max_lag(),
            muf_pair_max_distance_km: default_muf_pair_max_distance(),
        }
    }
}

impl ValidationConfig {
    pub fn window(&self) -> chrono::Duration {
        i64::try_from(self.window_hours)
            .ok()
            .and_then(chrono::Duration::try_hours)
            .unwrap_or_else(|| chrono::Duration::hours(24))
    }
}

// ============================================================================
// Cache
// ============================================================================

/// Budget for one cache namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheNamespaceConfig {
    pub max_entries: usize,
    pub ttl_secs: u64,
    pub max_memory_bytes: usize,
}

impl CacheNamespaceConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_conditions_cache")]
    pub conditions: CacheNamespaceConfig,
    #[serde(default = "default_spots_cache")]
    pub spots: CacheNamespaceConfig,
    #[serde(default = "default_solar_cache")]
    pub solar: CacheNamespaceConfig,
    #[serde(default = "default_ionosonde_cache")]
    pub ionosonde: CacheNamespaceConfig,
}

fn default_conditions_cache() -> CacheNamespaceConfig {
    CacheNamespaceConfig {
        max_entries: defaults::CONDITIONS_MAX_ENTRIES,
        ttl_secs: defaults::CONDITIONS_TTL_SECS,
        max_memory_bytes: defaults::CONDITIONS_MAX_MEMORY_BYTES,
    }
}
fn default_spots_cache() -> CacheNamespaceConfig {
    CacheNamespaceConfig {
        max_entries: defaults::SPOTS_MAX_ENTRIES,
        ttl_secs: defaults::SPOTS_TTL_SECS,
        max_memory_bytes: defaults::SPOTS_MAX_MEMORY_BYTES,
    }
}
fn default_solar_cache() -> CacheNamespaceConfig {
    CacheNamespaceConfig {
        max_entries: defaults::SOLAR_MAX_ENTRIES,
        ttl_secs: defaults::SOLAR_TTL_SECS,
        max_memory_bytes: defaults::SOLAR_MAX_MEMORY_BYTES,
    }
}
fn default_ionosonde_cache() -> CacheNamespaceConfig {
    CacheNamespaceConfig {
        max_entries: defaults::IONOSONDE_MAX_ENTRIES,
        ttl_secs: defaults::IONOSONDE_TTL_SECS,
        max_memory_bytes: defaults::IONOSONDE_MAX_MEMORY_BYTES,
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            conditions: default_conditions_cache(),
            spots: default_spots_cache(),
            solar: default_solar_cache(),
            ionosonde: default_ionosonde_cache(),
        }
    }
}

impl CacheConfig {
    /// All namespaces with their registered names.
    pub fn namespaces(&self) -> [(&'static str, CacheNamespaceConfig); 4] {
        [
            (defaults::NAMESPACE_CONDITIONS, self.conditions),
            (defaults::NAMESPACE_SPOTS, self.spots),
            (defaults::NAMESPACE_SOLAR, self.solar),
            (defaults::NAMESPACE_IONOSONDE, self.ionosonde),
        ]
    }
}

// ============================================================================
// Scheduler
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    #[serde(default = "default_conditions_interval")]
    pub conditions_interval_secs: u64,

    #[serde(default = "default_spots_interval")]
    pub spots_interval_secs: u64,

    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,

    /// Upper bound of random jitter added to each interval
    #[serde(default = "default_jitter")]
    pub jitter_secs: u64,

    #[serde(default = "default_upstream_timeout")]
    pub upstream_timeout_secs: u64,
}

fn default_conditions_interval() -> u64 { defaults::CONDITIONS_REFRESH_INTERVAL_SECS }
fn default_spots_interval() -> u64 { defaults::SPOTS_REFRESH_INTERVAL_SECS }
fn default_sweep_interval() -> u64 { defaults::CACHE_SWEEP_INTERVAL_SECS }
fn default_jitter() -> u64 { defaults::SCHEDULER_JITTER_SECS }
fn default_upstream_timeout() -> u64 { defaults::UPSTREAM_TIMEOUT_SECS }

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            conditions_interval_secs: default_conditions_interval(),
            spots_interval_secs: default_spots_interval(),
            sweep_interval_secs: default_sweep_interval(),
            jitter_secs: default_jitter(),
            upstream_timeout_secs: default_upstream_timeout(),
        }
    }
}

impl SchedulerConfig {
    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout_secs)
    }
}

// ============================================================================
// Tests
// ============================================================================
