//! System-wide default constants.
//!
//! Centralises the numbers the config structs fall back to.
//! Grouped by subsystem for easy discovery.

// ============================================================================
// Scheduler
// ============================================================================

/// Conditions report refresh cadence (seconds).
pub const CONDITIONS_REFRESH_INTERVAL_SECS: u64 = 300;

/// Live-spot refresh cadence (seconds).
pub const SPOTS_REFRESH_INTERVAL_SECS: u64 = 120;

/// Cache-wide expired-entry sweep cadence (seconds).
pub const CACHE_SWEEP_INTERVAL_SECS: u64 = 300;

/// Upper bound of the random jitter added to every background interval (seconds).
pub const SCHEDULER_JITTER_SECS: u64 = 15;

/// Timeout applied to every upstream feed call (seconds).
pub const UPSTREAM_TIMEOUT_SECS: u64 = 10;

/// Environment variable overriding the conditions cadence.
pub const CONDITIONS_INTERVAL_ENV: &str = "SKYWAVE_CONDITIONS_INTERVAL_SECS";

// ============================================================================
// Ionosphere
// ============================================================================

/// Safe MUF published when no sounding, solar snapshot or prior estimate exists (MHz).
pub const DEFAULT_MUF_MHZ: f64 = 15.0;

/// Soundings further than this from the observer are ignored (km).
pub const MAX_STATION_DISTANCE_KM: f64 = 3_000.0;

/// Soundings older than this are ignored (minutes).
pub const MAX_SOUNDING_AGE_MINS: f64 = 120.0;

/// Night-time MUF as a fraction of the daytime value.
pub const NIGHT_MUF_RATIO: f64 = 0.6;

/// Solar elevation half-width of the day/night transition ramp (degrees).
///
/// 12 degrees spans nautical twilight on both sides of the horizon.
pub const DIURNAL_RAMP_HALF_WIDTH_DEG: f64 = 12.0;

// ============================================================================
// Trends
// ============================================================================

/// Historical buffer capacity: 7 days of hourly snapshots.
pub const TREND_BUFFER_CAPACITY: usize = 168;

/// Minimum samples before a trend line is fitted.
pub const MIN_TREND_SAMPLES: usize = 6;

// ============================================================================
// Validation
// ============================================================================

/// Number of recent reports retained for accuracy scoring.
pub const REPORT_HISTORY_SIZE: usize = 48;

/// Accuracy window (hours).
pub const VALIDATION_WINDOW_HOURS: u64 = 24;

/// Soundings later than this after a report do not score its MUF (minutes)
pub const MUF_PAIR_MAX_LAG_MINS: f64 = 60.0;

// ============================================================================
// Cache namespaces
// ============================================================================

pub const NAMESPACE_CONDITIONS: &str = "conditions";
pub const NAMESPACE_SPOTS: &str = "spots";
pub const NAMESPACE_SOLAR: &str = "solar";
pub const NAMESPACE_IONOSONDE: &str = "ionosonde";

/// Cache key under which the current conditions report is published.
pub const CONDITIONS_KEY: &str = "current";

const MB: usize = 1024 * 1024;

pub const CONDITIONS_MAX_ENTRIES: usize = 10;
pub const CONDITIONS_TTL_SECS: u64 = 300;
pub const CONDITIONS_MAX_MEMORY_BYTES: usize = 10 * MB;

pub const SPOTS_MAX_ENTRIES: usize = 50;
pub const SPOTS_TTL_SECS: u64 = 120;
pub const SPOTS_MAX_MEMORY_BYTES: usize = 5 * MB;

pub const SOLAR_MAX_ENTRIES: usize = 20;
pub const SOLAR_TTL_SECS: u64 = 600;
pub const SOLAR_MAX_MEMORY_BYTES: usize = MB;

pub const IONOSONDE_MAX_ENTRIES: usize = 20;
pub const IONOSONDE_TTL_SECS: u64 = 300;
pub const IONOSONDE_MAX_MEMORY_BYTES: usize = 2 * MB;
