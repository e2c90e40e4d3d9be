//! Config validation: unknown-key detection with Levenshtein suggestions
//! and plausibility warnings.
//!
//! Two-pass parse approach: first deserialize raw TOML into `toml::Value`,
//! walk the key tree, compare against known field names, and emit warnings
//! with "did you mean?" suggestions. Then proceed with normal serde
//! deserialization. Warnings never break existing configs.

use std::collections::HashSet;

/// A non-fatal config warning (typo, suspicious value).
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    pub field: String,
    pub message: String,
    pub suggestion: Option<String>,
}

impl std::fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(ref s) = self.suggestion {
            write!(f, " (did you mean '{s}'?)")?;
        }
        Ok(())
    }
}

// ============================================================================
// Known Config Keys
// ============================================================================

/// Returns the complete set of valid dotted key paths for SkywaveConfig.
///
/// This is maintained manually to match the struct hierarchy in skywave_config.rs.
/// Any new field added to SkywaveConfig must be added here too.
pub fn known_config_keys() -> HashSet<&'static str> {
    let keys: &[&str] = &[
        // [station]
        "station",
        "station.name",
        "station.latitude",
        "station.longitude",
        // [ionosphere]
        "ionosphere",
        "ionosphere.max_station_distance_km",
        "ionosphere.max_sounding_age_mins",
        "ionosphere.high_confidence_min_stations",
        "ionosphere.high_confidence_max_spread",
        "ionosphere.low_confidence_min_spread",
        "ionosphere.diurnal_ramp_half_width_deg",
        "ionosphere.night_factor",
        "ionosphere.seasonal_semiannual_amplitude",
        "ionosphere.seasonal_annual_amplitude",
        "ionosphere.equatorial_enhancement",
        "ionosphere.auroral_suppression",
        // [scoring]
        "scoring",
        "scoring.night_muf_ratio",
        "scoring.max_storm_penalty",
        "scoring.thresholds",
        "scoring.thresholds.version",
        "scoring.thresholds.excellent",
        "scoring.thresholds.good",
        "scoring.thresholds.fair",
        // [optimizer]
        "optimizer",
        "optimizer.severe_storm_k_index",
        "optimizer.high_flux_sfi",
        "optimizer.high_completeness",
        "optimizer.moderate_completeness",
        // [trends]
        "trends",
        "trends.buffer_capacity",
        "trends.min_samples",
        "trends.r_squared_high",
        "trends.r_squared_moderate",
        "trends.significance_level",
        // [validation]
        "validation",
        "validation.window_hours",
        "validation.top_bands",
        "validation.half_life_hours",
        "validation.diversity_bonus",
        "validation.report_history",
        "validation.muf_pair_max_lag_mins",
        "validation.muf_pair_max_distance_km",
        // [cache.*]
        "cache",
        "cache.conditions",
        "cache.conditions.max_entries",
        "cache.conditions.ttl_secs",
        "cache.conditions.max_memory_bytes",
        "cache.spots",
        "cache.spots.max_entries",
        "cache.spots.ttl_secs",
        "cache.spots.max_memory_bytes",
        "cache.solar",
        "cache.solar.max_entries",
        "cache.solar.ttl_secs",
        "cache.solar.max_memory_bytes",
        "cache.ionosonde",
        "cache.ionosonde.max_entries",
        "cache.ionosonde.ttl_secs",
        "cache.ionosonde.max_memory_bytes",
        // [scheduler]
        "scheduler",
        "scheduler.conditions_interval_secs",
        "scheduler.spots_interval_secs",
        "scheduler.sweep_interval_secs",
        "scheduler.jitter_secs",
        "scheduler.upstream_timeout_secs",
    ];
    keys.iter().copied().collect()
}

// ============================================================================
// TOML Key Walking
// ============================================================================

/// Recursively walks a `toml::Value` tree and collects all dotted key paths.
///
/// For example, a table `{ a = { b = 1, c = 2 } }` yields:
/// `["a", "a.b", "a.c"]`
pub fn walk_toml_keys(value: &toml::Value, prefix: &str) -> Vec<String> {
    let mut keys = Vec::new();
    if let Some(table) = value.as_table() {
        for (k, v) in table {
            let path = if prefix.is_empty() {
                k.clone()
            } else {
                format!("{prefix}.{k}")
            };
            keys.push(path.clone());
            if v.is_table() {
                keys.extend(walk_toml_keys(v, &path));
            }
        }
    }
    keys
}

// ============================================================================
// Levenshtein Distance
// ============================================================================

/// Compute the Levenshtein edit distance between two strings.
fn levenshtein(a: &str, b: &str) -> usize {
    let a_len = a.len();
    let b_len = b.len();
    if a_len == 0 {
        return b_len;
    }
    if b_len == 0 {
        return a_len;
    }

    let mut prev: Vec<usize> = (0..=b_len).collect();
    let mut curr = vec![0; b_len + 1];

    for (i, ca) in a.chars().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.chars().enumerate() {
            let cost = if ca == cb { 0 } else { 1 };
            curr[j + 1] = (prev[j + 1] + 1)
                .min(curr[j] + 1)
                .min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b_len]
}

/// Suggest the closest known key for an unknown key, if within edit distance 3.
pub fn suggest_correction(unknown: &str, known: &HashSet<&str>) -> Option<String> {
    let mut best: Option<(&str, usize)> = None;
    for &k in known {
        let dist = levenshtein(unknown, k);
        if dist <= 3 {
            if let Some((_, best_dist)) = best {
                if dist < best_dist {
                    best = Some((k, dist));
                }
            } else {
                best = Some((k, dist));
            }
        }
    }
    best.map(|(k, _)| k.to_string())
}

// ============================================================================
// Unknown Key Validation (entry point)
// ============================================================================

/// Parse a raw TOML string and return warnings for any unknown config keys.
///
/// This does NOT fail on unknown keys, it only warns. Existing configs
/// always continue to work.
pub fn validate_unknown_keys(raw_toml: &str) -> Vec<ValidationWarning> {
    let value: toml::Value = match raw_toml.parse() {
        Ok(v) => v,
        Err(_) => return Vec::new(), // parse errors are handled by serde later
    };

    let known = known_config_keys();
    let found = walk_toml_keys(&value, "");
    let mut warnings = Vec::new();

    for key in &found {
        if !known.contains(key.as_str()) {
            let suggestion = suggest_correction(key, &known);
            let message = format!("Unknown config key '{key}'");
            warnings.push(ValidationWarning {
                field: key.clone(),
                message,
                suggestion,
            });
        }
    }

    warnings
}

// ============================================================================
// Plausibility Warnings
// ============================================================================

/// Flag values that are legal but unlikely to be intended.
///
/// These never block startup; `SkywaveConfig::validate` owns the hard errors.
pub fn plausibility_warnings(config: &super::SkywaveConfig) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    let i = &config.ionosphere;
    if i.max_station_distance_km > 5_000.0 {
        warnings.push(ValidationWarning {
            field: "ionosphere.max_station_distance_km".to_string(),
            message: format!(
                "max_station_distance_km = {:.0} km reaches soundings that describe a different ionosphere",
                i.max_station_distance_km
            ),
            suggestion: None,
        });
    }

    if i.equatorial_enhancement < 1.0 {
        warnings.push(ValidationWarning {
            field: "ionosphere.equatorial_enhancement".to_string(),
            message: format!(
                "equatorial_enhancement = {:.2} suppresses the MUF near the geomagnetic equator",
                i.equatorial_enhancement
            ),
            suggestion: None,
        });
    }
    if i.auroral_suppression > 1.0 {
        warnings.push(ValidationWarning {
            field: "ionosphere.auroral_suppression".to_string(),
            message: format!(
                "auroral_suppression = {:.2} raises the MUF inside the auroral zone",
                i.auroral_suppression
            ),
            suggestion: None,
        });
    }

    let sc = &config.scheduler;
    if sc.upstream_timeout_secs >= sc.conditions_interval_secs {
        warnings.push(ValidationWarning {
            field: "scheduler.upstream_timeout_secs".to_string(),
            message: format!(
                "upstream_timeout_secs = {} is not shorter than conditions_interval_secs = {}",
                sc.upstream_timeout_secs, sc.conditions_interval_secs
            ),
            suggestion: None,
        });
    }

    if config.cache.conditions.ttl_secs < sc.conditions_interval_secs {
        warnings.push(ValidationWarning {
            field: "cache.conditions.ttl_secs".to_string(),
            message: format!(
                "cache.conditions.ttl_secs = {} expires before the next scheduled refresh ({} s), readers will regenerate on demand",
                config.cache.conditions.ttl_secs, sc.conditions_interval_secs
            ),
            suggestion: None,
        });
    }

    warnings
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levenshtein_identical() {
        assert_eq!(levenshtein("hello", "hello"), 0);
    }

    #[test]
    fn test_levenshtein_one_edit() {
        assert_eq!(levenshtein("excelent", "excellent"), 1);
    }

    #[test]
    fn test_levenshtein_empty() {
        assert_eq!(levenshtein("", "abc"), 3);
        assert_eq!(levenshtein("abc", ""), 3);
    }

    #[test]
    fn test_walk_toml_keys_nested() {
        let toml: toml::Value = r#"
            [cache]
            [cache.spots]
            ttl_secs = 60
        "#
        .parse()
        .unwrap();
        let keys = walk_toml_keys(&toml, "");
        assert!(keys.contains(&"cache".to_string()));
        assert!(keys.contains(&"cache.spots".to_string()));
        assert!(keys.contains(&"cache.spots.ttl_secs".to_string()));
    }

    #[test]
    fn test_typo_key_produces_warning_with_suggestion() {
        let toml_str = r#"
[scoring.thresholds]
excelent = 85.0
"#;
        let warnings = validate_unknown_keys(toml_str);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].field.contains("excelent"));
        assert_eq!(
            warnings[0].suggestion.as_deref(),
            Some("scoring.thresholds.excellent")
        );
    }

    #[test]
    fn test_all_valid_keys_produce_zero_warnings() {
        let toml_str = r#"
[station]
name = "K0XYZ"
latitude = 39.7
longitude = -104.9

[optimizer]
severe_storm_k_index = 6.0

[cache.conditions]
max_entries = 10
ttl_secs = 300
max_memory_bytes = 1048576
"#;
        let warnings = validate_unknown_keys(toml_str);
        assert!(
            warnings.is_empty(),
            "Expected 0 warnings, got: {:?}",
            warnings
        );
    }

    #[test]
    fn test_unknown_section_produces_warning() {
        let toml_str = r#"
[cache.weather]
ttl_secs = 600
"#;
        let warnings = validate_unknown_keys(toml_str);
        assert!(warnings.iter().any(|w| w.field == "cache.weather"));
    }

    #[test]
    fn test_suggest_correction_no_match_for_garbage() {
        let known = known_config_keys();
        let suggestion = suggest_correction("completely_unrelated_garbage_key_xyz", &known);
        assert!(suggestion.is_none());
    }

    #[test]
    fn test_known_keys_cover_every_serialized_key() {
        // Every key the default config serializes must be known
        let text = super::super::SkywaveConfig::default().to_toml().unwrap();
        let warnings = validate_unknown_keys(&text);
        assert!(warnings.is_empty(), "Unlisted keys: {:?}", warnings);
    }

    #[test]
    fn test_plausibility_defaults_clean() {
        let config = super::super::SkywaveConfig::default();
        let warnings = plausibility_warnings(&config);
        assert!(warnings.is_empty(), "Defaults should produce no warnings: {:?}", warnings);
    }

    #[test]
    fn test_plausibility_flags_long_timeout() {
        let mut config = super::super::SkywaveConfig::default();
        config.scheduler.upstream_timeout_secs = 600;
        let warnings = plausibility_warnings(&config);
        assert!(warnings.iter().any(|w| w.field == "scheduler.upstream_timeout_secs"));
    }
}
