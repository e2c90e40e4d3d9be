//! Operator alerts derived from a finished report

use crate::types::{Alert, AlertKind, AlertSeverity, PropagationReport};

/// GOES long-channel flux thresholds (W/m^2)
const M_CLASS_FLUX: f64 = 1.0e-5;
const X_CLASS_FLUX: f64 = 1.0e-4;

/// Solar elevation band treated as the greyline (degrees either side of 0)
const GREYLINE_ELEVATION_DEG: f64 = 6.0;

/// Evaluate every alert rule against a report.
///
/// Storm and unsettled are mutually exclusive, as are the two band-opening
/// alerts. The quiet-conditions notice only appears when nothing else fired.
pub fn evaluate(report: &PropagationReport) -> Vec<Alert> {
    let mut alerts = Vec::new();
    let k = report.geomagnetic.k_index;
    let solar = &report.solar_snapshot;
    let muf = report.muf_estimate.value_mhz;

    if k >= 5.0 {
        alerts.push(Alert {
            kind: AlertKind::GeomagneticStorm,
            severity: if k >= 7.0 { AlertSeverity::Critical } else { AlertSeverity::Warning },
            title: format!("Geomagnetic storm (K={k:.0})"),
            message: "High bands and polar paths degraded; favour 160m-40m".into(),
        });
    } else if k >= 4.0 {
        alerts.push(Alert {
            kind: AlertKind::Unsettled,
            severity: AlertSeverity::Warning,
            title: format!("Unsettled geomagnetic field (K={k:.0})"),
            message: "Expect fading and elevated noise on polar paths".into(),
        });
    }

    if solar.x_ray_flux >= X_CLASS_FLUX {
        alerts.push(Alert {
            kind: AlertKind::SolarFlare,
            severity: AlertSeverity::Critical,
            title: "X-class solar flare".into(),
            message: "Sunlit-side HF blackout likely, lowest bands worst".into(),
        });
    } else if solar.x_ray_flux >= M_CLASS_FLUX {
        alerts.push(Alert {
            kind: AlertKind::SolarFlare,
            severity: AlertSeverity::Warning,
            title: "M-class solar flare".into(),
            message: "Short-lived absorption on sunlit paths".into(),
        });
    }

    if muf > 28.0 {
        alerts.push(Alert {
            kind: AlertKind::BandOpening,
            severity: AlertSeverity::Info,
            title: "10m open".into(),
            message: format!("MUF {muf:.1} MHz supports 10m"),
        });
    } else if muf > 21.0 {
        alerts.push(Alert {
            kind: AlertKind::BandOpening,
            severity: AlertSeverity::Info,
            title: "15m open".into(),
            message: format!("MUF {muf:.1} MHz supports 15m"),
        });
    }

    if report.solar_elevation_deg.abs() <= GREYLINE_ELEVATION_DEG && k <= 3.0 {
        alerts.push(Alert {
            kind: AlertKind::Greyline,
            severity: AlertSeverity::Info,
            title: "Greyline window".into(),
            message: "Terminator enhancement likely on 80m and 40m".into(),
        });
    }

    if alerts.is_empty() && k <= 1.0 && solar.sfi >= 100.0 {
        alerts.push(Alert {
            kind: AlertKind::QuietConditions,
            severity: AlertSeverity::Info,
            title: "Excellent conditions".into(),
            message: format!("Quiet field and SFI {:.0}", solar.sfi),
        });
    }

    alerts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{
        AccuracyScore, Confidence, Freshness, GeomagneticState, Location, MufAccuracy, MufAdjustments, MufEstimate,
        MufMethod, Recommendation, ReportStatus, SolarCyclePhase, SolarSnapshot, StormLevel,
    };
    use chrono::Utc;
    use std::collections::BTreeMap;

    fn report(k: f64, sfi: f64, xray: f64, muf: f64, elevation: f64) -> PropagationReport {
        let now = Utc::now();
        PropagationReport {
            timestamp: now,
            location: Location::new(40.0, -100.0),
            solar_snapshot: SolarSnapshot {
                sfi,
                a_index: 5.0,
                k_index: k,
                sunspot_number: 80.0,
                x_ray_flux: xray,
                timestamp: now,
                source: "test".into(),
                freshness: Freshness::Live,
            },
            geomagnetic: GeomagneticState {
                k_index: k,
                a_index: 5.0,
                storm_level: StormLevel::from_k_index(k, 6.0),
                geomagnetic_latitude: 49.0,
                geomagnetic_longitude: 320.0,
            },
            solar_cycle: SolarCyclePhase::from_sfi(sfi),
            is_daytime: elevation > 0.0,
            solar_elevation_deg: elevation,
            muf_estimate: MufEstimate {
                value_mhz: muf,
                method: MufMethod::Formula,
                confidence: Confidence::Moderate,
                contributing_stations: vec![],
                base_mhz: muf,
                adjustments: MufAdjustments::IDENTITY,
            },
            band_scores: BTreeMap::new(),
            thresholds_version: 1,
            recommendation: Recommendation {
                ordered_bands: vec![],
                rationale: vec![],
                override_reason: None,
                confidence_label: Confidence::Moderate,
            },
            trend_estimates: vec![],
            accuracy_score: AccuracyScore::insufficient(86_400),
            muf_accuracy: MufAccuracy::insufficient(86_400),
            band_activity: BTreeMap::new(),
            alerts: vec![],
            status: ReportStatus::Live,
            data_completeness: 1.0,
            missing_sources: vec![],
        }
    }

    fn kinds(alerts: &[Alert]) -> Vec<AlertKind> {
        alerts.iter().map(|a| a.kind).collect()
    }

    #[test]
    fn severe_storm_is_critical() {
        let alerts = evaluate(&report(7.0, 120.0, 1e-6, 12.0, 30.0));
        assert_eq!(alerts[0].kind, AlertKind::GeomagneticStorm);
        assert_eq!(alerts[0].severity, AlertSeverity::Critical);
        assert!(!kinds(&alerts).contains(&AlertKind::Unsettled));
    }

    #[test]
    fn unsettled_below_storm() {
        let alerts = evaluate(&report(4.0, 120.0, 1e-6, 12.0, 30.0));
        assert_eq!(kinds(&alerts), vec![AlertKind::Unsettled]);
    }

    #[test]
    fn flare_classes() {
        let x = evaluate(&report(2.0, 120.0, 2e-4, 12.0, 30.0));
        assert_eq!(x[0].severity, AlertSeverity::Critical);
        let m = evaluate(&report(2.0, 120.0, 3e-5, 12.0, 30.0));
        assert_eq!(m[0].severity, AlertSeverity::Warning);
        assert_eq!(m[0].kind, AlertKind::SolarFlare);
    }

    #[test]
    fn band_opening_picks_highest_open_band() {
        let alerts = evaluate(&report(2.0, 120.0, 1e-6, 29.5, 30.0));
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].title, "10m open");
        let alerts = evaluate(&report(2.0, 120.0, 1e-6, 22.0, 30.0));
        assert_eq!(alerts[0].title, "15m open");
    }

    #[test]
    fn greyline_needs_quiet_field() {
        assert!(kinds(&evaluate(&report(2.0, 120.0, 1e-6, 12.0, -3.0))).contains(&AlertKind::Greyline));
        assert!(!kinds(&evaluate(&report(4.0, 120.0, 1e-6, 12.0, -3.0))).contains(&AlertKind::Greyline));
    }

    #[test]
    fn quiet_conditions_only_when_nothing_else() {
        assert_eq!(
            kinds(&evaluate(&report(1.0, 140.0, 1e-6, 18.0, 40.0))),
            vec![AlertKind::QuietConditions]
        );
        assert!(!kinds(&evaluate(&report(1.0, 140.0, 1e-6, 30.0, 40.0))).contains(&AlertKind::QuietConditions));
    }
}
