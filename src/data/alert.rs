//! Threshold-based clinical alerts.
//!
//! Alerts are derived from the latest sample on every render and never
//! stored. An alert exists exactly as long as the latest sample keeps
//! satisfying its predicate.

use std::fmt;

use serde::Deserialize;

use super::sample::{format_reading, Sample};

/// Alert thresholds.
///
/// A reading strictly below `spo2_low`, or heart rate strictly outside
/// `hr_low..=hr_high`, raises an alert.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// SpO₂ percentage below which a low-oxygen alert fires.
    pub spo2_low: f64,
    /// Heart rate (bpm) below which an abnormal-HR alert fires.
    pub hr_low: f64,
    /// Heart rate (bpm) above which an abnormal-HR alert fires.
    pub hr_high: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            spo2_low: 90.0,
            hr_low: 45.0,
            hr_high: 120.0,
        }
    }
}

/// How loudly an alert is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Warning,
    Critical,
}

impl Severity {
    /// Returns a short symbol for display.
    pub fn symbol(&self) -> &'static str {
        match self {
            Severity::Warning => "WARN",
            Severity::Critical => "CRIT",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertKind {
    LowSpo2,
    AbnormalHr,
}

impl AlertKind {
    pub fn severity(&self) -> Severity {
        match self {
            AlertKind::LowSpo2 => Severity::Critical,
            AlertKind::AbnormalHr => Severity::Warning,
        }
    }
}

/// An active alert and the reading that triggered it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Alert {
    pub kind: AlertKind,
    pub value: f64,
}

impl fmt::Display for Alert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            AlertKind::LowSpo2 => write!(f, "Low SpO₂: {}%", format_reading(Some(self.value))),
            AlertKind::AbnormalHr => {
                write!(f, "Abnormal HR: {} bpm", format_reading(Some(self.value)))
            }
        }
    }
}

/// Evaluate the latest sample against the thresholds.
///
/// `None` (no data yet) never alerts. When both alerts fire, the SpO₂ alert
/// comes first.
pub fn evaluate(latest: Option<&Sample>, thresholds: &Thresholds) -> Vec<Alert> {
    let Some(sample) = latest else {
        return Vec::new();
    };

    let mut alerts = Vec::with_capacity(2);

    if let Some(spo2) = sample.spo2 {
        if spo2 < thresholds.spo2_low {
            alerts.push(Alert {
                kind: AlertKind::LowSpo2,
                value: spo2,
            });
        }
    }

    if let Some(hr) = sample.hr {
        if hr < thresholds.hr_low || hr > thresholds.hr_high {
            alerts.push(Alert {
                kind: AlertKind::AbnormalHr,
                value: hr,
            });
        }
    }

    alerts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(spo2: Option<f64>, hr: Option<f64>) -> Sample {
        Sample {
            spo2,
            hr,
            ..Default::default()
        }
    }

    fn kinds(latest: Option<&Sample>) -> Vec<AlertKind> {
        evaluate(latest, &Thresholds::default()).iter().map(|a| a.kind).collect()
    }

    #[test]
    fn test_low_spo2_only() {
        let s = reading(Some(85.0), Some(70.0));
        assert_eq!(kinds(Some(&s)), vec![AlertKind::LowSpo2]);
    }

    #[test]
    fn test_abnormal_hr_only() {
        let s = reading(Some(95.0), Some(130.0));
        assert_eq!(kinds(Some(&s)), vec![AlertKind::AbnormalHr]);
    }

    #[test]
    fn test_both_alerts_spo2_first() {
        let s = reading(Some(85.0), Some(130.0));
        let alerts = evaluate(Some(&s), &Thresholds::default());
        assert_eq!(alerts.len(), 2);
        assert_eq!(alerts[0].kind, AlertKind::LowSpo2);
        assert_eq!(alerts[0].value, 85.0);
        assert_eq!(alerts[1].kind, AlertKind::AbnormalHr);
        assert_eq!(alerts[1].value, 130.0);
    }

    #[test]
    fn test_normal_readings() {
        let s = reading(Some(95.0), Some(70.0));
        assert!(kinds(Some(&s)).is_empty());
    }

    #[test]
    fn test_missing_values_never_alert() {
        let s = reading(None, None);
        assert!(kinds(Some(&s)).is_empty());
        assert!(kinds(None).is_empty());
    }

    #[test]
    fn test_boundaries_are_exclusive() {
        assert!(kinds(Some(&reading(Some(90.0), Some(45.0)))).is_empty());
        assert!(kinds(Some(&reading(Some(99.0), Some(120.0)))).is_empty());
        assert_eq!(
            kinds(Some(&reading(None, Some(44.9)))),
            vec![AlertKind::AbnormalHr]
        );
        assert_eq!(
            kinds(Some(&reading(Some(89.9), None))),
            vec![AlertKind::LowSpo2]
        );
    }

    #[test]
    fn test_custom_thresholds() {
        let thresholds = Thresholds {
            spo2_low: 94.0,
            hr_low: 50.0,
            hr_high: 100.0,
        };
        let s = reading(Some(93.0), Some(105.0));
        assert_eq!(evaluate(Some(&s), &thresholds).len(), 2);
    }

    #[test]
    fn test_alert_messages() {
        let spo2 = Alert {
            kind: AlertKind::LowSpo2,
            value: 85.0,
        };
        let hr = Alert {
            kind: AlertKind::AbnormalHr,
            value: 130.5,
        };
        assert_eq!(spo2.to_string(), "Low SpO₂: 85%");
        assert_eq!(hr.to_string(), "Abnormal HR: 130.5 bpm");
        assert_eq!(spo2.kind.severity(), Severity::Critical);
        assert_eq!(hr.kind.severity(), Severity::Warning);
    }
}
