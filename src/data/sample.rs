//! Telemetry samples as served by the backend.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Opaque identifier of a bedside device (e.g. `ESP32_TEST_01`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceId(String);

impl DeviceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DeviceId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for DeviceId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// One timestamped multi-metric reading from a device.
///
/// Every numeric field is optional: devices omit readings they could not
/// take, and the backend passes `null` through unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Heart rate in beats per minute.
    #[serde(default, deserialize_with = "lenient_number")]
    pub hr: Option<f64>,
    /// Blood oxygen saturation in percent.
    #[serde(default, deserialize_with = "lenient_number")]
    pub spo2: Option<f64>,
    /// Body temperature in degrees Celsius.
    #[serde(default, deserialize_with = "lenient_number")]
    pub temp: Option<f64>,
    /// Relative humidity in percent.
    #[serde(default, deserialize_with = "lenient_number")]
    pub hum: Option<f64>,
    #[serde(default)]
    pub device_id: String,
    /// Server-assigned receive time. Display only.
    #[serde(default, rename = "_recv_time", deserialize_with = "display_string")]
    pub received_time: Option<String>,
}

impl Sample {
    /// Value of the given metric, if the device reported it.
    pub fn value(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::HeartRate => self.hr,
            Metric::Spo2 => self.spo2,
            Metric::Temperature => self.temp,
            Metric::Humidity => self.hum,
        }
    }
}

/// A vital sign carried by a [`Sample`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    HeartRate,
    Spo2,
    Temperature,
    Humidity,
}

impl Metric {
    /// Metrics that get a trend chart, in display order.
    pub const CHARTED: [Metric; 3] = [Metric::HeartRate, Metric::Spo2, Metric::Temperature];

    pub fn label(&self) -> &'static str {
        match self {
            Metric::HeartRate => "Heart Rate",
            Metric::Spo2 => "SpO₂",
            Metric::Temperature => "Temperature",
            Metric::Humidity => "Humidity",
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            Metric::HeartRate => "bpm",
            Metric::Spo2 => "%",
            Metric::Temperature => "°C",
            Metric::Humidity => "%",
        }
    }
}

/// Format an optional reading as received, using `--` when it is missing.
///
/// Alert text uses the same formatting, so a value never reads differently in
/// the panel and in a banner.
pub fn format_reading(value: Option<f64>) -> String {
    match value {
        Some(v) => v.to_string(),
        None => "--".to_string(),
    }
}

/// Accept numbers, numeric strings, or null. Anything else reads as missing
/// so one malformed field never drops the whole batch.
fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        _ => None,
    })
}

/// Receive times arrive either as formatted strings or as epoch numbers.
fn display_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}
