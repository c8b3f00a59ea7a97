//! Layered settings.
//!
//! Defaults, then an optional TOML file, then `VITALS_*` environment
//! variables. Command-line flags are applied on top by the binary.
//!
//! ```toml
//! server = "http://localhost:5000"
//! device_interval = "15s"
//! sample_interval = "1s"
//! timeout = "5s"
//! device = "ESP32_TEST_01"
//! log_file = "vitals-watch.log"
//!
//! [thresholds]
//! spo2_low = 90.0
//! hr_low = 45.0
//! hr_high = 120.0
//! ```
//!
//! Nested keys use a double underscore in the environment, e.g.
//! `VITALS_THRESHOLDS__SPO2_LOW=92`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;

use crate::data::duration::{parse_duration, parse_interval};
use crate::data::{DeviceId, Thresholds};
use crate::poller::PollerConfig;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Backend base URL.
    pub server: String,
    /// Device catalog refresh interval (e.g. "15s").
    pub device_interval: String,
    /// Sample fetch interval (e.g. "1s").
    pub sample_interval: String,
    /// HTTP request timeout (e.g. "5s").
    pub timeout: String,
    /// Device to select on startup instead of waiting for the catalog.
    pub device: Option<String>,
    /// Where log output goes. The terminal is owned by the UI.
    pub log_file: PathBuf,
    pub thresholds: Thresholds,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: "http://localhost:5000".to_string(),
            device_interval: "15s".to_string(),
            sample_interval: "1s".to_string(),
            timeout: "5s".to_string(),
            device: None,
            log_file: PathBuf::from("vitals-watch.log"),
            thresholds: Thresholds::default(),
        }
    }
}

impl Settings {
    /// Load settings from an optional file plus the environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }
        let config = builder
            .add_source(
                Environment::with_prefix("VITALS")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("Failed to read configuration")?;

        config.try_deserialize().context("Invalid configuration")
    }

    /// Polling cadence, validated.
    pub fn poller_config(&self) -> Result<PollerConfig> {
        Ok(PollerConfig {
            device_interval: parse_interval(&self.device_interval)
                .context("Invalid device_interval")?,
            sample_interval: parse_interval(&self.sample_interval)
                .context("Invalid sample_interval")?,
        })
    }

    pub fn request_timeout(&self) -> Result<Duration> {
        parse_duration(&self.timeout).context("Invalid timeout")
    }

    pub fn initial_device(&self) -> Option<DeviceId> {
        self.device.as_deref().filter(|d| !d.is_empty()).map(DeviceId::from)
    }
}
