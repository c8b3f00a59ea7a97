//! Data models and processing for vitals telemetry.
//!
//! This module turns raw record histories from the backend into the state
//! the view renders.
//!
//! ## Submodules
//!
//! - [`alert`]: Threshold evaluation of the latest sample ([`evaluate`])
//! - [`duration`]: Parsing and formatting of duration strings (e.g., "15s", "500ms")
//! - [`sample`]: Wire models ([`Sample`], [`DeviceId`]) and the [`Metric`] enum
//! - [`state`]: The view state container ([`VitalsState`]) and its transitions
//! - [`window`]: Rolling per-metric windows ([`derive_window`])
//!
//! ## Data Flow
//!
//! ```text
//! Vec<Sample> (GET /records)
//!        │
//!        ▼
//! VitalsState::apply_samples()
//!        │
//!        ├──▶ latest = last record
//!        ├──▶ window = derive_window(records)   (last 60, per metric)
//!        │
//!        └──▶ evaluate(latest) at render time   (alerts)
//! ```

pub mod alert;
pub mod duration;
pub mod sample;
pub mod state;
pub mod window;

pub use alert::{evaluate, Alert, AlertKind, Severity, Thresholds};
pub use sample::{format_reading, DeviceId, Metric, Sample};
pub use state::{Applied, ClearError, SampleBatch, VitalsState};
pub use window::{derive_window, SeriesStats, Window, MAX_POINTS};
