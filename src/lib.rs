//! # vitals-watch
//!
//! A live terminal dashboard for patient vitals streamed by bedside sensor
//! devices to a telemetry server.
//!
//! The server stores one record history per device. This crate polls it,
//! keeps a rolling window of the last 60 samples for the selected device,
//! raises threshold alerts on the latest sample, and draws heart rate, SpO₂
//! and temperature trend charts in the terminal.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                         Application                          │
//! │  ┌─────────┐  PollEvent  ┌──────────┐    ┌─────────┐         │
//! │  │ poller  │────────────▶│   app    │───▶│   ui    │──▶ tty  │
//! │  │ (tokio) │             │ (state)  │    │(ratatui)│         │
//! │  └────┬────┘             └────┬─────┘    └─────────┘         │
//! │       │                       │                              │
//! │       ▼                       ▼                              │
//! │  ┌─────────┐             ┌──────────┐                        │
//! │  │ source  │◀─ Http |    │  chart   │◀── TerminalCharts      │
//! │  │(Backend)│   Memory    │ (bridge) │                        │
//! │  └─────────┘             └──────────┘                        │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`source`]**: The [`Backend`] trait with HTTP and in-memory implementations
//! - **[`poller`]**: Cancellable periodic fetch tasks for the device catalog and records
//! - **[`data`]**: Samples, rolling windows, alerts, and the [`VitalsState`] container
//! - **[`chart`]**: Chart surface lifecycle behind the [`ChartBackend`] trait
//! - **[`app`]**: The view controller tying state, poller and charts together
//! - **[`ui`]**: Terminal rendering using ratatui
//!
//! ## Usage
//!
//! ### As a CLI tool
//!
//! ```bash
//! # Watch the default server (http://localhost:5000)
//! vitals-watch
//!
//! # Watch a specific device on another server
//! vitals-watch --server http://ward-3:5000 --device ESP32_TEST_01
//!
//! # Print the CSV export link and exit
//! vitals-watch --print-export-link
//! ```
//!
//! ### As a library
//!
//! ```
//! use std::sync::Arc;
//! use vitals_watch::{App, AppOptions, DeviceId, MemoryBackend, Sample};
//!
//! # tokio_test::block_on(async {
//! let backend = MemoryBackend::new();
//! backend.push_sample("ESP32_TEST_01", Sample::default());
//!
//! let mut app = App::new(
//!     Arc::new(backend),
//!     AppOptions::default(),
//!     tokio::runtime::Handle::current(),
//! );
//! app.start();
//! # });
//! ```

pub mod app;
pub mod chart;
pub mod config;
pub mod data;
pub mod events;
pub mod poller;
pub mod source;
pub mod telemetry;
pub mod ui;

// Re-export main types for convenience
pub use app::{App, AppOptions};
pub use chart::{ChartBackend, ChartBridge, ChartError, SurfaceId, SurfaceSpec, TerminalCharts};
pub use config::Settings;
pub use data::{
    derive_window, evaluate, Alert, AlertKind, ClearError, DeviceId, Metric, Sample, Severity,
    Thresholds, VitalsState, Window,
};
pub use poller::{PollEvent, Poller, PollerConfig};
pub use source::{Backend, BackendError, HttpBackend, MemoryBackend};
