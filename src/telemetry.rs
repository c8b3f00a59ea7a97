//! Logging setup.
//!
//! The terminal belongs to the UI, so log output goes to a file.
//! `RUST_LOG` overrides the default filter.

use std::fs::{File, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing::Subscriber;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{fmt, EnvFilter, Registry};

/// Build a compact, non-ANSI subscriber writing to `sink`.
pub fn get_subscriber<Sink>(env_filter: &str, sink: Sink) -> impl Subscriber + Send + Sync
where
    Sink: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(env_filter));

    let formatting_layer = fmt::layer().with_writer(sink).with_target(true).with_ansi(false).compact();

    Registry::default().with(env_filter).with(formatting_layer)
}

/// Install the subscriber globally.
pub fn init_subscriber(subscriber: impl Subscriber + Send + Sync) -> Result<()> {
    tracing::subscriber::set_global_default(subscriber).context("Failed to set subscriber")
}

/// Open (or create) the log file for appending.
pub fn open_log_file(path: &Path) -> Result<Mutex<File>> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;
    Ok(Mutex::new(file))
}
