//! Sampling poller.
//!
//! Two periodic tasks feed the view:
//!
//! - the device catalog task fetches `/devices` immediately and then every
//!   `device_interval` (15s by default);
//! - the sample task fetches `/records` for the selected device every
//!   `sample_interval` (1s by default), starting one interval after launch.
//!
//! Each tick spawns its own fetch, so a slow request never delays the cadence.
//! Results are sent over a channel tagged with a monotonic tick number and the
//! selection epoch; the view decides whether they are still current.
//!
//! A [`Poller`] is bound to one selection. The view stops it and starts a new
//! one whenever the selection changes. Stopping (or dropping) cancels both
//! timers immediately; fetches already in flight check the cancellation token
//! before reporting.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::data::{DeviceId, SampleBatch};
use crate::source::Backend;

/// Which periodic task produced an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollTask {
    Devices,
    Samples,
}

impl PollTask {
    pub fn label(&self) -> &'static str {
        match self {
            PollTask::Devices => "devices",
            PollTask::Samples => "records",
        }
    }
}

/// Result of one poll tick.
#[derive(Debug, Clone)]
pub enum PollEvent {
    /// Fresh device catalog.
    Devices { tick: u64, devices: Vec<DeviceId> },
    /// Non-empty record history for the polled device.
    Samples(SampleBatch),
    /// A fetch failed. State should be left as it is.
    Failed { task: PollTask, error: String },
    /// A clear request for `device` finished. `error` is set if it failed.
    Cleared {
        device: DeviceId,
        error: Option<String>,
    },
}

/// Polling cadence.
#[derive(Debug, Clone)]
pub struct PollerConfig {
    pub device_interval: Duration,
    pub sample_interval: Duration,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            device_interval: Duration::from_secs(15),
            sample_interval: Duration::from_secs(1),
        }
    }
}

/// Source of monotonic tick numbers, shared across poller restarts.
#[derive(Debug, Clone, Default)]
pub struct TickClock(Arc<AtomicU64>);

impl TickClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next tick number. The first call returns 1.
    pub fn next(&self) -> u64 {
        self.0.fetch_add(1, Ordering::SeqCst) + 1
    }
}

/// Everything a poller needs that outlives a single selection.
#[derive(Debug, Clone)]
pub struct PollerContext {
    pub backend: Arc<dyn Backend>,
    pub runtime: Handle,
    pub config: PollerConfig,
    pub clock: TickClock,
    pub events: mpsc::UnboundedSender<PollEvent>,
}

/// Handle to the two running poll tasks for one selection.
#[derive(Debug)]
pub struct Poller {
    cancel: CancellationToken,
    device: Option<DeviceId>,
    epoch: u64,
}

impl Poller {
    /// Launch the catalog and sample tasks.
    ///
    /// With no device selected only the catalog task runs.
    pub fn start(ctx: &PollerContext, device: Option<DeviceId>, epoch: u64) -> Self {
        let cancel = CancellationToken::new();

        tracing::debug!(
            device = device.as_ref().map(DeviceId::as_str),
            epoch,
            "Starting poller"
        );

        ctx.runtime.spawn(run_device_catalog(ctx.clone(), cancel.clone()));

        if let Some(ref device) = device {
            ctx.runtime.spawn(run_samples(
                ctx.clone(),
                device.clone(),
                epoch,
                cancel.clone(),
            ));
        }

        Self {
            cancel,
            device,
            epoch,
        }
    }

    /// Cancel both timers. In-flight fetches finish but do not report.
    pub fn stop(&self) {
        if !self.cancel.is_cancelled() {
            tracing::debug!(
                device = self.device.as_ref().map(DeviceId::as_str),
                epoch = self.epoch,
                "Stopping poller"
            );
            self.cancel.cancel();
        }
    }

    pub fn is_running(&self) -> bool {
        !self.cancel.is_cancelled()
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn run_device_catalog(ctx: PollerContext, cancel: CancellationToken) {
    let mut interval = tokio::time::interval(ctx.config.device_interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = interval.tick() => {
                let tick = ctx.clock.next();
                let backend = ctx.backend.clone();
                let events = ctx.events.clone();
                let cancel = cancel.clone();

                ctx.runtime.spawn(async move {
                    let result = backend.devices().await;
                    if cancel.is_cancelled() {
                        return;
                    }
                    let event = match result {
                        Ok(devices) => {
                            tracing::trace!(tick, count = devices.len(), "Fetched device catalog");
                            PollEvent::Devices { tick, devices }
                        }
                        Err(e) => {
                            tracing::warn!(error = %e, "Failed to fetch device catalog");
                            PollEvent::Failed {
                                task: PollTask::Devices,
                                error: e.to_string(),
                            }
                        }
                    };
                    let _ = events.send(event);
                });
            }
        }
    }
}

async fn run_samples(
    ctx: PollerContext,
    device: DeviceId,
    epoch: u64,
    cancel: CancellationToken,
) {
    let period = ctx.config.sample_interval;
    let mut interval = tokio::time::interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = interval.tick() => {
                let tick = ctx.clock.next();
                let backend = ctx.backend.clone();
                let events = ctx.events.clone();
                let cancel = cancel.clone();
                let device = device.clone();

                ctx.runtime.spawn(async move {
                    let result = backend.records(&device).await;
                    if cancel.is_cancelled() {
                        tracing::trace!(%device, tick, "Discarding records fetched after cancel");
                        return;
                    }
                    match result {
                        Ok(records) if records.is_empty() => {
                            tracing::trace!(%device, tick, "No records yet");
                        }
                        Ok(records) => {
                            let _ = events.send(PollEvent::Samples(SampleBatch {
                                device,
                                epoch,
                                tick,
                                records,
                            }));
                        }
                        Err(e) => {
                            tracing::warn!(%device, error = %e, "Failed to fetch records");
                            let _ = events.send(PollEvent::Failed {
                                task: PollTask::Samples,
                                error: e.to_string(),
                            });
                        }
                    }
                });
            }
        }
    }
}
