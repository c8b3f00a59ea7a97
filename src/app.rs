//! Application state and interaction logic.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::runtime::Handle;
use tokio::sync::mpsc;

use crate::chart::{ChartBridge, TerminalCharts};
use crate::data::{Alert, Applied, DeviceId, Thresholds, VitalsState};
use crate::poller::{PollEvent, PollTask, Poller, PollerConfig, PollerContext, TickClock};
use crate::source::Backend;
use crate::ui::Theme;

/// How long a status message stays visible.
const STATUS_TTL: Duration = Duration::from_secs(3);

/// Startup options for [`App`].
#[derive(Debug, Clone, Default)]
pub struct AppOptions {
    pub poller: PollerConfig,
    pub thresholds: Thresholds,
    /// Device to select before the first catalog arrives.
    pub initial_device: Option<DeviceId>,
    pub theme: Theme,
}

/// Main application state.
pub struct App {
    pub running: bool,
    pub show_help: bool,
    pub show_device_picker: bool,
    /// Highlighted row in the device picker.
    pub picker_index: usize,
    /// Device awaiting clear confirmation.
    pub pending_clear: Option<DeviceId>,
    /// Device whose clear request has not resolved yet. Its records are not
    /// fetched until it does.
    pub clearing: Option<DeviceId>,

    pub state: VitalsState,
    pub thresholds: Thresholds,
    pub charts: ChartBridge<TerminalCharts>,
    /// Most recent failed fetch, cleared by the next success of the same task.
    pub last_error: Option<(PollTask, String)>,

    pub theme: Theme,
    pub status_message: Option<(String, Instant)>,

    backend: Arc<dyn Backend>,
    poller_ctx: PollerContext,
    poller: Option<Poller>,
    events: mpsc::UnboundedReceiver<PollEvent>,
    last_device_tick: u64,
}

impl App {
    /// Create the app. Nothing is fetched until [`App::start`].
    pub fn new(backend: Arc<dyn Backend>, options: AppOptions, runtime: Handle) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let poller_ctx = PollerContext {
            backend: backend.clone(),
            runtime,
            config: options.poller,
            clock: TickClock::new(),
            events: tx,
        };

        let mut state = VitalsState::new();
        if let Some(device) = options.initial_device {
            state.select_device(Some(device));
        }

        Self {
            running: true,
            show_help: false,
            show_device_picker: false,
            picker_index: 0,
            pending_clear: None,
            clearing: None,
            state,
            thresholds: options.thresholds,
            charts: ChartBridge::new(TerminalCharts::new()),
            last_error: None,
            theme: options.theme,
            status_message: None,
            backend,
            poller_ctx,
            poller: None,
            events: rx,
            last_device_tick: 0,
        }
    }

    /// Create the chart surfaces and start polling.
    pub fn start(&mut self) {
        self.charts.activate();
        self.charts.push(self.state.window());
        self.restart_poller();
    }

    /// Stop polling and release the chart surfaces.
    pub fn shutdown(&mut self) {
        if let Some(poller) = self.poller.take() {
            poller.stop();
        }
        self.charts.release();
    }

    /// Returns a description of the backend.
    pub fn source_description(&self) -> &str {
        self.backend.description()
    }

    pub fn is_polling(&self) -> bool {
        self.poller.as_ref().is_some_and(Poller::is_running)
    }

    /// Set a temporary status message that will be shown for a few seconds.
    pub fn set_status_message(&mut self, message: String) {
        self.status_message = Some((message, Instant::now()));
    }

    /// Get the current status message if it hasn't expired.
    pub fn get_status_message(&self) -> Option<&str> {
        if let Some((msg, time)) = &self.status_message {
            if time.elapsed() < STATUS_TTL {
                return Some(msg);
            }
        }
        None
    }

    /// Alerts for the latest sample.
    pub fn alerts(&self) -> Vec<Alert> {
        self.state.alerts(&self.thresholds)
    }

    /// Apply every poll result received since the last call.
    ///
    /// Returns the number of events handled.
    pub fn drain_events(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(event) = self.events.try_recv() {
            self.handle_poll_event(event);
            handled += 1;
        }
        handled
    }

    pub fn handle_poll_event(&mut self, event: PollEvent) {
        match event {
            PollEvent::Devices { tick, devices } => {
                if tick < self.last_device_tick {
                    tracing::debug!(tick, last = self.last_device_tick, "Discarding stale catalog");
                    return;
                }
                self.last_device_tick = tick;
                self.clear_error(PollTask::Devices);

                if let Some(picked) = self.state.apply_device_list(devices) {
                    tracing::info!(device = %picked, "Auto-selected device");
                    self.charts.push(self.state.window());
                    self.restart_poller();
                }
                self.clamp_picker();
            }
            PollEvent::Samples(batch) => {
                let device = batch.device.clone();
                let tick = batch.tick;
                match self.state.apply_samples(batch) {
                    Applied::Updated => {
                        self.clear_error(PollTask::Samples);
                        self.charts.push(self.state.window());
                    }
                    Applied::Empty => {}
                    outcome => {
                        tracing::debug!(%device, tick, ?outcome, "Discarding records");
                    }
                }
            }
            PollEvent::Failed { task, error } => {
                self.last_error = Some((task, error));
            }
            PollEvent::Cleared { device, error } => {
                if self.clearing.as_ref() == Some(&device) {
                    self.clearing = None;
                }
                match error {
                    None => self.set_status_message(format!("Cleared data for {}", device)),
                    Some(e) => self.set_status_message(format!("Clear failed for {}: {}", device, e)),
                }
                if self.state.selected() == Some(&device) {
                    self.restart_poller();
                }
            }
        }
    }

    fn clear_error(&mut self, task: PollTask) {
        if self.last_error.as_ref().is_some_and(|(t, _)| *t == task) {
            self.last_error = None;
        }
    }

    /// Stop the current poller and start one bound to the current selection.
    ///
    /// A device with a clear in flight gets the catalog task only.
    pub fn restart_poller(&mut self) {
        let device = self
            .state
            .selected()
            .filter(|d| self.clearing.as_ref() != Some(*d))
            .cloned();
        self.poller = None;
        self.poller = Some(Poller::start(&self.poller_ctx, device, self.state.epoch()));
    }

    /// Force an immediate catalog refresh by restarting the poller.
    pub fn refresh(&mut self) {
        self.restart_poller();
        self.set_status_message("Refreshing...".to_string());
    }

    /// Switch to `device`, dropping everything shown for the previous one.
    pub fn select_device(&mut self, device: DeviceId) {
        if !self.state.select_device(Some(device.clone())) {
            return;
        }
        tracing::info!(%device, "Selected device");
        self.last_error = None;
        self.charts.push(self.state.window());
        self.restart_poller();
    }

    /// Select the device after the current one, wrapping around.
    pub fn select_next_device(&mut self) {
        let count = self.state.devices().len();
        if count == 0 {
            return;
        }
        let next = match self.selected_index() {
            Some(i) => (i + 1) % count,
            None => 0,
        };
        self.select_device(self.state.devices()[next].clone());
    }

    /// Select the device before the current one, wrapping around.
    pub fn select_prev_device(&mut self) {
        let count = self.state.devices().len();
        if count == 0 {
            return;
        }
        let prev = match self.selected_index() {
            Some(0) | None => count - 1,
            Some(i) => i - 1,
        };
        self.select_device(self.state.devices()[prev].clone());
    }

    /// Position of the selected device in the catalog.
    pub fn selected_index(&self) -> Option<usize> {
        let selected = self.state.selected()?;
        self.state.devices().iter().position(|d| d == selected)
    }

    pub fn open_device_picker(&mut self) {
        if self.state.devices().is_empty() {
            self.set_status_message("No devices yet".to_string());
            return;
        }
        self.picker_index = self.selected_index().unwrap_or(0);
        self.show_device_picker = true;
    }

    pub fn close_device_picker(&mut self) {
        self.show_device_picker = false;
    }

    pub fn picker_next(&mut self) {
        let max = self.state.devices().len().saturating_sub(1);
        self.picker_index = (self.picker_index + 1).min(max);
    }

    pub fn picker_prev(&mut self) {
        self.picker_index = self.picker_index.saturating_sub(1);
    }

    /// Select the highlighted device and close the picker.
    pub fn picker_confirm(&mut self) {
        self.show_device_picker = false;
        if let Some(device) = self.state.devices().get(self.picker_index).cloned() {
            self.select_device(device);
        }
    }

    fn clamp_picker(&mut self) {
        let max = self.state.devices().len().saturating_sub(1);
        self.picker_index = self.picker_index.min(max);
    }

    /// Ask for confirmation before erasing the selected device's history.
    ///
    /// With nothing selected this only shows a notice.
    pub fn request_clear(&mut self) {
        match self.state.selected() {
            Some(device) => self.pending_clear = Some(device.clone()),
            None => {
                let notice = crate::data::ClearError::NoDeviceSelected.to_string();
                self.set_status_message(notice);
            }
        }
    }

    /// Erase the pending device's history on the backend and reset the view.
    ///
    /// The view resets at once. Records for the device are not fetched again
    /// until the backend answers, so history still held by the server cannot
    /// repopulate the window. A failed request is reported and not retried.
    pub fn confirm_clear(&mut self) {
        let Some(pending) = self.pending_clear.take() else {
            return;
        };
        if self.state.selected() != Some(&pending) {
            tracing::debug!(device = %pending, "Selection changed before clear was confirmed");
            return;
        }

        let device = match self.state.clear() {
            Ok(device) => device,
            Err(e) => {
                self.set_status_message(e.to_string());
                return;
            }
        };
        self.clearing = Some(device.clone());

        let backend = self.backend.clone();
        let events = self.poller_ctx.events.clone();
        let target = device.clone();
        self.poller_ctx.runtime.spawn(async move {
            let error = match backend.clear(&target).await {
                Ok(()) => {
                    tracing::info!(device = %target, "Cleared device history");
                    None
                }
                Err(e) => {
                    tracing::error!(device = %target, error = %e, "Failed to clear device");
                    Some(e.to_string())
                }
            };
            let _ = events.send(PollEvent::Cleared { device: target, error });
        });

        self.charts.push(self.state.window());
        self.restart_poller();
        self.set_status_message(format!("Clearing data for {}...", device));
    }

    pub fn cancel_clear(&mut self) {
        self.pending_clear = None;
    }

    /// URL of the backend's CSV export.
    pub fn export_link(&self) -> String {
        self.backend.export_link()
    }

    pub fn show_export_link(&mut self) {
        let link = self.export_link();
        self.set_status_message(format!("Export CSV: {}", link));
    }

    /// Toggle the help overlay.
    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    /// Signal the application to quit.
    pub fn quit(&mut self) {
        self.running = false;
    }
}

impl Drop for App {
    fn drop(&mut self) {
        self.shutdown();
    }
}
