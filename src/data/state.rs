//! The vitals view state container.
//!
//! All view state lives here and changes only through the transition
//! functions below. Poll results are applied whole: the latest snapshot and
//! the window always come from the same batch.

use std::time::Instant;

use thiserror::Error;

use super::alert::{evaluate, Alert, Thresholds};
use super::sample::{DeviceId, Sample};
use super::window::{derive_window, Window};

/// A record history fetched for one device by one poll tick.
#[derive(Debug, Clone)]
pub struct SampleBatch {
    pub device: DeviceId,
    /// Selection epoch the poller was started under.
    pub epoch: u64,
    /// Monotonic tick sequence number.
    pub tick: u64,
    pub records: Vec<Sample>,
}

/// Outcome of [`VitalsState::apply_samples`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// Window and latest snapshot were replaced.
    Updated,
    /// Batch had no records; nothing changed.
    Empty,
    /// Batch belongs to a device that is no longer selected.
    StaleDevice,
    /// Batch was fetched before the last selection change or clear.
    StaleEpoch,
    /// A newer tick has already been applied.
    OutOfOrder,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClearError {
    #[error("Pick a device first")]
    NoDeviceSelected,
}

#[derive(Debug, Clone, Default)]
pub struct VitalsState {
    devices: Vec<DeviceId>,
    selected: Option<DeviceId>,
    latest: Option<Sample>,
    window: Window,
    epoch: u64,
    last_tick: Option<u64>,
    last_updated: Option<Instant>,
}

impl VitalsState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Known devices, in backend order.
    pub fn devices(&self) -> &[DeviceId] {
        &self.devices
    }

    pub fn selected(&self) -> Option<&DeviceId> {
        self.selected.as_ref()
    }

    /// The most recent sample, or None before the first successful fetch.
    pub fn latest(&self) -> Option<&Sample> {
        self.latest.as_ref()
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    /// Counter bumped on every selection change and clear.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// When the window was last replaced.
    pub fn last_updated(&self) -> Option<Instant> {
        self.last_updated
    }

    /// Whether the selected device has dropped out of the catalog.
    pub fn selection_is_stale(&self) -> bool {
        match &self.selected {
            Some(id) => !self.devices.contains(id),
            None => false,
        }
    }

    /// Alerts for the current latest snapshot.
    pub fn alerts(&self, thresholds: &Thresholds) -> Vec<Alert> {
        evaluate(self.latest.as_ref(), thresholds)
    }

    /// Replace the device catalog.
    ///
    /// If nothing is selected yet, the last (most recently registered) device
    /// is selected and returned so the caller can restart polling for it. A
    /// selected device that vanished from the catalog stays selected.
    pub fn apply_device_list(&mut self, devices: Vec<DeviceId>) -> Option<DeviceId> {
        self.devices = devices;

        if self.selected.is_none() {
            if let Some(last) = self.devices.last().cloned() {
                self.select_device(Some(last.clone()));
                return Some(last);
            }
        }
        None
    }

    /// Apply a fetched batch if it is still current.
    pub fn apply_samples(&mut self, batch: SampleBatch) -> Applied {
        if self.selected.as_ref() != Some(&batch.device) {
            return Applied::StaleDevice;
        }
        if batch.epoch != self.epoch {
            return Applied::StaleEpoch;
        }
        if self.last_tick.is_some_and(|last| batch.tick <= last) {
            return Applied::OutOfOrder;
        }
        let Some(last) = batch.records.last() else {
            return Applied::Empty;
        };

        self.latest = Some(last.clone());
        self.window = derive_window(&batch.records);
        self.last_tick = Some(batch.tick);
        self.last_updated = Some(Instant::now());
        Applied::Updated
    }

    /// Switch the active device, dropping everything shown for the old one.
    ///
    /// Returns false if the selection did not change.
    pub fn select_device(&mut self, device: Option<DeviceId>) -> bool {
        if self.selected == device {
            return false;
        }
        self.selected = device;
        self.reset();
        true
    }

    /// Reset the selected device's view ahead of a backend clear.
    ///
    /// Returns the device whose history should be erased. With nothing
    /// selected the state is left untouched.
    pub fn clear(&mut self) -> Result<DeviceId, ClearError> {
        let device = self.selected.clone().ok_or(ClearError::NoDeviceSelected)?;
        self.reset();
        Ok(device)
    }

    fn reset(&mut self) {
        self.latest = None;
        self.window = Window::default();
        self.epoch += 1;
        self.last_tick = None;
        self.last_updated = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::window::MAX_POINTS;

    fn ids(names: &[&str]) -> Vec<DeviceId> {
        names.iter().map(|n| DeviceId::from(*n)).collect()
    }

    fn records(device: &str, n: usize, hr_base: f64) -> Vec<Sample> {
        (0..n)
            .map(|i| Sample {
                hr: Some(hr_base + i as f64),
                spo2: Some(97.0),
                temp: Some(36.6),
                hum: Some(45.0),
                device_id: device.to_string(),
                received_time: Some(format!("t{}", i)),
            })
            .collect()
    }

    fn batch(state: &VitalsState, device: &str, tick: u64, recs: Vec<Sample>) -> SampleBatch {
        SampleBatch {
            device: DeviceId::from(device),
            epoch: state.epoch(),
            tick,
            records: recs,
        }
    }

    #[test]
    fn test_device_list_selects_last_when_unselected() {
        let mut state = VitalsState::new();
        let picked = state.apply_device_list(ids(&["a", "b", "c"]));
        assert_eq!(picked, Some(DeviceId::from("c")));
        assert_eq!(state.selected(), Some(&DeviceId::from("c")));
    }

    #[test]
    fn test_device_list_keeps_existing_selection() {
        let mut state = VitalsState::new();
        state.select_device(Some(DeviceId::from("a")));
        let picked = state.apply_device_list(ids(&["a", "b"]));
        assert_eq!(picked, None);
        assert_eq!(state.selected(), Some(&DeviceId::from("a")));
    }

    #[test]
    fn test_empty_device_list_selects_nothing() {
        let mut state = VitalsState::new();
        assert_eq!(state.apply_device_list(Vec::new()), None);
        assert!(state.selected().is_none());
    }

    #[test]
    fn test_vanished_device_stays_selected() {
        let mut state = VitalsState::new();
        state.apply_device_list(ids(&["a", "b"]));
        state.apply_device_list(ids(&["a"]));
        assert_eq!(state.selected(), Some(&DeviceId::from("b")));
        assert!(state.selection_is_stale());
    }

    #[test]
    fn test_apply_samples_updates_latest_and_window_together() {
        let mut state = VitalsState::new();
        state.select_device(Some(DeviceId::from("a")));

        let b = batch(&state, "a", 1, records("a", 100, 50.0));
        assert_eq!(state.apply_samples(b), Applied::Updated);

        let latest = state.latest().unwrap();
        assert_eq!(latest.hr, Some(149.0));
        assert_eq!(state.window().len(), MAX_POINTS);
        assert_eq!(state.window().hr.last().copied().flatten(), latest.hr);
        assert!(state.last_updated().is_some());
    }

    #[test]
    fn test_empty_batch_changes_nothing() {
        let mut state = VitalsState::new();
        state.select_device(Some(DeviceId::from("a")));
        let b = batch(&state, "a", 1, records("a", 3, 60.0));
        state.apply_samples(b);

        let b = batch(&state, "a", 2, Vec::new());
        assert_eq!(state.apply_samples(b), Applied::Empty);
        assert_eq!(state.window().len(), 3);
        assert_eq!(state.latest().unwrap().hr, Some(62.0));
    }

    #[test]
    fn test_old_device_result_discarded_after_switch() {
        let mut state = VitalsState::new();
        state.select_device(Some(DeviceId::from("old")));
        let in_flight = batch(&state, "old", 1, records("old", 5, 60.0));

        state.select_device(Some(DeviceId::from("new")));
        assert_eq!(state.apply_samples(in_flight), Applied::StaleDevice);
        assert!(state.latest().is_none());
        assert!(state.window().is_empty());

        let fresh = batch(&state, "new", 2, records("new", 2, 80.0));
        assert_eq!(state.apply_samples(fresh), Applied::Updated);
        assert_eq!(state.latest().unwrap().device_id, "new");
    }

    #[test]
    fn test_batch_from_previous_epoch_discarded() {
        let mut state = VitalsState::new();
        state.select_device(Some(DeviceId::from("a")));
        let before_clear = batch(&state, "a", 1, records("a", 5, 60.0));

        state.clear().unwrap();
        assert_eq!(state.apply_samples(before_clear), Applied::StaleEpoch);
        assert!(state.latest().is_none());
    }

    #[test]
    fn test_older_tick_discarded() {
        let mut state = VitalsState::new();
        state.select_device(Some(DeviceId::from("a")));

        let newer = batch(&state, "a", 7, records("a", 10, 60.0));
        let older = batch(&state, "a", 6, records("a", 4, 60.0));
        assert_eq!(state.apply_samples(newer), Applied::Updated);
        assert_eq!(state.apply_samples(older), Applied::OutOfOrder);
        assert_eq!(state.window().len(), 10);
    }

    #[test]
    fn test_select_same_device_is_noop() {
        let mut state = VitalsState::new();
        state.select_device(Some(DeviceId::from("a")));
        let b = batch(&state, "a", 1, records("a", 2, 60.0));
        state.apply_samples(b);
        let epoch = state.epoch();

        assert!(!state.select_device(Some(DeviceId::from("a"))));
        assert_eq!(state.epoch(), epoch);
        assert!(state.latest().is_some());
    }

    #[test]
    fn test_clear_without_selection_leaves_state() {
        let mut state = VitalsState::new();
        state.apply_device_list(Vec::new());
        let epoch = state.epoch();

        assert_eq!(state.clear(), Err(ClearError::NoDeviceSelected));
        assert_eq!(state.epoch(), epoch);
    }

    #[test]
    fn test_clear_resets_to_sentinel() {
        let mut state = VitalsState::new();
        state.select_device(Some(DeviceId::from("a")));
        let b = batch(&state, "a", 1, records("a", 20, 60.0));
        state.apply_samples(b);

        assert_eq!(state.clear(), Ok(DeviceId::from("a")));
        assert!(state.latest().is_none());
        assert!(state.window().hr.is_empty());
        assert!(state.window().spo2.is_empty());
        assert!(state.window().temp.is_empty());
        assert_eq!(state.selected(), Some(&DeviceId::from("a")));
    }

    #[test]
    fn test_window_lengths_invariant_across_updates() {
        let mut state = VitalsState::new();
        state.select_device(Some(DeviceId::from("a")));
        for (tick, n) in [3usize, 61, 0, 200, 1].into_iter().enumerate() {
            let b = batch(&state, "a", tick as u64 + 1, records("a", n, 60.0));
            state.apply_samples(b);
            let w = state.window();
            assert_eq!(w.hr.len(), w.spo2.len());
            assert_eq!(w.spo2.len(), w.temp.len());
            assert!(w.len() <= MAX_POINTS);
        }
    }
}
