//! In-memory backend.
//!
//! Holds device histories in process. Used by the tests and by library
//! consumers who feed samples from their own transport.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::{Backend, BackendError};
use crate::data::{DeviceId, Sample};

#[derive(Debug, Default)]
struct Inner {
    devices: Vec<DeviceId>,
    records: HashMap<DeviceId, Vec<Sample>>,
    fail_devices: bool,
    fail_records: bool,
    fail_clear: bool,
    records_delay: HashMap<DeviceId, Duration>,
    clear_delay: Option<Duration>,
    device_calls: usize,
    record_calls: usize,
    clear_calls: Vec<DeviceId>,
}

/// A backend that keeps everything in memory.
///
/// Clones share state, so a test can keep one handle while the view owns
/// another.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a device. Registration order is catalog order.
    pub fn add_device(&self, device: impl Into<DeviceId>) {
        let device = device.into();
        let mut inner = self.inner.lock();
        if !inner.devices.contains(&device) {
            inner.devices.push(device);
        }
    }

    /// Drop a device from the catalog. Its history is kept.
    pub fn remove_device(&self, device: &DeviceId) {
        self.inner.lock().devices.retain(|d| d != device);
    }

    /// Append a sample to a device's history, registering the device if needed.
    pub fn push_sample(&self, device: impl Into<DeviceId>, sample: Sample) {
        let device = device.into();
        self.add_device(device.clone());
        self.inner.lock().records.entry(device).or_default().push(sample);
    }

    /// Make `/devices` fail until reset.
    pub fn set_fail_devices(&self, fail: bool) {
        self.inner.lock().fail_devices = fail;
    }

    /// Make `/records` fail until reset.
    pub fn set_fail_records(&self, fail: bool) {
        self.inner.lock().fail_records = fail;
    }

    /// Make `/clear` fail until reset. The history is left intact.
    pub fn set_fail_clear(&self, fail: bool) {
        self.inner.lock().fail_clear = fail;
    }

    /// Delay `/records` responses for one device.
    pub fn set_records_delay(&self, device: impl Into<DeviceId>, delay: Duration) {
        self.inner.lock().records_delay.insert(device.into(), delay);
    }

    /// Delay `/clear` responses. The history is erased when the delay ends.
    pub fn set_clear_delay(&self, delay: Duration) {
        self.inner.lock().clear_delay = Some(delay);
    }

    /// Number of `/devices` requests served.
    pub fn device_calls(&self) -> usize {
        self.inner.lock().device_calls
    }

    /// Number of `/records` requests served.
    pub fn record_calls(&self) -> usize {
        self.inner.lock().record_calls
    }

    /// Devices for which `/clear` was requested, in order.
    pub fn clear_calls(&self) -> Vec<DeviceId> {
        self.inner.lock().clear_calls.clone()
    }

    /// Total number of requests of any kind.
    pub fn total_calls(&self) -> usize {
        let inner = self.inner.lock();
        inner.device_calls + inner.record_calls + inner.clear_calls.len()
    }
}

#[async_trait]
impl Backend for MemoryBackend {
    async fn devices(&self) -> Result<Vec<DeviceId>, BackendError> {
        let mut inner = self.inner.lock();
        inner.device_calls += 1;
        if inner.fail_devices {
            return Err(BackendError::Connection("memory backend offline".to_string()));
        }
        Ok(inner.devices.clone())
    }

    async fn records(&self, device: &DeviceId) -> Result<Vec<Sample>, BackendError> {
        let delay = {
            let mut inner = self.inner.lock();
            inner.record_calls += 1;
            inner.records_delay.get(device).copied()
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let inner = self.inner.lock();
        if inner.fail_records {
            return Err(BackendError::Status(503));
        }
        Ok(inner.records.get(device).cloned().unwrap_or_default())
    }

    async fn clear(&self, device: &DeviceId) -> Result<(), BackendError> {
        let delay = {
            let mut inner = self.inner.lock();
            inner.clear_calls.push(device.clone());
            inner.clear_delay
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let mut inner = self.inner.lock();
        if inner.fail_clear {
            return Err(BackendError::Status(500));
        }
        inner.records.remove(device);
        Ok(())
    }

    fn export_link(&self) -> String {
        "memory://export".to_string()
    }

    fn description(&self) -> &str {
        "memory"
    }
}
