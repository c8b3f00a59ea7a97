//! Backend abstraction for fetching vitals telemetry.
//!
//! The view never talks HTTP directly. It goes through the [`Backend`] trait,
//! implemented by [`HttpBackend`] for a live server and [`MemoryBackend`] for
//! tests and offline demos.

mod error;
mod http;
mod memory;

pub use error::BackendError;
pub use http::{HttpBackend, HttpBackendBuilder};
pub use memory::MemoryBackend;

use std::fmt::Debug;

use async_trait::async_trait;

use crate::data::{DeviceId, Sample};

/// Read/write surface of the telemetry backend.
///
/// # Example
///
/// ```
/// use vitals_watch::{Backend, DeviceId, MemoryBackend};
///
/// # tokio_test::block_on(async {
/// let backend = MemoryBackend::new();
/// backend.add_device("ESP32_TEST_01");
/// let devices = backend.devices().await.unwrap();
/// assert_eq!(devices, vec![DeviceId::from("ESP32_TEST_01")]);
/// # });
/// ```
#[async_trait]
pub trait Backend: Send + Sync + Debug {
    /// List known device identifiers, oldest registration first.
    async fn devices(&self) -> Result<Vec<DeviceId>, BackendError>;

    /// Time-ordered record history of one device.
    async fn records(&self, device: &DeviceId) -> Result<Vec<Sample>, BackendError>;

    /// Erase the stored history of one device.
    async fn clear(&self, device: &DeviceId) -> Result<(), BackendError>;

    /// Link to the backend's CSV export. The view only displays it.
    fn export_link(&self) -> String;

    /// Returns a human-readable description of the backend.
    ///
    /// Used for display in the TUI footer.
    fn description(&self) -> &str;
}
