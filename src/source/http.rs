//! HTTP backend.
//!
//! Talks to the telemetry server's JSON API:
//!
//! | Method | Path                   | Response            |
//! |--------|------------------------|---------------------|
//! | GET    | `/devices`             | `["id", ...]`       |
//! | GET    | `/records?device={id}` | `[Sample, ...]`     |
//! | POST   | `/clear`               | ack (ignored)       |
//! | GET    | `/export`              | CSV (link only)     |

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde_json::json;

use super::{Backend, BackendError};
use crate::data::{DeviceId, Sample};

const DEFAULT_ENDPOINT: &str = "http://localhost:5000";

/// Backend reached over HTTP.
///
/// ```
/// use std::time::Duration;
/// use vitals_watch::{Backend, HttpBackend};
///
/// let backend = HttpBackend::builder()
///     .endpoint("http://localhost:5000")
///     .timeout(Duration::from_secs(5))
///     .build()
///     .unwrap();
/// assert_eq!(backend.export_link(), "http://localhost:5000/export");
/// ```
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    endpoint: String,
    description: String,
}

impl HttpBackend {
    /// Create a new builder for configuring the backend.
    pub fn builder() -> HttpBackendBuilder {
        HttpBackendBuilder::default()
    }

    /// The base URL all paths are resolved against.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.endpoint, path)
    }

    async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, BackendError> {
        let response = check_status(response)?;
        let body = response.bytes().await?;
        parse_body(&body)
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn devices(&self) -> Result<Vec<DeviceId>, BackendError> {
        let response = self.client.get(self.url("/devices")).send().await?;
        let devices: Option<Vec<DeviceId>> = Self::read_json(response).await?;
        Ok(devices.unwrap_or_default())
    }

    async fn records(&self, device: &DeviceId) -> Result<Vec<Sample>, BackendError> {
        let response = self
            .client
            .get(self.url("/records"))
            .query(&[("device", device.as_str())])
            .send()
            .await?;
        let records: Option<Vec<Sample>> = Self::read_json(response).await?;
        Ok(records.unwrap_or_default())
    }

    async fn clear(&self, device: &DeviceId) -> Result<(), BackendError> {
        let response = self
            .client
            .post(self.url("/clear"))
            .json(&json!({ "device": device }))
            .send()
            .await?;
        check_status(response)?;
        Ok(())
    }

    fn export_link(&self) -> String {
        self.url("/export")
    }

    fn description(&self) -> &str {
        &self.description
    }
}

fn check_status(response: Response) -> Result<Response, BackendError> {
    let status = response.status();
    if !status.is_success() {
        return Err(BackendError::Status(status.as_u16()));
    }
    Ok(response)
}

/// An empty body reads as JSON `null`.
fn parse_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, BackendError> {
    let body: &[u8] = if body.iter().all(u8::is_ascii_whitespace) {
        &b"null"[..]
    } else {
        body
    };
    serde_json::from_slice(body).map_err(|e| BackendError::Parse(e.to_string()))
}

/// Builder for HttpBackend.
#[derive(Debug, Default)]
pub struct HttpBackendBuilder {
    endpoint: Option<String>,
    timeout: Option<Duration>,
}

impl HttpBackendBuilder {
    /// Set the server base URL (e.g., "http://localhost:5000").
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Set the request timeout (default: 5 seconds).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build the backend.
    pub fn build(self) -> Result<HttpBackend, BackendError> {
        let timeout = self.timeout.unwrap_or(Duration::from_secs(5));

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BackendError::Http(e.to_string()))?;

        let endpoint = self
            .endpoint
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(HttpBackend {
            client,
            description: format!("http: {}", endpoint),
            endpoint,
        })
    }
}
