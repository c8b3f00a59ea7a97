//! Error types for backend access.

use thiserror::Error;

/// Errors that can occur when talking to the telemetry backend.
///
/// All of them are transient from the view's point of view: the poller logs
/// them and retries on the next tick.
#[derive(Debug, Error)]
pub enum BackendError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// Backend answered with a non-success status.
    #[error("Backend returned status {0}")]
    Status(u16),

    /// Failed to parse response.
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// Connection failed.
    #[error("Connection failed: {0}")]
    Connection(String),

    /// Timeout waiting for response.
    #[error("Request timed out")]
    Timeout,
}

impl From<reqwest::Error> for BackendError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            BackendError::Timeout
        } else if err.is_connect() {
            BackendError::Connection(err.to_string())
        } else if err.is_decode() {
            BackendError::Parse(err.to_string())
        } else {
            BackendError::Http(err.to_string())
        }
    }
}
