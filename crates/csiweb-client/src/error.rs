//! Error types for logger client operations

use thiserror::Error;

/// Result type alias for logger client operations
pub type Result<T> = std::result::Result<T, CsiClientError>;

/// Errors that can occur during logger client operations
#[derive(Error, Debug)]
pub enum CsiClientError {
    /// A query precondition failed before any network call was made
    #[error("Invalid query: {0}")]
    Validation(String),

    /// The requested output format is not accepted by the command
    #[error("Format '{format}' is not accepted by command '{command}'")]
    UnsupportedFormat {
        command: &'static str,
        format: &'static str,
    },

    /// Invalid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Request timed out
    #[error("Request timed out")]
    Timeout,

    /// Connection refused or reset before a response was received
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Any other HTTP transport failure
    #[error("HTTP request failed: {0}")]
    Http(reqwest::Error),

    /// The device answered with a non-2xx status
    #[error("Device error {status}: {message}")]
    DeviceError { status: u16, message: String },

    /// Response body did not match the expected shape
    #[error("Failed to decode response: {0}")]
    Decode(String),

    /// Device operation the client deliberately does not implement
    #[error("Operation not supported: {0}")]
    NotSupported(&'static str),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CsiClientError {
    /// Create a device error from status code and message
    pub fn device_error(status: u16, message: impl Into<String>) -> Self {
        Self::DeviceError {
            status,
            message: message.into(),
        }
    }

    /// Whether a retry could plausibly succeed.
    ///
    /// Timeouts and connection failures are transient; validation errors,
    /// device errors and decode errors are not. The client itself never
    /// retries (single attempt per call), this is for callers.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Timeout | Self::ConnectionFailed(_))
    }
}

impl From<reqwest::Error> for CsiClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_connect() {
            Self::ConnectionFailed(err.to_string())
        } else {
            Self::Http(err)
        }
    }
}
