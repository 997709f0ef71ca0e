//! Error types for the QR form client

use thiserror::Error;

/// Result type alias for form and backend operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while talking to the generation backend or loading
/// the returned image.
///
/// None of these reach the rendered surface directly: the form collapses
/// request failures into a single generic message and only logs the detail.
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to set up the backend client
    #[error("Backend initialization failed: {0}")]
    InitializationError(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    /// Transport-level failure (connection refused, reset, DNS...)
    #[error("Request failed: {0}")]
    RequestError(String),

    /// The backend answered with a non-success status
    #[error("Backend responded with status {status}")]
    StatusError { status: u16 },

    /// The response body could not be decoded
    #[error("Malformed response: {0}")]
    DecodeError(String),

    /// The image resource could not be loaded or decoded
    #[error("Failed to load image: {0}")]
    ImageLoadError(String),

    /// Operation timed out
    #[error("Operation timed out after {0}ms")]
    Timeout(u64),

    /// Generic error
    #[error("{0}")]
    Other(String),
}
