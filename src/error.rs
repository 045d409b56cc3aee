//! Error types for the page client.

use thiserror::Error;

/// Page client error type.
///
/// Controllers never surface these to the user directly: each call site
/// logs the error and shows a fixed notice instead.
#[derive(Error, Debug)]
pub enum Error {
    /// HTTP request failed before a response arrived.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Invalid URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Server answered with a non-success status.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response body, as text.
        message: String,
    },

    /// A file attachment could not be read.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The document has no element with this id.
    #[error("Element not found: #{0}")]
    MissingElement(String),
}

/// Result type alias for page client operations.
pub type Result<T> = std::result::Result<T, Error>;
