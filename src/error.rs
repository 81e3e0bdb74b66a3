//! Error types for client operations.

use thiserror::Error;

/// Errors surfaced by client operations.
#[derive(Error, Debug)]
pub enum Error {
    /// No credential configured
    #[error("no credential configured, use Client::login to set one")]
    Auth,

    /// Malformed caller input
    #[error("validation error: {0}")]
    Validation(String),

    /// HTTP transport failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Discord API returned a non-success status
    #[error("Discord API error {code}: {message}")]
    Api { code: i32, message: String },

    /// Event feed failure
    #[error("event feed error: {0}")]
    Feed(String),
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, Error>;
