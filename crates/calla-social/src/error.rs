//! Error types for the social client.

use thiserror::Error;

/// Errors that can occur talking to the social platform.
#[derive(Debug, Error)]
pub enum SocialError {
    /// The platform answered with a non-success status.
    #[error("notification source returned HTTP {status}")]
    Api {
        /// HTTP status code of the response.
        status: u16,
    },

    /// The request itself failed (connect, timeout, decode).
    #[error("request to notification source failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The instance base URL could not be combined with an API path.
    #[error("invalid instance URL: {0}")]
    Url(#[from] url::ParseError),
}

/// Result type for social operations.
pub type Result<T> = std::result::Result<T, SocialError>;
