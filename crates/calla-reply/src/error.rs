//! Error types for the reply generator.
//!
//! These stay internal to the crate in normal operation: `generate`
//! converts every one of them into a fallback reply string.

use thiserror::Error;

/// Errors that can occur requesting a completion.
#[derive(Debug, Error)]
pub enum ReplyError {
    /// The completion API answered with a non-success status.
    #[error("completion API returned HTTP {status}")]
    Api {
        /// HTTP status code of the response.
        status: u16,
    },

    /// The request itself failed (connect, timeout, decode).
    #[error("completion request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// HTTP 200 but no usable choice in the body.
    #[error("completion response had no content")]
    EmptyChoice,
}

/// Result type for reply operations.
pub type Result<T> = std::result::Result<T, ReplyError>;
