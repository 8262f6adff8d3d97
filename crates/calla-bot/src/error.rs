//! Error types for the orchestrator.

use thiserror::Error;

/// Errors that can end a bot run.
#[derive(Debug, Error)]
pub enum BotError {
    /// Configuration missing or invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// The notification fetch failed; the run was aborted.
    #[error("failed to fetch mentions: {0}")]
    Fetch(#[from] calla_social::SocialError),

    /// State persistence failed.
    #[error("state persistence failed: {0}")]
    Store(#[from] calla_persistence::PersistenceError),

    /// The reply client could not be constructed.
    #[error("reply client error: {0}")]
    Reply(#[from] calla_reply::ReplyError),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for orchestrator operations.
pub type Result<T> = std::result::Result<T, BotError>;
