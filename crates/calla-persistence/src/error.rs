//! Error types for the persistence crate.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while reading or writing state files.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// A state directory could not be created.
    #[error("failed to create state directory {path}: {source}")]
    Directory {
        /// Directory that could not be created.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// A state file could not be read.
    #[error("failed to read state file {path}: {source}")]
    Read {
        /// File that could not be read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// A state file could not be written.
    #[error("failed to write state file {path}: {source}")]
    Write {
        /// File that could not be written.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// A state file held JSON that did not parse.
    #[error("state file did not parse: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for persistence operations.
pub type Result<T> = std::result::Result<T, PersistenceError>;
