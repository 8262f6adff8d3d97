//! Poll-window cursor persistence.
//!
//! The cursor is the lower time bound of the next notifications query.
//! It lives in its own small state file so it survives process restarts;
//! each run reads it at start and advances it at the end, success or
//! failure (the seen store covers anything refetched).

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::atomic::{load_json, write_json_atomic};
use crate::error::{PersistenceError, Result};

#[derive(Debug, Serialize, Deserialize)]
struct CursorState {
    since: DateTime<Utc>,
}

/// Durable poll cursor.
pub struct CursorFile {
    path: PathBuf,
}

impl CursorFile {
    /// Creates a handle for the cursor file at `path`. The file itself
    /// is only created on the first [`advance`](Self::advance).
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the stored cursor, or `default` when none has ever been
    /// stored. Callers pass a bounded lookback as the default so a first
    /// run never fetches unbounded history.
    ///
    /// An unparseable cursor file also falls back to `default`; the next
    /// advance rewrites it.
    pub fn position_or(&self, default: DateTime<Utc>) -> Result<DateTime<Utc>> {
        match load_json::<CursorState>(&self.path) {
            Ok(Some(state)) => Ok(state.since),
            Ok(None) => Ok(default),
            Err(PersistenceError::Serialization(e)) => {
                warn!(
                    path = %self.path.display(),
                    error = %e,
                    "cursor file is corrupt, using default window"
                );
                Ok(default)
            }
            Err(e) => Err(e),
        }
    }

    /// Persists `to` as the new lower bound. A value at or before the
    /// stored cursor is ignored, keeping the cursor monotonic.
    pub fn advance(&self, to: DateTime<Utc>) -> Result<()> {
        if let Ok(Some(state)) = load_json::<CursorState>(&self.path) {
            if to <= state.since {
                return Ok(());
            }
        }
        write_json_atomic(&self.path, &CursorState { since: to })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_first_run_uses_default() {
        let dir = tempdir().unwrap();
        let cursor = CursorFile::new(dir.path().join("cursor.json"));

        let fallback = Utc::now() - Duration::minutes(15);
        assert_eq!(cursor.position_or(fallback).unwrap(), fallback);
    }

    #[test]
    fn test_advance_then_read() {
        let dir = tempdir().unwrap();
        let cursor = CursorFile::new(dir.path().join("cursor.json"));

        let t = Utc::now();
        cursor.advance(t).unwrap();
        assert_eq!(cursor.position_or(t - Duration::hours(1)).unwrap(), t);
    }

    #[test]
    fn test_cursor_is_monotonic() {
        let dir = tempdir().unwrap();
        let cursor = CursorFile::new(dir.path().join("cursor.json"));

        let t = Utc::now();
        cursor.advance(t).unwrap();
        cursor.advance(t - Duration::minutes(5)).unwrap();
        assert_eq!(cursor.position_or(t - Duration::hours(1)).unwrap(), t);
    }

    #[test]
    fn test_survives_new_handle() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cursor.json");
        let t = Utc::now();

        CursorFile::new(&path).advance(t).unwrap();
        let fresh = CursorFile::new(&path);
        assert_eq!(fresh.position_or(t - Duration::hours(1)).unwrap(), t);
    }

    #[test]
    fn test_corrupt_cursor_falls_back() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cursor.json");
        fs::write(&path, "not a cursor").unwrap();

        let fallback = Utc::now() - Duration::minutes(15);
        let cursor = CursorFile::new(&path);
        assert_eq!(cursor.position_or(fallback).unwrap(), fallback);

        // The next advance restores a valid file.
        let t = Utc::now();
        cursor.advance(t).unwrap();
        assert_eq!(cursor.position_or(fallback).unwrap(), t);
    }
}
