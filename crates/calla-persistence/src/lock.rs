//! Single-run lock file.
//!
//! Scheduled invocations can overlap when a run is slow. The lock file
//! serializes whole runs, which is what makes the file-backed seen
//! store's separate check and mark safe across processes. The file is
//! created with `create_new`, so creation itself is the atomic step.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{PersistenceError, Result};

#[derive(Debug, Serialize, Deserialize)]
struct LockInfo {
    pid: u32,
    acquired_at: DateTime<Utc>,
}

/// Guard for an acquired run lock. Dropping it releases the lock.
pub struct RunLock {
    path: PathBuf,
}

impl RunLock {
    /// Tries to take the lock at `path`. `Ok(None)` means another run
    /// holds it and this invocation should exit cleanly.
    ///
    /// A lock file older than `stale_after`, or one whose contents are
    /// unreadable, is treated as left behind by a crashed run: it is
    /// removed and acquisition retried once.
    pub fn acquire(path: &Path, stale_after: Duration) -> Result<Option<Self>> {
        match Self::try_create(path) {
            Ok(lock) => Ok(Some(lock)),
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                if !Self::is_stale(path, stale_after) {
                    return Ok(None);
                }
                warn!(path = %path.display(), "removing stale run lock");
                let _ = fs::remove_file(path);
                match Self::try_create(path) {
                    Ok(lock) => Ok(Some(lock)),
                    // Lost the race to another invocation doing the same cleanup.
                    Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => Ok(None),
                    Err(source) => Err(PersistenceError::Write {
                        path: path.to_path_buf(),
                        source,
                    }),
                }
            }
            Err(source) => Err(PersistenceError::Write {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    fn try_create(path: &Path) -> std::io::Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)?;
        let info = LockInfo {
            pid: std::process::id(),
            acquired_at: Utc::now(),
        };
        let json = serde_json::to_string(&info)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
        file.write_all(json.as_bytes())?;
        Ok(Self {
            path: path.to_path_buf(),
        })
    }

    fn is_stale(path: &Path, stale_after: Duration) -> bool {
        let info = fs::read_to_string(path)
            .ok()
            .and_then(|s| serde_json::from_str::<LockInfo>(&s).ok());
        match info {
            Some(info) => Utc::now() - info.acquired_at > stale_after,
            // Unreadable lock contents count as stale.
            None => true,
        }
    }
}

impl Drop for RunLock {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            warn!(path = %self.path.display(), error = %e, "failed to release run lock");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn ten_minutes() -> Duration {
        Duration::minutes(10)
    }

    #[test]
    fn test_acquire_is_exclusive() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("run.lock");

        let held = RunLock::acquire(&path, ten_minutes()).unwrap();
        assert!(held.is_some());

        let second = RunLock::acquire(&path, ten_minutes()).unwrap();
        assert!(second.is_none());
    }

    #[test]
    fn test_drop_releases() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("run.lock");

        drop(RunLock::acquire(&path, ten_minutes()).unwrap());
        assert!(!path.exists());

        assert!(RunLock::acquire(&path, ten_minutes()).unwrap().is_some());
    }

    #[test]
    fn test_stale_lock_is_taken_over() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("run.lock");

        let old = LockInfo {
            pid: 1,
            acquired_at: Utc::now() - Duration::hours(1),
        };
        fs::write(&path, serde_json::to_string(&old).unwrap()).unwrap();

        let lock = RunLock::acquire(&path, ten_minutes()).unwrap();
        assert!(lock.is_some());
    }

    #[test]
    fn test_garbage_lock_is_taken_over() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("run.lock");
        fs::write(&path, "???").unwrap();

        assert!(RunLock::acquire(&path, ten_minutes()).unwrap().is_some());
    }

    #[test]
    fn test_fresh_lock_is_respected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("run.lock");

        let fresh = LockInfo {
            pid: 1,
            acquired_at: Utc::now(),
        };
        fs::write(&path, serde_json::to_string(&fresh).unwrap()).unwrap();

        assert!(RunLock::acquire(&path, ten_minutes()).unwrap().is_none());
    }
}
