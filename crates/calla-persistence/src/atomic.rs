//! Atomic JSON state files.
//!
//! Writes go to a temp file in the target directory first and are then
//! renamed over the destination, so readers never observe a partially
//! written file even if the process dies mid-write.

use std::fs;
use std::io::Write;
use std::path::Path;

use crate::error::{PersistenceError, Result};

/// Serializes `value` as pretty JSON and writes it atomically to `path`.
///
/// The parent directory is created if missing. The temp file is created
/// in the same directory as `path` so the final rename stays on one
/// filesystem.
pub fn write_json_atomic<T: serde::Serialize>(path: &Path, value: &T) -> Result<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    if !dir.exists() {
        fs::create_dir_all(dir).map_err(|source| PersistenceError::Directory {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    let mut temp = tempfile::NamedTempFile::new_in(dir).map_err(|source| {
        PersistenceError::Write {
            path: path.to_path_buf(),
            source,
        }
    })?;

    let json = serde_json::to_string_pretty(value)?;
    temp.write_all(json.as_bytes())
        .and_then(|()| temp.flush())
        .map_err(|source| PersistenceError::Write {
            path: path.to_path_buf(),
            source,
        })?;

    temp.persist(path).map_err(|e| PersistenceError::Write {
        path: path.to_path_buf(),
        source: e.error,
    })?;

    Ok(())
}

/// Loads a JSON state file.
///
/// A missing file yields `Ok(None)` (first run). An unreadable file is a
/// [`PersistenceError::Read`]; a file that exists but does not parse is a
/// [`PersistenceError::Serialization`] so callers can apply their own
/// corruption policy.
pub fn load_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    if !path.exists() {
        return Ok(None);
    }
    let data = fs::read_to_string(path).map_err(|source| PersistenceError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Some(serde_json::from_str(&data)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};
    use tempfile::tempdir;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Sample {
        label: String,
        count: u32,
    }

    #[test]
    fn test_write_then_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state.json");

        let value = Sample {
            label: "cursor".to_string(),
            count: 3,
        };
        write_json_atomic(&path, &value).unwrap();

        let loaded: Option<Sample> = load_json(&path).unwrap();
        assert_eq!(loaded, Some(value));
    }

    #[test]
    fn test_write_creates_missing_dirs() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a/b/state.json");

        write_json_atomic(&path, &42u32).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_load_missing_is_none() {
        let dir = tempdir().unwrap();
        let loaded: Option<Sample> = load_json(&dir.path().join("absent.json")).unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn test_load_garbage_is_serialization_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{not json").unwrap();

        let result: Result<Option<Sample>> = load_json(&path);
        assert!(matches!(
            result,
            Err(PersistenceError::Serialization(_))
        ));
    }
}
