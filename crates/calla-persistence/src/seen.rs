//! Idempotency store for handled mentions.
//!
//! The store answers one question: has this dedup key been processed
//! before? Records are keyed by [`DedupKey`] and carry the time they
//! were marked, so records older than the retention horizon can be
//! pruned when the store opens. Pruning is best-effort maintenance;
//! correctness inside the horizon never depends on it.
//!
//! Two backends exist. [`FileSeenStore`] persists a JSON map with
//! atomic writes and is the one to deploy: every run is a fresh process
//! and must see what earlier runs handled. [`MemorySeenStore`] keeps
//! the set in memory for single-process setups and tests.
//!
//! Failure policy: reads may fail open (the caller treats an unknown key
//! as "not processed" and accepts the occasional duplicate reply);
//! writes fail closed (a mark that cannot be persisted is reported, and
//! the in-memory map is rolled back so state never diverges from disk).

use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::sync::Mutex;

use calla_models::DedupKey;
use chrono::{DateTime, Duration, Utc};
use tracing::{debug, warn};

use crate::atomic::{load_json, write_json_atomic};
use crate::error::{PersistenceError, Result};

type SeenMap = BTreeMap<String, DateTime<Utc>>;

/// Record of which dedup keys have already been handled.
///
/// `check_and_mark` is the atomic primitive: within one process it is an
/// insert-if-absent under a single lock. Across processes the file
/// backend relies on runs being serialized by [`crate::RunLock`].
pub trait SeenStore: Send + Sync {
    /// Whether `key` has already been marked processed.
    fn has_been_processed(&self, key: &DedupKey) -> Result<bool>;

    /// Records `key` as processed at `at`. Called exactly once per
    /// successfully handled notification.
    fn mark_processed(&self, key: &DedupKey, at: DateTime<Utc>) -> Result<()>;

    /// Atomically records `key` unless it is already present. Returns
    /// `true` if the key was newly recorded.
    fn check_and_mark(&self, key: &DedupKey, at: DateTime<Utc>) -> Result<bool>;
}

/// Durable seen store backed by an atomically written JSON file.
pub struct FileSeenStore {
    path: PathBuf,
    entries: Mutex<SeenMap>,
}

impl FileSeenStore {
    /// Opens the store at `path`, pruning records older than `retention`.
    ///
    /// A file that exists but does not parse is reinitialized empty,
    /// once; if that rewrite also fails the error is returned and
    /// startup should abort rather than loop.
    pub fn open(path: impl Into<PathBuf>, retention: Duration) -> Result<Self> {
        let path = path.into();
        let mut entries = match load_json::<SeenMap>(&path) {
            Ok(Some(map)) => map,
            Ok(None) => SeenMap::new(),
            Err(PersistenceError::Serialization(e)) => {
                warn!(
                    path = %path.display(),
                    error = %e,
                    "seen file is corrupt, reinitializing"
                );
                write_json_atomic(&path, &SeenMap::new())?;
                SeenMap::new()
            }
            Err(e) => return Err(e),
        };

        let horizon = Utc::now() - retention;
        let before = entries.len();
        entries.retain(|_, at| *at >= horizon);
        if entries.len() != before {
            debug!(pruned = before - entries.len(), "pruned expired seen records");
            if let Err(e) = write_json_atomic(&path, &entries) {
                warn!(error = %e, "failed to persist pruned seen records");
            }
        }

        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    /// Number of records currently held.
    pub fn len(&self) -> usize {
        self.entries.lock().expect("seen store mutex poisoned").len()
    }

    /// Whether the store holds no records.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn insert_and_persist(
        &self,
        entries: &mut SeenMap,
        key: &DedupKey,
        at: DateTime<Utc>,
    ) -> Result<()> {
        entries.insert(key.as_str().to_string(), at);
        if let Err(e) = write_json_atomic(&self.path, entries) {
            // Roll back so memory never claims more than disk holds.
            entries.remove(key.as_str());
            return Err(e);
        }
        Ok(())
    }
}

impl SeenStore for FileSeenStore {
    fn has_been_processed(&self, key: &DedupKey) -> Result<bool> {
        let entries = self.entries.lock().expect("seen store mutex poisoned");
        Ok(entries.contains_key(key.as_str()))
    }

    fn mark_processed(&self, key: &DedupKey, at: DateTime<Utc>) -> Result<()> {
        let mut entries = self.entries.lock().expect("seen store mutex poisoned");
        self.insert_and_persist(&mut entries, key, at)
    }

    fn check_and_mark(&self, key: &DedupKey, at: DateTime<Utc>) -> Result<bool> {
        let mut entries = self.entries.lock().expect("seen store mutex poisoned");
        if entries.contains_key(key.as_str()) {
            return Ok(false);
        }
        self.insert_and_persist(&mut entries, key, at)?;
        Ok(true)
    }
}

/// In-memory seen store for single-process deployments and tests.
#[derive(Default)]
pub struct MemorySeenStore {
    entries: Mutex<HashMap<String, DateTime<Utc>>>,
}

impl MemorySeenStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl SeenStore for MemorySeenStore {
    fn has_been_processed(&self, key: &DedupKey) -> Result<bool> {
        let entries = self.entries.lock().expect("seen store mutex poisoned");
        Ok(entries.contains_key(key.as_str()))
    }

    fn mark_processed(&self, key: &DedupKey, at: DateTime<Utc>) -> Result<()> {
        let mut entries = self.entries.lock().expect("seen store mutex poisoned");
        entries.insert(key.as_str().to_string(), at);
        Ok(())
    }

    fn check_and_mark(&self, key: &DedupKey, at: DateTime<Utc>) -> Result<bool> {
        let mut entries = self.entries.lock().expect("seen store mutex poisoned");
        Ok(entries
            .insert(key.as_str().to_string(), at)
            .is_none())
    }
}
