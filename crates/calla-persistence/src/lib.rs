//! Persistence layer for Calla.
//!
//! Every run of the bot is a fresh process, so everything it must
//! remember between runs lives here: which mentions were already
//! handled, where the poll window starts, and whether another run is in
//! flight. State files are written atomically (temp file, then rename)
//! so a crash never leaves a half-written file behind.
//!
//! # Example
//!
//! ```no_run
//! use calla_persistence::{FileSeenStore, SeenStore};
//! use calla_models::DedupKey;
//! use chrono::{Duration, Utc};
//!
//! let store = FileSeenStore::open("/var/lib/calla/seen.json", Duration::days(7)).unwrap();
//! let key = DedupKey::from_content("some mention body");
//! if store.check_and_mark(&key, Utc::now()).unwrap() {
//!     // first time we see this mention
//! }
//! ```

pub mod atomic;
pub mod cursor;
pub mod error;
pub mod lock;
pub mod seen;

pub use cursor::CursorFile;
pub use error::{PersistenceError, Result};
pub use lock::RunLock;
pub use seen::{FileSeenStore, MemorySeenStore, SeenStore};
