//! Data types for the Calla mention bot.
//!
//! This crate provides the wire types received from the social platform
//! and the deduplication keys derived from them. Everything here is plain
//! data; network and persistence concerns live in the other crates.

pub mod dedup;
pub mod ids;
pub mod notification;

// Re-export main types
pub use dedup::{DedupKey, KeyStrategy};
pub use ids::{NotificationId, StatusId};
pub use notification::{Account, Notification, Status, Visibility};
