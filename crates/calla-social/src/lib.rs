//! Mastodon API client for Calla.
//!
//! Two calls cover everything the bot needs from the platform: fetch
//! mention notifications newer than a timestamp, and post a threaded
//! reply. The [`MentionSource`] trait is the seam the orchestrator
//! depends on, so tests can substitute an in-memory source.

pub mod client;
pub mod error;

pub use client::{MentionSource, ReplyPost, SocialClient};
pub use error::{Result, SocialError};
