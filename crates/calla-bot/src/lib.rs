//! Poll-and-reply orchestration for Calla.
//!
//! One run: fetch mentions since the cursor, skip what was already
//! handled, extract the trigger payload, generate a persona reply, post
//! it threaded to the original status, and record what was handled.
//! The binary in this crate wires the real collaborators together; the
//! [`runner`] module only sees them through traits.

pub mod config;
pub mod error;
pub mod runner;
pub mod sanitize;
pub mod trigger;

pub use config::BotConfig;
pub use error::{BotError, Result};
pub use runner::{BotRunner, RunSettings, RunSummary};
