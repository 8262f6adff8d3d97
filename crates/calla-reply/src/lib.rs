//! Reply generation for Calla.
//!
//! A thin client for an OpenAI-compatible chat-completion endpoint with
//! a fixed caretaker persona. The contract the orchestrator relies on:
//! [`ReplyGenerator::generate`] always yields a postable string. Upstream
//! failures are absorbed into persona-consistent fallback replies and
//! never surface as errors.

pub mod client;
pub mod config;
pub mod error;

pub use client::{ReplyClient, ReplyGenerator};
pub use config::GeneratorConfig;
pub use error::{ReplyError, Result};
