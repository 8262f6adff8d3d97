//! Environment configuration for a bot run.
//!
//! Every knob is an environment variable so the binary can run from any
//! scheduler with no arguments. Only the instance URL and the two
//! bearer tokens are required.

use std::env;
use std::path::PathBuf;

use calla_models::KeyStrategy;
use calla_reply::GeneratorConfig;
use chrono::Duration;
use url::Url;

use crate::error::{BotError, Result};

/// Instance base URL (required).
pub const INSTANCE_URL_ENV: &str = "CALLA_INSTANCE_URL";

/// Social API bearer token (required).
pub const SOCIAL_TOKEN_ENV: &str = "CALLA_SOCIAL_TOKEN";

/// Completion API bearer token (required).
pub const COMPLETION_KEY_ENV: &str = "CALLA_COMPLETION_KEY";

/// Completion endpoint override.
pub const COMPLETION_URL_ENV: &str = "CALLA_COMPLETION_URL";

/// Completion model override.
pub const COMPLETION_MODEL_ENV: &str = "CALLA_COMPLETION_MODEL";

/// Trigger phrase override.
pub const TRIGGER_ENV: &str = "CALLA_TRIGGER";

/// Dedup strategy: `id` or `fingerprint`.
pub const DEDUP_ENV: &str = "CALLA_DEDUP";

/// State directory override.
pub const STATE_DIR_ENV: &str = "CALLA_STATE_DIR";

/// Seen-record retention horizon in days.
pub const RETENTION_DAYS_ENV: &str = "CALLA_RETENTION_DAYS";

/// First-run lookback window in minutes.
pub const LOOKBACK_MINUTES_ENV: &str = "CALLA_LOOKBACK_MINUTES";

const DEFAULT_TRIGGER: &str = "马蹄莲马蹄莲";
const DEFAULT_RETENTION_DAYS: i64 = 7;
const DEFAULT_LOOKBACK_MINUTES: i64 = 15;
const DEFAULT_STATE_SUBDIR: &str = ".calla/state";

/// Everything a run needs, resolved from the environment.
#[derive(Debug, Clone)]
pub struct BotConfig {
    /// Base URL of the social instance.
    pub instance_url: Url,
    /// Bearer token for the social API.
    pub social_token: String,
    /// Bearer token for the completion API.
    pub completion_key: String,
    /// Completion client configuration.
    pub generator: GeneratorConfig,
    /// Trigger phrase.
    pub trigger: String,
    /// Dedup key strategy.
    pub strategy: KeyStrategy,
    /// Directory holding seen records, cursor, and run lock.
    pub state_dir: PathBuf,
    /// Seen-record retention horizon.
    pub retention: Duration,
    /// First-run lookback window.
    pub lookback: Duration,
}

impl BotConfig {
    /// Resolves configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        let raw_url = required(INSTANCE_URL_ENV)?;
        let instance_url = Url::parse(&raw_url).map_err(|e| {
            BotError::Config(format!("{INSTANCE_URL_ENV} is not a valid URL: {e}"))
        })?;

        let mut generator = GeneratorConfig::new();
        if let Ok(endpoint) = env::var(COMPLETION_URL_ENV) {
            generator = generator.with_endpoint(endpoint);
        }
        if let Ok(model) = env::var(COMPLETION_MODEL_ENV) {
            generator = generator.with_model(model);
        }

        let trigger = env::var(TRIGGER_ENV).unwrap_or_else(|_| DEFAULT_TRIGGER.to_string());
        if trigger.trim().is_empty() {
            return Err(BotError::Config(format!("{TRIGGER_ENV} must not be empty")));
        }

        let strategy = match env::var(DEDUP_ENV) {
            Ok(value) => KeyStrategy::parse(&value).ok_or_else(|| {
                BotError::Config(format!("{DEDUP_ENV} must be \"id\" or \"fingerprint\""))
            })?,
            Err(_) => KeyStrategy::default(),
        };

        let state_dir = env::var(STATE_DIR_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_state_dir());

        Ok(Self {
            instance_url,
            social_token: required(SOCIAL_TOKEN_ENV)?,
            completion_key: required(COMPLETION_KEY_ENV)?,
            generator,
            trigger,
            strategy,
            state_dir,
            retention: Duration::days(positive_int(RETENTION_DAYS_ENV, DEFAULT_RETENTION_DAYS)?),
            lookback: Duration::minutes(positive_int(
                LOOKBACK_MINUTES_ENV,
                DEFAULT_LOOKBACK_MINUTES,
            )?),
        })
    }

    /// Path of the seen-records file.
    pub fn seen_file(&self) -> PathBuf {
        self.state_dir.join("seen.json")
    }

    /// Path of the poll-cursor file.
    pub fn cursor_file(&self) -> PathBuf {
        self.state_dir.join("cursor.json")
    }

    /// Path of the run-lock file.
    pub fn lock_file(&self) -> PathBuf {
        self.state_dir.join("run.lock")
    }
}

fn default_state_dir() -> PathBuf {
    dirs::home_dir()
        .map(|home| home.join(DEFAULT_STATE_SUBDIR))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_STATE_SUBDIR))
}

fn required(var: &str) -> Result<String> {
    env::var(var)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| BotError::Config(format!("missing {var} environment variable")))
}

fn positive_int(var: &str, default: i64) -> Result<i64> {
    match env::var(var) {
        Ok(value) => match value.trim().parse::<i64>() {
            Ok(n) if n > 0 => Ok(n),
            _ => Err(BotError::Config(format!(
                "{var} must be a positive integer, got {value:?}"
            ))),
        },
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> BotConfig {
        BotConfig {
            instance_url: Url::parse("https://example.social").unwrap(),
            social_token: "social".to_string(),
            completion_key: "completion".to_string(),
            generator: GeneratorConfig::default(),
            trigger: DEFAULT_TRIGGER.to_string(),
            strategy: KeyStrategy::default(),
            state_dir: PathBuf::from("/tmp/calla-test"),
            retention: Duration::days(DEFAULT_RETENTION_DAYS),
            lookback: Duration::minutes(DEFAULT_LOOKBACK_MINUTES),
        }
    }

    #[test]
    fn test_state_file_names() {
        let config = sample();
        assert!(config.seen_file().ends_with("seen.json"));
        assert!(config.cursor_file().ends_with("cursor.json"));
        assert!(config.lock_file().ends_with("run.lock"));
    }

    #[test]
    fn test_default_state_dir_under_home() {
        let dir = default_state_dir();
        assert!(dir.ends_with(".calla/state"));
    }
}
