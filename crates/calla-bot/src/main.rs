//! Calla bot binary.
//!
//! One invocation is one poll-and-reply run; schedule it every minute
//! or two:
//! ```bash
//! CALLA_INSTANCE_URL=https://example.social \
//! CALLA_SOCIAL_TOKEN=xxx CALLA_COMPLETION_KEY=yyy calla-bot
//! ```

use std::path::PathBuf;

use chrono::Duration;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use calla_bot::config::BotConfig;
use calla_bot::runner::{BotRunner, RunSettings};
use calla_persistence::{CursorFile, FileSeenStore, RunLock};
use calla_reply::ReplyClient;
use calla_social::SocialClient;

/// How old a lock file must be before a new run treats it as abandoned.
const LOCK_STALE_MINUTES: i64 = 10;

/// Calla - replies to trigger-phrase mentions through a completion API
#[derive(Parser, Debug)]
#[command(name = "calla-bot")]
#[command(about = "Polls a social instance for mentions and replies via a completion API")]
struct Args {
    /// Override the state directory
    #[arg(long)]
    state_dir: Option<PathBuf>,

    /// Verbose logging (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // A local .env is honored when present.
    let _ = dotenvy::dotenv();

    let filter = match args.verbose {
        0 => "calla_bot=info,calla_social=info,calla_reply=info,calla_persistence=info",
        1 => "calla_bot=debug,calla_social=debug,calla_reply=debug,calla_persistence=debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut config = BotConfig::from_env()?;
    if let Some(dir) = args.state_dir {
        config.state_dir = dir;
    }

    let stale_after = Duration::minutes(LOCK_STALE_MINUTES);
    let Some(_lock) = RunLock::acquire(&config.lock_file(), stale_after)? else {
        tracing::info!("another run is in progress, exiting");
        return Ok(());
    };

    let seen = FileSeenStore::open(config.seen_file(), config.retention)?;
    let cursor = CursorFile::new(config.cursor_file());
    let social = SocialClient::new(config.instance_url.clone(), config.social_token.clone())?;
    let generator = ReplyClient::new(config.generator.clone(), config.completion_key.clone())?;

    let settings = RunSettings {
        trigger: config.trigger.clone(),
        strategy: config.strategy,
        lookback: config.lookback,
    };
    let runner = BotRunner::new(&social, &generator, &seen, &cursor, settings);
    runner.run().await?;

    Ok(())
}
