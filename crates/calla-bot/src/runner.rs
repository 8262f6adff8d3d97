//! One poll-and-reply run.
//!
//! The runner drives a single cycle to completion:
//!
//! ```text
//! START -> FETCH -> [FETCH_FAILED]
//! FETCH -> FILTER -> PER_ITEM(trigger?) -> {NO_TRIGGER,
//!          GENERATE -> POST -> {POST_OK, POST_FAILED}}
//! ... -> ADVANCE_CURSOR -> [DONE]
//! ```
//!
//! Notifications are handled sequentially in the order the source
//! returns them. A post failure affects only its own notification; a
//! fetch failure aborts the batch. Either way the cursor advances to
//! the run's start time and the summary is logged, so a stretch of
//! failing runs can never wedge the poll window.

use calla_models::{DedupKey, KeyStrategy, Notification};
use calla_persistence::{CursorFile, SeenStore};
use calla_reply::ReplyGenerator;
use calla_social::{MentionSource, ReplyPost};
use chrono::{Duration, Utc};
use tracing::{debug, error, info, warn};

use crate::error::{BotError, Result};
use crate::sanitize;
use crate::trigger;

/// Tunables for a run.
#[derive(Debug, Clone)]
pub struct RunSettings {
    /// Trigger phrase; matching is case-insensitive.
    pub trigger: String,
    /// How dedup keys are derived.
    pub strategy: KeyStrategy,
    /// Poll window used when no cursor has ever been stored.
    pub lookback: Duration,
}

/// Counters for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Notifications returned by the fetch.
    pub fetched: usize,
    /// Replies posted and recorded.
    pub replied: usize,
    /// Skipped because the dedup key was already processed.
    pub skipped_seen: usize,
    /// Skipped because the notification had no status payload.
    pub skipped_malformed: usize,
    /// Fetched but carrying no trigger phrase.
    pub without_trigger: usize,
    /// Replies the platform refused; eligible again next run.
    pub post_failures: usize,
    /// Seen-store operations that failed.
    pub store_errors: usize,
}

impl RunSummary {
    fn log(&self) {
        info!(
            fetched = self.fetched,
            replied = self.replied,
            skipped_seen = self.skipped_seen,
            skipped_malformed = self.skipped_malformed,
            without_trigger = self.without_trigger,
            post_failures = self.post_failures,
            store_errors = self.store_errors,
            "run finished"
        );
    }
}

/// Drives one poll-and-reply cycle over abstract collaborators.
pub struct BotRunner<'a> {
    source: &'a dyn MentionSource,
    generator: &'a dyn ReplyGenerator,
    seen: &'a dyn SeenStore,
    cursor: &'a CursorFile,
    settings: RunSettings,
}

impl<'a> BotRunner<'a> {
    /// Creates a runner. The trigger is lowercased once here; bodies are
    /// lowercased per item.
    pub fn new(
        source: &'a dyn MentionSource,
        generator: &'a dyn ReplyGenerator,
        seen: &'a dyn SeenStore,
        cursor: &'a CursorFile,
        settings: RunSettings,
    ) -> Self {
        let settings = RunSettings {
            trigger: settings.trigger.to_lowercase(),
            ..settings
        };
        Self {
            source,
            generator,
            seen,
            cursor,
            settings,
        }
    }

    /// Executes one run.
    ///
    /// On a fetch failure the error is returned, but only after the
    /// cursor has advanced and the summary has been logged.
    pub async fn run(&self) -> Result<RunSummary> {
        let run_start = Utc::now();
        let since = self
            .cursor
            .position_or(run_start - self.settings.lookback)?;
        info!(since = %since, "starting poll run");

        let mut summary = RunSummary::default();
        let outcome = match self.source.fetch_mentions(since).await {
            Ok(notifications) => {
                summary.fetched = notifications.len();
                debug!(count = notifications.len(), "fetched notifications");
                for notification in &notifications {
                    self.handle(notification, &mut summary).await;
                }
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "failed to fetch mentions");
                Err(BotError::Fetch(e))
            }
        };

        // Unconditional advancement; dedup covers anything refetched.
        let advanced = self.cursor.advance(run_start);
        if let Err(e) = &advanced {
            error!(error = %e, "failed to advance poll cursor");
        }
        summary.log();

        outcome?;
        advanced?;
        Ok(summary)
    }

    async fn handle(&self, notification: &Notification, summary: &mut RunSummary) {
        let Some(status) = notification.status.as_ref() else {
            debug!(id = %notification.id, "skipping notification without status");
            summary.skipped_malformed += 1;
            return;
        };

        let body = sanitize::strip_html(&status.content).to_lowercase();
        let key = DedupKey::derive(self.settings.strategy, notification, &body);

        match self.seen.has_been_processed(&key) {
            Ok(true) => {
                debug!(key = %key, "skipping already-processed mention");
                summary.skipped_seen += 1;
                return;
            }
            Ok(false) => {}
            Err(e) => {
                // Fail open: an unreadable store reads as "not processed".
                warn!(error = %e, "seen check failed, treating mention as new");
                summary.store_errors += 1;
            }
        }

        let Some(user_text) = trigger::extract_user_text(&body, &self.settings.trigger) else {
            summary.without_trigger += 1;
            return;
        };

        info!(author = %status.account.acct, "handling mention");
        let reply_text = self.generator.generate(&user_text).await;

        let reply = ReplyPost::threaded(status, &reply_text);
        if let Err(e) = self.source.post_reply(&reply).await {
            warn!(author = %status.account.acct, error = %e, "failed to post reply");
            summary.post_failures += 1;
            return;
        }

        match self.seen.check_and_mark(&key, Utc::now()) {
            Ok(true) => {}
            Ok(false) => warn!(key = %key, "mention was already recorded as processed"),
            Err(e) => {
                error!(key = %key, error = %e, "failed to record processed mention");
                summary.store_errors += 1;
            }
        }
        summary.replied += 1;
    }
}
