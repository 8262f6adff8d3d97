//! HTTP client for the Mastodon notifications and statuses endpoints.

use async_trait::async_trait;
use calla_models::{Notification, Status, StatusId, Visibility};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, trace};
use url::Url;

use crate::error::{Result, SocialError};

/// Fixed timeout for calls to the social platform.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Source of mention notifications and sink for replies.
///
/// Implemented by [`SocialClient`] for the real platform and by fakes in
/// orchestrator tests.
#[async_trait]
pub trait MentionSource: Send + Sync {
    /// Fetches mention notifications delivered after `since`, in the
    /// order the platform returns them.
    async fn fetch_mentions(&self, since: DateTime<Utc>) -> Result<Vec<Notification>>;

    /// Posts a threaded reply.
    async fn post_reply(&self, reply: &ReplyPost) -> Result<()>;
}

/// A reply ready to submit to the statuses endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct ReplyPost {
    /// Full reply text, including the `@author` prefix.
    pub status: String,

    /// Status this reply is threaded under.
    pub in_reply_to_id: StatusId,

    /// Visibility, carried over from the original status.
    pub visibility: Visibility,
}

impl ReplyPost {
    /// Builds a reply to `original`, addressed to its author and
    /// preserving its visibility.
    pub fn threaded(original: &Status, text: &str) -> Self {
        Self {
            status: format!("@{} {}", original.account.acct, text),
            in_reply_to_id: original.id.clone(),
            visibility: original.visibility,
        }
    }
}

/// Client for a Mastodon-compatible instance.
pub struct SocialClient {
    http: reqwest::Client,
    base_url: Url,
    token: String,
}

impl SocialClient {
    /// Creates a client for `base_url` authenticating with `token`.
    pub fn new(base_url: Url, token: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            base_url,
            token: token.into(),
        })
    }
}

#[async_trait]
impl MentionSource for SocialClient {
    async fn fetch_mentions(&self, since: DateTime<Utc>) -> Result<Vec<Notification>> {
        let url = self.base_url.join("api/v1/notifications")?;
        debug!(url = %url, since = %since, "fetching mentions");

        let since = since.to_rfc3339();
        let response = self
            .http
            .get(url)
            .bearer_auth(&self.token)
            .query(&[("types", "mention"), ("since", since.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SocialError::Api {
                status: status.as_u16(),
            });
        }

        let notifications: Vec<Notification> = response.json().await?;
        trace!(count = notifications.len(), "fetched notifications");
        Ok(notifications)
    }

    async fn post_reply(&self, reply: &ReplyPost) -> Result<()> {
        let url = self.base_url.join("api/v1/statuses")?;
        debug!(in_reply_to = %reply.in_reply_to_id, "posting reply");

        let response = self
            .http
            .post(url)
            .bearer_auth(&self.token)
            .json(reply)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SocialError::Api {
                status: status.as_u16(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use calla_models::Account;

    fn original() -> Status {
        Status {
            id: StatusId::from("10203"),
            content: "<p>hi</p>".to_string(),
            account: Account {
                acct: "friend@example.social".to_string(),
            },
            visibility: Visibility::Unlisted,
        }
    }

    #[test]
    fn test_threaded_reply_addresses_author() {
        let reply = ReplyPost::threaded(&original(), "hello back");
        assert_eq!(reply.status, "@friend@example.social hello back");
        assert_eq!(reply.in_reply_to_id, StatusId::from("10203"));
        assert_eq!(reply.visibility, Visibility::Unlisted);
    }

    #[test]
    fn test_reply_serializes_wire_fields() {
        let reply = ReplyPost::threaded(&original(), "hey");
        let json = serde_json::to_value(&reply).unwrap();

        assert_eq!(json["status"], "@friend@example.social hey");
        assert_eq!(json["in_reply_to_id"], "10203");
        assert_eq!(json["visibility"], "unlisted");
    }

    #[test]
    fn test_api_error_display_carries_status() {
        let e = SocialError::Api { status: 503 };
        assert_eq!(e.to_string(), "notification source returned HTTP 503");
    }
}
