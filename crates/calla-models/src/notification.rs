//! Wire types for the social notification source.
//!
//! These mirror the JSON returned by the Mastodon-style notifications
//! endpoint. They are received read-only; the bot never mutates or
//! re-persists them beyond dedup bookkeeping.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{NotificationId, StatusId};

/// A mention notification fetched from the platform.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    /// Platform-assigned identifier.
    pub id: NotificationId,

    /// When the platform delivered the notification.
    pub created_at: DateTime<Utc>,

    /// The status that mentioned us. Absent on malformed payloads;
    /// such notifications are skipped without side effects.
    #[serde(default)]
    pub status: Option<Status>,
}

/// The status embedded in a mention notification. Immutable once fetched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Status {
    /// Platform-assigned identifier, used to thread the reply.
    pub id: StatusId,

    /// Status body as HTML.
    #[serde(default)]
    pub content: String,

    /// Author of the status.
    pub account: Account,

    /// Visibility level, preserved on the reply.
    #[serde(default)]
    pub visibility: Visibility,
}

/// The author of a status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    /// Handle of the account (`user` or `user@instance`).
    pub acct: String,
}

/// Visibility of a status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    /// Visible to everyone, shown in public timelines.
    #[default]
    Public,
    /// Visible to everyone but not in public timelines.
    Unlisted,
    /// Visible to followers only.
    Private,
    /// Visible to mentioned users only.
    Direct,
}

#[cfg(test)]
mod tests {
    use super::*;

    const MENTION_JSON: &str = r#"{
        "id": "34975861",
        "type": "mention",
        "created_at": "2025-06-01T08:22:05.000Z",
        "status": {
            "id": "99894454948972345",
            "content": "<p>hello there</p>",
            "account": {"acct": "someone@example.social"},
            "visibility": "unlisted"
        }
    }"#;

    #[test]
    fn test_deserialize_mention() {
        let n: Notification = serde_json::from_str(MENTION_JSON).unwrap();
        assert_eq!(n.id.as_str(), "34975861");
        let status = n.status.unwrap();
        assert_eq!(status.content, "<p>hello there</p>");
        assert_eq!(status.account.acct, "someone@example.social");
        assert_eq!(status.visibility, Visibility::Unlisted);
    }

    #[test]
    fn test_deserialize_without_status() {
        let n: Notification = serde_json::from_str(
            r#"{"id": "1", "created_at": "2025-06-01T08:22:05.000Z"}"#,
        )
        .unwrap();
        assert!(n.status.is_none());
    }

    #[test]
    fn test_visibility_defaults_to_public() {
        let s: Status = serde_json::from_str(
            r#"{"id": "5", "content": "", "account": {"acct": "a"}}"#,
        )
        .unwrap();
        assert_eq!(s.visibility, Visibility::Public);
    }

    #[test]
    fn test_visibility_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&Visibility::Direct).unwrap(),
            "\"direct\""
        );
    }
}
