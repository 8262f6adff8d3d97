//! Deduplication keys for processed mentions.
//!
//! A key is derived deterministically from a notification so that
//! repeated polling runs recognize mentions they have already handled.
//! Two strategies exist with different failure modes: the platform id is
//! simple but fragile if the platform reuses identifiers; the content
//! fingerprint survives id churn but treats re-sent identical text as a
//! duplicate. The strategy is a deployment choice, not hard-coded.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::ids::NotificationId;
use crate::notification::Notification;

/// How dedup keys are derived from notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum KeyStrategy {
    /// Key on the platform-assigned notification identifier.
    #[default]
    NotificationId,
    /// Key on a SHA-256 fingerprint of the sanitized body.
    ContentFingerprint,
}

impl KeyStrategy {
    /// Parses the configuration spelling of a strategy.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "id" => Some(Self::NotificationId),
            "fingerprint" => Some(Self::ContentFingerprint),
            _ => None,
        }
    }
}

/// A deduplication key. At most one processed record exists per key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DedupKey(String);

impl DedupKey {
    /// Key from the platform-assigned notification identifier.
    pub fn from_notification_id(id: &NotificationId) -> Self {
        Self(format!("id:{id}"))
    }

    /// Key from a content fingerprint. Identical text hashes to the same
    /// key even when the platform assigns a fresh notification id.
    pub fn from_content(text: &str) -> Self {
        let digest = Sha256::digest(text.as_bytes());
        Self(format!("sha256:{digest:x}"))
    }

    /// Derives the key for a notification under the given strategy.
    ///
    /// `sanitized_body` is the tag-stripped, lowercased body; it is only
    /// consulted by the fingerprint strategy.
    pub fn derive(strategy: KeyStrategy, notification: &Notification, sanitized_body: &str) -> Self {
        match strategy {
            KeyStrategy::NotificationId => Self::from_notification_id(&notification.id),
            KeyStrategy::ContentFingerprint => Self::from_content(sanitized_body),
        }
    }

    /// Returns the key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for DedupKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn mention(id: &str) -> Notification {
        Notification {
            id: NotificationId::from(id),
            created_at: Utc::now(),
            status: None,
        }
    }

    #[test]
    fn test_parse_strategy() {
        assert_eq!(KeyStrategy::parse("id"), Some(KeyStrategy::NotificationId));
        assert_eq!(
            KeyStrategy::parse(" Fingerprint "),
            Some(KeyStrategy::ContentFingerprint)
        );
        assert_eq!(KeyStrategy::parse("hash"), None);
    }

    #[test]
    fn test_fingerprint_is_deterministic() {
        let a = DedupKey::from_content("最近压力很大");
        let b = DedupKey::from_content("最近压力很大");
        assert_eq!(a, b);
        assert!(a.as_str().starts_with("sha256:"));
    }

    #[test]
    fn test_fingerprint_differs_on_content() {
        assert_ne!(
            DedupKey::from_content("hello"),
            DedupKey::from_content("hello "),
        );
    }

    #[test]
    fn test_id_strategy_ignores_body() {
        let n = mention("42");
        let a = DedupKey::derive(KeyStrategy::NotificationId, &n, "one body");
        let b = DedupKey::derive(KeyStrategy::NotificationId, &n, "another body");
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "id:42");
    }

    #[test]
    fn test_fingerprint_strategy_ignores_id() {
        let a = DedupKey::derive(KeyStrategy::ContentFingerprint, &mention("1"), "same");
        let b = DedupKey::derive(KeyStrategy::ContentFingerprint, &mention("2"), "same");
        assert_eq!(a, b);
    }
}
