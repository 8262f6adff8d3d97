//! Trigger detection and user-text extraction.
//!
//! The trigger is a fixed literal substring; its presence anywhere in
//! the sanitized, lowercased body makes a mention actionable. Callers
//! lowercase both body and trigger before calling in here.

/// Prompt substituted when a mention contains the trigger and nothing else.
pub const FALLBACK_PROMPT: &str = "你今天想聊些什么呢？(｡･ω･｡)";

/// Cap on the user text forwarded to the generator.
pub const MAX_USER_TEXT_CHARS: usize = 100;

/// Extracts the user's request from a body.
///
/// Returns `None` when the trigger phrase is absent. Otherwise every
/// occurrence of the trigger is removed, the remainder trimmed, an empty
/// remainder replaced by [`FALLBACK_PROMPT`], and the result bounded to
/// [`MAX_USER_TEXT_CHARS`].
pub fn extract_user_text(body: &str, trigger: &str) -> Option<String> {
    if trigger.is_empty() || !body.contains(trigger) {
        return None;
    }
    let without = body.replace(trigger, "");
    let trimmed = without.trim();
    let text = if trimmed.is_empty() {
        FALLBACK_PROMPT
    } else {
        trimmed
    };
    Some(truncate_chars(text, MAX_USER_TEXT_CHARS))
}

/// Truncates to at most `max` characters, never splitting a char.
pub fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRIGGER: &str = "马蹄莲马蹄莲";

    #[test]
    fn test_no_trigger_is_none() {
        assert_eq!(extract_user_text("just chatting", TRIGGER), None);
    }

    #[test]
    fn test_extracts_remaining_text() {
        assert_eq!(
            extract_user_text("马蹄莲马蹄莲 最近压力很大", TRIGGER),
            Some("最近压力很大".to_string())
        );
    }

    #[test]
    fn test_trigger_anywhere_in_body() {
        assert_eq!(
            extract_user_text("hello 马蹄莲马蹄莲", TRIGGER),
            Some("hello".to_string())
        );
    }

    #[test]
    fn test_trigger_alone_yields_fallback_prompt() {
        assert_eq!(
            extract_user_text("  马蹄莲马蹄莲  ", TRIGGER),
            Some(FALLBACK_PROMPT.to_string())
        );
    }

    #[test]
    fn test_ascii_trigger() {
        assert_eq!(
            extract_user_text("hey bot hello", "hey bot"),
            Some("hello".to_string())
        );
    }

    #[test]
    fn test_long_text_is_bounded() {
        let body = format!("{TRIGGER} {}", "压".repeat(500));
        let text = extract_user_text(&body, TRIGGER).unwrap();
        assert_eq!(text.chars().count(), MAX_USER_TEXT_CHARS);
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        let s = "马蹄莲abc";
        assert_eq!(truncate_chars(s, 4), "马蹄莲a");
        assert_eq!(truncate_chars(s, 100), s);
    }
}
