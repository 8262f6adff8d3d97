//! HTML stripping for notification bodies.

use std::sync::OnceLock;

use regex::Regex;

static TAG_RE: OnceLock<Regex> = OnceLock::new();

/// Removes every `<...>` tag from `html` and trims the result.
///
/// Deliberately naive: no entity decoding, no block re-flowing. Mention
/// bodies only need the trigger phrase and the user's text to survive.
pub fn strip_html(html: &str) -> String {
    let re = TAG_RE.get_or_init(|| Regex::new(r"<[^>]+>").expect("tag pattern compiles"));
    re.replace_all(html, "").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_tags() {
        assert_eq!(strip_html("<p>hello <b>world</b></p>"), "hello world");
    }

    #[test]
    fn test_strips_mention_markup() {
        let html = r#"<p><span class="h-card"><a href="https://example.social/@calla">@calla</a></span> 马蹄莲马蹄莲 最近压力很大</p>"#;
        assert_eq!(strip_html(html), "@calla 马蹄莲马蹄莲 最近压力很大");
    }

    #[test]
    fn test_plain_body_passes_through() {
        assert_eq!(strip_html("马蹄莲马蹄莲 最近压力很大"), "马蹄莲马蹄莲 最近压力很大");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(strip_html(""), "");
        assert_eq!(strip_html("<p></p>"), "");
    }
}
