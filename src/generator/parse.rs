// Parsing generated replies into listing copy.
//
// Models often wrap JSON in markdown fences or add a sentence before it.
// parse_copy() strips that wrapping and, when the JSON still won't parse,
// keeps the text as the description under a generic title.

use std::sync::OnceLock;

use regex_lite::Regex;
use serde::{Deserialize, Serialize};

/// Title the model is instructed to return for prohibited items.
pub const REFUSAL_SENTINEL: &str = "Restricted Item";

/// Any title containing this marker is a policy refusal.
pub const VIOLATION_MARKER: &str = "violation";

/// Title used when the reply isn't structured.
pub const FALLBACK_TITLE: &str = "Item for Campus Marketplace";

/// Generated title and description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedCopy {
    pub title: String,
    pub description: String,
}

#[derive(Deserialize)]
struct RawCopy {
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: String,
}

fn fence_regex() -> &'static Regex {
    static FENCE: OnceLock<Regex> = OnceLock::new();
    FENCE.get_or_init(|| {
        Regex::new(r"(?s)```[A-Za-z0-9_-]*\s*(.*?)\s*```").expect("fence pattern is valid")
    })
}

/// Remove markdown code fences and surrounding whitespace.
pub fn strip_wrappers(raw: &str) -> String {
    let trimmed = raw.trim();
    match fence_regex().captures(trimmed).and_then(|c| c.get(1)) {
        Some(inner) => inner.as_str().trim().to_string(),
        None => trimmed.to_string(),
    }
}

/// Parse a reply into copy. Never fails.
pub fn parse_copy(raw: &str) -> GeneratedCopy {
    let text = strip_wrappers(raw);

    if let Some(parsed) = parse_json_object(&text) {
        let title = parsed.title.trim();
        return GeneratedCopy {
            title: if title.is_empty() {
                FALLBACK_TITLE.to_string()
            } else {
                title.to_string()
            },
            description: parsed.description.trim().to_string(),
        };
    }

    GeneratedCopy {
        title: FALLBACK_TITLE.to_string(),
        description: text,
    }
}

/// Try the whole text, then the outermost `{...}` span inside it.
fn parse_json_object(text: &str) -> Option<RawCopy> {
    if let Ok(parsed) = serde_json::from_str::<RawCopy>(text) {
        return Some(parsed);
    }
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end <= start {
        return None;
    }
    serde_json::from_str::<RawCopy>(&text[start..=end]).ok()
}

/// If the copy is a refusal, return the reason to show the user.
pub fn refusal_reason(copy: &GeneratedCopy) -> Option<String> {
    let title = copy.title.trim();
    let refused = title == REFUSAL_SENTINEL || title.to_lowercase().contains(VIOLATION_MARKER);
    if !refused {
        return None;
    }

    let reason = copy.description.trim();
    Some(if reason.is_empty() {
        "This item can't be listed under campus marketplace policy.".to_string()
    } else {
        reason.to_string()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_json_fence() {
        let raw = "```json\n{\"title\": \"Desk\"}\n```";
        assert_eq!(strip_wrappers(raw), "{\"title\": \"Desk\"}");
    }

    #[test]
    fn test_strip_bare_fence() {
        assert_eq!(strip_wrappers("```\nhello\n```"), "hello");
    }

    #[test]
    fn test_strip_leaves_plain_text() {
        assert_eq!(strip_wrappers("  plain text  "), "plain text");
    }

    #[test]
    fn test_parse_structured_reply() {
        let copy = parse_copy(
            "```json\n{\"title\": \"Gaming Mouse\", \"description\": \"Works great.\"}\n```",
        );
        assert_eq!(copy.title, "Gaming Mouse");
        assert_eq!(copy.description, "Works great.");
    }

    #[test]
    fn test_parse_json_with_preamble() {
        let copy = parse_copy(
            "Sure! Here you go: {\"title\": \"Lamp\", \"description\": \"Bright.\"} Enjoy.",
        );
        assert_eq!(copy.title, "Lamp");
        assert_eq!(copy.description, "Bright.");
    }

    #[test]
    fn test_parse_fallback_uses_raw_text() {
        let copy = parse_copy("A sturdy desk, lightly used, pick up near the library.");
        assert_eq!(copy.title, FALLBACK_TITLE);
        assert_eq!(copy.description, "A sturdy desk, lightly used, pick up near the library.");
    }

    #[test]
    fn test_parse_empty_title_gets_fallback() {
        let copy = parse_copy("{\"title\": \"  \", \"description\": \"Nice chair.\"}");
        assert_eq!(copy.title, FALLBACK_TITLE);
        assert_eq!(copy.description, "Nice chair.");
    }

    #[test]
    fn test_refusal_sentinel_detected() {
        let copy = GeneratedCopy {
            title: "Restricted Item".to_string(),
            description: "Weapons cannot be sold.".to_string(),
        };
        assert_eq!(refusal_reason(&copy), Some("Weapons cannot be sold.".to_string()));
    }

    #[test]
    fn test_violation_marker_detected() {
        let copy = GeneratedCopy {
            title: "Policy Violation".to_string(),
            description: String::new(),
        };
        assert!(refusal_reason(&copy).is_some());
    }

    #[test]
    fn test_ordinary_copy_not_refused() {
        let copy = GeneratedCopy {
            title: "Restricted-size carry-on bag".to_string(),
            description: "Fits airline limits.".to_string(),
        };
        assert_eq!(refusal_reason(&copy), None);
    }
}
