// Word list: normalized banned substrings plus the scan itself.

use std::sync::Arc;

/// Built-in list used whenever the moderation document can't be used.
pub const DEFAULT_BANNED_KEYWORDS: [&str; 16] = [
    "weapon",
    "gun",
    "firearm",
    "ammo",
    "explosive",
    "drug",
    "cocaine",
    "marijuana",
    "weed",
    "vape",
    "alcohol",
    "stolen",
    "counterfeit",
    "fake id",
    "prescription",
    "essay writing",
];

/// Quote characters stripped from every entry before normalization.
const QUOTE_CHARS: [char; 7] = ['"', '\'', '`', '\u{201C}', '\u{201D}', '\u{2018}', '\u{2019}'];

/// Where a word list came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WordListSource {
    /// The moderation document supplied at least one usable entry
    Remote,
    /// Built-in defaults
    Default,
}

impl std::fmt::Display for WordListSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WordListSource::Remote => write!(f, "moderation document"),
            WordListSource::Default => write!(f, "built-in defaults"),
        }
    }
}

/// Ordered, deduplicated set of lowercase banned substrings.
///
/// Cloning is cheap (the entries are shared), so one loaded list can be
/// handed to every consumer in the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordList {
    words: Arc<[String]>,
    source: WordListSource,
}

impl WordList {
    /// Build a list from raw entries, normalizing each one.
    /// Order is preserved; later duplicates are dropped.
    pub fn from_entries<I, S>(entries: I, source: WordListSource) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut words: Vec<String> = Vec::new();
        for entry in entries {
            if let Some(word) = normalize_entry(entry.as_ref()) {
                if !words.contains(&word) {
                    words.push(word);
                }
            }
        }
        Self {
            words: words.into(),
            source,
        }
    }

    /// The built-in default list.
    pub fn defaults() -> Self {
        Self::from_entries(DEFAULT_BANNED_KEYWORDS, WordListSource::Default)
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn source(&self) -> WordListSource {
        self.source
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// First banned word (in list order) contained in `text`, if any.
    pub fn scan(&self, text: &str) -> Option<&str> {
        scan(text, self)
    }
}

/// Strip quotes, lowercase, and trim. Returns None for entries left empty.
pub fn normalize_entry(raw: &str) -> Option<String> {
    let stripped: String = raw.chars().filter(|c| !QUOTE_CHARS.contains(c)).collect();
    let word = stripped.to_lowercase().trim().to_string();
    if word.is_empty() {
        None
    } else {
        Some(word)
    }
}

/// Case-insensitive substring scan with first-match semantics.
pub fn scan<'a>(text: &str, word_list: &'a WordList) -> Option<&'a str> {
    let folded = text.to_lowercase();
    word_list
        .words
        .iter()
        .find(|word| folded.contains(word.as_str()))
        .map(String::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_quotes_and_case() {
        assert_eq!(normalize_entry("  \"Weapon\" "), Some("weapon".to_string()));
        assert_eq!(normalize_entry("'Fake ID'"), Some("fake id".to_string()));
        assert_eq!(normalize_entry("\u{201C}Vape\u{201D}"), Some("vape".to_string()));
    }

    #[test]
    fn test_normalize_drops_empties() {
        assert_eq!(normalize_entry(""), None);
        assert_eq!(normalize_entry("   "), None);
        assert_eq!(normalize_entry("\"\""), None);
    }

    #[test]
    fn test_from_entries_dedups_in_order() {
        let list = WordList::from_entries(["Drug", "weapon", "DRUG", " "], WordListSource::Remote);
        assert_eq!(list.words(), &["drug".to_string(), "weapon".to_string()]);
    }

    #[test]
    fn test_scan_first_match_in_list_order() {
        let list = WordList::from_entries(["weapon", "drug"], WordListSource::Remote);
        // "drug" appears earlier in the text, but "weapon" is first in the list
        assert_eq!(list.scan("drug dealer selling a weapon"), Some("weapon"));
    }

    #[test]
    fn test_scan_is_case_insensitive_substring() {
        let list = WordList::from_entries(["gun"], WordListSource::Remote);
        assert_eq!(list.scan("Nerf GUNS for sale"), Some("gun"));
        assert_eq!(list.scan("Textbook bundle"), None);
    }

    #[test]
    fn test_empty_list_never_matches() {
        let list = WordList::from_entries(Vec::<String>::new(), WordListSource::Remote);
        assert!(list.is_empty());
        assert_eq!(list.scan("weapon"), None);
    }

    #[test]
    fn test_defaults_are_already_normalized() {
        let list = WordList::defaults();
        assert_eq!(list.len(), DEFAULT_BANNED_KEYWORDS.len());
        assert_eq!(list.source(), WordListSource::Default);
    }
}
