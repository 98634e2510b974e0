// Keyword filtering: banned-substring checks against free text.
//
// The word list is loaded once per session from a moderation document
// (remote URL or local file) and falls back to a built-in list when the
// document is missing, unreadable, or empty. Once loaded it is immutable
// and shared by every checkpoint in the session.

pub mod source;
pub mod word_list;
