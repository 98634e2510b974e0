// Moderation document sources and the session load step.
//
// A source answers "what does the moderation document say right now?".
// Ok(None) means the document doesn't exist; Err means it couldn't be read.
// load() treats both the same way: fall back to the built-in defaults.

use std::path::PathBuf;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, info, warn};

use super::word_list::{WordList, WordListSource};

/// Shape of the moderation document.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModerationDocument {
    #[serde(default)]
    pub banned_keywords: Vec<String>,
}

/// Trait for reading the moderation document.
#[async_trait]
pub trait ModerationConfigSource: Send + Sync {
    async fn fetch(&self) -> Result<Option<ModerationDocument>>;
}

/// Load the session word list from `source`, falling back to defaults.
///
/// Never fails: a fetch error, a missing document, or a document whose
/// entries all normalize away yields `WordList::defaults()`.
pub async fn load(source: &dyn ModerationConfigSource) -> WordList {
    match source.fetch().await {
        Ok(Some(document)) => {
            let list = WordList::from_entries(&document.banned_keywords, WordListSource::Remote);
            if list.is_empty() {
                warn!("Moderation document has no usable keywords, using defaults");
                WordList::defaults()
            } else {
                info!(count = list.len(), "Loaded banned keywords from moderation document");
                list
            }
        }
        Ok(None) => {
            warn!("Moderation document not found, using defaults");
            WordList::defaults()
        }
        Err(e) => {
            warn!(error = %e, "Failed to fetch moderation document, using defaults");
            WordList::defaults()
        }
    }
}

/// Reads the moderation document from an HTTP(S) URL.
pub struct HttpConfigSource {
    client: Client,
    url: String,
}

impl HttpConfigSource {
    pub fn new(url: &str) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("listing-guard/", env!("CARGO_PKG_VERSION")))
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            url: url.to_string(),
        })
    }
}

#[async_trait]
impl ModerationConfigSource for HttpConfigSource {
    async fn fetch(&self) -> Result<Option<ModerationDocument>> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .context("Moderation config request failed")?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Moderation config returned {}: {}", status, body);
        }

        let document = response
            .json::<ModerationDocument>()
            .await
            .context("Failed to parse moderation document")?;

        debug!(url = self.url, entries = document.banned_keywords.len(), "Fetched moderation document");
        Ok(Some(document))
    }
}

/// Reads the moderation document from a local JSON file.
pub struct FileConfigSource {
    path: PathBuf,
}

impl FileConfigSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ModerationConfigSource for FileConfigSource {
    async fn fetch(&self) -> Result<Option<ModerationDocument>> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("Failed to read {}", self.path.display()))
            }
        };

        let document = serde_json::from_str(&contents)
            .with_context(|| format!("Invalid moderation document {}", self.path.display()))?;
        Ok(Some(document))
    }
}

/// Used when no moderation document is configured at all.
pub struct NoConfigSource;

#[async_trait]
impl ModerationConfigSource for NoConfigSource {
    async fn fetch(&self) -> Result<Option<ModerationDocument>> {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_missing_field_defaults_empty() {
        let doc: ModerationDocument = serde_json::from_str("{}").unwrap();
        assert!(doc.banned_keywords.is_empty());
    }

    #[test]
    fn test_document_camel_case_field() {
        let doc: ModerationDocument =
            serde_json::from_str(r#"{"bannedKeywords": ["\"Gun\"", "knife"]}"#).unwrap();
        assert_eq!(doc.banned_keywords.len(), 2);
    }

    #[tokio::test]
    async fn test_no_source_loads_defaults() {
        let list = load(&NoConfigSource).await;
        assert_eq!(list, WordList::defaults());
    }
}
