// Text generator trait: the swap-ready abstraction over the generative API.
//
// Backends return the raw reply; prompt construction, parsing, and refusal
// detection live in DescriptionGenerator so every backend gets the same
// policy.

use anyhow::Result;
use async_trait::async_trait;

use crate::classifier::image::DecodedImage;

/// What the backend said.
#[derive(Debug, Clone, PartialEq)]
pub enum GeneratorReply {
    /// Generated text, possibly wrapped in markdown fences
    Text(String),
    /// The service declined on its own (safety filters, policy blocks)
    Blocked(String),
}

/// Trait for generative text backends. Err means transport or credential
/// failure, never a content decision.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn complete(&self, prompt: &str, image: Option<&DecodedImage>) -> Result<GeneratorReply>;
}
