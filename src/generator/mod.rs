// Description generation: AI copywriting for listings.
//
// DescriptionGenerator turns a TextGenerator reply into a GenerationOutcome.
// Refusals (from the service's own safety system or from the refusal
// sentinel in the copy) and failures are variants of the outcome rather than
// errors, so callers have to handle each case explicitly.

pub mod gemini;
pub mod parse;
pub mod prompt;
pub mod rate_limiter;
pub mod traits;

use std::sync::Arc;

use tracing::{info, warn};

use crate::classifier::image::DecodedImage;
use parse::{parse_copy, refusal_reason, GeneratedCopy};
use traits::{GeneratorReply, TextGenerator};

/// Result of one generation attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationOutcome {
    /// Usable copy
    Generated(GeneratedCopy),
    /// The service declined: the item looks prohibited
    Refused { reason: String },
    /// Credentials missing or the service couldn't be reached
    Failed { reason: String },
}

#[derive(Clone)]
pub struct DescriptionGenerator {
    backend: Arc<dyn TextGenerator>,
}

impl DescriptionGenerator {
    pub fn new(backend: Arc<dyn TextGenerator>) -> Self {
        Self { backend }
    }

    /// Generate a title and description from keywords, category, and an
    /// optional photo.
    pub async fn generate(
        &self,
        keywords: &str,
        category: &str,
        image: Option<&DecodedImage>,
    ) -> GenerationOutcome {
        let prompt = prompt::build_prompt(keywords, category, image.is_some());

        let reply = match self.backend.complete(&prompt, image).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!(error = %e, "Listing copy generation failed");
                return GenerationOutcome::Failed {
                    reason: format!("{e:#}"),
                };
            }
        };

        match reply {
            GeneratorReply::Blocked(reason) => {
                info!(reason = reason, "Generative service refused listing");
                GenerationOutcome::Refused { reason }
            }
            GeneratorReply::Text(text) => {
                let copy = parse_copy(&text);
                match refusal_reason(&copy) {
                    Some(reason) => {
                        info!(title = copy.title, "Generated copy is a refusal");
                        GenerationOutcome::Refused { reason }
                    }
                    None => GenerationOutcome::Generated(copy),
                }
            }
        }
    }
}
