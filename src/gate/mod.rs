// Moderation gate: the listing flow as an explicit state machine.
//
// One gate owns one draft. Each step that suspends (classifying a photo,
// generating copy, submitting) moves the gate out of Editing for the
// duration of the await and back again when it finishes, fails, is
// cancelled, or its future is dropped. Nothing reaches the object store or
// the record store until the final keyword scan over title + description
// has come back clean.

pub mod draft;
pub mod error;
pub mod state;

use std::sync::Arc;

use chrono::Utc;
use futures::future::try_join_all;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::classifier::category::{is_hard_block, CategoryClassifier, ClassificationResult};
use crate::classifier::image::DecodedImage;
use crate::classifier::labels;
use crate::generator::parse::GeneratedCopy;
use crate::generator::{DescriptionGenerator, GenerationOutcome};
use crate::keywords::word_list::WordList;
use crate::store::models::NewListing;
use crate::store::traits::{IdentityProvider, ObjectStorage, RecordStore};
use draft::{ListingDraft, ListingKind, MAX_IMAGES};
use error::{Checkpoint, GateError, PersistenceError, PersistenceStage, ValidationError};
use state::GateState;

/// Everything a gate calls out to. Cheap to clone, so one set of services
/// can back a fresh gate for every draft in the session.
#[derive(Clone)]
pub struct GateServices {
    pub classifier: CategoryClassifier,
    pub generator: DescriptionGenerator,
    /// Loaded once per session and shared by both keyword checkpoints
    pub word_list: WordList,
    pub storage: Arc<dyn ObjectStorage>,
    pub records: Arc<dyn RecordStore>,
    pub identity: Arc<dyn IdentityProvider>,
}

/// What happened to an image that was accepted into the draft.
#[derive(Debug, Clone, PartialEq)]
pub enum ImageOutcome {
    /// The classifier had a confident suggestion
    Suggested(ClassificationResult),
    /// Low confidence or classifier unavailable; category is up to the user
    NoSuggestion,
}

/// Returned by a successful submit.
#[derive(Debug, Clone)]
pub struct SubmissionReceipt {
    pub record_id: String,
    pub listing: NewListing,
}

/// Puts the gate into an in-flight state and restores Editing if the
/// step ends without calling finish() (early return, cancellation, or the
/// future being dropped mid-await).
struct Transition<'a> {
    state: &'a mut GateState,
}

impl<'a> Transition<'a> {
    fn begin(state: &'a mut GateState, next: GateState) -> Self {
        *state = next;
        Self { state }
    }

    fn finish(self, next: GateState) {
        *self.state = next;
    }
}

impl Drop for Transition<'_> {
    fn drop(&mut self) {
        if self.state.is_in_flight() {
            *self.state = GateState::Editing;
        }
    }
}

pub struct ModerationGate {
    services: GateServices,
    state: GateState,
    draft: ListingDraft,
}

impl ModerationGate {
    /// Start a new draft of the given kind.
    pub fn new(services: GateServices, kind: ListingKind) -> Self {
        Self {
            services,
            state: GateState::Editing,
            draft: ListingDraft::new(kind),
        }
    }

    pub fn state(&self) -> &GateState {
        &self.state
    }

    pub fn draft(&self) -> &ListingDraft {
        &self.draft
    }

    pub fn word_list(&self) -> &WordList {
        &self.services.word_list
    }

    /// Mutable access to the draft's fields. Only while editing.
    pub fn draft_mut(&mut self) -> Result<&mut ListingDraft, GateError> {
        self.ensure_editing("edit the draft")?;
        Ok(&mut self.draft)
    }

    fn ensure_editing(&self, action: &'static str) -> Result<(), GateError> {
        if self.state == GateState::Editing {
            Ok(())
        } else {
            Err(GateError::InvalidState {
                action,
                state: self.state.clone(),
            })
        }
    }

    /// Classify a photo and, unless it is hard-blocked, add it to the draft.
    ///
    /// A confident suggestion fills the category if the user hasn't chosen
    /// one. A forbidden class above the hard-block threshold rejects the
    /// photo and leaves the draft untouched.
    pub async fn add_image(
        &mut self,
        image: DecodedImage,
        cancel: &CancellationToken,
    ) -> Result<ImageOutcome, GateError> {
        self.ensure_editing("add a photo")?;
        if self.draft.images.len() >= MAX_IMAGES {
            return Err(ValidationError::TooManyImages { max: MAX_IMAGES }.into());
        }

        let transition = Transition::begin(&mut self.state, GateState::Classifying);

        let classification = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(GateError::Cancelled),
            result = self.services.classifier.classify(&image) => result,
        };

        if let Some(result) = classification.as_ref().filter(|r| is_hard_block(r)) {
            info!(
                label = result.raw_label,
                category = result.canonical_category,
                confidence = result.confidence,
                "Photo hard-blocked"
            );
            return Err(GateError::ForbiddenContent {
                reason: format!(
                    "This photo appears to show a {} ({:.0}% confidence) and can't be listed.",
                    result.canonical_category.to_lowercase(),
                    result.confidence * 100.0
                ),
            });
        }

        if let Some(result) = &classification {
            let allowed = !labels::is_forbidden(&result.canonical_category);
            if allowed && self.draft.category.is_none() {
                self.draft.category = Some(result.canonical_category.clone());
            }
        }

        self.draft.images.push(image);
        transition.finish(GateState::Editing);

        Ok(match classification {
            Some(result) => ImageOutcome::Suggested(result),
            None => ImageOutcome::NoSuggestion,
        })
    }

    /// Remove a photo from the draft.
    pub fn remove_image(&mut self, index: usize) -> Result<DecodedImage, GateError> {
        self.ensure_editing("remove a photo")?;
        if index >= self.draft.images.len() {
            return Err(ValidationError::NoSuchImage(index).into());
        }
        Ok(self.draft.images.remove(index))
    }

    /// Keyword check on the raw keywords. Runs automatically before
    /// generation; exposed so a form can check as the user types.
    pub fn precheck_keywords(&self) -> Result<(), GateError> {
        match self.services.word_list.scan(&self.draft.keywords) {
            Some(word) => {
                info!(word = word, checkpoint = %Checkpoint::PreGeneration, "Keyword violation");
                Err(GateError::KeywordViolation {
                    word: word.to_string(),
                    checkpoint: Checkpoint::PreGeneration,
                })
            }
            None => Ok(()),
        }
    }

    /// Generate a title and description from the draft's keywords,
    /// category, and first photo.
    ///
    /// On success the draft's title and description are replaced. A refusal
    /// clears them. A service failure leaves them as they were.
    pub async fn generate_copy(
        &mut self,
        cancel: &CancellationToken,
    ) -> Result<GeneratedCopy, GateError> {
        self.ensure_editing("generate a description")?;

        if self.draft.keywords.trim().is_empty() {
            return Err(ValidationError::MissingKeywords.into());
        }
        let category = match self.draft.category.as_deref().map(str::trim) {
            Some(category) if !category.is_empty() => category.to_string(),
            _ => return Err(ValidationError::MissingCategory.into()),
        };
        self.precheck_keywords()?;

        let transition = Transition::begin(&mut self.state, GateState::GeneratingText);

        let outcome = {
            let image = self.draft.images.first();
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(GateError::Cancelled),
                outcome = self.services.generator.generate(&self.draft.keywords, &category, image) => outcome,
            }
        };

        let result = match outcome {
            GenerationOutcome::Generated(copy) => {
                self.draft.title = copy.title.clone();
                self.draft.description = copy.description.clone();
                Ok(copy)
            }
            GenerationOutcome::Refused { reason } => {
                self.draft.title.clear();
                self.draft.description.clear();
                Err(GateError::ForbiddenContent { reason })
            }
            GenerationOutcome::Failed { reason } => Err(GateError::ServiceUnavailable {
                service: "AI copywriting",
                reason,
            }),
        };

        transition.finish(GateState::Editing);
        result
    }

    /// Validate, run the final keyword scan, upload photos, and write the
    /// record.
    ///
    /// Any failure returns the gate to Editing with the draft intact. Photos
    /// uploaded before a failure are not removed.
    pub async fn submit(&mut self) -> Result<SubmissionReceipt, GateError> {
        self.ensure_editing("submit")?;
        self.draft.validate()?;

        let owner = self
            .services
            .identity
            .current_user()
            .ok_or(ValidationError::NotSignedIn)?;

        if let Some(word) = self.services.word_list.scan(&self.draft.combined_text()) {
            info!(word = word, checkpoint = %Checkpoint::PreSubmit, "Keyword violation");
            return Err(GateError::KeywordViolation {
                word: word.to_string(),
                checkpoint: Checkpoint::PreSubmit,
            });
        }

        let transition = Transition::begin(&mut self.state, GateState::Submitting);

        let stamp = Utc::now().timestamp_millis();
        let owner_key = storage_key_segment(&owner.id);
        let storage = &self.services.storage;
        let uploads = self.draft.images.iter().enumerate().map(|(index, image)| {
            let key = format!(
                "listings/{owner_key}/{stamp}-{index}.{}",
                image.extension()
            );
            async move {
                storage
                    .upload(&image.bytes, &key, &image.mime_type)
                    .await
            }
        });

        let image_urls = match try_join_all(uploads).await {
            Ok(urls) => urls,
            Err(e) => {
                error!(error = %e, "Photo upload failed, listing not saved");
                return Err(PersistenceError::new(PersistenceStage::Upload, e).into());
            }
        };

        let listing = self.draft.to_new_listing(&owner, image_urls);
        let record_id = match self.services.records.create_listing(&listing).await {
            Ok(id) => id,
            Err(e) => {
                error!(error = %e, "Listing write failed");
                warn!(
                    uploaded = listing.image_urls.len(),
                    "Uploaded photos are left in storage"
                );
                return Err(PersistenceError::new(PersistenceStage::RecordWrite, e).into());
            }
        };

        info!(record_id = record_id, owner = owner.id, "Listing accepted");
        transition.finish(GateState::Accepted {
            record_id: record_id.clone(),
        });
        self.draft = ListingDraft::new(self.draft.kind);

        Ok(SubmissionReceipt { record_id, listing })
    }
}

/// Reduce an owner id to characters safe in a storage key.
fn storage_key_segment(id: &str) -> String {
    let cleaned: String = id
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    if cleaned.is_empty() {
        "anonymous".to_string()
    } else {
        cleaned
    }
}
