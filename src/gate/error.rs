// Gate error taxonomy.
//
// Every way a listing can be stopped, as one enum. Pre-flight rejections
// (forbidden content, keyword hits, validation) never reach the store;
// PersistenceError is the only variant raised after side effects.

use thiserror::Error;

use super::state::GateState;
use crate::store::traits::StoreError;

/// Which keyword checkpoint fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Checkpoint {
    /// Raw keywords, before asking for AI copy
    PreGeneration,
    /// Final title + description, before uploading anything
    PreSubmit,
}

impl std::fmt::Display for Checkpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Checkpoint::PreGeneration => write!(f, "keywords"),
            Checkpoint::PreSubmit => write!(f, "title or description"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("a title is required")]
    MissingTitle,
    #[error("choose a category")]
    MissingCategory,
    #[error("\"{0}\" items can't be listed")]
    ForbiddenCategory(String),
    #[error("add at least one photo")]
    MissingImage,
    #[error("a price is required for items for sale")]
    MissingPrice,
    #[error("price must be a positive amount (got {0})")]
    InvalidPrice(f64),
    #[error("add at least one pickup location")]
    MissingLocation,
    #[error("enter a few keywords describing the item first")]
    MissingKeywords,
    #[error("a listing can have at most {max} photos")]
    TooManyImages { max: usize },
    #[error("there is no photo at position {0}")]
    NoSuchImage(usize),
    #[error("sign in before posting a listing")]
    NotSignedIn,
}

/// Which side effect failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistenceStage {
    Upload,
    RecordWrite,
}

impl std::fmt::Display for PersistenceStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PersistenceStage::Upload => write!(f, "photo upload"),
            PersistenceStage::RecordWrite => write!(f, "saving the listing"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistenceKind {
    PermissionDenied,
    QuotaExceeded,
    Unavailable,
    Other,
}

/// An upload or record write failed during submission.
#[derive(Debug, Error)]
#[error("{stage} failed: {message}")]
pub struct PersistenceError {
    pub stage: PersistenceStage,
    pub kind: PersistenceKind,
    pub message: String,
}

impl PersistenceError {
    pub fn new(stage: PersistenceStage, error: StoreError) -> Self {
        let kind = match &error {
            StoreError::PermissionDenied(_) => PersistenceKind::PermissionDenied,
            StoreError::QuotaExceeded(_) => PersistenceKind::QuotaExceeded,
            StoreError::Unavailable(_) => PersistenceKind::Unavailable,
            StoreError::Other(_) => PersistenceKind::Other,
        };
        Self {
            stage,
            kind,
            message: format!("{error:#}"),
        }
    }

    /// What the user can do about it. The draft is kept, so retrying never
    /// means re-entering anything.
    pub fn hint(&self) -> &'static str {
        match self.kind {
            PersistenceKind::PermissionDenied => {
                "You don't have permission to post. Sign out and back in, then try again."
            }
            PersistenceKind::QuotaExceeded => {
                "Storage is full. Try smaller or fewer photos, or try again later."
            }
            PersistenceKind::Unavailable => {
                "The service is temporarily unavailable. Check your connection and retry."
            }
            PersistenceKind::Other => {
                "Something went wrong while posting. Your draft is saved; please retry."
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum GateError {
    /// Hard rejection from the classifier or the generator.
    #[error("{reason}")]
    ForbiddenContent { reason: String },

    /// A banned keyword was found. Names the word so the user can fix it.
    #[error("\"{word}\" is not allowed in the {checkpoint}; remove it and try again")]
    KeywordViolation { word: String, checkpoint: Checkpoint },

    /// A remote capability couldn't be used. Never blocks submission.
    #[error("{service} is unavailable: {reason}")]
    ServiceUnavailable { service: &'static str, reason: String },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    #[error("cannot {action} while {state}")]
    InvalidState { action: &'static str, state: GateState },

    #[error("cancelled")]
    Cancelled,
}

impl GateError {
    /// Moderation decisions, as opposed to failures or input mistakes.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            GateError::ForbiddenContent { .. } | GateError::KeywordViolation { .. }
        )
    }
}
