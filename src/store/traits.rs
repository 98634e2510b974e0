// Collaborator traits: object storage, record store, identity.
//
// Store failures are typed so the gate can tell the user whether retrying
// will help (unavailable) or not (permission, quota).

use async_trait::async_trait;
use thiserror::Error;

use super::models::{NewListing, UserIdentity};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("permission denied: {0}")]
    PermissionDenied(String),
    #[error("storage quota exceeded: {0}")]
    QuotaExceeded(String),
    #[error("service unavailable: {0}")]
    Unavailable(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Binary object storage. Returns a publicly fetchable URL.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    async fn upload(&self, bytes: &[u8], key: &str, content_type: &str) -> Result<String, StoreError>;
}

/// Listing record store. Returns the generated record identifier.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn create_listing(&self, listing: &NewListing) -> Result<String, StoreError>;
}

/// Supplies the signed-in user. The pipeline never authenticates itself.
pub trait IdentityProvider: Send + Sync {
    fn current_user(&self) -> Option<UserIdentity>;
}
