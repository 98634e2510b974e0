// Data models for persisted listings.

use serde::{Deserialize, Serialize};

use crate::gate::draft::{Condition, ListingKind};

/// The signed-in user, as reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    pub id: String,
    pub display_name: String,
    pub email: String,
}

/// A validated listing ready to be written. Only the gate builds these,
/// after every moderation check has passed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewListing {
    pub kind: ListingKind,
    pub title: String,
    pub description: String,
    pub category: String,
    pub condition: Condition,
    /// None for donations
    pub price: Option<f64>,
    pub locations: Vec<String>,
    pub availability: String,
    pub image_urls: Vec<String>,
    pub owner_id: String,
    pub owner_name: String,
    pub owner_email: String,
    /// Always "active" on creation
    pub status: String,
}

/// A listing as stored, with its id and the store's timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredListing {
    pub id: String,
    #[serde(flatten)]
    pub listing: NewListing,
    pub created_at: String,
}
