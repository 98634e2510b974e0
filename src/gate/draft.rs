// Listing draft: the in-progress record a user is composing.

use serde::{Deserialize, Serialize};

use super::error::ValidationError;
use crate::classifier::image::DecodedImage;
use crate::classifier::labels;
use crate::store::models::{NewListing, UserIdentity};

/// Maximum photos per listing.
pub const MAX_IMAGES: usize = 3;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListingKind {
    #[default]
    Sale,
    Donation,
}

impl ListingKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListingKind::Sale => "sale",
            ListingKind::Donation => "donation",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    New,
    LikeNew,
    #[default]
    Good,
    Fair,
    Poor,
}

impl Condition {
    pub fn as_str(&self) -> &'static str {
        match self {
            Condition::New => "New",
            Condition::LikeNew => "Like New",
            Condition::Good => "Good",
            Condition::Fair => "Fair",
            Condition::Poor => "Poor",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ListingDraft {
    pub kind: ListingKind,
    pub title: String,
    pub description: String,
    /// Free-text keywords used for AI copywriting
    pub keywords: String,
    pub category: Option<String>,
    pub condition: Condition,
    /// Required for sales, ignored for donations
    pub price: Option<f64>,
    pub locations: Vec<String>,
    pub availability: String,
    /// Only the gate adds images, so every entry has passed classification
    pub(crate) images: Vec<DecodedImage>,
}

impl ListingDraft {
    pub fn new(kind: ListingKind) -> Self {
        Self {
            kind,
            ..Self::default()
        }
    }

    pub fn images(&self) -> &[DecodedImage] {
        &self.images
    }

    /// Check required fields. Runs before any network call.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::MissingTitle);
        }
        match self.category.as_deref().map(str::trim) {
            None | Some("") => return Err(ValidationError::MissingCategory),
            Some(category) if labels::is_forbidden(category) => {
                return Err(ValidationError::ForbiddenCategory(category.to_string()))
            }
            Some(_) => {}
        }
        if self.images.is_empty() {
            return Err(ValidationError::MissingImage);
        }
        if self.kind == ListingKind::Sale {
            match self.price {
                None => return Err(ValidationError::MissingPrice),
                Some(price) if !price.is_finite() || price <= 0.0 => {
                    return Err(ValidationError::InvalidPrice(price))
                }
                Some(_) => {}
            }
        }
        if self.locations.iter().all(|l| l.trim().is_empty()) {
            return Err(ValidationError::MissingLocation);
        }
        Ok(())
    }

    /// Title and description joined for the final keyword scan.
    pub fn combined_text(&self) -> String {
        format!("{} {}", self.title, self.description)
    }

    /// Build the record payload. Call only after validate() succeeds.
    pub(crate) fn to_new_listing(&self, owner: &UserIdentity, image_urls: Vec<String>) -> NewListing {
        NewListing {
            kind: self.kind,
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            category: self.category.clone().unwrap_or_default().trim().to_string(),
            condition: self.condition,
            price: match self.kind {
                ListingKind::Sale => self.price,
                ListingKind::Donation => None,
            },
            locations: self
                .locations
                .iter()
                .map(|l| l.trim().to_string())
                .filter(|l| !l.is_empty())
                .collect(),
            availability: self.availability.trim().to_string(),
            image_urls,
            owner_id: owner.id.clone(),
            owner_name: owner.display_name.clone(),
            owner_email: owner.email.clone(),
            status: "active".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn photo() -> DecodedImage {
        DecodedImage {
            bytes: vec![1, 2, 3],
            mime_type: "image/png".to_string(),
            pixels: image::RgbImage::new(1, 1),
        }
    }

    fn complete_sale() -> ListingDraft {
        ListingDraft {
            kind: ListingKind::Sale,
            title: "Gaming Mouse".to_string(),
            description: "Used for one semester".to_string(),
            category: Some("Electronics".to_string()),
            price: Some(15.0),
            locations: vec!["North Hall".to_string()],
            images: vec![photo()],
            ..ListingDraft::default()
        }
    }

    #[test]
    fn test_complete_sale_validates() {
        assert_eq!(complete_sale().validate(), Ok(()));
    }

    #[test]
    fn test_missing_fields_reported_in_order() {
        let mut draft = complete_sale();
        draft.title = "  ".to_string();
        draft.category = None;
        assert_eq!(draft.validate(), Err(ValidationError::MissingTitle));

        draft.title = "Mouse".to_string();
        assert_eq!(draft.validate(), Err(ValidationError::MissingCategory));

        draft.category = Some("Electronics".to_string());
        draft.images.clear();
        assert_eq!(draft.validate(), Err(ValidationError::MissingImage));
    }

    #[test]
    fn test_forbidden_category_rejected() {
        let mut draft = complete_sale();
        draft.category = Some(" weapon / dangerous item ".to_string());
        assert_eq!(
            draft.validate(),
            Err(ValidationError::ForbiddenCategory(
                "weapon / dangerous item".to_string()
            ))
        );

        // Free-text categories outside the canonical set are still allowed
        draft.category = Some("Musical Instruments".to_string());
        assert_eq!(draft.validate(), Ok(()));
    }

    #[test]
    fn test_sale_requires_positive_price() {
        let mut draft = complete_sale();
        draft.price = None;
        assert_eq!(draft.validate(), Err(ValidationError::MissingPrice));
        draft.price = Some(0.0);
        assert_eq!(draft.validate(), Err(ValidationError::InvalidPrice(0.0)));
        draft.price = Some(f64::NAN);
        assert!(matches!(draft.validate(), Err(ValidationError::InvalidPrice(_))));
    }

    #[test]
    fn test_donation_needs_no_price() {
        let mut draft = complete_sale();
        draft.kind = ListingKind::Donation;
        draft.price = None;
        assert_eq!(draft.validate(), Ok(()));
    }

    #[test]
    fn test_blank_locations_rejected() {
        let mut draft = complete_sale();
        draft.locations = vec!["   ".to_string()];
        assert_eq!(draft.validate(), Err(ValidationError::MissingLocation));
    }

    #[test]
    fn test_donation_listing_drops_price() {
        let mut draft = complete_sale();
        draft.kind = ListingKind::Donation;
        let owner = UserIdentity {
            id: "u1".to_string(),
            display_name: "Sam".to_string(),
            email: "sam@example.edu".to_string(),
        };
        let listing = draft.to_new_listing(&owner, vec!["file:///a.png".to_string()]);
        assert_eq!(listing.price, None);
        assert_eq!(listing.status, "active");
        assert_eq!(listing.owner_id, "u1");
    }
}
