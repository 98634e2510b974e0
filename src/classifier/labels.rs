// Canonical category mapping.
//
// Classifier backends emit their own labels ("laptop", "revolver", ...).
// Listings store canonical category names instead. Unknown labels pass
// through unchanged so a retrained model never silently loses predictions.

use tracing::warn;

pub const ELECTRONICS: &str = "Electronics";
pub const BOOKS: &str = "Books";
pub const FURNITURE: &str = "Furniture";
pub const CLOTHING: &str = "Clothing";
pub const KITCHEN: &str = "Kitchen";
pub const SPORTS: &str = "Sports & Outdoors";
pub const STATIONERY: &str = "Stationery";
pub const OTHER: &str = "Other";
pub const WEAPON: &str = "Weapon / Dangerous Item";
pub const RESTRICTED: &str = "Restricted Item";

/// Categories a user can choose for a listing.
pub const LISTING_CATEGORIES: [&str; 8] = [
    ELECTRONICS,
    BOOKS,
    FURNITURE,
    CLOTHING,
    KITCHEN,
    SPORTS,
    STATIONERY,
    OTHER,
];

/// Canonical labels that block an image outright when predicted with
/// high confidence.
pub const FORBIDDEN_CLASSES: [&str; 2] = [WEAPON, RESTRICTED];

/// Raw label (lowercase) -> canonical category.
const SYNONYMS: &[(&str, &str)] = &[
    // Electronics
    ("laptop", ELECTRONICS),
    ("notebook computer", ELECTRONICS),
    ("desktop computer", ELECTRONICS),
    ("computer keyboard", ELECTRONICS),
    ("mouse", ELECTRONICS),
    ("monitor", ELECTRONICS),
    ("cellular telephone", ELECTRONICS),
    ("mobile phone", ELECTRONICS),
    ("headphones", ELECTRONICS),
    ("ipod", ELECTRONICS),
    ("television", ELECTRONICS),
    ("electronics", ELECTRONICS),
    // Books
    ("book", BOOKS),
    ("textbook", BOOKS),
    ("book jacket", BOOKS),
    ("comic book", BOOKS),
    ("books", BOOKS),
    // Furniture
    ("chair", FURNITURE),
    ("folding chair", FURNITURE),
    ("desk", FURNITURE),
    ("table", FURNITURE),
    ("bookcase", FURNITURE),
    ("studio couch", FURNITURE),
    ("furniture", FURNITURE),
    // Clothing
    ("t-shirt", CLOTHING),
    ("jersey", CLOTHING),
    ("sweatshirt", CLOTHING),
    ("jean", CLOTHING),
    ("running shoe", CLOTHING),
    ("backpack", CLOTHING),
    ("clothing", CLOTHING),
    // Kitchen
    ("coffee mug", KITCHEN),
    ("frying pan", KITCHEN),
    ("microwave", KITCHEN),
    ("toaster", KITCHEN),
    ("water bottle", KITCHEN),
    ("kitchen", KITCHEN),
    // Sports
    ("basketball", SPORTS),
    ("soccer ball", SPORTS),
    ("tennis ball", SPORTS),
    ("mountain bike", SPORTS),
    ("dumbbell", SPORTS),
    ("sports", SPORTS),
    // Stationery
    ("ballpoint", STATIONERY),
    ("fountain pen", STATIONERY),
    ("pencil box", STATIONERY),
    ("binder", STATIONERY),
    ("calculator", STATIONERY),
    ("stationery", STATIONERY),
    // Weapons and dangerous items
    ("weapon", WEAPON),
    ("revolver", WEAPON),
    ("rifle", WEAPON),
    ("assault rifle", WEAPON),
    ("gun", WEAPON),
    ("knife", WEAPON),
    ("cleaver", WEAPON),
    ("sword", WEAPON),
    ("missile", WEAPON),
    ("weapon / dangerous item", WEAPON),
    // Restricted goods
    ("pill bottle", RESTRICTED),
    ("syringe", RESTRICTED),
    ("beer bottle", RESTRICTED),
    ("wine bottle", RESTRICTED),
    ("cigarette", RESTRICTED),
    ("restricted item", RESTRICTED),
];

/// Map a raw classifier label to its canonical category.
///
/// Matching is case-insensitive and ignores surrounding whitespace.
/// Unknown labels are returned unchanged with a warning.
pub fn canonical_category(raw_label: &str) -> String {
    let key = raw_label.trim().to_lowercase();
    match SYNONYMS.iter().find(|(raw, _)| *raw == key) {
        Some((_, canonical)) => (*canonical).to_string(),
        None => {
            warn!(label = raw_label, "Unmapped classifier label, passing through");
            raw_label.trim().to_string()
        }
    }
}

/// Whether a canonical label belongs to the forbidden class set.
pub fn is_forbidden(canonical: &str) -> bool {
    FORBIDDEN_CLASSES
        .iter()
        .any(|f| f.eq_ignore_ascii_case(canonical))
}
