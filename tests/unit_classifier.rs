// Category classifier policy tests: confidence floor, label mapping, and
// hard-block decisions, with a scripted backend standing in for the model.

mod common;

use std::sync::Arc;

use listing_guard::classifier::category::{
    is_hard_block, CategoryClassifier, ClassificationResult, HARD_BLOCK_THRESHOLD,
};
use listing_guard::classifier::labels::{self, LISTING_CATEGORIES, RESTRICTED, WEAPON};
use listing_guard::classifier::traits::Prediction;

use common::{test_image, BrokenClassifier, ScriptedClassifier};

fn classifier(predictions: Vec<Prediction>) -> CategoryClassifier {
    CategoryClassifier::new(Arc::new(ScriptedClassifier::new(vec![predictions])))
}

// ============================================================
// Confidence floor and top-1 selection
// ============================================================

#[tokio::test]
async fn confident_prediction_is_mapped_to_canonical_category() {
    let result = classifier(vec![Prediction::new("Laptop", 0.92)])
        .classify(&test_image())
        .await
        .unwrap();
    assert_eq!(result.canonical_category, "Electronics");
    assert_eq!(result.raw_label, "Laptop");
    assert!((result.confidence - 0.92).abs() < 1e-9);
}

#[tokio::test]
async fn top_prediction_wins() {
    let result = classifier(vec![
        Prediction::new("desk", 0.2),
        Prediction::new("textbook", 0.7),
        Prediction::new("laptop", 0.1),
    ])
    .classify(&test_image())
    .await
    .unwrap();
    assert_eq!(result.canonical_category, "Books");
}

#[tokio::test]
async fn below_floor_is_no_suggestion() {
    let result = classifier(vec![Prediction::new("laptop", 0.49)])
        .classify(&test_image())
        .await;
    assert!(result.is_none());
}

#[tokio::test]
async fn exactly_at_floor_is_a_suggestion() {
    let result = classifier(vec![Prediction::new("laptop", 0.5)])
        .classify(&test_image())
        .await;
    assert!(result.is_some());
}

#[tokio::test]
async fn empty_predictions_are_no_suggestion() {
    assert!(classifier(Vec::new()).classify(&test_image()).await.is_none());
}

#[tokio::test]
async fn non_finite_probabilities_are_ignored() {
    let result = classifier(vec![
        Prediction::new("rifle", f64::NAN),
        Prediction::new("chair", 0.6),
    ])
    .classify(&test_image())
    .await
    .unwrap();
    assert_eq!(result.canonical_category, "Furniture");
}

#[tokio::test]
async fn backend_failure_is_no_suggestion() {
    let classifier = CategoryClassifier::new(Arc::new(BrokenClassifier));
    assert!(classifier.classify(&test_image()).await.is_none());
}

#[tokio::test]
async fn unknown_label_passes_through() {
    let result = classifier(vec![Prediction::new(" Ukulele ", 0.8)])
        .classify(&test_image())
        .await
        .unwrap();
    assert_eq!(result.canonical_category, "Ukulele");
    assert!(!is_hard_block(&result));
}

// ============================================================
// Hard-block policy
// ============================================================

fn result(category: &str, confidence: f64) -> ClassificationResult {
    ClassificationResult {
        canonical_category: category.to_string(),
        raw_label: category.to_lowercase(),
        confidence,
    }
}

#[test]
fn forbidden_class_above_threshold_blocks() {
    assert!(is_hard_block(&result(WEAPON, 0.95)));
    assert!(is_hard_block(&result(RESTRICTED, 0.81)));
}

#[test]
fn forbidden_class_at_threshold_does_not_block() {
    assert!(!is_hard_block(&result(WEAPON, HARD_BLOCK_THRESHOLD)));
    assert!(!is_hard_block(&result(WEAPON, 0.6)));
}

#[test]
fn allowed_categories_never_block() {
    for category in LISTING_CATEGORIES {
        assert!(!is_hard_block(&result(category, 1.0)), "{category} blocked");
        assert!(!labels::is_forbidden(category));
    }
}

#[tokio::test]
async fn weapon_photo_is_hard_blocked_end_to_end() {
    let result = classifier(vec![Prediction::new("revolver", 0.97)])
        .classify(&test_image())
        .await
        .unwrap();
    assert_eq!(result.canonical_category, WEAPON);
    assert!(is_hard_block(&result));
}
