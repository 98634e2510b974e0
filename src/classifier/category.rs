// Category classifier: listing policy on top of an ImageClassifier backend.
//
// classify() never fails: backend errors and low-confidence predictions
// both come back as None ("no suggestion"), and the user picks a category
// by hand. Whether a result is a hard block is decided by is_hard_block(),
// which the gate applies before accepting an image.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::image::DecodedImage;
use super::labels;
use super::traits::ImageClassifier;

/// Predictions below this probability are not surfaced.
pub const CONFIDENCE_FLOOR: f64 = 0.5;

/// Forbidden classes block an image only above this probability.
pub const HARD_BLOCK_THRESHOLD: f64 = 0.8;

/// The top prediction for an image, mapped to a canonical category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub canonical_category: String,
    pub raw_label: String,
    /// 0.0 to 1.0
    pub confidence: f64,
}

/// Whether the gate must refuse the image outright.
pub fn is_hard_block(result: &ClassificationResult) -> bool {
    labels::is_forbidden(&result.canonical_category) && result.confidence > HARD_BLOCK_THRESHOLD
}

#[derive(Clone)]
pub struct CategoryClassifier {
    backend: Arc<dyn ImageClassifier>,
}

impl CategoryClassifier {
    pub fn new(backend: Arc<dyn ImageClassifier>) -> Self {
        Self { backend }
    }

    /// Classify an image, returning None when there is no usable suggestion.
    pub async fn classify(&self, image: &DecodedImage) -> Option<ClassificationResult> {
        let predictions = match self.backend.predict(image).await {
            Ok(predictions) => predictions,
            Err(e) => {
                warn!(error = %e, "Image classification unavailable");
                return None;
            }
        };

        let best = predictions
            .into_iter()
            .filter(|p| p.probability.is_finite())
            .max_by(|a, b| a.probability.total_cmp(&b.probability))?;

        if best.probability < CONFIDENCE_FLOOR {
            debug!(
                label = best.label,
                confidence = best.probability,
                "Top prediction below confidence floor"
            );
            return None;
        }

        let canonical_category = labels::canonical_category(&best.label);
        debug!(
            label = best.label,
            category = canonical_category,
            confidence = best.probability,
            "Classified image"
        );

        Some(ClassificationResult {
            canonical_category,
            raw_label: best.label,
            confidence: best.probability.clamp(0.0, 1.0),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(category: &str, confidence: f64) -> ClassificationResult {
        ClassificationResult {
            canonical_category: category.to_string(),
            raw_label: category.to_lowercase(),
            confidence,
        }
    }

    #[test]
    fn test_hard_block_requires_forbidden_and_confident() {
        assert!(is_hard_block(&result(labels::WEAPON, 0.92)));
        assert!(!is_hard_block(&result(labels::WEAPON, 0.8)));
        assert!(!is_hard_block(&result(labels::WEAPON, 0.65)));
        assert!(!is_hard_block(&result(labels::ELECTRONICS, 0.99)));
        assert!(is_hard_block(&result(labels::RESTRICTED, 0.81)));
    }
}
