// Image classifier trait: the swap-ready abstraction.
//
// The default implementation runs a local ONNX model. Tests plug in
// fixed-output fakes so the policy layer can be exercised without a model.

use anyhow::Result;
use async_trait::async_trait;

use super::image::DecodedImage;

/// A single raw prediction from the classification backend.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    /// The backend's own class label, before canonical mapping
    pub label: String,
    /// Probability from 0.0 to 1.0
    pub probability: f64,
}

impl Prediction {
    pub fn new(label: impl Into<String>, probability: f64) -> Self {
        Self {
            label: label.into(),
            probability,
        }
    }
}

/// Trait for classifying an image. Async because backends either offload
/// CPU-bound inference to a blocking thread or call a remote service.
#[async_trait]
pub trait ImageClassifier: Send + Sync {
    /// Return predictions for the image. Order is not significant; the
    /// caller selects the maximum-probability entry.
    async fn predict(&self, image: &DecodedImage) -> Result<Vec<Prediction>>;
}
