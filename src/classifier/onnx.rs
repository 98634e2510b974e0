// Local ONNX image classifier.
//
// Runs entirely on the local CPU. The model directory holds the network
// (`model.onnx`) and a small manifest describing its input tensor and class
// labels, so any ImageNet-style classifier export can be dropped in without
// code changes.
//
// The session is expensive to build, so LazyOnnxClassifier defers loading
// until the first image arrives and caches the loaded model for the rest
// of the process.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use async_trait::async_trait;
use image::imageops::{self, FilterType};
use ort::session::Session;
use ort::value::Tensor;
use serde::Deserialize;
use tokio::sync::OnceCell;
use tracing::{debug, info};

use super::image::DecodedImage;
use super::traits::{ImageClassifier, Prediction};

const MODEL_FILE: &str = "model.onnx";
const MANIFEST_FILE: &str = "manifest.json";

/// Returns the default directory for storing model files.
/// Uses the platform data directory: ~/.local/share/listing-guard/models/ on Linux.
pub fn default_model_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("listing-guard")
        .join("models")
}

/// Check whether both required model files exist.
pub fn model_files_present(dir: &Path) -> bool {
    dir.join(MODEL_FILE).exists() && dir.join(MANIFEST_FILE).exists()
}

/// Describes the model's input tensor and output classes.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelManifest {
    /// Name of the image input tensor
    #[serde(default = "default_input_name")]
    pub input_name: String,
    /// Square input resolution in pixels
    #[serde(default = "default_image_size")]
    pub image_size: u32,
    /// Per-channel normalization (RGB)
    #[serde(default = "default_mean")]
    pub mean: [f32; 3],
    #[serde(default = "default_std")]
    pub std: [f32; 3],
    /// Whether the network emits raw logits (softmax applied here) or
    /// probabilities already
    #[serde(default = "default_true")]
    pub outputs_logits: bool,
    /// Class labels in output order
    pub labels: Vec<String>,
}

fn default_input_name() -> String {
    "input".to_string()
}

fn default_image_size() -> u32 {
    224
}

fn default_mean() -> [f32; 3] {
    [0.485, 0.456, 0.406]
}

fn default_std() -> [f32; 3] {
    [0.229, 0.224, 0.225]
}

fn default_true() -> bool {
    true
}

/// Loaded ONNX classifier. The session sits behind Arc<Mutex> because
/// `Session::run` takes &mut self and inference runs on spawn_blocking.
pub struct OnnxImageClassifier {
    session: Arc<Mutex<Session>>,
    manifest: Arc<ModelManifest>,
}

impl OnnxImageClassifier {
    /// Load the model and manifest from `model_dir`.
    pub fn load(model_dir: &Path) -> Result<Self> {
        let model_path = model_dir.join(MODEL_FILE);
        let manifest_path = model_dir.join(MANIFEST_FILE);

        if !model_path.exists() {
            anyhow::bail!("Model file not found: {}", model_path.display());
        }

        let manifest_json = std::fs::read_to_string(&manifest_path)
            .with_context(|| format!("Failed to read {}", manifest_path.display()))?;
        let manifest: ModelManifest = serde_json::from_str(&manifest_json)
            .with_context(|| format!("Invalid model manifest {}", manifest_path.display()))?;

        if manifest.labels.is_empty() {
            anyhow::bail!("Model manifest {} lists no labels", manifest_path.display());
        }

        let session = Session::builder()
            .context("Failed to create ONNX session builder")?
            .commit_from_file(&model_path)
            .with_context(|| format!("Failed to load ONNX model from {}", model_path.display()))?;

        debug!(
            labels = manifest.labels.len(),
            "Loaded ONNX image classifier from {}",
            model_dir.display()
        );

        Ok(Self {
            session: Arc::new(Mutex::new(session)),
            manifest: Arc::new(manifest),
        })
    }
}

#[async_trait]
impl ImageClassifier for OnnxImageClassifier {
    async fn predict(&self, image: &DecodedImage) -> Result<Vec<Prediction>> {
        let session = Arc::clone(&self.session);
        let manifest = Arc::clone(&self.manifest);
        let pixels = image.pixels.clone();

        tokio::task::spawn_blocking(move || {
            let size = manifest.image_size;
            let input = preprocess(&pixels, &manifest);
            let shape = [1_i64, 3, size as i64, size as i64];

            let input_tensor =
                Tensor::from_array((shape, input)).context("Failed to create input tensor")?;

            let scores = {
                let mut session = session
                    .lock()
                    .map_err(|e| anyhow::anyhow!("Session lock poisoned: {}", e))?;

                let outputs = session
                    .run(ort::inputs! { manifest.input_name.as_str() => input_tensor })
                    .context("ONNX inference failed")?;

                let (_out_shape, data) = outputs[0]
                    .try_extract_tensor::<f32>()
                    .context("Failed to extract output tensor")?;

                data.to_vec()
            };

            if scores.len() < manifest.labels.len() {
                anyhow::bail!(
                    "Model produced {} scores for {} labels",
                    scores.len(),
                    manifest.labels.len()
                );
            }

            let scores = &scores[..manifest.labels.len()];
            let probabilities = if manifest.outputs_logits {
                softmax(scores)
            } else {
                scores.iter().map(|&s| s as f64).collect()
            };

            Ok(manifest
                .labels
                .iter()
                .zip(probabilities)
                .map(|(label, p)| Prediction::new(label.clone(), p))
                .collect())
        })
        .await
        .context("spawn_blocking panicked")?
    }
}

/// Resize to the model's square input and lay out as normalized NCHW floats.
fn preprocess(pixels: &image::RgbImage, manifest: &ModelManifest) -> Vec<f32> {
    let size = manifest.image_size;
    let resized = imageops::resize(pixels, size, size, FilterType::Triangle);
    let plane = (size * size) as usize;
    let mut out = vec![0.0_f32; 3 * plane];

    for (i, pixel) in resized.pixels().enumerate() {
        for channel in 0..3 {
            let value = pixel[channel] as f32 / 255.0;
            out[channel * plane + i] = (value - manifest.mean[channel]) / manifest.std[channel];
        }
    }
    out
}

/// Numerically stable softmax.
fn softmax(logits: &[f32]) -> Vec<f64> {
    let max = logits
        .iter()
        .copied()
        .fold(f32::NEG_INFINITY, f32::max) as f64;
    let exps: Vec<f64> = logits.iter().map(|&l| (l as f64 - max).exp()).collect();
    let sum: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

/// Loads the ONNX model on first use and caches it for the process.
///
/// A failed load is not cached, so a model placed on disk after a failed
/// attempt is picked up by the next classification.
pub struct LazyOnnxClassifier {
    model_dir: PathBuf,
    loaded: OnceCell<Arc<OnnxImageClassifier>>,
}

impl LazyOnnxClassifier {
    pub fn new(model_dir: impl Into<PathBuf>) -> Self {
        Self {
            model_dir: model_dir.into(),
            loaded: OnceCell::new(),
        }
    }

    async fn get(&self) -> Result<&Arc<OnnxImageClassifier>> {
        self.loaded
            .get_or_try_init(|| async {
                let dir = self.model_dir.clone();
                let classifier = tokio::task::spawn_blocking(move || OnnxImageClassifier::load(&dir))
                    .await
                    .context("spawn_blocking panicked")??;
                info!(dir = %self.model_dir.display(), "Image classifier initialized");
                Ok::<_, anyhow::Error>(Arc::new(classifier))
            })
            .await
    }
}

#[async_trait]
impl ImageClassifier for LazyOnnxClassifier {
    async fn predict(&self, image: &DecodedImage) -> Result<Vec<Prediction>> {
        self.get().await?.predict(image).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manifest(size: u32) -> ModelManifest {
        ModelManifest {
            input_name: "input".to_string(),
            image_size: size,
            mean: [0.5, 0.5, 0.5],
            std: [0.5, 0.5, 0.5],
            outputs_logits: true,
            labels: vec!["a".to_string()],
        }
    }

    #[test]
    fn test_softmax_sums_to_one() {
        let probs = softmax(&[1.0, 2.0, 3.0]);
        let sum: f64 = probs.iter().sum();
        assert!((sum - 1.0).abs() < 1e-9);
        assert!(probs[2] > probs[1] && probs[1] > probs[0]);
    }

    #[test]
    fn test_softmax_handles_large_logits() {
        let probs = softmax(&[1000.0, 1000.0]);
        assert!((probs[0] - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_preprocess_layout_is_nchw() {
        // White image: every channel normalizes to (1.0 - 0.5) / 0.5 = 1.0
        let pixels = image::RgbImage::from_pixel(8, 8, image::Rgb([255, 255, 255]));
        let out = preprocess(&pixels, &manifest(4));
        assert_eq!(out.len(), 3 * 4 * 4);
        assert!(out.iter().all(|v| (v - 1.0).abs() < 1e-6));
    }

    #[test]
    fn test_preprocess_separates_channels() {
        let pixels = image::RgbImage::from_pixel(2, 2, image::Rgb([255, 0, 0]));
        let out = preprocess(&pixels, &manifest(2));
        let plane = 4;
        assert!(out[..plane].iter().all(|v| (v - 1.0).abs() < 1e-6));
        assert!(out[plane..].iter().all(|v| (v + 1.0).abs() < 1e-6));
    }

    #[test]
    fn test_manifest_defaults() {
        let m: ModelManifest = serde_json::from_str(r#"{"labels": ["laptop", "book"]}"#).unwrap();
        assert_eq!(m.input_name, "input");
        assert_eq!(m.image_size, 224);
        assert!(m.outputs_logits);
        assert_eq!(m.labels.len(), 2);
    }

    #[tokio::test]
    async fn test_lazy_classifier_missing_model_errors() {
        let dir = std::env::temp_dir().join("listing-guard-no-model-here");
        let classifier = LazyOnnxClassifier::new(&dir);
        let pixels = image::RgbImage::from_pixel(2, 2, image::Rgb([0, 0, 0]));
        let image = DecodedImage {
            bytes: Vec::new(),
            mime_type: "image/png".to_string(),
            pixels,
        };
        assert!(classifier.predict(&image).await.is_err());
    }
}
