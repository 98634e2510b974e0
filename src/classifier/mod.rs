// Category classification: trait-based abstraction for swappable backends.
//
// The ImageClassifier trait produces ranked (label, probability) pairs.
// CategoryClassifier sits on top of it and applies the listing policy:
// confidence floor, canonical label mapping, and fail-soft error handling.
// The hard-block decision (forbidden class at high confidence) is exposed
// as a predicate so the gate, not the classifier, enforces it.

pub mod category;
pub mod image;
pub mod labels;
pub mod onnx;
pub mod traits;
