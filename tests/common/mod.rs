// Shared fakes for integration tests: in-memory stand-ins for every
// collaborator the gate talks to. No network, no model, no disk.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::Result;
use async_trait::async_trait;

use listing_guard::classifier::category::CategoryClassifier;
use listing_guard::classifier::image::DecodedImage;
use listing_guard::classifier::traits::{ImageClassifier, Prediction};
use listing_guard::gate::GateServices;
use listing_guard::generator::traits::{GeneratorReply, TextGenerator};
use listing_guard::generator::DescriptionGenerator;
use listing_guard::keywords::word_list::{WordList, WordListSource};
use listing_guard::store::identity::StaticIdentity;
use listing_guard::store::models::{NewListing, UserIdentity};
use listing_guard::store::traits::{ObjectStorage, RecordStore, StoreError};

/// A tiny decoded image. The bytes are a stand-in; nothing decodes them.
pub fn test_image() -> DecodedImage {
    DecodedImage {
        bytes: vec![0x89, b'P', b'N', b'G'],
        mime_type: "image/png".to_string(),
        pixels: image::RgbImage::from_pixel(2, 2, image::Rgb([120, 120, 120])),
    }
}

pub fn test_user() -> UserIdentity {
    UserIdentity {
        id: "student-1".to_string(),
        display_name: "Alex Rivera".to_string(),
        email: "alex@campus.edu".to_string(),
    }
}

pub fn word_list(words: &[&str]) -> WordList {
    WordList::from_entries(words, WordListSource::Remote)
}

// --- Classifier fakes ---

/// Returns queued predictions in order; an empty reply once exhausted.
pub struct ScriptedClassifier {
    replies: Mutex<VecDeque<Vec<Prediction>>>,
    pub calls: AtomicUsize,
}

impl ScriptedClassifier {
    pub fn new(replies: Vec<Vec<Prediction>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Every image gets the same single prediction.
    pub fn always(label: &str, probability: f64) -> Self {
        Self::new(vec![vec![Prediction::new(label, probability)]; 8])
    }
}

#[async_trait]
impl ImageClassifier for ScriptedClassifier {
    async fn predict(&self, _image: &DecodedImage) -> Result<Vec<Prediction>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.replies.lock().unwrap().pop_front().unwrap_or_default())
    }
}

/// Always fails, like a model that can't be loaded.
pub struct BrokenClassifier;

#[async_trait]
impl ImageClassifier for BrokenClassifier {
    async fn predict(&self, _image: &DecodedImage) -> Result<Vec<Prediction>> {
        anyhow::bail!("model failed to initialize")
    }
}

/// Never answers.
pub struct HangingClassifier;

#[async_trait]
impl ImageClassifier for HangingClassifier {
    async fn predict(&self, _image: &DecodedImage) -> Result<Vec<Prediction>> {
        futures::future::pending().await
    }
}

// --- Generator fakes ---

pub enum ScriptedReply {
    Text(String),
    Blocked(String),
    Error(String),
    Hang,
}

pub struct ScriptedGenerator {
    reply: ScriptedReply,
    pub calls: AtomicUsize,
    pub last_prompt: Mutex<Option<String>>,
    pub saw_image: Mutex<Option<bool>>,
}

impl ScriptedGenerator {
    pub fn new(reply: ScriptedReply) -> Self {
        Self {
            reply,
            calls: AtomicUsize::new(0),
            last_prompt: Mutex::new(None),
            saw_image: Mutex::new(None),
        }
    }

    pub fn json(title: &str, description: &str) -> Self {
        Self::new(ScriptedReply::Text(
            serde_json::json!({ "title": title, "description": description }).to_string(),
        ))
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn complete(&self, prompt: &str, image: Option<&DecodedImage>) -> Result<GeneratorReply> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_prompt.lock().unwrap() = Some(prompt.to_string());
        *self.saw_image.lock().unwrap() = Some(image.is_some());
        match &self.reply {
            ScriptedReply::Text(text) => Ok(GeneratorReply::Text(text.clone())),
            ScriptedReply::Blocked(reason) => Ok(GeneratorReply::Blocked(reason.clone())),
            ScriptedReply::Error(message) => anyhow::bail!("{}", message),
            ScriptedReply::Hang => futures::future::pending().await,
        }
    }
}

// --- Store fakes ---

/// Records uploads in memory. Fails any key containing `fail_marker`.
#[derive(Default)]
pub struct MemoryStorage {
    pub uploads: Mutex<Vec<String>>,
    pub fail_marker: Option<String>,
}

impl MemoryStorage {
    pub fn failing_on(marker: &str) -> Self {
        Self {
            uploads: Mutex::new(Vec::new()),
            fail_marker: Some(marker.to_string()),
        }
    }

    pub fn upload_count(&self) -> usize {
        self.uploads.lock().unwrap().len()
    }
}

#[async_trait]
impl ObjectStorage for MemoryStorage {
    async fn upload(&self, _bytes: &[u8], key: &str, _content_type: &str) -> Result<String, StoreError> {
        if let Some(marker) = &self.fail_marker {
            if key.contains(marker.as_str()) {
                return Err(StoreError::Unavailable(format!("upload of {key} timed out")));
            }
        }
        self.uploads.lock().unwrap().push(key.to_string());
        Ok(format!("https://cdn.example.edu/{key}"))
    }
}

pub enum RecordFailure {
    None,
    PermissionDenied,
}

pub struct MemoryRecords {
    pub listings: Mutex<Vec<NewListing>>,
    failure: RecordFailure,
}

impl MemoryRecords {
    pub fn new() -> Self {
        Self {
            listings: Mutex::new(Vec::new()),
            failure: RecordFailure::None,
        }
    }

    pub fn failing(failure: RecordFailure) -> Self {
        Self {
            listings: Mutex::new(Vec::new()),
            failure,
        }
    }

    pub fn count(&self) -> usize {
        self.listings.lock().unwrap().len()
    }
}

#[async_trait]
impl RecordStore for MemoryRecords {
    async fn create_listing(&self, listing: &NewListing) -> Result<String, StoreError> {
        if let RecordFailure::PermissionDenied = self.failure {
            return Err(StoreError::PermissionDenied("missing write permission".to_string()));
        }
        let mut listings = self.listings.lock().unwrap();
        listings.push(listing.clone());
        Ok(format!("listing-{}", listings.len()))
    }
}

/// Handles to every fake so tests can inspect them after the gate runs.
pub struct Harness {
    pub classifier: Arc<dyn ImageClassifier>,
    pub generator: Arc<ScriptedGenerator>,
    pub storage: Arc<MemoryStorage>,
    pub records: Arc<MemoryRecords>,
    pub word_list: WordList,
    pub user: Option<UserIdentity>,
}

impl Harness {
    pub fn new() -> Self {
        Self {
            classifier: Arc::new(ScriptedClassifier::always("laptop", 0.9)),
            generator: Arc::new(ScriptedGenerator::json(
                "Dell Laptop",
                "A reliable laptop for coursework.",
            )),
            storage: Arc::new(MemoryStorage::default()),
            records: Arc::new(MemoryRecords::new()),
            word_list: word_list(&["drug", "weapon", "stolen"]),
            user: Some(test_user()),
        }
    }

    pub fn services(&self) -> GateServices {
        GateServices {
            classifier: CategoryClassifier::new(self.classifier.clone()),
            generator: DescriptionGenerator::new(self.generator.clone()),
            word_list: self.word_list.clone(),
            storage: self.storage.clone(),
            records: self.records.clone(),
            identity: Arc::new(StaticIdentity::new(self.user.clone())),
        }
    }
}
