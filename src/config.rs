use std::env;
use std::path::PathBuf;

use anyhow::Result;

use crate::generator::gemini::{DEFAULT_GEMINI_API_URL, DEFAULT_GEMINI_MODEL};
use crate::store::models::UserIdentity;

/// Central configuration loaded from environment variables.
///
/// All secrets come from env vars (never hardcoded). The .env file
/// is loaded automatically at startup via dotenvy.
pub struct Config {
    pub db_path: String,
    /// Root directory for uploaded listing images
    pub storage_dir: PathBuf,
    /// Directory containing `model.onnx` and `manifest.json` for the classifier
    pub model_dir: PathBuf,
    /// Remote moderation document (`{ "bannedKeywords": [...] }`).
    /// Takes precedence over `moderation_config_file` when both are set.
    pub moderation_config_url: Option<String>,
    /// Local moderation document, for offline use
    pub moderation_config_file: Option<PathBuf>,
    /// Generative API key. Empty means AI copywriting is disabled
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub gemini_api_url: String,
    pub user_id: String,
    pub user_name: String,
    pub user_email: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Nothing is strictly required here; individual commands call the
    /// `require_*` checks for the pieces they need.
    pub fn load() -> Result<Self> {
        let model_dir = env::var("LISTING_GUARD_MODEL_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| crate::classifier::onnx::default_model_dir());

        Ok(Self {
            db_path: env::var("LISTING_GUARD_DB_PATH")
                .unwrap_or_else(|_| "./listing-guard.db".to_string()),
            storage_dir: env::var("LISTING_GUARD_STORAGE_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./uploads")),
            model_dir,
            moderation_config_url: non_empty_var("MODERATION_CONFIG_URL"),
            moderation_config_file: non_empty_var("MODERATION_CONFIG_FILE").map(PathBuf::from),
            gemini_api_key: env::var("GEMINI_API_KEY").unwrap_or_default(),
            gemini_model: env::var("GEMINI_MODEL")
                .unwrap_or_else(|_| DEFAULT_GEMINI_MODEL.to_string()),
            gemini_api_url: env::var("GEMINI_API_URL")
                .unwrap_or_else(|_| DEFAULT_GEMINI_API_URL.to_string()),
            user_id: env::var("LISTING_USER_ID").unwrap_or_default(),
            user_name: env::var("LISTING_USER_NAME").unwrap_or_default(),
            user_email: env::var("LISTING_USER_EMAIL").unwrap_or_default(),
        })
    }

    /// Check that the classifier model files are present.
    pub fn require_classifier(&self) -> Result<()> {
        if !crate::classifier::onnx::model_files_present(&self.model_dir) {
            anyhow::bail!(
                "Classifier model not found in {}\n\
                 Place model.onnx and manifest.json there, or set LISTING_GUARD_MODEL_DIR.",
                self.model_dir.display()
            );
        }
        Ok(())
    }

    /// Check that the generative API key is configured.
    /// Call this before any command that exists only to generate copy.
    pub fn require_generator(&self) -> Result<()> {
        if self.gemini_api_key.is_empty() {
            anyhow::bail!(
                "GEMINI_API_KEY not set. Add it to your .env file to enable AI copywriting."
            );
        }
        Ok(())
    }

    /// Check that a user identity is configured.
    /// Submissions are stamped with it, so `submit` refuses to run without one.
    pub fn require_identity(&self) -> Result<()> {
        if self.user_id.is_empty() {
            anyhow::bail!(
                "LISTING_USER_ID not set. Add LISTING_USER_ID, LISTING_USER_NAME and \
                 LISTING_USER_EMAIL to your .env file."
            );
        }
        Ok(())
    }

    /// The configured user, if any.
    pub fn identity(&self) -> Option<UserIdentity> {
        if self.user_id.is_empty() {
            return None;
        }
        Some(UserIdentity {
            id: self.user_id.clone(),
            display_name: self.user_name.clone(),
            email: self.user_email.clone(),
        })
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}
