use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Deserialize;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use listing_guard::classifier::category::CategoryClassifier;
use listing_guard::classifier::image::DecodedImage;
use listing_guard::classifier::onnx::LazyOnnxClassifier;
use listing_guard::config::Config;
use listing_guard::gate::draft::{Condition, ListingKind};
use listing_guard::gate::error::GateError;
use listing_guard::gate::{GateServices, ImageOutcome, ModerationGate};
use listing_guard::generator::gemini::GeminiGenerator;
use listing_guard::generator::{DescriptionGenerator, GenerationOutcome};
use listing_guard::keywords::source::{
    self, FileConfigSource, HttpConfigSource, ModerationConfigSource, NoConfigSource,
};
use listing_guard::keywords::word_list::WordList;
use listing_guard::output::terminal;
use listing_guard::store::identity::StaticIdentity;
use listing_guard::store::local::LocalObjectStorage;
use listing_guard::store::sqlite::SqliteRecordStore;

/// Listing Guard: moderation and AI-assist for campus marketplace listings.
///
/// Checks photos, keywords, and generated copy before a listing or
/// donation is posted.
#[derive(Parser)]
#[command(name = "listing-guard", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the listing database
    Init,

    /// Show the banned keyword list for this session
    Words,

    /// Check text against the banned keyword list
    Check {
        /// Text to check
        text: String,
    },

    /// Suggest a category for a photo
    Classify {
        /// Path to a JPEG, PNG or WebP image
        image: PathBuf,
    },

    /// Generate a title and description from keywords
    Generate {
        /// Comma-separated keywords describing the item
        #[arg(long)]
        keywords: String,

        /// Listing category (e.g. Electronics)
        #[arg(long)]
        category: String,

        /// Optional photo to ground the description
        #[arg(long)]
        image: Option<PathBuf>,
    },

    /// Run a draft through the full moderation gate and post it
    Submit {
        /// Path to a draft JSON file
        draft: PathBuf,

        /// Generate the title and description from the draft's keywords
        #[arg(long)]
        generate: bool,
    },

    /// Show configuration and database status
    Status,
}

/// Draft file accepted by `submit`. Image paths are relative to the file.
#[derive(Deserialize)]
struct DraftFile {
    #[serde(default)]
    kind: ListingKind,
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    keywords: String,
    category: Option<String>,
    #[serde(default)]
    condition: Condition,
    price: Option<f64>,
    #[serde(default)]
    locations: Vec<String>,
    #[serde(default)]
    availability: String,
    #[serde(default)]
    images: Vec<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    // Set up structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("listing_guard=info")),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::load()?;

    match cli.command {
        Commands::Init => {
            info!("Initializing listing database...");
            SqliteRecordStore::open(&config.db_path)?;
            println!("Database initialized at: {}", config.db_path);
            println!("\nNext step: set up your .env file (GEMINI_API_KEY, LISTING_USER_ID, ...)");
        }

        Commands::Words => {
            let words = load_word_list(&config).await?;
            terminal::display_word_list(&words);
        }

        Commands::Check { text } => {
            let words = load_word_list(&config).await?;
            terminal::display_scan(&text, words.scan(&text));
        }

        Commands::Classify { image } => {
            config.require_classifier()?;
            let image = DecodedImage::open(&image)?;
            let classifier = build_classifier(&config);

            let pb = spinner("Classifying photo...")?;
            let result = classifier.classify(&image).await;
            pb.finish_and_clear();

            terminal::display_classification(result.as_ref());
        }

        Commands::Generate {
            keywords,
            category,
            image,
        } => {
            config.require_generator()?;
            let words = load_word_list(&config).await?;

            if let Some(word) = words.scan(&keywords) {
                terminal::display_scan(&keywords, Some(word));
                anyhow::bail!("Keywords contain a banned word; nothing was generated");
            }

            let image = image.as_deref().map(DecodedImage::open).transpose()?;
            let generator = build_generator(&config)?;

            let pb = spinner("Writing listing copy...")?;
            let outcome = generator.generate(&keywords, &category, image.as_ref()).await;
            pb.finish_and_clear();

            match outcome {
                GenerationOutcome::Generated(copy) => terminal::display_copy(&copy),
                GenerationOutcome::Refused { reason } => {
                    terminal::display_gate_error(&GateError::ForbiddenContent { reason });
                    anyhow::bail!("The item was refused");
                }
                GenerationOutcome::Failed { reason } => {
                    terminal::display_gate_error(&GateError::ServiceUnavailable {
                        service: "AI copywriting",
                        reason,
                    });
                }
            }
        }

        Commands::Submit { draft, generate } => {
            config.require_identity()?;
            run_submission(&config, &draft, generate).await?;
        }

        Commands::Status => {
            let store = SqliteRecordStore::open(&config.db_path)?;
            println!("Database: {} ({} listings)", config.db_path, store.count_listings().await?);

            let model = if listing_guard::classifier::onnx::model_files_present(&config.model_dir) {
                "ready".green().to_string()
            } else {
                "not installed (photos get no category suggestion)".yellow().to_string()
            };
            println!("Classifier model: {} [{}]", model, config.model_dir.display());

            let generator = if config.gemini_api_key.is_empty() {
                "disabled (GEMINI_API_KEY not set)".yellow().to_string()
            } else {
                format!("{} ({})", "enabled".green(), config.gemini_model)
            };
            println!("AI copywriting: {generator}");

            let moderation = match (&config.moderation_config_url, &config.moderation_config_file) {
                (Some(url), _) => url.clone(),
                (None, Some(path)) => path.display().to_string(),
                (None, None) => "none (built-in defaults)".to_string(),
            };
            println!("Moderation document: {moderation}");

            match config.identity() {
                Some(user) => println!("Signed in as: {} <{}>", user.display_name, user.email),
                None => println!("Signed in as: {}", "nobody".yellow()),
            }
        }
    }

    Ok(())
}

/// Drive one draft file through the gate: photos, optional generation,
/// then submission.
async fn run_submission(config: &Config, draft_path: &Path, generate: bool) -> Result<()> {
    let contents = std::fs::read_to_string(draft_path)
        .with_context(|| format!("Failed to read draft {}", draft_path.display()))?;
    let file: DraftFile = serde_json::from_str(&contents)
        .with_context(|| format!("Invalid draft file {}", draft_path.display()))?;
    let base_dir = draft_path.parent().unwrap_or_else(|| Path::new("."));

    if !listing_guard::classifier::onnx::model_files_present(&config.model_dir) {
        warn!("Classifier model not installed; photos will get no category suggestion");
    }

    let services = build_services(config).await?;
    let mut gate = ModerationGate::new(services, file.kind);
    let cancel = CancellationToken::new();

    {
        let draft = gate.draft_mut()?;
        draft.title = file.title;
        draft.description = file.description;
        draft.keywords = file.keywords;
        draft.category = file.category;
        draft.condition = file.condition;
        draft.price = file.price;
        draft.locations = file.locations;
        draft.availability = file.availability;
    }

    for path in &file.images {
        let path = base_dir.join(path);
        let image = DecodedImage::open(&path)?;

        let pb = spinner(&format!("Checking {}...", path.display()))?;
        let outcome = gate.add_image(image, &cancel).await;
        pb.finish_and_clear();

        match outcome {
            Ok(ImageOutcome::Suggested(result)) => {
                println!("{}:", path.display());
                terminal::display_classification(Some(&result));
            }
            Ok(ImageOutcome::NoSuggestion) => {
                println!("{}:", path.display());
                terminal::display_classification(None);
            }
            Err(e) => {
                println!("{}:", path.display());
                terminal::display_gate_error(&e);
            }
        }
    }

    if generate {
        let pb = spinner("Writing listing copy...")?;
        let outcome = gate.generate_copy(&cancel).await;
        pb.finish_and_clear();

        match outcome {
            Ok(copy) => terminal::display_copy(&copy),
            Err(e) => {
                terminal::display_gate_error(&e);
                if e.is_rejection() {
                    anyhow::bail!("Listing was not posted");
                }
            }
        }
    }

    let pb = spinner("Posting listing...")?;
    let outcome = gate.submit().await;
    pb.finish_and_clear();

    match outcome {
        Ok(receipt) => {
            terminal::display_receipt(&receipt);
            Ok(())
        }
        Err(e) => {
            terminal::display_gate_error(&e);
            anyhow::bail!("Listing was not posted");
        }
    }
}

/// Pick the moderation document source from config and load the word list.
async fn load_word_list(config: &Config) -> Result<WordList> {
    let config_source: Box<dyn ModerationConfigSource> =
        match (&config.moderation_config_url, &config.moderation_config_file) {
            (Some(url), _) => Box::new(HttpConfigSource::new(url)?),
            (None, Some(path)) => Box::new(FileConfigSource::new(path)),
            (None, None) => Box::new(NoConfigSource),
        };
    Ok(source::load(config_source.as_ref()).await)
}

fn build_classifier(config: &Config) -> CategoryClassifier {
    CategoryClassifier::new(Arc::new(LazyOnnxClassifier::new(&config.model_dir)))
}

fn build_generator(config: &Config) -> Result<DescriptionGenerator> {
    let backend = GeminiGenerator::new(
        &config.gemini_api_key,
        &config.gemini_model,
        &config.gemini_api_url,
    )?;
    Ok(DescriptionGenerator::new(Arc::new(backend)))
}

async fn build_services(config: &Config) -> Result<GateServices> {
    Ok(GateServices {
        classifier: build_classifier(config),
        generator: build_generator(config)?,
        word_list: load_word_list(config).await?,
        storage: Arc::new(LocalObjectStorage::new(&config.storage_dir)),
        records: Arc::new(SqliteRecordStore::open(&config.db_path)?),
        identity: Arc::new(StaticIdentity::new(config.identity())),
    })
}

fn spinner(message: &str) -> Result<ProgressBar> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("  {spinner} {msg}")?);
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    Ok(pb)
}
