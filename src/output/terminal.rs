// Colored terminal output for pipeline results.
//
// main.rs delegates all formatting here so commands stay focused on
// wiring the pipeline together.

use colored::Colorize;

use crate::classifier::category::{is_hard_block, ClassificationResult};
use crate::classifier::labels::LISTING_CATEGORIES;
use crate::gate::error::{GateError, ValidationError};
use crate::gate::SubmissionReceipt;
use crate::generator::parse::GeneratedCopy;
use crate::keywords::word_list::WordList;

use super::truncate_chars;

/// Display the session word list and where it came from.
pub fn display_word_list(list: &WordList) {
    println!(
        "\n{}",
        format!("=== Banned keywords ({} from {}) ===", list.len(), list.source()).bold()
    );
    for word in list.words() {
        println!("  {}", word);
    }
}

/// Display the result of scanning a piece of text.
pub fn display_scan(text: &str, matched: Option<&str>) {
    let preview = truncate_chars(text, 80);
    match matched {
        Some(word) => println!(
            "{} \"{}\" contains banned keyword {}",
            "Blocked:".red().bold(),
            preview,
            format!("\"{word}\"").red()
        ),
        None => println!("{} \"{}\"", "Clean:".green().bold(), preview),
    }
}

/// Display a classification result, including whether it would block.
pub fn display_classification(result: Option<&ClassificationResult>) {
    let Some(result) = result else {
        println!(
            "{}",
            "No confident category suggestion; choose one manually.".dimmed()
        );
        return;
    };

    let confidence = format!("{:.0}%", result.confidence * 100.0);
    if is_hard_block(result) {
        println!(
            "{} {} ({}, raw label \"{}\")",
            "Blocked photo:".red().bold(),
            result.canonical_category.red(),
            confidence,
            result.raw_label
        );
    } else {
        println!(
            "Suggested category: {} ({}, raw label \"{}\")",
            result.canonical_category.bold(),
            confidence,
            result.raw_label.dimmed()
        );
    }
}

/// Display generated listing copy.
pub fn display_copy(copy: &GeneratedCopy) {
    println!("\n{} {}", "Title:".dimmed(), copy.title.bold());
    println!("{} {}", "Description:".dimmed(), copy.description);
}

/// Display a gate error the way the user needs to see it.
pub fn display_gate_error(err: &GateError) {
    match err {
        GateError::ForbiddenContent { reason } => {
            println!("{} {}", "Rejected:".red().bold(), reason);
        }
        GateError::KeywordViolation { word, checkpoint } => {
            println!(
                "{} \"{}\" isn't allowed in the {}. Remove it and try again.",
                "Rejected:".red().bold(),
                word.red(),
                checkpoint
            );
        }
        GateError::ServiceUnavailable { service, reason } => {
            println!("{} {} unavailable ({})", "Note:".yellow().bold(), service, reason);
            println!("  {}", "You can still write the title and description yourself.".dimmed());
        }
        GateError::Validation(ValidationError::NotSignedIn) => {
            println!("{} {}", "Not signed in:".yellow().bold(), err);
        }
        GateError::Validation(
            e @ (ValidationError::MissingCategory | ValidationError::ForbiddenCategory(_)),
        ) => {
            println!("{} {}", "Incomplete:".yellow().bold(), e);
            println!("  {} {}", "Categories:".dimmed(), LISTING_CATEGORIES.join(", "));
        }
        GateError::Validation(e) => {
            println!("{} {}", "Incomplete:".yellow().bold(), e);
        }
        GateError::Persistence(e) => {
            println!("{} {}", "Posting failed:".red().bold(), e);
            println!("  {}", e.hint().yellow());
        }
        GateError::InvalidState { .. } | GateError::Cancelled => {
            println!("{} {}", "Error:".red(), err);
        }
    }
}

/// Display a stored listing.
pub fn display_receipt(receipt: &SubmissionReceipt) {
    let listing = &receipt.listing;
    println!(
        "\n{}",
        format!("=== Listing #{} posted ===", receipt.record_id).green().bold()
    );
    println!("  {:<12} {}", "Title".dimmed(), listing.title);
    println!("  {:<12} {}", "Category".dimmed(), listing.category);
    println!("  {:<12} {}", "Condition".dimmed(), listing.condition.as_str());
    match listing.price {
        Some(price) => println!("  {:<12} ${:.2}", "Price".dimmed(), price),
        None => println!("  {:<12} {}", "Price".dimmed(), "Free (donation)".green()),
    }
    println!("  {:<12} {}", "Pickup".dimmed(), listing.locations.join(", "));
    println!("  {:<12} {}", "Photos".dimmed(), listing.image_urls.len());
    println!(
        "  {:<12} {}",
        "Description".dimmed(),
        truncate_chars(&listing.description, 100)
    );
}
