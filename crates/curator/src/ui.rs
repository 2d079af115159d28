//! Terminal output helpers.
//!
//! This module uses println! for operator-facing output; diagnostics go
//! through tracing instead.

use std::collections::BTreeMap;

use colored::Colorize;

use crate::dataset::{BatchOutcome, Dataset};

/// Print a section header
pub fn print_section(title: &str) {
    println!("{}", "─".repeat(85).bright_black());
    println!("{}", title.cyan().bold());
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message.green());
}

/// Print a warning message
pub fn print_warning(message: &str) {
    println!("{} {}", "⚠".yellow().bold(), message.yellow());
}

/// Print an info message
pub fn print_info(message: &str) {
    println!("{} {}", "ℹ".blue().bold(), message);
}

/// Print a fatal error
pub fn print_error(message: &str) {
    eprintln!("{} {message}", "ERROR:".red().bold());
}

/// Print the progress line for one message of a batch
pub fn print_message_progress(index: usize, total: usize, text: &str) {
    println!(
        "{} {}",
        format!("{}/{total}", index + 1).bright_black(),
        text
    );
}

/// Print a skip notice for an ineligible message
pub fn print_skip(reason: &str) {
    println!("  {} {}", "→".bright_black(), reason.bright_black());
}

/// Print text/label pairs
pub fn print_classification_entries(entries: &Dataset) {
    for record in entries.values() {
        println!("  {} {}", "Text:".bright_black(), record.text);
        println!("  {} {}", "Label:".bright_black(), record.label.green());
    }
}

/// Print the review summary for a classified batch
pub fn print_batch_summary(outcome: &BatchOutcome) {
    print_section("Summary");
    if !outcome.updated.is_empty() {
        println!(
            "Updated {} existing classification(s):",
            outcome.updated.len()
        );
        print_classification_entries(&outcome.updated);
    }
    if outcome.added.is_empty() {
        println!("No new classification entries added");
    } else {
        println!("Added {} new classification(s):", outcome.added.len());
        print_classification_entries(&outcome.added);
    }
}

/// Print label scores, best first
pub fn print_scores(scores: &BTreeMap<String, f64>) {
    let mut sorted: Vec<_> = scores.iter().collect();
    sorted.sort_by(|a, b| b.1.total_cmp(a.1));
    for (label, score) in sorted {
        println!("  {label:<24} {score:.4}");
    }
}

/// Print the result of checking a text against its expected label
pub fn print_verification(verification: &textcat::Verification) {
    let status = if verification.passed() {
        "PASS".green().bold()
    } else {
        "FAIL".red().bold()
    };
    println!(
        "{status} {} (expected {}, got {})",
        verification.text,
        verification.expected_label,
        verification.predicted_label.as_deref().unwrap_or("<none>")
    );
    print_scores(&verification.scores);
}
