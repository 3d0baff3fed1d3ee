//! CLI output formatting.
//!
//! # Display
//!
//! Every file gets one header line with its batch position and output name,
//! followed by indented context lines: sizes and reduction, EXIF status, or
//! the error that stopped it.
//!
//! ```text
//! Compressing 3 images
//! [ 33%] 001 compressed_dawn.jpeg
//!     2.4 MB → 512.3 KB (reduced by 79.2%)
//!     EXIF preserved
//! [ 67%] 002 broken.jpg (Failed)
//!     Could not decode image: ...
//! [100%] 003 compressed_logo.png
//!     18.2 KB → 17.9 KB (reduced by 1.6%)
//!
//! Batch Processing Finished
//!     2 images processed successfully, 1 failed. Check results below.
//! ```
//!
//! # Architecture
//!
//! Each display has a `format_*` function (returns `Vec<String>` or `String`)
//! for testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::imaging::JPEG_MIME;
use crate::process::{BatchOutcome, ProcessEvent};
use crate::scan::InputFile;
use crate::types::ProcessedResult;
use std::path::Path;

// ============================================================================
// Shared helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Human-readable size: `0 Bytes`, `512 Bytes`, `1.5 KB`, `2 MB`.
///
/// Binary units, at most two decimals, trailing zeros dropped.
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["Bytes", "KB", "MB", "GB", "TB"];
    if bytes == 0 {
        return "0 Bytes".to_string();
    }
    let mut value = bytes as f64;
    let mut exp = 0;
    while value >= 1024.0 && exp < UNITS.len() - 1 {
        value /= 1024.0;
        exp += 1;
    }
    let fixed = format!("{:.2}", value);
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    format!("{} {}", trimmed, UNITS[exp])
}

/// Size reduction with one decimal, `"0"` for failures and empty inputs.
///
/// Negative when the output grew.
pub fn reduction_percentage(result: &ProcessedResult) -> String {
    if result.original_size == 0 || !result.is_success() {
        return "0".to_string();
    }
    let original = result.original_size as f64;
    let saved = original - result.new_size as f64;
    format!("{:.1}", saved / original * 100.0)
}

/// Notice for an input rejected before processing.
pub fn format_skipped(file: &InputFile) -> String {
    format!("\"{}\" is not an image and will be skipped.", file.name)
}

/// Header + context lines for one result.
fn result_lines(index: usize, result: &ProcessedResult) -> Vec<String> {
    let mut lines = Vec::new();
    match &result.error {
        Some(error) => {
            lines.push(format!("{} {} (Failed)", format_index(index), result.name));
            lines.push(format!("{}{}", indent(1), error));
        }
        None => {
            lines.push(format!("{} {}", format_index(index), result.name));
            lines.push(format!(
                "{}{} \u{2192} {} (reduced by {}%)",
                indent(1),
                format_file_size(result.original_size),
                format_file_size(result.new_size),
                reduction_percentage(result)
            ));
            match result.was_exif_preserved {
                Some(true) => lines.push(format!("{}EXIF preserved", indent(1))),
                Some(false) => lines.push(format!("{}EXIF not preserved", indent(1))),
                None => {}
            }
        }
    }
    lines
}

// ============================================================================
// Progress
// ============================================================================

/// Format a single progress event as display lines.
///
/// Start-of-file events print nothing; the file's lines appear once it is done,
/// prefixed with the batch percentage.
pub fn format_process_event(event: &ProcessEvent) -> Vec<String> {
    match event {
        ProcessEvent::BatchStarted { total } => {
            let noun = if *total == 1 { "image" } else { "images" };
            vec![format!("Compressing {} {}", total, noun)]
        }
        ProcessEvent::FileStarted { .. } => Vec::new(),
        ProcessEvent::FileFinished { index, result, .. } => {
            let mut lines = result_lines(*index, result);
            lines[0] = format!("[{:>3.0}%] {}", event.progress(), lines[0]);
            lines
        }
    }
}

// ============================================================================
// Results and summary
// ============================================================================

/// All results, one block per file, no progress prefix.
pub fn format_results(outcome: &BatchOutcome) -> Vec<String> {
    outcome
        .files
        .iter()
        .enumerate()
        .flat_map(|(i, f)| result_lines(i + 1, &f.result))
        .collect()
}

/// Title and description for a finished batch.
///
/// A single-file batch names the file; larger batches report counts.
pub fn format_summary(outcome: &BatchOutcome) -> Vec<String> {
    let summary = outcome.summary;
    let (title, description) = match (summary.total, outcome.files.first()) {
        (0, _) | (1, None) => (
            "No files selected".to_string(),
            "Please select image files to compress.".to_string(),
        ),
        (1, Some(file)) => {
            let result = &file.result;
            match &result.error {
                None => {
                    let mut message = format!("{} ready.", result.name);
                    match result.was_exif_preserved {
                        Some(true) => message.push_str(" EXIF preserved (JPEG)."),
                        Some(false) if result.mime == JPEG_MIME => {
                            message.push_str(" EXIF not preserved.")
                        }
                        _ => {}
                    }
                    ("Image Processed".to_string(), message)
                }
                Some(error) => ("Processing Failed".to_string(), error.clone()),
            }
        }
        _ if summary.failed == 0 => (
            "Batch Processing Complete!".to_string(),
            format!("{} images processed successfully.", summary.succeeded),
        ),
        _ if summary.succeeded > 0 => (
            "Batch Processing Finished".to_string(),
            format!(
                "{} images processed successfully, {} failed. Check results below.",
                summary.succeeded, summary.failed
            ),
        ),
        _ => (
            "Batch Processing Failed".to_string(),
            format!(
                "All {} images could not be processed. See details below.",
                summary.failed
            ),
        ),
    };
    vec![title, format!("{}{}", indent(1), description)]
}

pub fn format_archive_written(path: &Path, count: usize) -> String {
    let noun = if count == 1 { "file" } else { "files" };
    format!("Archive: {} ({} {})", path.display(), count, noun)
}

// ============================================================================
// Printing
// ============================================================================

pub fn print_skipped(skipped: &[InputFile]) {
    for file in skipped {
        println!("{}", format_skipped(file));
    }
}

pub fn print_results(outcome: &BatchOutcome) {
    for line in format_results(outcome) {
        println!("{}", line);
    }
}

pub fn print_summary(outcome: &BatchOutcome) {
    println!();
    for line in format_summary(outcome) {
        println!("{}", line);
    }
}
