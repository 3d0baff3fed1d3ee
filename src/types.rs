//! Shared result types.
//!
//! [`ProcessedResult`] is what the batch runner hands back per file, what the
//! CLI prints, and what `report.json` contains.

use serde::{Deserialize, Serialize};

/// Outcome of compressing one input.
///
/// A failed file keeps its original name and declared type, reports its
/// original size as the new size, and has no `url`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessedResult {
    /// `<name>-<modified ms>-<size>` of the input.
    pub id: String,
    /// Output name on success, original name on failure.
    pub name: String,
    /// Where the output was written. Empty until written, and for failures.
    #[serde(default)]
    pub url: String,
    pub original_size: u64,
    pub new_size: u64,
    /// Mime type of the output on success, declared input type on failure.
    #[serde(rename = "type")]
    pub mime: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Set only for JPEG output from a source that carried EXIF.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub was_exif_preserved: Option<bool>,
}

impl ProcessedResult {
    pub fn failed(
        id: String,
        name: String,
        original_size: u64,
        declared_mime: String,
        error: String,
    ) -> Self {
        Self {
            id,
            name,
            url: String::new(),
            original_size,
            new_size: original_size,
            mime: declared_mime,
            error: Some(error),
            was_exif_preserved: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}
