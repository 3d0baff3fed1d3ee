//! Input discovery.
//!
//! Turns command-line paths into [`InputFile`]s, each carrying the mime type it
//! is *declared* as. Like a browser's `File.type`, the declared type comes from
//! the file extension alone; the decoder sniffs the real format later. A file
//! whose declared type is not `image/*` never enters the batch and is reported
//! in [`ScanOutcome::skipped`] instead.
//!
//! ## Walking
//!
//! - A file path is taken as-is (a non-image one is skipped like any other).
//! - A directory contributes its direct children, or its whole tree with
//!   `recursive`. Hidden entries (dot-files) are ignored.
//! - Entries within a directory are sorted by file name so batches are
//!   reproducible.
//! - A path that does not exist is an error: nothing is processed.
//!
//! Declared mime types are advisory. `photo.avif` is declared `image/avif`,
//! enters the batch, and then fails to decode.

use crate::naming::result_id;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Input path not found: {0}")]
    NotFound(PathBuf),
}

/// Extension → declared mime type, lowercase extensions.
const MIME_TYPES: &[(&str, &str)] = &[
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("jfif", "image/jpeg"),
    ("png", "image/png"),
    ("gif", "image/gif"),
    ("webp", "image/webp"),
    ("bmp", "image/bmp"),
    ("tif", "image/tiff"),
    ("tiff", "image/tiff"),
    ("avif", "image/avif"),
    ("heic", "image/heic"),
    ("heif", "image/heif"),
    ("svg", "image/svg+xml"),
    ("ico", "image/x-icon"),
    ("txt", "text/plain"),
    ("md", "text/markdown"),
    ("json", "application/json"),
    ("pdf", "application/pdf"),
    ("zip", "application/zip"),
    ("mp4", "video/mp4"),
    ("mov", "video/quicktime"),
];

/// Declared mime type for a file name. Unknown extensions declare nothing (`""`).
pub fn declared_mime(name: &str) -> &'static str {
    let ext = Path::new(name)
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    MIME_TYPES
        .iter()
        .find(|(e, _)| *e == ext)
        .map(|(_, mime)| *mime)
        .unwrap_or("")
}

pub fn is_image_mime(mime: &str) -> bool {
    mime.starts_with("image/")
}

/// Where an input's bytes live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    File(PathBuf),
    Memory(Vec<u8>),
}

/// One file selected for compression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputFile {
    pub id: String,
    /// File name only, no directories.
    pub name: String,
    pub declared_mime: String,
    pub size: u64,
    pub source: InputSource,
}

impl InputFile {
    /// Describe a file on disk. Only metadata is read here.
    pub fn from_path(path: &Path) -> Result<Self, ScanError> {
        let meta = fs::metadata(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let modified_ms = meta
            .modified()
            .ok()
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .map(|d| d.as_millis())
            .unwrap_or(0);
        Ok(Self {
            id: result_id(&name, modified_ms, meta.len()),
            declared_mime: declared_mime(&name).to_string(),
            size: meta.len(),
            source: InputSource::File(path.to_path_buf()),
            name,
        })
    }

    /// Describe an in-memory buffer, declared by `name`'s extension.
    pub fn from_memory(name: &str, bytes: Vec<u8>, modified_ms: u128) -> Self {
        let size = bytes.len() as u64;
        Self {
            id: result_id(name, modified_ms, size),
            name: name.to_string(),
            declared_mime: declared_mime(name).to_string(),
            size,
            source: InputSource::Memory(bytes),
        }
    }

    /// Override the declared type (for callers that know better than the extension).
    pub fn with_declared_mime(mut self, mime: &str) -> Self {
        self.declared_mime = mime.to_string();
        self
    }

    pub fn is_image(&self) -> bool {
        is_image_mime(&self.declared_mime)
    }

    /// Read the full contents.
    pub fn read_bytes(&self) -> std::io::Result<Vec<u8>> {
        match &self.source {
            InputSource::File(path) => fs::read(path),
            InputSource::Memory(bytes) => Ok(bytes.clone()),
        }
    }
}

/// Inputs accepted into the batch, plus those rejected up front.
#[derive(Debug, Default)]
pub struct ScanOutcome {
    pub inputs: Vec<InputFile>,
    pub skipped: Vec<InputFile>,
}

impl ScanOutcome {
    /// Split already-described inputs into images and non-images.
    pub fn partition(files: Vec<InputFile>) -> Self {
        let (inputs, skipped): (Vec<_>, Vec<_>) = files.into_iter().partition(InputFile::is_image);
        for file in &skipped {
            tracing::warn!(name = %file.name, mime = %file.declared_mime, "skipping non-image input");
        }
        Self { inputs, skipped }
    }
}

/// Expand `paths` into input files.
pub fn scan(paths: &[PathBuf], recursive: bool) -> Result<ScanOutcome, ScanError> {
    let mut files = Vec::new();
    for path in paths {
        if !path.exists() {
            return Err(ScanError::NotFound(path.clone()));
        }
        if path.is_dir() {
            collect_dir(path, recursive, &mut files)?;
        } else {
            files.push(InputFile::from_path(path)?);
        }
    }
    tracing::debug!(count = files.len(), "inputs discovered");
    Ok(ScanOutcome::partition(files))
}

fn collect_dir(dir: &Path, recursive: bool, files: &mut Vec<InputFile>) -> Result<(), ScanError> {
    let max_depth = if recursive { usize::MAX } else { 1 };
    let walker = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(max_depth)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_hidden(e.file_name()));

    for entry in walker {
        let entry = entry.map_err(std::io::Error::from)?;
        if entry.file_type().is_file() {
            files.push(InputFile::from_path(entry.path())?);
        }
    }
    Ok(())
}

fn is_hidden(name: &std::ffi::OsStr) -> bool {
    name.to_string_lossy().starts_with('.')
}
