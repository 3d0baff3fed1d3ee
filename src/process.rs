//! Batch compression.
//!
//! Runs every [`InputFile`] through decode → resolve → render → encode →
//! metadata, one file at a time, and collects a [`ProcessedResult`] per input.
//!
//! ## Per-file lifecycle
//!
//! ```text
//! Loaded ──decode──▶ Dimensioned ──render+encode──▶ Transformed
//!    │                    │
//!    └────────────────────┴──▶ Failed
//! ```
//!
//! A failure only ever ends its own file. The batch keeps going and reports
//! success and failure counts in a [`BatchSummary`]. EXIF problems are not
//! failures: the file ships without metadata and says so.
//!
//! ## Resources
//!
//! A file's encoded input and decoded pixels belong to that file's step and are
//! dropped before the next file starts. Only the encoded outputs live on in the
//! [`BatchOutcome`]; starting a new batch and dropping the old outcome frees
//! them.
//!
//! ## Output
//!
//! ```text
//! compressed/
//! ├── compressed_dawn.jpeg
//! ├── compressed_logo.png        # low tier, untouched PNG
//! └── report.json                # every ProcessedResult, failures included
//! ```

use crate::archive::{self, ArchiveEntry, ArchiveError};
use crate::imaging::{ImageBackend, RustBackend, TransformRequest, load_source, transform};
use crate::naming::{DEFAULT_PREFIX, UniqueNames, output_name};
use crate::scan::InputFile;
use crate::types::ProcessedResult;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;

/// Name of the JSON report written next to the outputs.
pub const REPORT_FILE: &str = "report.json";

/// Error recorded for inputs whose declared type is not an image.
pub const NOT_AN_IMAGE: &str = "Not an image or no dimensions";

#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Archive error: {0}")]
    Archive(#[from] ArchiveError),
}

/// Where a file ended up in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileState {
    /// Bytes read, nothing decoded yet.
    Loaded,
    /// Decoded; source dimensions known.
    Dimensioned,
    /// Output encoded.
    Transformed,
    Failed,
}

/// Progress reported while a batch runs.
#[derive(Debug, Clone)]
pub enum ProcessEvent {
    BatchStarted {
        total: usize,
    },
    FileStarted {
        /// 1-based position in the batch.
        index: usize,
        total: usize,
        name: String,
    },
    FileFinished {
        index: usize,
        total: usize,
        result: ProcessedResult,
    },
}

impl ProcessEvent {
    /// Percentage of the batch done once this event has happened.
    pub fn progress(&self) -> f64 {
        let (done, total) = match self {
            ProcessEvent::BatchStarted { total } => (0, *total),
            ProcessEvent::FileStarted { index, total, .. } => (index.saturating_sub(1), *total),
            ProcessEvent::FileFinished { index, total, .. } => (*index, *total),
        };
        if total == 0 {
            100.0
        } else {
            done as f64 / total as f64 * 100.0
        }
    }
}

/// Settings applied to every file of a batch.
#[derive(Debug, Clone)]
pub struct ProcessOptions {
    pub request: TransformRequest,
    pub preserve_metadata: bool,
    pub prefix: String,
}

impl Default for ProcessOptions {
    fn default() -> Self {
        Self {
            request: TransformRequest::default(),
            preserve_metadata: true,
            prefix: DEFAULT_PREFIX.to_string(),
        }
    }
}

/// One input's result plus, on success, the encoded output.
#[derive(Debug, Clone)]
pub struct ProcessedFile {
    pub result: ProcessedResult,
    pub state: FileState,
    pub output: Option<Vec<u8>>,
}

impl ProcessedFile {
    fn failed(input: &InputFile, error: String) -> Self {
        tracing::error!(name = %input.name, %error, "file failed");
        Self {
            result: ProcessedResult::failed(
                input.id.clone(),
                input.name.clone(),
                input.size,
                input.declared_mime.clone(),
                error,
            ),
            state: FileState::Failed,
            output: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BatchSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
}

impl BatchSummary {
    fn from_files(files: &[ProcessedFile]) -> Self {
        let succeeded = files.iter().filter(|f| f.result.is_success()).count();
        Self {
            total: files.len(),
            succeeded,
            failed: files.len() - succeeded,
        }
    }
}

/// Everything a batch produced, in input order.
#[derive(Debug, Clone, Default)]
pub struct BatchOutcome {
    pub files: Vec<ProcessedFile>,
    pub summary: BatchSummary,
}

impl BatchOutcome {
    pub fn results(&self) -> Vec<&ProcessedResult> {
        self.files.iter().map(|f| &f.result).collect()
    }

    /// Successful outputs, named as they will be written.
    pub fn archive_entries(&self) -> Vec<ArchiveEntry<'_>> {
        self.files
            .iter()
            .filter(|f| f.result.is_success())
            .filter_map(|f| {
                f.output.as_deref().map(|bytes| ArchiveEntry {
                    name: &f.result.name,
                    bytes,
                })
            })
            .collect()
    }

    /// Bundle every successful output into one ZIP file.
    pub fn write_archive(&self, path: &Path) -> Result<usize, ProcessError> {
        Ok(archive::write_archive(path, &self.archive_entries())?)
    }
}

/// Compress a batch with the default backend.
pub fn process_batch(
    inputs: &[InputFile],
    options: &ProcessOptions,
    progress: Option<Sender<ProcessEvent>>,
) -> BatchOutcome {
    let backend = RustBackend::new();
    process_batch_with_backend(&backend, inputs, options, progress)
}

/// Compress a batch using a specific backend (allows testing with mock).
///
/// Never fails as a whole: per-file problems become failed results.
pub fn process_batch_with_backend(
    backend: &impl ImageBackend,
    inputs: &[InputFile],
    options: &ProcessOptions,
    progress: Option<Sender<ProcessEvent>>,
) -> BatchOutcome {
    let total = inputs.len();
    let send = |event: ProcessEvent| {
        if let Some(tx) = &progress {
            // A gone receiver only means nobody is watching
            let _ = tx.send(event);
        }
    };
    send(ProcessEvent::BatchStarted { total });

    let mut names = UniqueNames::new();
    let mut files = Vec::with_capacity(total);

    for (i, input) in inputs.iter().enumerate() {
        let index = i + 1;
        send(ProcessEvent::FileStarted {
            index,
            total,
            name: input.name.clone(),
        });

        let mut file = process_file(backend, input, options);
        if file.result.is_success() {
            file.result.name = names.claim(std::mem::take(&mut file.result.name));
        }

        send(ProcessEvent::FileFinished {
            index,
            total,
            result: file.result.clone(),
        });
        files.push(file);
    }

    let summary = BatchSummary::from_files(&files);
    tracing::debug!(?summary, "batch finished");
    BatchOutcome { files, summary }
}

/// Run a single input through the whole pipeline.
pub fn process_file(
    backend: &impl ImageBackend,
    input: &InputFile,
    options: &ProcessOptions,
) -> ProcessedFile {
    if !input.is_image() {
        return ProcessedFile::failed(input, NOT_AN_IMAGE.to_string());
    }

    let bytes = match input.read_bytes() {
        Ok(bytes) => bytes,
        Err(e) => return ProcessedFile::failed(input, e.to_string()),
    };
    log_state(input, FileState::Loaded);

    let source = match load_source(backend, bytes, &input.declared_mime) {
        Ok(source) => source,
        Err(e) => return ProcessedFile::failed(input, e.to_string()),
    };
    log_state(input, FileState::Dimensioned);

    let output = match transform(
        backend,
        &source,
        &options.request,
        options.preserve_metadata,
    ) {
        Ok(output) => output,
        Err(e) => return ProcessedFile::failed(input, e.to_string()),
    };
    drop(source);
    log_state(input, FileState::Transformed);

    let name = output_name(
        &input.name,
        &input.declared_mime,
        output.mime,
        &options.prefix,
    );
    ProcessedFile {
        result: ProcessedResult {
            id: input.id.clone(),
            name,
            url: String::new(),
            original_size: input.size,
            new_size: output.size(),
            mime: output.mime.to_string(),
            error: None,
            was_exif_preserved: output.exif_preserved,
        },
        state: FileState::Transformed,
        output: Some(output.bytes),
    }
}

fn log_state(input: &InputFile, state: FileState) {
    tracing::debug!(name = %input.name, ?state, "file state");
}

/// Write every successful output and `report.json` into `out_dir`.
///
/// Fills in each written result's `url`. Returns the report path.
pub fn write_outputs(outcome: &mut BatchOutcome, out_dir: &Path) -> Result<PathBuf, ProcessError> {
    std::fs::create_dir_all(out_dir)?;

    for file in &mut outcome.files {
        if let Some(bytes) = &file.output {
            let path = out_dir.join(&file.result.name);
            std::fs::write(&path, bytes)?;
            file.result.url = path.display().to_string();
        }
    }

    let report_path = out_dir.join(REPORT_FILE);
    let json = serde_json::to_string_pretty(&outcome.results())?;
    std::fs::write(&report_path, json)?;
    Ok(report_path)
}
