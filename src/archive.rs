//! ZIP bundling of batch outputs.
//!
//! Each entry is stored at the archive root under its output name, deflated.
//! An archive with nothing in it is refused rather than written.

use std::fs::File;
use std::io::{BufWriter, Seek, Write};
use std::path::Path;
use thiserror::Error;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Archive file name used when none is configured.
pub const DEFAULT_ARCHIVE_NAME: &str = "MidiaResolve_Processed_Images.zip";

#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("No processed files were available to include in the ZIP")]
    NoFilesToArchive,
}

/// One file to place in the archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArchiveEntry<'a> {
    pub name: &'a str,
    pub bytes: &'a [u8],
}

/// Write `entries` as a ZIP archive into `writer`. Returns the entry count.
pub fn bundle<W: Write + Seek>(writer: W, entries: &[ArchiveEntry<'_>]) -> Result<usize, ArchiveError> {
    if entries.is_empty() {
        return Err(ArchiveError::NoFilesToArchive);
    }

    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut zip = ZipWriter::new(writer);
    for entry in entries {
        zip.start_file(entry.name, options)?;
        zip.write_all(entry.bytes)?;
    }
    zip.finish()?.flush()?;
    Ok(entries.len())
}

/// Write `entries` to a ZIP file at `path`.
///
/// Nothing is created when there are no entries.
pub fn write_archive(path: &Path, entries: &[ArchiveEntry<'_>]) -> Result<usize, ArchiveError> {
    if entries.is_empty() {
        return Err(ArchiveError::NoFilesToArchive);
    }
    let file = File::create(path)?;
    let count = bundle(BufWriter::new(file), entries)?;
    tracing::debug!(path = %path.display(), count, "archive written");
    Ok(count)
}
