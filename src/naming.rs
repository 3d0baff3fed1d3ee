//! Output file naming.
//!
//! Every result is named `<prefix><original name>`. When the output codec
//! differs from the declared input type, or the name would not end with the
//! output subtype, the extension is replaced:
//!
//! - `photo.png` at `low` → `compressed_photo.png` (unchanged codec)
//! - `photo.png` at `medium` → `compressed_photo.jpeg`
//! - `photo.jpg` → `compressed_photo.jpeg` (`jpg` does not end with `jpeg`)
//! - `photo` (no extension) → `compressed_photo.jpeg`
//!
//! The check is a plain suffix match, so it is case-sensitive.

use std::collections::HashSet;

/// Prefix prepended to every output name.
pub const DEFAULT_PREFIX: &str = "compressed_";

/// Subtype half of a mime string (`image/jpeg` → `jpeg`), or `bin`.
pub fn mime_subtype(mime: &str) -> &str {
    match mime.split_once('/') {
        Some((_, sub)) if !sub.is_empty() => sub,
        _ => "bin",
    }
}

/// Split `name` at its last dot. A leading dot counts, so `.env` has an empty base.
fn split_extension(name: &str) -> (&str, Option<&str>) {
    match name.rfind('.') {
        Some(dot) => (&name[..dot], Some(&name[dot + 1..])),
        None => (name, None),
    }
}

/// Name of the file produced from `original`.
pub fn output_name(original: &str, declared_mime: &str, output_mime: &str, prefix: &str) -> String {
    let kept = format!("{prefix}{original}");
    let subtype = mime_subtype(output_mime);
    if output_mime == declared_mime && kept.ends_with(subtype) {
        return kept;
    }
    let (base, _) = split_extension(original);
    format!("{prefix}{base}.{subtype}")
}

/// Stable identifier for an input: `<name>-<modified ms>-<size>`.
pub fn result_id(name: &str, modified_ms: u128, size: u64) -> String {
    format!("{name}-{modified_ms}-{size}")
}

/// Hands out output names, suffixing `-2`, `-3`, … before the extension on
/// collision so two inputs never overwrite each other's output.
#[derive(Debug, Default)]
pub struct UniqueNames {
    taken: HashSet<String>,
}

impl UniqueNames {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn claim(&mut self, name: String) -> String {
        if self.taken.insert(name.clone()) {
            return name;
        }
        let (base, ext) = split_extension(&name);
        let mut n = 2;
        loop {
            let candidate = match ext {
                Some(ext) => format!("{base}-{n}.{ext}"),
                None => format!("{base}-{n}"),
            };
            if self.taken.insert(candidate.clone()) {
                return candidate;
            }
            n += 1;
        }
    }
}
