//! # Midia Resolve
//!
//! A batch image compressor. Hand it photos and it resizes, center-crops and
//! re-encodes them at a chosen compression tier, carrying camera EXIF across
//! into the JPEG output.
//!
//! # Pipeline
//!
//! Every file goes through the same steps, one file at a time:
//!
//! ```text
//! 1. Scan      paths     →  InputFile        (declared mime from extension)
//! 2. Load      bytes     →  SourceImage      (decode, EXIF extract, upright)
//! 3. Resolve   request   →  TransformPlan    (target size, crop, codec)
//! 4. Render    pixels    →  pixels           (center crop / resize)
//! 5. Encode    pixels    →  bytes            (JPEG or PNG, EXIF re-attached)
//! ```
//!
//! A failure at any step fails only that file. The batch returns one
//! [`types::ProcessedResult`] per input and a success/failure summary.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`scan`] | Expands paths into inputs, declares mime types, skips non-images |
//! | [`imaging`] | Dimension math, the [`imaging::ImageBackend`] trait, decode/render/encode |
//! | [`metadata`] | EXIF extraction, tag stripping and re-insertion |
//! | [`process`] | Batch runner, per-file state, progress events, output writing |
//! | [`naming`] | Output file names and input ids |
//! | [`archive`] | ZIP bundling of successful outputs |
//! | [`config`] | `config.toml` loading, validation and merging over stock defaults |
//! | [`types`] | [`types::ProcessedResult`], shared by the runner, CLI and report |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Crop, Never Stretch
//!
//! An explicit width and height whose aspect ratio differs from the source
//! (by more than [`imaging::ASPECT_EPSILON`]) always takes a centered
//! sub-rectangle. Stretching only happens within that tolerance, where it is
//! invisible.
//!
//! ## JPEG Unless Nothing Changes
//!
//! Output is JPEG at the tier quality. A PNG stays PNG only at the `low` tier
//! with no resize, crop, or dimension input at all.
//!
//! ## Explicit Requests
//!
//! Dimension resolution is a pure function of a [`imaging::TransformRequest`]
//! and the source size. There is no ambient UI state to consult.

pub mod archive;
pub mod config;
pub mod imaging;
pub mod metadata;
pub mod naming;
pub mod output;
pub mod process;
pub mod scan;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
