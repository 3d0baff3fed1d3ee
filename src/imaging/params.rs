//! Parameter types for image operations.
//!
//! These structs describe *what* to do, not *how* to do it. They are the
//! interface between the high-level [`operations`](super::operations) module
//! (which decides what each output should look like) and the
//! [`backend`](super::backend) (which does the actual pixel work). This
//! separation allows swapping backends (e.g. for testing with a mock) without
//! changing the decision rules.
//!
//! ## Types
//!
//! - [`CompressionLevel`]: Named tier (`low|medium|high`) mapped to a [`Quality`].
//! - [`Quality`]: Lossy encoding quality (1–100). Clamped on construction.
//! - [`OutputCodec`]: JPEG (lossy, the default) or PNG (lossless passthrough).
//! - [`TransformRequest`]: Tier plus optional scale / explicit dimensions.
//! - [`RenderParams`]: Target canvas size and whether to center-crop.
//! - [`EncodeParams`]: Codec and quality for the final encode.

use serde::{Deserialize, Serialize};

/// Mime type of the lossy output codec.
pub const JPEG_MIME: &str = "image/jpeg";
/// Mime type of the lossless codec that may be passed through.
pub const PNG_MIME: &str = "image/png";

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u8);

impl Quality {
    pub fn new(value: u8) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u8 {
        self.0
    }

    /// Quality as a 0.0–1.0 fraction, the unit canvas encoders speak.
    pub fn as_fraction(self) -> f32 {
        f32::from(self.0) / 100.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        CompressionLevel::default().quality()
    }
}

/// Named compression preset.
///
/// `Low` compression means *high* quality: the tier names describe how hard
/// the file is squeezed, not how good it looks.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum CompressionLevel {
    Low,
    #[default]
    Medium,
    High,
}

impl CompressionLevel {
    /// low = 0.9, medium = 0.7, high = 0.5.
    pub fn quality(self) -> Quality {
        match self {
            CompressionLevel::Low => Quality(90),
            CompressionLevel::Medium => Quality(70),
            CompressionLevel::High => Quality(50),
        }
    }
}

/// Output codec chosen by the encoder decision rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputCodec {
    Jpeg,
    Png,
}

impl OutputCodec {
    pub fn mime(self) -> &'static str {
        match self {
            OutputCodec::Jpeg => JPEG_MIME,
            OutputCodec::Png => PNG_MIME,
        }
    }
}

/// What the caller asked for, independent of any particular source image.
///
/// `width`/`height` mirror two free-form inputs: either may be given on its
/// own, but only a pair of positive values drives the target size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransformRequest {
    pub level: CompressionLevel,
    /// Uniform scale percentage, 1–100.
    pub scale: u32,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl Default for TransformRequest {
    fn default() -> Self {
        Self {
            level: CompressionLevel::default(),
            scale: 100,
            width: None,
            height: None,
        }
    }
}

impl TransformRequest {
    /// Explicit target size, if both dimensions are valid positive integers.
    pub fn explicit_dimensions(&self) -> Option<(u32, u32)> {
        match (self.width, self.height) {
            (Some(w), Some(h)) if w > 0 && h > 0 => Some((w, h)),
            _ => None,
        }
    }

    /// True when the caller typed *anything* into width or height, valid or not.
    pub fn has_explicit_input(&self) -> bool {
        self.width.is_some() || self.height.is_some()
    }
}

/// Parameters for the crop-and-resize step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderParams {
    pub width: u32,
    pub height: u32,
    /// Take a centered sub-rectangle instead of stretching the full source.
    pub crop: bool,
}

/// Parameters for the final encode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodeParams {
    pub codec: OutputCodec,
    pub quality: Quality,
}
