//! Pure Rust image processing backend.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, TIFF, WebP, GIF, BMP) | `image::ImageReader` with content sniffing |
//! | Center crop | `image::DynamicImage::crop_imm` |
//! | Resize | `image::DynamicImage::resize_exact` with `Lanczos3` |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder` (RGB8, alpha dropped) |
//! | Encode → PNG | `image::codecs::png::PngEncoder` (lossless) |

use super::backend::{BackendError, ImageBackend};
use super::calculations::calculate_center_crop;
use super::params::{EncodeParams, OutputCodec, RenderParams};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageReader};
use std::io::Cursor;

/// Largest canvas the renderer will allocate (16384 x 16384).
pub const MAX_CANVAS_PIXELS: u64 = 268_435_456;

/// Pure Rust backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageBackend for RustBackend {
    fn decode(&self, bytes: &[u8]) -> Result<DynamicImage, BackendError> {
        ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(BackendError::Io)?
            .decode()
            .map_err(|e| BackendError::Decode(e.to_string()))
    }

    fn render(
        &self,
        image: &DynamicImage,
        params: &RenderParams,
    ) -> Result<DynamicImage, BackendError> {
        let area = u64::from(params.width) * u64::from(params.height);
        if params.width == 0 || params.height == 0 || area > MAX_CANVAS_PIXELS {
            return Err(BackendError::Render(format!(
                "no drawing surface for a {}x{} canvas",
                params.width, params.height
            )));
        }

        if params.crop {
            let rect = calculate_center_crop(
                (image.width(), image.height()),
                (params.width, params.height),
            );
            let cropped = image.crop_imm(rect.x, rect.y, rect.width, rect.height);
            Ok(cropped.resize_exact(params.width, params.height, FilterType::Lanczos3))
        } else if (image.width(), image.height()) == (params.width, params.height) {
            Ok(image.clone())
        } else {
            Ok(image.resize_exact(params.width, params.height, FilterType::Lanczos3))
        }
    }

    fn encode(&self, image: &DynamicImage, params: &EncodeParams) -> Result<Vec<u8>, BackendError> {
        let mut buf = Cursor::new(Vec::new());
        match params.codec {
            OutputCodec::Jpeg => {
                let encoder = JpegEncoder::new_with_quality(&mut buf, params.quality.value());
                image
                    .to_rgb8()
                    .write_with_encoder(encoder)
                    .map_err(|e| BackendError::Encode(format!("JPEG encode failed: {e}")))?;
            }
            OutputCodec::Png => {
                let encoder = PngEncoder::new(&mut buf);
                image
                    .write_with_encoder(encoder)
                    .map_err(|e| BackendError::Encode(format!("PNG encode failed: {e}")))?;
            }
        }
        Ok(buf.into_inner())
    }
}
