//! High-level image operations.
//!
//! These functions combine calculations with backend execution: load a
//! source once, decide what the output should be, then render, encode and
//! (for JPEG output) carry the EXIF block across.

use super::backend::{BackendError, Dimensions, ImageBackend};
use super::calculations::{TargetDimensions, resolve_dimensions};
use super::params::{EncodeParams, OutputCodec, PNG_MIME, RenderParams, TransformRequest};
use crate::metadata::{self, MetadataBlock};
use image::DynamicImage;

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, BackendError>;

/// An input decoded once and kept for the duration of its transform.
#[derive(Debug)]
pub struct SourceImage {
    pub bytes: Vec<u8>,
    /// Mime type the input was declared as (not sniffed).
    pub declared_mime: String,
    pub dimensions: Dimensions,
    pub metadata: Option<MetadataBlock>,
    pub pixels: DynamicImage,
}

/// Decode an input, lift its EXIF block and turn the pixels upright.
///
/// `dimensions` are those of the upright picture, so sizing and cropping
/// decisions match what a viewer shows.
pub fn load_source(
    backend: &impl ImageBackend,
    bytes: Vec<u8>,
    declared_mime: &str,
) -> Result<SourceImage> {
    let mut pixels = backend.decode(&bytes)?;
    let metadata = metadata::extract(&bytes);
    if let Some(orientation) = metadata.as_ref().and_then(MetadataBlock::orientation) {
        tracing::debug!(?orientation, "applying EXIF orientation");
        pixels = orientation.apply(pixels);
    }
    Ok(SourceImage {
        dimensions: Dimensions::of(&pixels),
        declared_mime: declared_mime.to_string(),
        metadata,
        bytes,
        pixels,
    })
}

/// Everything decided about an output before any pixel work happens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransformPlan {
    pub target: TargetDimensions,
    pub render: RenderParams,
    pub encode: EncodeParams,
}

/// Pick the output codec.
///
/// PNG survives only for a `low` tier request that changes nothing
/// geometrically; everything else becomes JPEG.
pub fn choose_codec(
    declared_mime: &str,
    request: &TransformRequest,
    target: &TargetDimensions,
) -> OutputCodec {
    let untouched = !target.crop && request.scale == 100 && !request.has_explicit_input();
    if declared_mime == PNG_MIME
        && request.level == super::params::CompressionLevel::Low
        && untouched
    {
        OutputCodec::Png
    } else {
        OutputCodec::Jpeg
    }
}

/// Plan a transform without executing it.
pub fn plan_transform(
    source: Dimensions,
    declared_mime: &str,
    request: &TransformRequest,
) -> TransformPlan {
    let target = resolve_dimensions(source.as_tuple(), request);
    TransformPlan {
        target,
        render: RenderParams {
            width: target.width,
            height: target.height,
            crop: target.crop,
        },
        encode: EncodeParams {
            codec: choose_codec(declared_mime, request, &target),
            quality: request.level.quality(),
        },
    }
}

/// Encoded output of one transform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformResult {
    pub bytes: Vec<u8>,
    pub mime: &'static str,
    pub dimensions: Dimensions,
    /// `Some` only when the output is JPEG and the source had an EXIF block.
    pub exif_preserved: Option<bool>,
}

impl TransformResult {
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// Render, encode and annotate a planned transform.
///
/// Metadata failures are logged and leave the output un-annotated; only pixel
/// failures are errors.
pub fn execute(
    backend: &impl ImageBackend,
    source: &SourceImage,
    plan: &TransformPlan,
    preserve_metadata: bool,
) -> Result<TransformResult> {
    let rendered = backend.render(&source.pixels, &plan.render)?;
    let encoded = backend.encode(&rendered, &plan.encode)?;
    let dimensions = Dimensions::of(&rendered);
    drop(rendered);

    let codec = plan.encode.codec;
    let (bytes, exif_preserved) = match (&source.metadata, codec) {
        (Some(block), OutputCodec::Jpeg) if preserve_metadata => {
            match metadata::reattach(&encoded, block) {
                Ok(annotated) => (annotated, Some(true)),
                Err(e) => {
                    tracing::warn!(error = %e, "EXIF not preserved");
                    (encoded, Some(false))
                }
            }
        }
        (Some(_), OutputCodec::Jpeg) => (encoded, Some(false)),
        _ => (encoded, None),
    };

    Ok(TransformResult {
        bytes,
        mime: codec.mime(),
        dimensions,
        exif_preserved,
    })
}

/// Plan and execute in one step.
pub fn transform(
    backend: &impl ImageBackend,
    source: &SourceImage,
    request: &TransformRequest,
    preserve_metadata: bool,
) -> Result<TransformResult> {
    let plan = plan_transform(source.dimensions, &source.declared_mime, request);
    execute(backend, source, &plan, preserve_metadata)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::RustBackend;
    use crate::imaging::backend::tests::{MockBackend, RecordedOp};
    use crate::imaging::params::{CompressionLevel, JPEG_MIME};
    use crate::test_helpers::{
        jpeg_bytes, jpeg_with_exif, jpeg_with_orientation, png_bytes, three_band_image,
    };
    use image::GenericImageView;

    fn dims(width: u32, height: u32) -> Dimensions {
        Dimensions { width, height }
    }

    fn request(level: CompressionLevel) -> TransformRequest {
        TransformRequest {
            level,
            ..Default::default()
        }
    }

    // =========================================================================
    // Codec decision
    // =========================================================================

    #[test]
    fn png_low_untouched_stays_png() {
        let plan = plan_transform(dims(100, 100), PNG_MIME, &request(CompressionLevel::Low));
        assert_eq!(plan.encode.codec, OutputCodec::Png);
    }

    #[test]
    fn png_medium_becomes_jpeg() {
        let plan = plan_transform(dims(100, 100), PNG_MIME, &request(CompressionLevel::Medium));
        assert_eq!(plan.encode.codec, OutputCodec::Jpeg);
        assert_eq!(plan.encode.quality.value(), 70);
    }

    #[test]
    fn png_low_scaled_becomes_jpeg() {
        let req = TransformRequest {
            scale: 99,
            ..request(CompressionLevel::Low)
        };
        let plan = plan_transform(dims(100, 100), PNG_MIME, &req);
        assert_eq!(plan.encode.codec, OutputCodec::Jpeg);
    }

    #[test]
    fn png_low_with_any_explicit_input_becomes_jpeg() {
        // Same-size explicit dimensions: no crop, no scale, still a geometry request
        let req = TransformRequest {
            width: Some(100),
            height: Some(100),
            ..request(CompressionLevel::Low)
        };
        let plan = plan_transform(dims(100, 100), PNG_MIME, &req);
        assert!(!plan.target.crop);
        assert_eq!(plan.encode.codec, OutputCodec::Jpeg);

        let half = TransformRequest {
            width: Some(100),
            ..request(CompressionLevel::Low)
        };
        let plan = plan_transform(dims(100, 100), PNG_MIME, &half);
        assert_eq!(plan.encode.codec, OutputCodec::Jpeg);
    }

    #[test]
    fn other_sources_always_jpeg() {
        for mime in [JPEG_MIME, "image/webp", "image/gif"] {
            let plan = plan_transform(dims(10, 10), mime, &request(CompressionLevel::Low));
            assert_eq!(plan.encode.codec, OutputCodec::Jpeg, "{mime}");
        }
    }

    #[test]
    fn crop_plan_carries_into_render_params() {
        let req = TransformRequest {
            width: Some(800),
            height: Some(800),
            ..Default::default()
        };
        let plan = plan_transform(dims(1920, 1080), JPEG_MIME, &req);
        assert_eq!(
            plan.render,
            RenderParams {
                width: 800,
                height: 800,
                crop: true
            }
        );
    }

    // =========================================================================
    // Execution with mock backend
    // =========================================================================

    #[test]
    fn transform_runs_render_then_encode() {
        let backend = MockBackend::with_decodes(vec![Some(dims(400, 200))]);
        let source = load_source(&backend, vec![1, 2, 3], JPEG_MIME).unwrap();
        let req = TransformRequest {
            scale: 50,
            ..request(CompressionLevel::High)
        };

        let result = transform(&backend, &source, &req, true).unwrap();

        assert_eq!(result.mime, JPEG_MIME);
        assert_eq!(result.dimensions, dims(200, 100));
        assert_eq!(result.exif_preserved, None);
        assert_eq!(
            backend.get_operations(),
            vec![
                RecordedOp::Decode(3),
                RecordedOp::Render {
                    width: 200,
                    height: 100,
                    crop: false
                },
                RecordedOp::Encode {
                    codec: OutputCodec::Jpeg,
                    quality: 50
                },
            ]
        );
    }

    #[test]
    fn load_failure_is_decode_error() {
        let backend = MockBackend::with_decodes(vec![None]);
        let result = load_source(&backend, vec![0; 8], JPEG_MIME);
        assert!(matches!(result, Err(BackendError::Decode(_))));
    }

    #[test]
    fn unparseable_output_reports_exif_not_preserved() {
        // Mock output is not a JPEG, so re-attachment fails non-fatally
        let backend = MockBackend::with_decodes(vec![Some(dims(32, 24))]);
        let source = load_source(&backend, jpeg_with_exif(32, 24), JPEG_MIME).unwrap();
        assert!(source.metadata.is_some());

        let result = transform(&backend, &source, &TransformRequest::default(), true).unwrap();
        assert_eq!(result.exif_preserved, Some(false));
    }

    /// Single-threaded backend: counts decodes in a `Cell`, so it is not `Sync`.
    struct CountingBackend {
        decodes: std::cell::Cell<usize>,
    }

    impl ImageBackend for CountingBackend {
        fn decode(&self, bytes: &[u8]) -> Result<DynamicImage> {
            self.decodes.set(self.decodes.get() + 1);
            RustBackend::new().decode(bytes)
        }

        fn render(&self, image: &DynamicImage, params: &RenderParams) -> Result<DynamicImage> {
            RustBackend::new().render(image, params)
        }

        fn encode(&self, image: &DynamicImage, params: &EncodeParams) -> Result<Vec<u8>> {
            RustBackend::new().encode(image, params)
        }
    }

    #[test]
    fn backends_need_not_be_shareable_across_threads() {
        let backend = CountingBackend {
            decodes: std::cell::Cell::new(0),
        };
        let source = load_source(&backend, jpeg_bytes(20, 10), JPEG_MIME).unwrap();
        let result = transform(&backend, &source, &TransformRequest::default(), true).unwrap();
        assert_eq!(result.dimensions, dims(20, 10));
        assert_eq!(backend.decodes.get(), 1);
    }

    // =========================================================================
    // Execution with the real backend
    // =========================================================================

    #[test]
    fn exif_survives_jpeg_transform() {
        let backend = RustBackend::new();
        let source = load_source(&backend, jpeg_with_exif(64, 48), JPEG_MIME).unwrap();

        let result = transform(&backend, &source, &TransformRequest::default(), true).unwrap();

        assert_eq!(result.exif_preserved, Some(true));
        let reread = crate::metadata::extract(&result.bytes).expect("exif in output");
        assert!(!reread.as_bytes().is_empty());
    }

    #[test]
    fn exif_disabled_reports_false() {
        let backend = RustBackend::new();
        let source = load_source(&backend, jpeg_with_exif(64, 48), JPEG_MIME).unwrap();

        let result = transform(&backend, &source, &TransformRequest::default(), false).unwrap();

        assert_eq!(result.exif_preserved, Some(false));
        assert!(crate::metadata::extract(&result.bytes).is_none());
    }

    #[test]
    fn source_without_exif_never_claims_preservation() {
        let backend = RustBackend::new();
        for level in [CompressionLevel::Low, CompressionLevel::Medium, CompressionLevel::High] {
            let source = load_source(&backend, jpeg_bytes(40, 40), JPEG_MIME).unwrap();
            let result = transform(&backend, &source, &request(level), true).unwrap();
            assert_ne!(result.exif_preserved, Some(true));
        }
    }

    #[test]
    fn rotated_sources_come_out_upright() {
        // Stored landscape, displayed portrait for both quarter turns
        let backend = RustBackend::new();
        for orientation in [6, 8] {
            let bytes = jpeg_with_orientation(&three_band_image(64, 32), orientation);
            let source = load_source(&backend, bytes, JPEG_MIME).unwrap();
            assert_eq!(source.dimensions, dims(32, 64), "orientation {orientation}");

            let result =
                transform(&backend, &source, &TransformRequest::default(), true).unwrap();

            assert_eq!(result.dimensions, dims(32, 64), "orientation {orientation}");
            let decoded = image::load_from_memory(&result.bytes).unwrap();
            assert_eq!(decoded.dimensions(), (32, 64));
            let exif = exif::Reader::new()
                .read_from_container(&mut std::io::Cursor::new(&result.bytes))
                .unwrap();
            assert!(exif.get_field(exif::Tag::Orientation, exif::In::PRIMARY).is_none());
        }
    }

    #[test]
    fn explicit_crop_works_in_upright_space() {
        // Stored as red | green | blue columns; upright the bands run top to
        // bottom, so a 1:1 crop keeps the middle rows and stays green.
        let backend = RustBackend::new();
        for orientation in [6, 8] {
            let bytes = jpeg_with_orientation(&three_band_image(1200, 400), orientation);
            let source = load_source(&backend, bytes, JPEG_MIME).unwrap();
            let req = TransformRequest {
                width: Some(200),
                height: Some(200),
                ..Default::default()
            };

            let plan = plan_transform(source.dimensions, JPEG_MIME, &req);
            assert!(plan.target.crop);
            let result = execute(&backend, &source, &plan, true).unwrap();

            let img = image::load_from_memory(&result.bytes).unwrap();
            assert_eq!(img.dimensions(), (200, 200));
            for (x, y) in [(5, 5), (100, 100), (194, 194)] {
                let px = img.get_pixel(x, y);
                assert!(
                    px[1] > 180 && px[0] < 80 && px[2] < 80,
                    "orientation {orientation} ({x},{y}) = {px:?}"
                );
            }
        }
    }

    #[test]
    fn png_passthrough_roundtrip() {
        let backend = RustBackend::new();
        let source = load_source(&backend, png_bytes(37, 21), PNG_MIME).unwrap();

        let result =
            transform(&backend, &source, &request(CompressionLevel::Low), true).unwrap();

        assert_eq!(result.mime, PNG_MIME);
        let decoded = backend.decode(&result.bytes).unwrap();
        assert_eq!(Dimensions::of(&decoded), dims(37, 21));
        assert_eq!(
            image::guess_format(&result.bytes).unwrap(),
            image::ImageFormat::Png
        );
    }
}
