//! Image processing, pure Rust.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Decode** | `image::ImageReader` (format sniffed from bytes) |
//! | **Resolve** | [`resolve_dimensions`], no pixels involved |
//! | **Crop + resize** | `crop_imm` + `resize_exact` (Lanczos3) |
//! | **Encode** | `JpegEncoder` at the tier quality, or lossless `PngEncoder` |
//! | **EXIF** | [`crate::metadata`] (`kamadak-exif` + `img-parts`) |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Parameters**: Data structures describing image operations
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: High-level functions combining calculations + backend

pub mod backend;
mod calculations;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, Dimensions, ImageBackend};
pub use calculations::{
    ASPECT_EPSILON, CropRect, TargetDimensions, aspect_ratios_differ, calculate_center_crop,
    resolve_dimensions,
};
pub use operations::{
    SourceImage, TransformPlan, TransformResult, choose_codec, execute, load_source,
    plan_transform, transform,
};
pub use params::{
    CompressionLevel, EncodeParams, JPEG_MIME, OutputCodec, PNG_MIME, Quality, RenderParams,
    TransformRequest,
};
pub use rust_backend::{MAX_CANVAS_PIXELS, RustBackend};
