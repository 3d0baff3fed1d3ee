//! Pure calculation functions for image dimensions.
//!
//! All functions here are pure and testable without any I/O or images.

use super::params::TransformRequest;

/// Aspect ratios closer than this are treated as equal (no crop).
pub const ASPECT_EPSILON: f64 = 0.001;

/// Output of the dimension resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetDimensions {
    pub width: u32,
    pub height: u32,
    /// The renderer must center-crop rather than stretch.
    pub crop: bool,
}

/// A source sub-rectangle in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

fn aspect(dims: (u32, u32)) -> f64 {
    dims.0 as f64 / dims.1.max(1) as f64
}

/// Whether two sizes differ in aspect ratio by more than [`ASPECT_EPSILON`].
pub fn aspect_ratios_differ(a: (u32, u32), b: (u32, u32)) -> bool {
    (aspect(a) - aspect(b)).abs() > ASPECT_EPSILON
}

/// Resolve the target size for a source image.
///
/// Explicit width+height win over the scale percentage. A crop is flagged only
/// for explicit dimensions whose ratio differs from the source. Both outputs
/// are clamped to at least 1px.
///
/// # Examples
/// ```
/// # use midia_resolve::imaging::{TransformRequest, resolve_dimensions};
/// let req = TransformRequest { scale: 50, ..Default::default() };
/// let t = resolve_dimensions((1920, 1080), &req);
/// assert_eq!((t.width, t.height, t.crop), (960, 540, false));
/// ```
pub fn resolve_dimensions(source: (u32, u32), request: &TransformRequest) -> TargetDimensions {
    let (src_w, src_h) = source;

    let (width, height, crop) = if let Some(explicit) = request.explicit_dimensions() {
        (explicit.0, explicit.1, aspect_ratios_differ(source, explicit))
    } else if request.scale != 100 {
        let factor = request.scale as f64 / 100.0;
        (
            (src_w as f64 * factor).round() as u32,
            (src_h as f64 * factor).round() as u32,
            false,
        )
    } else {
        (src_w, src_h, false)
    };

    TargetDimensions {
        width: width.max(1),
        height: height.max(1),
        crop,
    }
}

/// Centered source rectangle with the target's aspect ratio.
///
/// The wider dimension is shrunk; content is discarded symmetrically from both
/// edges. When the ratios already match the full source is returned.
pub fn calculate_center_crop(source: (u32, u32), target: (u32, u32)) -> CropRect {
    let (src_w, src_h) = source;
    let src_aspect = aspect(source);
    let tgt_aspect = aspect(target);

    if src_aspect > tgt_aspect {
        // Source is wider: keep full height, trim left and right
        let w = ((src_h as f64 * tgt_aspect).round() as u32).clamp(1, src_w);
        CropRect {
            x: (src_w - w) / 2,
            y: 0,
            width: w,
            height: src_h,
        }
    } else if src_aspect < tgt_aspect {
        // Source is taller: keep full width, trim top and bottom
        let h = ((src_w as f64 / tgt_aspect).round() as u32).clamp(1, src_h);
        CropRect {
            x: 0,
            y: (src_h - h) / 2,
            width: src_w,
            height: h,
        }
    } else {
        CropRect {
            x: 0,
            y: 0,
            width: src_w,
            height: src_h,
        }
    }
}
