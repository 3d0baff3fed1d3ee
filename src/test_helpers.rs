//! Shared test fixtures for the midia-resolve test suite.
//!
//! Everything is synthesized in memory: encoded JPEG/PNG buffers, a
//! three-band image for crop assertions, and an EXIF block carrying both tags
//! that must survive re-attachment and tags that must be stripped.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let source = jpeg_with_exif(64, 48);
//! let block = crate::metadata::extract(&source).unwrap();
//! ```

use crate::metadata::MetadataBlock;
use exif::experimental::Writer;
use exif::{Field, In, Rational, Tag, Value};
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageEncoder, ImageFormat, Rgb, RgbImage};
use img_parts::ImageEXIF;
use img_parts::jpeg::Jpeg;
use std::io::Cursor;
use std::path::{Path, PathBuf};

// =========================================================================
// Pixel fixtures
// =========================================================================

fn gradient(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    })
}

/// Red | green | blue vertical bands with a centered square green band.
///
/// For a landscape `w x h` image the green band spans exactly the columns a
/// 1:1 center crop keeps, so any red or blue in a cropped output is a bug.
pub fn three_band_image(width: u32, height: u32) -> DynamicImage {
    let left = width.saturating_sub(height) / 2;
    let right = left + height.min(width);
    DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, _| {
        if x < left {
            Rgb([255, 0, 0])
        } else if x >= right {
            Rgb([0, 0, 255])
        } else {
            Rgb([0, 255, 0])
        }
    }))
}

// =========================================================================
// Encoded fixtures
// =========================================================================

/// A baseline JPEG without any APP1 segment.
pub fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = gradient(width, height);
    let mut buf = Vec::new();
    JpegEncoder::new_with_quality(&mut buf, 95)
        .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgb8)
        .unwrap();
    buf
}

/// A PNG with an alpha channel.
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = DynamicImage::ImageRgb8(gradient(width, height)).to_rgba8();
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Png).unwrap();
    buf.into_inner()
}

/// EXIF block with Make + FNumber (kept) and Orientation + pixel dimensions (stripped).
pub fn exif_block() -> MetadataBlock {
    let fields = [
        Field {
            tag: Tag::Make,
            ifd_num: In::PRIMARY,
            value: Value::Ascii(vec![b"Midia Test Cam".to_vec()]),
        },
        Field {
            tag: Tag::Orientation,
            ifd_num: In::PRIMARY,
            value: Value::Short(vec![6]),
        },
        Field {
            tag: Tag::FNumber,
            ifd_num: In::PRIMARY,
            value: Value::Rational(vec![Rational { num: 28, denom: 10 }]),
        },
        Field {
            tag: Tag::PixelXDimension,
            ifd_num: In::PRIMARY,
            value: Value::Long(vec![4000]),
        },
        Field {
            tag: Tag::PixelYDimension,
            ifd_num: In::PRIMARY,
            value: Value::Long(vec![3000]),
        },
    ];
    let mut writer = Writer::new();
    for field in &fields {
        writer.push_field(field);
    }
    let mut buf = Cursor::new(Vec::new());
    writer.write(&mut buf, false).unwrap();
    MetadataBlock::from_raw(buf.into_inner())
}

/// A JPEG carrying the unmodified [`exif_block`].
pub fn jpeg_with_exif(width: u32, height: u32) -> Vec<u8> {
    let mut jpeg = Jpeg::from_bytes(jpeg_bytes(width, height).into()).unwrap();
    jpeg.set_exif(Some(exif_block().as_bytes().to_vec().into()));
    let mut out = Vec::new();
    jpeg.encoder().write_to(&mut out).unwrap();
    out
}

/// A JPEG of `img` whose EXIF carries only Make and the given orientation.
pub fn jpeg_with_orientation(img: &DynamicImage, orientation: u16) -> Vec<u8> {
    let fields = [
        Field {
            tag: Tag::Make,
            ifd_num: In::PRIMARY,
            value: Value::Ascii(vec![b"Midia Test Cam".to_vec()]),
        },
        Field {
            tag: Tag::Orientation,
            ifd_num: In::PRIMARY,
            value: Value::Short(vec![orientation]),
        },
    ];
    let mut writer = Writer::new();
    for field in &fields {
        writer.push_field(field);
    }
    let mut block = Cursor::new(Vec::new());
    writer.write(&mut block, false).unwrap();

    let mut plain = Cursor::new(Vec::new());
    img.write_to(&mut plain, ImageFormat::Jpeg).unwrap();
    let mut jpeg = Jpeg::from_bytes(plain.into_inner().into()).unwrap();
    jpeg.set_exif(Some(block.into_inner().into()));
    let mut out = Vec::new();
    jpeg.encoder().write_to(&mut out).unwrap();
    out
}

// =========================================================================
// Filesystem fixtures
// =========================================================================

/// Write `bytes` to `dir/name`, returning the full path.
pub fn write_file(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, bytes).unwrap();
    path
}
