//! EXIF metadata extraction and re-attachment.
//!
//! Re-encoding through a canvas throws away everything but pixels, so camera
//! metadata has to be carried across by hand:
//!
//! 1. **Extract** at load time. [`extract`] finds the EXIF block in any
//!    container `kamadak-exif` understands (JPEG APP1, PNG `eXIf`, TIFF,
//!    WebP) and keeps its raw TIFF-structured payload as a [`MetadataBlock`].
//!    A source without a parseable block simply has none.
//!
//! 2. **Strip** before re-insertion. [`strip_for_reinsertion`] re-parses the
//!    block and re-serializes it without:
//!    - [`STRIPPED_TAGS`]: orientation and pixel dimensions. The loader has
//!      already turned the pixels upright using [`MetadataBlock::orientation`],
//!      and the output is resized; stale values would make viewers rotate
//!      twice or mis-report the size.
//!    - [`WRITER_MANAGED_TAGS`]: IFD pointers and strip/tile/thumbnail offsets,
//!      which the serializer recomputes.
//!    - the thumbnail IFD and any field whose value type is unknown.
//!
//! 3. **Insert** into the JPEG output. [`reattach`] replaces the output's APP1
//!    segment via `img-parts`.
//!
//! Every failure here is reported as a [`MetadataError`] so the caller can log
//! it and ship the un-annotated output instead.

use exif::experimental::Writer;
use exif::{In, Tag, Value};
use image::DynamicImage;
use img_parts::ImageEXIF;
use img_parts::jpeg::Jpeg;
use std::io::Cursor;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MetadataError {
    #[error("EXIF parse failed: {0}")]
    Parse(#[from] exif::Error),
    #[error("EXIF block has no transferable fields")]
    Empty,
    #[error("EXIF serialize failed: {0}")]
    Serialize(String),
    #[error("EXIF insert failed: {0}")]
    Insert(String),
}

/// Tags removed because the transform invalidates them.
pub const STRIPPED_TAGS: &[Tag] = &[Tag::Orientation, Tag::PixelXDimension, Tag::PixelYDimension];

/// Structural tags the serializer writes itself.
pub const WRITER_MANAGED_TAGS: &[Tag] = &[
    Tag::ExifIFDPointer,
    Tag::GPSInfoIFDPointer,
    Tag::InteropIFDPointer,
    Tag::StripOffsets,
    Tag::StripByteCounts,
    Tag::TileOffsets,
    Tag::TileByteCounts,
    Tag::JPEGInterchangeFormat,
    Tag::JPEGInterchangeFormatLength,
];

/// Raw EXIF payload (TIFF header + IFDs) lifted from a source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataBlock {
    raw: Vec<u8>,
}

impl MetadataBlock {
    pub fn from_raw(raw: Vec<u8>) -> Self {
        Self { raw }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.raw
    }

    /// The primary IFD's orientation tag, if present and valid.
    pub fn orientation(&self) -> Option<Orientation> {
        let exif = exif::Reader::new().read_raw(self.raw.clone()).ok()?;
        let field = exif.get_field(Tag::Orientation, In::PRIMARY)?;
        Orientation::from_exif(field.value.get_uint(0)?)
    }
}

/// EXIF orientation: how stored pixels map onto the upright picture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Normal,
    FlipHorizontal,
    Rotate180,
    FlipVertical,
    Transpose,
    Rotate90,
    Transverse,
    Rotate270,
}

impl Orientation {
    pub fn from_exif(value: u32) -> Option<Self> {
        match value {
            1 => Some(Self::Normal),
            2 => Some(Self::FlipHorizontal),
            3 => Some(Self::Rotate180),
            4 => Some(Self::FlipVertical),
            5 => Some(Self::Transpose),
            6 => Some(Self::Rotate90),
            7 => Some(Self::Transverse),
            8 => Some(Self::Rotate270),
            _ => None,
        }
    }

    /// Rotate/flip stored pixels so they display upright without the tag.
    pub fn apply(self, image: DynamicImage) -> DynamicImage {
        match self {
            Orientation::Normal => image,
            Orientation::FlipHorizontal => image.fliph(),
            Orientation::Rotate180 => image.rotate180(),
            Orientation::FlipVertical => image.flipv(),
            Orientation::Transpose => image.rotate90().fliph(),
            Orientation::Rotate90 => image.rotate90(),
            Orientation::Transverse => image.rotate270().fliph(),
            Orientation::Rotate270 => image.rotate270(),
        }
    }
}

/// Extract the EXIF block from an encoded image, if it has a readable one.
pub fn extract(bytes: &[u8]) -> Option<MetadataBlock> {
    let mut cursor = Cursor::new(bytes);
    match exif::Reader::new().read_from_container(&mut cursor) {
        Ok(exif) => Some(MetadataBlock::from_raw(exif.buf().to_vec())),
        Err(e) => {
            tracing::debug!(error = %e, "no usable EXIF block");
            None
        }
    }
}

/// Whether a tag/IFD pair survives into the output.
fn is_transferable(tag: Tag, ifd: In, value: &Value) -> bool {
    ifd == In::PRIMARY
        && !STRIPPED_TAGS.contains(&tag)
        && !WRITER_MANAGED_TAGS.contains(&tag)
        && !matches!(value, Value::Unknown(..))
}

/// Re-serialize a block without the stripped and structural tags.
///
/// Byte order of the source block is kept.
pub fn strip_for_reinsertion(block: &MetadataBlock) -> Result<Vec<u8>, MetadataError> {
    let exif = exif::Reader::new().read_raw(block.raw.clone())?;

    let kept: Vec<&exif::Field> = exif
        .fields()
        .filter(|f| is_transferable(f.tag, f.ifd_num, &f.value))
        .collect();
    if kept.is_empty() {
        return Err(MetadataError::Empty);
    }

    let mut writer = Writer::new();
    for field in kept {
        writer.push_field(field);
    }
    let mut out = Cursor::new(Vec::new());
    writer
        .write(&mut out, exif.little_endian())
        .map_err(|e| MetadataError::Serialize(e.to_string()))?;
    Ok(out.into_inner())
}

/// Insert a (stripped) metadata block into an encoded JPEG.
pub fn reattach(jpeg: &[u8], block: &MetadataBlock) -> Result<Vec<u8>, MetadataError> {
    let payload = strip_for_reinsertion(block)?;

    let mut image = Jpeg::from_bytes(jpeg.to_vec().into())
        .map_err(|e| MetadataError::Insert(format!("output is not a JPEG: {e}")))?;
    image.set_exif(Some(payload.into()));

    let mut output = Vec::with_capacity(jpeg.len());
    image
        .encoder()
        .write_to(&mut output)
        .map_err(|e| MetadataError::Insert(e.to_string()))?;
    Ok(output)
}
