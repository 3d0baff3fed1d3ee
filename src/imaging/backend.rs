//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the three pixel operations every backend
//! must support: decode, render (crop + resize), and encode.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), built on the `image`
//! crate. Tests use a recording mock so pipeline decisions can be checked
//! without touching real pixels.

use super::params::{EncodeParams, RenderParams};
use image::DynamicImage;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Could not decode image: {0}")]
    Decode(String),
    #[error("Could not render image: {0}")]
    Render(String),
    #[error("Could not encode image: {0}")]
    Encode(String),
}

/// Pixel dimensions of an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn of(image: &DynamicImage) -> Self {
        Self {
            width: image.width(),
            height: image.height(),
        }
    }

    pub fn as_tuple(self) -> (u32, u32) {
        (self.width, self.height)
    }
}

/// Trait for image processing backends.
///
/// Implementations work on in-memory buffers only; reading files and deciding
/// *what* to produce happen elsewhere.
pub trait ImageBackend {
    /// Rasterize an encoded image. The format is sniffed from the bytes.
    fn decode(&self, bytes: &[u8]) -> Result<DynamicImage, BackendError>;

    /// Produce a pixel buffer of exactly `params.width` x `params.height`.
    fn render(&self, image: &DynamicImage, params: &RenderParams)
    -> Result<DynamicImage, BackendError>;

    /// Encode pixels with the requested codec.
    fn encode(&self, image: &DynamicImage, params: &EncodeParams) -> Result<Vec<u8>, BackendError>;
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use crate::imaging::params::{OutputCodec, Quality};
    use std::sync::Mutex;

    /// Mock backend that records operations without doing pixel work.
    ///
    /// `decode` pops the next queued result; `None` entries simulate files
    /// that cannot be rasterized. Queue entries in processing order.
    #[derive(Default)]
    pub struct MockBackend {
        pub decode_results: Mutex<Vec<Option<Dimensions>>>,
        pub operations: Mutex<Vec<RecordedOp>>,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub enum RecordedOp {
        Decode(usize),
        Render {
            width: u32,
            height: u32,
            crop: bool,
        },
        Encode {
            codec: OutputCodec,
            quality: u8,
        },
    }

    impl MockBackend {
        pub fn new() -> Self {
            Self::default()
        }

        /// Queue decode results, first entry served first.
        pub fn with_decodes(results: Vec<Option<Dimensions>>) -> Self {
            let mut queued = results;
            queued.reverse();
            Self {
                decode_results: Mutex::new(queued),
                operations: Mutex::new(Vec::new()),
            }
        }

        pub fn get_operations(&self) -> Vec<RecordedOp> {
            self.operations.lock().unwrap().clone()
        }
    }

    impl ImageBackend for MockBackend {
        fn decode(&self, bytes: &[u8]) -> Result<DynamicImage, BackendError> {
            self.operations
                .lock()
                .unwrap()
                .push(RecordedOp::Decode(bytes.len()));

            match self.decode_results.lock().unwrap().pop() {
                Some(Some(dims)) => Ok(DynamicImage::new_rgb8(dims.width, dims.height)),
                Some(None) => Err(BackendError::Decode("mock: unreadable image".into())),
                None => Err(BackendError::Decode("mock: no queued result".into())),
            }
        }

        fn render(
            &self,
            _image: &DynamicImage,
            params: &RenderParams,
        ) -> Result<DynamicImage, BackendError> {
            self.operations.lock().unwrap().push(RecordedOp::Render {
                width: params.width,
                height: params.height,
                crop: params.crop,
            });
            Ok(DynamicImage::new_rgb8(params.width, params.height))
        }

        fn encode(
            &self,
            image: &DynamicImage,
            params: &EncodeParams,
        ) -> Result<Vec<u8>, BackendError> {
            self.operations.lock().unwrap().push(RecordedOp::Encode {
                codec: params.codec,
                quality: params.quality.value(),
            });
            // One byte per pixel row keeps sizes predictable in assertions
            Ok(vec![0u8; image.height() as usize])
        }
    }

    #[test]
    fn mock_serves_decodes_in_order() {
        let backend = MockBackend::with_decodes(vec![
            Some(Dimensions {
                width: 800,
                height: 600,
            }),
            None,
        ]);

        let first = backend.decode(b"abc").unwrap();
        assert_eq!(Dimensions::of(&first).as_tuple(), (800, 600));
        assert!(matches!(
            backend.decode(b"xyz"),
            Err(BackendError::Decode(_))
        ));

        let ops = backend.get_operations();
        assert_eq!(ops, vec![RecordedOp::Decode(3), RecordedOp::Decode(3)]);
    }

    #[test]
    fn mock_records_render_and_encode() {
        let backend = MockBackend::new();
        let source = DynamicImage::new_rgb8(10, 10);

        let rendered = backend
            .render(
                &source,
                &RenderParams {
                    width: 4,
                    height: 2,
                    crop: true,
                },
            )
            .unwrap();
        let bytes = backend
            .encode(
                &rendered,
                &EncodeParams {
                    codec: OutputCodec::Jpeg,
                    quality: Quality::new(50),
                },
            )
            .unwrap();

        assert_eq!(bytes.len(), 2);
        assert_eq!(
            backend.get_operations(),
            vec![
                RecordedOp::Render {
                    width: 4,
                    height: 2,
                    crop: true
                },
                RecordedOp::Encode {
                    codec: OutputCodec::Jpeg,
                    quality: 50
                },
            ]
        );
    }
}
