//! # Codec Module
//!
//! Decodes source images, shrinks them to a bounding box and encodes the
//! result as PNG.
//!
//! ## Contract
//! - `decode` - bytes to image, failing on corrupt or unsupported data
//! - `resize_to_fit` - aspect-preserving, shrink only, smooth filter
//! - `encode_png` - 8-bit RGBA PNG with `Thumb::*` metadata
//!
//! ## Performance Optimizations
//! - Uses `zune-jpeg` for 1.5-2x faster JPEG decoding
//! - Uses `fast_image_resize` for SIMD-accelerated Lanczos3 resizing
//! - Memory-maps sources of 1MB and more

mod decode;
mod encode;
mod resize;
mod source;

pub use decode::FastDecoder;
pub use encode::{encode_png, ThumbnailMetadata};
pub use resize::{fit_within, FastResizer};
pub use source::{read_file_bytes, FileBytes};

use crate::error::CodecError;
use image::DynamicImage;

/// Image codec collaborator used by the thumbnail writer.
///
/// Implement this trait to plug in another image stack (e.g. for testing).
pub trait ImageCodec: Send + Sync {
    /// Decode an encoded image
    fn decode(&self, bytes: &[u8]) -> Result<DynamicImage, CodecError>;

    /// Shrink to fit within `max_width` x `max_height`, never upscaling
    fn resize_to_fit(
        &self,
        image: &DynamicImage,
        max_width: u32,
        max_height: u32,
    ) -> Result<DynamicImage, CodecError>;

    /// Encode as PNG carrying `metadata`
    fn encode_png(
        &self,
        image: &DynamicImage,
        metadata: &ThumbnailMetadata,
    ) -> Result<Vec<u8>, CodecError>;
}

/// Codec built on zune-jpeg, image, fast_image_resize and png
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultCodec;

impl ImageCodec for DefaultCodec {
    fn decode(&self, bytes: &[u8]) -> Result<DynamicImage, CodecError> {
        FastDecoder::decode(bytes)
    }

    fn resize_to_fit(
        &self,
        image: &DynamicImage,
        max_width: u32,
        max_height: u32,
    ) -> Result<DynamicImage, CodecError> {
        // Resizer scratch buffers are per call so the codec stays Sync
        FastResizer::new().resize_to_fit(image, max_width, max_height)
    }

    fn encode_png(
        &self,
        image: &DynamicImage,
        metadata: &ThumbnailMetadata,
    ) -> Result<Vec<u8>, CodecError> {
        encode_png(image, metadata)
    }
}
