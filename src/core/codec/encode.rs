//! PNG encoding with freedesktop thumbnail metadata.
//!
//! The `Thumb::*` text chunks let thumbnail consumers check which file an
//! entry belongs to and which version of it was rendered.

use crate::error::CodecError;
use image::DynamicImage;
use serde::{Deserialize, Serialize};
use std::io::Cursor;

/// Keys written into every thumbnail
pub const KEY_URI: &str = "Thumb::URI";
pub const KEY_MTIME: &str = "Thumb::MTime";
pub const KEY_SIZE: &str = "Thumb::Size";
pub const KEY_WIDTH: &str = "Thumb::Image::Width";
pub const KEY_HEIGHT: &str = "Thumb::Image::Height";
pub const KEY_SOFTWARE: &str = "Software";

/// Metadata describing the source of a thumbnail
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThumbnailMetadata {
    /// Canonical location of the source
    pub uri: String,
    /// Source modification time, unix seconds
    pub mtime: u64,
    /// Source size in bytes
    pub size: u64,
    /// Original image width
    pub width: u32,
    /// Original image height
    pub height: u32,
}

impl ThumbnailMetadata {
    fn chunks(&self) -> Vec<(&'static str, String)> {
        vec![
            (KEY_URI, self.uri.clone()),
            (KEY_MTIME, self.mtime.to_string()),
            (KEY_SIZE, self.size.to_string()),
            (KEY_WIDTH, self.width.to_string()),
            (KEY_HEIGHT, self.height.to_string()),
            (
                KEY_SOFTWARE,
                format!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
            ),
        ]
    }
}

/// Encode `image` as an 8-bit RGBA PNG carrying `metadata`
pub fn encode_png(image: &DynamicImage, metadata: &ThumbnailMetadata) -> Result<Vec<u8>, CodecError> {
    let rgba = image.to_rgba8();
    let mut out = Cursor::new(Vec::new());

    {
        let mut encoder = png::Encoder::new(&mut out, rgba.width(), rgba.height());
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);

        for (key, value) in metadata.chunks() {
            // tEXt is Latin-1 only
            let added = if value.is_ascii() {
                encoder.add_text_chunk(key.to_string(), value)
            } else {
                encoder.add_itxt_chunk(key.to_string(), value)
            };
            added.map_err(|e| CodecError::Encode(format!("{} chunk: {}", key, e)))?;
        }

        let mut writer = encoder
            .write_header()
            .map_err(|e| CodecError::Encode(e.to_string()))?;
        writer
            .write_image_data(rgba.as_raw())
            .map_err(|e| CodecError::Encode(e.to_string()))?;
        writer
            .finish()
            .map_err(|e| CodecError::Encode(e.to_string()))?;
    }

    Ok(out.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgba};

    fn metadata(uri: &str) -> ThumbnailMetadata {
        ThumbnailMetadata {
            uri: uri.to_string(),
            mtime: 1_700_000_000,
            size: 4096,
            width: 640,
            height: 480,
        }
    }

    fn sample() -> DynamicImage {
        DynamicImage::ImageRgba8(ImageBuffer::from_fn(8, 6, |x, y| {
            Rgba([(x * 30) as u8, (y * 40) as u8, 10, 255])
        }))
    }

    fn text_chunks(bytes: &[u8]) -> Vec<(String, String)> {
        let mut decoder = png::Decoder::new(Cursor::new(bytes));
        decoder.set_ignore_text_chunk(false);
        let reader = decoder.read_info().unwrap();
        let info = reader.info();
        let mut chunks: Vec<(String, String)> = info
            .uncompressed_latin1_text
            .iter()
            .map(|c| (c.keyword.clone(), c.text.clone()))
            .collect();
        for chunk in &info.utf8_text {
            chunks.push((chunk.keyword.clone(), chunk.get_text().unwrap()));
        }
        chunks
    }

    #[test]
    fn output_is_a_decodable_png() {
        let bytes = encode_png(&sample(), &metadata("file:///photos/a.jpg")).unwrap();

        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (8, 6));
    }

    #[test]
    fn thumb_chunks_are_written() {
        let bytes = encode_png(&sample(), &metadata("file:///photos/a.jpg")).unwrap();
        let chunks = text_chunks(&bytes);

        assert!(chunks.contains(&(KEY_URI.to_string(), "file:///photos/a.jpg".to_string())));
        assert!(chunks.contains(&(KEY_MTIME.to_string(), "1700000000".to_string())));
        assert!(chunks.contains(&(KEY_WIDTH.to_string(), "640".to_string())));
    }

    #[test]
    fn non_ascii_uri_uses_international_chunk() {
        let bytes = encode_png(&sample(), &metadata("file:///photos/été.jpg")).unwrap();
        let chunks = text_chunks(&bytes);

        assert!(chunks.contains(&(KEY_URI.to_string(), "file:///photos/été.jpg".to_string())));
    }

    #[test]
    fn encoding_is_deterministic() {
        let a = encode_png(&sample(), &metadata("file:///a.png")).unwrap();
        let b = encode_png(&sample(), &metadata("file:///a.png")).unwrap();
        assert_eq!(a, b);
    }
}
