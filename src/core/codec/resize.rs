//! Shrink-to-fit resizing.
//!
//! Uses fast_image_resize which is 5-14x faster than image crate's resize.
//! Automatically uses AVX2/NEON SIMD when available.

use crate::error::CodecError;
use fast_image_resize::{images::Image, FilterType, PixelType, ResizeAlg, ResizeOptions, Resizer};
use image::{DynamicImage, RgbaImage};

/// Dimensions that fit `(width, height)` inside `(max_width, max_height)`
/// keeping the aspect ratio. Images already inside the box keep their size.
pub fn fit_within(width: u32, height: u32, max_width: u32, max_height: u32) -> (u32, u32) {
    if width <= max_width && height <= max_height {
        return (width, height);
    }

    let scale = f64::min(
        max_width as f64 / width as f64,
        max_height as f64 / height as f64,
    );
    let fitted_width = ((width as f64 * scale).round() as u32).clamp(1, max_width);
    let fitted_height = ((height as f64 * scale).round() as u32).clamp(1, max_height);
    (fitted_width, fitted_height)
}

/// SIMD resizer producing RGBA8 thumbnails
pub struct FastResizer {
    resizer: Resizer,
}

impl FastResizer {
    pub fn new() -> Self {
        Self {
            resizer: Resizer::new(),
        }
    }

    /// Shrink `image` to fit the box, preserving aspect ratio.
    ///
    /// Never upscales. Output is always RGBA8 so the PNG encoder only has
    /// one layout to handle.
    pub fn resize_to_fit(
        &mut self,
        image: &DynamicImage,
        max_width: u32,
        max_height: u32,
    ) -> Result<DynamicImage, CodecError> {
        let src_width = image.width();
        let src_height = image.height();

        if src_width == 0 || src_height == 0 {
            return Err(CodecError::Resize("Invalid source dimensions".to_string()));
        }

        if max_width == 0 || max_height == 0 {
            return Err(CodecError::Resize("Invalid destination dimensions".to_string()));
        }

        let rgba = image.to_rgba8();
        let (width, height) = fit_within(src_width, src_height, max_width, max_height);

        if (width, height) == (src_width, src_height) {
            return Ok(DynamicImage::ImageRgba8(rgba));
        }

        let src_image = Image::from_vec_u8(src_width, src_height, rgba.into_raw(), PixelType::U8x4)
            .map_err(|e| CodecError::Resize(format!("Failed to create source image: {}", e)))?;

        let mut dst_image = Image::new(width, height, PixelType::U8x4);

        let options =
            ResizeOptions::new().resize_alg(ResizeAlg::Convolution(FilterType::Lanczos3));

        self.resizer
            .resize(&src_image, &mut dst_image, &options)
            .map_err(|e| CodecError::Resize(format!("Resize failed: {}", e)))?;

        let buffer = RgbaImage::from_raw(width, height, dst_image.into_vec())
            .ok_or_else(|| CodecError::Resize("Failed to create result buffer".to_string()))?;

        Ok(DynamicImage::ImageRgba8(buffer))
    }
}

impl Default for FastResizer {
    fn default() -> Self {
        Self::new()
    }
}
