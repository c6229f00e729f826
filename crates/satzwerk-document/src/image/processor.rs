// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image processor — decode, fill, fit and encode the raster pieces of a book
// (illustrations, cover art, barcodes). Operates on in-memory images using
// the `image` crate.

use image::{DynamicImage, ImageFormat, RgbaImage};
use image::imageops::FilterType;
use satzwerk_core::error::SatzwerkError;
use tracing::{debug, instrument};

/// Image processing pipeline operating on a single in-memory image.
///
/// Each transformation consumes `self` and returns a new `ImageProcessor`,
/// enabling method chaining.
///
/// ```ignore
/// let panel = ImageProcessor::from_bytes(&bytes)?
///     .fill(1860, 2730)
///     .into_rgba();
/// ```
pub struct ImageProcessor {
    image: DynamicImage,
}

impl ImageProcessor {
    // -- Construction ---------------------------------------------------------

    /// Create a processor from raw encoded bytes (JPEG, PNG, etc.).
    #[instrument(skip(data), fields(data_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self, SatzwerkError> {
        let img = image::load_from_memory(data)
            .map_err(|err| SatzwerkError::ImageError(format!("failed to decode image: {}", err)))?;
        debug!(
            width = img.width(),
            height = img.height(),
            "Image decoded from bytes"
        );
        Ok(Self { image: img })
    }

    /// Wrap an already decoded RGBA buffer.
    pub fn from_rgba(image: RgbaImage) -> Self {
        Self {
            image: DynamicImage::ImageRgba8(image),
        }
    }

    // -- Accessors ------------------------------------------------------------

    /// Current image width in pixels.
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Current image height in pixels.
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Consume the processor and return the image as 8-bit RGBA.
    pub fn into_rgba(self) -> RgbaImage {
        self.image.into_rgba8()
    }

    // -- Transformations ------------------------------------------------------

    /// Scale to cover exactly `width` x `height`, cropping the overflow
    /// centrally. Used for cover art, which must reach every bleed edge.
    #[instrument(skip(self))]
    pub fn fill(self, width: u32, height: u32) -> Self {
        debug!(
            from_w = self.image.width(),
            from_h = self.image.height(),
            "Filling target"
        );
        Self {
            image: self
                .image
                .resize_to_fill(width.max(1), height.max(1), FilterType::Lanczos3),
        }
    }

    /// Scale to fit within `max_width` x `max_height`, preserving aspect
    /// ratio. Never crops.
    #[instrument(skip(self))]
    pub fn fit(self, max_width: u32, max_height: u32) -> Self {
        let resized = self
            .image
            .resize(max_width.max(1), max_height.max(1), FilterType::Lanczos3);
        debug!(
            new_w = resized.width(),
            new_h = resized.height(),
            "Fit complete"
        );
        Self { image: resized }
    }

}

/// Encode an RGBA buffer as PNG.
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, SatzwerkError> {
    let mut buffer = Vec::new();
    let mut cursor = std::io::Cursor::new(&mut buffer);
    image
        .write_to(&mut cursor, ImageFormat::Png)
        .map_err(|err| SatzwerkError::ImageError(format!("image encoding failed: {}", err)))?;
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, y| {
            image::Rgba([(x * 255 / width.max(1)) as u8, (y * 255 / height.max(1)) as u8, 90, 255])
        })
    }

    #[test]
    fn fill_produces_exact_size() {
        let filled = ImageProcessor::from_rgba(gradient(40, 10)).fill(30, 30);
        assert_eq!((filled.width(), filled.height()), (30, 30));
    }

    #[test]
    fn fit_preserves_aspect() {
        let fitted = ImageProcessor::from_rgba(gradient(40, 10)).fit(20, 20);
        assert_eq!((fitted.width(), fitted.height()), (20, 5));
    }

    #[test]
    fn png_round_trip_keeps_dimensions() {
        let bytes = encode_png(&gradient(7, 5)).expect("encode");
        let decoded = ImageProcessor::from_bytes(&bytes).expect("decode");
        assert_eq!((decoded.width(), decoded.height()), (7, 5));
    }

    #[test]
    fn garbage_is_an_image_error() {
        assert!(matches!(
            ImageProcessor::from_bytes(b"definitely not a png"),
            Err(SatzwerkError::ImageError(_))
        ));
    }
}
