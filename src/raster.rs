//! Background raster storage.

use crate::error::DecodeError;
use image::{ImageFormat, RgbaImage};
use std::io::Cursor;

/// A decoded background image.
///
/// Immutable once constructed: a crop allocates a fresh raster, and history
/// entries share rasters by `Arc` instead of copying pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct Raster {
    image: RgbaImage,
}

impl Raster {
    /// Decodes encoded image bytes (PNG).
    pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        let image = image::load_from_memory(bytes)?.to_rgba8();
        Self::from_rgba(image)
    }

    /// Adopts an already-decoded RGBA buffer.
    pub fn from_rgba(image: RgbaImage) -> Result<Self, DecodeError> {
        if image.width() == 0 || image.height() == 0 {
            return Err(DecodeError::EmptyImage);
        }
        Ok(Self { image })
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// The decoded pixels.
    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// PNG-encodes the raster.
    pub fn encode_png(&self) -> Result<Vec<u8>, image::ImageError> {
        let mut out = Cursor::new(Vec::new());
        self.image.write_to(&mut out, ImageFormat::Png)?;
        Ok(out.into_inner())
    }
}
