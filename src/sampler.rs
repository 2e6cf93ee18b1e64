//! Pixel resampling for crop extraction and pixelation.

use crate::geometry::PixelRect;
use image::RgbaImage;
use image::imageops::{self, FilterType};

/// Copies a pixel rectangle out of the source at native resolution.
///
/// The caller guarantees the region lies inside the source; regions come
/// from [`crate::geometry::DisplayLayout::to_pixel_rect`], which clamps.
pub fn extract_region(source: &RgbaImage, region: PixelRect) -> RgbaImage {
    imageops::crop_imm(source, region.x, region.y, region.width, region.height).to_image()
}

/// Produces the blocky fill for a pixelate zone: an averaging downsample to
/// the cell grid followed by a nearest-neighbor upsample back to the region's
/// native size, so every cell lands as one flat block.
pub fn pixelate_region(
    source: &RgbaImage,
    region: PixelRect,
    grid_width: u32,
    grid_height: u32,
) -> RgbaImage {
    let cropped = extract_region(source, region);
    let coarse = imageops::resize(&cropped, grid_width.max(1), grid_height.max(1), FilterType::Triangle);
    imageops::resize(&coarse, region.width, region.height, FilterType::Nearest)
}

/// Number of pixelation cells covering `extent` at the given block size.
/// Always at least one, so tiny zones still produce a single averaged block.
pub fn block_count(extent: f64, block: f64) -> u32 {
    ((extent / block).ceil() as u32).max(1)
}
