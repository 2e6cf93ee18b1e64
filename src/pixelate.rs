//! Pixelation compositor.
//!
//! Keeps each pixelate zone's blocky fill in sync with its geometry. The
//! fill samples the clean background raster at native resolution, never the
//! composited output, which is what makes re-pixelating the same geometry
//! idempotent.

use crate::geometry::{CanvasRect, DisplayLayout, PixelRect};
use crate::raster::Raster;
use crate::sampler;
use crate::scene::{AnnotationObject, ObjectKind};
use image::RgbaImage;
use log::debug;

/// Cached blocky fill for one pixelate zone.
///
/// Derived data: always recomputable from the zone rectangle and the raster,
/// and never serialized.
#[derive(Clone, Debug, PartialEq)]
pub struct PixelatePatch {
    /// Raster region the patch covers, in native pixels.
    pub region: PixelRect,
    /// Cell grid dimensions.
    pub grid_width: u32,
    pub grid_height: u32,
    /// Blocky pixels at the region's native size.
    pub pixels: RgbaImage,
}

/// Renders the patch for a zone rectangle. `None` when the zone misses the
/// raster entirely. Zones under one block on an axis still get a single cell.
pub fn render_patch(
    rect: CanvasRect,
    raster: &Raster,
    layout: DisplayLayout,
    block: f64,
) -> Option<PixelatePatch> {
    let region = layout.to_pixel_rect(rect)?;
    // Grid counts follow the clamped region, so a zone hanging off the
    // raster keeps its on-screen block size.
    let effective = layout.pixel_rect_to_canvas(region);
    let grid_width = sampler::block_count(effective.width, block);
    let grid_height = sampler::block_count(effective.height, block);
    let pixels = sampler::pixelate_region(raster.image(), region, grid_width, grid_height);
    debug!("pixelate patch: {grid_width}x{grid_height} cells over {region:?}");
    Some(PixelatePatch {
        region,
        grid_width,
        grid_height,
        pixels,
    })
}

/// Recomputes the visual cache of one object when it is a pixelate zone.
pub(crate) fn refresh_zone(
    object: &mut AnnotationObject,
    raster: &Raster,
    layout: DisplayLayout,
    block: f64,
) {
    if let ObjectKind::Pixelate { rect, patch } = &mut object.kind {
        *patch = render_patch(*rect, raster, layout, block);
    }
}

/// Recomputes every pixelate zone's cache, e.g. after a raster swap.
pub(crate) fn refresh_zones(
    objects: &mut [AnnotationObject],
    raster: &Raster,
    layout: DisplayLayout,
    block: f64,
) {
    for object in objects {
        refresh_zone(object, raster, layout, block);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn half_and_half_raster(width: u32, height: u32) -> Raster {
        let image = RgbaImage::from_fn(width, height, |x, _| {
            if x < width / 2 {
                Rgba([255, 0, 0, 255])
            } else {
                Rgba([0, 0, 255, 255])
            }
        });
        Raster::from_rgba(image).unwrap()
    }

    fn unit_layout(width: u32, height: u32) -> DisplayLayout {
        DisplayLayout::fit(width, height, width as f64, height as f64)
    }

    #[test]
    fn grid_counts_follow_ceil_of_extent_over_block() {
        let raster = half_and_half_raster(100, 60);
        let layout = unit_layout(100, 60);
        let rect = CanvasRect::new(10.0, 10.0, 35.0, 22.0).unwrap();
        let patch = render_patch(rect, &raster, layout, 10.0).unwrap();
        assert_eq!(patch.grid_width, 4);
        assert_eq!(patch.grid_height, 3);
        assert_eq!(patch.pixels.dimensions(), (35, 22));
        assert_eq!(patch.region, PixelRect { x: 10, y: 10, width: 35, height: 22 });
    }

    #[test]
    fn tiny_zones_get_a_single_flat_cell() {
        let raster = half_and_half_raster(100, 60);
        let layout = unit_layout(100, 60);
        let rect = CanvasRect::new(48.0, 10.0, 4.0, 3.0).unwrap();
        let patch = render_patch(rect, &raster, layout, 10.0).unwrap();
        assert_eq!((patch.grid_width, patch.grid_height), (1, 1));
        let first = *patch.pixels.get_pixel(0, 0);
        assert!(patch.pixels.pixels().all(|p| *p == first));
    }

    #[test]
    fn zones_off_the_raster_have_no_patch() {
        let raster = half_and_half_raster(100, 60);
        let layout = unit_layout(100, 60);
        let rect = CanvasRect::new(200.0, 200.0, 30.0, 30.0).unwrap();
        assert!(render_patch(rect, &raster, layout, 10.0).is_none());
    }

    #[test]
    fn same_geometry_renders_the_same_patch() {
        let raster = half_and_half_raster(100, 60);
        let layout = unit_layout(100, 60);
        let rect = CanvasRect::new(20.0, 5.0, 50.0, 40.0).unwrap();
        let first = render_patch(rect, &raster, layout, 10.0).unwrap();
        let again = render_patch(rect, &raster, layout, 10.0).unwrap();
        assert_eq!(first, again);
    }

    #[test]
    fn contrasting_halves_become_distinct_blocks() {
        let raster = half_and_half_raster(40, 20);
        let layout = unit_layout(40, 20);
        let rect = CanvasRect::new(0.0, 0.0, 40.0, 20.0).unwrap();
        let patch = render_patch(rect, &raster, layout, 20.0).unwrap();
        assert_eq!((patch.grid_width, patch.grid_height), (2, 1));
        let left = *patch.pixels.get_pixel(0, 0);
        let right = *patch.pixels.get_pixel(39, 0);
        assert!(left[0] > left[2]);
        assert!(right[2] > right[0]);
        assert_eq!(*patch.pixels.get_pixel(19, 19), left);
        assert_eq!(*patch.pixels.get_pixel(20, 19), right);
    }
}
