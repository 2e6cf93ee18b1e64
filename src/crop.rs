//! Crop engine: raster extraction and fractional geometry remapping.

use crate::geometry::{CanvasPoint, CanvasRect, DisplayLayout};
use crate::raster::Raster;
use crate::sampler;
use crate::scene::AnnotationObject;
use log::debug;
use std::sync::Arc;

/// A planned crop: the replacement raster, its layout, and every object
/// carried into the new canvas space.
#[derive(Debug)]
pub struct CropPlan {
    pub raster: Arc<Raster>,
    pub layout: DisplayLayout,
    pub objects: Vec<AnnotationObject>,
}

/// Plans a crop of `region` (canvas space) against the current scene state.
///
/// The region is clamped to the raster; `None` means nothing of it lands on
/// the raster at all. Pixel content is extracted, never resampled.
/// Annotation positions follow the fractional formula, size attributes
/// follow the display-scale ratio. Objects outside the region are remapped
/// the same way and may land outside the new canvas.
pub fn plan_crop(
    region: CanvasRect,
    raster: &Raster,
    layout: DisplayLayout,
    objects: &[AnnotationObject],
    container_width: f64,
    container_height: f64,
) -> Option<CropPlan> {
    let pixel_region = layout.to_pixel_rect(region)?;
    let extracted = sampler::extract_region(raster.image(), pixel_region);
    let new_raster = Arc::new(Raster::from_rgba(extracted).ok()?);
    let new_layout = DisplayLayout::fit(
        new_raster.width(),
        new_raster.height(),
        container_width,
        container_height,
    );

    // Remap against the clamped region so fractions and the new canvas agree.
    let effective = layout.pixel_rect_to_canvas(pixel_region);
    let objects = remap_objects(objects, effective, layout, new_layout);

    debug!(
        "crop planned: {}x{} px from {:?}, scale {:.3} -> {:.3}",
        new_raster.width(),
        new_raster.height(),
        pixel_region,
        layout.scale,
        new_layout.scale
    );

    Some(CropPlan {
        raster: new_raster,
        layout: new_layout,
        objects,
    })
}

/// Carries objects from `region` of the old canvas into the whole of the new
/// canvas: positions as per-axis fractions of the region, size attributes by
/// the ratio of new to old display scale.
pub fn remap_objects(
    objects: &[AnnotationObject],
    region: CanvasRect,
    old_layout: DisplayLayout,
    new_layout: DisplayLayout,
) -> Vec<AnnotationObject> {
    let size_ratio = new_layout.scale / old_layout.scale;
    let new_width = new_layout.canvas_width();
    let new_height = new_layout.canvas_height();

    objects
        .iter()
        .cloned()
        .map(|mut object| {
            object.kind.map_positions(|p| {
                let frac_x = (p.x - region.x) / region.width;
                let frac_y = (p.y - region.y) / region.height;
                *p = CanvasPoint::new(
                    new_layout.offset_x + frac_x * new_width,
                    new_layout.offset_y + frac_y * new_height,
                );
            });
            object.kind.scale_sizes(size_ratio);
            object
        })
        .collect()
}

/// Carries objects between two layouts of the same raster (container
/// resize). The source region is the old layout's full footprint.
pub fn relayout_objects(
    objects: &[AnnotationObject],
    old_layout: DisplayLayout,
    new_layout: DisplayLayout,
) -> Vec<AnnotationObject> {
    remap_objects(objects, old_layout.canvas_rect(), old_layout, new_layout)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::RED;
    use crate::scene::{ObjectId, ObjectKind};
    use image::RgbaImage;

    fn arrow(start: (f64, f64), end: (f64, f64)) -> AnnotationObject {
        AnnotationObject {
            id: ObjectId(1),
            selectable: true,
            kind: ObjectKind::Arrow {
                start: CanvasPoint::new(start.0, start.1),
                end: CanvasPoint::new(end.0, end.1),
                color: RED,
                stroke_width: 3.0,
                head_length: 20.0,
                head_angle: 30.0,
            },
        }
    }

    fn arrow_start(object: &AnnotationObject) -> CanvasPoint {
        match &object.kind {
            ObjectKind::Arrow { start, .. } => *start,
            other => panic!("arrow expected, got {}", other.name()),
        }
    }

    #[test]
    fn crop_preserves_fractional_positions() {
        let raster = Raster::from_rgba(RgbaImage::new(1000, 800)).unwrap();
        let layout = DisplayLayout::fit(1000, 800, 1000.0, 800.0);
        let objects = vec![arrow((100.0, 100.0), (300.0, 100.0))];
        let region = CanvasRect::new(50.0, 50.0, 350.0, 350.0).unwrap();

        let plan = plan_crop(region, &raster, layout, &objects, 1000.0, 800.0).unwrap();
        assert_eq!((plan.raster.width(), plan.raster.height()), (350, 350));
        assert!((plan.layout.scale - 800.0 / 350.0).abs() < 1e-9);
        assert!((plan.layout.offset_x - 100.0).abs() < 1e-9);

        // One seventh into the region on each axis before, one seventh into
        // the new canvas after.
        let start = arrow_start(&plan.objects[0]);
        let frac_x = (start.x - plan.layout.offset_x) / plan.layout.canvas_width();
        let frac_y = (start.y - plan.layout.offset_y) / plan.layout.canvas_height();
        assert!((frac_x - 50.0 / 350.0).abs() < 1e-9);
        assert!((frac_y - 50.0 / 350.0).abs() < 1e-9);

        let ObjectKind::Arrow { stroke_width, .. } = plan.objects[0].kind else {
            panic!("arrow expected");
        };
        assert!((stroke_width - 3.0 * (800.0 / 350.0)).abs() < 1e-9);
    }

    #[test]
    fn objects_outside_the_region_are_not_clipped() {
        let raster = Raster::from_rgba(RgbaImage::new(1000, 800)).unwrap();
        let layout = DisplayLayout::fit(1000, 800, 1000.0, 800.0);
        let objects = vec![arrow((10.0, 10.0), (20.0, 20.0))];
        let region = CanvasRect::new(500.0, 500.0, 200.0, 200.0).unwrap();

        let plan = plan_crop(region, &raster, layout, &objects, 1000.0, 800.0).unwrap();
        assert_eq!(plan.objects.len(), 1);
        let start = arrow_start(&plan.objects[0]);
        // Negative fraction of the region lands left of and above the new canvas.
        assert!(start.x < plan.layout.offset_x);
        assert!(start.y < plan.layout.offset_y);
    }

    #[test]
    fn crop_outside_the_raster_is_rejected() {
        let raster = Raster::from_rgba(RgbaImage::new(100, 100)).unwrap();
        let layout = DisplayLayout::fit(100, 100, 100.0, 100.0);
        let region = CanvasRect::new(500.0, 500.0, 50.0, 50.0).unwrap();
        assert!(plan_crop(region, &raster, layout, &[], 100.0, 100.0).is_none());
    }

    #[test]
    fn relayout_round_trip_is_stable() {
        let small = DisplayLayout::fit(200, 100, 200.0, 100.0);
        let large = DisplayLayout::fit(200, 100, 800.0, 400.0);
        let objects = vec![arrow((40.0, 30.0), (120.0, 80.0))];

        let grown = relayout_objects(&objects, small, large);
        let start = arrow_start(&grown[0]);
        assert!((start.x - 160.0).abs() < 1e-9);
        assert!((start.y - 120.0).abs() < 1e-9);

        let back = relayout_objects(&grown, large, small);
        let restored = arrow_start(&back[0]);
        assert!((restored.x - 40.0).abs() < 1e-9);
        assert!((restored.y - 30.0).abs() < 1e-9);
    }
}
