//! CPU flattening exporter.
//!
//! Composites the scene into one raster at the background's native
//! resolution. All drawing is plain pixel math: thick lines are runs of
//! stamped discs, arrowheads are the same two-wing V the overlay shows,
//! ellipses are polyline approximations, and text uses the 8x8 bitmap font
//! scaled to the annotation's font size.

use crate::color::Color;
use crate::config::EngineOptions;
use crate::geometry::{CanvasPoint, DisplayLayout};
use crate::pixelate::{self, PixelatePatch};
use crate::scene::{ObjectKind, Scene};
use crate::util;
use font8x8::{BASIC_FONTS, UnicodeFonts};
use image::{Rgba, RgbaImage};

/// Flattens the background and annotations into one RGBA image.
///
/// Canvas-space geometry converts through the scene's layout; stroke widths
/// and font sizes divide by the display scale so the export matches what the
/// host presented, at native resolution.
pub fn flatten(scene: &Scene, options: &EngineOptions) -> RgbaImage {
    let mut canvas = scene.raster().image().clone();
    let layout = scene.layout();

    for object in scene.objects_in_z_order() {
        render_object(&mut canvas, &object.kind, scene, layout, options);
    }

    canvas
}

fn render_object(
    canvas: &mut RgbaImage,
    kind: &ObjectKind,
    scene: &Scene,
    layout: DisplayLayout,
    options: &EngineOptions,
) {
    match kind {
        ObjectKind::Arrow { start, end, color, stroke_width, head_length, head_angle } => {
            let tip = layout.to_native(*end);
            let tail = layout.to_native(*start);
            let width = stroke_width / layout.scale;
            let rgba = to_rgba(*color);
            draw_thick_line(canvas, tail, tip, width, rgba);
            for wing in util::arrowhead_points(*end, *start, *head_length, *head_angle) {
                draw_thick_line(canvas, layout.to_native(wing), tip, width, rgba);
            }
        }
        ObjectKind::Rect { rect, color, stroke_width } => {
            let (left, top) = layout.to_native(CanvasPoint::new(rect.x, rect.y));
            let (right, bottom) =
                layout.to_native(CanvasPoint::new(rect.x + rect.width, rect.y + rect.height));
            let width = stroke_width / layout.scale;
            let rgba = to_rgba(*color);
            draw_thick_line(canvas, (left, top), (right, top), width, rgba);
            draw_thick_line(canvas, (right, top), (right, bottom), width, rgba);
            draw_thick_line(canvas, (right, bottom), (left, bottom), width, rgba);
            draw_thick_line(canvas, (left, bottom), (left, top), width, rgba);
        }
        ObjectKind::Ellipse { center, radius_x, radius_y, color, stroke_width } => {
            draw_ellipse_outline(
                canvas,
                layout,
                *center,
                *radius_x,
                *radius_y,
                stroke_width / layout.scale,
                to_rgba(*color),
            );
        }
        ObjectKind::Freehand { points, color, stroke_width } => {
            let width = stroke_width / layout.scale;
            let rgba = to_rgba(*color);
            if points.len() == 1 {
                let (x, y) = layout.to_native(points[0]);
                draw_disc(canvas, x, y, (width.max(1.0) / 2.0).max(0.6), rgba);
            }
            for pair in points.windows(2) {
                draw_thick_line(canvas, layout.to_native(pair[0]), layout.to_native(pair[1]), width, rgba);
            }
        }
        ObjectKind::Text { origin, text, color, font_size } => {
            let (x, y) = layout.to_native(*origin);
            draw_bitmap_text(canvas, x, y, text, font_size / layout.scale, to_rgba(*color));
        }
        ObjectKind::Pixelate { rect, patch } => {
            // Use the cache when present, otherwise render the patch in place.
            let computed;
            let patch = match patch {
                Some(patch) => patch,
                None => {
                    computed = pixelate::render_patch(*rect, scene.raster(), layout, options.pixelate_block);
                    match &computed {
                        Some(patch) => patch,
                        None => return,
                    }
                }
            };
            paste_patch(canvas, patch);
        }
    }
}

/// Copies a pixelate patch over the canvas. Redaction replaces pixels, it
/// does not blend.
fn paste_patch(canvas: &mut RgbaImage, patch: &PixelatePatch) {
    for (dx, dy, pixel) in patch.pixels.enumerate_pixels() {
        let x = patch.region.x + dx;
        let y = patch.region.y + dy;
        if x < canvas.width() && y < canvas.height() {
            canvas.put_pixel(x, y, *pixel);
        }
    }
}

fn draw_ellipse_outline(
    canvas: &mut RgbaImage,
    layout: DisplayLayout,
    center: CanvasPoint,
    radius_x: f64,
    radius_y: f64,
    width: f64,
    color: Rgba<u8>,
) {
    let native_radius = radius_x.max(radius_y) / layout.scale;
    let steps = (native_radius * 2.0).clamp(24.0, 512.0) as usize;
    let mut previous: Option<(f64, f64)> = None;
    for i in 0..=steps {
        let t = (i as f64 / steps as f64) * std::f64::consts::TAU;
        let p = layout.to_native(CanvasPoint::new(
            center.x + radius_x * t.cos(),
            center.y + radius_y * t.sin(),
        ));
        if let Some(prev) = previous {
            draw_thick_line(canvas, prev, p, width, color);
        }
        previous = Some(p);
    }
}

fn to_rgba(color: Color) -> Rgba<u8> {
    Rgba(color.to_rgba8())
}

fn blend_pixel(dst: Rgba<u8>, src: Rgba<u8>) -> Rgba<u8> {
    let alpha = src[3] as f64 / 255.0;
    if alpha >= 1.0 {
        return src;
    }
    let inverse = 1.0 - alpha;
    Rgba([
        (src[0] as f64 * alpha + dst[0] as f64 * inverse).round() as u8,
        (src[1] as f64 * alpha + dst[1] as f64 * inverse).round() as u8,
        (src[2] as f64 * alpha + dst[2] as f64 * inverse).round() as u8,
        dst[3].max(src[3]),
    ])
}

fn draw_disc(canvas: &mut RgbaImage, cx: f64, cy: f64, radius: f64, color: Rgba<u8>) {
    let (width, height) = canvas.dimensions();
    let min_x = ((cx - radius).floor().max(0.0)) as u32;
    let max_x = ((cx + radius).ceil().min(width as f64 - 1.0)).max(0.0) as u32;
    let min_y = ((cy - radius).floor().max(0.0)) as u32;
    let max_y = ((cy + radius).ceil().min(height as f64 - 1.0)).max(0.0) as u32;
    if cx + radius < 0.0 || cy + radius < 0.0 {
        return;
    }

    let r2 = radius * radius;
    for y in min_y..=max_y {
        for x in min_x..=max_x {
            let dx = x as f64 + 0.5 - cx;
            let dy = y as f64 + 0.5 - cy;
            if dx * dx + dy * dy <= r2 {
                let blended = blend_pixel(*canvas.get_pixel(x, y), color);
                canvas.put_pixel(x, y, blended);
            }
        }
    }
}

fn draw_thick_line(
    canvas: &mut RgbaImage,
    from: (f64, f64),
    to: (f64, f64),
    width: f64,
    color: Rgba<u8>,
) {
    let dx = to.0 - from.0;
    let dy = to.1 - from.1;
    let distance = (dx * dx + dy * dy).sqrt();
    let steps = distance.max(1.0).ceil() as u32;
    let radius = (width.max(1.0) / 2.0).max(0.6);
    for step in 0..=steps {
        let t = step as f64 / steps as f64;
        draw_disc(canvas, from.0 + dx * t, from.1 + dy * t, radius, color);
    }
}

fn draw_bitmap_text(canvas: &mut RgbaImage, x: f64, y: f64, text: &str, cell: f64, color: Rgba<u8>) {
    let scale = ((cell / 8.0).round().max(1.0)) as i32;
    let cell_px = 8 * scale;
    let origin_x = x.round() as i32;
    let mut cursor_x = origin_x;
    let mut cursor_y = y.round() as i32;
    let (width, height) = canvas.dimensions();

    for ch in text.chars() {
        if ch == '\n' {
            cursor_x = origin_x;
            cursor_y += cell_px;
            continue;
        }
        let Some(glyph) = BASIC_FONTS.get(ch).or_else(|| BASIC_FONTS.get('?')) else {
            cursor_x += cell_px;
            continue;
        };
        for (row_idx, row) in glyph.iter().enumerate() {
            for col in 0..8i32 {
                if (*row >> col) & 1 == 0 {
                    continue;
                }
                let base_x = cursor_x + col * scale;
                let base_y = cursor_y + row_idx as i32 * scale;
                for sy in 0..scale {
                    for sx in 0..scale {
                        let px = base_x + sx;
                        let py = base_y + sy;
                        if px >= 0 && py >= 0 && (px as u32) < width && (py as u32) < height {
                            let blended = blend_pixel(*canvas.get_pixel(px as u32, py as u32), color);
                            canvas.put_pixel(px as u32, py as u32, blended);
                        }
                    }
                }
            }
        }
        cursor_x += cell_px;
    }
}
