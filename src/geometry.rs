//! Coordinate spaces and the display layout that binds them.
//!
//! Annotation geometry lives in *canvas space*: `f64` coordinates sized to
//! the background raster's on-screen presentation. The raster bitmap itself
//! is addressed in *native pixel space* (integer pixels). [`DisplayLayout`]
//! owns the one conversion in each direction; no other module performs that
//! arithmetic inline.

use serde::{Deserialize, Serialize};

/// A point in canvas space.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CanvasPoint {
    pub x: f64,
    pub y: f64,
}

impl CanvasPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance_to(&self, other: CanvasPoint) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// An axis-aligned rectangle in canvas space.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CanvasRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl CanvasRect {
    /// Creates a rectangle, or `None` when either extent is not positive.
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Option<Self> {
        if width <= 0.0 || height <= 0.0 {
            None
        } else {
            Some(Self { x, y, width, height })
        }
    }

    /// Builds a normalized rectangle from two drag corners, so the drag
    /// direction does not matter. Extents may be zero.
    pub fn from_corners(a: CanvasPoint, b: CanvasPoint) -> Self {
        let (x, width) = if b.x >= a.x { (a.x, b.x - a.x) } else { (b.x, a.x - b.x) };
        let (y, height) = if b.y >= a.y { (a.y, b.y - a.y) } else { (b.y, a.y - b.y) };
        Self { x, y, width, height }
    }

    pub fn contains(&self, p: CanvasPoint) -> bool {
        p.x >= self.x && p.x <= self.x + self.width && p.y >= self.y && p.y <= self.y + self.height
    }

    /// Expands the rectangle evenly in all directions.
    pub fn inflate(&self, amount: f64) -> CanvasRect {
        CanvasRect {
            x: self.x - amount,
            y: self.y - amount,
            width: self.width + amount * 2.0,
            height: self.height + amount * 2.0,
        }
    }
}

/// An axis-aligned rectangle in native pixel space.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    /// Creates a pixel rectangle, or `None` when either extent is zero.
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Option<Self> {
        if width == 0 || height == 0 {
            None
        } else {
            Some(Self { x, y, width, height })
        }
    }
}

/// How the background raster is presented inside the host's container.
///
/// `scale` is canvas units per native pixel; the offsets center the image in
/// the container. Every raster swap computes a fresh layout, which is why
/// canvas-space geometry goes stale when the raster changes.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DisplayLayout {
    pub scale: f64,
    pub offset_x: f64,
    pub offset_y: f64,
    pub native_width: u32,
    pub native_height: u32,
}

impl DisplayLayout {
    /// Fits a raster into a container, preserving aspect ratio and centering.
    ///
    /// The scale is unconstrained upward: a small raster in a large container
    /// is magnified rather than letterboxed at 1:1.
    pub fn fit(
        native_width: u32,
        native_height: u32,
        container_width: f64,
        container_height: f64,
    ) -> Self {
        let scale = (container_width / native_width as f64)
            .min(container_height / native_height as f64);
        let offset_x = (container_width - native_width as f64 * scale) / 2.0;
        let offset_y = (container_height - native_height as f64 * scale) / 2.0;
        Self {
            scale,
            offset_x,
            offset_y,
            native_width,
            native_height,
        }
    }

    /// Canvas-space width of the displayed raster.
    pub fn canvas_width(&self) -> f64 {
        self.native_width as f64 * self.scale
    }

    /// Canvas-space height of the displayed raster.
    pub fn canvas_height(&self) -> f64 {
        self.native_height as f64 * self.scale
    }

    /// The raster's footprint in canvas space.
    pub fn canvas_rect(&self) -> CanvasRect {
        CanvasRect {
            x: self.offset_x,
            y: self.offset_y,
            width: self.canvas_width(),
            height: self.canvas_height(),
        }
    }

    /// Converts a canvas point to fractional native pixel coordinates.
    pub fn to_native(&self, p: CanvasPoint) -> (f64, f64) {
        ((p.x - self.offset_x) / self.scale, (p.y - self.offset_y) / self.scale)
    }

    /// Converts native pixel coordinates to a canvas point.
    pub fn to_canvas(&self, x: f64, y: f64) -> CanvasPoint {
        CanvasPoint::new(self.offset_x + x * self.scale, self.offset_y + y * self.scale)
    }

    /// Converts a canvas rectangle to whole native pixels, clamped to the
    /// raster bounds. `None` when nothing of the rectangle lands on the
    /// raster.
    pub fn to_pixel_rect(&self, rect: CanvasRect) -> Option<PixelRect> {
        let (left, top) = self.to_native(CanvasPoint::new(rect.x, rect.y));
        let (right, bottom) = self.to_native(CanvasPoint::new(rect.x + rect.width, rect.y + rect.height));
        let x0 = left.round().clamp(0.0, self.native_width as f64) as u32;
        let y0 = top.round().clamp(0.0, self.native_height as f64) as u32;
        let x1 = right.round().clamp(0.0, self.native_width as f64) as u32;
        let y1 = bottom.round().clamp(0.0, self.native_height as f64) as u32;
        PixelRect::new(x0, y0, x1.saturating_sub(x0), y1.saturating_sub(y0))
    }

    /// Canvas-space footprint of a native pixel rectangle.
    pub fn pixel_rect_to_canvas(&self, rect: PixelRect) -> CanvasRect {
        let origin = self.to_canvas(rect.x as f64, rect.y as f64);
        CanvasRect {
            x: origin.x,
            y: origin.y,
            width: rect.width as f64 * self.scale,
            height: rect.height as f64 * self.scale,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fit_matches_exact_container() {
        let layout = DisplayLayout::fit(1000, 800, 1000.0, 800.0);
        assert_eq!(layout.scale, 1.0);
        assert_eq!(layout.offset_x, 0.0);
        assert_eq!(layout.offset_y, 0.0);
    }

    #[test]
    fn fit_centers_the_letterboxed_axis() {
        let layout = DisplayLayout::fit(350, 350, 1000.0, 800.0);
        assert!((layout.scale - 800.0 / 350.0).abs() < 1e-9);
        assert!((layout.offset_x - 100.0).abs() < 1e-9);
        assert!((layout.offset_y - 0.0).abs() < 1e-9);
    }

    #[test]
    fn fit_magnifies_small_rasters() {
        let layout = DisplayLayout::fit(100, 100, 1000.0, 400.0);
        assert_eq!(layout.scale, 4.0);
        assert_eq!(layout.offset_x, 300.0);
    }

    #[test]
    fn conversions_round_trip() {
        let layout = DisplayLayout::fit(640, 480, 1000.0, 800.0);
        let original = CanvasPoint::new(412.5, 300.25);
        let (nx, ny) = layout.to_native(original);
        let back = layout.to_canvas(nx, ny);
        assert!((back.x - original.x).abs() < 1e-9);
        assert!((back.y - original.y).abs() < 1e-9);
    }

    #[test]
    fn pixel_rect_clamps_to_the_raster() {
        let layout = DisplayLayout::fit(100, 100, 100.0, 100.0);
        let overhang = CanvasRect::from_corners(CanvasPoint::new(-20.0, 50.0), CanvasPoint::new(50.0, 150.0));
        let region = layout.to_pixel_rect(overhang).unwrap();
        assert_eq!(region, PixelRect { x: 0, y: 50, width: 50, height: 50 });
    }

    #[test]
    fn pixel_rect_off_the_raster_is_none() {
        let layout = DisplayLayout::fit(100, 100, 100.0, 100.0);
        let outside = CanvasRect::from_corners(CanvasPoint::new(150.0, 150.0), CanvasPoint::new(200.0, 200.0));
        assert_eq!(layout.to_pixel_rect(outside), None);
    }

    #[test]
    fn from_corners_normalizes_direction() {
        let a = CanvasPoint::new(80.0, 20.0);
        let b = CanvasPoint::new(20.0, 60.0);
        let rect = CanvasRect::from_corners(a, b);
        assert_eq!(rect, CanvasRect { x: 20.0, y: 20.0, width: 60.0, height: 40.0 });
        assert_eq!(rect, CanvasRect::from_corners(b, a));
    }

    #[test]
    fn inflate_grows_symmetrically() {
        let rect = CanvasRect::new(10.0, 10.0, 20.0, 20.0).unwrap();
        let grown = rect.inflate(5.0);
        assert_eq!(grown, CanvasRect { x: 5.0, y: 5.0, width: 30.0, height: 30.0 });
    }
}
