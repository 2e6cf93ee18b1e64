//! Annotation object variants.

use crate::color::Color;
use crate::geometry::{CanvasPoint, CanvasRect};
use crate::pixelate::PixelatePatch;
use crate::util;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier for one annotation, unique for the lifetime of its scene.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(pub(crate) u64);

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One annotation over the background raster.
///
/// Geometry is always canvas-space and goes stale the moment the raster is
/// replaced; the crop engine and history manager remap it before the scene
/// is presented again.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnnotationObject {
    pub id: ObjectId,
    /// Finished objects are selectable; provisional ones (mid-gesture) are not.
    pub selectable: bool,
    #[serde(flatten)]
    pub kind: ObjectKind,
}

impl AnnotationObject {
    /// Axis-aligned canvas bounds, expanded to cover the stroke.
    pub fn bounding_box(&self) -> Option<CanvasRect> {
        self.kind.bounding_box()
    }
}

/// Variant payloads, mirroring the drawing tools.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ObjectKind {
    /// Arrow pointing at `end`; the V head is rederived from the endpoints
    /// whenever the arrow is presented.
    Arrow {
        start: CanvasPoint,
        end: CanvasPoint,
        color: Color,
        stroke_width: f64,
        /// Arrowhead length (capped at 30% of the shaft when presented)
        head_length: f64,
        /// Arrowhead angle in degrees
        head_angle: f64,
    },
    /// Rectangle outline.
    Rect {
        rect: CanvasRect,
        color: Color,
        stroke_width: f64,
    },
    /// Ellipse outline.
    Ellipse {
        center: CanvasPoint,
        radius_x: f64,
        radius_y: f64,
        color: Color,
        stroke_width: f64,
    },
    /// Freehand polyline following the pointer.
    Freehand {
        points: Vec<CanvasPoint>,
        color: Color,
        stroke_width: f64,
    },
    /// Text placed at an origin (top-left of the first glyph cell).
    Text {
        origin: CanvasPoint,
        text: String,
        color: Color,
        font_size: f64,
    },
    /// Redaction zone whose fill is a blocky resample of the raster below it.
    Pixelate {
        rect: CanvasRect,
        /// Derived visual cache, recomputed from geometry and never serialized.
        #[serde(skip)]
        patch: Option<PixelatePatch>,
    },
}

impl ObjectKind {
    /// Short discriminant name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            ObjectKind::Arrow { .. } => "arrow",
            ObjectKind::Rect { .. } => "rect",
            ObjectKind::Ellipse { .. } => "ellipse",
            ObjectKind::Freehand { .. } => "freehand",
            ObjectKind::Text { .. } => "text",
            ObjectKind::Pixelate { .. } => "pixelate",
        }
    }

    /// Axis-aligned canvas bounds, expanded to cover the stroke. `None` for
    /// objects with nothing to present (no points, empty text).
    pub fn bounding_box(&self) -> Option<CanvasRect> {
        match self {
            ObjectKind::Arrow { start, end, stroke_width, head_length, head_angle, .. } => {
                let wings = util::arrowhead_points(*end, *start, *head_length, *head_angle);
                let corners = [*start, *end, wings[0], wings[1]];
                let (min_x, min_y, max_x, max_y) = point_bounds(&corners)?;
                let pad = stroke_padding(*stroke_width);
                CanvasRect::new(
                    min_x - pad,
                    min_y - pad,
                    (max_x - min_x) + pad * 2.0,
                    (max_y - min_y) + pad * 2.0,
                )
            }
            ObjectKind::Rect { rect, stroke_width, .. } => {
                Some(rect.inflate(stroke_padding(*stroke_width)))
            }
            ObjectKind::Ellipse { center, radius_x, radius_y, stroke_width, .. } => {
                let pad = stroke_padding(*stroke_width);
                CanvasRect::new(
                    center.x - radius_x - pad,
                    center.y - radius_y - pad,
                    radius_x * 2.0 + pad * 2.0,
                    radius_y * 2.0 + pad * 2.0,
                )
            }
            ObjectKind::Freehand { points, stroke_width, .. } => {
                let (min_x, min_y, max_x, max_y) = point_bounds(points)?;
                let pad = stroke_padding(*stroke_width);
                CanvasRect::new(
                    min_x - pad,
                    min_y - pad,
                    (max_x - min_x) + pad * 2.0,
                    (max_y - min_y) + pad * 2.0,
                )
            }
            ObjectKind::Text { origin, text, font_size, .. } => {
                let (width, height) = text_extent(text, *font_size);
                CanvasRect::new(origin.x, origin.y, width, height)
            }
            ObjectKind::Pixelate { rect, .. } => {
                CanvasRect::new(rect.x, rect.y, rect.width, rect.height)
            }
        }
    }

    /// Geometry extent (ignoring stroke), used to detect degenerate gestures.
    pub fn extent(&self) -> (f64, f64) {
        match self {
            ObjectKind::Arrow { start, end, .. } => {
                ((end.x - start.x).abs(), (end.y - start.y).abs())
            }
            ObjectKind::Rect { rect, .. } | ObjectKind::Pixelate { rect, .. } => {
                (rect.width, rect.height)
            }
            ObjectKind::Ellipse { radius_x, radius_y, .. } => (radius_x * 2.0, radius_y * 2.0),
            ObjectKind::Freehand { points, .. } => match point_bounds(points) {
                Some((min_x, min_y, max_x, max_y)) => (max_x - min_x, max_y - min_y),
                None => (0.0, 0.0),
            },
            ObjectKind::Text { text, font_size, .. } => text_extent(text, *font_size),
        }
    }

    /// Applies `f` to every positional coordinate. Size attributes (extents,
    /// radii, widths) are left to [`ObjectKind::scale_sizes`]; the split is
    /// what lets a raster swap move positions fractionally while scaling
    /// sizes by the display ratio.
    pub(crate) fn map_positions(&mut self, mut f: impl FnMut(&mut CanvasPoint)) {
        match self {
            ObjectKind::Arrow { start, end, .. } => {
                f(start);
                f(end);
            }
            ObjectKind::Rect { rect, .. } | ObjectKind::Pixelate { rect, .. } => {
                let mut origin = CanvasPoint::new(rect.x, rect.y);
                f(&mut origin);
                rect.x = origin.x;
                rect.y = origin.y;
            }
            ObjectKind::Ellipse { center, .. } => f(center),
            ObjectKind::Freehand { points, .. } => {
                for point in points {
                    f(point);
                }
            }
            ObjectKind::Text { origin, .. } => f(origin),
        }
    }

    /// Scales every size attribute by `ratio`. Positions are untouched.
    /// Invalidates derived caches that depend on geometry.
    pub(crate) fn scale_sizes(&mut self, ratio: f64) {
        match self {
            ObjectKind::Arrow { stroke_width, head_length, .. } => {
                *stroke_width *= ratio;
                *head_length *= ratio;
            }
            ObjectKind::Rect { rect, stroke_width, .. } => {
                rect.width *= ratio;
                rect.height *= ratio;
                *stroke_width *= ratio;
            }
            ObjectKind::Ellipse { radius_x, radius_y, stroke_width, .. } => {
                *radius_x *= ratio;
                *radius_y *= ratio;
                *stroke_width *= ratio;
            }
            ObjectKind::Freehand { stroke_width, .. } => {
                *stroke_width *= ratio;
            }
            ObjectKind::Text { font_size, .. } => {
                *font_size *= ratio;
            }
            ObjectKind::Pixelate { rect, patch } => {
                rect.width *= ratio;
                rect.height *= ratio;
                *patch = None;
            }
        }
    }

    /// Translates every position by `(dx, dy)`.
    pub(crate) fn translate(&mut self, dx: f64, dy: f64) {
        self.map_positions(|p| {
            p.x += dx;
            p.y += dy;
        });
    }
}

fn stroke_padding(stroke_width: f64) -> f64 {
    (stroke_width / 2.0).max(0.5)
}

fn point_bounds(points: &[CanvasPoint]) -> Option<(f64, f64, f64, f64)> {
    let first = points.first()?;
    let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
    for p in &points[1..] {
        min_x = min_x.min(p.x);
        min_y = min_y.min(p.y);
        max_x = max_x.max(p.x);
        max_y = max_y.max(p.y);
    }
    Some((min_x, min_y, max_x, max_y))
}

/// Approximate glyph-cell metrics for the bitmap font used at export: each
/// glyph occupies a square cell of `font_size` canvas units per side.
pub(crate) fn text_extent(text: &str, font_size: f64) -> (f64, f64) {
    let mut max_columns = 0usize;
    let mut rows = 0usize;
    for line in text.split('\n') {
        rows += 1;
        max_columns = max_columns.max(line.chars().count());
    }
    (max_columns as f64 * font_size, rows.max(1) as f64 * font_size)
}
