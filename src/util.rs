//! Arrowhead and ellipse helper math shared by the gesture layer and the
//! exporter.

use crate::geometry::CanvasPoint;

/// Calculates the two arrowhead wing points for an arrow ending at `tip`.
///
/// The wings extend back toward `tail`, rotated `angle_degrees` either side
/// of the shaft. The head length is capped at 30% of the shaft length so
/// short arrows do not grow oversized heads; a shaft under one canvas unit
/// collapses both wings onto the tip.
pub fn arrowhead_points(
    tip: CanvasPoint,
    tail: CanvasPoint,
    length: f64,
    angle_degrees: f64,
) -> [CanvasPoint; 2] {
    let dx = tip.x - tail.x;
    let dy = tip.y - tail.y;
    let shaft = (dx * dx + dy * dy).sqrt();

    if shaft < 1.0 {
        return [tip, tip];
    }

    let ux = dx / shaft;
    let uy = dy / shaft;
    let head = length.min(shaft * 0.3);

    let angle = angle_degrees.to_radians();
    let cos_a = angle.cos();
    let sin_a = angle.sin();

    let left = CanvasPoint::new(
        tip.x - head * (ux * cos_a - uy * sin_a),
        tip.y - head * (uy * cos_a + ux * sin_a),
    );
    let right = CanvasPoint::new(
        tip.x - head * (ux * cos_a + uy * sin_a),
        tip.y - head * (uy * cos_a - ux * sin_a),
    );

    [left, right]
}

/// Converts two drag corners into an ellipse center and radii.
pub fn ellipse_from_corners(a: CanvasPoint, b: CanvasPoint) -> (CanvasPoint, f64, f64) {
    let center = CanvasPoint::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0);
    let radius_x = (b.x - a.x).abs() / 2.0;
    let radius_y = (b.y - a.y).abs() / 2.0;
    (center, radius_x, radius_y)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arrowhead_wings_sit_at_the_head_length() {
        let tip = CanvasPoint::new(100.0, 0.0);
        let tail = CanvasPoint::new(0.0, 0.0);
        let [left, right] = arrowhead_points(tip, tail, 20.0, 30.0);
        assert!((tip.distance_to(left) - 20.0).abs() < 1e-9);
        assert!((tip.distance_to(right) - 20.0).abs() < 1e-9);
        // Wings land behind the tip, one each side of the shaft.
        assert!(left.x < tip.x && right.x < tip.x);
        assert!(left.y < 0.0 && right.y > 0.0);
    }

    #[test]
    fn arrowhead_caps_at_thirty_percent_of_shaft() {
        let tip = CanvasPoint::new(10.0, 10.0);
        let tail = CanvasPoint::new(0.0, 10.0);
        let [left, _] = arrowhead_points(tip, tail, 100.0, 30.0);
        assert!((tip.distance_to(left) - 3.0).abs() < 1e-9);
    }

    #[test]
    fn arrowhead_collapses_on_degenerate_shafts() {
        let tip = CanvasPoint::new(5.0, 5.0);
        let [left, right] = arrowhead_points(tip, tip, 15.0, 45.0);
        assert_eq!(left, tip);
        assert_eq!(right, tip);
    }

    #[test]
    fn ellipse_from_corners_computes_center_and_radii() {
        let (center, rx, ry) =
            ellipse_from_corners(CanvasPoint::new(0.0, 0.0), CanvasPoint::new(10.0, 4.0));
        assert_eq!(center, CanvasPoint::new(5.0, 2.0));
        assert_eq!(rx, 5.0);
        assert_eq!(ry, 2.0);
    }
}
