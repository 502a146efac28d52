//! Geometry kernel: containment tests, segment projection, rect normalization.

use kurbo::{Point, Rect, Vec2};
use thiserror::Error;

/// Errors raised by geometry routines on contract violations.
#[derive(Debug, Error, PartialEq)]
pub enum GeometryError {
    /// A coordinate was NaN or infinite.
    #[error("non-finite coordinate passed to {0}")]
    NonFinite(&'static str),
}

pub(crate) fn ensure_finite(point: Point, context: &'static str) -> Result<(), GeometryError> {
    if point.is_finite() {
        Ok(())
    } else {
        Err(GeometryError::NonFinite(context))
    }
}

/// Test whether a point lies inside the closed polygon described by `vertices`.
///
/// Standard ray casting: a horizontal ray from the point crosses the polygon
/// boundary an odd number of times iff the point is inside. Points exactly on
/// an edge or vertex may report either side; callers must not rely on the
/// boundary case.
pub fn point_in_polygon(point: Point, vertices: &[Point]) -> bool {
    if vertices.len() < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = vertices.len() - 1;
    for i in 0..vertices.len() {
        let vi = vertices[i];
        let vj = vertices[j];
        if (vi.y > point.y) != (vj.y > point.y)
            && point.x < (vj.x - vi.x) * (point.y - vi.y) / (vj.y - vi.y) + vi.x
        {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Test whether a point lies inside `rect`, boundary inclusive on all sides.
pub fn point_in_rect(point: Point, rect: Rect) -> bool {
    point.x >= rect.x0 && point.x <= rect.x1 && point.y >= rect.y0 && point.y <= rect.y1
}

/// Project a point onto the segment `[a, b]`, clamping to the endpoints.
///
/// A zero-length segment projects everything onto `a`. Non-finite inputs are
/// a contract violation and fail rather than being clamped.
pub fn project_point_to_segment(point: Point, a: Point, b: Point) -> Result<Point, GeometryError> {
    ensure_finite(point, "project_point_to_segment")?;
    ensure_finite(a, "project_point_to_segment")?;
    ensure_finite(b, "project_point_to_segment")?;

    let seg = Vec2::new(b.x - a.x, b.y - a.y);
    let pv = Vec2::new(point.x - a.x, point.y - a.y);
    let len_sq = seg.hypot2();
    if len_sq < f64::EPSILON {
        return Ok(a);
    }
    let t = (pv.dot(seg) / len_sq).clamp(0.0, 1.0);
    Ok(Point::new(a.x + t * seg.x, a.y + t * seg.y))
}

/// Minimum distance from a point to the segment `[a, b]`.
pub fn point_to_segment_dist(point: Point, a: Point, b: Point) -> f64 {
    let seg = Vec2::new(b.x - a.x, b.y - a.y);
    let pv = Vec2::new(point.x - a.x, point.y - a.y);
    let len_sq = seg.hypot2();
    if len_sq < f64::EPSILON {
        return pv.hypot();
    }
    let t = (pv.dot(seg) / len_sq).clamp(0.0, 1.0);
    let proj = Point::new(a.x + t * seg.x, a.y + t * seg.y);
    ((point.x - proj.x).powi(2) + (point.y - proj.y).powi(2)).sqrt()
}

/// Normalize two arbitrary corner points into a rectangle with non-negative
/// width and height, regardless of drag direction.
pub fn marquee_rect(start: Point, end: Point) -> Rect {
    Rect::from_points(start, end)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Vec<Point> {
        vec![
            Point::new(0.0, 0.0),
            Point::new(100.0, 0.0),
            Point::new(100.0, 100.0),
            Point::new(0.0, 100.0),
        ]
    }

    #[test]
    fn test_point_in_polygon_inside() {
        assert!(point_in_polygon(Point::new(50.0, 50.0), &square()));
    }

    #[test]
    fn test_point_in_polygon_outside() {
        assert!(!point_in_polygon(Point::new(150.0, 50.0), &square()));
        assert!(!point_in_polygon(Point::new(-10.0, 50.0), &square()));
    }

    #[test]
    fn test_point_in_polygon_concave() {
        // L-shaped polygon with the notch at the top right
        let poly = vec![
            Point::new(0.0, 0.0),
            Point::new(100.0, 0.0),
            Point::new(100.0, 50.0),
            Point::new(50.0, 50.0),
            Point::new(50.0, 100.0),
            Point::new(0.0, 100.0),
        ];
        assert!(point_in_polygon(Point::new(25.0, 75.0), &poly));
        assert!(!point_in_polygon(Point::new(75.0, 75.0), &poly));
    }

    #[test]
    fn test_point_in_polygon_degenerate() {
        let two = vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0)];
        assert!(!point_in_polygon(Point::new(5.0, 0.0), &two));
    }

    #[test]
    fn test_point_in_rect_inclusive() {
        let rect = Rect::new(10.0, 10.0, 100.0, 100.0);
        assert!(point_in_rect(Point::new(10.0, 10.0), rect));
        assert!(point_in_rect(Point::new(100.0, 100.0), rect));
        assert!(point_in_rect(Point::new(55.0, 60.0), rect));
        assert!(!point_in_rect(Point::new(9.9, 50.0), rect));
        assert!(!point_in_rect(Point::new(50.0, 100.1), rect));
    }

    #[test]
    fn test_project_onto_segment_interior() {
        let result = project_point_to_segment(
            Point::new(50.0, 10.0),
            Point::new(0.0, 0.0),
            Point::new(100.0, 0.0),
        )
        .unwrap();
        assert_eq!(result, Point::new(50.0, 0.0));
    }

    #[test]
    fn test_project_clamps_to_endpoints() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(100.0, 0.0);
        assert_eq!(
            project_point_to_segment(Point::new(-20.0, 5.0), a, b).unwrap(),
            a
        );
        assert_eq!(
            project_point_to_segment(Point::new(140.0, -3.0), a, b).unwrap(),
            b
        );
    }

    #[test]
    fn test_project_zero_length_segment() {
        let a = Point::new(7.0, 7.0);
        let result = project_point_to_segment(Point::new(50.0, 50.0), a, a).unwrap();
        assert_eq!(result, a);
    }

    #[test]
    fn test_project_rejects_non_finite() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(100.0, 0.0);
        let result = project_point_to_segment(Point::new(f64::NAN, 0.0), a, b);
        assert_eq!(
            result,
            Err(GeometryError::NonFinite("project_point_to_segment"))
        );
        assert!(project_point_to_segment(a, Point::new(f64::INFINITY, 0.0), b).is_err());
    }

    #[test]
    fn test_marquee_rect_normalizes_any_direction() {
        let expected = Rect::new(10.0, 10.0, 100.0, 100.0);
        assert_eq!(
            marquee_rect(Point::new(100.0, 100.0), Point::new(10.0, 10.0)),
            expected
        );
        assert_eq!(
            marquee_rect(Point::new(10.0, 100.0), Point::new(100.0, 10.0)),
            expected
        );
        assert_eq!(
            marquee_rect(Point::new(10.0, 10.0), Point::new(100.0, 100.0)),
            expected
        );
    }

    #[test]
    fn test_point_to_segment_dist() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(100.0, 0.0);
        assert!((point_to_segment_dist(Point::new(50.0, 30.0), a, b) - 30.0).abs() < 1e-10);
        assert!((point_to_segment_dist(Point::new(-30.0, 0.0), a, b) - 30.0).abs() < 1e-10);
        assert!((point_to_segment_dist(Point::new(3.0, 4.0), a, a) - 5.0).abs() < 1e-10);
    }
}
