//! Point and size helpers on top of kurbo.

use kurbo::{Point, Rect, Vec2};

/// Add an offset point to an anchor point.
pub fn add_point(a: Point, b: Point) -> Point {
    Point::new(a.x + b.x, a.y + b.y)
}

/// Component-wise `a - b`, as a point.
pub fn subtract_point(a: Point, b: Point) -> Point {
    Point::new(a.x - b.x, a.y - b.y)
}

/// Scale a point about the origin.
pub fn scale_point(scalar: f64, a: Point) -> Point {
    Point::new(a.x * scalar, a.y * scalar)
}

/// Rotate a point about the origin by `angle` radians.
pub fn rotate_point(a: Point, angle: f64) -> Point {
    let (sin, cos) = angle.sin_cos();
    Point::new(a.x * cos - a.y * sin, a.x * sin + a.y * cos)
}

/// Drag delta between two pointer positions.
pub fn delta(from: Point, to: Point) -> Vec2 {
    to - from
}

/// Axis-aligned rectangle spanned by two arbitrary corners.
pub fn rect_from_points(a: Point, b: Point) -> Rect {
    Rect::from_points(a, b)
}

/// Inclusive containment test (points on the border count as inside).
pub fn point_in_rect(p: Point, rect: Rect) -> bool {
    let rect = rect.abs();
    (rect.x0..=rect.x1).contains(&p.x) && (rect.y0..=rect.y1).contains(&p.y)
}

/// Offsets relative to `origin`, turned into absolute points.
pub fn relative_points(points: &[Point], origin: Point) -> Vec<Point> {
    points.iter().map(|p| add_point(*p, origin)).collect()
}

/// Distance from a point to the segment `a`-`b`.
pub fn point_to_segment_dist(point: Point, a: Point, b: Point) -> f64 {
    let seg = b - a;
    let pv = point - a;
    let len_sq = seg.hypot2();
    if len_sq < f64::EPSILON {
        return pv.hypot();
    }
    let t = (pv.dot(seg) / len_sq).clamp(0.0, 1.0);
    point.distance(a + seg * t)
}
