//! Line and wave-line: `end` is an offset from `pos`.

use super::Binding;
use crate::geometry::{add_point, point_to_segment_dist, rotate_point};
use crate::marks::{FieldPath, Mark};
use crate::scene::{Attr, NodeId, NodeKind, NodeTree};
use kurbo::{BezPath, Point, Vec2};

/// Peak distance of the wave from its axis.
pub const WAVE_AMPLITUDE: f64 = 4.0;
/// Length of one full wave period along the axis.
pub const WAVE_LENGTH: f64 = 16.0;
/// Upper bound on arcs per wave; longer waves stretch their period.
pub const MAX_HALF_WAVES: usize = 4096;

pub(super) fn build_line(tree: &mut NodeTree) -> NodeId {
    tree.create(NodeKind::Line)
}

pub(super) fn build_wave(tree: &mut NodeTree) -> NodeId {
    tree.create(NodeKind::Path)
}

fn end_of(mark: &Mark) -> Point {
    mark.geometry.end().unwrap_or(Point::ZERO)
}

fn set_x1(mark: &Mark, node: NodeId, tree: &mut NodeTree) {
    tree.set_attr(node, Attr::X1, mark.pos.x);
}

fn set_y1(mark: &Mark, node: NodeId, tree: &mut NodeTree) {
    tree.set_attr(node, Attr::Y1, mark.pos.y);
}

fn set_x2(mark: &Mark, node: NodeId, tree: &mut NodeTree) {
    tree.set_attr(node, Attr::X2, mark.pos.x + end_of(mark).x);
}

fn set_y2(mark: &Mark, node: NodeId, tree: &mut NodeTree) {
    tree.set_attr(node, Attr::Y2, mark.pos.y + end_of(mark).y);
}

pub(super) const LINE_BINDINGS: [Binding; 4] = [
    Binding::field(FieldPath::PosX, set_x1),
    Binding::field(FieldPath::PosY, set_y1),
    Binding::joint(&[FieldPath::PosX, FieldPath::EndX], set_x2),
    Binding::joint(&[FieldPath::PosY, FieldPath::EndY], set_y2),
];

fn set_wave_path(mark: &Mark, node: NodeId, tree: &mut NodeTree) {
    tree.set_attr(node, Attr::D, wave_path(mark.pos, end_of(mark)).to_svg());
}

pub(super) const WAVE_BINDINGS: [Binding; 1] = [Binding::joint(
    &[FieldPath::PosX, FieldPath::PosY, FieldPath::EndX, FieldPath::EndY],
    set_wave_path,
)];

/// Wavy path from `pos` to `pos + end`.
///
/// Built along the x axis out of half-period quadratic arcs, then rotated
/// onto the direction of `end`.
pub fn wave_path(pos: Point, end: Point) -> BezPath {
    let mut path = BezPath::new();
    path.move_to(pos);

    let length = end.to_vec2().length();
    if length < f64::EPSILON {
        return path;
    }
    let angle = end.y.atan2(end.x);
    let place = |x: f64, y: f64| add_point(rotate_point(Point::new(x, y), angle), pos);

    let half_waves = (length / (WAVE_LENGTH / 2.0))
        .ceil()
        .clamp(1.0, MAX_HALF_WAVES as f64) as usize;
    let step = length / half_waves as f64;
    for i in 0..half_waves {
        let side = if i % 2 == 0 { -1.0 } else { 1.0 };
        let x0 = i as f64 * step;
        path.quad_to(
            place(x0 + step / 2.0, side * 2.0 * WAVE_AMPLITUDE),
            place(x0 + step, 0.0),
        );
    }
    path
}

pub(super) fn hit_test(pos: Point, end: Point, point: Point, tolerance: f64) -> bool {
    let end = pos + Vec2::new(end.x, end.y);
    point_to_segment_dist(point, pos, end) <= tolerance
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::marks::Geometry;
    use crate::shapes::apply_all;
    use kurbo::PathEl;

    #[test]
    fn test_line_endpoints_absolute() {
        let mut tree = NodeTree::new();
        let node = build_line(&mut tree);
        let mark = Mark::new(Point::new(10.0, 10.0), Geometry::Line { end: Point::new(5.0, -5.0) });
        apply_all(&LINE_BINDINGS, &mark, node, &mut tree);
        assert_eq!(tree.number(node, Attr::X1), Some(10.0));
        assert_eq!(tree.number(node, Attr::X2), Some(15.0));
        assert_eq!(tree.number(node, Attr::Y2), Some(5.0));
    }

    #[test]
    fn test_wave_path_ends_at_end_point() {
        let path = wave_path(Point::new(10.0, 10.0), Point::new(0.0, 40.0));
        let Some(PathEl::QuadTo(_, last)) = path.elements().last().copied() else {
            panic!("wave path should end with a quadratic segment");
        };
        assert!((last.x - 10.0).abs() < 1e-9);
        assert!((last.y - 50.0).abs() < 1e-9);
        assert_eq!(path.elements().len(), 1 + 5);
    }

    #[test]
    fn test_long_wave_is_capped() {
        let path = wave_path(Point::ZERO, Point::new(1e9, 0.0));
        assert_eq!(path.elements().len(), 1 + MAX_HALF_WAVES);
        let Some(PathEl::QuadTo(_, last)) = path.elements().last().copied() else {
            panic!("wave path should end with a quadratic segment");
        };
        assert!((last.x - 1e9).abs() < 1e-3);
    }

    #[test]
    fn test_zero_length_wave_is_just_a_move() {
        let path = wave_path(Point::new(3.0, 3.0), Point::ZERO);
        assert_eq!(path.elements(), &[PathEl::MoveTo(Point::new(3.0, 3.0))]);
    }

    #[test]
    fn test_wave_binding_sets_path_data() {
        let mut tree = NodeTree::new();
        let node = build_wave(&mut tree);
        let mark = Mark::new(Point::ZERO, Geometry::Wave { end: Point::new(16.0, 0.0) });
        apply_all(&WAVE_BINDINGS, &mark, node, &mut tree);
        assert!(matches!(
            tree.attr(node, Attr::D),
            Some(crate::scene::AttrValue::Text(d)) if d.starts_with('M')
        ));
    }
}
