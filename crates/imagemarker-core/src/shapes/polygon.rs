//! Polygon: points are relative to `pos`.

use super::Binding;
use crate::geometry::{point_to_segment_dist, relative_points};
use crate::marks::{FieldPath, Geometry, Mark};
use crate::scene::{Attr, NodeId, NodeKind, NodeTree};
use kurbo::{BezPath, Point, Shape as _};

pub(super) fn build(tree: &mut NodeTree) -> NodeId {
    tree.create(NodeKind::Polygon)
}

fn set_points(mark: &Mark, node: NodeId, tree: &mut NodeTree) {
    if let Geometry::Polygon { points } = &mark.geometry {
        tree.set_attr(node, Attr::Points, relative_points(points, mark.pos));
    }
}

pub(super) const BINDINGS: [Binding; 1] = [Binding::joint(
    &[FieldPath::PosX, FieldPath::PosY, FieldPath::Polygon],
    set_points,
)];

pub(super) fn hit_test(pos: Point, points: &[Point], point: Point, tolerance: f64) -> bool {
    let absolute = relative_points(points, pos);
    let Some((first, rest)) = absolute.split_first() else {
        return false;
    };

    let mut path = BezPath::new();
    path.move_to(*first);
    for p in rest {
        path.line_to(*p);
    }
    path.close_path();
    if path.contains(point) {
        return true;
    }

    // Outline, closing segment included.
    absolute
        .iter()
        .zip(absolute.iter().cycle().skip(1))
        .any(|(a, b)| point_to_segment_dist(point, *a, *b) <= tolerance)
}
