//! Rectangle: `pos` is the top-left corner.

use super::Binding;
use crate::geometry::point_in_rect;
use crate::marks::{FieldPath, Geometry, Mark};
use crate::scene::{Attr, NodeId, NodeKind, NodeTree};
use kurbo::{Point, Rect, Size};

pub(super) fn build(tree: &mut NodeTree) -> NodeId {
    tree.create(NodeKind::Rect)
}

fn set_x(mark: &Mark, node: NodeId, tree: &mut NodeTree) {
    tree.set_attr(node, Attr::X, mark.pos.x);
}

fn set_y(mark: &Mark, node: NodeId, tree: &mut NodeTree) {
    tree.set_attr(node, Attr::Y, mark.pos.y);
}

fn set_width(mark: &Mark, node: NodeId, tree: &mut NodeTree) {
    if let Geometry::Rectangle { width, .. } = mark.geometry {
        tree.set_attr(node, Attr::Width, width);
    }
}

fn set_height(mark: &Mark, node: NodeId, tree: &mut NodeTree) {
    if let Geometry::Rectangle { height, .. } = mark.geometry {
        tree.set_attr(node, Attr::Height, height);
    }
}

pub(super) const BINDINGS: [Binding; 4] = [
    Binding::field(FieldPath::PosX, set_x),
    Binding::field(FieldPath::PosY, set_y),
    Binding::field(FieldPath::Width, set_width),
    Binding::field(FieldPath::Height, set_height),
];

pub(super) fn hit_test(pos: Point, width: f64, height: f64, point: Point, tolerance: f64) -> bool {
    let rect = Rect::from_origin_size(pos, Size::new(width, height)).inflate(tolerance, tolerance);
    point_in_rect(point, rect)
}
