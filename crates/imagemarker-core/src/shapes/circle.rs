//! Circle: `pos` is the center; an optional symbol is drawn on top.
//!
//! The shape node is a group translated to `pos`, holding the disc and the
//! symbol text, so moving the mark only touches the group transform.

use super::Binding;
use crate::marks::{FieldPath, Geometry, Mark};
use crate::scene::{Attr, NodeId, NodeKind, NodeTree};
use kurbo::Point;

/// Radius of the drawn disc, in surface units.
pub const CIRCLE_RADIUS: f64 = 10.0;

pub(super) fn build(tree: &mut NodeTree) -> NodeId {
    let group = tree.create(NodeKind::Group);
    let disc = tree.create_child(group, NodeKind::Circle);
    tree.set_attr(disc, Attr::Cx, 0.0);
    tree.set_attr(disc, Attr::Cy, 0.0);
    tree.set_attr(disc, Attr::R, CIRCLE_RADIUS);
    let symbol = tree.create_child(group, NodeKind::Text);
    tree.add_class(symbol, "symbol");
    group
}

fn symbol_node(node: NodeId, tree: &NodeTree) -> Option<NodeId> {
    tree.children(node).get(1).copied()
}

fn set_transform(mark: &Mark, node: NodeId, tree: &mut NodeTree) {
    tree.set_attr(
        node,
        Attr::Transform,
        format!("translate({} {})", mark.pos.x, mark.pos.y),
    );
}

fn set_symbol(mark: &Mark, node: NodeId, tree: &mut NodeTree) {
    if let (Geometry::Circle { symbol, .. }, Some(text)) = (&mark.geometry, symbol_node(node, tree)) {
        tree.set_text(text, symbol.as_deref().unwrap_or_default());
    }
}

fn set_symbol_color(mark: &Mark, node: NodeId, tree: &mut NodeTree) {
    if let (Geometry::Circle { symbol_color, .. }, Some(text)) =
        (&mark.geometry, symbol_node(node, tree))
    {
        let color = symbol_color.clone().unwrap_or_else(|| "currentColor".to_string());
        tree.set_attr(text, Attr::Fill, color);
    }
}

pub(super) const BINDINGS: [Binding; 3] = [
    Binding::joint(&[FieldPath::PosX, FieldPath::PosY], set_transform),
    Binding::field(FieldPath::Symbol, set_symbol),
    Binding::field(FieldPath::SymbolColor, set_symbol_color),
];

pub(super) fn hit_test(center: Point, point: Point, tolerance: f64) -> bool {
    center.distance(point) <= CIRCLE_RADIUS + tolerance
}
