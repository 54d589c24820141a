//! Shape dispatch: node construction, bindings, defaults and hit testing.
//!
//! Every mark shape resolves, through a match over [`ShapeKind`], to:
//! - a constructor for its drawable node,
//! - an ordered binding list (common shape bindings, then its own),
//! - the default geometry used when a new mark of that shape is drawn.
//!
//! The label node and the group root have their own shape-invariant binding
//! lists, so a shape change only ever rebuilds the shape node.

pub mod binding;
mod circle;
mod line;
mod polygon;
mod rectangle;

pub use binding::{Binding, Requires, apply_all, apply_changed};
pub use circle::CIRCLE_RADIUS;
pub use line::{WAVE_AMPLITUDE, WAVE_LENGTH, wave_path};

use crate::marks::{FieldPath, Geometry, Mark, ShapeKind};
use crate::scene::{Attr, NodeId, NodeKind, NodeTree};
use kurbo::Point;

/// Class set on the group root of the selected mark.
pub const ACTIVE_CLASS: &str = "active";
/// Class set on the group root of locked marks.
pub const LOCKED_CLASS: &str = "locked";

impl ShapeKind {
    /// Build the (detached) shape node for this shape.
    pub fn build(self, tree: &mut NodeTree) -> NodeId {
        match self {
            ShapeKind::Rectangle => rectangle::build(tree),
            ShapeKind::Circle => circle::build(tree),
            ShapeKind::Polygon => polygon::build(tree),
            ShapeKind::Line => line::build_line(tree),
            ShapeKind::Wave => line::build_wave(tree),
        }
    }

    /// Ordered bindings for the shape node.
    pub fn bindings(self) -> Vec<Binding> {
        let specific: &[Binding] = match self {
            ShapeKind::Rectangle => &rectangle::BINDINGS,
            ShapeKind::Circle => &circle::BINDINGS,
            ShapeKind::Polygon => &polygon::BINDINGS,
            ShapeKind::Line => &line::LINE_BINDINGS,
            ShapeKind::Wave => &line::WAVE_BINDINGS,
        };
        COMMON_BINDINGS.iter().chain(specific).copied().collect()
    }

    /// Shape fields of a freshly drawn mark.
    pub fn default_geometry(self) -> Geometry {
        match self {
            ShapeKind::Rectangle => Geometry::Rectangle {
                width: 0.0,
                height: 0.0,
            },
            ShapeKind::Circle => Geometry::Circle {
                symbol: None,
                symbol_color: None,
            },
            ShapeKind::Polygon => Geometry::Polygon { points: Vec::new() },
            ShapeKind::Line => Geometry::Line { end: Point::ZERO },
            ShapeKind::Wave => Geometry::Wave { end: Point::ZERO },
        }
    }
}

/// Whether `point` (surface coordinates) hits the mark's shape.
pub fn hit_test(mark: &Mark, point: Point, tolerance: f64) -> bool {
    match &mark.geometry {
        Geometry::Rectangle { width, height } => {
            rectangle::hit_test(mark.pos, *width, *height, point, tolerance)
        }
        Geometry::Circle { .. } => circle::hit_test(mark.pos, point, tolerance),
        Geometry::Polygon { points } => polygon::hit_test(mark.pos, points, point, tolerance),
        Geometry::Line { end } => line::hit_test(mark.pos, *end, point, tolerance),
        Geometry::Wave { end } => line::hit_test(mark.pos, *end, point, tolerance + WAVE_AMPLITUDE),
    }
}

fn set_fill(mark: &Mark, node: NodeId, tree: &mut NodeTree) {
    tree.set_attr(node, Attr::Fill, mark.color.as_str());
}

fn set_selected_fill(mark: &Mark, node: NodeId, tree: &mut NodeTree) {
    tree.set_attr(node, Attr::SelectedFill, mark.selected_color.as_str());
}

fn set_shape_class(mark: &Mark, node: NodeId, tree: &mut NodeTree) {
    tree.add_class(node, "shape");
    tree.add_class(node, mark.shape().name());
}

const COMMON_BINDINGS: [Binding; 3] = [
    Binding::field(FieldPath::Color, set_fill),
    Binding::field(FieldPath::SelectedColor, set_selected_fill),
    Binding::constant(set_shape_class),
];

/// Build the (detached) label node.
pub fn build_label(tree: &mut NodeTree) -> NodeId {
    tree.create(NodeKind::Text)
}

fn set_label_class(_: &Mark, node: NodeId, tree: &mut NodeTree) {
    tree.add_class(node, "label");
}

/// Text shown for `label` on page `page`.
///
/// Labels are prefixed with the page number, as in `3.A1`. An empty label
/// stays empty.
pub fn label_text(page: Option<u32>, label: &str) -> String {
    match page {
        Some(page) if !label.is_empty() => format!("{page}.{label}"),
        _ => label.to_string(),
    }
}

fn set_label_position(mark: &Mark, node: NodeId, tree: &mut NodeTree) {
    tree.set_attr(node, Attr::X, mark.pos.x);
    tree.set_attr(node, Attr::Y, mark.pos.y);
}

/// Bindings for the label node; identical for every shape.
///
/// The text itself depends on the page number and is written by the scene
/// with [`label_text`].
pub const LABEL_BINDINGS: [Binding; 2] = [
    Binding::constant(set_label_class),
    Binding::joint(&[FieldPath::PosX, FieldPath::PosY], set_label_position),
];

fn set_group_class(_: &Mark, node: NodeId, tree: &mut NodeTree) {
    tree.add_class(node, "mark");
}

fn set_locked_class(mark: &Mark, node: NodeId, tree: &mut NodeTree) {
    tree.toggle_class(node, LOCKED_CLASS, mark.locked);
}

/// Bindings for the group root node; identical for every shape.
pub const GROUP_BINDINGS: [Binding; 2] = [
    Binding::constant(set_group_class),
    Binding::field(FieldPath::Locked, set_locked_class),
];
