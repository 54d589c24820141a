//! The static field set of a mark, addressed by path.

use super::{Geometry, Mark, ShapeKind};
use kurbo::Point;
use std::fmt;

/// Location of a leaf value inside a mark record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldPath {
    Key,
    Shape,
    PosX,
    PosY,
    Color,
    SelectedColor,
    Label,
    Locked,
    Width,
    Height,
    /// The whole point list; never addressed per element.
    Polygon,
    EndX,
    EndY,
    Symbol,
    SymbolColor,
}

impl FieldPath {
    /// Path segments, e.g. `["pos", "x"]`.
    pub fn segments(self) -> &'static [&'static str] {
        match self {
            FieldPath::Key => &["key"],
            FieldPath::Shape => &["shape"],
            FieldPath::PosX => &["pos", "x"],
            FieldPath::PosY => &["pos", "y"],
            FieldPath::Color => &["color"],
            FieldPath::SelectedColor => &["selectedColor"],
            FieldPath::Label => &["label"],
            FieldPath::Locked => &["locked"],
            FieldPath::Width => &["width"],
            FieldPath::Height => &["height"],
            FieldPath::Polygon => &["polygon"],
            FieldPath::EndX => &["end", "x"],
            FieldPath::EndY => &["end", "y"],
            FieldPath::Symbol => &["symbol"],
            FieldPath::SymbolColor => &["symbolColor"],
        }
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments().join("."))
    }
}

/// Value stored at a [`FieldPath`].
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    OptionalText(Option<String>),
    Number(f64),
    Flag(bool),
    Shape(ShapeKind),
    Points(Vec<Point>),
}

const BASE_FIELDS: [FieldPath; 8] = [
    FieldPath::Key,
    FieldPath::Shape,
    FieldPath::PosX,
    FieldPath::PosY,
    FieldPath::Color,
    FieldPath::SelectedColor,
    FieldPath::Label,
    FieldPath::Locked,
];

impl Mark {
    /// Every leaf path this mark carries: base fields then shape fields.
    pub fn paths(&self) -> Vec<FieldPath> {
        let specific: &[FieldPath] = match self.geometry {
            Geometry::Rectangle { .. } => &[FieldPath::Width, FieldPath::Height],
            Geometry::Circle { .. } => &[FieldPath::Symbol, FieldPath::SymbolColor],
            Geometry::Polygon { .. } => &[FieldPath::Polygon],
            Geometry::Line { .. } | Geometry::Wave { .. } => &[FieldPath::EndX, FieldPath::EndY],
        };
        BASE_FIELDS.iter().chain(specific).copied().collect()
    }

    /// Value at `path`, or `None` when this mark's shape has no such field.
    pub fn field(&self, path: FieldPath) -> Option<FieldValue> {
        let value = match (path, &self.geometry) {
            (FieldPath::Key, _) => FieldValue::Text(self.key.to_string()),
            (FieldPath::Shape, _) => FieldValue::Shape(self.shape()),
            (FieldPath::PosX, _) => FieldValue::Number(self.pos.x),
            (FieldPath::PosY, _) => FieldValue::Number(self.pos.y),
            (FieldPath::Color, _) => FieldValue::Text(self.color.clone()),
            (FieldPath::SelectedColor, _) => FieldValue::Text(self.selected_color.clone()),
            (FieldPath::Label, _) => FieldValue::Text(self.label.clone()),
            (FieldPath::Locked, _) => FieldValue::Flag(self.locked),
            (FieldPath::Width, Geometry::Rectangle { width, .. }) => FieldValue::Number(*width),
            (FieldPath::Height, Geometry::Rectangle { height, .. }) => FieldValue::Number(*height),
            (FieldPath::Polygon, Geometry::Polygon { points }) => FieldValue::Points(points.clone()),
            (FieldPath::EndX, Geometry::Line { end } | Geometry::Wave { end }) => {
                FieldValue::Number(end.x)
            }
            (FieldPath::EndY, Geometry::Line { end } | Geometry::Wave { end }) => {
                FieldValue::Number(end.y)
            }
            (FieldPath::Symbol, Geometry::Circle { symbol, .. }) => {
                FieldValue::OptionalText(symbol.clone())
            }
            (FieldPath::SymbolColor, Geometry::Circle { symbol_color, .. }) => {
                FieldValue::OptionalText(symbol_color.clone())
            }
            _ => return None,
        };
        Some(value)
    }
}
