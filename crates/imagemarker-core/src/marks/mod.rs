//! Mark records: the immutable data behind every annotation.

mod diff;
mod fields;

pub use diff::{Change, changed_paths, diff_paths};
pub use fields::{FieldPath, FieldValue};

use crate::error::{EditorError, EditorResult};
use kurbo::Point;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Fill color used when a mark doesn't specify one.
pub const DEFAULT_COLOR: &str = "#D8E5F4";
/// Selected fill color used when a mark doesn't specify one.
pub const DEFAULT_SELECTED_COLOR: &str = "#F4A460";

/// The closed set of mark shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    Rectangle,
    #[default]
    Circle,
    Polygon,
    Line,
    Wave,
}

impl ShapeKind {
    /// All shapes, in registration order.
    pub const ALL: [ShapeKind; 5] = [
        ShapeKind::Rectangle,
        ShapeKind::Circle,
        ShapeKind::Polygon,
        ShapeKind::Line,
        ShapeKind::Wave,
    ];

    /// Name used on the wire and in node classes.
    pub fn name(self) -> &'static str {
        match self {
            ShapeKind::Rectangle => "rectangle",
            ShapeKind::Circle => "circle",
            ShapeKind::Polygon => "polygon",
            ShapeKind::Line => "line",
            ShapeKind::Wave => "wave",
        }
    }
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ShapeKind {
    type Err = EditorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ShapeKind::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| EditorError::InvalidShape(s.to_string()))
    }
}

/// Unique identity of a mark for its whole lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MarkKey(String);

impl MarkKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Generate a fresh random key.
    pub fn generate() -> Self {
        Self(format!("mark{}", Uuid::new_v4().simple()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MarkKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for MarkKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for MarkKey {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

/// Shape-specific part of a mark.
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    /// `pos` is the top-left corner.
    Rectangle { width: f64, height: f64 },
    /// `pos` is the center.
    Circle {
        symbol: Option<String>,
        symbol_color: Option<String>,
    },
    /// Points are relative to `pos`.
    Polygon { points: Vec<Point> },
    /// `end` is relative to `pos`.
    Line { end: Point },
    /// `end` is relative to `pos`.
    Wave { end: Point },
}

impl Geometry {
    pub fn shape(&self) -> ShapeKind {
        match self {
            Geometry::Rectangle { .. } => ShapeKind::Rectangle,
            Geometry::Circle { .. } => ShapeKind::Circle,
            Geometry::Polygon { .. } => ShapeKind::Polygon,
            Geometry::Line { .. } => ShapeKind::Line,
            Geometry::Wave { .. } => ShapeKind::Wave,
        }
    }

    /// End offset for line-like shapes.
    pub fn end(&self) -> Option<Point> {
        match self {
            Geometry::Line { end } | Geometry::Wave { end } => Some(*end),
            _ => None,
        }
    }
}

/// One annotation on the page image.
#[derive(Debug, Clone, PartialEq)]
pub struct Mark {
    pub key: MarkKey,
    /// Anchor position; meaning depends on the shape.
    pub pos: Point,
    pub color: String,
    pub selected_color: String,
    /// Shown only while the mark is selected.
    pub label: String,
    /// Locked marks can be selected but not dragged.
    pub locked: bool,
    pub geometry: Geometry,
}

impl Mark {
    /// Create a mark with a generated key and default styling.
    pub fn new(pos: Point, geometry: Geometry) -> Self {
        Self {
            key: MarkKey::generate(),
            pos,
            color: DEFAULT_COLOR.to_string(),
            selected_color: DEFAULT_SELECTED_COLOR.to_string(),
            label: String::new(),
            locked: false,
            geometry,
        }
    }

    pub fn shape(&self) -> ShapeKind {
        self.geometry.shape()
    }

    /// Build the canonical mark for host-supplied data.
    ///
    /// Fields that don't belong to the shape are dropped; a missing
    /// shape-specific field is a contract fault.
    pub fn from_data(data: MarkData) -> EditorResult<Self> {
        let shape = match data.shape.as_deref() {
            Some(name) => name.parse()?,
            None => ShapeKind::default(),
        };
        let missing = |field| EditorError::MissingField {
            shape: shape.name(),
            field,
        };

        let geometry = match shape {
            ShapeKind::Rectangle => Geometry::Rectangle {
                width: data.width.ok_or_else(|| missing("width"))?,
                height: data.height.ok_or_else(|| missing("height"))?,
            },
            ShapeKind::Circle => Geometry::Circle {
                symbol: data.symbol,
                symbol_color: data.symbol_color,
            },
            ShapeKind::Polygon => Geometry::Polygon {
                points: data.polygon.ok_or_else(|| missing("polygon"))?,
            },
            ShapeKind::Line => Geometry::Line {
                end: data.end.ok_or_else(|| missing("end"))?,
            },
            ShapeKind::Wave => Geometry::Wave {
                end: data.end.ok_or_else(|| missing("end"))?,
            },
        };

        Ok(Self {
            key: data.key.map(MarkKey::new).unwrap_or_else(MarkKey::generate),
            pos: data.pos.unwrap_or(Point::ZERO),
            color: data.color.unwrap_or_else(|| DEFAULT_COLOR.to_string()),
            selected_color: data
                .selected_color
                .unwrap_or_else(|| DEFAULT_SELECTED_COLOR.to_string()),
            label: data.label.unwrap_or_default(),
            locked: data.locked.unwrap_or(false),
            geometry,
        })
    }

    /// Export the mark as host data.
    pub fn to_data(&self) -> MarkData {
        let mut data = MarkData {
            key: Some(self.key.to_string()),
            shape: Some(self.shape().name().to_string()),
            pos: Some(self.pos),
            color: Some(self.color.clone()),
            selected_color: Some(self.selected_color.clone()),
            label: Some(self.label.clone()),
            locked: Some(self.locked),
            ..MarkData::default()
        };
        match &self.geometry {
            Geometry::Rectangle { width, height } => {
                data.width = Some(*width);
                data.height = Some(*height);
            }
            Geometry::Circle {
                symbol,
                symbol_color,
            } => {
                data.symbol = symbol.clone();
                data.symbol_color = symbol_color.clone();
            }
            Geometry::Polygon { points } => data.polygon = Some(points.clone()),
            Geometry::Line { end } | Geometry::Wave { end } => data.end = Some(*end),
        }
        data
    }

    /// Copy of this mark at a new position.
    pub fn moved_to(&self, pos: Point) -> Self {
        Self {
            pos,
            ..self.clone()
        }
    }

    /// Copy of this mark with new geometry (and possibly a new shape).
    pub fn with_geometry(&self, geometry: Geometry) -> Self {
        Self {
            geometry,
            ..self.clone()
        }
    }
}

/// Wire form of a mark, as exchanged with the host.
///
/// Every field is optional on input; [`Mark::from_data`] fills defaults and
/// validates what the shape requires.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shape: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pos: Option<Point>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locked: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub polygon: Option<Vec<Point>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<Point>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol_color: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect_data() -> MarkData {
        MarkData {
            key: Some("r1".into()),
            shape: Some("rectangle".into()),
            pos: Some(Point::new(10.0, 10.0)),
            width: Some(5.0),
            height: Some(5.0),
            color: Some("#fff".into()),
            selected_color: Some("#000".into()),
            label: Some(String::new()),
            ..MarkData::default()
        }
    }

    #[test]
    fn test_from_data_rectangle() {
        let mark = Mark::from_data(rect_data()).unwrap();
        assert_eq!(mark.key.as_str(), "r1");
        assert_eq!(mark.shape(), ShapeKind::Rectangle);
        assert_eq!(
            mark.geometry,
            Geometry::Rectangle {
                width: 5.0,
                height: 5.0
            }
        );
    }

    #[test]
    fn test_canonicalization_is_idempotent() {
        let marks = [
            Mark::from_data(rect_data()).unwrap(),
            Mark::new(
                Point::new(1.0, 2.0),
                Geometry::Polygon {
                    points: vec![Point::ZERO, Point::new(3.0, 4.0)],
                },
            ),
            Mark::new(
                Point::ZERO,
                Geometry::Circle {
                    symbol: Some("x".into()),
                    symbol_color: None,
                },
            ),
            Mark::new(Point::ZERO, Geometry::Wave { end: Point::new(5.0, 0.0) }),
        ];
        for mark in marks {
            assert_eq!(Mark::from_data(mark.to_data()).unwrap(), mark);
        }
    }

    #[test]
    fn test_extraneous_fields_dropped() {
        let data = MarkData {
            shape: Some("circle".into()),
            width: Some(40.0),
            end: Some(Point::new(1.0, 1.0)),
            ..MarkData::default()
        };
        let exported = Mark::from_data(data).unwrap().to_data();
        assert_eq!(exported.width, None);
        assert_eq!(exported.end, None);
    }

    #[test]
    fn test_generated_key_when_absent() {
        let a = Mark::from_data(MarkData::default()).unwrap();
        let b = Mark::from_data(MarkData::default()).unwrap();
        assert!(a.key.as_str().starts_with("mark"));
        assert_ne!(a.key, b.key);
        assert_eq!(a.shape(), ShapeKind::Circle);
        assert_eq!(a.color, DEFAULT_COLOR);
    }

    #[test]
    fn test_invalid_shape_rejected() {
        let data = MarkData {
            shape: Some("hexagon".into()),
            ..MarkData::default()
        };
        assert_eq!(
            Mark::from_data(data),
            Err(EditorError::InvalidShape("hexagon".into()))
        );
    }

    #[test]
    fn test_missing_required_field() {
        let data = MarkData {
            shape: Some("line".into()),
            ..MarkData::default()
        };
        assert!(matches!(
            Mark::from_data(data),
            Err(EditorError::MissingField { field: "end", .. })
        ));
    }

    #[test]
    fn test_json_uses_camel_case() {
        let json = r##"{"shape":"circle","pos":{"x":1.0,"y":2.0},"selectedColor":"#123","symbolColor":"red"}"##;
        let data: MarkData = serde_json::from_str(json).unwrap();
        let mark = Mark::from_data(data).unwrap();
        assert_eq!(mark.selected_color, "#123");
        assert_eq!(mark.pos, Point::new(1.0, 2.0));
        let out = serde_json::to_string(&mark.to_data()).unwrap();
        assert!(out.contains("\"selectedColor\":\"#123\""));
        assert!(out.contains("\"symbolColor\":\"red\""));
    }
}
