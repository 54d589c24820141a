//! Interaction modes and the gesture procedures they start.

mod edit;
mod lasso;
mod select;
mod view;

pub use edit::{DrawNew, EditGroup, EditKind, EditState, MoveMark};
pub use lasso::Lasso;
pub use select::SelectLocked;
pub use view::{PanState, PanView};

use crate::marks::ShapeKind;
use serde::{Deserialize, Serialize};

/// What a primary press on empty surface does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Draw a new mark of the default shape.
    #[default]
    Draw,
    /// Scroll the view.
    Scroll,
}

/// Action chosen for a pointer-down that hit no mark.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownAction {
    /// Create a mark of this shape and edit it while the button is held.
    DrawNew(ShapeKind),
    /// Start a click-by-click polygon.
    Lasso,
    /// Pan the view.
    Pan,
}

impl DownAction {
    /// Resolve the action for `mode` with `shape` as the default shape.
    pub fn resolve(mode: Mode, shape: ShapeKind) -> Self {
        match (mode, shape) {
            (Mode::Draw, ShapeKind::Polygon) => DownAction::Lasso,
            (Mode::Draw, shape) => DownAction::DrawNew(shape),
            (Mode::Scroll, _) => DownAction::Pan,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve() {
        assert_eq!(DownAction::resolve(Mode::Draw, ShapeKind::Polygon), DownAction::Lasso);
        assert_eq!(
            DownAction::resolve(Mode::Draw, ShapeKind::Wave),
            DownAction::DrawNew(ShapeKind::Wave)
        );
        for shape in ShapeKind::ALL {
            assert_eq!(DownAction::resolve(Mode::Scroll, shape), DownAction::Pan);
        }
    }
}
