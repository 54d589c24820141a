//! Editor configuration.

use crate::error::{EditorError, EditorResult};
use crate::marks::{DEFAULT_COLOR, DEFAULT_SELECTED_COLOR, ShapeKind};
use kurbo::Size;
use serde::{Deserialize, Serialize};

/// Creation defaults and interaction tuning for one editor instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditorConfig {
    /// Fill color of newly drawn marks.
    pub default_color: String,
    /// Selected fill color of newly drawn marks.
    pub default_selected_color: String,
    /// Shape drawn in draw mode.
    pub default_shape: ShapeKind,
    /// Size of the container the page is shown in, in client pixels.
    pub container_size: Size,
    /// Extra distance (surface units) within which a click still hits a mark.
    pub hit_tolerance: f64,
    /// Radius of the lasso closing dot.
    pub close_radius: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            default_color: DEFAULT_COLOR.to_string(),
            default_selected_color: DEFAULT_SELECTED_COLOR.to_string(),
            default_shape: ShapeKind::default(),
            container_size: Size::new(800.0, 600.0),
            hit_tolerance: 2.0,
            close_radius: 5.0,
            min_zoom: 0.05,
            max_zoom: 20.0,
        }
    }
}

impl EditorConfig {
    /// Parse and validate a JSON configuration.
    pub fn from_json(json: &str) -> EditorResult<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| EditorError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> EditorResult<()> {
        let non_negative = |name: &str, value: f64| {
            if value.is_finite() && value >= 0.0 {
                Ok(())
            } else {
                Err(EditorError::Config(format!("{name} must be a non-negative number, got {value}")))
            }
        };
        non_negative("hitTolerance", self.hit_tolerance)?;
        non_negative("closeRadius", self.close_radius)?;
        non_negative("containerSize.width", self.container_size.width)?;
        non_negative("containerSize.height", self.container_size.height)?;

        if !(self.min_zoom.is_finite() && self.min_zoom > 0.0) {
            return Err(EditorError::Config(format!(
                "minZoom must be positive, got {}",
                self.min_zoom
            )));
        }
        if !self.max_zoom.is_finite() || self.max_zoom < self.min_zoom {
            return Err(EditorError::Config(format!(
                "maxZoom ({}) must not be below minZoom ({})",
                self.max_zoom, self.min_zoom
            )));
        }
        if self.default_color.is_empty() || self.default_selected_color.is_empty() {
            return Err(EditorError::Config("default colors must not be empty".to_string()));
        }
        Ok(())
    }
}
