//! Canvas scale and scroll offset.

use crate::error::{EditorError, EditorResult};
use kurbo::{Affine, Point, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Camera maps between client coordinates (where pointer events arrive) and
/// surface coordinates (where marks live).
///
/// The scroll offset is in client pixels; the scale is applied first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    /// Current translation offset (scroll)
    pub offset: Vec2,
    /// Current scale, 1.0 = one image pixel per client pixel
    pub scale: f64,
    /// Minimum scale reachable through fit-to-page
    pub min_scale: f64,
    /// Maximum scale reachable through fit-to-page
    pub max_scale: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            offset: Vec2::ZERO,
            scale: 1.0,
            min_scale: 0.05,
            max_scale: 20.0,
        }
    }
}

impl Camera {
    pub fn new() -> Self {
        Self::default()
    }

    /// Camera with a custom fit range.
    pub fn with_limits(min_scale: f64, max_scale: f64) -> Self {
        Self {
            min_scale,
            max_scale,
            ..Self::default()
        }
    }

    /// Surface → client transform.
    pub fn transform(&self) -> Affine {
        Affine::translate(self.offset) * Affine::scale(self.scale)
    }

    /// Client → surface transform.
    pub fn inverse_transform(&self) -> Affine {
        Affine::scale(1.0 / self.scale) * Affine::translate(-self.offset)
    }

    pub fn screen_to_world(&self, screen_point: Point) -> Point {
        self.inverse_transform() * screen_point
    }

    pub fn world_to_screen(&self, world_point: Point) -> Point {
        self.transform() * world_point
    }

    /// Scroll by a delta in client coordinates.
    pub fn pan(&mut self, delta: Vec2) {
        self.offset += delta;
    }

    /// Set the scale explicitly.
    ///
    /// Host-requested scales are not clamped, only checked.
    pub fn set_scale(&mut self, scale: f64) -> EditorResult<()> {
        if !scale.is_finite() || scale <= 0.0 {
            return Err(EditorError::InvalidScale(scale));
        }
        self.scale = scale;
        Ok(())
    }

    /// Back to scale 1 with no scroll.
    pub fn reset(&mut self) {
        self.offset = Vec2::ZERO;
        self.scale = 1.0;
    }

    /// Scale `content` to fit entirely inside `viewport` and scroll to the
    /// top-left corner.
    pub fn fit_to_size(&mut self, content: Size, viewport: Size) {
        if content.is_zero_area() || viewport.is_zero_area() {
            self.reset();
            return;
        }

        let scale_x = viewport.width / content.width;
        let scale_y = viewport.height / content.height;
        self.scale = scale_x.min(scale_y).clamp(self.min_scale, self.max_scale);
        self.offset = Vec2::ZERO;
    }
}
