//! Click-by-click polygon drawing.
//!
//! The first click creates a one-point polygon and shows a closing dot at the
//! start; each later click appends a point, and a click on the dot completes
//! the polygon. The lasso holds `Status::NewPolygon` for its whole lifetime,
//! across several pointer presses.

use crate::editor::{MarkerCore, MarkerHost};
use crate::geometry::subtract_point;
use crate::marks::{Geometry, MarkKey, ShapeKind};
use crate::status::Release;
use kurbo::Point;

/// A polygon being drawn.
#[derive(Debug)]
pub struct Lasso {
    key: MarkKey,
    /// First click, surface coordinates.
    anchor: Point,
    release: Release,
}

impl Lasso {
    /// Create the polygon mark at `point` (surface coordinates).
    ///
    /// Gives the lock back and returns `None` if the mark can't be added.
    pub(crate) fn begin<H: MarkerHost>(
        core: &mut MarkerCore<H>,
        key: MarkKey,
        release: Release,
        point: Point,
    ) -> Option<Self> {
        let mut mark = core.defaults.new_mark(ShapeKind::Polygon, point);
        mark.key = key.clone();
        mark.geometry = Geometry::Polygon {
            points: vec![Point::ZERO],
        };
        if let Err(err) = core.scene.add_mark_silently(mark) {
            log::warn!("Cannot start polygon: {}", err);
            core.lock.release(release);
            return None;
        }
        core.scene.show_close_dot(point, core.config.close_radius);
        log::debug!("Started polygon {}", key);
        Some(Self {
            key,
            anchor: point,
            release,
        })
    }

    pub fn key(&self) -> &MarkKey {
        &self.key
    }

    pub fn anchor(&self) -> Point {
        self.anchor
    }

    /// Handle a further click; returns the lasso while it is still open.
    pub(crate) fn click<H: MarkerHost>(self, core: &mut MarkerCore<H>, point: Point) -> Option<Self> {
        if point.distance(self.anchor) <= core.config.close_radius {
            self.finish(core);
            return None;
        }

        let Some(mark) = core.scene.mark(self.key.as_str()) else {
            log::warn!("Polygon {} vanished while drawing", self.key);
            self.abort(core);
            return None;
        };
        let Geometry::Polygon { points } = &mark.geometry else {
            log::warn!("Polygon {} changed shape while drawing", self.key);
            self.abort(core);
            return None;
        };

        let mut points = points.clone();
        points.push(subtract_point(point, mark.pos));
        let candidate = mark.with_geometry(Geometry::Polygon { points });
        if let Err(err) = core.scene.update_mark(candidate) {
            log::warn!("Cannot extend polygon {}: {}", self.key, err);
            self.abort(core);
            return None;
        }
        Some(self)
    }

    /// Complete the polygon, notify the host and select it.
    fn finish<H: MarkerHost>(self, core: &mut MarkerCore<H>) {
        core.scene.hide_close_dot();
        core.lock.release(self.release);
        log::debug!("Closed polygon {}", self.key);
        if core.notify_creation(&self.key) {
            if let Err(err) = core.select_and_notify(&self.key) {
                log::warn!("Cannot select polygon {}: {}", self.key, err);
            }
        }
    }

    /// Stop drawing without completing; the partial mark is left as is.
    pub(crate) fn abort<H: MarkerHost>(self, core: &mut MarkerCore<H>) {
        core.scene.hide_close_dot();
        core.lock.release(self.release);
    }
}
