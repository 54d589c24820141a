use crate::editor::{MarkerCore, MarkerHost};
use crate::gesture::Procedure;
use crate::input::PointerEvent;
use crate::status::Release;
use kurbo::{Point, Vec2};

/// Scroll the view by dragging.
#[derive(Debug)]
pub struct PanView {
    release: Release,
}

/// Where the pan started, in client coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanState {
    pub origin: Point,
    pub offset: Vec2,
}

impl PanView {
    /// `release` must come from acquiring `Status::MovingView`.
    pub fn new(release: Release) -> Self {
        Self { release }
    }
}

impl<H: MarkerHost> Procedure<MarkerCore<H>> for PanView {
    type Acc = PanState;

    fn start(&mut self, core: &mut MarkerCore<H>, event: &PointerEvent) -> PanState {
        PanState {
            origin: event.position,
            offset: core.camera.offset,
        }
    }

    fn moved(&mut self, core: &mut MarkerCore<H>, event: &PointerEvent, acc: PanState) -> PanState {
        core.camera.offset = acc.offset + (event.position - acc.origin);
        acc
    }

    fn stop(self, core: &mut MarkerCore<H>, _: &PointerEvent, _: PanState) {
        core.lock.release(self.release);
    }
}
