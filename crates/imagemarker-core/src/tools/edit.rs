//! Group edit procedures: move, resize, endpoint drag, and draw-new.

use crate::editor::{MarkerCore, MarkerHost};
use crate::geometry::{delta, rect_from_points};
use crate::gesture::Procedure;
use crate::input::PointerEvent;
use crate::marks::{Geometry, Mark, MarkKey, ShapeKind};
use crate::scene::{NodeId, Scene};
use crate::status::{Release, Status};
use kurbo::Point;

/// How a drag reshapes the mark being edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditKind {
    /// `pos = start.pos + delta`.
    Move,
    /// Rectangle spanned by the press point and the pointer.
    Resize,
    /// `end = delta`, for lines and waves.
    Endpoint,
}

impl EditKind {
    /// Edit that follows drawing a new mark of `shape`.
    ///
    /// Polygons are drawn click by click and have none.
    pub fn for_new(shape: ShapeKind) -> Option<Self> {
        match shape {
            ShapeKind::Rectangle => Some(EditKind::Resize),
            ShapeKind::Circle => Some(EditKind::Move),
            ShapeKind::Line | ShapeKind::Wave => Some(EditKind::Endpoint),
            ShapeKind::Polygon => None,
        }
    }

    /// Candidate mark for a pointer at `current`, pressed at `origin`.
    ///
    /// Edits that don't apply to the mark's shape leave it unchanged.
    pub fn apply(self, start: &Mark, origin: Point, current: Point) -> Mark {
        let delta = delta(origin, current);
        match (self, &start.geometry) {
            (EditKind::Move, _) => start.moved_to(start.pos + delta),
            (EditKind::Resize, Geometry::Rectangle { .. }) => {
                let rect = rect_from_points(origin, current);
                let mut mark = start.with_geometry(Geometry::Rectangle {
                    width: rect.width(),
                    height: rect.height(),
                });
                mark.pos = rect.origin();
                mark
            }
            (EditKind::Endpoint, Geometry::Line { .. }) => {
                start.with_geometry(Geometry::Line { end: delta.to_point() })
            }
            (EditKind::Endpoint, Geometry::Wave { .. }) => {
                start.with_geometry(Geometry::Wave { end: delta.to_point() })
            }
            _ => start.clone(),
        }
    }
}

/// Per-gesture state of an edit.
#[derive(Debug, Clone, PartialEq)]
pub struct EditState {
    /// Press point, surface coordinates.
    pub origin: Point,
    /// The mark as it was when the press happened.
    pub start: Mark,
    /// Root node of the group being edited.
    pub root: NodeId,
}

impl EditState {
    /// Whether the group pressed on is still the one live under its key.
    ///
    /// A mark removed and re-added with the same key gets a new group.
    pub fn is_current(&self, scene: &Scene) -> bool {
        scene
            .group(self.start.key.as_str())
            .is_some_and(|group| group.nodes.root == self.root)
    }
}

fn is_current(scene: &Scene, acc: &Option<EditState>) -> bool {
    acc.as_ref().is_some_and(|state| state.is_current(scene))
}

/// Reshape one mark while the pointer is held.
///
/// Holds no lock of its own; the procedure wrapping it owns the status.
#[derive(Debug, Clone)]
pub struct EditGroup {
    key: MarkKey,
    kind: EditKind,
}

impl EditGroup {
    pub fn new(key: MarkKey, kind: EditKind) -> Self {
        Self { key, kind }
    }

    pub fn key(&self) -> &MarkKey {
        &self.key
    }

    pub fn kind(&self) -> EditKind {
        self.kind
    }
}

impl<H: MarkerHost> Procedure<MarkerCore<H>> for EditGroup {
    type Acc = Option<EditState>;

    fn start(&mut self, core: &mut MarkerCore<H>, event: &PointerEvent) -> Self::Acc {
        let Some(group) = core.scene.group(self.key.as_str()) else {
            log::warn!("Cannot edit {}: mark no longer exists", self.key);
            return None;
        };
        Some(EditState {
            origin: core.to_surface(event.position),
            start: group.mark.clone(),
            root: group.nodes.root,
        })
    }

    fn moved(&mut self, core: &mut MarkerCore<H>, event: &PointerEvent, acc: Self::Acc) -> Self::Acc {
        if !is_current(&core.scene, &acc) {
            if acc.is_some() {
                log::warn!("Dropping edit of {}: mark was removed", self.key);
            }
            return None;
        }
        if let Some(state) = &acc {
            let candidate = self
                .kind
                .apply(&state.start, state.origin, core.to_surface(event.position));
            if let Err(err) = core.scene.update_mark(candidate) {
                log::warn!("Skipping {:?} step for {}: {}", self.kind, self.key, err);
            }
        }
        acc
    }

    fn stop(self, _: &mut MarkerCore<H>, _: &PointerEvent, _: Self::Acc) {}
}

/// Drag an existing, unlocked mark.
///
/// The mark is foregrounded silently on press and selected (with
/// notification) on release.
#[derive(Debug)]
pub struct MoveMark {
    edit: EditGroup,
    release: Release,
}

impl MoveMark {
    /// `release` must come from acquiring [`Status::MoveGroup`].
    pub fn new(key: MarkKey, release: Release) -> Self {
        Self {
            edit: EditGroup::new(key, EditKind::Move),
            release,
        }
    }
}

impl<H: MarkerHost> Procedure<MarkerCore<H>> for MoveMark {
    type Acc = Option<EditState>;

    fn start(&mut self, core: &mut MarkerCore<H>, event: &PointerEvent) -> Self::Acc {
        if let Err(err) = core.force_select_silently(self.edit.key()) {
            log::warn!("Cannot foreground {}: {}", self.edit.key(), err);
        }
        self.edit.start(core, event)
    }

    fn moved(&mut self, core: &mut MarkerCore<H>, event: &PointerEvent, acc: Self::Acc) -> Self::Acc {
        self.edit.moved(core, event, acc)
    }

    fn stop(self, core: &mut MarkerCore<H>, event: &PointerEvent, acc: Self::Acc) {
        let key = self.edit.key().clone();
        let current = is_current(&core.scene, &acc);
        self.edit.stop(core, event, acc);
        core.lock.release(self.release);
        if !current {
            log::debug!("Move of {} ended after the mark was removed", key);
            return;
        }
        if let Err(err) = core.select_and_notify(&key) {
            log::warn!("Cannot select {} after move: {}", key, err);
        }
    }
}

/// Create a mark at the press point and edit it until release.
///
/// Runs under [`Status::DrawNew`], switching to [`Status::EditGroup`] once the
/// mark exists. On release the host is told about the creation and the new
/// mark is selected.
#[derive(Debug)]
pub struct DrawNew {
    shape: ShapeKind,
    release: Release,
    edit: Option<EditGroup>,
}

impl DrawNew {
    /// `release` must come from acquiring [`Status::DrawNew`].
    pub fn new(shape: ShapeKind, release: Release) -> Self {
        Self {
            shape,
            release,
            edit: None,
        }
    }
}

impl<H: MarkerHost> Procedure<MarkerCore<H>> for DrawNew {
    type Acc = Option<EditState>;

    fn start(&mut self, core: &mut MarkerCore<H>, event: &PointerEvent) -> Self::Acc {
        let Some(kind) = EditKind::for_new(self.shape) else {
            log::warn!("{} marks cannot be drawn by dragging", self.shape);
            return None;
        };
        let mark = core.defaults.new_mark(self.shape, core.to_surface(event.position));
        let key = mark.key.clone();
        if let Err(err) = core.scene.add_mark_silently(mark) {
            log::warn!("Cannot draw new {}: {}", self.shape, err);
            return None;
        }
        core.lock
            .transition(&self.release, Status::EditGroup { key: key.clone() });

        let mut edit = EditGroup::new(key, kind);
        let acc = edit.start(core, event);
        self.edit = Some(edit);
        acc
    }

    fn moved(&mut self, core: &mut MarkerCore<H>, event: &PointerEvent, acc: Self::Acc) -> Self::Acc {
        match &mut self.edit {
            Some(edit) => edit.moved(core, event, acc),
            None => acc,
        }
    }

    fn stop(self, core: &mut MarkerCore<H>, event: &PointerEvent, acc: Self::Acc) {
        core.lock.release(self.release);
        let Some(edit) = self.edit else {
            return;
        };
        let key = edit.key().clone();
        let current = is_current(&core.scene, &acc);
        edit.stop(core, event, acc);
        if !current || !core.notify_creation(&key) {
            log::warn!("New mark {} vanished before it was completed", key);
            return;
        }
        if let Err(err) = core.select_and_notify(&key) {
            log::warn!("Cannot select new mark {}: {}", key, err);
        }
    }
}
