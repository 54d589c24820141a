//! The host-facing editor.
//!
//! [`ImageMarker`] owns the scene, the status lock, the camera and the pointer
//! surface. Hosts drive it with [`ImageMarker::handle_pointer`] and the mark
//! operations, and hear back through [`MarkerHost`].

use crate::camera::Camera;
use crate::config::EditorConfig;
use crate::error::{EditorError, EditorResult};
use crate::gesture::PointerSurface;
use crate::input::{ButtonClass, Phase, PointerEvent, PointerInput};
use crate::marks::{Change, Mark, MarkKey, ShapeKind};
use crate::page::{BackgroundImage, ImageLoader};
use crate::scene::{Mutation, Scene};
use crate::status::{Status, StatusLock};
use crate::tools::{DownAction, DrawNew, Lasso, Mode, MoveMark, PanView, SelectLocked};
use kurbo::Point;
use std::collections::HashSet;

/// Callbacks from the editor to its host.
pub trait MarkerHost {
    /// A mark was created, by drawing or through [`ImageMarker::add_mark`].
    fn on_creation(&mut self, _mark: &Mark) {}

    /// The selection changed; `None` when cleared.
    fn on_selection(&mut self, _mark: Option<&Mark>) {}
}

/// Host that ignores every callback.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHost;

impl MarkerHost for NoopHost {}

/// Styling and shape used for newly drawn marks.
#[derive(Debug, Clone, PartialEq)]
pub struct Defaults {
    pub color: String,
    pub selected_color: String,
    pub shape: ShapeKind,
}

impl Defaults {
    pub fn from_config(config: &EditorConfig) -> Self {
        Self {
            color: config.default_color.clone(),
            selected_color: config.default_selected_color.clone(),
            shape: config.default_shape,
        }
    }

    /// A fresh mark of `shape` at `pos` with these defaults.
    pub fn new_mark(&self, shape: ShapeKind, pos: Point) -> Mark {
        let mut mark = Mark::new(pos, shape.default_geometry());
        mark.color = self.color.clone();
        mark.selected_color = self.selected_color.clone();
        mark
    }
}

/// Editor state reachable from gesture procedures.
pub struct MarkerCore<H> {
    pub(crate) scene: Scene,
    pub(crate) lock: StatusLock,
    pub(crate) camera: Camera,
    pub(crate) config: EditorConfig,
    pub(crate) defaults: Defaults,
    pub(crate) mode: Mode,
    pub(crate) page: Option<BackgroundImage>,
    pub(crate) lasso: Option<Lasso>,
    pub(crate) host: H,
}

impl<H: MarkerHost> MarkerCore<H> {
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Client → surface coordinates.
    pub(crate) fn to_surface(&self, client: Point) -> Point {
        self.camera.screen_to_world(client)
    }

    /// Tell the host about a created mark. Returns `false` if it is gone.
    pub(crate) fn notify_creation(&mut self, key: &MarkKey) -> bool {
        match self.scene.mark(key.as_str()) {
            Some(mark) => {
                log::debug!("Created {} mark {}", mark.shape(), key);
                self.host.on_creation(mark);
                true
            }
            None => false,
        }
    }

    pub(crate) fn force_select_silently(&mut self, key: &MarkKey) -> EditorResult<()> {
        self.scene.select(key.as_str()).map(|_| ())
    }

    pub(crate) fn select_and_notify(&mut self, key: &MarkKey) -> EditorResult<()> {
        let mark = self.scene.select(key.as_str())?;
        self.host.on_selection(Some(mark));
        Ok(())
    }

    pub(crate) fn deselect_and_notify(&mut self) {
        self.scene.deselect();
        self.host.on_selection(None);
    }

    fn abort_lasso(&mut self) {
        if let Some(lasso) = self.lasso.take() {
            log::debug!("Abandoning polygon {}", lasso.key());
            lasso.abort(self);
        }
    }
}

/// An image annotation editor bound to one host.
pub struct ImageMarker<H: MarkerHost + 'static = NoopHost> {
    core: MarkerCore<H>,
    surface: PointerSurface<MarkerCore<H>>,
}

impl<H: MarkerHost + 'static> ImageMarker<H> {
    /// Create an editor with no page shown.
    pub fn new(config: EditorConfig, host: H) -> EditorResult<Self> {
        config.validate()?;
        let core = MarkerCore {
            scene: Scene::new(),
            lock: StatusLock::new(),
            camera: Camera::with_limits(config.min_zoom, config.max_zoom),
            defaults: Defaults::from_config(&config),
            mode: Mode::default(),
            page: None,
            lasso: None,
            config,
            host,
        };
        Ok(Self {
            core,
            surface: PointerSurface::new(),
        })
    }

    /// Load `source` as the page image and replace all marks with `marks`.
    ///
    /// `page_number`, when given, prefixes every label. Pan and zoom are reset. If the image can't be loaded, or `marks` is
    /// not a valid set, the editor is left untouched.
    pub async fn show_page(
        &mut self,
        loader: &dyn ImageLoader,
        page_number: Option<u32>,
        source: &str,
        marks: Vec<Mark>,
    ) -> EditorResult<()> {
        let mut keys = HashSet::new();
        if let Some(mark) = marks.iter().find(|mark| !keys.insert(mark.key.clone())) {
            return Err(EditorError::DuplicateKey(mark.key.to_string()));
        }
        let page = loader.load(source).await?;

        self.core.abort_lasso();
        self.core.scene.clear();
        self.core.scene.set_page_number(page_number);
        self.core.scene.set_background(&page.source, page.size);
        self.core.camera.reset();
        for mark in marks {
            self.core.scene.add_mark_silently(mark)?;
        }
        log::info!(
            "Showing page {} with {} marks",
            page.source,
            self.core.scene.len()
        );
        self.core.page = Some(page);
        Ok(())
    }

    /// Add a mark and report it through `on_creation`.
    pub fn add_mark(&mut self, mark: Mark) -> EditorResult<()> {
        let key = mark.key.clone();
        self.add_mark_silently(mark)?;
        self.core.notify_creation(&key);
        Ok(())
    }

    pub fn add_mark_silently(&mut self, mark: Mark) -> EditorResult<()> {
        self.core.scene.add_mark_silently(mark)
    }

    /// Remove a mark. The host is not notified, even if it was selected.
    pub fn remove_mark(&mut self, key: &str) -> EditorResult<Mark> {
        if self.core.lasso.as_ref().is_some_and(|lasso| lasso.key().as_str() == key) {
            self.core.abort_lasso();
        }
        self.core.scene.remove_mark(key)
    }

    /// Re-render a mark from a new record with the same key.
    pub fn update_mark(&mut self, mark: Mark) -> EditorResult<Vec<Change>> {
        self.core.scene.update_mark(mark)
    }

    /// Select a mark, or clear the selection with `None`.
    pub fn select_mark(&mut self, key: Option<&str>) -> EditorResult<()> {
        match key {
            Some(key) => self.core.select_and_notify(&MarkKey::new(key)),
            None => {
                self.core.deselect_and_notify();
                Ok(())
            }
        }
    }

    /// Select a mark without notifying the host.
    pub fn force_select_silently(&mut self, key: &str) -> EditorResult<()> {
        self.core.force_select_silently(&MarkKey::new(key))
    }

    pub fn set_default_color(&mut self, color: impl Into<String>) {
        self.core.defaults.color = color.into();
    }

    pub fn set_default_selected_color(&mut self, color: impl Into<String>) {
        self.core.defaults.selected_color = color.into();
    }

    /// Set the shape drawn in draw mode, by name.
    pub fn set_default_shape(&mut self, shape: &str) -> EditorResult<()> {
        self.core.defaults.shape = shape.parse()?;
        Ok(())
    }

    pub fn set_zoom_level(&mut self, scale: f64) -> EditorResult<()> {
        self.core.camera.set_scale(scale)
    }

    /// Zoom so the whole page fits the container. No-op without a page.
    pub fn fit_to_page(&mut self) {
        if let Some(page) = &self.core.page {
            self.core
                .camera
                .fit_to_size(page.size, self.core.config.container_size);
        }
    }

    pub fn draw_mode(&mut self) {
        self.core.mode = Mode::Draw;
    }

    pub fn scroll_mode(&mut self) {
        self.core.mode = Mode::Scroll;
    }

    /// Feed one raw pointer input.
    pub fn handle_pointer(&mut self, input: &PointerInput) {
        let event = input.normalize();
        match event.phase {
            Phase::Down => self.pointer_down(&event),
            Phase::Move | Phase::Up => {
                self.surface.dispatch(&mut self.core, &event);
            }
        }
    }

    fn pointer_down(&mut self, event: &PointerEvent) {
        let point = self.core.to_surface(event.position);
        match event.class {
            None => {}
            Some(ButtonClass::Secondary) => self.start_pan(event),
            Some(ButtonClass::Primary) => {
                if let Some(lasso) = self.core.lasso.take() {
                    self.core.lasso = lasso.click(&mut self.core, point);
                    return;
                }

                let hit = self
                    .core
                    .scene
                    .mark_at(point, self.core.config.hit_tolerance)
                    .map(|mark| (mark.key.clone(), mark.locked));
                match hit {
                    Some((key, true)) => {
                        if let Some(release) = self.core.lock.try_acquire(Status::Selecting { key: key.clone() }) {
                            let procedure = SelectLocked::new(key, release);
                            self.surface
                                .follow_pointer_down(&mut self.core, procedure, ButtonClass::Primary, event);
                        }
                    }
                    Some((key, false)) => {
                        if let Some(release) = self.core.lock.try_acquire(Status::MoveGroup { key: key.clone() }) {
                            let procedure = MoveMark::new(key, release);
                            self.surface
                                .follow_pointer_down(&mut self.core, procedure, ButtonClass::Primary, event);
                        }
                    }
                    None => self.down_on_surface(event, point),
                }
            }
        }
    }

    fn down_on_surface(&mut self, event: &PointerEvent, point: Point) {
        match DownAction::resolve(self.core.mode, self.core.defaults.shape) {
            DownAction::DrawNew(shape) => {
                if let Some(release) = self.core.lock.try_acquire(Status::DrawNew { shape }) {
                    let procedure = DrawNew::new(shape, release);
                    self.surface
                        .follow_pointer_down(&mut self.core, procedure, ButtonClass::Primary, event);
                }
            }
            DownAction::Lasso => {
                let key = MarkKey::generate();
                if let Some(release) = self.core.lock.try_acquire(Status::NewPolygon { key: key.clone() }) {
                    self.core.lasso = Lasso::begin(&mut self.core, key, release, point);
                }
            }
            DownAction::Pan => self.start_pan(event),
        }
    }

    fn start_pan(&mut self, event: &PointerEvent) {
        let Some(class) = event.class else {
            return;
        };
        if let Some(release) = self.core.lock.try_acquire(Status::MovingView) {
            self.surface
                .follow_pointer_down(&mut self.core, PanView::new(release), class, event);
        }
    }

    pub fn mark(&self, key: &str) -> Option<&Mark> {
        self.core.scene.mark(key)
    }

    /// Live marks in insertion order.
    pub fn marks(&self) -> impl Iterator<Item = &Mark> {
        self.core.scene.marks()
    }

    pub fn selected(&self) -> Option<&Mark> {
        self.core
            .scene
            .selected()
            .and_then(|key| self.core.scene.mark(key.as_str()))
    }

    pub fn scene(&self) -> &Scene {
        &self.core.scene
    }

    /// Drain the node mutations recorded since the last call.
    pub fn take_journal(&mut self) -> Vec<Mutation> {
        self.core.scene.take_journal()
    }

    pub fn status(&self) -> &Status {
        self.core.lock.current()
    }

    pub fn camera(&self) -> &Camera {
        &self.core.camera
    }

    pub fn mode(&self) -> Mode {
        self.core.mode
    }

    pub fn defaults(&self) -> &Defaults {
        &self.core.defaults
    }

    pub fn config(&self) -> &EditorConfig {
        &self.core.config
    }

    pub fn page(&self) -> Option<&BackgroundImage> {
        self.core.page.as_ref()
    }

    pub fn pointer_surface(&self) -> &PointerSurface<MarkerCore<H>> {
        &self.surface
    }

    pub fn host(&self) -> &H {
        &self.core.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.core.host
    }
}
