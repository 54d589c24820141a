use crate::editor::{MarkerCore, MarkerHost};
use crate::gesture::Procedure;
use crate::input::PointerEvent;
use crate::marks::MarkKey;
use crate::scene::NodeId;
use crate::status::Release;

/// Click on a locked mark: nothing moves, the mark is selected on release.
#[derive(Debug)]
pub struct SelectLocked {
    key: MarkKey,
    release: Release,
}

impl SelectLocked {
    /// `release` must come from acquiring `Status::Selecting`.
    pub fn new(key: MarkKey, release: Release) -> Self {
        Self { key, release }
    }
}

impl<H: MarkerHost> Procedure<MarkerCore<H>> for SelectLocked {
    /// Root node of the pressed group.
    type Acc = Option<NodeId>;

    fn start(&mut self, core: &mut MarkerCore<H>, _: &PointerEvent) -> Self::Acc {
        core.scene
            .group(self.key.as_str())
            .map(|group| group.nodes.root)
    }

    fn moved(&mut self, _: &mut MarkerCore<H>, _: &PointerEvent, acc: Self::Acc) -> Self::Acc {
        acc
    }

    fn stop(self, core: &mut MarkerCore<H>, _: &PointerEvent, acc: Self::Acc) {
        core.lock.release(self.release);
        let live = core.scene.group(self.key.as_str()).map(|group| group.nodes.root);
        if acc.is_none() || live != acc {
            log::debug!("Not selecting {}: mark was removed", self.key);
            return;
        }
        if let Err(err) = core.select_and_notify(&self.key) {
            log::warn!("Cannot select {}: {}", self.key, err);
        }
    }
}
