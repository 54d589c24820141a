//! The single interactive-operation lock.
//!
//! At most one interactive operation (draw, edit, move, pan, lasso) runs at a
//! time. Acquisition fails closed: a second request while the lock is held is
//! dropped, not queued. Releasing restores the status that was current before
//! the acquisition.

use crate::marks::{MarkKey, ShapeKind};
use serde::Serialize;

/// The currently running interactive operation.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(tag = "name")]
pub enum Status {
    #[default]
    #[serde(rename = "idle")]
    Idle,
    #[serde(rename = "drawNew")]
    DrawNew { shape: ShapeKind },
    #[serde(rename = "editGroup")]
    EditGroup { key: MarkKey },
    #[serde(rename = "moveGroup")]
    MoveGroup { key: MarkKey },
    #[serde(rename = "moving-view")]
    MovingView,
    #[serde(rename = "selecting")]
    Selecting { key: MarkKey },
    #[serde(rename = "newPolygon")]
    NewPolygon { key: MarkKey },
}

impl Status {
    pub fn name(&self) -> &'static str {
        match self {
            Status::Idle => "idle",
            Status::DrawNew { .. } => "drawNew",
            Status::EditGroup { .. } => "editGroup",
            Status::MoveGroup { .. } => "moveGroup",
            Status::MovingView => "moving-view",
            Status::Selecting { .. } => "selecting",
            Status::NewPolygon { .. } => "newPolygon",
        }
    }

    /// The mark a group-scoped status refers to.
    pub fn group(&self) -> Option<&MarkKey> {
        match self {
            Status::EditGroup { key }
            | Status::MoveGroup { key }
            | Status::Selecting { key }
            | Status::NewPolygon { key } => Some(key),
            Status::Idle | Status::DrawNew { .. } | Status::MovingView => None,
        }
    }
}

/// Proof of a successful acquisition; consumed by [`StatusLock::release`].
#[derive(Debug, PartialEq, Eq)]
#[must_use = "dropping a Release keeps the lock held forever"]
pub struct Release {
    generation: u64,
}

#[derive(Debug, Clone, PartialEq)]
enum LockState {
    Free,
    Held { generation: u64, previous: Status },
}

/// Mutual exclusion over interactive operations, with depth-one rollback.
#[derive(Debug, Clone)]
pub struct StatusLock {
    current: Status,
    state: LockState,
    generation: u64,
}

impl Default for StatusLock {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusLock {
    pub fn new() -> Self {
        Self {
            current: Status::Idle,
            state: LockState::Free,
            generation: 0,
        }
    }

    pub fn current(&self) -> &Status {
        &self.current
    }

    pub fn is_held(&self) -> bool {
        matches!(self.state, LockState::Held { .. })
    }

    /// Whether `release` belongs to the acquisition currently holding the lock.
    pub fn holds(&self, release: &Release) -> bool {
        matches!(self.state, LockState::Held { generation, .. } if generation == release.generation)
    }

    /// Switch to `status`, or return `None` if another operation is running.
    pub fn try_acquire(&mut self, status: Status) -> Option<Release> {
        if let LockState::Held { .. } = self.state {
            log::debug!(
                "Status lock busy ({}), dropping {}",
                self.current.name(),
                status.name()
            );
            return None;
        }
        self.generation += 1;
        log::debug!("Status {} -> {}", self.current.name(), status.name());
        let previous = std::mem::replace(&mut self.current, status);
        self.state = LockState::Held {
            generation: self.generation,
            previous,
        };
        Some(Release {
            generation: self.generation,
        })
    }

    /// Run `body` only if `status` could be acquired.
    ///
    /// The body receives the [`Release`] and decides when to give it back,
    /// which may be long after `acquire` returned.
    pub fn acquire<R>(&mut self, status: Status, body: impl FnOnce(&mut Self, Release) -> R) -> Option<R> {
        let release = self.try_acquire(status)?;
        Some(body(self, release))
    }

    /// Change the context of a held status, keeping the rollback target.
    pub fn transition(&mut self, release: &Release, status: Status) -> bool {
        if !self.holds(release) {
            return false;
        }
        log::debug!("Status {} -> {}", self.current.name(), status.name());
        self.current = status;
        true
    }

    /// Restore the status from before the acquisition and free the lock.
    ///
    /// A release from an older acquisition is ignored.
    pub fn release(&mut self, release: Release) -> bool {
        if !self.holds(&release) {
            return false;
        }
        if let LockState::Held { previous, .. } = std::mem::replace(&mut self.state, LockState::Free) {
            log::debug!("Status {} -> {}", self.current.name(), previous.name());
            self.current = previous;
        }
        true
    }
}
