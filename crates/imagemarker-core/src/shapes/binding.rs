//! Declarative mark-field to node-attribute bindings.

use crate::marks::{FieldPath, Mark};
use crate::scene::{NodeId, NodeTree};

/// Node mutation run when a binding fires.
pub type Apply = fn(&Mark, NodeId, &mut NodeTree);

/// Which changed paths make a binding fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requires {
    /// Recompute from one field.
    Field(FieldPath),
    /// Recompute jointly when any of these fields change.
    AnyOf(&'static [FieldPath]),
    /// Set once at construction, never on update.
    Constant,
}

impl Requires {
    /// Whether a change to any of `changed` requires this binding.
    pub fn matches(&self, changed: &[FieldPath]) -> bool {
        match self {
            Requires::Field(path) => changed.contains(path),
            Requires::AnyOf(paths) => paths.iter().any(|path| changed.contains(path)),
            Requires::Constant => false,
        }
    }
}

/// One entry of a shape definition.
#[derive(Debug, Clone, Copy)]
pub struct Binding {
    pub requires: Requires,
    pub then: Apply,
}

impl Binding {
    pub const fn field(path: FieldPath, then: Apply) -> Self {
        Self {
            requires: Requires::Field(path),
            then,
        }
    }

    pub const fn joint(paths: &'static [FieldPath], then: Apply) -> Self {
        Self {
            requires: Requires::AnyOf(paths),
            then,
        }
    }

    pub const fn constant(then: Apply) -> Self {
        Self {
            requires: Requires::Constant,
            then,
        }
    }
}

/// Run every binding, as done when a node is first built.
pub fn apply_all(bindings: &[Binding], mark: &Mark, node: NodeId, tree: &mut NodeTree) {
    for binding in bindings {
        (binding.then)(mark, node, tree);
    }
}

/// Run only the bindings whose dependencies intersect `changed`.
///
/// Returns how many bindings fired.
pub fn apply_changed(
    bindings: &[Binding],
    changed: &[FieldPath],
    mark: &Mark,
    node: NodeId,
    tree: &mut NodeTree,
) -> usize {
    let mut fired = 0;
    for binding in bindings.iter().filter(|b| b.requires.matches(changed)) {
        (binding.then)(mark, node, tree);
        fired += 1;
    }
    fired
}
