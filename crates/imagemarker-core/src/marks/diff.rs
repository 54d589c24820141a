//! Minimal changed-path detection between two marks.

use super::{FieldPath, FieldValue, Mark};

/// One changed leaf: its path and the value it now has (`None` if the new
/// record no longer carries the field).
#[derive(Debug, Clone, PartialEq)]
pub struct Change {
    pub path: FieldPath,
    pub value: Option<FieldValue>,
}

/// Paths whose values differ between `old` and `new`.
///
/// Only fields present in `old` are compared. The polygon point list is a
/// single opaque leaf, so replacing any point yields one `polygon` change.
pub fn diff_paths(old: &Mark, new: &Mark) -> Vec<Change> {
    old.paths()
        .into_iter()
        .filter_map(|path| {
            let before = old.field(path);
            let after = new.field(path);
            (before != after).then_some(Change { path, value: after })
        })
        .collect()
}

/// Just the paths of a change list.
pub fn changed_paths(changes: &[Change]) -> Vec<FieldPath> {
    changes.iter().map(|change| change.path).collect()
}
