//! Scene registry: the node tree, its layers and one group per mark.
//!
//! The root holds three group layers, painted in order: background (the page
//! image), normal (every unselected mark) and foreground (the selected mark
//! and the lasso closing dot). Each mark owns a group root with two children,
//! the shape node first and the label node second.

mod node;

pub use node::{Attr, AttrValue, Mutation, NodeId, NodeKind, NodeTree};

use crate::error::{EditorError, EditorResult};
use crate::marks::{Change, FieldPath, Mark, MarkKey, changed_paths, diff_paths};
use crate::shapes::{
    self, ACTIVE_CLASS, GROUP_BINDINGS, LABEL_BINDINGS, apply_all, apply_changed, build_label,
    label_text,
};
use kurbo::{Point, Size};
use std::collections::HashMap;

/// Layer group nodes directly under the root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layers {
    pub background: NodeId,
    pub normal: NodeId,
    pub foreground: NodeId,
}

/// Nodes owned by one mark.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupNodes {
    pub root: NodeId,
    pub shape: NodeId,
    pub label: NodeId,
}

/// A live mark together with its nodes.
#[derive(Debug, Clone)]
pub struct Group {
    /// Last rendered snapshot.
    pub mark: Mark,
    pub nodes: GroupNodes,
}

/// All rendered state of one editor.
#[derive(Debug, Clone)]
pub struct Scene {
    tree: NodeTree,
    layers: Layers,
    groups: HashMap<MarkKey, Group>,
    owners: HashMap<NodeId, MarkKey>,
    order: Vec<MarkKey>,
    selected: Option<MarkKey>,
    background: Option<NodeId>,
    close_dot: Option<NodeId>,
    /// Prefix of every label.
    page_number: Option<u32>,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    pub fn new() -> Self {
        let mut tree = NodeTree::new();
        let root = tree.root();
        let layers = Layers {
            background: tree.create_child(root, NodeKind::Group),
            normal: tree.create_child(root, NodeKind::Group),
            foreground: tree.create_child(root, NodeKind::Group),
        };
        tree.add_class(layers.background, "background");
        tree.add_class(layers.normal, "normal");
        tree.add_class(layers.foreground, "foreground");
        Self {
            tree,
            layers,
            groups: HashMap::new(),
            owners: HashMap::new(),
            order: Vec::new(),
            selected: None,
            background: None,
            close_dot: None,
            page_number: None,
        }
    }

    pub fn tree(&self) -> &NodeTree {
        &self.tree
    }

    /// Drain the tree's mutation journal.
    pub fn take_journal(&mut self) -> Vec<Mutation> {
        self.tree.take_journal()
    }

    pub fn layers(&self) -> Layers {
        self.layers
    }

    pub fn group(&self, key: &str) -> Option<&Group> {
        self.groups.get(key)
    }

    pub fn mark(&self, key: &str) -> Option<&Mark> {
        self.groups.get(key).map(|group| &group.mark)
    }

    /// Live marks in insertion order.
    pub fn marks(&self) -> impl Iterator<Item = &Mark> {
        self.order
            .iter()
            .filter_map(|key| self.groups.get(key).map(|group| &group.mark))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.groups.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn selected(&self) -> Option<&MarkKey> {
        self.selected.as_ref()
    }

    /// Build the nodes for `mark` and insert them into the normal layer.
    pub fn add_mark_silently(&mut self, mark: Mark) -> EditorResult<()> {
        if self.groups.contains_key(&mark.key) {
            return Err(EditorError::DuplicateKey(mark.key.to_string()));
        }

        let root = self.tree.create(NodeKind::Group);
        let shape = mark.shape().build(&mut self.tree);
        let label = build_label(&mut self.tree);
        self.tree.append_child(root, shape);
        self.tree.append_child(root, label);

        apply_all(&GROUP_BINDINGS, &mark, root, &mut self.tree);
        apply_all(&mark.shape().bindings(), &mark, shape, &mut self.tree);
        apply_all(&LABEL_BINDINGS, &mark, label, &mut self.tree);
        self.tree
            .set_text(label, &label_text(self.page_number, &mark.label));
        self.tree.append_child(self.layers.normal, root);

        log::debug!("Added {} mark {}", mark.shape(), mark.key);
        let key = mark.key.clone();
        self.owners.insert(root, key.clone());
        self.order.push(key.clone());
        self.groups.insert(
            key,
            Group {
                mark,
                nodes: GroupNodes { root, shape, label },
            },
        );
        Ok(())
    }

    /// Re-render a mark from a new record with the same key.
    ///
    /// Returns the detected changes. A shape change rebuilds only the shape
    /// node; everything else mutates just the attributes whose bindings
    /// depend on a changed path.
    pub fn update_mark(&mut self, mark: Mark) -> EditorResult<Vec<Change>> {
        let group = self
            .groups
            .get_mut(&mark.key)
            .ok_or_else(|| EditorError::UnknownKey(mark.key.to_string()))?;

        let changes = diff_paths(&group.mark, &mark);
        if changes.is_empty() {
            return Ok(changes);
        }
        let changed = changed_paths(&changes);

        if group.mark.shape() != mark.shape() {
            log::debug!(
                "Rebuilding shape of {} ({} -> {})",
                mark.key,
                group.mark.shape(),
                mark.shape()
            );
            self.tree.remove(group.nodes.shape);
            let shape = mark.shape().build(&mut self.tree);
            self.tree.insert_child(group.nodes.root, 0, shape);
            apply_all(&mark.shape().bindings(), &mark, shape, &mut self.tree);
            group.nodes.shape = shape;
        } else {
            apply_changed(&mark.shape().bindings(), &changed, &mark, group.nodes.shape, &mut self.tree);
        }
        apply_changed(&LABEL_BINDINGS, &changed, &mark, group.nodes.label, &mut self.tree);
        if changed.contains(&FieldPath::Label) {
            self.tree
                .set_text(group.nodes.label, &label_text(self.page_number, &mark.label));
        }
        apply_changed(&GROUP_BINDINGS, &changed, &mark, group.nodes.root, &mut self.tree);

        group.mark = mark;
        Ok(changes)
    }

    /// Drop a mark and its nodes.
    pub fn remove_mark(&mut self, key: &str) -> EditorResult<Mark> {
        let group = self
            .groups
            .remove(key)
            .ok_or_else(|| EditorError::UnknownKey(key.to_string()))?;
        self.tree.remove(group.nodes.root);
        self.owners.remove(&group.nodes.root);
        self.order.retain(|k| k.as_str() != key);
        if self.selected.as_ref().is_some_and(|k| k.as_str() == key) {
            self.selected = None;
        }
        log::debug!("Removed mark {key}");
        Ok(group.mark)
    }

    /// Drop every mark.
    pub fn clear(&mut self) {
        let keys: Vec<MarkKey> = self.order.drain(..).collect();
        for key in keys {
            if let Some(group) = self.groups.remove(&key) {
                self.tree.remove(group.nodes.root);
            }
        }
        self.groups.clear();
        self.owners.clear();
        self.selected = None;
        self.hide_close_dot();
    }

    /// Bring a mark to the foreground and mark it active.
    ///
    /// The previously foregrounded mark goes back to the normal layer.
    pub fn select(&mut self, key: &str) -> EditorResult<&Mark> {
        let root = self
            .groups
            .get(key)
            .map(|group| group.nodes.root)
            .ok_or_else(|| EditorError::UnknownKey(key.to_string()))?;

        let foreground: Vec<NodeId> = self
            .tree
            .children(self.layers.foreground)
            .iter()
            .copied()
            .filter(|node| self.owners.contains_key(node) && *node != root)
            .collect();
        for node in foreground {
            self.tree.remove_class(node, ACTIVE_CLASS);
            self.tree.append_child(self.layers.normal, node);
        }
        if let Some(previous) = self.selected.take() {
            if let Some(group) = self.groups.get(&previous) {
                self.tree.remove_class(group.nodes.root, ACTIVE_CLASS);
            }
        }

        if self.tree.parent(root) != Some(self.layers.foreground) {
            self.tree.append_child(self.layers.foreground, root);
        }
        self.tree.add_class(root, ACTIVE_CLASS);

        let group = self
            .groups
            .get_key_value(key)
            .ok_or_else(|| EditorError::UnknownKey(key.to_string()))?;
        self.selected = Some(group.0.clone());
        Ok(&group.1.mark)
    }

    /// Clear the active state. Layers are left as they are.
    pub fn deselect(&mut self) {
        if let Some(key) = self.selected.take() {
            if let Some(group) = self.groups.get(&key) {
                self.tree.remove_class(group.nodes.root, ACTIVE_CLASS);
            }
        }
    }

    /// Topmost mark whose shape contains `point` (surface coordinates).
    pub fn mark_at(&self, point: Point, tolerance: f64) -> Option<&Mark> {
        let foreground = self.tree.children(self.layers.foreground).iter().rev();
        let normal = self.tree.children(self.layers.normal).iter().rev();
        foreground
            .chain(normal)
            .filter_map(|node| self.owners.get(node))
            .filter_map(|key| self.groups.get(key))
            .map(|group| &group.mark)
            .find(|mark| shapes::hit_test(mark, point, tolerance))
    }

    pub fn page_number(&self) -> Option<u32> {
        self.page_number
    }

    /// Set the label prefix and rewrite every label with it.
    pub fn set_page_number(&mut self, page_number: Option<u32>) {
        if self.page_number == page_number {
            return;
        }
        self.page_number = page_number;
        for group in self.groups.values() {
            self.tree
                .set_text(group.nodes.label, &label_text(page_number, &group.mark.label));
        }
    }

    /// Show `source` as the page image, replacing any previous one.
    pub fn set_background(&mut self, source: &str, size: Size) -> NodeId {
        self.clear_background();
        let image = self.tree.create(NodeKind::Image);
        self.tree.set_attr(image, Attr::Href, source);
        self.tree.set_attr(image, Attr::X, 0.0);
        self.tree.set_attr(image, Attr::Y, 0.0);
        self.tree.set_attr(image, Attr::Width, size.width);
        self.tree.set_attr(image, Attr::Height, size.height);
        self.tree.append_child(self.layers.background, image);
        self.background = Some(image);
        image
    }

    pub fn clear_background(&mut self) {
        if let Some(image) = self.background.take() {
            self.tree.remove(image);
        }
    }

    pub fn background(&self) -> Option<NodeId> {
        self.background
    }

    /// Show the lasso closing dot at `center`.
    pub fn show_close_dot(&mut self, center: Point, radius: f64) -> NodeId {
        self.hide_close_dot();
        let dot = self.tree.create(NodeKind::Circle);
        self.tree.add_class(dot, "close-dot");
        self.tree.set_attr(dot, Attr::Cx, center.x);
        self.tree.set_attr(dot, Attr::Cy, center.y);
        self.tree.set_attr(dot, Attr::R, radius);
        self.tree.append_child(self.layers.foreground, dot);
        self.close_dot = Some(dot);
        dot
    }

    pub fn hide_close_dot(&mut self) {
        if let Some(dot) = self.close_dot.take() {
            self.tree.remove(dot);
        }
    }

    pub fn close_dot(&self) -> Option<NodeId> {
        self.close_dot
    }
}
