//! Retained drawable node tree with a mutation journal.
//!
//! The tree mirrors an SVG document: typed elements, attributes, classes and
//! text. Every change is appended to a journal that a renderer drains with
//! [`NodeTree::take_journal`], so only what actually changed is redrawn.

use kurbo::Point;
use std::collections::{BTreeSet, HashMap};

/// Identifier of a node in a [`NodeTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

/// Element type of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// The document root.
    Svg,
    Group,
    Rect,
    Circle,
    Polygon,
    Line,
    Path,
    Text,
    Image,
}

/// Attribute names understood by renderers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Attr {
    X,
    Y,
    Width,
    Height,
    Cx,
    Cy,
    R,
    X1,
    Y1,
    X2,
    Y2,
    Points,
    D,
    Fill,
    /// Fill used while the owning group is active.
    SelectedFill,
    Transform,
    Href,
}

/// Attribute values.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    Number(f64),
    Text(String),
    Points(Vec<Point>),
}

impl From<f64> for AttrValue {
    fn from(value: f64) -> Self {
        AttrValue::Number(value)
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        AttrValue::Text(value)
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        AttrValue::Text(value.to_string())
    }
}

impl From<Vec<Point>> for AttrValue {
    fn from(value: Vec<Point>) -> Self {
        AttrValue::Points(value)
    }
}

/// One recorded change to the tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    Created { node: NodeId, kind: NodeKind },
    SetAttr { node: NodeId, attr: Attr, value: AttrValue },
    AddClass { node: NodeId, class: String },
    RemoveClass { node: NodeId, class: String },
    SetText { node: NodeId, text: String },
    Inserted { parent: NodeId, node: NodeId, index: usize },
    Detached { node: NodeId },
    Dropped { node: NodeId },
}

#[derive(Debug, Clone)]
struct Node {
    kind: NodeKind,
    attrs: HashMap<Attr, AttrValue>,
    classes: BTreeSet<String>,
    text: Option<String>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Node {
    fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            attrs: HashMap::new(),
            classes: BTreeSet::new(),
            text: None,
            parent: None,
            children: Vec::new(),
        }
    }
}

/// Arena of nodes rooted at one [`NodeKind::Svg`] node.
#[derive(Debug, Clone)]
pub struct NodeTree {
    nodes: HashMap<NodeId, Node>,
    root: NodeId,
    next_id: u64,
    journal: Vec<Mutation>,
}

impl Default for NodeTree {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeTree {
    /// Create a tree holding only the root node.
    pub fn new() -> Self {
        let root = NodeId(0);
        let mut nodes = HashMap::new();
        nodes.insert(root, Node::new(NodeKind::Svg));
        Self {
            nodes,
            root,
            next_id: 1,
            journal: Vec::new(),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Create a detached node.
    pub fn create(&mut self, kind: NodeKind) -> NodeId {
        let node = NodeId(self.next_id);
        self.next_id += 1;
        self.nodes.insert(node, Node::new(kind));
        self.journal.push(Mutation::Created { node, kind });
        node
    }

    /// Create a node and append it to `parent`.
    pub fn create_child(&mut self, parent: NodeId, kind: NodeKind) -> NodeId {
        let node = self.create(kind);
        self.append_child(parent, node);
        node
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.nodes.contains_key(&node)
    }

    pub fn kind(&self, node: NodeId) -> Option<NodeKind> {
        self.nodes.get(&node).map(|n| n.kind)
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(&node).and_then(|n| n.parent)
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.nodes
            .get(&node)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    /// Move `node` to the end of `parent`'s children.
    pub fn append_child(&mut self, parent: NodeId, node: NodeId) {
        let index = self.children(parent).len();
        self.insert_child(parent, index, node);
    }

    /// Move `node` to position `index` among `parent`'s children.
    pub fn insert_child(&mut self, parent: NodeId, index: usize, node: NodeId) {
        if parent == node || !self.contains(parent) || !self.contains(node) {
            return;
        }
        self.unlink(node);
        let Some(parent_node) = self.nodes.get_mut(&parent) else {
            return;
        };
        let index = index.min(parent_node.children.len());
        parent_node.children.insert(index, node);
        if let Some(child) = self.nodes.get_mut(&node) {
            child.parent = Some(parent);
        }
        self.journal.push(Mutation::Inserted {
            parent,
            node,
            index,
        });
    }

    /// Detach `node` from its parent; the subtree stays alive.
    pub fn detach(&mut self, node: NodeId) {
        if self.unlink(node) {
            self.journal.push(Mutation::Detached { node });
        }
    }

    /// Detach and drop `node` with its whole subtree.
    pub fn remove(&mut self, node: NodeId) {
        if node == self.root {
            return;
        }
        self.detach(node);
        let mut pending = vec![node];
        while let Some(id) = pending.pop() {
            if let Some(removed) = self.nodes.remove(&id) {
                pending.extend(removed.children);
            }
        }
        self.journal.push(Mutation::Dropped { node });
    }

    fn unlink(&mut self, node: NodeId) -> bool {
        let Some(parent) = self.parent(node) else {
            return false;
        };
        if let Some(parent_node) = self.nodes.get_mut(&parent) {
            parent_node.children.retain(|&child| child != node);
        }
        if let Some(child) = self.nodes.get_mut(&node) {
            child.parent = None;
        }
        true
    }

    pub fn set_attr(&mut self, node: NodeId, attr: Attr, value: impl Into<AttrValue>) {
        let value = value.into();
        if let Some(n) = self.nodes.get_mut(&node) {
            n.attrs.insert(attr, value.clone());
            self.journal.push(Mutation::SetAttr { node, attr, value });
        }
    }

    pub fn attr(&self, node: NodeId, attr: Attr) -> Option<&AttrValue> {
        self.nodes.get(&node).and_then(|n| n.attrs.get(&attr))
    }

    /// Numeric attribute value, if set and numeric.
    pub fn number(&self, node: NodeId, attr: Attr) -> Option<f64> {
        match self.attr(node, attr) {
            Some(AttrValue::Number(value)) => Some(*value),
            _ => None,
        }
    }

    pub fn add_class(&mut self, node: NodeId, class: &str) {
        if let Some(n) = self.nodes.get_mut(&node) {
            if n.classes.insert(class.to_string()) {
                self.journal.push(Mutation::AddClass {
                    node,
                    class: class.to_string(),
                });
            }
        }
    }

    pub fn remove_class(&mut self, node: NodeId, class: &str) {
        if let Some(n) = self.nodes.get_mut(&node) {
            if n.classes.remove(class) {
                self.journal.push(Mutation::RemoveClass {
                    node,
                    class: class.to_string(),
                });
            }
        }
    }

    /// Add or remove `class` depending on `on`.
    pub fn toggle_class(&mut self, node: NodeId, class: &str, on: bool) {
        if on {
            self.add_class(node, class);
        } else {
            self.remove_class(node, class);
        }
    }

    pub fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.nodes
            .get(&node)
            .is_some_and(|n| n.classes.contains(class))
    }

    pub fn set_text(&mut self, node: NodeId, text: &str) {
        if let Some(n) = self.nodes.get_mut(&node) {
            n.text = Some(text.to_string());
            self.journal.push(Mutation::SetText {
                node,
                text: text.to_string(),
            });
        }
    }

    pub fn text(&self, node: NodeId) -> Option<&str> {
        self.nodes.get(&node).and_then(|n| n.text.as_deref())
    }

    /// Changes recorded since the last call.
    pub fn journal(&self) -> &[Mutation] {
        &self.journal
    }

    /// Drain the recorded changes.
    pub fn take_journal(&mut self) -> Vec<Mutation> {
        std::mem::take(&mut self.journal)
    }

    /// Number of live nodes, root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
