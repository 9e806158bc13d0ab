//! Ranged JSON document model.
//!
//! Nodes are stored in a flat arena and addressed by [`NodeId`]. Parent
//! links are plain indices, so upward walks never hold a borrow on the
//! tree and no ownership cycles exist.

use serde::Serialize;
use std::fmt;

/// A half-open byte range `[start, end)` into the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct CodeRange {
    /// Byte offset of the start.
    pub start: usize,
    /// Byte offset of the end (exclusive).
    pub end: usize,
}

impl CodeRange {
    /// Create a new range.
    #[inline]
    #[must_use]
    pub const fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end);
        Self { start, end }
    }

    /// Length of the range in bytes.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.end - self.start
    }

    /// Check if the range is empty.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Check if `other` lies entirely within this range.
    #[inline]
    #[must_use]
    pub const fn contains_range(&self, other: CodeRange) -> bool {
        self.start <= other.start && self.end >= other.end
    }

    /// Check if this range contains a byte offset.
    #[inline]
    #[must_use]
    pub const fn contains(&self, offset: usize) -> bool {
        offset >= self.start && offset < self.end
    }

    /// Slice the covered text out of `source`.
    #[must_use]
    pub fn slice<'a>(&self, source: &'a str) -> Option<&'a str> {
        source.get(self.start..self.end)
    }
}

impl fmt::Display for CodeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// Index of a node inside a [`JsonDocument`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    /// The document root.
    pub const ROOT: NodeId = NodeId(0);

    #[inline]
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// A literal JSON value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scalar {
    /// Decoded string contents.
    String(String),
    /// Number lexeme exactly as written.
    Number(String),
    Bool(bool),
    Null,
}

/// Node payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// Object properties in source order.
    Object(Vec<NodeId>),
    /// Array items in source order.
    Array(Vec<NodeId>),
    Scalar(Scalar),
}

/// A single JSON node.
///
/// Object properties are stored as their value node carrying the property
/// `key` and `key_range`; array items and the root have no key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub kind: NodeKind,
    /// Property name, when this node is an object property.
    pub key: Option<String>,
    /// Range of the property name between its quotes.
    pub key_range: Option<CodeRange>,
    /// Range of the value. Strings exclude their quotes, containers
    /// include their brackets.
    pub value_range: CodeRange,
    /// Enclosing node; `None` only for the root.
    pub parent: Option<NodeId>,
}

impl Node {
    /// Whether this node is an object or array.
    #[must_use]
    pub fn is_composite(&self) -> bool {
        matches!(self.kind, NodeKind::Object(_) | NodeKind::Array(_))
    }

    #[must_use]
    pub fn is_object(&self) -> bool {
        matches!(self.kind, NodeKind::Object(_))
    }

    #[must_use]
    pub fn is_array(&self) -> bool {
        matches!(self.kind, NodeKind::Array(_))
    }

    #[must_use]
    pub fn is_scalar(&self) -> bool {
        matches!(self.kind, NodeKind::Scalar(_))
    }

    /// Child nodes (empty for scalars).
    #[must_use]
    pub fn children(&self) -> &[NodeId] {
        match &self.kind {
            NodeKind::Object(children) | NodeKind::Array(children) => children,
            NodeKind::Scalar(_) => &[],
        }
    }

    /// String value, if this node is a string scalar.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Scalar(Scalar::String(s)) => Some(s),
            _ => None,
        }
    }

    /// Check the property name.
    #[must_use]
    pub fn has_key(&self, key: &str) -> bool {
        self.key.as_deref() == Some(key)
    }
}

/// A parsed JSON document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonDocument {
    nodes: Vec<Node>,
}

impl JsonDocument {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(capacity),
        }
    }

    /// Append a node, linking it into its parent's child list.
    pub(crate) fn push(&mut self, node: Node) -> NodeId {
        let id = NodeId(u32::try_from(self.nodes.len()).unwrap_or(u32::MAX));
        let parent = node.parent;
        self.nodes.push(node);
        if let Some(parent) = parent {
            if let NodeKind::Object(children) | NodeKind::Array(children) =
                &mut self.nodes[parent.index()].kind
            {
                children.push(id);
            }
        }
        id
    }

    /// Set the end of a container once its closing bracket is seen.
    pub(crate) fn close(&mut self, id: NodeId, end: usize) {
        if let Some(node) = self.nodes.get_mut(id.index()) {
            node.value_range.end = end;
        }
    }

    /// The root node id.
    #[must_use]
    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Number of nodes in the document.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Look up a node.
    ///
    /// # Panics
    /// Panics if `id` does not belong to this document.
    #[must_use]
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    /// Look up a node, returning `None` for foreign ids.
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id)?.parent
    }

    #[must_use]
    pub fn key(&self, id: NodeId) -> Option<&str> {
        self.get(id)?.key.as_deref()
    }

    /// Find a direct property of an object node by name.
    #[must_use]
    pub fn property(&self, object: NodeId, key: &str) -> Option<NodeId> {
        let node = self.get(object)?;
        if !node.is_object() {
            return None;
        }
        node.children()
            .iter()
            .copied()
            .find(|&child| self.node(child).has_key(key))
    }

    /// Follow a chain of property names from the root.
    #[must_use]
    pub fn pointer(&self, path: &[&str]) -> Option<NodeId> {
        path.iter()
            .try_fold(self.root(), |current, key| self.property(current, key))
    }

    /// Iterate over the strict ancestors of `id`, innermost first.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), move |&current| self.parent(current))
    }

    /// The ancestor-or-self of `id` that is a direct child of `scope`.
    ///
    /// Returns `None` when `id` is not below `scope`.
    #[must_use]
    pub fn child_of_scope(&self, scope: NodeId, id: NodeId) -> Option<NodeId> {
        let mut current = id;
        loop {
            let parent = self.parent(current)?;
            if parent == scope {
                return Some(current);
            }
            current = parent;
        }
    }
}
