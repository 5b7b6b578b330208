//! # Document Tree
//!
//! Persistent, structurally shared tree nodes.
//!
//! A [`Node`] is a cheap handle (`Arc`) to immutable data. Edits never touch
//! an existing node: they rebuild the path from the edited node to the root
//! and reuse every untouched subtree, so each revision owns its root while
//! sharing unchanged branches with its predecessor.
//!
//! ## Positions
//!
//! Positions count tokens of the flattened tree, relative to the start of the
//! root's content. Entering or leaving a non-leaf node costs one unit, every
//! character of text costs one unit and every leaf node (image, hard break,
//! horizontal rule) costs one unit.
//!
//! ```text
//!   <page><header></header><content><paragraph> a b </paragraph> ...
//!  0     1       2        3        4           5 6 7
//! ```

use crate::attrs::{AttrValue, Attrs};
use crate::error::{ModelError, ModelResult};
use crate::mark::Mark;
use crate::schema::{check_content, NodeKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// A typed element of the document tree.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawNode", into = "RawNode")]
pub struct Node(Arc<NodeData>);

#[derive(PartialEq)]
struct NodeData {
    kind: NodeKind,
    attrs: Attrs,
    marks: Vec<Mark>,
    content: Vec<Node>,
    text: Option<String>,
    /// Character count for text nodes, summed child sizes otherwise.
    content_size: usize,
}

impl Node {
    /// Create a non-text node, validating attributes and content.
    pub fn new(kind: NodeKind, attrs: Attrs, content: Vec<Node>) -> ModelResult<Node> {
        if kind == NodeKind::Text {
            return Err(ModelError::schema(kind, "use Node::text for text nodes"));
        }
        attrs.validate(kind)?;
        let content = normalize(content);
        check_content(kind, &content)?;
        Ok(Node::from_parts(kind, attrs, Vec::new(), content))
    }

    /// Create a plain text node.
    pub fn text(text: impl Into<String>) -> Node {
        Node::text_with_marks(text, Vec::new())
    }

    pub fn text_with_marks(text: impl Into<String>, marks: Vec<Mark>) -> Node {
        let text = text.into();
        let content_size = text.chars().count();
        Node(Arc::new(NodeData {
            kind: NodeKind::Text,
            attrs: Attrs::None,
            marks: canonical_marks(marks),
            content: Vec::new(),
            text: Some(text),
            content_size,
        }))
    }

    /// Build a node without checking its content pattern.
    pub(crate) fn from_parts(
        kind: NodeKind,
        attrs: Attrs,
        marks: Vec<Mark>,
        content: Vec<Node>,
    ) -> Node {
        let content_size = content.iter().map(Node::node_size).sum();
        Node(Arc::new(NodeData {
            kind,
            attrs,
            marks: canonical_marks(marks),
            content,
            text: None,
            content_size,
        }))
    }

    pub fn kind(&self) -> NodeKind {
        self.0.kind
    }

    pub fn attrs(&self) -> &Attrs {
        &self.0.attrs
    }

    pub fn marks(&self) -> &[Mark] {
        &self.0.marks
    }

    pub fn children(&self) -> &[Node] {
        &self.0.content
    }

    pub fn child(&self, index: usize) -> Option<&Node> {
        self.0.content.get(index)
    }

    pub fn child_count(&self) -> usize {
        self.0.content.len()
    }

    pub fn first_child(&self) -> Option<&Node> {
        self.0.content.first()
    }

    pub fn last_child(&self) -> Option<&Node> {
        self.0.content.last()
    }

    pub fn as_text(&self) -> Option<&str> {
        self.0.text.as_deref()
    }

    pub fn id(&self) -> Option<&str> {
        self.0.attrs.id()
    }

    pub fn is_text(&self) -> bool {
        self.0.kind == NodeKind::Text
    }

    pub fn is_leaf(&self) -> bool {
        self.0.kind.is_leaf()
    }

    pub fn is_block(&self) -> bool {
        self.0.kind.is_block()
    }

    pub fn is_inline(&self) -> bool {
        self.0.kind.is_inline()
    }

    pub fn is_textblock(&self) -> bool {
        self.0.kind.is_textblock()
    }

    /// Size of this node's content in position units.
    pub fn content_size(&self) -> usize {
        if self.is_text() {
            0
        } else {
            self.0.content_size
        }
    }

    /// Size of the whole node, boundaries included.
    pub fn node_size(&self) -> usize {
        if self.is_text() {
            self.0.content_size
        } else if self.is_leaf() {
            1
        } else {
            self.0.content_size + 2
        }
    }

    /// Concatenated text of all descendant text nodes.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self.as_text() {
            Some(text) => out.push_str(text),
            None => self.children().iter().for_each(|c| c.collect_text(out)),
        }
    }

    /// Cheap identity check: both handles point at the same data.
    pub fn ptr_eq(&self, other: &Node) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Same node with different children. Content is normalized but not
    /// validated.
    pub fn with_content(&self, content: Vec<Node>) -> Node {
        Node::from_parts(self.kind(), self.attrs().clone(), self.marks().to_vec(), normalize(content))
    }

    /// Same node with a different attribute record.
    pub fn with_attrs(&self, attrs: Attrs) -> Node {
        self.with_markup(self.kind(), attrs)
    }

    /// Same content under a different kind and attribute record.
    pub fn with_markup(&self, kind: NodeKind, attrs: Attrs) -> Node {
        Node(Arc::new(NodeData {
            kind,
            attrs,
            marks: self.0.marks.clone(),
            content: self.0.content.clone(),
            text: self.0.text.clone(),
            content_size: self.0.content_size,
        }))
    }

    pub fn with_marks(&self, marks: Vec<Mark>) -> Node {
        Node(Arc::new(NodeData {
            kind: self.0.kind,
            attrs: self.0.attrs.clone(),
            marks: canonical_marks(marks),
            content: self.0.content.clone(),
            text: self.0.text.clone(),
            content_size: self.0.content_size,
        }))
    }

    /// Slice of a text node by character offsets.
    pub fn cut_text(&self, from: usize, to: usize) -> Node {
        match self.as_text() {
            Some(text) => {
                let piece: String = text.chars().skip(from).take(to.saturating_sub(from)).collect();
                Node::text_with_marks(piece, self.marks().to_vec())
            }
            None => self.clone(),
        }
    }

    /// Deep validation of the whole subtree.
    pub fn check(&self) -> ModelResult<()> {
        if self.is_text() {
            if self.0.content_size == 0 {
                return Err(ModelError::schema(NodeKind::Text, "empty text node"));
            }
            return Ok(());
        }
        self.attrs().validate(self.kind())?;
        check_content(self.kind(), self.children())?;
        if !self.kind().allows_marks() && self.children().iter().any(|c| !c.marks().is_empty()) {
            return Err(ModelError::schema(self.kind(), "marks are not allowed here"));
        }
        self.children().iter().try_for_each(Node::check)
    }

    /// The node starting at `pos`, or the text node containing it.
    pub fn node_at(&self, pos: usize) -> Option<&Node> {
        let mut node = self;
        let mut pos = pos;
        loop {
            let (index, offset) = find_index(node.children(), pos)?;
            let child = node.child(index)?;
            if offset == pos || child.is_text() {
                return Some(child);
            }
            pos -= offset + 1;
            node = child;
        }
    }

    /// Visit every node overlapping `from..to` in document order. The
    /// callback receives the node, its absolute position and its parent, and
    /// returns `false` to skip the node's children.
    pub fn nodes_between<F>(&self, from: usize, to: usize, mut f: F)
    where
        F: FnMut(&Node, usize, &Node) -> bool,
    {
        self.walk_between(from, to, 0, &mut f);
    }

    fn walk_between<F>(&self, from: usize, to: usize, start: usize, f: &mut F)
    where
        F: FnMut(&Node, usize, &Node) -> bool,
    {
        let mut pos = 0;
        for child in self.children() {
            if pos >= to {
                break;
            }
            let end = pos + child.node_size();
            if end > from && f(child, start + pos, self) && child.content_size() > 0 {
                let inner = pos + 1;
                child.walk_between(
                    from.saturating_sub(inner),
                    child.content_size().min(to.saturating_sub(inner)),
                    start + inner,
                    f,
                );
            }
            pos = end;
        }
    }

    /// Find the first node carrying `id`, with its position.
    pub fn find_by_id(&self, id: &str) -> Option<(usize, Node)> {
        self.descendants()
            .find(|(node, _)| node.id() == Some(id))
            .map(|(node, pos)| (pos, node.clone()))
    }

    /// Child nodes between two content offsets of this node. Text nodes
    /// crossing either offset are cut.
    pub fn slice_content(&self, from: usize, to: usize) -> Vec<Node> {
        cut_children(self.children(), from, to)
    }
}

/// Index of the child at content offset `pos` and the offset where that
/// child starts. `None` when `pos` lies past the end of the content.
pub(crate) fn find_index(children: &[Node], pos: usize) -> Option<(usize, usize)> {
    if pos == 0 {
        return Some((0, 0));
    }
    let mut cur = 0;
    for (index, child) in children.iter().enumerate() {
        let end = cur + child.node_size();
        if end >= pos {
            return Some(if end == pos { (index + 1, end) } else { (index, cur) });
        }
        cur = end;
    }
    None
}

/// Children covering content offsets `from..to`, cutting text at the edges.
pub(crate) fn cut_children(children: &[Node], from: usize, to: usize) -> Vec<Node> {
    let mut out = Vec::new();
    let mut pos = 0;
    for child in children {
        if pos >= to {
            break;
        }
        let end = pos + child.node_size();
        if end > from {
            if child.is_text() {
                out.push(child.cut_text(from.saturating_sub(pos), to.min(end) - pos));
            } else {
                out.push(child.clone());
            }
        }
        pos = end;
    }
    normalize(out)
}

/// Drop empty text nodes and merge adjacent text nodes with equal marks.
pub(crate) fn normalize(children: Vec<Node>) -> Vec<Node> {
    let mut out: Vec<Node> = Vec::with_capacity(children.len());
    for child in children {
        if child.is_text() && child.0.content_size == 0 {
            continue;
        }
        if let (Some(prev), Some(text)) = (out.last(), child.as_text()) {
            if let Some(prev_text) = prev.as_text() {
                if prev.marks() == child.marks() {
                    let merged = Node::text_with_marks(
                        format!("{}{}", prev_text, text),
                        child.marks().to_vec(),
                    );
                    out.pop();
                    out.push(merged);
                    continue;
                }
            }
        }
        out.push(child);
    }
    out
}

fn canonical_marks(marks: Vec<Mark>) -> Vec<Mark> {
    marks.iter().fold(Vec::new(), |set, mark| mark.add_to_set(&set))
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(text) = self.as_text() {
            if !self.marks().is_empty() {
                write!(f, "{:?}", self.marks().iter().map(|m| m.kind()).collect::<Vec<_>>())?;
            }
            return write!(f, "{:?}", text);
        }
        write!(f, "{}", self.kind())?;
        if *self.attrs() != Attrs::default_for(self.kind()) {
            write!(f, "{:?}", self.attrs().to_map())?;
        }
        if !self.children().is_empty() {
            f.debug_list().entries(self.children()).finish()?;
        }
        Ok(())
    }
}

/// JSON shape of a node: `{"type": "paragraph", "attrs": {...}, "content": [...]}`.
#[derive(Serialize, Deserialize)]
struct RawNode {
    #[serde(rename = "type")]
    kind: NodeKind,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    attrs: BTreeMap<String, AttrValue>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    content: Vec<Node>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    marks: Vec<Mark>,
}

impl TryFrom<RawNode> for Node {
    type Error = ModelError;

    fn try_from(raw: RawNode) -> Result<Self, Self::Error> {
        if raw.kind == NodeKind::Text {
            return match raw.text {
                Some(text) if !text.is_empty() => Ok(Node::text_with_marks(text, raw.marks)),
                _ => Err(ModelError::schema(NodeKind::Text, "text node without text")),
            };
        }
        let attrs = Attrs::from_map(raw.kind, raw.attrs)?;
        let node = Node::new(raw.kind, attrs, raw.content)?;
        Ok(if raw.marks.is_empty() { node } else { node.with_marks(raw.marks) })
    }
}

impl From<Node> for RawNode {
    fn from(node: Node) -> Self {
        RawNode {
            kind: node.kind(),
            attrs: node.attrs().to_map(),
            content: node.children().to_vec(),
            text: node.as_text().map(str::to_string),
            marks: node.marks().to_vec(),
        }
    }
}
