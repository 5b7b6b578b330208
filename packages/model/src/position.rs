//! Resolution of integer positions into tree context.

use crate::error::{ModelError, ModelResult};
use crate::mark::Mark;
use crate::node::{find_index, Node};
use crate::schema::{NodeKind, Region};

#[derive(Debug, Clone)]
struct PathEntry {
    node: Node,
    /// Index of the child the position points into (or before).
    index: usize,
    /// Absolute position where that child starts.
    offset: usize,
}

/// A position together with the chain of ancestors containing it.
///
/// Depth 0 is the root. `parent()` is the innermost non-text node that
/// contains the position; positions inside a text node resolve to the
/// surrounding text block.
#[derive(Debug, Clone)]
pub struct ResolvedPos {
    pos: usize,
    path: Vec<PathEntry>,
    parent_offset: usize,
}

impl Node {
    /// Resolve `pos` against this node's content.
    pub fn resolve(&self, pos: usize) -> ModelResult<ResolvedPos> {
        if pos > self.content_size() {
            return Err(ModelError::out_of_range(pos, self.content_size()));
        }

        let mut path = Vec::new();
        let mut start = 0;
        let mut parent_offset = pos;
        let mut node = self.clone();
        loop {
            let (index, offset) = find_index(node.children(), parent_offset)
                .ok_or_else(|| ModelError::out_of_range(pos, self.content_size()))?;
            let rem = parent_offset - offset;
            let next = node.child(index).cloned();
            path.push(PathEntry {
                node,
                index,
                offset: start + offset,
            });
            if rem == 0 {
                break;
            }
            match next {
                Some(child) if !child.is_text() => {
                    parent_offset = rem - 1;
                    start += offset + 1;
                    node = child;
                }
                _ => break,
            }
        }

        Ok(ResolvedPos {
            pos,
            path,
            parent_offset,
        })
    }
}

impl ResolvedPos {
    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn depth(&self) -> usize {
        self.path.len() - 1
    }

    fn entry(&self, depth: usize) -> &PathEntry {
        &self.path[depth.min(self.depth())]
    }

    /// Ancestor at `depth`. Depths past `depth()` clamp to the parent.
    pub fn node(&self, depth: usize) -> &Node {
        &self.entry(depth).node
    }

    pub fn parent(&self) -> &Node {
        self.node(self.depth())
    }

    pub fn doc(&self) -> &Node {
        self.node(0)
    }

    /// Child index the position points at inside the ancestor at `depth`.
    pub fn index(&self, depth: usize) -> usize {
        self.entry(depth).index
    }

    /// Offset of the position inside its parent's content.
    pub fn parent_offset(&self) -> usize {
        self.parent_offset
    }

    /// Absolute position where the content of the ancestor at `depth` starts.
    pub fn start(&self, depth: usize) -> usize {
        if depth == 0 {
            0
        } else {
            self.entry(depth - 1).offset + 1
        }
    }

    /// Absolute position where the content of the ancestor at `depth` ends.
    pub fn end(&self, depth: usize) -> usize {
        self.start(depth) + self.node(depth).content_size()
    }

    /// Position directly before the ancestor at `depth` (`depth >= 1`).
    pub fn before(&self, depth: usize) -> usize {
        self.start(depth).saturating_sub(1)
    }

    /// Position directly after the ancestor at `depth` (`depth >= 1`).
    pub fn after(&self, depth: usize) -> usize {
        self.before(depth) + self.node(depth).node_size()
    }

    /// Offset into the text node the position points into, 0 when it sits
    /// between nodes.
    pub fn text_offset(&self) -> usize {
        self.pos - self.entry(self.depth()).offset
    }

    /// The node directly after the position. Text is cut at the position.
    pub fn node_after(&self) -> Option<Node> {
        let parent = self.parent();
        let index = self.index(self.depth());
        let child = parent.child(index)?;
        let offset = self.text_offset();
        Some(if offset > 0 {
            child.cut_text(offset, child.node_size())
        } else {
            child.clone()
        })
    }

    /// The node directly before the position. Text is cut at the position.
    pub fn node_before(&self) -> Option<Node> {
        let parent = self.parent();
        let index = self.index(self.depth());
        let offset = self.text_offset();
        if offset > 0 {
            return parent.child(index).map(|c| c.cut_text(0, offset));
        }
        if index == 0 {
            return None;
        }
        parent.child(index - 1).cloned()
    }

    /// Marks that text typed at this position would inherit.
    pub fn marks(&self) -> Vec<Mark> {
        let parent = self.parent();
        if parent.content_size() == 0 {
            return Vec::new();
        }
        let index = self.index(self.depth());
        if self.text_offset() > 0 {
            return parent.child(index).map(|c| c.marks().to_vec()).unwrap_or_default();
        }
        let before = index.checked_sub(1).and_then(|i| parent.child(i));
        let after = parent.child(index);
        match (before, after) {
            (Some(before), after) => before
                .marks()
                .iter()
                .filter(|m| {
                    m.kind().inclusive() || after.map_or(false, |a| a.marks().contains(m))
                })
                .cloned()
                .collect(),
            (None, Some(after)) => after.marks().to_vec(),
            (None, None) => Vec::new(),
        }
    }

    /// Rebuild the absolute position from the path. Always equals `pos()`.
    pub fn reconstruct(&self) -> usize {
        self.start(self.depth()) + self.parent_offset
    }

    /// Depth of the innermost ancestor of `kind`.
    pub fn depth_of(&self, kind: NodeKind) -> Option<usize> {
        (0..=self.depth()).rev().find(|&d| self.node(d).kind() == kind)
    }

    /// Depth of the innermost ancestor matching `pred`.
    pub fn find_ancestor(&self, pred: impl Fn(&Node) -> bool) -> Option<usize> {
        (0..=self.depth()).rev().find(|&d| pred(self.node(d)))
    }

    /// Index of the page containing the position.
    pub fn page_index(&self) -> Option<usize> {
        (self.depth() >= 1).then(|| self.index(0))
    }

    /// Region of the page containing the position.
    pub fn region(&self) -> Option<Region> {
        (self.depth() >= 2).then(|| self.node(2).kind().region()).flatten()
    }

    /// Greatest depth at which both positions share an ancestor.
    pub fn shared_depth(&self, pos: usize) -> usize {
        (1..=self.depth())
            .rev()
            .find(|&d| self.start(d) <= pos && self.end(d) >= pos)
            .unwrap_or(0)
    }
}
