//! Read-only walks over a document tree.
//!
//! Two flavors: the [`Visitor`] trait for callback-style passes that need
//! enter/leave hooks, and the lazy [`Descendants`] iterator for searches.

use crate::node::Node;
use std::slice;

/// Visitor for traversing a tree immutably.
///
/// The default `visit_node` walks the whole subtree. Override it to act on
/// nodes and call [`walk_node`] to keep descending.
pub trait Visitor: Sized {
    /// `pos` is the absolute position directly before `node`.
    fn visit_node(&mut self, node: &Node, pos: usize) {
        walk_node(self, node, pos);
    }
}

/// Visit every child of `node` with its absolute position.
pub fn walk_node<V: Visitor>(visitor: &mut V, node: &Node, pos: usize) {
    let mut child_pos = pos + 1;
    for child in node.children() {
        visitor.visit_node(child, child_pos);
        child_pos += child.node_size();
    }
}

/// Visit every descendant of a root node. The root itself is not visited
/// since it has no position of its own.
pub fn walk_doc<V: Visitor>(visitor: &mut V, doc: &Node) {
    let mut pos = 0;
    for child in doc.children() {
        visitor.visit_node(child, pos);
        pos += child.node_size();
    }
}

/// Lazy pre-order iterator over `(node, position)` pairs.
pub struct Descendants<'a> {
    stack: Vec<(slice::Iter<'a, Node>, usize)>,
    pending: Option<(&'a Node, usize)>,
}

impl<'a> Descendants<'a> {
    /// Don't descend into the node most recently yielded.
    pub fn skip_subtree(&mut self) {
        self.pending = None;
    }
}

impl<'a> Iterator for Descendants<'a> {
    type Item = (&'a Node, usize);

    fn next(&mut self) -> Option<Self::Item> {
        if let Some((node, pos)) = self.pending.take() {
            if !node.children().is_empty() {
                self.stack.push((node.children().iter(), pos + 1));
            }
        }
        loop {
            let (iter, next_pos) = self.stack.last_mut()?;
            match iter.next() {
                Some(child) => {
                    let pos = *next_pos;
                    *next_pos += child.node_size();
                    self.pending = Some((child, pos));
                    return Some((child, pos));
                }
                None => {
                    self.stack.pop();
                }
            }
        }
    }
}

impl Node {
    /// All descendants in document order with their absolute positions.
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants {
            stack: vec![(self.children().iter(), 0)],
            pending: None,
        }
    }
}
