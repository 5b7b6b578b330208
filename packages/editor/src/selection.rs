//! Editor selection.

use crate::mapping::{Assoc, Mapping};
use quire_model::{ModelError, ModelResult, Node};
use serde::{Deserialize, Serialize};
use std::ops::Range;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Selection {
    /// A text range. `anchor` stays put while `head` moves.
    Text { anchor: usize, head: usize },
    /// A single selected node, starting at `pos`.
    Node { pos: usize },
}

impl Selection {
    pub fn cursor(pos: usize) -> Self {
        Selection::Text {
            anchor: pos,
            head: pos,
        }
    }

    pub fn text(anchor: usize, head: usize) -> Self {
        Selection::Text { anchor, head }
    }

    pub fn node(pos: usize) -> Self {
        Selection::Node { pos }
    }

    pub fn anchor(&self) -> usize {
        match *self {
            Selection::Text { anchor, .. } => anchor,
            Selection::Node { pos } => pos,
        }
    }

    pub fn head(&self) -> usize {
        match *self {
            Selection::Text { head, .. } => head,
            Selection::Node { pos } => pos,
        }
    }

    pub fn from(&self, doc: &Node) -> usize {
        match *self {
            Selection::Text { anchor, head } => anchor.min(head),
            Selection::Node { pos } => pos.min(doc.content_size()),
        }
    }

    pub fn to(&self, doc: &Node) -> usize {
        match *self {
            Selection::Text { anchor, head } => anchor.max(head),
            Selection::Node { pos } => doc
                .node_at(pos)
                .map_or(pos, |node| pos + node.node_size())
                .min(doc.content_size()),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(*self, Selection::Text { anchor, head } if anchor == head)
    }

    /// Check that the selection points into `doc`.
    pub fn validate(&self, doc: &Node) -> ModelResult<()> {
        let size = doc.content_size();
        match *self {
            Selection::Text { anchor, head } => {
                for pos in [anchor, head] {
                    if pos > size {
                        return Err(ModelError::out_of_range(pos, size));
                    }
                }
                Ok(())
            }
            Selection::Node { pos } => match doc.node_at(pos) {
                Some(node) if !node.is_text() => Ok(()),
                _ if pos > size => Err(ModelError::out_of_range(pos, size)),
                _ => Err(ModelError::invalid_range(pos, pos, "no node starts at this position")),
            },
        }
    }

    /// Map through `mapping` into `doc`, clamping endpoints that no longer
    /// sit in text onto the nearest valid cursor position.
    pub fn map(&self, doc: &Node, mapping: &Mapping) -> Selection {
        match *self {
            Selection::Text { anchor, head } => {
                let anchor = clamp_to_text(doc, mapping.map(anchor, Assoc::After));
                let head = clamp_to_text(doc, mapping.map(head, Assoc::After));
                Selection::Text { anchor, head }
            }
            Selection::Node { pos } => {
                let mapped = mapping.map(pos, Assoc::After);
                // the node's inside is gone when its first inner position was deleted
                let lost = mapping.map_result(pos + 1, Assoc::Before).deleted;
                match doc.node_at(mapped) {
                    Some(node) if !lost && !node.is_text() => Selection::Node { pos: mapped },
                    _ => Selection::near(doc, mapped),
                }
            }
        }
    }

    /// Endpoints inside `moved` go wherever `relocate` sends them; the rest
    /// are mapped through `mapping`. `None` when no endpoint was inside.
    pub fn relocated(
        &self,
        moved: Range<usize>,
        relocate: impl Fn(usize) -> usize,
        mapping: &Mapping,
    ) -> Option<Selection> {
        let follow = |pos: usize| {
            if moved.contains(&pos) {
                relocate(pos)
            } else {
                mapping.map(pos, Assoc::After)
            }
        };
        match *self {
            Selection::Node { pos } if moved.contains(&pos) => Some(Selection::node(relocate(pos))),
            Selection::Text { anchor, head } if moved.contains(&anchor) || moved.contains(&head) => {
                Some(Selection::text(follow(anchor), follow(head)))
            }
            _ => None,
        }
    }

    /// Cursor at the text position closest to `pos`, preferring positions
    /// after it on a tie. Falls back to a clamped raw position when the
    /// document has no text block at all.
    pub fn near(doc: &Node, pos: usize) -> Selection {
        Selection::cursor(clamp_to_text(doc, pos))
    }

    /// Cursor at the first text position of the document.
    pub fn at_start(doc: &Node) -> Selection {
        Selection::near(doc, 0)
    }

    /// Cursor at the last text position of the document.
    pub fn at_end(doc: &Node) -> Selection {
        Selection::near(doc, doc.content_size())
    }
}

fn in_textblock(doc: &Node, pos: usize) -> bool {
    doc.resolve(pos)
        .map(|r| r.parent().is_textblock())
        .unwrap_or(false)
}

fn clamp_to_text(doc: &Node, pos: usize) -> usize {
    let pos = pos.min(doc.content_size());
    if in_textblock(doc, pos) {
        return pos;
    }

    let mut best: Option<(usize, usize)> = None;
    let mut iter = doc.descendants();
    while let Some((node, at)) = iter.next() {
        if !node.is_textblock() {
            continue;
        }
        iter.skip_subtree();
        let start = at + 1;
        let end = start + node.content_size();
        let candidate = pos.clamp(start, end);
        let distance = candidate.abs_diff(pos);
        let better = match best {
            None => true,
            Some((_, d)) => distance < d || (distance == d && candidate > pos),
        };
        if better {
            best = Some((candidate, distance));
        }
        if start > pos {
            break;
        }
    }
    best.map_or(pos, |(candidate, _)| candidate)
}
