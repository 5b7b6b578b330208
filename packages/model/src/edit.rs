//! Primitive tree edits.
//!
//! Every edit takes a root and returns a new root. The input is never
//! touched; only the path from the edited node up to the root is rebuilt.

use crate::attrs::Attrs;
use crate::error::{ModelError, ModelResult};
use crate::mark::{Mark, MarkKind};
use crate::node::{cut_children, Node};
use crate::position::ResolvedPos;
use crate::schema::{check_content, NodeKind};

/// A clipped run of inline content and the marks it carries.
#[derive(Debug, Clone, PartialEq)]
pub struct InlineSpan {
    pub from: usize,
    pub to: usize,
    pub marks: Vec<Mark>,
}

impl Node {
    /// Replace `from..to` (both inside the same parent) with `nodes`.
    /// Returns the new root and the removed children.
    pub fn replace(&self, from: usize, to: usize, nodes: Vec<Node>) -> ModelResult<(Node, Vec<Node>)> {
        if from > to {
            return Err(ModelError::invalid_range(from, to, "range is reversed"));
        }
        let start = self.resolve(from)?;
        let end = self.resolve(to)?;
        let depth = start.depth();
        if end.depth() != depth || end.start(depth) != start.start(depth) {
            return Err(ModelError::invalid_range(
                from,
                to,
                "range must start and end inside the same parent",
            ));
        }

        let parent = start.parent();
        let removed = parent.slice_content(start.parent_offset(), end.parent_offset());
        if let Some(region) = removed.iter().find(|n| n.kind().is_region()) {
            return Err(ModelError::invalid_range(
                from,
                to,
                format!("{} region cannot be removed", region.kind()),
            ));
        }

        if !parent.kind().allows_marks() && nodes.iter().any(|n| !n.marks().is_empty()) {
            return Err(ModelError::schema(parent.kind(), "marks are not allowed here"));
        }
        for node in &nodes {
            node.check()?;
        }

        let mut content = cut_children(parent.children(), 0, start.parent_offset());
        content.extend(nodes);
        content.extend(cut_children(
            parent.children(),
            end.parent_offset(),
            parent.content_size(),
        ));
        let updated = parent.with_content(content);
        check_content(updated.kind(), updated.children())?;

        Ok((rebuild(&start, depth, updated), removed))
    }

    /// Insert `nodes` at `pos`, splitting text if needed.
    pub fn insert(&self, pos: usize, nodes: Vec<Node>) -> ModelResult<Node> {
        self.replace(pos, pos, nodes).map(|(doc, _)| doc)
    }

    /// Remove `from..to`. Returns the new root and what was removed.
    pub fn delete(&self, from: usize, to: usize) -> ModelResult<(Node, Vec<Node>)> {
        self.replace(from, to, Vec::new())
    }

    /// Replace the attributes of the node starting at `pos`. Returns the new
    /// root and the previous attributes.
    pub fn set_attrs(&self, pos: usize, attrs: Attrs) -> ModelResult<(Node, Attrs)> {
        let (r, target) = self.target_at(pos)?;
        attrs.validate(target.kind())?;
        let previous = target.attrs().clone();
        let updated = target.with_attrs(attrs);
        Ok((replace_child(&r, updated), previous))
    }

    /// Change the kind of the node starting at `pos`, keeping its content.
    /// Returns the new root with the previous kind and attributes.
    pub fn set_kind(&self, pos: usize, kind: NodeKind, attrs: Attrs) -> ModelResult<(Node, NodeKind, Attrs)> {
        let (r, target) = self.target_at(pos)?;
        if target.kind().is_region() || kind.is_region() || target.is_text() || kind == NodeKind::Text {
            return Err(ModelError::schema(target.kind(), format!("cannot become {}", kind)));
        }
        attrs.validate(kind)?;
        check_content(kind, target.children())?;
        if !kind.allows_marks() && target.children().iter().any(|c| !c.marks().is_empty()) {
            return Err(ModelError::schema(kind, "marks are not allowed here"));
        }

        let parent = r.parent();
        let mut siblings = parent.children().to_vec();
        let index = r.index(r.depth());
        let updated = target.with_markup(kind, attrs);
        siblings[index] = updated.clone();
        check_content(parent.kind(), &siblings)?;

        let previous = (target.kind(), target.attrs().clone());
        Ok((replace_child(&r, updated), previous.0, previous.1))
    }

    /// Add `mark` to every inline node in `from..to` whose parent accepts
    /// marks.
    pub fn add_mark(&self, from: usize, to: usize, mark: &Mark) -> ModelResult<Node> {
        self.check_range(from, to)?;
        Ok(map_marks(self, from, to, &|set| mark.add_to_set(set)))
    }

    /// Remove marks of `kind` from every inline node in `from..to`.
    pub fn remove_mark(&self, from: usize, to: usize, kind: MarkKind) -> ModelResult<Node> {
        self.check_range(from, to)?;
        Ok(map_marks(self, from, to, &|set| kind.remove_from_set(set)))
    }

    /// Inline runs inside `from..to` that can carry marks, clipped to the
    /// range.
    pub fn inline_spans(&self, from: usize, to: usize) -> Vec<InlineSpan> {
        let mut spans = Vec::new();
        self.nodes_between(from, to, |node, pos, parent| {
            if node.is_inline() && parent.kind().allows_marks() {
                let start = pos.max(from);
                let end = (pos + node.node_size()).min(to);
                if start < end {
                    spans.push(InlineSpan {
                        from: start,
                        to: end,
                        marks: node.marks().to_vec(),
                    });
                }
            }
            true
        });
        spans
    }

    /// Whether any inline content in `from..to` carries a mark of `kind`.
    pub fn range_has_mark(&self, from: usize, to: usize, kind: MarkKind) -> bool {
        self.inline_spans(from, to)
            .iter()
            .any(|span| kind.find_in(&span.marks).is_some())
    }

    fn check_range(&self, from: usize, to: usize) -> ModelResult<()> {
        if from > to {
            return Err(ModelError::invalid_range(from, to, "range is reversed"));
        }
        if to > self.content_size() {
            return Err(ModelError::out_of_range(to, self.content_size()));
        }
        Ok(())
    }

    fn target_at(&self, pos: usize) -> ModelResult<(ResolvedPos, Node)> {
        let r = self.resolve(pos)?;
        match r.node_after() {
            Some(node) if r.text_offset() == 0 && !node.is_text() => Ok((r, node)),
            _ => Err(ModelError::invalid_range(pos, pos, "no node starts at this position")),
        }
    }
}

/// Swap the child `r` points at inside its parent and rebuild the path.
fn replace_child(r: &ResolvedPos, child: Node) -> Node {
    let parent = r.parent();
    let mut children = parent.children().to_vec();
    children[r.index(r.depth())] = child;
    rebuild(r, r.depth(), parent.with_content(children))
}

/// Rebuild the ancestors above `depth` around a replacement node.
fn rebuild(r: &ResolvedPos, depth: usize, mut node: Node) -> Node {
    for d in (0..depth).rev() {
        let parent = r.node(d);
        let mut children = parent.children().to_vec();
        children[r.index(d)] = node;
        node = parent.with_content(children);
    }
    node
}

/// Apply `f` to the mark sets of inline content inside `from..to`, relative
/// to `node`'s content. Untouched subtrees are shared.
fn map_marks(node: &Node, from: usize, to: usize, f: &dyn Fn(&[Mark]) -> Vec<Mark>) -> Node {
    let mut changed = false;
    let mut children = Vec::with_capacity(node.child_count());
    let mut pos = 0;

    for child in node.children() {
        let end = pos + child.node_size();
        if end <= from || pos >= to {
            children.push(child.clone());
        } else if child.is_inline() && node.kind().allows_marks() {
            let marks = f(child.marks());
            if marks == child.marks() {
                children.push(child.clone());
            } else if child.is_text() {
                let cut_from = from.saturating_sub(pos);
                let cut_to = to.min(end) - pos;
                children.push(child.cut_text(0, cut_from));
                children.push(child.cut_text(cut_from, cut_to).with_marks(marks));
                children.push(child.cut_text(cut_to, child.node_size()));
                changed = true;
            } else {
                children.push(child.with_marks(marks));
                changed = true;
            }
        } else if child.content_size() > 0 {
            let inner = pos + 1;
            let mapped = map_marks(
                child,
                from.saturating_sub(inner),
                child.content_size().min(to.saturating_sub(inner)),
                f,
            );
            changed |= !mapped.ptr_eq(child);
            children.push(mapped);
        } else {
            children.push(child.clone());
        }
        pos = end;
    }

    if changed {
        node.with_content(children)
    } else {
        node.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builders::*;
    use crate::schema::Region;

    fn sample() -> Node {
        // content region starts at 4; paragraphs at 4 and 9
        doc(vec![page(vec![], vec![paragraph("abc"), paragraph("de")], vec![])])
    }

    #[test]
    fn test_insert_splits_text() {
        let d = sample();
        let d2 = d.insert(6, vec![text("X")]).unwrap();
        assert_eq!(d2.node_at(4).unwrap().text_content(), "aXbc");
        assert_eq!(d2.content_size(), d.content_size() + 1);
        // the input revision is untouched
        assert_eq!(d.node_at(4).unwrap().text_content(), "abc");
    }

    #[test]
    fn test_insert_shares_untouched_subtrees() {
        let d = sample();
        let d2 = d.insert(11, vec![text("!")]).unwrap();
        assert!(d.node_at(4).unwrap().ptr_eq(d2.node_at(4).unwrap()));
    }

    #[test]
    fn test_insert_block_under_paragraph_is_rejected() {
        let d = sample();
        let err = d.insert(6, vec![paragraph("nested")]).unwrap_err();
        assert!(matches!(err, ModelError::SchemaViolation { kind: NodeKind::Paragraph, .. }));
    }

    #[test]
    fn test_delete_sole_child_keeps_region() {
        let d = doc(vec![page(vec![], vec![paragraph("only")], vec![])]);
        let (d2, removed) = d.delete(4, 10).unwrap();
        assert_eq!(removed.len(), 1);
        let page = d2.child(0).unwrap();
        assert_eq!(page.child_count(), 3);
        assert_eq!(page.child(Region::Content.index()).unwrap().child_count(), 0);
    }

    #[test]
    fn test_delete_across_parents_is_invalid() {
        let d = sample();
        let err = d.delete(6, 10).unwrap_err();
        assert!(matches!(err, ModelError::InvalidRange { from: 6, to: 10, .. }));
    }

    #[test]
    fn test_delete_region_is_invalid() {
        let d = sample();
        // header spans 1..3
        let err = d.delete(1, 3).unwrap_err();
        assert!(matches!(err, ModelError::InvalidRange { .. }));
    }

    #[test]
    fn test_set_attrs_returns_previous() {
        let d = sample();
        let attrs = Attrs::default_for(NodeKind::Paragraph).with_id(Some("p1".into()));
        let (d2, previous) = d.set_attrs(4, attrs).unwrap();
        assert_eq!(previous.id(), None);
        assert_eq!(d2.node_at(4).unwrap().id(), Some("p1"));
        assert_eq!(d2.content_size(), d.content_size());
    }

    #[test]
    fn test_set_attrs_rejects_wrong_shape() {
        let d = sample();
        assert!(d.set_attrs(4, Attrs::heading(2)).is_err());
        assert!(d.set_attrs(5, Attrs::default_for(NodeKind::Paragraph)).is_err());
    }

    #[test]
    fn test_set_kind_to_heading() {
        let d = sample();
        let (d2, old_kind, _) = d.set_kind(9, NodeKind::Heading, Attrs::heading(2)).unwrap();
        assert_eq!(old_kind, NodeKind::Paragraph);
        let node = d2.node_at(9).unwrap();
        assert_eq!(node.kind(), NodeKind::Heading);
        assert_eq!(node.text_content(), "de");
    }

    #[test]
    fn test_add_mark_over_two_paragraphs() {
        let d = sample();
        let d2 = d.add_mark(6, 11, &Mark::Bold).unwrap();
        let first = d2.node_at(4).unwrap();
        assert_eq!(first.child_count(), 2);
        assert!(first.child(1).unwrap().marks().contains(&Mark::Bold));
        assert!(d2.range_has_mark(10, 11, MarkKind::Bold));
        assert!(!d2.range_has_mark(11, 12, MarkKind::Bold));

        let d3 = d2.remove_mark(0, d2.content_size(), MarkKind::Bold).unwrap();
        assert_eq!(d3, d);
    }

    #[test]
    fn test_add_mark_skips_code_blocks() {
        let d = doc(vec![page(vec![], vec![code_block("let x")], vec![])]);
        let d2 = d.add_mark(0, d.content_size(), &Mark::Bold).unwrap();
        assert!(d2.ptr_eq(&d));
    }
}
