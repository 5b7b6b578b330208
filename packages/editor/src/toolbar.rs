//! Read-only views of a settled state for the host UI: which formatting
//! capabilities are active, the heading outline and comment targets.

use crate::document::EditorState;
use crate::geometry::{Geometry, Rect};
use quire_model::{Align, Mark, MarkKind, Node, NodeKind};
use serde::Serialize;
use std::collections::BTreeMap;

/// Capability name to active flag.
pub type ActiveStates = BTreeMap<&'static str, bool>;

const MARK_CAPABILITIES: [(&str, MarkKind); 5] = [
    ("bold", MarkKind::Bold),
    ("italic", MarkKind::Italic),
    ("underline", MarkKind::Underline),
    ("strikethrough", MarkKind::Strikethrough),
    ("code", MarkKind::Code),
];

const ALIGN_CAPABILITIES: [(&str, Align); 4] = [
    ("align_left", Align::Left),
    ("align_center", Align::Center),
    ("align_right", Align::Right),
    ("align_justify", Align::Justify),
];

pub fn active_states(state: &EditorState) -> ActiveStates {
    let doc = state.doc();
    let selection = state.selection();
    let (from, to) = (selection.from(doc), selection.to(doc));

    let cursor_marks: Vec<Mark> = match state.stored_marks() {
        Some(marks) => marks.to_vec(),
        None => doc.resolve(from).map(|r| r.marks()).unwrap_or_default(),
    };

    let mut active = ActiveStates::new();
    for (name, kind) in MARK_CAPABILITIES {
        let on = if selection.is_empty() {
            kind.find_in(&cursor_marks).is_some()
        } else {
            doc.range_has_mark(from, to, kind)
        };
        active.insert(name, on);
    }

    let aligns = textblock_aligns(doc, from, to);
    for (name, align) in ALIGN_CAPABILITIES {
        let on = !aligns.is_empty() && aligns.iter().all(|a| *a == align);
        active.insert(name, on);
    }

    let ancestors = doc.resolve(from).ok();
    let innermost_list = ancestors.as_ref().and_then(|r| {
        r.find_ancestor(|n| n.kind().is_list())
            .map(|d| r.node(d).kind())
    });
    active.insert("bullet_list", innermost_list == Some(NodeKind::BulletList));
    active.insert("ordered_list", innermost_list == Some(NodeKind::OrderedList));
    active.insert(
        "blockquote",
        ancestors.map_or(false, |r| r.depth_of(NodeKind::Blockquote).is_some()),
    );
    active
}

fn textblock_aligns(doc: &Node, from: usize, to: usize) -> Vec<Align> {
    let mut aligns = Vec::new();
    let mut collect = |node: &Node| {
        if let Some(align) = node.attrs().align() {
            aligns.push(align);
        }
    };
    if from == to {
        if let Ok(r) = doc.resolve(from) {
            collect(r.parent());
        }
    } else {
        doc.nodes_between(from, to, |node, _, _| {
            collect(node);
            !node.is_textblock()
        });
    }
    aligns
}

/// One heading in the document outline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutlineEntry {
    pub level: u8,
    pub text: String,
    pub pos: usize,
    pub id: Option<String>,
    /// Scroll target, when the page could be measured.
    pub rect: Option<Rect>,
}

/// Headings of the document in order.
pub fn outline(doc: &Node, geometry: Option<&Geometry<'_>>) -> Vec<OutlineEntry> {
    let mut entries = Vec::new();
    let mut iter = doc.descendants();
    while let Some((node, pos)) = iter.next() {
        if node.is_textblock() {
            iter.skip_subtree();
        }
        if node.kind() != NodeKind::Heading {
            continue;
        }
        entries.push(OutlineEntry {
            level: node.attrs().level().unwrap_or(1),
            text: node.text_content(),
            pos,
            id: node.id().map(str::to_string),
            rect: geometry.and_then(|g| g.block_rect(doc, pos).ok()),
        });
    }
    entries
}

/// A contiguous range of text carrying one comment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommentSpan {
    pub id: String,
    pub color: String,
    pub from: usize,
    pub to: usize,
    pub text: String,
}

/// Comment ranges in document order. Adjacent runs of the same comment are
/// merged.
pub fn comments(doc: &Node) -> Vec<CommentSpan> {
    let mut spans: Vec<CommentSpan> = Vec::new();
    doc.nodes_between(0, doc.content_size(), |node, pos, _| {
        if !node.is_inline() {
            return true;
        }
        let Some(Mark::Comment { id, color }) = MarkKind::Comment.find_in(node.marks()) else {
            return false;
        };
        let end = pos + node.node_size();
        let text = node.as_text().unwrap_or_default();
        match spans.last_mut() {
            Some(last) if last.id == *id && last.to == pos => {
                last.to = end;
                last.text.push_str(text);
            }
            _ => spans.push(CommentSpan {
                id: id.clone(),
                color: color.clone(),
                from: pos,
                to: end,
                text: text.to_string(),
            }),
        }
        false
    });
    spans
}

/// The comment under `pos`, for click handling.
pub fn comment_at(doc: &Node, pos: usize) -> Option<CommentSpan> {
    comments(doc)
        .into_iter()
        .find(|span| span.from <= pos && pos < span.to)
}

/// Bounding rectangle of the selection.
pub fn selection_rect(state: &EditorState, geometry: &Geometry<'_>) -> Option<Rect> {
    let doc = state.doc();
    let selection = state.selection();
    let start = geometry.coords_at_pos(doc, selection.from(doc)).ok()?;
    let end = geometry.coords_at_pos(doc, selection.to(doc)).ok()?;
    Some(start.union(&end))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::Selection;
    use quire_model::builders::*;

    fn state_with(blocks: Vec<Node>, selection: Selection) -> EditorState {
        EditorState::new(doc(vec![page(vec![], blocks, vec![])]))
            .unwrap()
            .with_selection(selection)
            .unwrap()
    }

    #[test]
    fn test_marks_active_at_cursor_and_over_range() {
        let bold = paragraph_with(vec![text_with_marks("ab", vec![Mark::Bold]), text("cd")]);
        let state = state_with(vec![bold.clone()], Selection::cursor(6));
        let active = active_states(&state);
        assert!(active["bold"]);
        assert!(!active["italic"]);

        let state = state_with(vec![bold], Selection::text(7, 9));
        assert!(!active_states(&state)["bold"]);
    }

    #[test]
    fn test_alignment_and_containers() {
        let state = state_with(
            vec![aligned_paragraph("a", Align::Center), bullet_list(vec!["x"])],
            Selection::cursor(5),
        );
        let active = active_states(&state);
        assert!(active["align_center"]);
        assert!(!active["align_left"]);
        assert!(!active["bullet_list"]);

        // inside the list item paragraph: 7 list, 8 item, 9 paragraph, 10 text
        let state = state_with(
            vec![aligned_paragraph("a", Align::Center), bullet_list(vec!["x"])],
            Selection::cursor(10),
        );
        let active = active_states(&state);
        assert!(active["bullet_list"]);
        assert!(!active["ordered_list"]);
        assert!(!active["blockquote"]);
    }

    #[test]
    fn test_outline_lists_headings_in_order() {
        let d = doc(vec![
            page(vec![], vec![heading(1, "One"), paragraph("body")], vec![]),
            page(vec![], vec![heading(2, "Two")], vec![]),
        ]);
        let entries = outline(&d, None);
        let summary: Vec<(u8, &str)> = entries.iter().map(|e| (e.level, e.text.as_str())).collect();
        assert_eq!(summary, vec![(1, "One"), (2, "Two")]);
        assert_eq!(entries[0].pos, 4);
    }

    #[test]
    fn test_comments_merge_and_hit_test() {
        let note = Mark::comment("c1", "yellow");
        let d = doc(vec![page(
            vec![],
            vec![paragraph_with(vec![
                text("a"),
                text_with_marks("bc", vec![note.clone()]),
                text_with_marks("d", vec![note, Mark::Bold]),
            ])],
            vec![],
        )]);
        let spans = comments(&d);
        assert_eq!(spans.len(), 1);
        assert_eq!((spans[0].from, spans[0].to), (6, 9));
        assert_eq!(spans[0].text, "bcd");
        assert_eq!(comment_at(&d, 7).map(|s| s.id), Some("c1".to_string()));
        assert!(comment_at(&d, 5).is_none());
    }
}
