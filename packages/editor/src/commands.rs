//! # Editor Commands
//!
//! Discrete host commands. Each one inspects a state and builds at most one
//! transaction; `Ok(None)` means the command does not apply here (the
//! equivalent of a disabled toolbar button).
//!
//! Commands never apply anything themselves. The view dispatches what they
//! return, which keeps them pure functions of the state they are given.

use crate::document::EditorState;
use crate::errors::{EditorError, EditorResult};
use crate::selection::Selection;
use crate::table::{self, TableCommand};
use crate::transaction::{Origin, Transaction};
use quire_model::builders::{hard_break, page, paragraph};
use quire_model::{Align, AttrValue, Attrs, Mark, ModelError, Node, NodeKind, ResolvedPos};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Target block type for [`set_block_kind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BlockKind {
    Paragraph,
    Heading { level: u8 },
    CodeBlock,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    ToggleMark { mark: Mark },
    SetBlockKind { kind: BlockKind },
    SetAlignment { align: Align },
    ToggleBulletList,
    ToggleOrderedList,
    ToggleBlockquote,
    InsertTable { rows: usize, cols: usize },
    Table { action: TableCommand },
    InsertStructuredBreak,
    SplitBlock,
    InsertText { text: String },
    DeleteSelection,
    AddComment { id: String, color: String },
    AddPage,
    SetAttribute {
        node_id: String,
        key: String,
        value: AttrValue,
    },
    Undo,
    Redo,
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::ToggleMark { .. } => "toggle_mark",
            Command::SetBlockKind { .. } => "set_block_kind",
            Command::SetAlignment { .. } => "set_alignment",
            Command::ToggleBulletList => "toggle_bullet_list",
            Command::ToggleOrderedList => "toggle_ordered_list",
            Command::ToggleBlockquote => "toggle_blockquote",
            Command::InsertTable { .. } => "insert_table",
            Command::Table { .. } => "table",
            Command::InsertStructuredBreak => "insert_structured_break",
            Command::SplitBlock => "split_block",
            Command::InsertText { .. } => "insert_text",
            Command::DeleteSelection => "delete_selection",
            Command::AddComment { .. } => "add_comment",
            Command::AddPage => "add_page",
            Command::SetAttribute { .. } => "set_attribute",
            Command::Undo => "undo",
            Command::Redo => "redo",
        }
    }
}

/// Build the transaction for a document command. History commands are
/// handled by the view and yield `None` here.
pub fn build(state: &EditorState, command: &Command) -> EditorResult<Option<Transaction>> {
    let tr = match command {
        Command::ToggleMark { mark } => toggle_mark(state, mark)?,
        Command::SetBlockKind { kind } => set_block_kind(state, *kind)?,
        Command::SetAlignment { align } => set_alignment(state, *align)?,
        Command::ToggleBulletList => toggle_list(state, NodeKind::BulletList)?,
        Command::ToggleOrderedList => toggle_list(state, NodeKind::OrderedList)?,
        Command::ToggleBlockquote => toggle_blockquote(state)?,
        Command::InsertTable { rows, cols } => insert_table(state, *rows, *cols)?,
        Command::Table { action } => table::apply(state, action)?,
        Command::InsertStructuredBreak => insert_structured_break(state)?,
        Command::SplitBlock => split_block(state)?,
        Command::InsertText { text } => insert_text(state, text)?,
        Command::DeleteSelection => delete_selection(state)?,
        Command::AddComment { id, color } => add_comment(state, id, color)?,
        Command::AddPage => add_page(state)?,
        Command::SetAttribute {
            node_id,
            key,
            value,
        } => set_attribute(state, node_id, key, value.clone())?,
        Command::Undo | Command::Redo => None,
    };
    if tr.is_none() {
        debug!(command = command.name(), "command does not apply");
    }
    Ok(tr)
}

fn command_tr(state: &EditorState) -> Transaction {
    let mut tr = state.tr();
    tr.set_origin(Origin::Command);
    tr
}

fn selection_range(state: &EditorState) -> (usize, usize) {
    let selection = state.selection();
    (selection.from(state.doc()), selection.to(state.doc()))
}

/// Text blocks overlapping the selection, with their positions.
fn selected_textblocks(state: &EditorState) -> Vec<(usize, Node)> {
    let (from, to) = selection_range(state);
    let mut blocks = Vec::new();
    state.doc().nodes_between(from, to, |node, pos, _| {
        if node.is_textblock() {
            blocks.push((pos, node.clone()));
            return false;
        }
        true
    });
    blocks
}

/// Resolved selection start when it sits inside a text block.
fn textblock_at(state: &EditorState, pos: usize) -> EditorResult<Option<ResolvedPos>> {
    let r = state.doc().resolve(pos)?;
    Ok(r.parent().is_textblock().then_some(r))
}

pub fn toggle_mark(state: &EditorState, mark: &Mark) -> EditorResult<Option<Transaction>> {
    let (from, to) = selection_range(state);
    let kind = mark.kind();
    let mut tr = command_tr(state);

    if from == to {
        let Some(r) = textblock_at(state, from)? else {
            return Ok(None);
        };
        if !r.parent().kind().allows_marks() {
            return Ok(None);
        }
        let current = match state.stored_marks() {
            Some(marks) => marks.to_vec(),
            None => r.marks(),
        };
        let next = match kind.find_in(&current) {
            Some(_) => kind.remove_from_set(&current),
            None => mark.add_to_set(&current),
        };
        tr.set_stored_marks(Some(next));
        return Ok(Some(tr));
    }

    let spans = state.doc().inline_spans(from, to);
    if spans.is_empty() {
        return Ok(None);
    }
    if spans.iter().all(|span| kind.find_in(&span.marks).is_some()) {
        tr.remove_mark(from, to, kind)?;
    } else {
        tr.add_mark(from, to, mark.clone())?;
    }
    Ok(Some(tr))
}

pub fn set_block_kind(state: &EditorState, target: BlockKind) -> EditorResult<Option<Transaction>> {
    let mut tr = command_tr(state);
    // back to front so earlier positions stay valid when sizes change
    for (pos, node) in selected_textblocks(state).into_iter().rev() {
        let id = node.id().map(str::to_string);
        let align = node.attrs().align().unwrap_or_default();
        match target {
            BlockKind::Paragraph | BlockKind::Heading { .. } => {
                let (kind, attrs) = match target {
                    BlockKind::Heading { level } => (
                        NodeKind::Heading,
                        Attrs::Heading {
                            id,
                            level,
                            align,
                        },
                    ),
                    _ => (NodeKind::Paragraph, Attrs::Paragraph { id, align }),
                };
                if node.kind() == kind && *node.attrs() == attrs {
                    continue;
                }
                tr.set_kind(pos, kind, attrs)?;
            }
            BlockKind::CodeBlock => {
                if node.kind() == NodeKind::CodeBlock {
                    continue;
                }
                let text = node.text_content();
                let content = if text.is_empty() {
                    Vec::new()
                } else {
                    vec![Node::text(text)]
                };
                let code = Node::new(NodeKind::CodeBlock, Attrs::Block { id }, content)?;
                tr.replace(pos, pos + node.node_size(), vec![code])?;
            }
        }
    }
    Ok(tr.doc_changed().then_some(tr))
}

pub fn set_alignment(state: &EditorState, align: Align) -> EditorResult<Option<Transaction>> {
    let mut tr = command_tr(state);
    for (pos, node) in selected_textblocks(state) {
        match node.attrs().align() {
            Some(current) if current != align => {
                tr.set_node_attrs(pos, node.attrs().clone().with_align(align))?;
            }
            _ => {}
        }
    }
    Ok(tr.doc_changed().then_some(tr))
}

/// The sibling blocks covered by the selection: their container's depth
/// and the index range inside it.
struct BlockRange {
    depth: usize,
    start: usize,
    end: usize,
    /// Position before the first block.
    pos: usize,
}

fn block_range(state: &EditorState) -> EditorResult<Option<(BlockRange, Vec<Node>)>> {
    let doc = state.doc();
    let (from, to) = selection_range(state);
    let start = doc.resolve(from)?;
    let end = doc.resolve(to)?;

    let mut depth = start.shared_depth(to);
    if start.node(depth).is_textblock() {
        depth -= 1;
    }
    // regions, quotes, list items and cells hold blocks
    let container = start.node(depth);
    if depth < 2 || container.is_textblock() {
        return Ok(None);
    }
    let first = start.index(depth);
    let last = end.index(depth).max(first);
    let blocks: Vec<Node> = container
        .children()
        .get(first..=last.min(container.child_count().saturating_sub(1)))
        .map(<[Node]>::to_vec)
        .unwrap_or_default();
    if blocks.is_empty() {
        return Ok(None);
    }
    let pos = start.start(depth)
        + container.children()[..first]
            .iter()
            .map(Node::node_size)
            .sum::<usize>();
    Ok(Some((
        BlockRange {
            depth,
            start: first,
            end: first + blocks.len(),
            pos,
        },
        blocks,
    )))
}

/// Index of the block (by start offsets) holding `pos`.
fn segment(starts: &[usize], pos: usize) -> usize {
    starts.partition_point(|start| *start <= pos).saturating_sub(1)
}

fn starts_of(pos: usize, nodes: &[Node]) -> Vec<usize> {
    nodes
        .iter()
        .scan(pos, |at, node| {
            let start = *at;
            *at += node.node_size();
            Some(start)
        })
        .collect()
}

pub fn toggle_list(state: &EditorState, list_kind: NodeKind) -> EditorResult<Option<Transaction>> {
    let doc = state.doc();
    let (from, _) = selection_range(state);
    let r = doc.resolve(from)?;
    let mut tr = command_tr(state);

    if let Some(depth) = r.find_ancestor(|n| n.kind().is_list()) {
        let list = r.node(depth).clone();
        let before = r.before(depth);
        if list.kind() != list_kind {
            let attrs = Attrs::Block {
                id: list.id().map(str::to_string),
            };
            tr.set_kind(before, list_kind, attrs)?;
            return Ok(Some(tr));
        }

        // lift every item's blocks out of the list
        let items = list.children();
        let starts = starts_of(before + 1, items);
        let lifted: Vec<Node> = items.iter().flat_map(|item| item.children().to_vec()).collect();
        let end = before + list.node_size();
        tr.replace(before, end, lifted)?;
        let relocated = state.selection().relocated(
            before..end,
            |pos| pos.saturating_sub(2 + 2 * segment(&starts, pos)),
            tr.mapping(),
        );
        if let Some(selection) = relocated {
            tr.set_selection(selection)?;
        }
        return Ok(Some(tr));
    }

    let Some((range, blocks)) = block_range(state)? else {
        return Ok(None);
    };
    let mut items = Vec::with_capacity(blocks.len());
    for block in &blocks {
        let paragraph = match block.kind() {
            NodeKind::Paragraph => block.clone(),
            NodeKind::Heading => block.with_markup(
                NodeKind::Paragraph,
                Attrs::Paragraph {
                    id: block.id().map(str::to_string),
                    align: block.attrs().align().unwrap_or_default(),
                },
            ),
            _ => return Ok(None),
        };
        items.push(Node::new(
            NodeKind::ListItem,
            Attrs::default_for(NodeKind::ListItem),
            vec![paragraph],
        )?);
    }
    let list = Node::new(list_kind, Attrs::default_for(list_kind), items)?;
    let end = range.pos + blocks.iter().map(Node::node_size).sum::<usize>();
    let starts = starts_of(range.pos, &blocks);
    tr.replace(range.pos, end, vec![list])?;
    let relocated = state.selection().relocated(
        range.pos..end,
        |pos| pos + 2 + 2 * segment(&starts, pos),
        tr.mapping(),
    );
    if let Some(selection) = relocated {
        tr.set_selection(selection)?;
    }
    debug!(depth = range.depth, from = range.start, to = range.end, "wrapped blocks in list");
    Ok(Some(tr))
}

pub fn toggle_blockquote(state: &EditorState) -> EditorResult<Option<Transaction>> {
    let doc = state.doc();
    let (from, _) = selection_range(state);
    let r = doc.resolve(from)?;
    let mut tr = command_tr(state);

    if let Some(depth) = r.depth_of(NodeKind::Blockquote) {
        let quote = r.node(depth).clone();
        let before = r.before(depth);
        let end = before + quote.node_size();
        tr.replace(before, end, quote.children().to_vec())?;
        if let Some(selection) =
            state
                .selection()
                .relocated(before..end, |pos| pos.saturating_sub(1), tr.mapping())
        {
            tr.set_selection(selection)?;
        }
        return Ok(Some(tr));
    }

    let Some((range, blocks)) = block_range(state)? else {
        return Ok(None);
    };
    let end = range.pos + blocks.iter().map(Node::node_size).sum::<usize>();
    let quote = Node::new(
        NodeKind::Blockquote,
        Attrs::default_for(NodeKind::Blockquote),
        blocks,
    )?;
    tr.replace(range.pos, end, vec![quote])?;
    if let Some(selection) = state
        .selection()
        .relocated(range.pos..end, |pos| pos + 1, tr.mapping())
    {
        tr.set_selection(selection)?;
    }
    Ok(Some(tr))
}

/// Insert a `rows` x `cols` table in place of the selection. An empty text
/// block is replaced, a text block with the cursor inside is split around
/// the table.
pub fn insert_table(state: &EditorState, rows: usize, cols: usize) -> EditorResult<Option<Transaction>> {
    if rows == 0 || cols == 0 {
        return Ok(None);
    }
    let (from, to) = selection_range(state);
    let table = quire_model::builders::table(rows, cols);
    let mut tr = command_tr(state);
    if to > from {
        tr.delete(from, to)?;
    }

    let r = tr.doc().resolve(from)?;
    let at = if r.parent().is_textblock() {
        let parent = r.parent().clone();
        let depth = r.depth();
        let before = r.before(depth);
        let offset = r.parent_offset();
        if parent.content_size() == 0 {
            tr.replace(before, before + parent.node_size(), vec![table])?;
            before
        } else if offset == 0 {
            tr.insert(before, vec![table])?;
            before
        } else if offset == parent.content_size() {
            tr.insert(before + parent.node_size(), vec![table])?;
            before + parent.node_size()
        } else {
            let left = parent.with_content(parent.slice_content(0, offset));
            let right = parent
                .with_attrs(parent.attrs().clone().with_id(None))
                .with_content(parent.slice_content(offset, parent.content_size()));
            let at = before + left.node_size();
            tr.replace(before, before + parent.node_size(), vec![left, table, right])?;
            at
        }
    } else {
        tr.insert(from, vec![table])?;
        from
    };

    // table, row, cell, paragraph
    tr.set_selection(Selection::cursor(at + 4))?;
    Ok(Some(tr))
}

/// Hard line break at the cursor, replacing any selected text.
pub fn insert_structured_break(state: &EditorState) -> EditorResult<Option<Transaction>> {
    let (from, to) = selection_range(state);
    let Some(r) = textblock_at(state, from)? else {
        return Ok(None);
    };
    if r.parent().kind() == NodeKind::CodeBlock {
        return Ok(None);
    }
    let mut tr = command_tr(state);
    tr.replace(from, to, vec![hard_break()])?;
    tr.set_selection(Selection::cursor(from + 1))?;
    Ok(Some(tr))
}

/// Split the text block at the cursor (Enter). Marks a settle point.
pub fn split_block(state: &EditorState) -> EditorResult<Option<Transaction>> {
    let (from, to) = selection_range(state);
    let Some(r) = textblock_at(state, from)? else {
        return Ok(None);
    };
    let mut tr = command_tr(state);
    tr.set_commit(true);

    if r.parent().kind() == NodeKind::CodeBlock {
        tr.replace(from, to, vec![Node::text("\n")])?;
        tr.set_selection(Selection::cursor(from + 1))?;
        return Ok(Some(tr));
    }

    if to > from {
        tr.delete(from, to)?;
    }
    let r = tr.doc().resolve(from)?;
    let parent = r.parent().clone();
    let depth = r.depth();
    let before = r.before(depth);
    let offset = r.parent_offset();

    let left = parent.with_content(parent.slice_content(0, offset));
    let right = if parent.kind() == NodeKind::Heading && offset == parent.content_size() {
        Node::new(NodeKind::Paragraph, Attrs::default_for(NodeKind::Paragraph), Vec::new())?
    } else {
        parent
            .with_attrs(parent.attrs().clone().with_id(None))
            .with_content(parent.slice_content(offset, parent.content_size()))
    };
    let cursor = before + left.node_size() + 1;
    tr.replace(before, before + parent.node_size(), vec![left, right])?;
    tr.set_selection(Selection::cursor(cursor))?;
    Ok(Some(tr))
}

/// Type `text` at the selection, inheriting the marks at the cursor.
pub fn insert_text(state: &EditorState, text: &str) -> EditorResult<Option<Transaction>> {
    if text.is_empty() {
        return Ok(None);
    }
    let (from, to) = selection_range(state);
    let Some(r) = textblock_at(state, from)? else {
        return Ok(None);
    };
    let marks = if r.parent().kind().allows_marks() {
        match state.stored_marks() {
            Some(marks) => marks.to_vec(),
            None => r.marks(),
        }
    } else {
        Vec::new()
    };
    let mut tr = command_tr(state);
    tr.replace(from, to, vec![Node::text_with_marks(text, marks)])?;
    tr.set_selection(Selection::cursor(from + text.chars().count()))?;
    Ok(Some(tr))
}

pub fn delete_selection(state: &EditorState) -> EditorResult<Option<Transaction>> {
    let (from, to) = selection_range(state);
    if from == to {
        return Ok(None);
    }
    let mut tr = command_tr(state);
    tr.delete(from, to)?;
    tr.set_selection(Selection::cursor(from))?;
    Ok(Some(tr))
}

pub fn add_comment(state: &EditorState, id: &str, color: &str) -> EditorResult<Option<Transaction>> {
    let (from, to) = selection_range(state);
    if from == to || state.doc().inline_spans(from, to).is_empty() {
        return Ok(None);
    }
    let mut tr = command_tr(state);
    tr.add_mark(from, to, Mark::comment(id, color))?;
    Ok(Some(tr))
}

/// Append a page holding one empty paragraph and move the cursor there.
pub fn add_page(state: &EditorState) -> EditorResult<Option<Transaction>> {
    let doc = state.doc();
    let new_page = page(Vec::new(), vec![paragraph("")], Vec::new());
    let mut tr = command_tr(state);
    tr.insert(doc.content_size(), vec![new_page])?;
    let start = tr
        .doc()
        .page(doc.page_count())
        .map(|p| p.content_start() + 1)
        .unwrap_or_else(|| tr.doc().content_size());
    tr.set_selection(Selection::cursor(start))?;
    Ok(Some(tr))
}

/// Set one attribute on the block carrying `node_id`. Ids themselves are
/// assigned by the editor and cannot be changed this way.
pub fn set_attribute(
    state: &EditorState,
    node_id: &str,
    key: &str,
    value: AttrValue,
) -> EditorResult<Option<Transaction>> {
    let (pos, node) = state
        .doc()
        .find_by_id(node_id)
        .ok_or_else(|| EditorError::NodeNotFound(node_id.to_string()))?;
    if key == "id" {
        return Err(ModelError::schema(node.kind(), "block ids are managed by the editor").into());
    }
    let mut attrs = node.attrs().clone();
    attrs.set(node.kind(), key, value)?;
    if attrs == *node.attrs() {
        return Ok(None);
    }
    let mut tr = command_tr(state);
    tr.set_node_attrs(pos, attrs)?;
    Ok(Some(tr))
}
