//! Shorthand constructors for documents.
//!
//! These skip content validation so fixtures stay terse; trees built from
//! untrusted input should go through [`Node::new`] or `Node::check`.
//!
//! ```
//! use quire_model::builders::*;
//!
//! let d = doc(vec![page(vec![], vec![heading(1, "Terms"), paragraph("...")], vec![])]);
//! assert_eq!(d.page_count(), 1);
//! ```

use crate::attrs::{Align, Attrs};
use crate::mark::Mark;
use crate::node::{normalize, Node};
use crate::schema::NodeKind;

fn build(kind: NodeKind, attrs: Attrs, content: Vec<Node>) -> Node {
    Node::from_parts(kind, attrs, Vec::new(), normalize(content))
}

fn block(kind: NodeKind, content: Vec<Node>) -> Node {
    build(kind, Attrs::default_for(kind), content)
}

pub fn doc(pages: Vec<Node>) -> Node {
    block(NodeKind::Doc, pages)
}

/// A page with the given blocks in its header, content and footer.
pub fn page(header_blocks: Vec<Node>, content_blocks: Vec<Node>, footer_blocks: Vec<Node>) -> Node {
    block(
        NodeKind::Page,
        vec![header(header_blocks), content(content_blocks), footer(footer_blocks)],
    )
}

/// A page whose three regions are all empty.
pub fn empty_page() -> Node {
    page(Vec::new(), Vec::new(), Vec::new())
}

pub fn header(blocks: Vec<Node>) -> Node {
    block(NodeKind::Header, blocks)
}

pub fn content(blocks: Vec<Node>) -> Node {
    block(NodeKind::Content, blocks)
}

pub fn footer(blocks: Vec<Node>) -> Node {
    block(NodeKind::Footer, blocks)
}

pub fn text(value: &str) -> Node {
    Node::text(value)
}

pub fn text_with_marks(value: &str, marks: Vec<Mark>) -> Node {
    Node::text_with_marks(value, marks)
}

pub fn paragraph(value: &str) -> Node {
    paragraph_with(vec![text(value)])
}

pub fn paragraph_with(inline: Vec<Node>) -> Node {
    block(NodeKind::Paragraph, inline)
}

pub fn aligned_paragraph(value: &str, align: Align) -> Node {
    build(
        NodeKind::Paragraph,
        Attrs::default_for(NodeKind::Paragraph).with_align(align),
        vec![text(value)],
    )
}

pub fn heading(level: u8, value: &str) -> Node {
    build(NodeKind::Heading, Attrs::heading(level), vec![text(value)])
}

pub fn blockquote(blocks: Vec<Node>) -> Node {
    block(NodeKind::Blockquote, blocks)
}

pub fn code_block(value: &str) -> Node {
    block(NodeKind::CodeBlock, vec![text(value)])
}

pub fn horizontal_rule() -> Node {
    block(NodeKind::HorizontalRule, Vec::new())
}

pub fn hard_break() -> Node {
    block(NodeKind::HardBreak, Vec::new())
}

pub fn image(src: &str) -> Node {
    build(NodeKind::Image, Attrs::image(src), Vec::new())
}

pub fn list_item(blocks: Vec<Node>) -> Node {
    block(NodeKind::ListItem, blocks)
}

/// A bullet list with one single-paragraph item per entry.
pub fn bullet_list(items: Vec<&str>) -> Node {
    block(NodeKind::BulletList, items_of(items))
}

pub fn ordered_list(items: Vec<&str>) -> Node {
    block(NodeKind::OrderedList, items_of(items))
}

fn items_of(items: Vec<&str>) -> Vec<Node> {
    items
        .into_iter()
        .map(|item| list_item(vec![paragraph(item)]))
        .collect()
}

pub fn table_cell(blocks: Vec<Node>) -> Node {
    block(NodeKind::TableCell, blocks)
}

pub fn table_header(blocks: Vec<Node>) -> Node {
    block(NodeKind::TableHeader, blocks)
}

pub fn table_row(cells: Vec<Node>) -> Node {
    block(NodeKind::TableRow, cells)
}

/// A `rows` x `cols` table whose cells each hold one empty paragraph.
pub fn table(rows: usize, cols: usize) -> Node {
    block(
        NodeKind::Table,
        (0..rows)
            .map(|_| table_row((0..cols).map(|_| empty_cell()).collect()))
            .collect(),
    )
}

pub fn empty_cell() -> Node {
    table_cell(vec![paragraph("")])
}
