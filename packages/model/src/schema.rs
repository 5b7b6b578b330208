//! # Node Taxonomy
//!
//! The closed set of node kinds, the role each one plays in a paged
//! document and the content pattern it accepts.
//!
//! ```text
//! doc        page+
//! page       header content footer
//! header     block*
//! content    block*
//! footer     block*
//! paragraph  inline*          heading    inline*
//! blockquote block+           code_block text*   (no marks)
//! bullet_list / ordered_list  list_item+
//! list_item  paragraph block*
//! table      table_row+       table_row  (table_cell | table_header)+
//! table_cell / table_header   block+
//! ```
//!
//! The taxonomy is policy only. Edits consult [`check_content`] before a new
//! revision is produced; nothing here mutates a tree.

use crate::error::{ModelError, ModelResult};
use crate::node::Node;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Every node kind the document model knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Doc,
    Page,
    Header,
    Content,
    Footer,
    Paragraph,
    Heading,
    Blockquote,
    HorizontalRule,
    CodeBlock,
    BulletList,
    OrderedList,
    ListItem,
    Table,
    TableRow,
    TableCell,
    TableHeader,
    Image,
    HardBreak,
    Text,
}

/// Structural role of a kind inside a paged document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeRole {
    Root,
    Page,
    /// One of the three fixed children of a page.
    Region,
    /// Member of the `block` group.
    Block,
    /// Container that only appears inside a specific parent
    /// (list items, table rows and cells).
    Structural,
    /// Member of the `inline` group.
    Inline,
}

/// Content pattern accepted by a kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentRule {
    /// No children at all.
    Leaf,
    /// `page+`
    Pages,
    /// `header content footer`, in that order.
    Regions,
    /// Block nodes, at least `min` of them.
    Blocks { min: usize },
    /// `inline*`
    Inline,
    /// `text*` without marks.
    PlainText,
    /// `list_item+`
    ListItems,
    /// `paragraph block*`
    ListItemBody,
    /// `table_row+`
    Rows,
    /// `(table_cell | table_header)+`
    Cells,
}

/// The three fixed regions of a page, in document order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Region {
    Header,
    Content,
    Footer,
}

impl Region {
    pub const ALL: [Region; 3] = [Region::Header, Region::Content, Region::Footer];

    pub fn kind(self) -> NodeKind {
        match self {
            Region::Header => NodeKind::Header,
            Region::Content => NodeKind::Content,
            Region::Footer => NodeKind::Footer,
        }
    }

    /// Child index of this region inside its page.
    pub fn index(self) -> usize {
        match self {
            Region::Header => 0,
            Region::Content => 1,
            Region::Footer => 2,
        }
    }
}

impl NodeKind {
    pub fn name(self) -> &'static str {
        match self {
            NodeKind::Doc => "doc",
            NodeKind::Page => "page",
            NodeKind::Header => "header",
            NodeKind::Content => "content",
            NodeKind::Footer => "footer",
            NodeKind::Paragraph => "paragraph",
            NodeKind::Heading => "heading",
            NodeKind::Blockquote => "blockquote",
            NodeKind::HorizontalRule => "horizontal_rule",
            NodeKind::CodeBlock => "code_block",
            NodeKind::BulletList => "bullet_list",
            NodeKind::OrderedList => "ordered_list",
            NodeKind::ListItem => "list_item",
            NodeKind::Table => "table",
            NodeKind::TableRow => "table_row",
            NodeKind::TableCell => "table_cell",
            NodeKind::TableHeader => "table_header",
            NodeKind::Image => "image",
            NodeKind::HardBreak => "hard_break",
            NodeKind::Text => "text",
        }
    }

    pub fn role(self) -> NodeRole {
        match self {
            NodeKind::Doc => NodeRole::Root,
            NodeKind::Page => NodeRole::Page,
            NodeKind::Header | NodeKind::Content | NodeKind::Footer => NodeRole::Region,
            NodeKind::Paragraph
            | NodeKind::Heading
            | NodeKind::Blockquote
            | NodeKind::HorizontalRule
            | NodeKind::CodeBlock
            | NodeKind::BulletList
            | NodeKind::OrderedList
            | NodeKind::Table => NodeRole::Block,
            NodeKind::ListItem | NodeKind::TableRow | NodeKind::TableCell | NodeKind::TableHeader => {
                NodeRole::Structural
            }
            NodeKind::Image | NodeKind::HardBreak | NodeKind::Text => NodeRole::Inline,
        }
    }

    pub fn content_rule(self) -> ContentRule {
        match self {
            NodeKind::Doc => ContentRule::Pages,
            NodeKind::Page => ContentRule::Regions,
            NodeKind::Header | NodeKind::Content | NodeKind::Footer => ContentRule::Blocks { min: 0 },
            NodeKind::Paragraph | NodeKind::Heading => ContentRule::Inline,
            NodeKind::CodeBlock => ContentRule::PlainText,
            NodeKind::Blockquote | NodeKind::TableCell | NodeKind::TableHeader => {
                ContentRule::Blocks { min: 1 }
            }
            NodeKind::BulletList | NodeKind::OrderedList => ContentRule::ListItems,
            NodeKind::ListItem => ContentRule::ListItemBody,
            NodeKind::Table => ContentRule::Rows,
            NodeKind::TableRow => ContentRule::Cells,
            NodeKind::HorizontalRule | NodeKind::Image | NodeKind::HardBreak | NodeKind::Text => {
                ContentRule::Leaf
            }
        }
    }

    pub fn is_block(self) -> bool {
        self.role() == NodeRole::Block
    }

    pub fn is_inline(self) -> bool {
        self.role() == NodeRole::Inline
    }

    pub fn is_region(self) -> bool {
        self.role() == NodeRole::Region
    }

    /// Leaf kinds occupy a single position unit (text aside).
    pub fn is_leaf(self) -> bool {
        self.content_rule() == ContentRule::Leaf
    }

    /// Block holding inline content directly.
    pub fn is_textblock(self) -> bool {
        matches!(
            self.content_rule(),
            ContentRule::Inline | ContentRule::PlainText
        )
    }

    pub fn is_list(self) -> bool {
        matches!(self, NodeKind::BulletList | NodeKind::OrderedList)
    }

    pub fn is_cell(self) -> bool {
        matches!(self, NodeKind::TableCell | NodeKind::TableHeader)
    }

    /// Block-group kinds get a stable generated identifier.
    pub fn carries_id(self) -> bool {
        self.is_block()
    }

    /// Whether inline children of this kind may carry marks.
    pub fn allows_marks(self) -> bool {
        self.content_rule() == ContentRule::Inline
    }

    pub fn region(self) -> Option<Region> {
        match self {
            NodeKind::Header => Some(Region::Header),
            NodeKind::Content => Some(Region::Content),
            NodeKind::Footer => Some(Region::Footer),
            _ => None,
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Check that `children` satisfies the content pattern of `kind`.
pub fn check_content(kind: NodeKind, children: &[Node]) -> ModelResult<()> {
    let violation = |reason: String| Err(ModelError::schema(kind, reason));

    match kind.content_rule() {
        ContentRule::Leaf => {
            if !children.is_empty() {
                return violation("leaf node cannot hold content".to_string());
            }
        }
        ContentRule::Pages => {
            if children.is_empty() {
                return violation("expected at least one page".to_string());
            }
            if let Some(child) = children.iter().find(|c| c.kind() != NodeKind::Page) {
                return violation(format!("{} cannot be a direct child", child.kind()));
            }
        }
        ContentRule::Regions => {
            let kinds: Vec<NodeKind> = children.iter().map(Node::kind).collect();
            if kinds != [NodeKind::Header, NodeKind::Content, NodeKind::Footer] {
                return violation(format!(
                    "expected header, content, footer but found [{}]",
                    kinds.iter().map(|k| k.name()).collect::<Vec<_>>().join(", ")
                ));
            }
        }
        ContentRule::Blocks { min } => {
            if children.len() < min {
                return violation(format!("expected at least {} block(s)", min));
            }
            if let Some(child) = children.iter().find(|c| !c.kind().is_block()) {
                return violation(format!("{} is not a block", child.kind()));
            }
        }
        ContentRule::Inline => {
            if let Some(child) = children.iter().find(|c| !c.kind().is_inline()) {
                return violation(format!("{} is not inline content", child.kind()));
            }
        }
        ContentRule::PlainText => {
            if let Some(child) = children.iter().find(|c| c.kind() != NodeKind::Text) {
                return violation(format!("{} is not plain text", child.kind()));
            }
            if children.iter().any(|c| !c.marks().is_empty()) {
                return violation("marks are not allowed here".to_string());
            }
        }
        ContentRule::ListItems => {
            if children.is_empty() {
                return violation("expected at least one list_item".to_string());
            }
            if let Some(child) = children.iter().find(|c| c.kind() != NodeKind::ListItem) {
                return violation(format!("{} is not a list_item", child.kind()));
            }
        }
        ContentRule::ListItemBody => match children.split_first() {
            Some((first, rest)) if first.kind() == NodeKind::Paragraph => {
                if let Some(child) = rest.iter().find(|c| !c.kind().is_block()) {
                    return violation(format!("{} is not a block", child.kind()));
                }
            }
            _ => return violation("list_item must start with a paragraph".to_string()),
        },
        ContentRule::Rows => {
            if children.is_empty() {
                return violation("expected at least one table_row".to_string());
            }
            if let Some(child) = children.iter().find(|c| c.kind() != NodeKind::TableRow) {
                return violation(format!("{} is not a table_row", child.kind()));
            }
        }
        ContentRule::Cells => {
            if children.is_empty() {
                return violation("expected at least one cell".to_string());
            }
            if let Some(child) = children.iter().find(|c| !c.kind().is_cell()) {
                return violation(format!("{} is not a table cell", child.kind()));
            }
        }
    }

    Ok(())
}
