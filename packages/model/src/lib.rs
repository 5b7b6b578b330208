//! # Quire Document Model
//!
//! The paged, structured document tree that the editor operates on.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────┐
//! │ schema: NodeKind, content rules, regions      │
//! │ attrs / mark: typed attribute records, marks  │
//! └──────────────────────┬────────────────────────┘
//!                        │ validates
//!                        ▼
//! ┌───────────────────────────────────────────────┐
//! │ node: persistent Arc tree, sizes, JSON        │
//! │ position: resolve(pos) -> ResolvedPos         │
//! │ traversal: Visitor, descendants()             │
//! └──────────────────────┬────────────────────────┘
//!                        │ rebuilds path to root
//!                        ▼
//! ┌───────────────────────────────────────────────┐
//! │ edit: replace / insert / delete / set_attrs   │
//! │       set_kind / add_mark / remove_mark       │
//! └───────────────────────────────────────────────┘
//! ```
//!
//! A revision is a root [`Node`]. Edits return a new root and never mutate
//! their input, so older revisions stay valid for as long as someone holds
//! them.

pub mod attrs;
pub mod builders;
pub mod edit;
pub mod error;
pub mod id;
pub mod mark;
pub mod markup;
pub mod node;
pub mod page;
pub mod position;
pub mod schema;
pub mod traversal;

pub use attrs::{Align, AttrValue, Attrs};
pub use edit::InlineSpan;
pub use error::{ModelError, ModelResult};
pub use id::{IdSource, SequentialIds, UuidIds};
pub use mark::{Mark, MarkKind};
pub use markup::to_html;
pub use node::Node;
pub use page::PageRef;
pub use position::ResolvedPos;
pub use schema::{check_content, ContentRule, NodeKind, NodeRole, Region};
pub use traversal::{walk_doc, walk_node, Descendants, Visitor};
