//! # Quire Editor
//!
//! Editing engine for paged documents: transactions, history, pagination
//! and the view that ties them together.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ commands / table: named edits → Transaction │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ view: the single current revision           │
//! │  - apply transactions, record history       │
//! │  - post-effects (block ids)                 │
//! │  - settle loop → pagination engine          │
//! │  - geometry, toolbar state, observers       │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ layout oracle: block heights per region     │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **Revisions are values**: a transaction derives a new tree and never
//!    touches the old one
//! 2. **One writer**: only the view replaces the current revision
//! 3. **Reactive pagination**: overflow is corrected after a settle point,
//!    one page boundary per cycle
//! 4. **Corrections are not edits**: they fold into history instead of
//!    adding undo levels
//!
//! ## Usage
//!
//! ```rust,ignore
//! use quire_editor::{Command, EditorConfig, EditorView};
//!
//! let mut view = EditorView::new(doc, EditorConfig::default())?;
//! view.execute(Command::InsertText { text: "Hello".into() })?;
//! view.execute(Command::SplitBlock)?; // settles pagination
//! let outline = view.snapshot().outline;
//! ```

mod commands;
mod config;
mod document;
mod errors;
mod geometry;
mod layout;
mod mapping;
mod pagination;
mod post_effects;
mod selection;
mod step;
mod table;
mod toolbar;
mod transaction;
mod undo_stack;
mod view;

pub use commands::{build as build_command, BlockKind, Command};
pub use config::{
    EditorConfig, HistoryConfig, PageGeometry, PaginationConfig, SettleTrigger, TextMetrics,
};
pub use document::EditorState;
pub use errors::{EditorError, EditorResult, MeasurementUnavailable};
pub use geometry::{Geometry, Rect};
pub use layout::{EstimatingLayout, LayoutOracle, UniformLayout};
pub use mapping::{Assoc, Mapping, StepMap};
pub use pagination::{Correction, PageFit, Paginator, Scan};
pub use post_effects::{AssignBlockIds, PostEffect, PostEffectEngine};
pub use selection::Selection;
pub use step::Step;
pub use table::TableCommand;
pub use toolbar::{active_states, comment_at, comments, outline, ActiveStates, CommentSpan, OutlineEntry};
pub use transaction::{Origin, Transaction};
pub use undo_stack::{StepBatch, UndoStack};
pub use view::{CorrectionSummary, EditorView, SettleReport, ViewObserver, ViewSnapshot};

// Re-export the model for convenience
pub use quire_model as model;
