//! # Edit Transaction
//!
//! An ordered list of steps built against one editor state.
//!
//! Each builder call applies its step to the running document right away,
//! so later steps are expressed in the coordinates produced by the earlier
//! ones. A step that fails leaves the transaction exactly as it was before
//! the call. Nothing is observable until the view applies the finished
//! transaction, and a transaction dropped before that has no effect.
//!
//! ```rust,ignore
//! let mut tr = state.tr();
//! tr.delete(from, to)?.insert(target, nodes)?;
//! tr.set_origin(Origin::Pagination);
//! view.dispatch(tr)?;
//! ```

use crate::document::EditorState;
use crate::errors::EditorResult;
use crate::mapping::Mapping;
use crate::selection::Selection;
use crate::step::Step;
use quire_model::{Attrs, Mark, MarkKind, Node, NodeKind};
use serde::{Deserialize, Serialize};

/// Where a transaction came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    /// Direct host input (typing, paste).
    Input,
    /// A named editor command.
    Command,
    Undo,
    Redo,
    /// Appended by a post-effect such as id assignment.
    PostEffect,
    /// A pagination correction.
    Pagination,
}

#[derive(Debug, Clone)]
pub struct Transaction {
    base_version: u64,
    before: Node,
    start_selection: Selection,
    start_stored_marks: Option<Vec<Mark>>,

    doc: Node,
    steps: Vec<Step>,
    /// Document each step was applied to.
    docs: Vec<Node>,
    mapping: Mapping,

    /// Explicit selection and the number of steps it was set after.
    selection: Option<(Selection, usize)>,
    stored_marks: Option<Option<Vec<Mark>>>,

    origin: Origin,
    add_to_history: bool,
    commit: bool,
}

impl Transaction {
    pub(crate) fn new(state: &EditorState) -> Self {
        Self {
            base_version: state.version(),
            before: state.doc().clone(),
            start_selection: state.selection(),
            start_stored_marks: state.stored_marks().map(<[Mark]>::to_vec),
            doc: state.doc().clone(),
            steps: Vec::new(),
            docs: Vec::new(),
            mapping: Mapping::new(),
            selection: None,
            stored_marks: None,
            origin: Origin::Input,
            add_to_history: true,
            commit: false,
        }
    }

    /// Replay `steps` in order. Fails with the first error and produces no
    /// transaction at all.
    pub fn from_steps(state: &EditorState, steps: &[Step]) -> EditorResult<Self> {
        let mut tr = state.tr();
        for step in steps {
            tr.step(step.clone())?;
        }
        Ok(tr)
    }

    /// Apply one step to the running document.
    pub fn step(&mut self, step: Step) -> EditorResult<&mut Self> {
        let result = step.apply(&self.doc)?;
        let before = std::mem::replace(&mut self.doc, result.doc);
        self.docs.push(before);
        self.mapping.push(result.map);
        self.steps.push(step);
        Ok(self)
    }

    pub fn insert(&mut self, pos: usize, nodes: Vec<Node>) -> EditorResult<&mut Self> {
        self.step(Step::Insert { pos, nodes })
    }

    pub fn delete(&mut self, from: usize, to: usize) -> EditorResult<&mut Self> {
        self.step(Step::Delete { from, to })
    }

    pub fn replace(&mut self, from: usize, to: usize, nodes: Vec<Node>) -> EditorResult<&mut Self> {
        self.step(Step::Replace { from, to, nodes })
    }

    pub fn set_node_attrs(&mut self, pos: usize, attrs: Attrs) -> EditorResult<&mut Self> {
        self.step(Step::SetAttributes { pos, attrs })
    }

    pub fn set_kind(&mut self, pos: usize, kind: NodeKind, attrs: Attrs) -> EditorResult<&mut Self> {
        self.step(Step::SetKind { pos, kind, attrs })
    }

    pub fn add_mark(&mut self, from: usize, to: usize, mark: Mark) -> EditorResult<&mut Self> {
        self.step(Step::AddMark { from, to, mark })
    }

    pub fn remove_mark(&mut self, from: usize, to: usize, kind: MarkKind) -> EditorResult<&mut Self> {
        self.step(Step::RemoveMark { from, to, kind })
    }

    /// Record the resulting selection. Later steps still map it.
    pub fn set_selection(&mut self, selection: Selection) -> EditorResult<&mut Self> {
        selection.validate(&self.doc)?;
        self.selection = Some((selection, self.steps.len()));
        Ok(self)
    }

    pub fn set_stored_marks(&mut self, marks: Option<Vec<Mark>>) -> &mut Self {
        self.stored_marks = Some(marks);
        self
    }

    pub fn set_origin(&mut self, origin: Origin) -> &mut Self {
        self.origin = origin;
        self
    }

    /// Keep this transaction out of the undo history.
    pub fn set_add_to_history(&mut self, add: bool) -> &mut Self {
        self.add_to_history = add;
        self
    }

    /// Mark this transaction as a settle point for pagination.
    pub fn set_commit(&mut self, commit: bool) -> &mut Self {
        self.commit = commit;
        self
    }

    pub fn doc(&self) -> &Node {
        &self.doc
    }

    pub fn before(&self) -> &Node {
        &self.before
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn mapping(&self) -> &Mapping {
        &self.mapping
    }

    pub fn doc_changed(&self) -> bool {
        !self.steps.is_empty()
    }

    pub fn base_version(&self) -> u64 {
        self.base_version
    }

    pub fn origin(&self) -> Origin {
        self.origin
    }

    pub fn add_to_history(&self) -> bool {
        self.add_to_history
    }

    pub fn is_commit(&self) -> bool {
        self.commit
    }

    pub fn selection_set(&self) -> bool {
        self.selection.is_some()
    }

    /// The selection after this transaction: the explicit one if set,
    /// otherwise the starting selection mapped through every step.
    pub fn selection(&self) -> Selection {
        match &self.selection {
            Some((selection, after)) => selection.map(&self.doc, &self.mapping.slice(*after)),
            None => self.start_selection.map(&self.doc, &self.mapping),
        }
    }

    /// Stored marks after this transaction. Changing the document without
    /// setting them explicitly clears them.
    pub fn stored_marks(&self) -> Option<Vec<Mark>> {
        match &self.stored_marks {
            Some(marks) => marks.clone(),
            None if self.doc_changed() => None,
            None => self.start_stored_marks.clone(),
        }
    }

    /// Steps that take the resulting document back to the starting one.
    pub fn inverted_steps(&self) -> EditorResult<Vec<Step>> {
        let mut inverse = Vec::new();
        for (step, doc) in self.steps.iter().zip(&self.docs).rev() {
            inverse.extend(step.invert(doc)?);
        }
        Ok(inverse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quire_model::builders::*;
    use quire_model::ModelError;

    fn state() -> EditorState {
        // content starts at 4; "abc" paragraph at 4..9, "de" at 9..13
        EditorState::new(doc(vec![page(vec![], vec![paragraph("abc"), paragraph("de")], vec![])])).unwrap()
    }

    #[test]
    fn test_steps_run_against_the_running_document() {
        let state = state();
        let mut tr = state.tr();
        tr.insert(4, vec![paragraph("new")]).unwrap();
        // "abc" moved from 4 to 9 after the insert
        tr.set_node_attrs(9, Attrs::default_for(NodeKind::Paragraph).with_id(Some("p".into())))
            .unwrap();
        assert_eq!(tr.doc().node_at(9).unwrap().text_content(), "abc");
        assert_eq!(tr.doc().node_at(9).unwrap().id(), Some("p"));
        assert_eq!(tr.steps().len(), 2);
    }

    #[test]
    fn test_failed_step_leaves_transaction_unchanged() {
        let state = state();
        let mut tr = state.tr();
        tr.delete(4, 9).unwrap();
        let doc = tr.doc().clone();
        let err = tr.insert(6, vec![paragraph("bad")]).unwrap_err();
        assert!(matches!(
            err,
            crate::EditorError::Model(ModelError::SchemaViolation { .. })
        ));
        assert_eq!(tr.steps().len(), 1);
        assert!(tr.doc().ptr_eq(&doc));
    }

    #[test]
    fn test_from_steps_is_all_or_nothing() {
        let state = state();
        let steps = vec![
            Step::Delete { from: 4, to: 9 },
            Step::Delete { from: 1, to: 3 },
        ];
        assert!(Transaction::from_steps(&state, &steps).is_err());
        assert!(Transaction::from_steps(&state, &steps[..1]).is_ok());
    }

    #[test]
    fn test_selection_is_mapped_when_not_set() {
        let state = state().with_selection(Selection::cursor(11)).unwrap();
        let mut tr = state.tr();
        tr.insert(4, vec![paragraph("xy")]).unwrap();
        assert_eq!(tr.selection(), Selection::cursor(15));
    }

    #[test]
    fn test_explicit_selection_maps_through_later_steps() {
        let state = state();
        let mut tr = state.tr();
        tr.set_selection(Selection::cursor(10)).unwrap();
        tr.insert(4, vec![paragraph("xy")]).unwrap();
        assert_eq!(tr.selection(), Selection::cursor(14));
    }

    #[test]
    fn test_inverted_steps_restore_start() {
        let state = state();
        let mut tr = state.tr();
        tr.delete(9, 13).unwrap();
        tr.add_mark(5, 8, Mark::Bold).unwrap();
        tr.insert(4, vec![heading(1, "T")]).unwrap();

        let inverse = tr.inverted_steps().unwrap();
        let restored = inverse
            .iter()
            .fold(tr.doc().clone(), |d, s| s.apply(&d).unwrap().doc);
        assert_eq!(&restored, state.doc());
    }
}
