//! # Editor State
//!
//! One settled revision of the document together with its selection.
//!
//! States are immutable values. Applying a transaction produces the next
//! state and bumps the version, which is how stale transactions (built
//! against an older state) are detected and rejected.

use crate::errors::{EditorError, EditorResult};
use crate::selection::Selection;
use crate::transaction::Transaction;
use quire_model::{Mark, ModelError, Node, NodeKind};

#[derive(Debug, Clone)]
pub struct EditorState {
    doc: Node,
    selection: Selection,
    stored_marks: Option<Vec<Mark>>,
    /// Current version number (increments on each applied transaction)
    version: u64,
}

impl EditorState {
    /// Create a state for a validated document root, with the cursor at the
    /// first text position.
    pub fn new(doc: Node) -> EditorResult<Self> {
        if doc.kind() != NodeKind::Doc {
            return Err(ModelError::schema(doc.kind(), "document root must be a doc node").into());
        }
        doc.check()?;
        let selection = Selection::at_start(&doc);
        Ok(Self {
            doc,
            selection,
            stored_marks: None,
            version: 0,
        })
    }

    pub fn with_selection(mut self, selection: Selection) -> EditorResult<Self> {
        selection.validate(&self.doc)?;
        self.selection = selection;
        Ok(self)
    }

    pub fn doc(&self) -> &Node {
        &self.doc
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn stored_marks(&self) -> Option<&[Mark]> {
        self.stored_marks.as_deref()
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// Start a transaction against this state.
    pub fn tr(&self) -> Transaction {
        Transaction::new(self)
    }

    /// Produce the next state. The transaction must have been built against
    /// this exact state.
    pub fn apply(&self, tr: &Transaction) -> EditorResult<EditorState> {
        if tr.base_version() != self.version || !tr.before().ptr_eq(&self.doc) {
            return Err(EditorError::StaleTransaction {
                built: tr.base_version(),
                current: self.version,
            });
        }
        Ok(EditorState {
            doc: tr.doc().clone(),
            selection: tr.selection(),
            stored_marks: tr.stored_marks(),
            version: self.version + 1,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quire_model::builders::*;

    #[test]
    fn test_new_rejects_invalid_documents() {
        assert!(EditorState::new(paragraph("x")).is_err());
        let broken = doc(vec![page(vec![], vec![text("loose")], vec![])]);
        assert!(EditorState::new(broken).is_err());
    }

    #[test]
    fn test_apply_bumps_version() {
        let state = EditorState::new(doc(vec![page(vec![], vec![paragraph("a")], vec![])])).unwrap();
        assert_eq!(state.selection(), Selection::cursor(5));

        let mut tr = state.tr();
        tr.insert(5, vec![text("b")]).unwrap();
        let next = state.apply(&tr).unwrap();
        assert_eq!(next.version(), 1);
        assert_eq!(next.doc().node_at(4).unwrap().text_content(), "ba");
        // the old state is untouched
        assert_eq!(state.doc().node_at(4).unwrap().text_content(), "a");
    }

    #[test]
    fn test_stale_transaction_is_rejected() {
        let state = EditorState::new(doc(vec![empty_page()])).unwrap();
        let tr = state.tr();
        let next = state.apply(&tr).unwrap();
        let err = next.apply(&tr).unwrap_err();
        assert!(matches!(err, EditorError::StaleTransaction { built: 0, current: 1 }));
    }
}
