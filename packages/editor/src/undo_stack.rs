//! # Undo/Redo Stack
//!
//! Tracks step history and produces undo/redo transactions.
//!
//! ## Design
//!
//! - Each recorded transaction stores its steps and their inverses
//! - Undo builds a new transaction from the inverses and moves the batch to
//!   the redo stack; redo replays the original steps
//! - New user edits clear the redo stack
//! - Batching groups several transactions into one undo step
//! - Settle corrections (id assignment, pagination) are absorbed into the
//!   entries adjacent to the current revision, so every entry keeps
//!   replaying against the revision it was recorded for

use crate::document::EditorState;
use crate::errors::EditorResult;
use crate::step::Step;
use crate::transaction::{Origin, Transaction};
use tracing::debug;

/// A group of steps that should be undone/redone together
#[derive(Debug, Clone, Default)]
pub struct StepBatch {
    /// The steps in this batch (in application order)
    pub steps: Vec<Step>,

    /// The inverse steps (in undo order)
    pub inverses: Vec<Step>,

    /// Optional description of this batch
    pub description: Option<String>,
}

impl StepBatch {
    pub fn new(steps: Vec<Step>, inverses: Vec<Step>) -> Self {
        Self {
            steps,
            inverses,
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    fn append(&mut self, steps: Vec<Step>, mut inverses: Vec<Step>) {
        self.steps.extend(steps);
        inverses.append(&mut self.inverses);
        self.inverses = inverses;
    }
}

/// Undo/redo stack for document editing
#[derive(Debug)]
pub struct UndoStack {
    /// Applied batches (most recent last)
    undo_stack: Vec<StepBatch>,

    /// Undone batches (most recent last)
    redo_stack: Vec<StepBatch>,

    /// Maximum number of undo levels (0 = unlimited)
    max_levels: usize,

    /// Currently building a batch
    current_batch: Option<StepBatch>,
}

impl UndoStack {
    /// Create a new undo stack with default max levels (100)
    pub fn new() -> Self {
        Self::with_max_levels(100)
    }

    pub fn with_max_levels(max_levels: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_levels,
            current_batch: None,
        }
    }

    /// Record an applied transaction's steps and inverses
    pub fn record(&mut self, steps: Vec<Step>, inverses: Vec<Step>) {
        if steps.is_empty() {
            return;
        }
        match &mut self.current_batch {
            Some(batch) => batch.append(steps, inverses),
            None => self.push_batch(StepBatch::new(steps, inverses)),
        }
    }

    /// Fold a correction applied on top of the current revision into the
    /// neighbouring entries without creating a new undo level.
    pub fn absorb(&mut self, steps: Vec<Step>, inverses: Vec<Step>) {
        if steps.is_empty() {
            return;
        }
        if let Some(batch) = &mut self.current_batch {
            batch.append(steps, inverses);
            return;
        }
        if let Some(top) = self.undo_stack.last_mut() {
            top.append(steps.clone(), inverses.clone());
        }
        if let Some(top) = self.redo_stack.last_mut() {
            // redo now starts from the corrected revision
            let mut redo_steps = inverses;
            redo_steps.append(&mut top.steps);
            top.steps = redo_steps;
            top.inverses.extend(steps);
        }
    }

    /// Start a batch (will be undone/redone together)
    pub fn begin_batch(&mut self) {
        if self.current_batch.is_none() {
            self.current_batch = Some(StepBatch::default());
        }
    }

    /// End the current batch and push to undo stack
    pub fn end_batch(&mut self) {
        if let Some(batch) = self.current_batch.take() {
            if !batch.steps.is_empty() {
                self.push_batch(batch);
            }
        }
    }

    pub fn in_batch(&self) -> bool {
        self.current_batch.is_some()
    }

    /// Set description for current batch (if batching)
    pub fn set_batch_description(&mut self, description: impl Into<String>) {
        if let Some(batch) = &mut self.current_batch {
            batch.description = Some(description.into());
        }
    }

    fn push_batch(&mut self, batch: StepBatch) {
        self.undo_stack.push(batch);

        if self.max_levels > 0 && self.undo_stack.len() > self.max_levels {
            self.undo_stack.remove(0);
        }

        // new action invalidates the future
        self.redo_stack.clear();
    }

    /// Build the transaction undoing the most recent batch. The batch moves
    /// to the redo stack; if its inverses no longer apply it stays put.
    pub fn undo(&mut self, state: &EditorState) -> EditorResult<Option<Transaction>> {
        self.end_batch();
        let Some(batch) = self.undo_stack.pop() else {
            return Ok(None);
        };
        match Transaction::from_steps(state, &batch.inverses) {
            Ok(mut tr) => {
                tr.set_origin(Origin::Undo).set_add_to_history(false);
                debug!(steps = batch.inverses.len(), "undo");
                self.redo_stack.push(batch);
                Ok(Some(tr))
            }
            Err(err) => {
                self.undo_stack.push(batch);
                Err(err)
            }
        }
    }

    /// Build the transaction redoing the most recently undone batch.
    pub fn redo(&mut self, state: &EditorState) -> EditorResult<Option<Transaction>> {
        let Some(batch) = self.redo_stack.pop() else {
            return Ok(None);
        };
        match Transaction::from_steps(state, &batch.steps) {
            Ok(mut tr) => {
                tr.set_origin(Origin::Redo).set_add_to_history(false);
                debug!(steps = batch.steps.len(), "redo");
                self.undo_stack.push(batch);
                Ok(Some(tr))
            }
            Err(err) => {
                self.redo_stack.push(batch);
                Err(err)
            }
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty() || self.current_batch.as_ref().map_or(false, |b| !b.steps.is_empty())
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_levels(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_levels(&self) -> usize {
        self.redo_stack.len()
    }

    /// Clear all undo/redo history
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.current_batch = None;
    }

    /// Description of the batch the next undo would revert
    pub fn undo_description(&self) -> Option<&str> {
        self.undo_stack.last().and_then(|b| b.description.as_deref())
    }
}

impl Default for UndoStack {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quire_model::builders::*;
    use quire_model::Node;

    fn state() -> EditorState {
        EditorState::new(doc(vec![page(vec![], vec![paragraph("abc")], vec![])])).unwrap()
    }

    fn commit(stack: &mut UndoStack, state: &EditorState, tr: Transaction) -> EditorState {
        if tr.add_to_history() {
            stack.record(tr.steps().to_vec(), tr.inverted_steps().unwrap());
        }
        state.apply(&tr).unwrap()
    }

    fn typed(state: &EditorState, at: usize, s: &str) -> Transaction {
        let mut tr = state.tr();
        tr.insert(at, vec![text(s)]).unwrap();
        tr
    }

    fn text_of(state: &EditorState) -> String {
        state.doc().text_content()
    }

    #[test]
    fn test_undo_redo_round_trip() {
        let mut stack = UndoStack::new();
        let s0 = state();
        let s1 = commit(&mut stack, &s0, typed(&s0, 8, "d"));
        assert_eq!(text_of(&s1), "abcd");

        let undo = stack.undo(&s1).unwrap().unwrap();
        assert_eq!(undo.origin(), Origin::Undo);
        let s2 = s1.apply(&undo).unwrap();
        assert_eq!(text_of(&s2), "abc");
        assert!(stack.can_redo());

        let redo = stack.redo(&s2).unwrap().unwrap();
        let s3 = s2.apply(&redo).unwrap();
        assert_eq!(text_of(&s3), "abcd");
        assert!(!stack.can_redo());
    }

    #[test]
    fn test_new_edit_clears_redo() {
        let mut stack = UndoStack::new();
        let s0 = state();
        let s1 = commit(&mut stack, &s0, typed(&s0, 8, "d"));
        let undo = stack.undo(&s1).unwrap().unwrap();
        let s2 = s1.apply(&undo).unwrap();
        commit(&mut stack, &s2, typed(&s2, 5, "z"));
        assert!(!stack.can_redo());
    }

    #[test]
    fn test_batch_undoes_together() {
        let mut stack = UndoStack::new();
        let s0 = state();
        stack.begin_batch();
        stack.set_batch_description("typing");
        let s1 = commit(&mut stack, &s0, typed(&s0, 8, "d"));
        let s2 = commit(&mut stack, &s1, typed(&s1, 9, "e"));
        stack.end_batch();
        assert_eq!(stack.undo_levels(), 1);
        assert_eq!(stack.undo_description(), Some("typing"));

        let undo = stack.undo(&s2).unwrap().unwrap();
        assert_eq!(text_of(&s2.apply(&undo).unwrap()), "abc");
    }

    #[test]
    fn test_absorbed_correction_replays_cleanly() {
        let mut stack = UndoStack::new();
        let s0 = state();
        let s1 = commit(&mut stack, &s0, typed(&s0, 8, "d"));

        // a settle correction appends a paragraph without its own undo level
        let mut fix = s1.tr();
        fix.insert(10, vec![paragraph("fix")]).unwrap();
        fix.set_add_to_history(false);
        stack.absorb(fix.steps().to_vec(), fix.inverted_steps().unwrap());
        let s2 = s1.apply(&fix).unwrap();
        assert_eq!(stack.undo_levels(), 1);

        // undo reverts both the edit and the correction
        let undo = stack.undo(&s2).unwrap().unwrap();
        let s3 = s2.apply(&undo).unwrap();
        assert_eq!(s3.doc(), s0.doc());

        // a correction on the undone revision is folded into the redo entry
        let mut fix = s3.tr();
        fix.insert(4, vec![paragraph("head")]).unwrap();
        stack.absorb(fix.steps().to_vec(), fix.inverted_steps().unwrap());
        let s4 = s3.apply(&fix).unwrap();

        let redo = stack.redo(&s4).unwrap().unwrap();
        let s5 = s4.apply(&redo).unwrap();
        assert_eq!(s5.doc(), s2.doc());

        let undo = stack.undo(&s5).unwrap().unwrap();
        let s6 = s5.apply(&undo).unwrap();
        let expected: &Node = s4.doc();
        assert_eq!(s6.doc(), expected);
    }

    #[test]
    fn test_max_levels() {
        let mut stack = UndoStack::with_max_levels(2);
        let mut s = state();
        for _ in 0..3 {
            let tr = typed(&s, 5, "x");
            s = commit(&mut stack, &s, tr);
        }
        assert_eq!(stack.undo_levels(), 2);
    }
}
