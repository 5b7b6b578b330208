//! # Post-Effect System
//!
//! Applied transactions may leave the document needing follow-up changes to
//! stay consistent. The one built-in effect gives every block-group node a
//! stable identifier.
//!
//! ## Design
//!
//! Post-effects are:
//! - **Read-then-write**: `analyze` only inspects a revision and returns
//!   steps; the engine applies them in one transaction
//! - **Idempotent**: a revision that needs nothing yields no steps
//! - **Bounded**: the engine repeats the effects until none produce steps,
//!   up to a fixed number of rounds

use crate::document::EditorState;
use crate::errors::EditorResult;
use crate::step::Step;
use crate::transaction::{Origin, Transaction};
use quire_model::{walk_doc, walk_node, IdSource, Node, UuidIds, Visitor};
use std::fmt;
use tracing::{debug, warn};

const MAX_ROUNDS: usize = 8;

/// Post-effect that inspects a settled revision.
pub trait PostEffect: Send {
    fn name(&self) -> &'static str;

    /// Steps (expressed against `doc`) that restore consistency.
    fn analyze(&mut self, doc: &Node) -> Vec<Step>;
}

/// Gives every block-group node without an `id` a fresh one. Existing ids
/// are never touched.
pub struct AssignBlockIds {
    ids: Box<dyn IdSource>,
}

impl AssignBlockIds {
    pub fn new(ids: impl IdSource + 'static) -> Self {
        Self { ids: Box::new(ids) }
    }
}

impl Default for AssignBlockIds {
    fn default() -> Self {
        Self::new(UuidIds)
    }
}

impl fmt::Debug for AssignBlockIds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssignBlockIds").finish_non_exhaustive()
    }
}

/// Collects positions of id-carrying nodes that lack an id.
#[derive(Default)]
struct MissingIds {
    found: Vec<(usize, Node)>,
}

impl Visitor for MissingIds {
    fn visit_node(&mut self, node: &Node, pos: usize) {
        if node.kind().carries_id() && node.id().is_none() {
            self.found.push((pos, node.clone()));
        }
        walk_node(self, node, pos);
    }
}

impl PostEffect for AssignBlockIds {
    fn name(&self) -> &'static str {
        "assign_block_ids"
    }

    fn analyze(&mut self, doc: &Node) -> Vec<Step> {
        let mut missing = MissingIds::default();
        walk_doc(&mut missing, doc);

        missing
            .found
            .into_iter()
            .map(|(pos, node)| Step::SetAttributes {
                pos,
                attrs: node.attrs().clone().with_id(Some(self.ids.next_id())),
            })
            .collect()
    }
}

/// Runs registered post-effects over a revision.
pub struct PostEffectEngine {
    effects: Vec<Box<dyn PostEffect>>,
}

impl PostEffectEngine {
    /// Engine with the default effects (UUID block ids).
    pub fn new() -> Self {
        Self::with_ids(UuidIds)
    }

    /// Engine whose id assignment draws from `ids`.
    pub fn with_ids(ids: impl IdSource + 'static) -> Self {
        Self {
            effects: vec![Box::new(AssignBlockIds::new(ids))],
        }
    }

    /// Engine with no effects at all.
    pub fn empty() -> Self {
        Self { effects: Vec::new() }
    }

    pub fn register(&mut self, effect: impl PostEffect + 'static) {
        self.effects.push(Box::new(effect));
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    /// Build one transaction carrying every follow-up step for `state`, or
    /// `None` when the revision is already consistent.
    pub fn run(&mut self, state: &EditorState) -> EditorResult<Option<Transaction>> {
        let mut tr = state.tr();
        tr.set_origin(Origin::PostEffect).set_add_to_history(false);

        for _ in 0..MAX_ROUNDS {
            let mut produced = 0;
            for effect in &mut self.effects {
                let steps = effect.analyze(tr.doc());
                if steps.is_empty() {
                    continue;
                }
                debug!(effect = effect.name(), steps = steps.len(), "post-effect");
                produced += steps.len();
                for step in steps {
                    tr.step(step)?;
                }
            }
            if produced == 0 {
                return Ok(tr.doc_changed().then_some(tr));
            }
        }

        warn!(rounds = MAX_ROUNDS, "post-effects did not settle");
        Ok(tr.doc_changed().then_some(tr))
    }
}

impl Default for PostEffectEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for PostEffectEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.effects.iter().map(|e| e.name()).collect();
        f.debug_struct("PostEffectEngine").field("effects", &names).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quire_model::builders::*;
    use quire_model::{NodeKind, SequentialIds};

    fn ids(doc: &Node) -> Vec<(NodeKind, Option<String>)> {
        doc.descendants()
            .filter(|(n, _)| n.kind().carries_id())
            .map(|(n, _)| (n.kind(), n.id().map(str::to_string)))
            .collect()
    }

    #[test]
    fn test_post_effect_engine_creation() {
        let engine = PostEffectEngine::new();
        assert_eq!(engine.len(), 1);
        assert!(PostEffectEngine::empty().is_empty());
    }

    #[test]
    fn test_assigns_missing_ids_in_document_order() {
        let state = EditorState::new(doc(vec![page(
            vec![paragraph("h")],
            vec![paragraph("a"), bullet_list(vec!["x"])],
            vec![],
        )]))
        .unwrap();
        let mut engine = PostEffectEngine::with_ids(SequentialIds::new("t"));
        let tr = engine.run(&state).unwrap().unwrap();
        assert_eq!(tr.origin(), Origin::PostEffect);
        assert!(!tr.add_to_history());

        let assigned = ids(tr.doc());
        assert!(assigned.iter().all(|(_, id)| id.is_some()));
        assert_eq!(assigned[0].1.as_deref(), Some("t-1"));
        assert_eq!(assigned[1].1.as_deref(), Some("t-2"));
    }

    #[test]
    fn test_existing_ids_are_kept_and_second_run_is_noop() {
        let mut engine = PostEffectEngine::with_ids(SequentialIds::new("t"));
        let state = EditorState::new(doc(vec![page(vec![], vec![paragraph("a")], vec![])])).unwrap();
        let tr = engine.run(&state).unwrap().unwrap();
        let state = state.apply(&tr).unwrap();
        let before = ids(state.doc());

        assert!(engine.run(&state).unwrap().is_none());
        assert_eq!(ids(state.doc()), before);
    }
}
