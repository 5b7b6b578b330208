//! # Steps
//!
//! The primitive edits a transaction is made of.
//!
//! Steps are plain serializable values. Applying one to a revision either
//! yields the next revision plus a [`StepMap`] describing how positions
//! moved, or fails without producing anything. Every step can be inverted
//! against the revision it was applied to, which is what the history uses
//! to build undo batches.

use crate::mapping::StepMap;
use quire_model::{Attrs, Mark, MarkKind, ModelResult, Node, NodeKind};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Step {
    /// Place nodes at a position.
    Insert { pos: usize, nodes: Vec<Node> },

    /// Remove the content between two positions in the same parent.
    Delete { from: usize, to: usize },

    /// Swap the content between two positions in the same parent for new
    /// nodes, atomically.
    Replace {
        from: usize,
        to: usize,
        nodes: Vec<Node>,
    },

    /// Replace the attribute record of the node starting at `pos`.
    SetAttributes { pos: usize, attrs: Attrs },

    /// Change the kind (and attributes) of the node starting at `pos`.
    SetKind {
        pos: usize,
        kind: NodeKind,
        attrs: Attrs,
    },

    AddMark { from: usize, to: usize, mark: Mark },

    RemoveMark { from: usize, to: usize, kind: MarkKind },
}

/// Result of applying a step.
#[derive(Debug, Clone)]
pub struct StepResult {
    pub doc: Node,
    pub map: StepMap,
}

fn total_size(nodes: &[Node]) -> usize {
    nodes.iter().map(Node::node_size).sum()
}

impl Step {
    pub fn name(&self) -> &'static str {
        match self {
            Step::Insert { .. } => "insert",
            Step::Delete { .. } => "delete",
            Step::Replace { .. } => "replace",
            Step::SetAttributes { .. } => "set_attributes",
            Step::SetKind { .. } => "set_kind",
            Step::AddMark { .. } => "add_mark",
            Step::RemoveMark { .. } => "remove_mark",
        }
    }

    /// Apply to `doc`, producing the next revision.
    pub fn apply(&self, doc: &Node) -> ModelResult<StepResult> {
        match self {
            Step::Insert { pos, nodes } => Ok(StepResult {
                doc: doc.insert(*pos, nodes.clone())?,
                map: StepMap::new(*pos, 0, total_size(nodes)),
            }),
            Step::Delete { from, to } => Ok(StepResult {
                doc: doc.delete(*from, *to)?.0,
                map: StepMap::new(*from, to - from, 0),
            }),
            Step::Replace { from, to, nodes } => Ok(StepResult {
                doc: doc.replace(*from, *to, nodes.clone())?.0,
                map: StepMap::new(*from, to.saturating_sub(*from), total_size(nodes)),
            }),
            Step::SetAttributes { pos, attrs } => Ok(StepResult {
                doc: doc.set_attrs(*pos, attrs.clone())?.0,
                map: StepMap::identity(),
            }),
            Step::SetKind { pos, kind, attrs } => Ok(StepResult {
                doc: doc.set_kind(*pos, *kind, attrs.clone())?.0,
                map: StepMap::identity(),
            }),
            Step::AddMark { from, to, mark } => Ok(StepResult {
                doc: doc.add_mark(*from, *to, mark)?,
                map: StepMap::identity(),
            }),
            Step::RemoveMark { from, to, kind } => Ok(StepResult {
                doc: doc.remove_mark(*from, *to, *kind)?,
                map: StepMap::identity(),
            }),
        }
    }

    /// Steps that undo this one, given the revision it was applied to.
    pub fn invert(&self, before: &Node) -> ModelResult<Vec<Step>> {
        let inverse = match self {
            Step::Insert { pos, nodes } => vec![Step::Delete {
                from: *pos,
                to: pos + total_size(nodes),
            }],
            Step::Delete { from, to } => {
                let (_, removed) = before.delete(*from, *to)?;
                vec![Step::Insert {
                    pos: *from,
                    nodes: removed,
                }]
            }
            Step::Replace { from, to, nodes } => {
                let (_, removed) = before.delete(*from, *to)?;
                vec![Step::Replace {
                    from: *from,
                    to: from + total_size(nodes),
                    nodes: removed,
                }]
            }
            Step::SetAttributes { pos, .. } => vec![Step::SetAttributes {
                pos: *pos,
                attrs: target(before, *pos)?.attrs().clone(),
            }],
            Step::SetKind { pos, .. } => {
                let node = target(before, *pos)?;
                vec![Step::SetKind {
                    pos: *pos,
                    kind: node.kind(),
                    attrs: node.attrs().clone(),
                }]
            }
            Step::AddMark { from, to, mark } => before
                .inline_spans(*from, *to)
                .into_iter()
                .filter(|span| !mark.is_in_set(&span.marks))
                .map(|span| match mark.kind().find_in(&span.marks) {
                    Some(previous) => Step::AddMark {
                        from: span.from,
                        to: span.to,
                        mark: previous.clone(),
                    },
                    None => Step::RemoveMark {
                        from: span.from,
                        to: span.to,
                        kind: mark.kind(),
                    },
                })
                .collect(),
            Step::RemoveMark { from, to, kind } => before
                .inline_spans(*from, *to)
                .into_iter()
                .filter_map(|span| {
                    kind.find_in(&span.marks).map(|previous| Step::AddMark {
                        from: span.from,
                        to: span.to,
                        mark: previous.clone(),
                    })
                })
                .collect(),
        };
        Ok(inverse)
    }

    /// Whether the step can change content size.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Step::Insert { .. } | Step::Delete { .. } | Step::Replace { .. }
        )
    }
}

fn target(doc: &Node, pos: usize) -> ModelResult<Node> {
    doc.node_at(pos)
        .filter(|node| !node.is_text())
        .cloned()
        .ok_or_else(|| quire_model::ModelError::invalid_range(pos, pos, "no node starts at this position"))
}
