//! # Editor View
//!
//! Owns the current revision. Every change goes through [`EditorView::dispatch`],
//! which applies the transaction, records history, runs post-effects and,
//! at settle points, drives the pagination engine until the document is
//! stable.
//!
//! ## Settle loop
//!
//! ```text
//! dispatch(tr)
//!   ├─ apply + record history
//!   ├─ post-effects (ids)            ── absorbed into history
//!   └─ commit / everyTransaction?
//!        └─ settle: scan → correct one page boundary → post-effects
//!                   repeat until no page overflows (bounded)
//! ```
//!
//! Corrections never create undo levels of their own. They are folded into
//! the neighbouring history entries so that undo and redo always start from
//! the revision they were recorded against.

use crate::commands::{self, Command};
use crate::config::{EditorConfig, SettleTrigger};
use crate::document::EditorState;
use crate::errors::EditorResult;
use crate::geometry::{Geometry, Rect};
use crate::layout::{EstimatingLayout, LayoutOracle};
use crate::pagination::Paginator;
use crate::post_effects::PostEffectEngine;
use crate::selection::Selection;
use crate::toolbar::{self, ActiveStates, OutlineEntry};
use crate::transaction::{Origin, Transaction};
use crate::undo_stack::UndoStack;
use quire_model::Node;
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

/// What observers see after every settled transaction.
#[derive(Debug, Clone)]
pub struct ViewSnapshot {
    pub doc: Node,
    pub selection: Selection,
    pub version: u64,
    pub active: ActiveStates,
    pub outline: Vec<OutlineEntry>,
    pub selection_rect: Option<Rect>,
}

/// Read-only subscriber to settled revisions.
pub trait ViewObserver: Send {
    fn update(&mut self, snapshot: &ViewSnapshot);
}

impl<F> ViewObserver for F
where
    F: FnMut(&ViewSnapshot) + Send,
{
    fn update(&mut self, snapshot: &ViewSnapshot) {
        self(snapshot)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CorrectionSummary {
    pub page: usize,
    pub moved: usize,
    pub created_page: bool,
}

/// Outcome of one or more settle cycles.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettleReport {
    pub cycles: usize,
    pub corrections: Vec<CorrectionSummary>,
    /// Pages that could not be measured, retried on the next cycle.
    pub skipped: Vec<usize>,
    pub converged: bool,
}

impl SettleReport {
    fn merge(&mut self, cycle: SettleReport) {
        self.cycles += cycle.cycles;
        self.corrections.extend(cycle.corrections);
        for page in cycle.skipped {
            if !self.skipped.contains(&page) {
                self.skipped.push(page);
            }
        }
        self.converged = cycle.converged;
    }
}

pub struct EditorView {
    state: EditorState,
    config: EditorConfig,
    history: UndoStack,
    effects: PostEffectEngine,
    paginator: Paginator,
    oracle: Box<dyn LayoutOracle>,
    observers: Vec<Box<dyn ViewObserver>>,
}

impl EditorView {
    /// A view measuring with the estimating layout and assigning UUID ids.
    pub fn new(doc: Node, config: EditorConfig) -> EditorResult<Self> {
        let oracle = EstimatingLayout::new(&config.page, config.layout);
        Self::with_parts(doc, config, Box::new(oracle), PostEffectEngine::new())
    }

    /// A view with an explicit oracle and post-effect set. Post-effects run
    /// once on the initial document.
    pub fn with_parts(
        doc: Node,
        config: EditorConfig,
        oracle: Box<dyn LayoutOracle>,
        effects: PostEffectEngine,
    ) -> EditorResult<Self> {
        let mut view = Self {
            state: EditorState::new(doc)?,
            history: UndoStack::with_max_levels(config.history.max_levels),
            paginator: Paginator::new(config.page),
            config,
            effects,
            oracle,
            observers: Vec::new(),
        };
        view.run_post_effects()?;
        Ok(view)
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    pub fn doc(&self) -> &Node {
        self.state.doc()
    }

    pub fn selection(&self) -> Selection {
        self.state.selection()
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn history(&self) -> &UndoStack {
        &self.history
    }

    pub fn history_mut(&mut self) -> &mut UndoStack {
        &mut self.history
    }

    /// Swap the measurement service, e.g. when the host re-attaches pages.
    pub fn set_oracle(&mut self, oracle: Box<dyn LayoutOracle>) {
        self.oracle = oracle;
    }

    pub fn subscribe(&mut self, observer: impl ViewObserver + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// Apply a transaction built against the current state.
    ///
    /// A rejected transaction leaves the view exactly as it was.
    #[instrument(skip(self, tr), fields(origin = ?tr.origin(), steps = tr.steps().len()))]
    pub fn dispatch(&mut self, tr: Transaction) -> EditorResult<()> {
        let inverses = if tr.add_to_history() && tr.doc_changed() {
            Some(tr.inverted_steps()?)
        } else {
            None
        };
        self.state = self.state.apply(&tr)?;
        debug!(version = self.state.version(), "transaction applied");
        if let Some(inverses) = inverses {
            self.history.record(tr.steps().to_vec(), inverses);
        }

        self.run_post_effects()?;
        if self.config.pagination.trigger == SettleTrigger::EveryTransaction || tr.is_commit() {
            self.settle()?;
        }
        self.notify();
        Ok(())
    }

    /// Move the selection without touching the document.
    pub fn set_selection(&mut self, selection: Selection) -> EditorResult<()> {
        let mut tr = self.state.tr();
        tr.set_selection(selection)?.set_origin(Origin::Input);
        self.dispatch(tr)
    }

    /// Run a named command. Returns `false` when it does not apply here.
    #[instrument(skip(self, command), fields(command = command.name()))]
    pub fn execute(&mut self, command: Command) -> EditorResult<bool> {
        match command {
            Command::Undo => self.undo(),
            Command::Redo => self.redo(),
            command => {
                let built = commands::build(&self.state, &command).map_err(|err| {
                    debug!(%err, "command rejected");
                    err
                })?;
                match built {
                    Some(tr) => {
                        self.dispatch(tr)?;
                        Ok(true)
                    }
                    None => {
                        debug!("command not applicable");
                        Ok(false)
                    }
                }
            }
        }
    }

    pub fn undo(&mut self) -> EditorResult<bool> {
        match self.history.undo(&self.state)? {
            Some(tr) => {
                self.dispatch(tr)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn redo(&mut self) -> EditorResult<bool> {
        match self.history.redo(&self.state)? {
            Some(tr) => {
                self.dispatch(tr)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// One settle cycle: correct at most one page boundary.
    pub fn settle_cycle(&mut self) -> EditorResult<SettleReport> {
        let scan = self.paginator.scan(&self.state, self.oracle.as_ref())?;
        let mut report = SettleReport {
            cycles: 1,
            skipped: scan.skipped,
            ..SettleReport::default()
        };
        match scan.correction {
            Some(correction) => {
                report.corrections.push(CorrectionSummary {
                    page: correction.page,
                    moved: correction.moved,
                    created_page: correction.created_page,
                });
                self.apply_correction(correction.transaction)?;
                self.run_post_effects()?;
            }
            None => report.converged = true,
        }
        Ok(report)
    }

    /// Run settle cycles until no page overflows, bounded by
    /// `maxSettleCycles`. Explicit recalculation for hosts that need it.
    #[instrument(skip(self), fields(version = self.state.version()))]
    pub fn settle(&mut self) -> EditorResult<SettleReport> {
        let mut report = SettleReport::default();
        let max_cycles = self.config.pagination.max_settle_cycles.max(1);
        while report.cycles < max_cycles {
            let cycle = self.settle_cycle()?;
            let done = cycle.converged;
            report.merge(cycle);
            if done {
                if !report.corrections.is_empty() {
                    info!(
                        cycles = report.cycles,
                        corrections = report.corrections.len(),
                        "document settled"
                    );
                }
                return Ok(report);
            }
        }
        warn!(cycles = max_cycles, "pagination did not converge");
        Ok(report)
    }

    /// Caret rectangle for a position of the current revision.
    pub fn coords_at_pos(&self, pos: usize) -> EditorResult<Rect> {
        self.geometry().coords_at_pos(self.state.doc(), pos)
    }

    pub fn pos_at_coords(&self, x: f64, y: f64) -> Option<usize> {
        self.geometry().pos_at_coords(self.state.doc(), x, y)
    }

    pub fn snapshot(&self) -> ViewSnapshot {
        let geometry = self.geometry();
        let doc = self.state.doc();
        ViewSnapshot {
            doc: doc.clone(),
            selection: self.state.selection(),
            version: self.state.version(),
            active: toolbar::active_states(&self.state),
            outline: toolbar::outline(doc, Some(&geometry)),
            selection_rect: toolbar::selection_rect(&self.state, &geometry),
        }
    }

    fn geometry(&self) -> Geometry<'_> {
        Geometry::new(self.config.page, self.oracle.as_ref())
    }

    fn run_post_effects(&mut self) -> EditorResult<()> {
        if let Some(tr) = self.effects.run(&self.state)? {
            debug!(steps = tr.steps().len(), "post-effects applied");
            self.apply_correction(tr)?;
        }
        Ok(())
    }

    /// Apply a follow-up transaction and fold it into history.
    fn apply_correction(&mut self, tr: Transaction) -> EditorResult<()> {
        let inverses = tr.inverted_steps()?;
        self.state = self.state.apply(&tr)?;
        self.history.absorb(tr.steps().to_vec(), inverses);
        Ok(())
    }

    fn notify(&mut self) {
        if self.observers.is_empty() {
            return;
        }
        let snapshot = self.snapshot();
        for observer in &mut self.observers {
            observer.update(&snapshot);
        }
    }
}
