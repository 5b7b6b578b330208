//! # Pagination Engine
//!
//! Keeps every page's content region within its height budget by moving
//! trailing blocks onto the following page.
//!
//! ## Design
//!
//! - A page is `Fits` while its content height is below the budget and
//!   `Overflowing` otherwise
//! - One correction moves one trailing run across one page boundary; a
//!   cascade over several pages resolves over successive settle cycles
//! - When even the first block reaches the budget the whole run moves and
//!   the source page keeps an empty content region. A block taller than any
//!   page keeps moving until the settle loop's cycle cap stops it
//! - The next page is created (empty regions, appended at the end of the
//!   document) only when the overflowing page is the last one
//! - Pages the oracle cannot measure are skipped for the cycle
//!
//! The engine only builds transactions. Applying them and looping until the
//! document is stable is the view's job.

use crate::config::PageGeometry;
use crate::document::EditorState;
use crate::errors::{EditorError, EditorResult, MeasurementUnavailable};
use crate::layout::LayoutOracle;
use crate::transaction::{Origin, Transaction};
use quire_model::builders::empty_page;
use quire_model::{Node, PageRef, Region};
use serde::Serialize;
use tracing::{debug, info, warn};

/// Measured state of one page.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PageFit {
    Fits { height: f64 },
    Overflowing { height: f64 },
}

impl PageFit {
    pub fn is_overflowing(&self) -> bool {
        matches!(self, PageFit::Overflowing { .. })
    }

    pub fn height(&self) -> f64 {
        match *self {
            PageFit::Fits { height } | PageFit::Overflowing { height } => height,
        }
    }
}

/// One pending correction across a page boundary.
#[derive(Debug, Clone)]
pub struct Correction {
    /// Index of the overflowing page.
    pub page: usize,
    /// Number of content blocks moved to the next page.
    pub moved: usize,
    /// Whether a new page was appended to receive them.
    pub created_page: bool,
    pub transaction: Transaction,
}

/// Outcome of scanning a revision for the first correctable page.
#[derive(Debug, Clone, Default)]
pub struct Scan {
    pub correction: Option<Correction>,
    /// Pages whose measurement was unavailable.
    pub skipped: Vec<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Paginator {
    geometry: PageGeometry,
}

impl Paginator {
    pub fn new(geometry: PageGeometry) -> Self {
        Self { geometry }
    }

    /// Height available to a content region.
    pub fn budget(&self) -> f64 {
        self.geometry.content_budget()
    }

    /// Classify a measured content height against the budget.
    pub fn fit(&self, height: f64) -> PageFit {
        if height >= self.budget() {
            PageFit::Overflowing { height }
        } else {
            PageFit::Fits { height }
        }
    }

    pub fn page_fit(
        &self,
        oracle: &dyn LayoutOracle,
        page: &PageRef,
    ) -> Result<PageFit, MeasurementUnavailable> {
        Ok(self.fit(oracle.content_height(page)?))
    }

    /// Index of the first block of the trailing run to move: the page keeps
    /// the longest prefix that stays below budget. Zero means the whole
    /// content region moves.
    pub fn split_index(&self, heights: &[f64]) -> usize {
        let budget = self.budget();
        let mut keep = 0;
        let mut prefix = 0.0;
        for height in heights {
            prefix += height;
            if prefix >= budget {
                break;
            }
            keep += 1;
        }
        keep
    }

    /// Build the correction for `page`, or `None` when it fits.
    pub fn correct_page(
        &self,
        state: &EditorState,
        oracle: &dyn LayoutOracle,
        page: &PageRef,
    ) -> EditorResult<Option<Correction>> {
        let heights = oracle.block_heights(page, Region::Content)?;
        let fit = self.fit(heights.iter().sum());
        if !fit.is_overflowing() {
            return Ok(None);
        }

        let split = self.split_index(&heights);
        let blocks = page.content_blocks();
        if split >= blocks.len() {
            return Ok(None);
        }
        if split == 0 {
            warn!(
                page = page.index,
                height = fit.height(),
                budget = self.budget(),
                "moving the whole content region"
            );
        }

        let from = blocks[split].0;
        let to = page.content_start() + page.content().map_or(0, Node::content_size);
        let moving: Vec<Node> = blocks[split..].iter().map(|(_, node)| node.clone()).collect();
        let moved = moving.len();

        let mut tr = state.tr();
        tr.set_origin(Origin::Pagination).set_add_to_history(false);

        let created_page = page.index + 1 >= state.doc().page_count();
        if created_page {
            tr.insert(state.doc().content_size(), vec![empty_page()])?;
        }
        tr.delete(from, to)?;

        let target = tr
            .doc()
            .page(page.index + 1)
            .map(|next| next.content_start())
            .ok_or_else(|| {
                quire_model::ModelError::invalid_range(from, to, "no page follows the overflowing page")
            })?;
        tr.insert(target, moving)?;
        // the cursor travels with the moved blocks
        if let Some(selection) =
            state
                .selection()
                .relocated(from..to, |pos| target + (pos - from), tr.mapping())
        {
            tr.set_selection(selection)?;
        }

        info!(page = page.index, moved, created_page, "pagination correction");
        Ok(Some(Correction {
            page: page.index,
            moved,
            created_page,
            transaction: tr,
        }))
    }

    /// Find the first overflowing page that can be corrected. Earlier pages
    /// that cannot be measured are skipped and reported.
    pub fn scan(&self, state: &EditorState, oracle: &dyn LayoutOracle) -> EditorResult<Scan> {
        let mut skipped = Vec::new();
        for page in state.doc().pages() {
            match self.correct_page(state, oracle, &page) {
                Ok(Some(correction)) => {
                    return Ok(Scan {
                        correction: Some(correction),
                        skipped,
                    })
                }
                Ok(None) => {}
                Err(EditorError::MeasurementUnavailable(err)) => {
                    debug!(page = err.page, reason = %err.reason, "skipping unmeasurable page");
                    skipped.push(page.index);
                }
                Err(err) => return Err(err),
            }
        }
        Ok(Scan {
            correction: None,
            skipped,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::UniformLayout;
    use crate::selection::Selection;
    use quire_model::builders::*;

    fn paginator() -> Paginator {
        // 365 - 60 - 60 = 245
        Paginator::new(PageGeometry::default())
    }

    fn paragraphs(n: usize) -> Vec<Node> {
        (0..n).map(|i| paragraph(&format!("p{}", i))).collect()
    }

    fn texts(page: &PageRef) -> Vec<String> {
        page.content_blocks()
            .iter()
            .map(|(_, n)| n.text_content())
            .collect()
    }

    #[test]
    fn test_split_index_keeps_prefix_below_budget() {
        let p = paginator();
        assert_eq!(p.split_index(&[60.0; 5]), 4);
        assert_eq!(p.split_index(&[100.0; 5]), 2);
        assert_eq!(p.split_index(&[300.0, 10.0]), 0);
        assert_eq!(p.split_index(&[300.0]), 0);
        assert_eq!(p.split_index(&[200.0, 45.0, 10.0]), 1);
    }

    #[test]
    fn test_fitting_page_needs_no_correction() {
        let state = EditorState::new(doc(vec![page(vec![], paragraphs(3), vec![])])).unwrap();
        let oracle = UniformLayout::new(60.0);
        let scan = paginator().scan(&state, &oracle).unwrap();
        assert!(scan.correction.is_none());
        assert!(scan.skipped.is_empty());
    }

    #[test]
    fn test_overflow_moves_trailing_run_to_new_page() {
        let state = EditorState::new(doc(vec![page(vec![], paragraphs(5), vec![])])).unwrap();
        let oracle = UniformLayout::new(60.0);
        let correction = paginator().scan(&state, &oracle).unwrap().correction.unwrap();
        assert_eq!(correction.page, 0);
        assert_eq!(correction.moved, 1);
        assert!(correction.created_page);

        let next = state.apply(&correction.transaction).unwrap();
        let pages = next.doc().pages();
        assert_eq!(pages.len(), 2);
        assert_eq!(texts(&pages[0]), vec!["p0", "p1", "p2", "p3"]);
        assert_eq!(texts(&pages[1]), vec!["p4"]);
    }

    #[test]
    fn test_moved_blocks_land_before_existing_content() {
        let state = EditorState::new(doc(vec![
            page(vec![], paragraphs(5), vec![]),
            page(vec![paragraph("head")], vec![paragraph("next")], vec![]),
        ]))
        .unwrap();
        let oracle = UniformLayout::new(100.0);
        let correction = paginator().scan(&state, &oracle).unwrap().correction.unwrap();
        assert!(!correction.created_page);
        assert_eq!(correction.moved, 3);

        let next = state.apply(&correction.transaction).unwrap();
        let pages = next.doc().pages();
        assert_eq!(texts(&pages[1]), vec!["p2", "p3", "p4", "next"]);
        assert_eq!(pages[1].region(Region::Header).unwrap().text_content(), "head");
    }

    #[test]
    fn test_selection_follows_moved_block() {
        let d = doc(vec![page(vec![], paragraphs(5), vec![])]);
        let last = d.page(0).unwrap().content_blocks()[4].0;
        let state = EditorState::new(d)
            .unwrap()
            .with_selection(Selection::cursor(last + 2))
            .unwrap();
        let oracle = UniformLayout::new(60.0);
        let correction = paginator().scan(&state, &oracle).unwrap().correction.unwrap();
        let next = state.apply(&correction.transaction).unwrap();

        let moved_at = next.doc().page(1).unwrap().content_start();
        assert_eq!(next.selection(), Selection::cursor(moved_at + 2));
    }

    #[test]
    fn test_oversized_first_block_moves_whole_run() {
        let state = EditorState::new(doc(vec![page(
            vec![paragraph("head")],
            vec![paragraph("big"), paragraph("small")],
            vec![paragraph("foot")],
        )]))
        .unwrap();
        let oracle = UniformLayout::new(300.0);
        let correction = paginator().scan(&state, &oracle).unwrap().correction.unwrap();
        assert_eq!(correction.page, 0);
        assert_eq!(correction.moved, 2);
        assert!(correction.created_page);

        let next = state.apply(&correction.transaction).unwrap();
        let pages = next.doc().pages();
        let emptied = pages[0].region(Region::Content).unwrap();
        assert_eq!(emptied.child_count(), 0);
        assert_eq!(pages[0].region(Region::Header).unwrap().text_content(), "head");
        assert_eq!(pages[0].region(Region::Footer).unwrap().text_content(), "foot");
        assert_eq!(texts(&pages[1]), vec!["big", "small"]);
    }

    #[test]
    fn test_lone_oversized_block_is_relocated() {
        let state = EditorState::new(doc(vec![page(vec![], paragraphs(1), vec![])])).unwrap();
        let oracle = UniformLayout::new(300.0);
        let correction = paginator().scan(&state, &oracle).unwrap().correction.unwrap();
        assert_eq!(correction.moved, 1);

        let next = state.apply(&correction.transaction).unwrap();
        assert_eq!(next.doc().page_count(), 2);
        assert!(next.doc().pages()[0].content_blocks().is_empty());
        assert_eq!(texts(&next.doc().pages()[1]), vec!["p0"]);
    }

    #[test]
    fn test_page_fit_classifies_against_budget() {
        let p = paginator();
        assert!(!p.fit(244.0).is_overflowing());
        assert!(p.fit(245.0).is_overflowing());

        let state = EditorState::new(doc(vec![page(vec![], paragraphs(5), vec![])])).unwrap();
        let fit = p.page_fit(&UniformLayout::new(60.0), &state.doc().pages()[0]).unwrap();
        assert_eq!(fit, PageFit::Overflowing { height: 300.0 });
    }

    #[test]
    fn test_unmeasurable_page_is_skipped() {
        let state = EditorState::new(doc(vec![
            page(vec![], paragraphs(5), vec![]),
            page(vec![], paragraphs(5), vec![]),
        ]))
        .unwrap();
        let mut oracle = UniformLayout::new(60.0);
        oracle.detach(0);
        let scan = paginator().scan(&state, &oracle).unwrap();
        assert_eq!(scan.skipped, vec![0]);
        assert_eq!(scan.correction.unwrap().page, 1);
    }
}
