//! # Layout Oracle
//!
//! The measurement boundary between the document core and whatever renders
//! it. Pagination and geometry only ever ask the oracle for block heights;
//! they never measure anything themselves.
//!
//! Two oracles ship with the crate:
//! - [`EstimatingLayout`] derives heights from fixed text metrics, for
//!   headless use (the CLI, servers)
//! - [`UniformLayout`] gives every block the same height and can mark pages
//!   as detached, for tests and benchmarks

use crate::config::{PageGeometry, TextMetrics};
use crate::errors::MeasurementUnavailable;
use quire_model::{Node, NodeKind, PageRef, Region};
use std::collections::HashSet;

/// Relative line height of headings by level.
const HEADING_SCALE: [f64; 6] = [2.0, 1.5, 1.17, 1.0, 0.83, 0.67];

/// Horizontal indentation of nested containers (lists, quotes, tables).
const INDENT: f64 = 40.0;

/// Synchronous measurement service.
pub trait LayoutOracle: Send {
    /// Rendered height of each child of one region of `page`, in order.
    fn block_heights(
        &self,
        page: &PageRef,
        region: Region,
    ) -> Result<Vec<f64>, MeasurementUnavailable>;

    /// Rendered height of the content region.
    fn content_height(&self, page: &PageRef) -> Result<f64, MeasurementUnavailable> {
        Ok(self.block_heights(page, Region::Content)?.iter().sum())
    }

    /// Metrics used to place characters inside a block.
    fn text_metrics(&self) -> TextMetrics;
}

/// Estimates heights from character counts and fixed metrics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EstimatingLayout {
    width: f64,
    metrics: TextMetrics,
}

impl EstimatingLayout {
    pub fn new(page: &PageGeometry, metrics: TextMetrics) -> Self {
        Self {
            width: page.width,
            metrics,
        }
    }

    /// Height of one block laid out in `width`.
    pub fn measure(&self, node: &Node, width: f64) -> f64 {
        let m = &self.metrics;
        match node.kind() {
            NodeKind::Paragraph => self.lines(node, width) * m.line_height,
            NodeKind::Heading => {
                let level = node.attrs().level().unwrap_or(1).clamp(1, 6);
                let scale = HEADING_SCALE[usize::from(level - 1)];
                self.lines_scaled(node, width, scale) * m.line_height * scale
            }
            NodeKind::CodeBlock => {
                let text = node.text_content();
                let lines: f64 = text
                    .split('\n')
                    .map(|line| self.wrap(line.chars().count(), width, 1.0))
                    .sum();
                lines * m.line_height
            }
            NodeKind::HorizontalRule => m.rule_height,
            NodeKind::Image => m.image_height,
            NodeKind::Blockquote | NodeKind::BulletList | NodeKind::OrderedList => {
                self.stack(node.children(), (width - INDENT).max(m.char_width))
            }
            NodeKind::ListItem | NodeKind::TableCell | NodeKind::TableHeader => {
                self.stack(node.children(), width)
            }
            NodeKind::Table => {
                let inner = (width - INDENT).max(m.char_width);
                node.children()
                    .iter()
                    .map(|row| {
                        let cols = row.child_count().max(1) as f64;
                        row.children()
                            .iter()
                            .map(|cell| self.measure(cell, inner / cols))
                            .fold(0.0, f64::max)
                    })
                    .sum()
            }
            _ => 0.0,
        }
    }

    fn stack(&self, blocks: &[Node], width: f64) -> f64 {
        blocks.iter().map(|b| self.measure(b, width)).sum()
    }

    fn lines(&self, node: &Node, width: f64) -> f64 {
        self.lines_scaled(node, width, 1.0)
    }

    /// Line count of an inline block. Hard breaks start a new line.
    fn lines_scaled(&self, node: &Node, width: f64, scale: f64) -> f64 {
        let mut lines = 0.0;
        let mut run = 0;
        for child in node.children() {
            match child.kind() {
                NodeKind::HardBreak => {
                    lines += self.wrap(run, width, scale);
                    run = 0;
                }
                NodeKind::Image => run += 1,
                _ => run += child.as_text().map_or(0, |t| t.chars().count()),
            }
        }
        lines + self.wrap(run, width, scale)
    }

    fn wrap(&self, chars: usize, width: f64, scale: f64) -> f64 {
        let per_line = (width / (self.metrics.char_width * scale)).floor().max(1.0);
        (chars as f64 / per_line).ceil().max(1.0)
    }
}

impl LayoutOracle for EstimatingLayout {
    fn block_heights(
        &self,
        page: &PageRef,
        region: Region,
    ) -> Result<Vec<f64>, MeasurementUnavailable> {
        let node = page
            .region(region)
            .ok_or_else(|| MeasurementUnavailable::new(page.index, format!("page has no {} region", region.kind().name())))?;
        Ok(node
            .children()
            .iter()
            .map(|block| self.measure(block, self.width))
            .collect())
    }

    fn text_metrics(&self) -> TextMetrics {
        self.metrics
    }
}

/// Every block has the same height. Pages listed as detached cannot be
/// measured.
#[derive(Debug, Clone, PartialEq)]
pub struct UniformLayout {
    block_height: f64,
    metrics: TextMetrics,
    detached: HashSet<usize>,
}

impl UniformLayout {
    pub fn new(block_height: f64) -> Self {
        Self {
            block_height,
            metrics: TextMetrics::default(),
            detached: HashSet::new(),
        }
    }

    pub fn with_metrics(mut self, metrics: TextMetrics) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn detach(&mut self, page: usize) {
        self.detached.insert(page);
    }

    pub fn attach(&mut self, page: usize) {
        self.detached.remove(&page);
    }
}

impl LayoutOracle for UniformLayout {
    fn block_heights(
        &self,
        page: &PageRef,
        region: Region,
    ) -> Result<Vec<f64>, MeasurementUnavailable> {
        if self.detached.contains(&page.index) {
            return Err(MeasurementUnavailable::new(page.index, "page is detached"));
        }
        let count = page.region(region).map_or(0, Node::child_count);
        Ok(vec![self.block_height; count])
    }

    fn text_metrics(&self) -> TextMetrics {
        self.metrics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quire_model::builders::*;

    fn estimator() -> EstimatingLayout {
        // 600 wide at 8 per char: 75 chars per line
        EstimatingLayout::new(&PageGeometry::default(), TextMetrics::default())
    }

    #[test]
    fn test_paragraph_wraps_by_width() {
        let layout = estimator();
        assert_eq!(layout.measure(&paragraph(""), 600.0), 24.0);
        assert_eq!(layout.measure(&paragraph(&"x".repeat(75)), 600.0), 24.0);
        assert_eq!(layout.measure(&paragraph(&"x".repeat(76)), 600.0), 48.0);
        let broken = paragraph_with(vec![text("a"), hard_break(), text("b")]);
        assert_eq!(layout.measure(&broken, 600.0), 48.0);
    }

    #[test]
    fn test_heading_and_leaves() {
        let layout = estimator();
        assert_eq!(layout.measure(&heading(1, "Title"), 600.0), 48.0);
        assert_eq!(layout.measure(&horizontal_rule(), 600.0), 12.0);
        assert_eq!(layout.measure(&code_block("a\nb\nc"), 600.0), 72.0);
    }

    #[test]
    fn test_containers_stack_children() {
        let layout = estimator();
        assert_eq!(layout.measure(&bullet_list(vec!["a", "b"]), 600.0), 48.0);
        // each row is as tall as its tallest cell
        assert_eq!(layout.measure(&table(3, 2), 600.0), 72.0);
    }

    #[test]
    fn test_uniform_layout_detached_page() {
        let d = doc(vec![page(vec![], vec![paragraph("a"), paragraph("b")], vec![])]);
        let mut layout = UniformLayout::new(10.0);
        let page = d.page(0).unwrap();
        assert_eq!(layout.content_height(&page).unwrap(), 20.0);

        layout.detach(0);
        let err = layout.content_height(&page).unwrap_err();
        assert_eq!(err.page, 0);
    }
}
