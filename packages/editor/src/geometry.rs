//! Headless geometry: positions to rectangles and back.
//!
//! Pages are stacked vertically, `gap` apart. Inside a region, blocks are
//! stacked using the oracle's heights, and text inside a block flows in
//! fixed-width cells of the oracle's text metrics.

use crate::config::{PageGeometry, TextMetrics};
use crate::errors::EditorResult;
use crate::layout::LayoutOracle;
use quire_model::{Node, PageRef, Region};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Smallest rectangle covering both.
    pub fn union(&self, other: &Rect) -> Rect {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        Rect::new(x, y, self.right().max(other.right()) - x, self.bottom().max(other.bottom()) - y)
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x && x <= self.right() && y >= self.y && y <= self.bottom()
    }
}

/// Maps positions of one revision onto stacked pages.
pub struct Geometry<'a> {
    page: PageGeometry,
    metrics: TextMetrics,
    oracle: &'a dyn LayoutOracle,
}

impl<'a> Geometry<'a> {
    pub fn new(page: PageGeometry, oracle: &'a dyn LayoutOracle) -> Self {
        Self {
            page,
            metrics: oracle.text_metrics(),
            oracle,
        }
    }

    pub fn page_top(&self, index: usize) -> f64 {
        index as f64 * (self.page.total_height + self.page.gap)
    }

    pub fn page_rect(&self, index: usize) -> Rect {
        Rect::new(0.0, self.page_top(index), self.page.width, self.page.total_height)
    }

    pub fn region_rect(&self, page: usize, region: Region) -> Rect {
        let top = self.page_top(page);
        let (y, height) = match region {
            Region::Header => (top, self.page.header_height),
            Region::Content => (top + self.page.header_height, self.page.content_budget()),
            Region::Footer => (
                top + self.page.total_height - self.page.footer_height,
                self.page.footer_height,
            ),
        };
        Rect::new(0.0, y, self.page.width, height)
    }

    fn chars_per_line(&self) -> usize {
        ((self.page.width / self.metrics.char_width).floor() as usize).max(1)
    }

    /// Caret rectangle for `pos`.
    pub fn coords_at_pos(&self, doc: &Node, pos: usize) -> EditorResult<Rect> {
        let r = doc.resolve(pos)?;
        let line_height = self.metrics.line_height;
        let (Some(page_index), Some(region)) = (r.page_index(), r.region()) else {
            let page = r.page_index().unwrap_or_else(|| r.index(0).min(doc.child_count().saturating_sub(1)));
            return Ok(Rect::new(0.0, self.page_top(page), 0.0, line_height));
        };
        let Some(page) = doc.page(page_index) else {
            return Ok(Rect::new(0.0, self.page_top(page_index), 0.0, line_height));
        };

        let area = self.region_rect(page_index, region);
        let heights = self.oracle.block_heights(&page, region)?;
        let block_index = r.index(2);
        let top = area.y + heights.iter().take(block_index).sum::<f64>();
        if r.depth() == 2 {
            return Ok(Rect::new(0.0, top, 0.0, line_height));
        }

        let block_start = r.start(3);
        let offset = pos - block_start;
        let per_line = self.chars_per_line();
        let line = offset / per_line;
        let column = offset % per_line;
        Ok(Rect::new(
            column as f64 * self.metrics.char_width,
            top + line as f64 * line_height,
            0.0,
            line_height,
        ))
    }

    /// Rectangle covering a block-level node starting at `pos`.
    pub fn block_rect(&self, doc: &Node, pos: usize) -> EditorResult<Rect> {
        let start = self.coords_at_pos(doc, pos)?;
        let height = doc
            .resolve(pos)
            .ok()
            .filter(|r| r.depth() == 2)
            .and_then(|r| {
                let page = doc.page(r.page_index()?)?;
                let region = r.region()?;
                self.oracle
                    .block_heights(&page, region)
                    .ok()?
                    .get(r.index(2))
                    .copied()
            })
            .unwrap_or(self.metrics.line_height);
        Ok(Rect::new(0.0, start.y, self.page.width, height))
    }

    /// Position closest to a point, or `None` for a document without pages.
    pub fn pos_at_coords(&self, doc: &Node, x: f64, y: f64) -> Option<usize> {
        let pages = doc.pages();
        let stride = self.page.total_height + self.page.gap;
        let index = ((y.max(0.0) / stride).floor() as usize).min(pages.len().checked_sub(1)?);
        let page = &pages[index];
        let local = y - self.page_top(index);

        let region = if local < self.page.header_height {
            Region::Header
        } else if local < self.page.total_height - self.page.footer_height {
            Region::Content
        } else {
            Region::Footer
        };
        Some(self.pos_in_region(page, region, x, y))
    }

    fn pos_in_region(&self, page: &PageRef, region: Region, x: f64, y: f64) -> usize {
        let Some(node) = page.region(region) else {
            return page.pos;
        };
        let area = self.region_rect(page.index, region);
        let heights = self
            .oracle
            .block_heights(page, region)
            .unwrap_or_else(|_| vec![self.metrics.line_height; node.child_count()]);

        let mut top = area.y;
        let mut pos = page.region_start(region);
        for (i, block) in node.children().iter().enumerate() {
            let height = heights.get(i).copied().unwrap_or(0.0);
            let last = i + 1 == node.child_count();
            if y < top + height || last {
                return pos + self.offset_in_block(block, x, y - top);
            }
            top += height;
            pos += block.node_size();
        }
        pos
    }

    /// Position offset (from before `block`) for a point inside it.
    fn offset_in_block(&self, block: &Node, x: f64, dy: f64) -> usize {
        if !block.is_textblock() {
            return 0;
        }
        let line = (dy.max(0.0) / self.metrics.line_height).floor() as usize;
        let per_line = self.chars_per_line();
        let column = ((x.max(0.0) / self.metrics.char_width).round() as usize).min(per_line);
        1 + (line * per_line + column).min(block.content_size())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::UniformLayout;
    use quire_model::builders::*;

    fn sample() -> Node {
        // page 0: content blocks at 4 ("hello", 4..11) and 11 ("world", 11..18)
        doc(vec![
            page(vec![], vec![paragraph("hello"), paragraph("world")], vec![]),
            page(vec![], vec![paragraph("next")], vec![]),
        ])
    }

    #[test]
    fn test_coords_follow_stacked_blocks() {
        let oracle = UniformLayout::new(30.0);
        let geometry = Geometry::new(PageGeometry::default(), &oracle);
        let d = sample();

        let first = geometry.coords_at_pos(&d, 5).unwrap();
        assert_eq!((first.x, first.y), (0.0, 60.0));

        let second = geometry.coords_at_pos(&d, 14).unwrap();
        assert_eq!((second.x, second.y), (16.0, 90.0));

        let next_page = d.page(1).unwrap().content_start() + 1;
        let rect = geometry.coords_at_pos(&d, next_page).unwrap();
        assert_eq!(rect.y, 365.0 + 24.0 + 60.0);
    }

    #[test]
    fn test_pos_at_coords_inverts_coords() {
        let oracle = UniformLayout::new(30.0);
        let geometry = Geometry::new(PageGeometry::default(), &oracle);
        let d = sample();
        for pos in [5, 7, 12, 16] {
            let rect = geometry.coords_at_pos(&d, pos).unwrap();
            assert_eq!(geometry.pos_at_coords(&d, rect.x, rect.y), Some(pos));
        }
    }

    #[test]
    fn test_rect_union() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(5.0, 20.0, 10.0, 5.0);
        assert_eq!(a.union(&b), Rect::new(0.0, 0.0, 15.0, 25.0));
        assert!(a.contains(5.0, 5.0));
    }
}
