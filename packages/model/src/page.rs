//! Page-level views over a document root.

use crate::node::Node;
use crate::schema::{NodeKind, Region};

/// A page of a document revision, with the position directly before it.
#[derive(Debug, Clone)]
pub struct PageRef {
    pub index: usize,
    pub pos: usize,
    pub node: Node,
}

impl PageRef {
    /// Region node of this page.
    pub fn region(&self, region: Region) -> Option<&Node> {
        self.node
            .child(region.index())
            .filter(|n| n.kind() == region.kind())
    }

    /// Position directly before the region node.
    pub fn region_pos(&self, region: Region) -> usize {
        let preceding: usize = self
            .node
            .children()
            .iter()
            .take(region.index())
            .map(Node::node_size)
            .sum();
        self.pos + 1 + preceding
    }

    /// First position inside the region's content.
    pub fn region_start(&self, region: Region) -> usize {
        self.region_pos(region) + 1
    }

    pub fn content(&self) -> Option<&Node> {
        self.region(Region::Content)
    }

    /// First position inside the content region:
    /// `pos + 1 + header.node_size() + 1`.
    pub fn content_start(&self) -> usize {
        self.region_start(Region::Content)
    }

    /// Position directly after the page.
    pub fn end(&self) -> usize {
        self.pos + self.node.node_size()
    }

    /// Content region children with the position before each one.
    pub fn content_blocks(&self) -> Vec<(usize, Node)> {
        let mut pos = self.content_start();
        self.content()
            .map(|content| {
                content
                    .children()
                    .iter()
                    .map(|block| {
                        let at = pos;
                        pos += block.node_size();
                        (at, block.clone())
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Stable handle for measurement: the id of the page's first block with
    /// one, falling back to the page index.
    pub fn key(&self) -> String {
        self.content_blocks()
            .iter()
            .find_map(|(_, block)| block.id().map(str::to_string))
            .unwrap_or_else(|| format!("page-{}", self.index))
    }
}

impl Node {
    /// The pages of a document root, in order.
    pub fn pages(&self) -> Vec<PageRef> {
        let mut pos = 0;
        self.children()
            .iter()
            .enumerate()
            .filter_map(|(index, node)| {
                let at = pos;
                pos += node.node_size();
                (node.kind() == NodeKind::Page).then(|| PageRef {
                    index,
                    pos: at,
                    node: node.clone(),
                })
            })
            .collect()
    }

    pub fn page(&self, index: usize) -> Option<PageRef> {
        self.pages().into_iter().nth(index)
    }

    pub fn page_count(&self) -> usize {
        self.children()
            .iter()
            .filter(|n| n.kind() == NodeKind::Page)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builders::*;

    #[test]
    fn test_content_start_skips_header() {
        let d = doc(vec![
            page(vec![paragraph("Title")], vec![paragraph("a")], vec![]),
            empty_page(),
        ]);
        let pages = d.pages();
        assert_eq!(pages.len(), 2);

        let first = &pages[0];
        // header holds a 7-unit paragraph, so the header is 9 units wide
        assert_eq!(first.content_start(), 1 + 9 + 1);
        assert_eq!(d.node_at(first.content_start()).map(Node::kind), Some(NodeKind::Paragraph));

        let second = &pages[1];
        assert_eq!(second.pos, first.end());
        assert_eq!(second.content_start(), second.pos + 1 + 2 + 1);
        assert!(second.content_blocks().is_empty());
    }

    #[test]
    fn test_content_blocks_positions() {
        let d = doc(vec![page(vec![], vec![paragraph("ab"), paragraph("c")], vec![])]);
        let blocks = d.pages()[0].content_blocks();
        let positions: Vec<usize> = blocks.iter().map(|(pos, _)| *pos).collect();
        assert_eq!(positions, vec![4, 8]);
    }
}
