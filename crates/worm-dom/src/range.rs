//! Range API
//!
//! Boundary points use char offsets inside text nodes and child indices
//! inside containers.

use crate::geometry::bounding_rect;
use crate::layout::text_fragment_rect;
use crate::{DOMRect, Document, DomTree, NodeId};

/// Range boundary point
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundaryPoint {
    pub node: NodeId,
    pub offset: usize,
}

impl BoundaryPoint {
    pub fn new(node: NodeId, offset: usize) -> Self {
        Self { node, offset }
    }
}

/// Selected chars `[start, end)` of one text node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextSegment {
    pub node: NodeId,
    pub start: usize,
    pub end: usize,
}

/// DOM Range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Range {
    pub start: BoundaryPoint,
    pub end: BoundaryPoint,
}

impl Range {
    pub fn new(start: BoundaryPoint, end: BoundaryPoint) -> Self {
        Self { start, end }
    }

    /// Range over chars `[start, end)` of a single text node
    pub fn from_text(node: NodeId, start: usize, end: usize) -> Self {
        Self::new(BoundaryPoint::new(node, start), BoundaryPoint::new(node, end))
    }

    /// Collapsed range at a point
    pub fn collapsed_at(point: BoundaryPoint) -> Self {
        Self::new(point, point)
    }

    /// Range covering all contents of a node
    pub fn select_node_contents(tree: &DomTree, node: NodeId) -> Self {
        let end = match tree.text(node) {
            Some(text) => text.chars().count(),
            None => tree.child_count(node),
        };
        Self::new(BoundaryPoint::new(node, 0), BoundaryPoint::new(node, end))
    }

    pub fn is_collapsed(&self) -> bool {
        self.start == self.end
    }

    /// Deepest node containing both boundaries
    pub fn common_ancestor(&self, tree: &DomTree) -> NodeId {
        if tree.contains(self.start.node, self.end.node) {
            return self.start.node;
        }
        tree.ancestors(self.start.node)
            .find(|&a| tree.contains(a, self.end.node))
            .unwrap_or(tree.root())
    }

    /// Text nodes touched by the range, in document order
    pub fn text_segments(&self, tree: &DomTree) -> Vec<TextSegment> {
        let root = tree.root();
        let first = if tree.is_text(self.start.node) {
            Some(self.start.node)
        } else {
            tree.child_at(self.start.node, self.start.offset)
                .or_else(|| tree.next_after_subtree(self.start.node, root))
        };
        let stop = if tree.is_text(self.end.node) {
            None
        } else {
            tree.child_at(self.end.node, self.end.offset)
                .or_else(|| tree.next_after_subtree(self.end.node, root))
        };

        let mut segments = Vec::new();
        let mut current = first;
        while let Some(node) = current {
            if stop == Some(node) {
                break;
            }
            if let Some(text) = tree.text(node) {
                let len = text.chars().count();
                let start = if node == self.start.node { self.start.offset.min(len) } else { 0 };
                let end = if node == self.end.node { self.end.offset.min(len) } else { len };
                if end > start {
                    segments.push(TextSegment { node, start, end });
                }
                if node == self.end.node {
                    break;
                }
            }
            current = tree.next_in_order(node, root);
        }
        segments
    }

    /// Selected text (`Range.toString()`)
    pub fn text(&self, tree: &DomTree) -> String {
        self.text_segments(tree)
            .into_iter()
            .filter_map(|seg| {
                let text = tree.text(seg.node)?;
                Some(text.chars().skip(seg.start).take(seg.end - seg.start).collect::<String>())
            })
            .collect()
    }

    /// Union of the client rects of the selected text
    pub fn bounding_client_rect(&self, doc: &Document) -> Option<DOMRect> {
        let tree = doc.tree();
        let rects = self.text_segments(tree).into_iter().filter_map(|seg| {
            text_fragment_rect(tree, seg.node, seg.start, seg.end, doc.metrics())
                .filter(|r| !r.is_empty())
                .map(|r| r.translate(-doc.scroll_x(), -doc.scroll_y()))
        });
        bounding_rect(rects)
    }
}
