//! Document - High-level document API
//!
//! Wraps the tree with the page-level state the anchoring code reads:
//! URL, viewport, scroll offsets and the last layout pass.

use crate::layout::{self, LayoutMetrics};
use crate::style::InlineStyle;
use crate::{DOMRect, DomTree, NodeId};

/// Viewport size in CSS pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1024.0,
            height: 768.0,
        }
    }
}

/// HTML Document
#[derive(Debug)]
pub struct Document {
    tree: DomTree,
    url: String,
    viewport: Viewport,
    metrics: LayoutMetrics,
    scroll_x: f64,
    scroll_y: f64,
}

impl Document {
    /// Create a document with an empty `html > head + body` skeleton
    pub fn new(url: &str) -> Self {
        let mut doc = Self::empty(url);
        let tree = &mut doc.tree;
        let html = tree.create_element("html");
        let head = tree.create_element("head");
        let body = tree.create_element("body");
        // Fresh detached nodes under containers: these cannot fail.
        let _ = tree.append_child(tree.root(), html);
        let _ = tree.append_child(html, head);
        let _ = tree.append_child(html, body);
        doc
    }

    /// Create an empty document (no structure)
    pub fn empty(url: &str) -> Self {
        Self {
            tree: DomTree::new(),
            url: url.to_string(),
            viewport: Viewport::default(),
            metrics: LayoutMetrics::default(),
            scroll_x: 0.0,
            scroll_y: 0.0,
        }
    }

    /// Wrap an already built tree
    pub fn from_tree(url: &str, tree: DomTree) -> Self {
        Self {
            tree,
            ..Self::empty(url)
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Change the URL in place (history navigation)
    pub fn set_url(&mut self, url: &str) {
        self.url = url.to_string();
    }

    /// Text of the first `<title>`
    pub fn title(&self) -> String {
        self.tree
            .descendants(self.tree.root())
            .find(|&n| self.tree.tag_name(n) == Some("title"))
            .map(|t| self.tree.text_content(t).trim().to_string())
            .unwrap_or_default()
    }

    pub fn tree(&self) -> &DomTree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut DomTree {
        &mut self.tree
    }

    /// The `<html>` element
    pub fn document_element(&self) -> Option<NodeId> {
        self.tree.element_children(self.tree.root()).next()
    }

    pub fn head(&self) -> Option<NodeId> {
        self.child_of_html("head")
    }

    /// The `<body>` element
    pub fn body(&self) -> Option<NodeId> {
        self.child_of_html("body")
    }

    fn child_of_html(&self, tag: &str) -> Option<NodeId> {
        let html = self.document_element()?;
        self.tree
            .element_children(html)
            .find(|&c| self.tree.tag_name(c) == Some(tag))
    }

    /// Body, else the document element, else the document node
    pub fn body_or_root(&self) -> NodeId {
        self.body()
            .or_else(|| self.document_element())
            .unwrap_or(self.tree.root())
    }

    /// First connected element with this id
    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        self.tree
            .descendants(self.tree.root())
            .find(|&n| self.tree.element(n).and_then(|e| e.id()) == Some(id))
    }

    // --- Viewport and layout ---

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Resize the viewport; layout becomes stale
    pub fn set_viewport(&mut self, width: f64, height: f64) {
        self.viewport = Viewport { width, height };
        self.tree.mark_layout_dirty();
    }

    pub fn metrics(&self) -> &LayoutMetrics {
        &self.metrics
    }

    /// Run a layout pass unconditionally
    pub fn reflow(&mut self) {
        layout::layout_tree(&mut self.tree, self.viewport.width, &self.metrics);
        self.clamp_scroll();
    }

    /// Run a layout pass if anything changed since the last one
    pub fn ensure_layout(&mut self) {
        if self.tree.is_layout_dirty() {
            self.reflow();
        }
    }

    pub fn needs_layout(&self) -> bool {
        self.tree.is_layout_dirty()
    }

    // --- Scrolling ---

    pub fn scroll_x(&self) -> f64 {
        self.scroll_x
    }

    pub fn scroll_y(&self) -> f64 {
        self.scroll_y
    }

    /// Total document height from the last layout
    pub fn scroll_height(&self) -> f64 {
        self.tree
            .layout_box(self.tree.root())
            .map_or(0.0, |r| r.height)
            .max(self.viewport.height)
    }

    /// Scroll to a position, clamped to the scrollable range
    pub fn scroll_to(&mut self, x: f64, y: f64) {
        self.scroll_x = x;
        self.scroll_y = y;
        self.clamp_scroll();
    }

    fn clamp_scroll(&mut self) {
        let max_y = (self.scroll_height() - self.viewport.height).max(0.0);
        let width = self.tree.layout_box(self.tree.root()).map_or(0.0, |r| r.width);
        let max_x = (width - self.viewport.width).max(0.0);
        self.scroll_x = self.scroll_x.clamp(0.0, max_x);
        self.scroll_y = self.scroll_y.clamp(0.0, max_y);
    }

    /// Vertical scroll position as a fraction in [0,1]
    pub fn scroll_fraction(&self) -> f64 {
        let range = self.scroll_height() - self.viewport.height;
        if range <= 0.0 {
            return 0.0;
        }
        (self.scroll_y / range).clamp(0.0, 1.0)
    }

    // --- Geometry ---

    /// `getBoundingClientRect`: layout box in viewport coordinates
    pub fn bounding_client_rect(&self, id: NodeId) -> Option<DOMRect> {
        self.tree
            .layout_box(id)
            .map(|r| r.translate(-self.scroll_x, -self.scroll_y))
    }

    /// Whether the node generated a box in the last layout
    pub fn has_client_rect(&self, id: NodeId) -> bool {
        self.tree.layout_box(id).is_some()
    }

    /// Border box relative to the parent element's box
    pub fn offset_rect(&self, id: NodeId) -> Option<DOMRect> {
        let rect = self.tree.layout_box(id)?;
        let parent = self
            .tree
            .parent(id)
            .and_then(|p| self.tree.layout_box(p))
            .unwrap_or_default();
        Some(rect.translate(-parent.x, -parent.y))
    }

    /// Inherited `visibility: hidden | collapse`
    pub fn is_visibility_hidden(&self, id: NodeId) -> bool {
        let declared = |n: NodeId| {
            self.tree
                .get_attribute(n, "style")
                .and_then(|s| InlineStyle::parse(s).get("visibility").map(str::to_string))
        };
        let value = declared(id).or_else(|| self.tree.ancestors(id).find_map(declared));
        matches!(value.as_deref(), Some("hidden" | "collapse"))
    }

    /// Rendered and not visibility-hidden
    pub fn is_visible(&self, id: NodeId) -> bool {
        self.has_client_rect(id) && !self.is_visibility_hidden(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skeleton() {
        let doc = Document::new("https://example.com/");
        let body = doc.body().unwrap();

        assert_eq!(doc.tree().tag_name(body), Some("body"));
        assert_eq!(doc.tree().tag_name(doc.head().unwrap()), Some("head"));
        assert_eq!(doc.body_or_root(), body);
    }

    #[test]
    fn test_scroll_fraction() {
        let mut doc = Document::new("https://example.com/");
        doc.set_viewport(800.0, 100.0);
        let body = doc.body().unwrap();
        let block = doc.tree_mut().create_element("div");
        doc.tree_mut().set_attribute(block, "style", "height: 300px").unwrap();
        doc.tree_mut().append_child(body, block).unwrap();
        doc.reflow();

        assert_eq!(doc.scroll_fraction(), 0.0);
        doc.scroll_to(0.0, 100.0);
        assert_eq!(doc.scroll_fraction(), 0.5);
        doc.scroll_to(0.0, 1_000.0);
        assert_eq!(doc.scroll_y(), 200.0);
        assert_eq!(doc.bounding_client_rect(block).unwrap().y, -200.0);
    }

    #[test]
    fn test_visibility_inherited() {
        let mut doc = Document::new("https://example.com/");
        let body = doc.body().unwrap();
        let tree = doc.tree_mut();
        let outer = tree.create_element("div");
        let inner = tree.create_element("span");
        tree.set_attribute(outer, "style", "visibility: hidden").unwrap();
        tree.append_child(body, outer).unwrap();
        tree.append_child(outer, inner).unwrap();
        doc.reflow();

        assert!(doc.has_client_rect(inner));
        assert!(doc.is_visibility_hidden(inner));
        assert!(!doc.is_visible(inner));
    }
}
