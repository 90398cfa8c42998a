//! HTML5 Parser implementation
//!
//! Parses with html5ever into an RcDom and converts that into the arena
//! tree. Whitespace-only text is kept: it separates words across element
//! boundaries when page text is collected.

use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use markup5ever_rcdom::{Handle, NodeData as RcNodeData, RcDom};
use worm_dom::{Document, DomTree, NodeId, Viewport};

/// HTML5 parser
#[derive(Debug, Clone, Default)]
pub struct HtmlParser {
    viewport: Viewport,
}

impl HtmlParser {
    /// Create a new HTML parser
    pub fn new() -> Self {
        Self::default()
    }

    /// Lay parsed documents out for this viewport
    pub fn with_viewport(mut self, width: f64, height: f64) -> Self {
        self.viewport = Viewport { width, height };
        self
    }

    /// Parse HTML string into a Document
    pub fn parse(&self, html: &str) -> Document {
        self.parse_with_url(html, "about:blank")
    }

    /// Parse HTML with a document URL
    pub fn parse_with_url(&self, html: &str, url: &str) -> Document {
        tracing::debug!(url, bytes = html.len(), "parsing HTML document");

        let dom = parse_document(RcDom::default(), Default::default()).one(html);

        let mut tree = DomTree::new();
        let root = tree.root();
        for child in dom.document.children.borrow().iter() {
            convert_node(child, &mut tree, root);
        }

        let mut document = Document::from_tree(url, tree);
        document.set_viewport(self.viewport.width, self.viewport.height);
        document.reflow();

        tracing::debug!(nodes = document.tree().len(), "parsed document");
        document
    }
}

/// Convert an RcDom node (and its subtree) under `parent`
fn convert_node(handle: &Handle, tree: &mut DomTree, parent: NodeId) {
    let id = match &handle.data {
        RcNodeData::Text { contents } => tree.create_text(&contents.borrow()),
        RcNodeData::Comment { contents } => tree.create_comment(contents),
        RcNodeData::Element { name, attrs, .. } => {
            let id = tree.create_element(&name.local);
            for attr in attrs.borrow().iter() {
                if let Err(err) = tree.set_attribute(id, &attr.name.local, &attr.value) {
                    tracing::trace!(%err, "skipping attribute");
                }
            }
            id
        }
        // Doctype and processing instructions carry nothing we render.
        RcNodeData::Document | RcNodeData::Doctype { .. } | RcNodeData::ProcessingInstruction { .. } => {
            return;
        }
    };

    if let Err(err) = tree.append_child(parent, id) {
        tracing::warn!(%err, "dropping node during conversion");
        return;
    }
    for child in handle.children.borrow().iter() {
        convert_node(child, tree, id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple() {
        let html = "<html><head><title>Test</title></head><body><p>Hello</p></body></html>";
        let doc = HtmlParser::new().parse(html);

        assert_eq!(doc.title(), "Test");
        let body = doc.body().unwrap();
        assert_eq!(doc.tree().text_content(body), "Hello");
    }

    #[test]
    fn test_parse_fragment_gets_skeleton() {
        let doc = HtmlParser::new().parse("<div><span>Text</span></div>");

        assert!(doc.head().is_some());
        let body = doc.body().unwrap();
        let div = doc.tree().first_child(body).unwrap();
        assert_eq!(doc.tree().tag_name(div), Some("div"));
        assert!(doc.has_client_rect(div));
    }

    #[test]
    fn test_whitespace_text_kept() {
        let doc = HtmlParser::new().parse("<body><p>a</p> <p>b</p></body>");
        let body = doc.body().unwrap();

        assert_eq!(doc.tree().child_count(body), 3);
        assert_eq!(doc.tree().text_content(body), "a b");
    }
}
