//! Visible text corpus
//!
//! Collects the normalized visible text under a root in document order.
//! Offsets are byte offsets into `all_text`. Where the raw text had
//! whitespace at a node boundary a single separator space is inserted
//! between segments; that space belongs to no segment.

use worm_dom::{Document, NON_CONTENT_TAGS, NodeId};

use crate::is_owned;
use crate::normalize::normalize;

/// One accepted text node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextNode {
    pub node: NodeId,
    /// Normalized text
    pub text: String,
    /// Inclusive start in `all_text`
    pub start: usize,
    /// Exclusive end in `all_text`
    pub end: usize,
}

/// Text index for one render pass; borrows the document it was built from
#[derive(Debug, Clone)]
pub struct Corpus<'doc> {
    pub nodes: Vec<TextNode>,
    pub all_text: String,
    doc: &'doc Document,
}

/// Build the corpus for `root` (the body or any subtree)
pub fn build_corpus(doc: &Document, root: NodeId) -> Corpus<'_> {
    Corpus::build(doc, root)
}

impl<'doc> Corpus<'doc> {
    pub fn build(doc: &'doc Document, root: NodeId) -> Self {
        let tree = doc.tree();
        let mut nodes = Vec::new();
        let mut all_text = String::new();
        let mut boundary_space = false;

        let candidates = std::iter::once(root).chain(tree.descendants(root));
        for node in candidates {
            let Some(raw) = tree.text(node) else {
                continue;
            };
            if !is_content_text(doc, node) {
                continue;
            }

            let text = normalize(raw);
            if text.is_empty() {
                boundary_space |= !raw.is_empty();
                continue;
            }

            let leading_space = raw.starts_with(char::is_whitespace);
            if !all_text.is_empty() && (boundary_space || leading_space) {
                all_text.push(' ');
            }
            let start = all_text.len();
            all_text.push_str(&text);
            nodes.push(TextNode {
                node,
                text,
                start,
                end: all_text.len(),
            });
            boundary_space = raw.ends_with(char::is_whitespace);
        }

        tracing::trace!(segments = nodes.len(), chars = all_text.len(), "built corpus");
        Self {
            nodes,
            all_text,
            doc,
        }
    }

    /// Document the corpus was built from
    pub fn document(&self) -> &'doc Document {
        self.doc
    }

    /// Raw (unnormalized) content of a text node
    pub fn raw_text(&self, node: NodeId) -> Option<&'doc str> {
        self.doc.tree().text(node)
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Segment holding byte offset `offset` (`start <= offset < end`)
    pub fn segment_containing(&self, offset: usize) -> Option<&TextNode> {
        let idx = self.nodes.partition_point(|n| n.end <= offset);
        self.nodes.get(idx).filter(|n| n.start <= offset)
    }

    /// Segment a match ending at `offset` ends in (`start < offset <= end`)
    pub fn segment_ending_at(&self, offset: usize) -> Option<&TextNode> {
        let idx = self.nodes.partition_point(|n| n.end < offset);
        self.nodes.get(idx).filter(|n| n.start < offset)
    }
}

/// Text node that counts as page content: rendered, visible, not inside
/// script-like or annotation-owned elements
pub(crate) fn is_content_text(doc: &Document, node: NodeId) -> bool {
    let tree = doc.tree();
    let Some(parent) = tree.parent(node).and_then(|p| tree.closest_element(p)) else {
        return false;
    };
    let non_content = tree
        .tag_name(parent)
        .is_some_and(|t| NON_CONTENT_TAGS.contains(&t));
    !non_content && doc.is_visible(parent) && !is_owned(tree, parent)
}
