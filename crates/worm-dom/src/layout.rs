//! Flow layout
//!
//! A deterministic block layout: every rendered element and text node is
//! stacked vertically inside its parent's content box, text wraps on a
//! fixed character grid, replaced elements take their size from style or
//! attributes, and `position: absolute | fixed` boxes are placed against
//! their parent's box after the flow has been laid out.

use crate::style::{InlineStyle, Length};
use crate::{DOMRect, DomTree, NodeData, NodeId};

/// Elements never rendered by the user agent
pub const UA_HIDDEN_TAGS: &[&str] = &[
    "head", "script", "style", "template", "noscript", "title", "meta", "link", "base",
];

/// Elements sized by attributes or style instead of content
pub const REPLACED_TAGS: &[&str] = &[
    "img", "video", "canvas", "svg", "iframe", "embed", "object", "input", "textarea",
];

/// Text grid metrics
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutMetrics {
    pub char_width: f64,
    pub line_height: f64,
}

impl Default for LayoutMetrics {
    fn default() -> Self {
        Self {
            char_width: 8.0,
            line_height: 20.0,
        }
    }
}

/// Lay out the whole tree for a viewport width
pub(crate) fn layout_tree(tree: &mut DomTree, viewport_width: f64, metrics: &LayoutMetrics) {
    for index in 0..tree.len() {
        tree.set_layout(NodeId::from_raw(index as u32), None);
    }

    let root = tree.root();
    let mut engine = LayoutEngine {
        tree: &mut *tree,
        metrics,
    };
    let height = engine.layout_children(root, DOMRect::from_xywh(0.0, 0.0, viewport_width, 0.0));
    tree.set_layout(root, Some(DOMRect::from_xywh(0.0, 0.0, viewport_width, height)));
    tree.mark_laid_out();

    tracing::debug!(nodes = tree.len(), height, "layout pass");
}

struct LayoutEngine<'a> {
    tree: &'a mut DomTree,
    metrics: &'a LayoutMetrics,
}

impl LayoutEngine<'_> {
    /// Stack the children of `parent` from the top of `content`; returns the flow height
    fn layout_children(&mut self, parent: NodeId, content: DOMRect) -> f64 {
        let children: Vec<NodeId> = self.tree.children(parent).collect();
        let mut cursor = content.y;
        let mut positioned = Vec::new();

        for child in children {
            let (is_text, style) = match self.tree.get(child).map(|n| &n.data) {
                Some(NodeData::Text(_)) => (true, InlineStyle::default()),
                Some(NodeData::Element(el)) => {
                    if is_hidden_element(&el.tag, el.has_attr("hidden"), el.get_attr("style")) {
                        continue;
                    }
                    (false, InlineStyle::parse(el.get_attr("style").unwrap_or("")))
                }
                _ => continue,
            };

            if is_text {
                cursor += self.layout_text(child, content.x, cursor, content.width);
            } else if is_out_of_flow(&style) {
                positioned.push((child, style));
            } else {
                cursor += self.layout_element(child, &style, content.x, cursor, content.width, None);
            }
        }

        let flow_height = cursor - content.y;
        let frame = DOMRect::from_xywh(content.x, content.y, content.width, flow_height);
        for (child, style) in positioned {
            self.layout_positioned(child, &style, frame);
        }
        flow_height
    }

    /// Returns the height the element takes in the flow
    fn layout_element(
        &mut self,
        id: NodeId,
        style: &InlineStyle,
        x: f64,
        y: f64,
        available_width: f64,
        reference_height: Option<f64>,
    ) -> f64 {
        let tag = self.tree.tag_name(id).unwrap_or_default().to_string();

        if REPLACED_TAGS.contains(&tag.as_str()) {
            let (width, height) = self.replaced_size(id, &tag, style, available_width, reference_height);
            self.tree.set_layout(id, Some(DOMRect::from_xywh(x, y, width, height)));
            return height;
        }

        let width = style
            .get("width")
            .and_then(Length::parse)
            .map_or(available_width, |l| l.resolve(available_width));
        let content_height = self.layout_children(id, DOMRect::from_xywh(x, y, width, 0.0));
        let height = style
            .get("height")
            .and_then(Length::parse)
            .and_then(|l| match (l, reference_height) {
                (Length::Px(px), _) => Some(px),
                (Length::Percent(_), Some(reference)) => Some(l.resolve(reference)),
                (Length::Percent(_), None) => None,
            })
            .unwrap_or(content_height);

        if height != content_height {
            // Re-run positioned children against the final box height.
            self.relayout_positioned_children(id, DOMRect::from_xywh(x, y, width, height));
        }

        self.tree.set_layout(id, Some(DOMRect::from_xywh(x, y, width, height)));
        height
    }

    fn relayout_positioned_children(&mut self, parent: NodeId, frame: DOMRect) {
        let positioned: Vec<(NodeId, InlineStyle)> = self
            .tree
            .children(parent)
            .filter_map(|c| {
                let el = self.tree.element(c)?;
                if is_hidden_element(&el.tag, el.has_attr("hidden"), el.get_attr("style")) {
                    return None;
                }
                let style = InlineStyle::parse(el.get_attr("style").unwrap_or(""));
                is_out_of_flow(&style).then_some((c, style))
            })
            .collect();
        for (child, style) in positioned {
            self.layout_positioned(child, &style, frame);
        }
    }

    fn layout_positioned(&mut self, id: NodeId, style: &InlineStyle, frame: DOMRect) {
        let left = style
            .get("left")
            .and_then(Length::parse)
            .map_or(0.0, |l| l.resolve(frame.width));
        let top = style
            .get("top")
            .and_then(Length::parse)
            .map_or(0.0, |l| l.resolve(frame.height));
        let available = if style.get("width").is_some() {
            frame.width
        } else {
            (frame.width - left).max(0.0)
        };
        self.layout_element(id, style, frame.x + left, frame.y + top, available, Some(frame.height));
    }

    fn replaced_size(
        &self,
        id: NodeId,
        tag: &str,
        style: &InlineStyle,
        available_width: f64,
        reference_height: Option<f64>,
    ) -> (f64, f64) {
        let (default_w, default_h) = match tag {
            "img" => (0.0, 0.0),
            "input" => (150.0, 20.0),
            "textarea" => (300.0, 40.0),
            _ => (300.0, 150.0),
        };
        let attr_px = |name: &str| {
            self.tree
                .get_attribute(id, name)
                .and_then(|v| v.trim().trim_end_matches("px").parse::<f64>().ok())
        };

        let width = style
            .get("width")
            .and_then(Length::parse)
            .map(|l| l.resolve(available_width))
            .or_else(|| attr_px("width"))
            .unwrap_or(default_w);
        let height = style
            .get("height")
            .and_then(Length::parse)
            .map(|l| l.resolve(reference_height.unwrap_or(0.0)))
            .or_else(|| attr_px("height"))
            .unwrap_or(default_h);
        (width.max(0.0), height.max(0.0))
    }

    fn layout_text(&mut self, id: NodeId, x: f64, y: f64, width: f64) -> f64 {
        let len = self.tree.text(id).map_or(0, collapsed_len);
        if len == 0 {
            self.tree.set_layout(id, Some(DOMRect::from_xywh(x, y, 0.0, 0.0)));
            return 0.0;
        }

        let per_line = chars_per_line(width, self.metrics);
        let lines = len.div_ceil(per_line);
        let rect = DOMRect::from_xywh(
            x,
            y,
            len.min(per_line) as f64 * self.metrics.char_width,
            lines as f64 * self.metrics.line_height,
        );
        self.tree.set_layout(id, Some(rect));
        rect.height
    }
}

fn is_out_of_flow(style: &InlineStyle) -> bool {
    matches!(style.get("position"), Some("absolute" | "fixed"))
}

/// Whether an element generates no box at all
pub fn is_hidden_element(tag: &str, hidden_attr: bool, style: Option<&str>) -> bool {
    UA_HIDDEN_TAGS.contains(&tag)
        || hidden_attr
        || style.is_some_and(|s| InlineStyle::parse(s).get("display") == Some("none"))
}

fn chars_per_line(width: f64, metrics: &LayoutMetrics) -> usize {
    ((width / metrics.char_width).floor() as usize).max(1)
}

fn is_collapsible(c: char) -> bool {
    c.is_whitespace()
}

/// Rendered length of text after whitespace collapsing
pub fn collapsed_len(text: &str) -> usize {
    collapsed_index(text, usize::MAX)
}

/// Position of raw char offset `offset` in the collapsed rendering
pub fn collapsed_index(text: &str, offset: usize) -> usize {
    let mut emitted = 0;
    let mut pending_space = false;
    for (i, c) in text.chars().enumerate() {
        if i >= offset {
            return emitted + usize::from(pending_space);
        }
        if is_collapsible(c) {
            pending_space = emitted > 0;
        } else {
            if pending_space {
                emitted += 1;
                pending_space = false;
            }
            emitted += 1;
        }
    }
    emitted
}

/// Rect covering raw chars `[start, end)` of a laid-out text node
pub fn text_fragment_rect(
    tree: &DomTree,
    node: NodeId,
    start: usize,
    end: usize,
    metrics: &LayoutMetrics,
) -> Option<DOMRect> {
    let rect = tree.layout_box(node)?;
    let text = tree.text(node)?;
    let len = collapsed_len(text);
    if len == 0 {
        return Some(DOMRect::from_xywh(rect.x, rect.y, 0.0, 0.0));
    }

    let per_line = if rect.height > metrics.line_height + 0.5 {
        ((rect.width / metrics.char_width).round() as usize).max(1)
    } else {
        len
    };
    let s = collapsed_index(text, start).min(len);
    let e = collapsed_index(text, end).min(len).max(s);
    let cw = metrics.char_width;
    let lh = metrics.line_height;

    if s == e {
        let line = (s / per_line).min(len.saturating_sub(1) / per_line);
        let col = s - line * per_line;
        return Some(DOMRect::from_xywh(rect.x + col as f64 * cw, rect.y + line as f64 * lh, 0.0, lh));
    }

    let line_s = s / per_line;
    let line_e = (e - 1) / per_line;
    if line_s == line_e {
        let col_s = s % per_line;
        let col_e = (e - 1) % per_line + 1;
        Some(DOMRect::from_xywh(
            rect.x + col_s as f64 * cw,
            rect.y + line_s as f64 * lh,
            (col_e - col_s) as f64 * cw,
            lh,
        ))
    } else {
        Some(DOMRect::from_xywh(
            rect.x,
            rect.y + line_s as f64 * lh,
            per_line as f64 * cw,
            (line_e - line_s + 1) as f64 * lh,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree_with(build: impl FnOnce(&mut DomTree, NodeId)) -> DomTree {
        let mut tree = DomTree::new();
        let body = tree.create_element("body");
        tree.append_child(tree.root(), body).unwrap();
        build(&mut tree, body);
        layout_tree(&mut tree, 800.0, &LayoutMetrics::default());
        tree
    }

    #[test]
    fn test_collapsed_index() {
        assert_eq!(collapsed_len("  a  b \n"), 3);
        assert_eq!(collapsed_index("  a  b", 2), 0);
        assert_eq!(collapsed_index("  a  b", 5), 2);
        assert_eq!(collapsed_len(" \n\t "), 0);
    }

    #[test]
    fn test_collapsed_index_after_space() {
        assert_eq!(collapsed_index("Hello world", 5), 5);
        assert_eq!(collapsed_index("Hello world", 6), 6);
        assert_eq!(collapsed_index("a   b", 4), 2);
        assert_eq!(collapsed_index("a   b", 2), 2);
    }

    #[test]
    fn test_block_stacking() {
        let mut ids = Vec::new();
        let tree = tree_with(|tree, body| {
            for text in ["Hello", "World"] {
                let p = tree.create_element("p");
                let t = tree.create_text(text);
                tree.append_child(p, t).unwrap();
                tree.append_child(body, p).unwrap();
                ids.push(p);
            }
        });

        assert_eq!(tree.layout_box(ids[0]), Some(DOMRect::from_xywh(0.0, 0.0, 800.0, 20.0)));
        assert_eq!(tree.layout_box(ids[1]), Some(DOMRect::from_xywh(0.0, 20.0, 800.0, 20.0)));
    }

    #[test]
    fn test_text_wraps() {
        let mut text = NodeId::NONE;
        let tree = tree_with(|tree, body| {
            let div = tree.create_element("div");
            tree.set_attribute(div, "style", "width: 80px").unwrap();
            text = tree.create_text("abcdefghijklmno");
            tree.append_child(div, text).unwrap();
            tree.append_child(body, div).unwrap();
        });

        let rect = tree.layout_box(text).unwrap();
        assert_eq!(rect.width, 80.0);
        assert_eq!(rect.height, 40.0);
        let frag = text_fragment_rect(&tree, text, 2, 5, &LayoutMetrics::default()).unwrap();
        assert_eq!(frag, DOMRect::from_xywh(16.0, 0.0, 24.0, 20.0));
        let frag = text_fragment_rect(&tree, text, 10, 14, &LayoutMetrics::default()).unwrap();
        assert_eq!(frag, DOMRect::from_xywh(0.0, 20.0, 32.0, 20.0));
    }

    #[test]
    fn test_hidden_and_replaced() {
        let (mut hidden, mut img, mut sized) = (NodeId::NONE, NodeId::NONE, NodeId::NONE);
        let tree = tree_with(|tree, body| {
            hidden = tree.create_element("div");
            tree.set_attribute(hidden, "style", "display: none").unwrap();
            img = tree.create_element("img");
            tree.set_attribute(img, "width", "100").unwrap();
            tree.set_attribute(img, "height", "50").unwrap();
            sized = tree.create_element("img");
            tree.set_attribute(sized, "style", "width: 200px; height: 100px").unwrap();
            tree.set_attribute(sized, "width", "10").unwrap();
            for n in [hidden, img, sized] {
                tree.append_child(body, n).unwrap();
            }
        });

        assert_eq!(tree.layout_box(hidden), None);
        assert_eq!(tree.layout_box(img), Some(DOMRect::from_xywh(0.0, 0.0, 100.0, 50.0)));
        assert_eq!(tree.layout_box(sized), Some(DOMRect::from_xywh(0.0, 50.0, 200.0, 100.0)));
    }

    #[test]
    fn test_absolute_box() {
        let (mut wrap, mut overlay) = (NodeId::NONE, NodeId::NONE);
        let tree = tree_with(|tree, body| {
            wrap = tree.create_element("div");
            let img = tree.create_element("img");
            tree.set_attribute(img, "style", "width: 200px; height: 100px").unwrap();
            overlay = tree.create_element("div");
            tree.set_attribute(overlay, "style", "position: absolute; left: 50%; top: 10px; width: 20px; height: 20px")
                .unwrap();
            tree.append_child(wrap, img).unwrap();
            tree.append_child(wrap, overlay).unwrap();
            tree.append_child(body, wrap).unwrap();
        });

        assert_eq!(tree.layout_box(wrap).unwrap().height, 100.0);
        assert_eq!(tree.layout_box(overlay), Some(DOMRect::from_xywh(400.0, 10.0, 20.0, 20.0)));
    }
}
