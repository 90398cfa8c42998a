//! Position encoding
//!
//! Turns a click or a selection into a [`Position`].

use std::collections::BTreeMap;

use worm_dom::{DOMRect, Document, NodeId, Range};

use crate::config::AnchorConfig;
use crate::corpus::{Corpus, is_content_text};
use crate::normalize::{head_chars, normalize, tail_chars, truncate_chars};
use crate::position::{DomSelectors, ElementFingerprint, Fallback, Position, RelBoxPct, TextQuote};
use crate::selector::build_selector;
use crate::{SYSTEM_ATTR_PREFIX, nearest_meaningful};

/// Semantic containers preferred as coarse anchors
const LANDMARK_SELECTOR: &str = "article, section, main, [role=main], .content, .post, .entry, \
     .entry-content, .article, .article-body, .post-content, .story, #content, #main";

/// Generic containers used when no landmark or text-rich block exists
const CONTAINER_SELECTOR: &str = "div, section, article, main";

const BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "blockquote", "dd", "details", "div", "dl", "dt", "fieldset",
    "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header", "li",
    "main", "nav", "ol", "p", "pre", "section", "table", "td", "th", "ul",
];

/// A user interaction in client coordinates
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Interaction {
    /// Event target (text nodes allowed)
    pub target: Option<NodeId>,
    /// Click point
    pub click: Option<(f64, f64)>,
    /// Current selection; collapsed ranges count as none
    pub selection: Option<Range>,
}

impl Interaction {
    pub fn click(target: NodeId, x: f64, y: f64) -> Self {
        Self {
            target: Some(target),
            click: Some((x, y)),
            selection: None,
        }
    }

    pub fn selection(range: Range) -> Self {
        Self {
            target: None,
            click: None,
            selection: Some(range),
        }
    }

    fn live_selection(&self) -> Option<Range> {
        self.selection.filter(|r| !r.is_collapsed())
    }
}

/// A position together with the elements chosen while encoding it
#[derive(Debug, Clone, PartialEq)]
pub struct Encoding {
    pub position: Position,
    /// Element `selector_fine` points at
    pub fine: NodeId,
    /// Element `selector_coarse` points at
    pub coarse: NodeId,
    /// Element used for `rel_box_pct` and attributes
    pub host: NodeId,
}

/// Build a position from an interaction
pub fn create_position(doc: &Document, interaction: &Interaction, config: &AnchorConfig) -> Position {
    encode(doc, interaction, config).position
}

/// Build a position and report the elements behind it
pub fn encode(doc: &Document, interaction: &Interaction, config: &AnchorConfig) -> Encoding {
    let tree = doc.tree();
    let selection = interaction.live_selection();

    let fine = base_element(doc, interaction, selection.as_ref());
    let coarse = coarse_ancestor(doc, fine, config);
    let selector_fine = build_selector(tree, fine);
    let selector_coarse = if coarse == fine {
        selector_fine.clone()
    } else {
        build_selector(tree, coarse)
    };

    let text_quote = selection.as_ref().and_then(|r| capture_quote(doc, r, config));

    let selection_rect = selection.as_ref().and_then(|r| r.bounding_client_rect(doc));
    let fine_rect = doc.bounding_client_rect(fine);
    let host = match selection_rect {
        Some(sel) if fine_rect.is_none_or(|f| !f.contains_rect(&sel)) => coarse,
        _ => fine,
    };
    let host_rect = doc.bounding_client_rect(host);

    let point = interaction
        .click
        .or_else(|| selection_rect.map(|r| r.center()))
        .or_else(|| host_rect.map(|r| r.center()));
    let rel_box_pct = relative_point(host_rect, point);

    let position = Position {
        dom: DomSelectors {
            selector_fine,
            selector_coarse,
        },
        text_quote,
        element: ElementFingerprint {
            tag: tree.tag_name(host).unwrap_or("body").to_string(),
            attrs: capture_attrs(doc, host, config),
            rel_box_pct,
        },
        fallback: Fallback {
            scroll_pct: doc.scroll_fraction(),
        },
    };

    tracing::debug!(
        fine = %position.dom.selector_fine,
        coarse = %position.dom.selector_coarse,
        quote = position.text_quote.is_some(),
        "encoded position"
    );
    Encoding {
        position,
        fine,
        coarse,
        host,
    }
}

fn base_element(doc: &Document, interaction: &Interaction, selection: Option<&Range>) -> NodeId {
    let tree = doc.tree();
    if let Some(range) = selection {
        let common = range.common_ancestor(tree);
        if let Some(element) = tree.closest_element(common) {
            return nearest_meaningful(tree, element).unwrap_or(element);
        }
    }
    interaction
        .target
        .and_then(|t| tree.closest_element(t))
        .filter(|&e| e != tree.root())
        .unwrap_or_else(|| doc.body_or_root())
}

fn coarse_ancestor(doc: &Document, base: NodeId, config: &AnchorConfig) -> NodeId {
    let tree = doc.tree();
    if let Ok(Some(landmark)) = tree.closest(base, LANDMARK_SELECTOR) {
        return landmark;
    }

    let mut current = base;
    for _ in 0..config.coarse_max_climb {
        let Some(parent) = tree.parent_element(current) else {
            break;
        };
        if matches!(tree.tag_name(parent), Some("body" | "html")) {
            break;
        }
        let is_block = tree.tag_name(parent).is_some_and(|t| BLOCK_TAGS.contains(&t));
        if is_block
            && Corpus::build(doc, parent).all_text.chars().count() >= config.coarse_min_text_chars
        {
            return parent;
        }
        current = parent;
    }

    tree.closest(base, CONTAINER_SELECTOR)
        .ok()
        .flatten()
        .unwrap_or(base)
}

fn capture_quote(doc: &Document, range: &Range, config: &AnchorConfig) -> Option<TextQuote> {
    let tree = doc.tree();
    let exact = truncate_chars(&normalize(&range.text(tree)), config.max_quote_chars);
    if exact.is_empty() {
        return None;
    }

    let segments = range.text_segments(tree);
    let (first, last) = (segments.first()?, segments.last()?);
    let budget = config.max_context_chars;

    // Walk backwards from the selection start.
    let mut before: Vec<String> = Vec::new();
    if let Some(text) = tree.text(first.node) {
        before.push(text.chars().take(first.start).collect());
    }
    let mut node = tree.prev_in_order(first.node, tree.root());
    while let Some(n) = node {
        if normalize(&before.concat()).chars().count() >= budget {
            break;
        }
        if let Some(text) = tree.text(n).filter(|_| is_content_text(doc, n)) {
            before.insert(0, text.to_string());
        }
        node = tree.prev_in_order(n, tree.root());
    }

    // And forwards from the selection end.
    let mut after = String::new();
    if let Some(text) = tree.text(last.node) {
        after.extend(text.chars().skip(last.end));
    }
    let mut node = tree.next_in_order(last.node, tree.root());
    while let Some(n) = node {
        if normalize(&after).chars().count() >= budget {
            break;
        }
        if let Some(text) = tree.text(n).filter(|_| is_content_text(doc, n)) {
            after.push_str(text);
        }
        node = tree.next_in_order(n, tree.root());
    }

    let prefix = normalize(tail_chars(&normalize(&before.concat()), budget));
    let suffix = normalize(head_chars(&normalize(&after), budget));
    Some(TextQuote { exact, prefix, suffix })
}

fn relative_point(host: Option<DOMRect>, point: Option<(f64, f64)>) -> RelBoxPct {
    match (host, point) {
        (Some(rect), Some((x, y))) if !rect.is_empty() => {
            RelBoxPct::new((x - rect.x) / rect.width, (y - rect.y) / rect.height)
        }
        _ => RelBoxPct::CENTER,
    }
}

fn capture_attrs(doc: &Document, host: NodeId, config: &AnchorConfig) -> BTreeMap<String, String> {
    let Some(element) = doc.tree().element(host) else {
        return BTreeMap::new();
    };

    element
        .attrs
        .iter()
        .filter_map(|attr| {
            let name = attr.name.as_str();
            let stable = (name.starts_with("data-") && !name.starts_with(SYSTEM_ATTR_PREFIX))
                || name.starts_with("aria-")
                || matches!(name, "role" | "alt" | "title")
                || (name == "src" && element.tag == "img");
            if !stable {
                return None;
            }
            let cap = if name == "src" && attr.value.starts_with("data:") {
                config.max_data_src_chars
            } else {
                config.max_attr_chars
            };
            Some((name.to_string(), truncate_chars(&attr.value, cap)))
        })
        .collect()
}
