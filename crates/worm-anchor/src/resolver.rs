//! Position resolution
//!
//! Maps a stored [`Position`] back onto the live document through a fixed
//! chain of tiers, from most to least confident. Resolution never fails;
//! the last tier is the document body.

use std::fmt;

use worm_dom::{Document, NodeId, Range};

use crate::corpus::Corpus;
use crate::location::same_resource;
use crate::normalize::normalize;
use crate::position::{ElementFingerprint, Position};
use crate::quote::find_range;
use crate::{PAGE_SCOPE, is_owned, nearest_meaningful};

/// Which strategy produced a resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Tier {
    /// Fine selector whose text still contains the quote
    FineQuote = 1,
    /// Quote found inside the coarse element, or the coarse element itself
    CoarseQuote = 2,
    /// Quote found anywhere in the document
    GlobalQuote = 3,
    /// Fine selector without text confirmation
    FineSelector = 4,
    /// Tag and attribute fingerprint
    Fingerprint = 5,
    /// Document body
    Fallback = 6,
}

impl Tier {
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tier {}", self.as_u8())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub element: NodeId,
    pub tier: Tier,
}

impl Resolution {
    fn new(element: NodeId, tier: Tier) -> Self {
        Self { element, tier }
    }
}

/// Resolve `position` against `doc`
///
/// `corpus`, when given, must be a document-wide corpus built from the
/// current state of `doc`; it is reused for the global quote search.
pub fn resolve(doc: &Document, position: &Position, corpus: Option<&Corpus<'_>>) -> Resolution {
    let resolution = resolve_tiers(doc, position, corpus);
    tracing::trace!(
        fine = %position.dom.selector_fine,
        tier = resolution.tier.as_u8(),
        "resolved position"
    );
    resolution
}

fn resolve_tiers(doc: &Document, position: &Position, corpus: Option<&Corpus<'_>>) -> Resolution {
    let fine = query(doc, &position.dom.selector_fine);
    let quote = position.quote();

    if let Some(quote) = quote {
        let exact = normalize(&quote.exact);

        if let Some(el) = fine {
            if Corpus::build(doc, el).all_text.contains(exact.as_str()) {
                return Resolution::new(el, Tier::FineQuote);
            }
        }

        if let Some(coarse) = query(doc, &position.dom.selector_coarse) {
            let scoped = Corpus::build(doc, coarse);
            let element = find_range(&quote.exact, &quote.prefix, &quote.suffix, &scoped)
                .and_then(|range| range_container(doc, &range))
                .filter(|&el| doc.tree().contains(coarse, el))
                .unwrap_or(coarse);
            return Resolution::new(element, Tier::CoarseQuote);
        }

        let built;
        let corpus = match corpus {
            Some(c) => c,
            None => {
                built = Corpus::build(doc, doc.body_or_root());
                &built
            }
        };
        let container = find_range(&quote.exact, &quote.prefix, &quote.suffix, corpus)
            .and_then(|range| range_container(doc, &range));
        if let Some(el) = container {
            if !matches!(doc.tree().tag_name(el), Some("body" | "html")) {
                return Resolution::new(el, Tier::GlobalQuote);
            }
        }
    }

    if let Some(el) = fine {
        return Resolution::new(el, Tier::FineSelector);
    }

    if let Some(el) = match_fingerprint(doc, &position.element) {
        return Resolution::new(el, Tier::Fingerprint);
    }

    let fallback = doc
        .body()
        .or_else(|| doc.document_element())
        .unwrap_or_else(|| doc.tree().root());
    Resolution::new(fallback, Tier::Fallback)
}

/// `querySelector` on the page without owned elements; syntax errors count as no match
fn query(doc: &Document, selector: &str) -> Option<NodeId> {
    if selector.trim().is_empty() {
        return None;
    }
    let tree = doc.tree();
    match tree.query_selector_excluding(tree.root(), selector, PAGE_SCOPE) {
        Ok(found) => found,
        Err(err) => {
            tracing::trace!(selector, %err, "selector rejected");
            None
        }
    }
}

/// Nearest meaningful element around a range's common ancestor
fn range_container(doc: &Document, range: &Range) -> Option<NodeId> {
    let tree = doc.tree();
    let element = tree.closest_element(range.common_ancestor(tree))?;
    Some(nearest_meaningful(tree, element).unwrap_or(element))
}

fn match_fingerprint(doc: &Document, fingerprint: &ElementFingerprint) -> Option<NodeId> {
    if fingerprint.attrs.is_empty() || fingerprint.tag.is_empty() {
        return None;
    }
    let tree = doc.tree();
    tree.descendants(tree.root())
        .filter(|&n| tree.tag_name(n) == Some(fingerprint.tag.as_str()))
        .filter(|&n| !is_owned(tree, n))
        .find(|&n| {
            fingerprint.attrs.iter().all(|(name, recorded)| {
                tree.get_attribute(n, name)
                    .is_some_and(|current| attr_matches(doc, name, recorded, current))
            })
        })
}

fn attr_matches(doc: &Document, name: &str, recorded: &str, current: &str) -> bool {
    if name == "src" {
        if recorded.starts_with("data:") {
            return current.starts_with(recorded);
        }
        return same_resource(recorded, current, doc.url());
    }
    if name.starts_with("data-") {
        return current.starts_with(recorded);
    }
    current == recorded
}
