//! Worm Anchor - durable annotation anchors
//!
//! Turns a click or a text selection into a portable [`Position`] and
//! turns a stored [`Position`] back into a live element:
//!
//! - [`normalize`]: Unicode composition and whitespace collapse
//! - [`Corpus`]: visible text of a subtree with offsets back to text nodes
//! - [`find_range`]: context-scored quote search
//! - [`create_position`] / [`encode`]: interaction to position
//! - [`resolve`]: position to element through a fixed tier chain

mod config;
mod corpus;
mod encoder;
mod normalize;
mod position;
mod quote;
mod resolver;

pub mod selector;
pub mod location;

pub use config::AnchorConfig;
pub use corpus::{Corpus, TextNode, build_corpus};
pub use encoder::{Encoding, Interaction, create_position, encode};
pub use normalize::{normalize, truncate_chars};
pub use position::{DomSelectors, ElementFingerprint, Fallback, Position, RelBoxPct, TextQuote};
pub use quote::{QuoteMatch, best_match, find_range};
pub use resolver::{Resolution, Tier, resolve};

use worm_dom::{DomTree, Exclude, NodeId};

/// Attribute marking elements created by the annotation layer
pub const OWNED_ATTR: &str = "data-worm-owned";

/// Attributes under this prefix belong to the annotation layer
pub const SYSTEM_ATTR_PREFIX: &str = "data-worm-";

/// Elements that make sensible anchor hosts
pub const MEANINGFUL_TAGS: &[&str] = &[
    "h1", "h2", "h3", "h4", "h5", "h6", "p", "li", "blockquote", "pre", "code", "figure",
    "section", "article", "div", "span", "a",
];

/// Whether `node` is, or sits inside, an element owned by the annotation layer
pub fn is_owned(tree: &DomTree, node: NodeId) -> bool {
    tree.closest_where(node, |n| {
        tree.element(n).is_some_and(|e| e.has_attr(OWNED_ATTR))
    })
    .is_some()
}

/// Query scope in which the annotation layer's own elements do not exist
///
/// Selectors are built and resolved in this scope so that `:nth-of-type`
/// indices do not depend on which markers happen to be on the page.
pub const PAGE_SCOPE: Exclude = Exclude::new(is_owned);

pub fn is_meaningful(tree: &DomTree, node: NodeId) -> bool {
    tree.tag_name(node).is_some_and(|t| MEANINGFUL_TAGS.contains(&t))
}

/// Nearest meaningful element at or above `node`
pub fn nearest_meaningful(tree: &DomTree, node: NodeId) -> Option<NodeId> {
    tree.closest_where(node, |n| is_meaningful(tree, n))
}
