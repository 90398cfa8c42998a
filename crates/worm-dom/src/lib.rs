//! Worm DOM - Document Object Model
//!
//! Arena-backed DOM tree carrying the slice of the browser surface the
//! anchoring engine talks to: attributes and character data, mutation
//! records, a deterministic flow layout with client rects, ranges, CSS
//! selector queries and resize/mutation observers.

mod document;
mod error;
mod node;
mod tree;

pub mod geometry;
pub mod layout;
pub mod observer;
pub mod query;
pub mod range;
pub mod style;

use std::fmt;

pub use document::{Document, Viewport};
pub use error::{DomError, DomResult};
pub use geometry::DOMRect;
pub use layout::LayoutMetrics;
pub use node::{Attribute, ElementData, Node, NodeData, TextData};
pub use observer::{
    MutationObserver, MutationObserverInit, MutationRecord, MutationType, ResizeObserver,
    ResizeObserverEntry,
};
pub use query::{Exclude, SelectorError, SelectorList};
pub use range::{BoundaryPoint, Range, TextSegment};
pub use tree::{Ancestors, Children, Descendants, DomTree};

/// Elements whose text never counts as page content.
pub const NON_CONTENT_TAGS: &[&str] = &["script", "style", "noscript", "template"];

/// Node identifier (index into arena)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Root (document) node ID
    pub const ROOT: NodeId = NodeId(0);

    /// Sentinel for "no node"
    pub const NONE: NodeId = NodeId(u32::MAX);

    /// Build an id from a raw arena index
    pub fn from_raw(index: u32) -> Self {
        Self(index)
    }

    #[inline]
    pub fn is_valid(self) -> bool {
        self != Self::NONE
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// `None` for the sentinel, `Some(self)` otherwise
    #[inline]
    pub fn to_option(self) -> Option<NodeId> {
        if self.is_valid() { Some(self) } else { None }
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            write!(f, "#{}", self.0)
        } else {
            write!(f, "#none")
        }
    }
}
