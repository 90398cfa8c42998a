//! DOM operation errors

use crate::NodeId;

/// Result type for DOM operations
pub type DomResult<T> = Result<T, DomError>;

/// DOM operation errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomError {
    /// Handle does not point into the arena
    #[error("node {0} does not exist")]
    InvalidNode(NodeId),

    /// Element-only operation on a non-element
    #[error("node {0} is not an element")]
    NotAnElement(NodeId),

    /// Character-data operation on a non-text node
    #[error("node {0} is not a text node")]
    NotText(NodeId),

    /// Inserting would break the tree (cycle, text parent, document child)
    #[error("cannot insert {child} into {parent}")]
    HierarchyRequest { parent: NodeId, child: NodeId },

    /// Reference node is not a child of the given parent
    #[error("node {child} is not a child of {parent}")]
    NotAChild { parent: NodeId, child: NodeId },
}
