//! Mutation and Resize Observer APIs
//!
//! The tree queues raw records while recording is on; a
//! [`MutationObserver`] drains that queue and keeps the records that fall
//! inside its observed targets. A [`ResizeObserver`] compares the border
//! boxes of its targets against the sizes it saw last time.

use std::collections::HashMap;

use crate::{DomTree, NodeId};

/// Mutation type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationType {
    Attributes,
    CharacterData,
    ChildList,
}

/// Mutation record
#[derive(Debug, Clone, PartialEq)]
pub struct MutationRecord {
    pub mutation_type: MutationType,
    pub target: NodeId,
    pub added_nodes: Vec<NodeId>,
    pub removed_nodes: Vec<NodeId>,
    pub previous_sibling: Option<NodeId>,
    pub next_sibling: Option<NodeId>,
    pub attribute_name: Option<String>,
    pub old_value: Option<String>,
}

/// Mutation observer options
#[derive(Debug, Clone, Default)]
pub struct MutationObserverInit {
    pub child_list: bool,
    pub attributes: bool,
    pub character_data: bool,
    pub subtree: bool,
    pub attribute_filter: Option<Vec<String>>,
}

impl MutationObserverInit {
    /// Everything below the target
    pub fn all_subtree() -> Self {
        Self {
            child_list: true,
            attributes: true,
            character_data: true,
            subtree: true,
            attribute_filter: None,
        }
    }
}

/// Mutation observer
#[derive(Debug, Default)]
pub struct MutationObserver {
    observations: HashMap<NodeId, MutationObserverInit>,
}

impl MutationObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Observe a target and switch the tree to recording
    pub fn observe(&mut self, tree: &mut DomTree, target: NodeId, options: MutationObserverInit) {
        self.observations.insert(target, options);
        tree.set_recording(true);
    }

    /// Stop observing everything and drop queued records
    pub fn disconnect(&mut self, tree: &mut DomTree) {
        self.observations.clear();
        tree.set_recording(false);
    }

    pub fn is_observing(&self, node: NodeId) -> bool {
        self.observations.contains_key(&node)
    }

    pub fn is_connected(&self) -> bool {
        !self.observations.is_empty()
    }

    /// Drain the tree's queue and return the records this observer wants
    pub fn take_records(&mut self, tree: &mut DomTree) -> Vec<MutationRecord> {
        let records = tree.take_mutations();
        if self.observations.is_empty() {
            return Vec::new();
        }
        records
            .into_iter()
            .filter(|record| self.wants(tree, record))
            .collect()
    }

    fn wants(&self, tree: &DomTree, mutation: &MutationRecord) -> bool {
        self.observations.iter().any(|(&target, options)| {
            let matches_target = if options.subtree {
                tree.contains(target, mutation.target)
            } else {
                target == mutation.target
            };
            let matches_type = match mutation.mutation_type {
                MutationType::Attributes => options.attributes,
                MutationType::CharacterData => options.character_data,
                MutationType::ChildList => options.child_list,
            };
            let passes_filter = match (&options.attribute_filter, &mutation.attribute_name) {
                (Some(filter), Some(attr)) => filter.contains(attr),
                _ => true,
            };

            matches_target && matches_type && passes_filter
        })
    }
}

/// Resize observer entry
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResizeObserverEntry {
    pub target: NodeId,
    pub width: f64,
    pub height: f64,
}

/// Resize observer
#[derive(Debug, Default)]
pub struct ResizeObserver {
    observed: HashMap<NodeId, Option<(f64, f64)>>,
}

impl ResizeObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Observe an element, seeding its size from the current layout
    pub fn observe(&mut self, tree: &DomTree, target: NodeId) {
        let size = tree.layout_box(target).map(|r| (r.width, r.height));
        self.observed.entry(target).or_insert(size);
    }

    /// Stop observing an element
    pub fn unobserve(&mut self, target: NodeId) {
        self.observed.remove(&target);
    }

    /// Disconnect all observations
    pub fn disconnect(&mut self) {
        self.observed.clear();
    }

    pub fn is_observing(&self, target: NodeId) -> bool {
        self.observed.contains_key(&target)
    }

    /// Observed targets, in no particular order
    pub fn targets(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.observed.keys().copied()
    }

    /// Number of observed targets
    pub fn len(&self) -> usize {
        self.observed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observed.is_empty()
    }

    /// Report every target whose border box size changed since the last check
    pub fn check_sizes(&mut self, tree: &DomTree) -> Vec<ResizeObserverEntry> {
        let mut entries = Vec::new();
        for (&node, last_size) in &mut self.observed {
            let (width, height) = tree
                .layout_box(node)
                .map_or((0.0, 0.0), |r| (r.width, r.height));
            let changed = match *last_size {
                Some((lw, lh)) => (lw - width).abs() > 0.01 || (lh - height).abs() > 0.01,
                None => true,
            };

            if changed {
                *last_size = Some((width, height));
                entries.push(ResizeObserverEntry {
                    target: node,
                    width,
                    height,
                });
            }
        }
        entries.sort_by_key(|e| e.target);
        entries
    }
}
