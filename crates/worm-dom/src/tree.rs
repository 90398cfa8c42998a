//! DOM Tree (arena-based allocation)
//!
//! Structural edits, attribute writes and character-data writes all go
//! through this type so that every change can be queued as a
//! [`MutationRecord`] and flag the layout as stale.

use crate::geometry::DOMRect;
use crate::observer::{MutationRecord, MutationType};
use crate::style::InlineStyle;
use crate::{DomError, DomResult, ElementData, Node, NodeData, NodeId};

/// Arena-based DOM tree
#[derive(Debug)]
pub struct DomTree {
    nodes: Vec<Node>,
    /// Pending mutation records (only filled while recording)
    mutations: Vec<MutationRecord>,
    recording: bool,
    /// Number of inline style writes performed
    style_writes: u64,
    layout_dirty: bool,
}

impl Default for DomTree {
    fn default() -> Self {
        Self::new()
    }
}

impl DomTree {
    /// Create a tree holding only the document node
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::document()],
            mutations: Vec::new(),
            recording: false,
            style_writes: 0,
            layout_dirty: true,
        }
    }

    /// Document node
    #[inline]
    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Get a node by ID
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    pub(crate) fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.index())
    }

    fn node(&self, id: NodeId) -> DomResult<&Node> {
        self.get(id).ok_or(DomError::InvalidNode(id))
    }

    /// Number of nodes in the arena (detached nodes included)
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn push(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    /// Create a detached element
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.push(Node::element(tag))
    }

    /// Create a detached text node
    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.push(Node::text(text))
    }

    /// Create a detached comment
    pub fn create_comment(&mut self, text: &str) -> NodeId {
        self.push(Node::comment(text))
    }

    // --- Accessors ---

    pub fn element(&self, id: NodeId) -> Option<&ElementData> {
        self.get(id)?.as_element()
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        self.element(id).is_some()
    }

    pub fn is_text(&self, id: NodeId) -> bool {
        self.get(id).is_some_and(Node::is_text)
    }

    /// Lowercase tag name of an element
    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(|e| e.tag.as_str())
    }

    /// Content of a text node
    pub fn text(&self, id: NodeId) -> Option<&str> {
        self.get(id)?.as_text()
    }

    pub fn get_attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id)?.get_attr(name)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id)?.parent.to_option()
    }

    /// Parent, only if it is an element
    pub fn parent_element(&self, id: NodeId) -> Option<NodeId> {
        self.parent(id).filter(|p| self.is_element(*p))
    }

    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.get(id)?.first_child.to_option()
    }

    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.get(id)?.last_child.to_option()
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.get(id)?.next_sibling.to_option()
    }

    pub fn prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.get(id)?.prev_sibling.to_option()
    }

    /// Direct children
    pub fn children(&self, id: NodeId) -> Children<'_> {
        Children {
            tree: self,
            next: self.get(id).map_or(NodeId::NONE, |n| n.first_child),
        }
    }

    /// Direct children that are elements
    pub fn element_children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children(id).filter(|c| self.is_element(*c))
    }

    /// Nth child (0-based)
    pub fn child_at(&self, id: NodeId, index: usize) -> Option<NodeId> {
        self.children(id).nth(index)
    }

    /// Number of direct children
    pub fn child_count(&self, id: NodeId) -> usize {
        self.children(id).count()
    }

    /// All nodes below `id` in document order (excluding `id`)
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        Descendants {
            tree: self,
            root: id,
            next: self.first_child(id),
        }
    }

    /// Parent chain of `id` (excluding `id`)
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            tree: self,
            next: self.parent(id),
        }
    }

    /// Inclusive containment check
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        ancestor == node || self.ancestors(node).any(|a| a == ancestor)
    }

    /// Whether the node is attached to the document
    pub fn is_connected(&self, id: NodeId) -> bool {
        id == NodeId::ROOT || self.ancestors(id).any(|a| a == NodeId::ROOT)
    }

    /// The node itself if it is an element, else its nearest element ancestor
    pub fn closest_element(&self, id: NodeId) -> Option<NodeId> {
        if self.is_element(id) {
            return Some(id);
        }
        self.ancestors(id).find(|a| self.is_element(*a))
    }

    /// Inclusive closest ancestor satisfying a predicate
    pub fn closest_where(&self, id: NodeId, mut pred: impl FnMut(NodeId) -> bool) -> Option<NodeId> {
        if pred(id) {
            return Some(id);
        }
        self.ancestors(id).find(|a| pred(*a))
    }

    /// Concatenated text of all descendant text nodes
    pub fn text_content(&self, id: NodeId) -> String {
        if let Some(text) = self.text(id) {
            return text.to_string();
        }
        self.descendants(id)
            .filter_map(|d| self.text(d))
            .collect()
    }

    /// Preorder successor of `node`, staying inside `root`
    pub fn next_in_order(&self, node: NodeId, root: NodeId) -> Option<NodeId> {
        let n = self.get(node)?;
        if n.first_child.is_valid() {
            return Some(n.first_child);
        }
        self.next_after_subtree(node, root)
    }

    /// First node after the subtree of `node` in preorder, staying inside `root`
    pub fn next_after_subtree(&self, node: NodeId, root: NodeId) -> Option<NodeId> {
        let mut current = node;
        while current != root {
            let c = self.get(current)?;
            if c.next_sibling.is_valid() {
                return Some(c.next_sibling);
            }
            current = c.parent;
            if !current.is_valid() {
                return None;
            }
        }
        None
    }

    /// Preorder predecessor of `node`, staying strictly inside `root`
    pub fn prev_in_order(&self, node: NodeId, root: NodeId) -> Option<NodeId> {
        if node == root {
            return None;
        }
        let n = self.get(node)?;
        if n.prev_sibling.is_valid() {
            return Some(self.deepest_last(n.prev_sibling));
        }
        if n.parent.is_valid() && n.parent != root {
            Some(n.parent)
        } else {
            None
        }
    }

    /// Last node of the subtree rooted at `node` in preorder
    pub fn deepest_last(&self, node: NodeId) -> NodeId {
        let mut current = node;
        while let Some(last) = self.last_child(current) {
            current = last;
        }
        current
    }

    // --- Structural mutation ---

    /// Append a child node
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<()> {
        self.insert_before(parent, child, None)
    }

    /// Insert `child` before `reference` (or at the end when `None`)
    pub fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        reference: Option<NodeId>,
    ) -> DomResult<()> {
        if !self.node(parent)?.is_container() {
            return Err(DomError::HierarchyRequest { parent, child });
        }
        if matches!(self.node(child)?.data, NodeData::Document) || self.contains(child, parent) {
            return Err(DomError::HierarchyRequest { parent, child });
        }
        if let Some(r) = reference {
            if self.parent(r) != Some(parent) {
                return Err(DomError::NotAChild { parent, child: r });
            }
            if r == child {
                return Ok(());
            }
        }

        if let Some(old_parent) = self.parent(child) {
            self.remove_child(old_parent, child)?;
        }

        let next = reference.unwrap_or(NodeId::NONE);
        let prev = match reference {
            Some(r) => self.nodes[r.index()].prev_sibling,
            None => self.nodes[parent.index()].last_child,
        };

        {
            let c = &mut self.nodes[child.index()];
            c.parent = parent;
            c.prev_sibling = prev;
            c.next_sibling = next;
        }
        if prev.is_valid() {
            self.nodes[prev.index()].next_sibling = child;
        } else {
            self.nodes[parent.index()].first_child = child;
        }
        if next.is_valid() {
            self.nodes[next.index()].prev_sibling = child;
        } else {
            self.nodes[parent.index()].last_child = child;
        }

        self.record(MutationRecord {
            mutation_type: MutationType::ChildList,
            target: parent,
            added_nodes: vec![child],
            removed_nodes: Vec::new(),
            previous_sibling: prev.to_option(),
            next_sibling: next.to_option(),
            attribute_name: None,
            old_value: None,
        });
        self.layout_dirty = true;
        Ok(())
    }

    /// Remove a child node (it stays in the arena, detached)
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<()> {
        self.node(parent)?;
        if self.node(child)?.parent != parent {
            return Err(DomError::NotAChild { parent, child });
        }

        let (prev, next) = {
            let c = &mut self.nodes[child.index()];
            let links = (c.prev_sibling, c.next_sibling);
            c.parent = NodeId::NONE;
            c.prev_sibling = NodeId::NONE;
            c.next_sibling = NodeId::NONE;
            links
        };
        if prev.is_valid() {
            self.nodes[prev.index()].next_sibling = next;
        } else {
            self.nodes[parent.index()].first_child = next;
        }
        if next.is_valid() {
            self.nodes[next.index()].prev_sibling = prev;
        } else {
            self.nodes[parent.index()].last_child = prev;
        }

        self.record(MutationRecord {
            mutation_type: MutationType::ChildList,
            target: parent,
            added_nodes: Vec::new(),
            removed_nodes: vec![child],
            previous_sibling: prev.to_option(),
            next_sibling: next.to_option(),
            attribute_name: None,
            old_value: None,
        });
        self.layout_dirty = true;
        Ok(())
    }

    /// Detach a node from its parent, if it has one
    pub fn detach(&mut self, node: NodeId) -> DomResult<()> {
        match self.node(node)?.parent.to_option() {
            Some(parent) => self.remove_child(parent, node),
            None => Ok(()),
        }
    }

    // --- Attribute and character data mutation ---

    /// Set an attribute
    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) -> DomResult<()> {
        let element = self
            .get_mut(id)
            .ok_or(DomError::InvalidNode(id))?
            .as_element_mut()
            .ok_or(DomError::NotAnElement(id))?;
        let old_value = element.set_attr(name, value);

        self.record(MutationRecord {
            mutation_type: MutationType::Attributes,
            target: id,
            added_nodes: Vec::new(),
            removed_nodes: Vec::new(),
            previous_sibling: None,
            next_sibling: None,
            attribute_name: Some(name.to_ascii_lowercase()),
            old_value,
        });
        self.layout_dirty = true;
        Ok(())
    }

    /// Remove an attribute, returning whether it was present
    pub fn remove_attribute(&mut self, id: NodeId, name: &str) -> DomResult<bool> {
        let element = self
            .get_mut(id)
            .ok_or(DomError::InvalidNode(id))?
            .as_element_mut()
            .ok_or(DomError::NotAnElement(id))?;
        let Some(old_value) = element.remove_attr(name) else {
            return Ok(false);
        };

        self.record(MutationRecord {
            mutation_type: MutationType::Attributes,
            target: id,
            added_nodes: Vec::new(),
            removed_nodes: Vec::new(),
            previous_sibling: None,
            next_sibling: None,
            attribute_name: Some(name.to_ascii_lowercase()),
            old_value: Some(old_value),
        });
        self.layout_dirty = true;
        Ok(true)
    }

    /// Replace the content of a text node
    pub fn set_text(&mut self, id: NodeId, text: &str) -> DomResult<()> {
        let node = self.get_mut(id).ok_or(DomError::InvalidNode(id))?;
        let NodeData::Text(data) = &mut node.data else {
            return Err(DomError::NotText(id));
        };
        let old_value = std::mem::replace(&mut data.content, text.to_string());

        self.record(MutationRecord {
            mutation_type: MutationType::CharacterData,
            target: id,
            added_nodes: Vec::new(),
            removed_nodes: Vec::new(),
            previous_sibling: None,
            next_sibling: None,
            attribute_name: None,
            old_value: Some(old_value),
        });
        self.layout_dirty = true;
        Ok(())
    }

    /// Read one inline style property
    pub fn style_property(&self, id: NodeId, property: &str) -> Option<String> {
        let style = InlineStyle::parse(self.get_attribute(id, "style")?);
        style.get(property).map(str::to_string)
    }

    /// Write one inline style property (rewrites the `style` attribute)
    pub fn set_style_property(&mut self, id: NodeId, property: &str, value: &str) -> DomResult<()> {
        let element = self.element(id).ok_or(DomError::NotAnElement(id))?;
        let mut style = InlineStyle::parse(element.get_attr("style").unwrap_or(""));
        style.set(property, value);
        self.set_attribute(id, "style", &style.to_css_text())?;
        self.style_writes += 1;
        Ok(())
    }

    /// Number of inline style writes since the tree was created
    pub fn style_writes(&self) -> u64 {
        self.style_writes
    }

    // --- Mutation queue ---

    /// Start or stop queueing mutation records
    pub fn set_recording(&mut self, recording: bool) {
        self.recording = recording;
        if !recording {
            self.mutations.clear();
        }
    }

    pub fn is_recording(&self) -> bool {
        self.recording
    }

    /// Drain queued mutation records
    pub fn take_mutations(&mut self) -> Vec<MutationRecord> {
        std::mem::take(&mut self.mutations)
    }

    /// Number of queued records
    pub fn pending_mutations(&self) -> usize {
        self.mutations.len()
    }

    fn record(&mut self, record: MutationRecord) {
        if self.recording {
            tracing::trace!(target = %record.target, kind = ?record.mutation_type, "mutation");
            self.mutations.push(record);
        }
    }

    // --- Layout bookkeeping ---

    /// Border box from the last layout pass
    pub fn layout_box(&self, id: NodeId) -> Option<DOMRect> {
        self.get(id)?.layout
    }

    pub(crate) fn set_layout(&mut self, id: NodeId, rect: Option<DOMRect>) {
        if let Some(node) = self.get_mut(id) {
            node.layout = rect;
        }
    }

    /// Whether a structural, attribute or text change happened since the last layout
    pub fn is_layout_dirty(&self) -> bool {
        self.layout_dirty
    }

    pub(crate) fn mark_laid_out(&mut self) {
        self.layout_dirty = false;
    }

    pub(crate) fn mark_layout_dirty(&mut self) {
        self.layout_dirty = true;
    }
}

/// Iterator over direct children
pub struct Children<'a> {
    tree: &'a DomTree,
    next: NodeId,
}

impl Iterator for Children<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next.to_option()?;
        self.next = self
            .tree
            .get(current)
            .map_or(NodeId::NONE, |n| n.next_sibling);
        Some(current)
    }
}

/// Preorder iterator over a subtree (root excluded)
pub struct Descendants<'a> {
    tree: &'a DomTree,
    root: NodeId,
    next: Option<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.tree.next_in_order(current, self.root);
        Some(current)
    }
}

/// Iterator over the parent chain
pub struct Ancestors<'a> {
    tree: &'a DomTree,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.tree.parent(current);
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (DomTree, NodeId, NodeId, NodeId, NodeId) {
        let mut tree = DomTree::new();
        let div = tree.create_element("div");
        let p1 = tree.create_element("p");
        let p2 = tree.create_element("p");
        let text = tree.create_text("Hello");
        tree.append_child(tree.root(), div).unwrap();
        tree.append_child(div, p1).unwrap();
        tree.append_child(div, p2).unwrap();
        tree.append_child(p1, text).unwrap();
        (tree, div, p1, p2, text)
    }

    #[test]
    fn test_append_and_siblings() {
        let (tree, div, p1, p2, _) = sample();

        let children: Vec<_> = tree.children(div).collect();
        assert_eq!(children, vec![p1, p2]);
        assert_eq!(tree.next_sibling(p1), Some(p2));
        assert_eq!(tree.prev_sibling(p2), Some(p1));
        assert_eq!(tree.parent(p1), Some(div));
    }

    #[test]
    fn test_insert_before_and_remove() {
        let (mut tree, div, p1, p2, _) = sample();
        let h1 = tree.create_element("h1");

        tree.insert_before(div, h1, Some(p1)).unwrap();
        let children: Vec<_> = tree.children(div).collect();
        assert_eq!(children, vec![h1, p1, p2]);

        tree.remove_child(div, p1).unwrap();
        let children: Vec<_> = tree.children(div).collect();
        assert_eq!(children, vec![h1, p2]);
        assert!(!tree.is_connected(p1));
        assert_eq!(tree.remove_child(div, p1), Err(DomError::NotAChild { parent: div, child: p1 }));
    }

    #[test]
    fn test_reinsert_moves_node() {
        let (mut tree, div, p1, p2, _) = sample();

        tree.append_child(div, p1).unwrap();
        let children: Vec<_> = tree.children(div).collect();
        assert_eq!(children, vec![p2, p1]);
    }

    #[test]
    fn test_cycle_rejected() {
        let (mut tree, div, p1, _, text) = sample();

        assert!(matches!(tree.append_child(p1, div), Err(DomError::HierarchyRequest { .. })));
        let span = tree.create_element("span");
        assert!(matches!(tree.append_child(text, span), Err(DomError::HierarchyRequest { .. })));
    }

    #[test]
    fn test_preorder_walks() {
        let (tree, div, p1, p2, text) = sample();

        let order: Vec<_> = tree.descendants(div).collect();
        assert_eq!(order, vec![p1, text, p2]);

        assert_eq!(tree.prev_in_order(p2, tree.root()), Some(text));
        assert_eq!(tree.prev_in_order(text, tree.root()), Some(p1));
        assert_eq!(tree.prev_in_order(p1, div), None);
        assert_eq!(tree.next_in_order(text, div), Some(p2));
        assert_eq!(tree.next_in_order(p2, div), None);
    }

    #[test]
    fn test_mutation_records_only_while_recording() {
        let (mut tree, div, p1, _, text) = sample();
        assert_eq!(tree.pending_mutations(), 0);

        tree.set_recording(true);
        tree.set_attribute(p1, "data-x", "1").unwrap();
        tree.set_text(text, "Bye").unwrap();
        tree.remove_child(div, p1).unwrap();

        let records = tree.take_mutations();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].mutation_type, MutationType::Attributes);
        assert_eq!(records[1].old_value.as_deref(), Some("Hello"));
        assert_eq!(records[2].removed_nodes, vec![p1]);
    }

    #[test]
    fn test_style_writes_counted() {
        let (mut tree, div, ..) = sample();

        tree.set_style_property(div, "left", "10%").unwrap();
        tree.set_style_property(div, "top", "20%").unwrap();
        assert_eq!(tree.style_writes(), 2);
        assert_eq!(tree.style_property(div, "left").as_deref(), Some("10%"));
        assert_eq!(tree.get_attribute(div, "style"), Some("left: 10%; top: 20%"));
    }

    #[test]
    fn test_text_content() {
        let (mut tree, div, _, p2, _) = sample();
        let t = tree.create_text(" world");
        tree.append_child(p2, t).unwrap();

        assert_eq!(tree.text_content(div), "Hello world");
    }
}
