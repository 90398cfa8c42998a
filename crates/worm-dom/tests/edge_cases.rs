//! Edge case tests for worm-dom
//!
//! Tree surgery, layout invalidation and observer interplay.

use worm_dom::{
    BoundaryPoint, DOMRect, Document, DomError, MutationObserver, MutationObserverInit,
    MutationType, NodeId, Range, ResizeObserver,
};

fn page() -> (Document, NodeId) {
    let doc = Document::new("https://example.com/page");
    let body = doc.body().unwrap();
    (doc, body)
}

fn append(doc: &mut Document, parent: NodeId, tag: &str, text: Option<&str>) -> NodeId {
    let tree = doc.tree_mut();
    let el = tree.create_element(tag);
    if let Some(text) = text {
        let t = tree.create_text(text);
        tree.append_child(el, t).unwrap();
    }
    tree.append_child(parent, el).unwrap();
    el
}

// ============================================================================
// Tree structure
// ============================================================================

#[test]
fn test_invalid_handles() {
    let (mut doc, body) = page();
    let bogus = NodeId::from_raw(9_999);

    assert_eq!(doc.tree_mut().append_child(body, bogus), Err(DomError::InvalidNode(bogus)));
    assert_eq!(doc.tree().parent(bogus), None);
    assert!(doc.tree().children(bogus).next().is_none());
}

#[test]
fn test_text_cannot_have_children() {
    let (mut doc, body) = page();
    let p = append(&mut doc, body, "p", Some("x"));
    let text = doc.tree().first_child(p).unwrap();
    let span = doc.tree_mut().create_element("span");

    assert!(matches!(
        doc.tree_mut().append_child(text, span),
        Err(DomError::HierarchyRequest { .. })
    ));
    assert_eq!(doc.tree_mut().set_attribute(text, "a", "b"), Err(DomError::NotAnElement(text)));
}

#[test]
fn test_detached_nodes_have_no_layout() {
    let (mut doc, body) = page();
    let p = append(&mut doc, body, "p", Some("gone soon"));
    doc.reflow();
    assert!(doc.has_client_rect(p));

    doc.tree_mut().detach(p).unwrap();
    assert!(doc.needs_layout());
    doc.ensure_layout();
    assert!(!doc.has_client_rect(p));
    assert!(!doc.tree().is_connected(p));
}

// ============================================================================
// Layout
// ============================================================================

#[test]
fn test_sibling_removal_shifts_layout() {
    let (mut doc, body) = page();
    let first = append(&mut doc, body, "p", Some("first"));
    let second = append(&mut doc, body, "p", Some("second"));
    doc.reflow();
    assert_eq!(doc.bounding_client_rect(second).unwrap().y, 20.0);

    doc.tree_mut().remove_child(body, first).unwrap();
    doc.ensure_layout();
    assert_eq!(doc.bounding_client_rect(second).unwrap().y, 0.0);
}

#[test]
fn test_hidden_attribute_and_offset_rect() {
    let (mut doc, body) = page();
    let hidden = append(&mut doc, body, "div", Some("secret"));
    doc.tree_mut().set_attribute(hidden, "hidden", "").unwrap();
    let wrap = append(&mut doc, body, "div", None);
    append(&mut doc, wrap, "p", Some("one"));
    let img = append(&mut doc, wrap, "img", None);
    doc.tree_mut().set_attribute(img, "style", "width: 100px; height: 50px").unwrap();
    doc.reflow();

    assert!(!doc.has_client_rect(hidden));
    assert_eq!(doc.offset_rect(img), Some(DOMRect::from_xywh(0.0, 20.0, 100.0, 50.0)));
}

#[test]
fn test_viewport_change_rewraps_text() {
    let (mut doc, body) = page();
    let p = append(&mut doc, body, "p", Some("0123456789012345678901234567890123456789"));
    doc.set_viewport(160.0, 100.0);
    doc.ensure_layout();

    assert_eq!(doc.bounding_client_rect(p).unwrap().height, 40.0);
}

// ============================================================================
// Ranges
// ============================================================================

#[test]
fn test_range_with_multibyte_text() {
    let (mut doc, body) = page();
    let p = append(&mut doc, body, "p", Some("héllo wörld"));
    let text = doc.tree().first_child(p).unwrap();
    doc.reflow();

    let range = Range::from_text(text, 6, 11);
    assert_eq!(range.text(doc.tree()), "wörld");
    let clamped = Range::new(BoundaryPoint::new(text, 6), BoundaryPoint::new(text, 500));
    assert_eq!(clamped.text(doc.tree()), "wörld");
}

#[test]
fn test_collapsed_range_selects_nothing() {
    let (mut doc, body) = page();
    let p = append(&mut doc, body, "p", Some("abc"));
    let text = doc.tree().first_child(p).unwrap();
    doc.reflow();

    let range = Range::collapsed_at(BoundaryPoint::new(text, 1));
    assert!(range.is_collapsed());
    assert_eq!(range.text(doc.tree()), "");
    assert_eq!(range.bounding_client_rect(&doc), None);
}

// ============================================================================
// Observers
// ============================================================================

#[test]
fn test_mutation_observer_sees_character_data() {
    let (mut doc, body) = page();
    let p = append(&mut doc, body, "p", Some("before"));
    let text = doc.tree().first_child(p).unwrap();

    let mut observer = MutationObserver::new();
    observer.observe(doc.tree_mut(), body, MutationObserverInit::all_subtree());
    doc.tree_mut().set_text(text, "after").unwrap();

    let records = observer.take_records(doc.tree_mut());
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].mutation_type, MutationType::CharacterData);
    assert_eq!(records[0].old_value.as_deref(), Some("before"));
}

#[test]
fn test_resize_observer_reports_removed_target_once() {
    let (mut doc, body) = page();
    let p = append(&mut doc, body, "p", Some("text"));
    doc.reflow();

    let mut observer = ResizeObserver::new();
    observer.observe(doc.tree(), p);
    doc.tree_mut().detach(p).unwrap();
    doc.ensure_layout();

    let entries = observer.check_sizes(doc.tree());
    assert_eq!(entries.len(), 1);
    assert_eq!((entries[0].width, entries[0].height), (0.0, 0.0));
    assert!(observer.check_sizes(doc.tree()).is_empty());
}
