//! Render planning
//!
//! Resolves every annotation against a fresh corpus and decides where its
//! marker goes. Planning reads the document only; all writes happen when
//! the plan is applied.

use worm_anchor::{Corpus, Tier, is_owned, resolve};
use worm_dom::{DOMRect, Document, NodeId};

use crate::store::Annotation;

/// Hosts that cannot hold a marker child; these get an overlay box instead
pub const CANNOT_CONTAIN_TAGS: &[&str] = &[
    "img", "video", "canvas", "svg", "iframe", "embed", "object", "input", "br", "hr",
    "textarea", "audio", "select", "picture", "area", "wbr",
];

pub fn cannot_contain_children(tag: &str) -> bool {
    CANNOT_CONTAIN_TAGS.contains(&tag)
}

/// Placement of one annotation
#[derive(Debug, Clone, PartialEq)]
pub struct PlanItem {
    pub annotation_id: String,
    /// Resolved host element
    pub host: NodeId,
    /// Element that receives the marker, or the overlay for replaced hosts
    pub container: NodeId,
    pub cannot_contain_children: bool,
    pub x_pct: f64,
    pub y_pct: f64,
    /// Host offset box inside `container`, set when an overlay is needed
    pub overlay_box: Option<DOMRect>,
    pub tier: Tier,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderPlan {
    pub items: Vec<PlanItem>,
}

impl RenderPlan {
    pub fn get(&self, annotation_id: &str) -> Option<&PlanItem> {
        self.items.iter().find(|i| i.annotation_id == annotation_id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn contains(&self, annotation_id: &str) -> bool {
        self.get(annotation_id).is_some()
    }
}

/// Plan every annotation against the current layout
pub fn plan(doc: &Document, annotations: &[Annotation]) -> RenderPlan {
    let corpus = Corpus::build(doc, doc.body_or_root());
    let items: Vec<PlanItem> = annotations
        .iter()
        .map(|a| plan_item(doc, a, Some(&corpus)))
        .collect();

    tracing::debug!(
        annotations = items.len(),
        overlays = items.iter().filter(|i| i.cannot_contain_children).count(),
        "planned render"
    );
    RenderPlan { items }
}

/// Plan one annotation; builds its own corpus lazily when none is given
pub fn plan_item(doc: &Document, annotation: &Annotation, corpus: Option<&Corpus<'_>>) -> PlanItem {
    let tree = doc.tree();
    let resolution = resolve(doc, &annotation.position, corpus);

    // Selectors can land on the layer's own elements; step out of them.
    let mut host = resolution.element;
    while is_owned(tree, host) {
        match tree.parent_element(host) {
            Some(parent) => host = parent,
            None => {
                host = doc.body_or_root();
                break;
            }
        }
    }

    let cannot_contain = tree.tag_name(host).is_some_and(cannot_contain_children);
    let (container, overlay_box) = if cannot_contain {
        let parent = tree.parent_element(host).unwrap_or_else(|| doc.body_or_root());
        let offset = doc.offset_rect(host).unwrap_or_default();
        (parent, Some(offset))
    } else {
        (host, None)
    };

    let rel = annotation.position.element.rel_box_pct;
    tracing::trace!(id = %annotation.id, %host, tier = %resolution.tier, "planned annotation");
    PlanItem {
        annotation_id: annotation.id.clone(),
        host,
        container,
        cannot_contain_children: cannot_contain,
        x_pct: rel.x,
        y_pct: rel.y,
        overlay_box,
        tier: resolution.tier,
    }
}
