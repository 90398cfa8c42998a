//! Render differ
//!
//! A cycle runs Idle, Planning, Scheduled, Applying and back to Idle.
//! Planning resolves hosts and drops markers of vanished annotations;
//! applying happens in a single animation frame and touches the DOM only
//! where the plan differs from what was written last time.

use std::collections::BTreeMap;

use worm_anchor::OWNED_ATTR;
use worm_dom::style::{format_pct, format_px};
use worm_dom::{DOMRect, Document, DomError, DomResult, NodeId};

use crate::config::RenderConfig;
use crate::frame::{FrameHandle, FrameScheduler};
use crate::planner::{PlanItem, RenderPlan, plan, plan_item};
use crate::store::{Annotation, MarkerUi};
use crate::ID_ATTR;

const MARKER_CLASS: &str = "worm-marker";
const OVERLAY_CLASS: &str = "worm-overlay";

/// Render cycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderState {
    #[default]
    Idle,
    Planning,
    Scheduled,
    Applying,
}

/// What was last written for one annotation
#[derive(Debug, Clone, PartialEq)]
struct MarkerState {
    marker: NodeId,
    overlay: Option<NodeId>,
    host: NodeId,
    container: NodeId,
    left: Option<String>,
    top: Option<String>,
    overlay_box: Option<DOMRect>,
}

pub struct Renderer {
    config: RenderConfig,
    state: RenderState,
    frames: FrameScheduler,
    plan: RenderPlan,
    annotations: BTreeMap<String, Annotation>,
    markers: BTreeMap<String, MarkerState>,
    ui: Box<dyn MarkerUi>,
    scrolling: bool,
    cycles: u64,
    errors: u64,
}

impl std::fmt::Debug for Renderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Renderer")
            .field("state", &self.state)
            .field("markers", &self.markers.len())
            .field("frame_pending", &self.frames.is_pending())
            .field("cycles", &self.cycles)
            .finish()
    }
}

impl Renderer {
    pub fn new(config: RenderConfig, ui: Box<dyn MarkerUi>) -> Self {
        Self {
            config,
            state: RenderState::Idle,
            frames: FrameScheduler::new(),
            plan: RenderPlan::default(),
            annotations: BTreeMap::new(),
            markers: BTreeMap::new(),
            ui,
            scrolling: false,
            cycles: 0,
            errors: 0,
        }
    }

    pub fn state(&self) -> RenderState {
        self.state
    }

    pub fn frames(&self) -> &FrameScheduler {
        &self.frames
    }

    /// Plan from the last `render_all`
    pub fn plan(&self) -> &RenderPlan {
        &self.plan
    }

    /// Completed apply steps
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Apply errors swallowed so far
    pub fn errors(&self) -> u64 {
        self.errors
    }

    pub fn marker(&self, annotation_id: &str) -> Option<NodeId> {
        self.markers.get(annotation_id).map(|m| m.marker)
    }

    pub fn overlay(&self, annotation_id: &str) -> Option<NodeId> {
        self.markers.get(annotation_id).and_then(|m| m.overlay)
    }

    pub fn host(&self, annotation_id: &str) -> Option<NodeId> {
        self.markers.get(annotation_id).map(|m| m.host)
    }

    /// Hosts currently covered by an overlay box
    pub fn overlay_hosts(&self) -> Vec<NodeId> {
        self.markers
            .values()
            .filter(|m| m.overlay.is_some())
            .map(|m| m.host)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    /// Plan every annotation and schedule one frame to apply the plan
    pub fn render_all(&mut self, doc: &mut Document, annotations: &[Annotation]) -> FrameHandle {
        self.state = RenderState::Planning;

        self.annotations = annotations
            .iter()
            .map(|a| (a.id.clone(), a.clone()))
            .collect();
        let vanished: Vec<String> = self
            .markers
            .keys()
            .filter(|id| !self.annotations.contains_key(*id))
            .cloned()
            .collect();
        for id in vanished {
            self.remove_marker(doc, &id);
        }

        doc.ensure_layout();
        self.plan = plan(doc, annotations);

        let handle = self.frames.request();
        self.state = RenderState::Scheduled;
        tracing::debug!(frame = handle.id(), items = self.plan.len(), "render scheduled");
        handle
    }

    /// Run the pending frame; returns false when none was scheduled
    pub fn on_animation_frame(&mut self, doc: &mut Document) -> bool {
        let Some(handle) = self.frames.take_pending() else {
            return false;
        };
        self.state = RenderState::Applying;

        let items = std::mem::take(&mut self.plan.items);
        for item in &items {
            if let Err(err) = self.apply_item(doc, item) {
                self.errors += 1;
                tracing::warn!(id = %item.annotation_id, %err, "render apply failed");
            }
        }
        self.plan.items = items;

        self.cycles += 1;
        self.state = RenderState::Idle;
        tracing::debug!(frame = handle.id(), markers = self.markers.len(), "render applied");
        true
    }

    /// Place one annotation immediately, outside the batched cycle
    pub fn draw_worm(&mut self, doc: &mut Document, annotation: &Annotation) -> Option<NodeId> {
        doc.ensure_layout();
        let item = plan_item(doc, annotation, None);
        self.annotations
            .insert(annotation.id.clone(), annotation.clone());

        match self.apply_item(doc, &item) {
            Ok(()) => self.marker(&annotation.id),
            Err(err) => {
                self.errors += 1;
                tracing::warn!(id = %annotation.id, %err, "draw failed");
                None
            }
        }
    }

    /// Re-align overlay boxes of resized hosts without re-planning
    pub fn sync_overlays(&mut self, doc: &mut Document, hosts: &[NodeId]) -> usize {
        doc.ensure_layout();
        let mut synced = 0;
        for state in self.markers.values_mut() {
            let Some(overlay) = state.overlay else {
                continue;
            };
            if !hosts.contains(&state.host) {
                continue;
            }
            let Some(offset) = doc.offset_rect(state.host) else {
                continue;
            };
            match write_overlay_box(doc, overlay, &mut state.overlay_box, offset) {
                Ok(true) => synced += 1,
                Ok(false) => {}
                Err(err) => {
                    self.errors += 1;
                    tracing::warn!(%overlay, %err, "overlay sync failed");
                }
            }
        }
        synced
    }

    /// Fade markers while the page scrolls
    pub fn set_scrolling(&mut self, doc: &mut Document, scrolling: bool) {
        if self.scrolling == scrolling {
            return;
        }
        self.scrolling = scrolling;
        let opacity = if scrolling {
            self.config.scrolling_opacity.to_string()
        } else {
            "1".to_string()
        };
        for state in self.markers.values() {
            if let Err(err) = doc.tree_mut().set_style_property(state.marker, "opacity", &opacity) {
                tracing::warn!(marker = %state.marker, %err, "opacity write failed");
            }
        }
    }

    pub fn is_scrolling(&self) -> bool {
        self.scrolling
    }

    /// Remove every marker and overlay and cancel the pending frame
    pub fn destroy(&mut self, doc: &mut Document) {
        self.frames.cancel();
        let ids: Vec<String> = self.markers.keys().cloned().collect();
        for id in ids {
            self.remove_marker(doc, &id);
        }
        self.plan = RenderPlan::default();
        self.annotations.clear();
        self.scrolling = false;
        self.state = RenderState::Idle;
    }

    fn remove_marker(&mut self, doc: &mut Document, annotation_id: &str) {
        let Some(state) = self.markers.remove(annotation_id) else {
            return;
        };
        let tree = doc.tree_mut();
        for node in std::iter::once(state.marker).chain(state.overlay) {
            if let Err(err) = tree.detach(node) {
                tracing::warn!(%node, %err, "marker removal failed");
            }
        }
        self.ui.detach(annotation_id);
        tracing::trace!(id = annotation_id, "marker removed");
    }

    fn apply_item(&mut self, doc: &mut Document, item: &PlanItem) -> DomResult<()> {
        if !doc.tree().is_connected(item.host) {
            return Err(DomError::InvalidNode(item.host));
        }

        let existing = self.markers.get(&item.annotation_id).cloned();
        let created = existing.is_none();
        let mut state = match existing {
            Some(state) => state,
            None => MarkerState {
                marker: create_owned(doc, &item.annotation_id, MARKER_CLASS)?,
                overlay: None,
                host: item.host,
                container: item.container,
                left: None,
                top: None,
                overlay_box: None,
            },
        };
        if created && self.scrolling {
            let opacity = self.config.scrolling_opacity.to_string();
            doc.tree_mut().set_style_property(state.marker, "opacity", &opacity)?;
        }

        let parent = match item.overlay_box {
            Some(offset) => {
                let overlay = match state.overlay {
                    Some(overlay) => overlay,
                    None => {
                        let overlay = create_owned(doc, &item.annotation_id, OVERLAY_CLASS)?;
                        doc.tree_mut().set_style_property(overlay, "pointer-events", "none")?;
                        state.overlay = Some(overlay);
                        state.overlay_box = None;
                        overlay
                    }
                };
                if doc.tree().parent(overlay) != Some(item.container) {
                    doc.tree_mut().append_child(item.container, overlay)?;
                }
                write_overlay_box(doc, overlay, &mut state.overlay_box, offset)?;
                overlay
            }
            None => {
                if let Some(overlay) = state.overlay.take() {
                    doc.tree_mut().detach(overlay)?;
                    state.overlay_box = None;
                }
                item.host
            }
        };

        if doc.tree().parent(state.marker) != Some(parent) {
            doc.tree_mut().append_child(parent, state.marker)?;
        }
        state.host = item.host;
        state.container = item.container;

        let left = format_pct(item.x_pct);
        let top = format_pct(item.y_pct);
        if state.left.as_deref() != Some(left.as_str()) {
            doc.tree_mut().set_style_property(state.marker, "left", &left)?;
            state.left = Some(left);
        }
        if state.top.as_deref() != Some(top.as_str()) {
            doc.tree_mut().set_style_property(state.marker, "top", &top)?;
            state.top = Some(top);
        }

        let marker = state.marker;
        self.markers.insert(item.annotation_id.clone(), state);
        if created {
            if let Some(annotation) = self.annotations.get(&item.annotation_id) {
                self.ui.attach(doc, annotation, marker);
            }
            tracing::trace!(id = %item.annotation_id, %marker, "marker created");
        }
        Ok(())
    }
}

/// Detached element tagged as owned by the layer
fn create_owned(doc: &mut Document, annotation_id: &str, class: &str) -> DomResult<NodeId> {
    let tree = doc.tree_mut();
    let element = tree.create_element("div");
    tree.set_attribute(element, OWNED_ATTR, "true")?;
    tree.set_attribute(element, ID_ATTR, annotation_id)?;
    tree.set_attribute(element, "class", class)?;
    tree.set_style_property(element, "position", "absolute")?;
    Ok(element)
}

/// Write overlay geometry when it differs from `last`; returns whether it did
fn write_overlay_box(
    doc: &mut Document,
    overlay: NodeId,
    last: &mut Option<DOMRect>,
    offset: DOMRect,
) -> DomResult<bool> {
    let tree = doc.tree_mut();
    let previous = *last;
    let moved = previous.is_none_or(|p| p.x != offset.x || p.y != offset.y);
    let resized = previous.is_none_or(|p| !p.same_size(&offset));
    if moved {
        tree.set_style_property(overlay, "left", &format_px(offset.x))?;
        tree.set_style_property(overlay, "top", &format_px(offset.y))?;
    }
    if resized {
        tree.set_style_property(overlay, "width", &format_px(offset.width))?;
        tree.set_style_property(overlay, "height", &format_px(offset.height))?;
    }
    *last = Some(offset);
    Ok(moved || resized)
}
