//! Annotation layer
//!
//! Owns the current annotation set, the renderer and the observer
//! coordinator, and advances all of them from one `pump(now)` call per
//! event-loop turn.

use worm_dom::{Document, NodeId};

use crate::config::RenderConfig;
use crate::observer::{CoordinatorSignals, ObserverCoordinator};
use crate::renderer::Renderer;
use crate::store::{Annotation, MarkerUi};

#[derive(Debug)]
pub struct WormLayer {
    annotations: Vec<Annotation>,
    renderer: Renderer,
    coordinator: ObserverCoordinator,
}

impl WormLayer {
    pub fn new(config: RenderConfig, ui: Box<dyn MarkerUi>) -> Self {
        Self {
            annotations: Vec::new(),
            renderer: Renderer::new(config.clone(), ui),
            coordinator: ObserverCoordinator::new(config),
        }
    }

    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    pub fn coordinator(&self) -> &ObserverCoordinator {
        &self.coordinator
    }

    /// Marker element of an annotation
    pub fn marker(&self, annotation_id: &str) -> Option<NodeId> {
        self.renderer.marker(annotation_id)
    }

    pub fn start(&mut self, doc: &mut Document) {
        self.coordinator.start(doc);
    }

    pub fn stop(&mut self, doc: &mut Document) {
        self.coordinator.stop(doc);
    }

    /// Replace the annotation set and schedule a full render
    pub fn set_annotations(&mut self, doc: &mut Document, annotations: Vec<Annotation>) {
        self.annotations = annotations;
        self.renderer.render_all(doc, &self.annotations);
    }

    /// Insert or replace one annotation, draw it now, then reconcile
    pub fn draw_worm(&mut self, doc: &mut Document, annotation: Annotation) -> Option<NodeId> {
        let marker = self.renderer.draw_worm(doc, &annotation);
        match self.annotations.iter_mut().find(|a| a.id == annotation.id) {
            Some(slot) => *slot = annotation,
            None => self.annotations.push(annotation),
        }
        self.renderer.render_all(doc, &self.annotations);
        self.watch_overlay_hosts(doc);
        marker
    }

    /// Drop one annotation and its marker
    pub fn remove(&mut self, doc: &mut Document, annotation_id: &str) -> bool {
        let before = self.annotations.len();
        self.annotations.retain(|a| a.id != annotation_id);
        let removed = self.annotations.len() != before;
        if removed {
            self.renderer.render_all(doc, &self.annotations);
            self.watch_overlay_hosts(doc);
        }
        removed
    }

    pub fn on_window_resize(&mut self, now: u64) {
        self.coordinator.on_window_resize(now);
    }

    pub fn on_scroll(&mut self, now: u64) {
        self.coordinator.on_scroll(now);
    }

    /// One event-loop turn: observers, timers, then the pending frame
    pub fn pump(&mut self, doc: &mut Document, now: u64) -> CoordinatorSignals {
        let signals = self.coordinator.poll(doc, now);

        if let Some(scrolling) = signals.scrolling {
            self.renderer.set_scrolling(doc, scrolling);
        }
        if !signals.resized_hosts.is_empty() {
            self.renderer.sync_overlays(doc, &signals.resized_hosts);
        }
        if let Some(reason) = signals.replan {
            tracing::debug!(?reason, "re-plan");
            self.renderer.render_all(doc, &self.annotations);
        }
        if self.renderer.on_animation_frame(doc) {
            self.watch_overlay_hosts(doc);
        }
        signals
    }

    /// Tear everything down
    pub fn destroy(&mut self, doc: &mut Document) {
        self.coordinator.stop(doc);
        self.renderer.destroy(doc);
        self.annotations.clear();
    }

    /// Watch exactly the hosts that currently carry an overlay
    fn watch_overlay_hosts(&mut self, doc: &mut Document) {
        if !self.coordinator.is_running() {
            return;
        }
        doc.ensure_layout();
        let hosts = self.renderer.overlay_hosts();
        self.coordinator.watch_hosts(doc.tree(), &hosts);
    }
}
