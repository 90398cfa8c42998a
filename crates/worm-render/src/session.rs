//! Session controller
//!
//! Connects a document to the annotation store: derives the storage key
//! from the page address, loads and renders the page's annotations, and
//! routes create, update and remove through the store before touching the
//! layer.

use serde_json::{Map, Value};
use worm_anchor::location::storage_key;
use worm_anchor::{AnchorConfig, Interaction, create_position};
use worm_dom::Document;

use crate::config::WormConfig;
use crate::error::SessionError;
use crate::layer::WormLayer;
use crate::store::{Annotation, AnnotationStore, MarkerUi};

#[derive(Debug)]
pub struct WormSession<S: AnnotationStore> {
    store: S,
    anchor: AnchorConfig,
    layer: WormLayer,
    key: Option<String>,
}

impl<S: AnnotationStore> WormSession<S> {
    pub fn new(store: S, config: WormConfig, ui: Box<dyn MarkerUi>) -> Self {
        Self {
            store,
            anchor: config.anchor,
            layer: WormLayer::new(config.render, ui),
            key: None,
        }
    }

    /// Build from a JSON configuration document
    pub fn from_json_config(store: S, json: &str, ui: Box<dyn MarkerUi>) -> Result<Self, SessionError> {
        Ok(Self::new(store, WormConfig::from_json(json)?, ui))
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn layer(&self) -> &WormLayer {
        &self.layer
    }

    /// Storage key of the loaded page
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    /// Load the page's annotations, start observing and schedule a render
    pub fn load(&mut self, doc: &mut Document) -> Result<usize, SessionError> {
        let key = storage_key(doc.url());
        let annotations = self.store.list(&key)?;
        let count = annotations.len();
        tracing::debug!(%key, count, "loading annotations");

        self.key = Some(key);
        self.layer.start(doc);
        self.layer.set_annotations(doc, annotations);
        Ok(count)
    }

    /// Encode the interaction, store it and draw it right away
    pub fn create_worm(
        &mut self,
        doc: &mut Document,
        interaction: &Interaction,
        extra: Map<String, Value>,
    ) -> Result<Annotation, SessionError> {
        let key = self.current_key(doc);
        let position = create_position(doc, interaction, &self.anchor);
        let annotation = self.store.create(&key, position, extra)?;
        self.layer.draw_worm(doc, annotation.clone());
        Ok(annotation)
    }

    /// Merge opaque fields into a stored annotation
    pub fn update_worm(
        &mut self,
        doc: &mut Document,
        id: &str,
        extra: Map<String, Value>,
    ) -> Result<Annotation, SessionError> {
        let key = self.current_key(doc);
        let annotation = self.store.update(&key, id, extra)?;
        let mut annotations = self.layer.annotations().to_vec();
        if let Some(slot) = annotations.iter_mut().find(|a| a.id == id) {
            *slot = annotation.clone();
        }
        self.layer.set_annotations(doc, annotations);
        Ok(annotation)
    }

    pub fn remove_worm(&mut self, doc: &mut Document, id: &str) -> Result<(), SessionError> {
        let key = self.current_key(doc);
        self.store.remove(&key, id)?;
        self.layer.remove(doc, id);
        Ok(())
    }

    /// Re-key after an in-page navigation; reloads when the key changed
    pub fn navigate(&mut self, doc: &mut Document, url: &str) -> Result<bool, SessionError> {
        doc.set_url(url);
        let key = storage_key(url);
        if self.key.as_deref() == Some(key.as_str()) {
            return Ok(false);
        }
        tracing::debug!(%key, "navigated");
        self.load(doc)?;
        Ok(true)
    }

    pub fn on_window_resize(&mut self, now: u64) {
        self.layer.on_window_resize(now);
    }

    pub fn on_scroll(&mut self, now: u64) {
        self.layer.on_scroll(now);
    }

    pub fn pump(&mut self, doc: &mut Document, now: u64) {
        self.layer.pump(doc, now);
    }

    pub fn destroy(&mut self, doc: &mut Document) {
        self.layer.destroy(doc);
        self.key = None;
    }

    fn current_key(&self, doc: &Document) -> String {
        self.key.clone().unwrap_or_else(|| storage_key(doc.url()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, NoopUi};
    use crate::StoreError;

    fn session() -> WormSession<MemoryStore> {
        WormSession::new(MemoryStore::new(), WormConfig::default(), Box::new(NoopUi))
    }

    fn page(url: &str) -> Document {
        worm_html::parse_with_url("<body><p>first</p><p>second</p></body>", url)
    }

    fn click_first_p(doc: &Document) -> Interaction {
        let p = doc.tree().query_selector(doc.tree().root(), "p").unwrap().unwrap();
        Interaction::click(p, 10.0, 10.0)
    }

    #[test]
    fn test_create_then_reload() {
        let mut doc = page("https://example.com/post?ref=feed#intro");
        let mut s = session();
        assert_eq!(s.load(&mut doc).unwrap(), 0);
        assert_eq!(s.key(), Some("https://example.com/post#intro"));

        let interaction = click_first_p(&doc);
        let created = s.create_worm(&mut doc, &interaction, Map::new()).unwrap();
        assert!(s.layer().marker(&created.id).is_some());

        let mut fresh = page("https://example.com/post?ref=other#intro");
        let mut reloaded = WormSession::new(s.store().clone(), WormConfig::default(), Box::new(NoopUi));
        assert_eq!(reloaded.load(&mut fresh).unwrap(), 1);
        reloaded.pump(&mut fresh, 0);
        assert!(reloaded.layer().marker(&created.id).is_some());
    }

    #[test]
    fn test_update_and_remove() {
        let mut doc = page("https://example.com/a");
        let mut s = session();
        s.load(&mut doc).unwrap();
        let interaction = click_first_p(&doc);
        let created = s.create_worm(&mut doc, &interaction, Map::new()).unwrap();

        let mut extra = Map::new();
        extra.insert("content".into(), Value::from("note"));
        let updated = s.update_worm(&mut doc, &created.id, extra).unwrap();
        assert_eq!(updated.extra["content"], "note");
        assert_eq!(s.layer().annotations()[0].extra["content"], "note");

        s.remove_worm(&mut doc, &created.id).unwrap();
        assert!(s.layer().annotations().is_empty());
        assert!(matches!(
            s.remove_worm(&mut doc, &created.id),
            Err(SessionError::Store(StoreError::NotFound { .. }))
        ));
    }

    #[test]
    fn test_navigate_rekeys() {
        let mut doc = page("https://example.com/a");
        let mut s = session();
        s.load(&mut doc).unwrap();
        let interaction = click_first_p(&doc);
        s.create_worm(&mut doc, &interaction, Map::new()).unwrap();

        assert!(!s.navigate(&mut doc, "https://example.com/a?page=2").unwrap());
        assert!(s.navigate(&mut doc, "https://example.com/b").unwrap());
        assert_eq!(s.key(), Some("https://example.com/b"));
        assert!(s.layer().annotations().is_empty());
    }

    #[test]
    fn test_bad_json_config() {
        let result = WormSession::from_json_config(MemoryStore::new(), "{\"render\": 5}", Box::new(NoopUi));
        assert!(matches!(result, Err(SessionError::Config(_))));
    }
}
