//! Collaborator contracts
//!
//! Persistence and marker UI live outside the engine. The engine talks to
//! them through [`AnnotationStore`] and [`MarkerUi`]; [`MemoryStore`] and
//! [`NoopUi`] are the in-process defaults.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;
use worm_anchor::Position;
use worm_dom::{Document, NodeId};

use crate::error::StoreError;

/// A stored annotation; fields other than `id` and `position` are opaque
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub id: String,
    pub position: Position,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Annotation {
    pub fn new(id: impl Into<String>, position: Position) -> Self {
        Self {
            id: id.into(),
            position,
            extra: Map::new(),
        }
    }
}

/// Persistence, keyed by page
pub trait AnnotationStore {
    fn list(&self, key: &str) -> Result<Vec<Annotation>, StoreError>;

    /// Store a new record under a fresh id
    fn create(
        &mut self,
        key: &str,
        position: Position,
        extra: Map<String, Value>,
    ) -> Result<Annotation, StoreError>;

    /// Merge `extra` into an existing record
    fn update(
        &mut self,
        key: &str,
        id: &str,
        extra: Map<String, Value>,
    ) -> Result<Annotation, StoreError>;

    fn remove(&mut self, key: &str, id: &str) -> Result<(), StoreError>;

    /// Replace every record for `key`
    fn replace(&mut self, key: &str, records: Vec<Annotation>) -> Result<(), StoreError>;
}

/// In-memory store with JSON export and import
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemoryStore {
    pages: BTreeMap<String, Vec<Annotation>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn export_json(&self) -> Result<String, StoreError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn import_json(json: &str) -> Result<Self, StoreError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Page keys with at least one record
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.pages
            .iter()
            .filter(|(_, records)| !records.is_empty())
            .map(|(key, _)| key.as_str())
    }

    fn find_mut(&mut self, key: &str, id: &str) -> Result<&mut Annotation, StoreError> {
        self.pages
            .get_mut(key)
            .and_then(|records| records.iter_mut().find(|a| a.id == id))
            .ok_or_else(|| StoreError::NotFound {
                key: key.to_string(),
                id: id.to_string(),
            })
    }
}

impl AnnotationStore for MemoryStore {
    fn list(&self, key: &str) -> Result<Vec<Annotation>, StoreError> {
        Ok(self.pages.get(key).cloned().unwrap_or_default())
    }

    fn create(
        &mut self,
        key: &str,
        position: Position,
        extra: Map<String, Value>,
    ) -> Result<Annotation, StoreError> {
        let annotation = Annotation {
            id: Uuid::new_v4().to_string(),
            position,
            extra,
        };
        tracing::debug!(key, id = %annotation.id, "annotation created");
        self.pages
            .entry(key.to_string())
            .or_default()
            .push(annotation.clone());
        Ok(annotation)
    }

    fn update(
        &mut self,
        key: &str,
        id: &str,
        extra: Map<String, Value>,
    ) -> Result<Annotation, StoreError> {
        let annotation = self.find_mut(key, id)?;
        for (field, value) in extra {
            if field == "id" || field == "position" {
                continue;
            }
            annotation.extra.insert(field, value);
        }
        Ok(annotation.clone())
    }

    fn remove(&mut self, key: &str, id: &str) -> Result<(), StoreError> {
        let records = self.pages.get_mut(key);
        let index = records
            .as_ref()
            .and_then(|r| r.iter().position(|a| a.id == id));
        match (records, index) {
            (Some(records), Some(index)) => {
                records.remove(index);
                Ok(())
            }
            _ => Err(StoreError::NotFound {
                key: key.to_string(),
                id: id.to_string(),
            }),
        }
    }

    fn replace(&mut self, key: &str, records: Vec<Annotation>) -> Result<(), StoreError> {
        self.pages.insert(key.to_string(), records);
        Ok(())
    }
}

/// Marker UI hooks
pub trait MarkerUi {
    /// A marker element was created for `annotation`
    fn attach(&mut self, doc: &mut Document, annotation: &Annotation, marker: NodeId);

    /// The marker for `annotation_id` was removed
    fn detach(&mut self, annotation_id: &str);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopUi;

impl MarkerUi for NoopUi {
    fn attach(&mut self, _doc: &mut Document, _annotation: &Annotation, _marker: NodeId) {}

    fn detach(&mut self, _annotation_id: &str) {}
}
