//! In-memory document store used by tests and local runs.

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

use super::{Document, DocumentStore, SetMode, StoreError, StoreResult};

/// Thread-safe in-memory document store.
///
/// Every call is counted so callers can assert that an operation never
/// reached the backend.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDocumentStore {
    collections: Arc<RwLock<HashMap<String, BTreeMap<String, Document>>>>,
    calls: Arc<AtomicUsize>,
    offline: Arc<AtomicBool>,
}

impl InMemoryDocumentStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of store calls made so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Simulates a network outage: every call fails with `Unavailable`.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Number of documents in a collection.
    pub fn len(&self, collection: &str) -> usize {
        self.collections
            .read()
            .map(|c| c.get(collection).map_or(0, BTreeMap::len))
            .unwrap_or(0)
    }

    fn enter(&self) -> StoreResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("network request failed".to_string()));
        }
        Ok(())
    }

    fn poisoned(err: impl ToString) -> StoreError {
        StoreError::backend(std::io::Error::other(err.to_string()))
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn add(&self, collection: &str, doc: Document) -> StoreResult<String> {
        self.enter()?;
        let id = uuid::Uuid::new_v4().simple().to_string();
        let mut state = self.collections.write().map_err(Self::poisoned)?;
        state
            .entry(collection.to_string())
            .or_default()
            .insert(id.clone(), doc);
        Ok(id)
    }

    async fn set(
        &self,
        collection: &str,
        id: &str,
        doc: Document,
        mode: SetMode,
    ) -> StoreResult<()> {
        self.enter()?;
        let mut state = self.collections.write().map_err(Self::poisoned)?;
        let docs = state.entry(collection.to_string()).or_default();
        match (mode, docs.get_mut(id)) {
            (SetMode::Merge, Some(existing)) => existing.extend(doc),
            _ => {
                docs.insert(id.to_string(), doc);
            }
        }
        Ok(())
    }

    async fn update(&self, collection: &str, id: &str, doc: Document) -> StoreResult<()> {
        self.enter()?;
        let mut state = self.collections.write().map_err(Self::poisoned)?;
        let existing = state
            .get_mut(collection)
            .and_then(|docs| docs.get_mut(id))
            .ok_or_else(|| StoreError::not_found(collection, id))?;
        existing.extend(doc);
        Ok(())
    }

    async fn get(&self, collection: &str, id: &str) -> StoreResult<Option<Document>> {
        self.enter()?;
        let state = self.collections.read().map_err(Self::poisoned)?;
        Ok(state.get(collection).and_then(|docs| docs.get(id)).cloned())
    }

    async fn list(&self, collection: &str) -> StoreResult<Vec<(String, Document)>> {
        self.enter()?;
        let state = self.collections.read().map_err(Self::poisoned)?;
        Ok(state
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .map(|(id, doc)| (id.clone(), doc.clone()))
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn delete(&self, collection: &str, id: &str) -> StoreResult<()> {
        self.enter()?;
        let mut state = self.collections.write().map_err(Self::poisoned)?;
        if let Some(docs) = state.get_mut(collection) {
            docs.remove(id);
        }
        Ok(())
    }
}
