//! Document-store port shared by every domain in this crate.
//!
//! Domains never talk to DynamoDB directly: they receive a
//! `&dyn DocumentStore` and address documents by collection path and id,
//! the same way the mobile app addressed its cloud collections.

pub mod dynamo;
pub mod memory;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;
use thiserror::Error;

pub use dynamo::DynamoDocumentStore;
pub use memory::InMemoryDocumentStore;

/// A stored document: field name to JSON value.
pub type Document = Map<String, Value>;

/// Result type for document store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Collection paths used by the application.
pub mod collections {
    pub const EMPLOYEES: &str = "empleados";
    pub const USERS: &str = "users";

    /// Tasks live under the owning user's namespace.
    pub fn user_tasks(uid: &str) -> String {
        format!("{USERS}/{uid}/tasks")
    }
}

/// How `set` treats fields already present on the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetMode {
    /// Replace the whole document.
    Overwrite,
    /// Upsert only the given fields, keeping the rest.
    Merge,
}

/// Persistence contract for collection/document storage.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Stores a new document under a generated id and returns that id.
    async fn add(&self, collection: &str, doc: Document) -> StoreResult<String>;

    /// Writes a document under a caller-chosen id.
    async fn set(&self, collection: &str, id: &str, doc: Document, mode: SetMode)
        -> StoreResult<()>;

    /// Merges fields into an existing document.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] when the document does not exist.
    async fn update(&self, collection: &str, id: &str, doc: Document) -> StoreResult<()>;

    /// Reads one document. `None` when it does not exist.
    async fn get(&self, collection: &str, id: &str) -> StoreResult<Option<Document>>;

    /// Reads every document of a collection with its id.
    async fn list(&self, collection: &str) -> StoreResult<Vec<(String, Document)>>;

    /// Removes a document. Deleting a missing document is not an error.
    async fn delete(&self, collection: &str, id: &str) -> StoreResult<()>;
}

/// Errors returned by document store implementations.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("document {collection}/{id} not found")]
    NotFound { collection: String, id: String },

    #[error("document serialization failed: {0}")]
    Serialization(String),

    /// Transport failure: the backend could not be reached.
    #[error("document store unreachable: {0}")]
    Unavailable(String),

    #[error("document store error: {0}")]
    Backend(Arc<dyn std::error::Error + Send + Sync>),
}

impl StoreError {
    pub fn backend(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Backend(Arc::new(err))
    }

    pub fn not_found(collection: &str, id: &str) -> Self {
        Self::NotFound {
            collection: collection.to_string(),
            id: id.to_string(),
        }
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Serializes a record into a document. The record must serialize to an object.
pub fn to_document<T: Serialize>(value: &T) -> StoreResult<Document> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => Err(StoreError::Serialization(format!(
            "expected an object, got {}",
            other
        ))),
    }
}

/// Deserializes a stored document into a record.
pub fn from_document<T: DeserializeOwned>(doc: Document) -> StoreResult<T> {
    Ok(serde_json::from_value(Value::Object(doc))?)
}
