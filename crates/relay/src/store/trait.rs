use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use thiserror::Error;

use listento_core::EntityId;

/// A persisted document row.
///
/// `revision` is assigned by the store: 1 on first write, +1 on every
/// subsequent write of the same row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredDocument {
    pub id: EntityId,
    pub collection: String,
    pub revision: u64,
    pub values: Map<String, JsonValue>,
}

/// Document store operation error.
///
/// These are infrastructure errors; they reach the caller of `save`/`remove`
/// unchanged inside `PersistError::Store`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("store lock poisoned")]
    Poisoned,

    #[error("backend failure: {0}")]
    Backend(String),
}

/// Collection-scoped document store.
///
/// This is the persistence boundary the relay sits on. Implementations must
/// make `upsert` and `delete` atomic per row: either the write is visible
/// afterwards or an error is returned.
pub trait DocumentStore: Send + Sync {
    /// Insert or replace a row. Returns the row's new revision.
    fn upsert(&self, document: StoredDocument) -> Result<u64, StoreError>;

    /// Delete a row. Returns whether a row existed.
    fn delete(&self, collection: &str, id: EntityId) -> Result<bool, StoreError>;

    fn load(&self, collection: &str, id: EntityId) -> Result<Option<StoredDocument>, StoreError>;

    fn count(&self, collection: &str) -> Result<usize, StoreError>;
}

impl<S> DocumentStore for Arc<S>
where
    S: DocumentStore + ?Sized,
{
    fn upsert(&self, document: StoredDocument) -> Result<u64, StoreError> {
        (**self).upsert(document)
    }

    fn delete(&self, collection: &str, id: EntityId) -> Result<bool, StoreError> {
        (**self).delete(collection, id)
    }

    fn load(&self, collection: &str, id: EntityId) -> Result<Option<StoredDocument>, StoreError> {
        (**self).load(collection, id)
    }

    fn count(&self, collection: &str) -> Result<usize, StoreError> {
        (**self).count(collection)
    }
}
