use std::collections::HashMap;
use std::sync::RwLock;

use listento_core::EntityId;

use super::r#trait::{DocumentStore, StoreError, StoredDocument};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct RowKey {
    collection: String,
    id: EntityId,
}

/// In-memory document store.
///
/// Intended for tests/dev. Not optimized for performance.
#[derive(Debug, Default)]
pub struct InMemoryDocumentStore {
    rows: RwLock<HashMap<RowKey, StoredDocument>>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DocumentStore for InMemoryDocumentStore {
    fn upsert(&self, mut document: StoredDocument) -> Result<u64, StoreError> {
        let key = RowKey {
            collection: document.collection.clone(),
            id: document.id,
        };

        let mut rows = self.rows.write().map_err(|_| StoreError::Poisoned)?;
        let revision = rows.get(&key).map(|r| r.revision).unwrap_or(0) + 1;
        document.revision = revision;
        rows.insert(key, document);
        Ok(revision)
    }

    fn delete(&self, collection: &str, id: EntityId) -> Result<bool, StoreError> {
        let key = RowKey {
            collection: collection.to_string(),
            id,
        };

        let mut rows = self.rows.write().map_err(|_| StoreError::Poisoned)?;
        Ok(rows.remove(&key).is_some())
    }

    fn load(&self, collection: &str, id: EntityId) -> Result<Option<StoredDocument>, StoreError> {
        let key = RowKey {
            collection: collection.to_string(),
            id,
        };

        let rows = self.rows.read().map_err(|_| StoreError::Poisoned)?;
        Ok(rows.get(&key).cloned())
    }

    fn count(&self, collection: &str) -> Result<usize, StoreError> {
        let rows = self.rows.read().map_err(|_| StoreError::Poisoned)?;
        Ok(rows.keys().filter(|k| k.collection == collection).count())
    }
}
