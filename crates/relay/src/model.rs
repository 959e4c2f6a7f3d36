//! Models and the persistence pipeline.
//!
//! A [`Model`] is the live handle of a registered schema. Saving and removing
//! documents goes through it so lifecycle hooks always wrap the store call:
//!
//! ```text
//! save(doc)
//!   ↓
//! 1. pre_save hooks (change tracker first)     -- an error aborts, nothing written
//!   ↓
//! 2. store.upsert                              -- an error aborts, no event
//!   ↓
//! 3. document marked persisted
//!   ↓
//! 4. post_save hooks (lifecycle emitter)       -- add / change / change:<field>
//!
//! remove(doc)
//!   ↓
//! 1. store.delete                              -- an error aborts, no event
//!   ↓
//! 2. post_remove hooks                         -- remove
//! ```
//!
//! Failed operations drop the document's transient tracking state so a retry
//! recomputes it from scratch.

use std::sync::{Arc, Weak};

use serde_json::Value as JsonValue;
use thiserror::Error;
use tracing::{debug, warn};

use listento_core::{DomainError, DomainResult, Entity, EntityId};

use crate::document::Document;
use crate::hooks::HookError;
use crate::schema::Schema;
use crate::store::{DocumentStore, StoreError};

/// Failure of a save/remove/find operation.
///
/// Store errors are passed through unchanged.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Hook(#[from] HookError),
}

pub(crate) struct ModelInner {
    name: String,
    schema: Schema,
    store: Arc<dyn DocumentStore>,
}

/// Live, queryable handle of a registered schema.
///
/// Clones are the same handle; equality is handle identity.
#[derive(Clone)]
pub struct Model {
    inner: Arc<ModelInner>,
}

impl Model {
    pub(crate) fn new(
        name: impl Into<String>,
        schema: Schema,
        store: Arc<dyn DocumentStore>,
    ) -> Self {
        Self {
            inner: Arc::new(ModelInner {
                name: name.into(),
                schema,
                store,
            }),
        }
    }

    pub(crate) fn from_inner(inner: Arc<ModelInner>) -> Self {
        Self { inner }
    }

    pub(crate) fn downgrade(&self) -> Weak<ModelInner> {
        Arc::downgrade(&self.inner)
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn schema(&self) -> &Schema {
        &self.inner.schema
    }

    /// Build a new, unsaved document from field/value pairs.
    pub fn create<I, K, V>(&self, values: I) -> DomainResult<Document>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<JsonValue>,
    {
        let mut document = Document::new(self.schema().clone(), self.name());
        for (field, value) in values {
            document.set(field.as_ref(), value)?;
        }
        Ok(document)
    }

    /// Persist `document`, running the schema's lifecycle hooks around the write.
    pub fn save(&self, document: &mut Document) -> Result<(), PersistError> {
        self.ensure_owned(document)?;
        let hooks = self.schema().hooks();

        for hook in &hooks {
            if let Err(err) = hook.pre_save(document) {
                warn!(
                    model = self.name(),
                    id = %document.id(),
                    error = %err,
                    "save aborted by pre-save hook"
                );
                document.reset_tracking();
                return Err(err.into());
            }
        }

        let revision = match self.inner.store.upsert(document.to_stored()) {
            Ok(revision) => revision,
            Err(err) => {
                warn!(model = self.name(), id = %document.id(), error = %err, "save failed");
                document.reset_tracking();
                return Err(err.into());
            }
        };
        document.mark_persisted();
        debug!(model = self.name(), id = %document.id(), revision, "document saved");

        for hook in &hooks {
            hook.post_save(document);
        }
        Ok(())
    }

    /// Delete `document` from the store, then run post-remove hooks.
    pub fn remove(&self, document: &Document) -> Result<(), PersistError> {
        self.ensure_owned(document)?;

        let existed = self
            .inner
            .store
            .delete(self.name(), *document.id())
            .inspect_err(|err| {
                warn!(model = self.name(), id = %document.id(), error = %err, "remove failed");
            })?;
        debug!(model = self.name(), id = %document.id(), existed, "document removed");

        for hook in self.schema().hooks() {
            hook.post_remove(document);
        }
        Ok(())
    }

    pub fn find_by_id(&self, id: EntityId) -> Result<Option<Document>, PersistError> {
        let row = self.inner.store.load(self.name(), id)?;
        Ok(row.map(|row| Document::hydrate(self.schema().clone(), row)))
    }

    /// Like [`Model::find_by_id`], but a missing document is an error.
    pub fn get(&self, id: EntityId) -> Result<Document, PersistError> {
        self.find_by_id(id)?
            .ok_or_else(|| DomainError::not_found(format!("{} {id}", self.name())).into())
    }

    pub fn count(&self) -> Result<usize, PersistError> {
        Ok(self.inner.store.count(self.name())?)
    }

    pub fn ptr_eq(&self, other: &Model) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    fn ensure_owned(&self, document: &Document) -> DomainResult<()> {
        if document.schema() == self.schema() && document.model_name() == self.name() {
            Ok(())
        } else {
            Err(DomainError::ForeignDocument {
                model: self.name().to_string(),
                document: document.model_name().to_string(),
            })
        }
    }
}

impl PartialEq for Model {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for Model {}

impl core::fmt::Debug for Model {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Model")
            .field("name", &self.inner.name)
            .field("schema", &self.inner.schema.id())
            .finish_non_exhaustive()
    }
}
