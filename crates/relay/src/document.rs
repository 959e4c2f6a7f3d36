//! Entity instances.
//!
//! A [`Document`] holds the current field values of one record, the snapshot
//! last written to the store, and the transient state the change tracker
//! hands to the lifecycle emitter within one save:
//!
//! - `was_new`: set by the tracker when a never-persisted document is saved,
//!   cleared by the emitter when it emits `add`
//! - tracked modifications: `field -> changed` for every declared field of an
//!   existing document, captured before the write and discarded after the
//!   emitter used it

use std::collections::BTreeMap;

use serde_json::{Map, Value as JsonValue};

use listento_core::{DomainError, DomainResult, Entity, EntityId};

use crate::schema::Schema;
use crate::store::StoredDocument;

#[derive(Clone)]
pub struct Document {
    id: EntityId,
    schema: Schema,
    model: String,
    values: Map<String, JsonValue>,
    persisted: Option<Map<String, JsonValue>>,
    was_new: bool,
    modified: Option<BTreeMap<String, bool>>,
}

impl Document {
    /// Fresh, never-persisted document with every declared field set to null.
    pub(crate) fn new(schema: Schema, model: impl Into<String>) -> Self {
        let values = schema
            .fields()
            .iter()
            .map(|f| (f.clone(), JsonValue::Null))
            .collect();
        Self {
            id: EntityId::new(),
            schema,
            model: model.into(),
            values,
            persisted: None,
            was_new: false,
            modified: None,
        }
    }

    /// Existing document rebuilt from a store row.
    pub(crate) fn hydrate(schema: Schema, row: StoredDocument) -> Self {
        Self {
            id: row.id,
            schema,
            model: row.collection,
            persisted: Some(row.values.clone()),
            values: row.values,
            was_new: false,
            modified: None,
        }
    }

    pub fn model_name(&self) -> &str {
        &self.model
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn get(&self, field: &str) -> Option<&JsonValue> {
        self.values.get(field)
    }

    pub fn values(&self) -> &Map<String, JsonValue> {
        &self.values
    }

    /// Set a declared field. Undeclared fields are rejected.
    pub fn set(&mut self, field: &str, value: impl Into<JsonValue>) -> DomainResult<()> {
        if !self.schema.has_field(field) {
            return Err(DomainError::unknown_field(&self.model, field));
        }
        self.values.insert(field.to_string(), value.into());
        Ok(())
    }

    /// Whether `field` differs from the last persisted value.
    ///
    /// On a never-persisted document every non-null field counts as modified.
    pub fn is_modified(&self, field: &str) -> bool {
        let current = self.values.get(field);
        match &self.persisted {
            Some(persisted) => current != persisted.get(field),
            None => current.is_some_and(|v| !v.is_null()),
        }
    }

    /// Modified fields in schema declaration order.
    pub fn modified_fields(&self) -> Vec<&str> {
        self.schema
            .fields()
            .iter()
            .map(String::as_str)
            .filter(|f| self.is_modified(f))
            .collect()
    }

    /// Set between the pre-save and post-save hooks of a first save.
    pub fn was_new(&self) -> bool {
        self.was_new
    }

    /// True iff the tracked modifications exist and at least one field changed.
    pub fn was_modified(&self) -> bool {
        self.modified
            .as_ref()
            .is_some_and(|tracked| tracked.values().any(|changed| *changed))
    }

    /// Tracked flag for `field`; `false` when nothing is tracked.
    pub fn was_field_modified(&self, field: &str) -> bool {
        self.modified
            .as_ref()
            .and_then(|tracked| tracked.get(field))
            .copied()
            .unwrap_or(false)
    }

    pub(crate) fn mark_was_new(&mut self) {
        self.was_new = true;
    }

    pub(crate) fn take_was_new(&mut self) -> bool {
        std::mem::take(&mut self.was_new)
    }

    pub(crate) fn track(&mut self, tracked: BTreeMap<String, bool>) {
        self.modified = Some(tracked);
    }

    pub(crate) fn clear_tracked(&mut self) {
        self.modified = None;
    }

    /// Drop all transient tracking state (used when a save does not commit).
    pub(crate) fn reset_tracking(&mut self) {
        self.was_new = false;
        self.modified = None;
    }

    pub(crate) fn mark_persisted(&mut self) {
        self.persisted = Some(self.values.clone());
    }

    pub(crate) fn to_stored(&self) -> StoredDocument {
        StoredDocument {
            id: self.id,
            collection: self.model.clone(),
            revision: 0,
            values: self.values.clone(),
        }
    }
}

impl Entity for Document {
    type Id = EntityId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn is_new(&self) -> bool {
        self.persisted.is_none()
    }
}

impl PartialEq for Document {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.model == other.model && self.values == other.values
    }
}

impl core::fmt::Debug for Document {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Document")
            .field("id", &self.id)
            .field("model", &self.model)
            .field("values", &self.values)
            .field("is_new", &self.is_new())
            .finish()
    }
}
