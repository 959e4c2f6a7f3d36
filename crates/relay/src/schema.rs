//! Schemas: the owners of event channels.
//!
//! A schema goes through two phases:
//!
//! 1. **defined** (`Registry::schema`): fields, channel and hooks exist; other
//!    schemas can already subscribe to its channel by reference
//! 2. **live** (`Registry::model`): the registration slot holds the model
//!    handle, which becomes the execution context of listeners this schema
//!    subscribed elsewhere
//!
//! The channel is created in phase 1 and never replaced, so listeners
//! registered before the transition keep firing after it.

use std::collections::HashSet;
use std::sync::{Arc, OnceLock, PoisonError, RwLock, Weak};

use tracing::debug;

use listento_core::{DomainError, DomainResult, SchemaId};
use listento_events::EventChannel;

use crate::args::EventArgs;
use crate::hooks::LifecycleHook;
use crate::model::{Model, ModelInner};
use crate::registry::{Registry, RegistryInner};

/// Ordered field declarations of a schema.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaDefinition {
    fields: Vec<String>,
}

impl SchemaDefinition {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, name: impl Into<String>) -> Self {
        self.fields.push(name.into());
        self
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn validate(&self) -> DomainResult<()> {
        let mut seen = HashSet::new();
        for field in &self.fields {
            if field.trim().is_empty() {
                return Err(DomainError::validation("field names must not be empty"));
            }
            if !seen.insert(field.as_str()) {
                return Err(DomainError::validation(format!(
                    "field '{field}' declared twice"
                )));
            }
        }
        Ok(())
    }
}

impl<S: Into<String>> FromIterator<S> for SchemaDefinition {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().map(Into::into).collect(),
        }
    }
}

pub(crate) struct SchemaInner {
    id: SchemaId,
    fields: Vec<String>,
    channel: Arc<dyn EventChannel<EventArgs>>,
    hooks: RwLock<Vec<Arc<dyn LifecycleHook>>>,
    model: OnceLock<Weak<ModelInner>>,
    registry: Weak<RegistryInner>,
}

/// Handle to a schema. Clones share the same channel, hooks and slot.
#[derive(Clone)]
pub struct Schema {
    inner: Arc<SchemaInner>,
}

/// Non-owning schema reference held by bound listeners.
#[derive(Clone)]
pub(crate) struct WeakSchema(Weak<SchemaInner>);

impl WeakSchema {
    pub(crate) fn upgrade(&self) -> Option<Schema> {
        self.0.upgrade().map(|inner| Schema { inner })
    }
}

impl Schema {
    pub(crate) fn new(
        definition: SchemaDefinition,
        channel: Arc<dyn EventChannel<EventArgs>>,
        registry: Weak<RegistryInner>,
    ) -> Self {
        Self {
            inner: Arc::new(SchemaInner {
                id: SchemaId::new(),
                fields: definition.fields,
                channel,
                hooks: RwLock::new(Vec::new()),
                model: OnceLock::new(),
                registry,
            }),
        }
    }

    pub fn id(&self) -> SchemaId {
        self.inner.id
    }

    /// Declared fields in declaration order.
    pub fn fields(&self) -> &[String] {
        &self.inner.fields
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.inner.fields.iter().any(|f| f == field)
    }

    pub fn channel(&self) -> &dyn EventChannel<EventArgs> {
        self.inner.channel.as_ref()
    }

    /// Emit `event` on this schema's channel. Returns how many listeners ran.
    pub fn emit(&self, event: &str, args: &EventArgs) -> usize {
        let ran = self.inner.channel.emit(event, args);
        debug!(schema = %self.id(), event, listeners = ran, "event emitted");
        ran
    }

    /// Append a hook; hooks run in the order they were added.
    pub fn add_hook(&self, hook: Arc<dyn LifecycleHook>) -> &Self {
        self.inner
            .hooks
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(hook);
        self
    }

    pub(crate) fn hooks(&self) -> Vec<Arc<dyn LifecycleHook>> {
        self.inner
            .hooks
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Model handle from the registration slot, once the schema is live.
    pub fn model(&self) -> Option<Model> {
        self.inner
            .model
            .get()
            .and_then(Weak::upgrade)
            .map(Model::from_inner)
    }

    pub fn is_live(&self) -> bool {
        self.inner.model.get().is_some()
    }

    /// Name the schema was registered under, once live.
    pub fn name(&self) -> Option<String> {
        self.model().map(|m| m.name().to_string())
    }

    /// Fill the registration slot. Succeeds exactly once per schema.
    pub(crate) fn attach_model(&self, model: &Model) -> DomainResult<()> {
        self.inner.model.set(model.downgrade()).map_err(|_| {
            DomainError::conflict(format!(
                "schema {} is already registered as a model",
                self.id()
            ))
        })
    }

    pub(crate) fn registry(&self) -> Option<Registry> {
        self.inner.registry.upgrade().map(Registry::from_inner)
    }

    pub(crate) fn defined_by(&self, registry: &Registry) -> bool {
        registry.is_inner(&self.inner.registry)
    }

    pub(crate) fn downgrade(&self) -> WeakSchema {
        WeakSchema(Arc::downgrade(&self.inner))
    }

    pub fn ptr_eq(&self, other: &Schema) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl PartialEq for Schema {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for Schema {}

impl core::fmt::Debug for Schema {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Schema")
            .field("id", &self.inner.id)
            .field("fields", &self.inner.fields)
            .field("name", &self.name())
            .finish_non_exhaustive()
    }
}
