//! Schema definition and model registration.
//!
//! The registry is where schemas are defined and where they become live. It
//! also owns subscriptions that target a model name nobody has registered
//! yet: those wait here and move onto the schema's channel, in subscription
//! order, when `model(name, schema)` makes it live. Name lookup and deferral
//! share one lock with registration, so a subscription can never slip
//! between "name not found" and "model registered".

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use tracing::{debug, info};

use listento_core::{DomainError, DomainResult};
use listento_events::{EventChannel, InMemoryChannel, Listener, ListenerId};

use crate::args::EventArgs;
use crate::model::Model;
use crate::plugin;
use crate::relay::Removal;
use crate::schema::{Schema, SchemaDefinition};
use crate::store::{DocumentStore, InMemoryDocumentStore};

pub(crate) struct PendingSubscription {
    pub(crate) event: String,
    pub(crate) listener: Listener<EventArgs>,
    pub(crate) once: bool,
}

#[derive(Default)]
struct RegistryState {
    models: BTreeMap<String, Model>,
    pending: HashMap<String, Vec<PendingSubscription>>,
}

pub(crate) struct RegistryInner {
    store: Arc<dyn DocumentStore>,
    state: Mutex<RegistryState>,
}

/// Registry of schemas and the models they are live as.
#[derive(Clone)]
pub struct Registry {
    inner: Arc<RegistryInner>,
}

fn attach(
    channel: &dyn EventChannel<EventArgs>,
    event: &str,
    listener: Listener<EventArgs>,
    once: bool,
) -> ListenerId {
    if once {
        channel.once(event, listener)
    } else {
        channel.on(event, listener)
    }
}

impl Registry {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            inner: Arc::new(RegistryInner {
                store,
                state: Mutex::new(RegistryState::default()),
            }),
        }
    }

    /// Registry backed by an [`InMemoryDocumentStore`].
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryDocumentStore::new()))
    }

    pub(crate) fn from_inner(inner: Arc<RegistryInner>) -> Self {
        Self { inner }
    }

    pub(crate) fn downgrade(&self) -> Weak<RegistryInner> {
        Arc::downgrade(&self.inner)
    }

    pub(crate) fn upgrade(inner: &Weak<RegistryInner>) -> Option<Self> {
        inner.upgrade().map(Self::from_inner)
    }

    pub(crate) fn is_inner(&self, other: &Weak<RegistryInner>) -> bool {
        std::ptr::eq(Arc::as_ptr(&self.inner), other.as_ptr())
    }

    fn state(&self) -> MutexGuard<'_, RegistryState> {
        self.inner.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Define a schema with its own in-memory channel.
    ///
    /// The relay hooks (change tracker, lifecycle emitter) are installed on
    /// the new schema before it is returned.
    pub fn schema(&self, definition: SchemaDefinition) -> DomainResult<Schema> {
        self.schema_with_channel(definition, Arc::new(InMemoryChannel::<EventArgs>::new()))
    }

    /// Define a schema on a caller-supplied channel.
    pub fn schema_with_channel(
        &self,
        definition: SchemaDefinition,
        channel: Arc<dyn EventChannel<EventArgs>>,
    ) -> DomainResult<Schema> {
        definition.validate()?;
        let schema = Schema::new(definition, channel, Arc::downgrade(&self.inner));
        plugin::install(&schema);
        debug!(schema = %schema.id(), fields = ?schema.fields(), "schema defined");
        Ok(schema)
    }

    /// Make `schema` live under `name`.
    ///
    /// Fills the schema's registration slot and moves every subscription
    /// waiting on `name` onto the schema's channel.
    pub fn model(&self, name: &str, schema: &Schema) -> DomainResult<Model> {
        if !schema.defined_by(self) {
            return Err(DomainError::validation(format!(
                "schema {} was defined by another registry",
                schema.id()
            )));
        }

        let mut state = self.state();
        if state.models.contains_key(name) {
            return Err(DomainError::conflict(format!(
                "model '{name}' is already registered"
            )));
        }

        let model = Model::new(name, schema.clone(), Arc::clone(&self.inner.store));
        schema.attach_model(&model)?;
        state.models.insert(name.to_string(), model.clone());

        let pending = state.pending.remove(name).unwrap_or_default();
        let flushed = pending.len();
        for p in pending {
            attach(schema.channel(), &p.event, p.listener, p.once);
        }
        drop(state);

        info!(model = name, schema = %schema.id(), flushed, "model registered");
        Ok(model)
    }

    /// Look up a live model by name.
    pub fn get(&self, name: &str) -> Option<Model> {
        self.state().models.get(name).cloned()
    }

    pub fn model_names(&self) -> Vec<String> {
        self.state().models.keys().cloned().collect()
    }

    /// Subscriptions still waiting for `name` to become live.
    pub fn pending_count(&self, name: &str) -> usize {
        self.state().pending.get(name).map(Vec::len).unwrap_or(0)
    }

    /// Register on the live model's channel, or park until `name` is live.
    pub(crate) fn register_or_defer(
        &self,
        name: &str,
        event: &str,
        listener: Listener<EventArgs>,
        once: bool,
    ) -> ListenerId {
        let mut state = self.state();
        if let Some(model) = state.models.get(name) {
            return attach(model.schema().channel(), event, listener, once);
        }

        let id = listener.id();
        state
            .pending
            .entry(name.to_string())
            .or_default()
            .push(PendingSubscription {
                event: event.to_string(),
                listener,
                once,
            });
        debug!(
            target_model = name,
            event,
            %id,
            "subscription deferred until model is registered"
        );
        id
    }

    /// Apply `removal` to whatever currently represents `name`: the live
    /// model's channel, or the parked subscriptions.
    pub(crate) fn remove_named(&self, name: &str, removal: &Removal<'_>) -> usize {
        let mut state = self.state();
        if let Some(model) = state.models.get(name) {
            return removal.apply(model.schema().channel());
        }

        let Some(pending) = state.pending.get_mut(name) else {
            return 0;
        };
        let removed = removal.apply_pending(pending);
        if pending.is_empty() {
            state.pending.remove(name);
        }
        removed
    }
}

impl core::fmt::Debug for Registry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let state = self.state();
        f.debug_struct("Registry")
            .field("models", &state.models.keys().collect::<Vec<_>>())
            .field("pending", &state.pending.keys().collect::<Vec<_>>())
            .finish()
    }
}
