//! Post-save and post-remove event emission.
//!
//! Reads what [`ChangeTracker`](crate::tracker::ChangeTracker) recorded and
//! emits on the document's own schema channel:
//!
//! - first save: `add(doc)`
//! - existing, some field changed: `change(doc)`, then `change:<f>(doc, value)`
//!   for each changed field in declaration order
//! - existing, nothing changed: nothing
//! - removed: `remove(doc)`

use serde_json::Value as JsonValue;
use tracing::trace;

use listento_core::Entity;
use listento_events::LifecycleEvent;

use crate::args::EventArgs;
use crate::document::Document;
use crate::hooks::LifecycleHook;

#[derive(Debug, Default, Clone, Copy)]
pub struct LifecycleEmitter;

impl LifecycleHook for LifecycleEmitter {
    fn post_save(&self, document: &mut Document) {
        if document.take_was_new() {
            let schema = document.schema().clone();
            schema.emit(&LifecycleEvent::Add.name(), &EventArgs::for_document(document.clone()));
            return;
        }

        if !document.was_modified() {
            document.clear_tracked();
            return;
        }

        let changed: Vec<String> = document
            .schema()
            .fields()
            .iter()
            .filter(|field| document.was_field_modified(field))
            .cloned()
            .collect();
        // Listeners see the committed state, without tracking.
        document.clear_tracked();
        let snapshot = document.clone();
        let schema = snapshot.schema().clone();
        trace!(model = snapshot.model_name(), id = %snapshot.id(), ?changed, "emitting change");

        schema.emit(
            &LifecycleEvent::Change.name(),
            &EventArgs::for_document(snapshot.clone()),
        );
        for field in &changed {
            let value = snapshot.get(field).cloned().unwrap_or(JsonValue::Null);
            schema.emit(
                &LifecycleEvent::FieldChange(field).name(),
                &EventArgs::for_document(snapshot.clone()).with_value(value),
            );
        }
    }

    fn post_remove(&self, document: &Document) {
        document.schema().emit(
            &LifecycleEvent::Remove.name(),
            &EventArgs::for_document(document.clone()),
        );
    }
}
