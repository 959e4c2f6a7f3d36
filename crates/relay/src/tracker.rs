//! Pre-save change tracking.

use std::collections::BTreeMap;

use tracing::trace;

use listento_core::Entity;

use crate::document::Document;
use crate::hooks::{HookError, LifecycleHook};

/// Snapshots which declared fields of an existing document differ from their
/// persisted values, right before the store write.
///
/// New documents are only flagged `was_new`; diffing them is meaningless.
#[derive(Debug, Default, Clone, Copy)]
pub struct ChangeTracker;

impl LifecycleHook for ChangeTracker {
    fn pre_save(&self, document: &mut Document) -> Result<(), HookError> {
        if document.is_new() {
            document.mark_was_new();
            trace!(model = document.model_name(), id = %document.id(), "tracking new document");
            return Ok(());
        }

        let tracked: BTreeMap<String, bool> = document
            .schema()
            .fields()
            .iter()
            .map(|field| (field.clone(), document.is_modified(field)))
            .collect();
        trace!(
            model = document.model_name(),
            id = %document.id(),
            ?tracked,
            "tracked modifications"
        );
        document.track(tracked);
        Ok(())
    }
}
