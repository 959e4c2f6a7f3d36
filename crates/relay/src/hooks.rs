//! Lifecycle hooks around persist/remove operations.
//!
//! Every schema keeps an ordered list of hooks. `Model::save` runs each
//! hook's `pre_save` before the store write and each `post_save` after a
//! successful one; `Model::remove` runs `post_remove` after a successful
//! delete. A failed store operation never reaches the post hooks.

use thiserror::Error;

use crate::document::Document;

/// A pre-save hook refused the save.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("save aborted by hook: {0}")]
pub struct HookError(pub String);

impl HookError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

/// Hook invoked by the persistence pipeline.
///
/// All methods default to no-ops so implementors only override the phases
/// they care about.
pub trait LifecycleHook: Send + Sync {
    /// Runs before the store write. Returning `Ok` continues the save; an
    /// error aborts it and is returned to the caller of `save`.
    fn pre_save(&self, _document: &mut Document) -> Result<(), HookError> {
        Ok(())
    }

    /// Runs after the store write committed.
    fn post_save(&self, _document: &mut Document) {}

    /// Runs after the document was deleted from the store.
    fn post_remove(&self, _document: &Document) {}
}
