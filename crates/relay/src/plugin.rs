use std::sync::Arc;

use crate::emitter::LifecycleEmitter;
use crate::schema::Schema;
use crate::tracker::ChangeTracker;

/// Install the relay's lifecycle hooks on a freshly defined schema.
///
/// The tracker must run before any user pre-save hook can observe the
/// document, and the emitter is the first post-save hook.
pub(crate) fn install(schema: &Schema) {
    schema
        .add_hook(Arc::new(ChangeTracker))
        .add_hook(Arc::new(LifecycleEmitter));
}
