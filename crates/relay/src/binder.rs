//! Context binding for relayed listeners.
//!
//! A listener subscribed *from* schema A to schema B runs with A's model as
//! its context, even though B emitted the event. A may not be live when it
//! subscribes, so the binder keeps a weak reference to A and reads A's
//! registration slot on every invocation. If A is still not live (or gone)
//! the listener runs with `None`.

use std::sync::Arc;

use listento_events::{Listener, ListenerKey};

use crate::args::EventArgs;
use crate::model::Model;
use crate::schema::{Schema, WeakSchema};

/// Listener as written by users of the relay.
pub type RelayListener = Arc<dyn Fn(Option<&Model>, &EventArgs) + Send + Sync>;

/// Wrap a closure as a [`RelayListener`].
///
/// Keep the returned `Arc` to remove the subscription later with
/// `stop_listening`.
pub fn listener(f: impl Fn(Option<&Model>, &EventArgs) + Send + Sync + 'static) -> RelayListener {
    Arc::new(f)
}

/// Bind `listener` to `subscriber`'s model, resolved at invocation time.
///
/// The channel registration carries the key of `listener` itself, so it can
/// be found again from the original `Arc`.
pub fn bind(subscriber: &Schema, listener: RelayListener) -> Listener<EventArgs> {
    let key = ListenerKey::of(&listener);
    let binder = ContextBinder {
        subscriber: subscriber.downgrade(),
    };
    Listener::derived(
        key,
        Arc::new(move |args: &EventArgs| {
            let context = binder.context();
            listener(context.as_ref(), args)
        }),
    )
}

struct ContextBinder {
    subscriber: WeakSchema,
}

impl ContextBinder {
    fn context(&self) -> Option<Model> {
        self.subscriber.upgrade().and_then(|schema| schema.model())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use crate::registry::Registry;
    use crate::schema::SchemaDefinition;

    #[test]
    fn context_is_read_when_the_listener_fires() {
        let registry = Registry::in_memory();
        let subscriber = registry.schema(SchemaDefinition::new()).unwrap();

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let original = listener(move |ctx, _| {
            sink.lock().unwrap().push(ctx.map(|m| m.name().to_string()));
        });
        let bound = bind(&subscriber, Arc::clone(&original));
        assert_eq!(bound.key(), ListenerKey::of(&original));

        bound.invoke(&EventArgs::new());
        registry.model("Student", &subscriber).unwrap();
        bound.invoke(&EventArgs::new());

        assert_eq!(*seen.lock().unwrap(), vec![None, Some("Student".to_string())]);
    }

    #[test]
    fn dropped_subscriber_yields_no_context() {
        let registry = Registry::in_memory();
        let subscriber = registry.schema(SchemaDefinition::new()).unwrap();
        let seen = Arc::new(Mutex::new(None));
        let sink = Arc::clone(&seen);
        let bound = bind(
            &subscriber,
            listener(move |ctx, _| *sink.lock().unwrap() = Some(ctx.is_some())),
        );

        drop(subscriber);
        bound.invoke(&EventArgs::new());
        assert_eq!(*seen.lock().unwrap(), Some(false));
    }
}
