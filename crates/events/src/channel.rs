//! Event channel capability (mechanics only).
//!
//! A channel maps event names to ordered listener lists. It is the primitive
//! every schema owns exactly one of; relaying, context binding and lifecycle
//! emission are built on top of it.
//!
//! ## Delivery
//!
//! - **Synchronous**: `emit` runs every listener before it returns
//! - **Ordered**: listeners for one event run in registration order
//! - **Reentrant**: a listener may emit, subscribe or unsubscribe on the same
//!   channel while it is being dispatched (depth-first)
//! - **In-process only**: nothing is persisted or sent across processes

use std::sync::Arc;

use crate::listener::{Listener, ListenerId, ListenerKey};

/// Per-schema event channel.
///
/// `A` is the argument type passed to every listener on emission.
///
/// ## Removal
///
/// Registrations can be removed three ways:
/// - by [`ListenerKey`], the identity of the original callback (first match)
/// - by [`ListenerId`], the token returned from `on`/`once`
/// - in bulk, for one event or for every event
///
/// None of the removal operations fail; a miss is reported as `false`/`0`.
pub trait EventChannel<A>: Send + Sync {
    /// Register a persistent listener for `event`.
    fn on(&self, event: &str, listener: Listener<A>) -> ListenerId;

    /// Register a listener that is dropped before its first invocation.
    fn once(&self, event: &str, listener: Listener<A>) -> ListenerId;

    /// Invoke every listener registered for `event`. Returns how many ran.
    fn emit(&self, event: &str, args: &A) -> usize;

    /// Remove the first registration for `event` derived from `key`.
    fn remove_listener(&self, event: &str, key: ListenerKey) -> bool;

    /// Remove the registration with token `id` for `event`.
    fn remove_by_id(&self, event: &str, id: ListenerId) -> bool;

    /// Remove every listener for `event`, or for all events when `None`.
    /// Returns how many registrations were dropped.
    fn remove_all_listeners(&self, event: Option<&str>) -> usize;

    fn listener_count(&self, event: &str) -> usize;

    /// Names of events that currently have at least one listener.
    fn event_names(&self) -> Vec<String>;
}

impl<A, C> EventChannel<A> for Arc<C>
where
    C: EventChannel<A> + ?Sized,
{
    fn on(&self, event: &str, listener: Listener<A>) -> ListenerId {
        (**self).on(event, listener)
    }

    fn once(&self, event: &str, listener: Listener<A>) -> ListenerId {
        (**self).once(event, listener)
    }

    fn emit(&self, event: &str, args: &A) -> usize {
        (**self).emit(event, args)
    }

    fn remove_listener(&self, event: &str, key: ListenerKey) -> bool {
        (**self).remove_listener(event, key)
    }

    fn remove_by_id(&self, event: &str, id: ListenerId) -> bool {
        (**self).remove_by_id(event, id)
    }

    fn remove_all_listeners(&self, event: Option<&str>) -> usize {
        (**self).remove_all_listeners(event)
    }

    fn listener_count(&self, event: &str) -> usize {
        (**self).listener_count(event)
    }

    fn event_names(&self) -> Vec<String> {
        (**self).event_names()
    }
}
