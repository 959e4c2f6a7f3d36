//! Inversion-of-control subscriptions between schemas.
//!
//! `a.listen_to(b, event, f)` registers `f` on *b's* channel, bound so that it
//! runs with *a's* model as context. Targets given by name that are not live
//! yet are parked in the registry and attached when they go live.
//!
//! Removal works by identity of the original listener `Arc` (what the caller
//! still holds), or exactly by [`Subscription`] token. A removal that matches
//! nothing is a no-op.

use std::sync::Weak;

use tracing::{debug, warn};

use listento_events::{EventChannel, Listener, ListenerId, ListenerKey};

use crate::args::EventArgs;
use crate::binder::{RelayListener, bind};
use crate::registry::{PendingSubscription, Registry, RegistryInner};
use crate::resolver::{Resolved, TargetRef};
use crate::schema::Schema;

/// What to take off a target.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Removal<'a> {
    /// First registration for `event` derived from the original listener.
    Key { event: &'a str, key: ListenerKey },
    /// The registration with this token.
    Id { event: &'a str, id: ListenerId },
    /// Everything for `event`, or everything when `None`.
    All { event: Option<&'a str> },
}

impl Removal<'_> {
    pub(crate) fn apply(&self, channel: &dyn EventChannel<EventArgs>) -> usize {
        match *self {
            Removal::Key { event, key } => usize::from(channel.remove_listener(event, key)),
            Removal::Id { event, id } => usize::from(channel.remove_by_id(event, id)),
            Removal::All { event } => channel.remove_all_listeners(event),
        }
    }

    pub(crate) fn apply_pending(&self, pending: &mut Vec<PendingSubscription>) -> usize {
        match *self {
            Removal::Key { event, key } => {
                remove_first(pending, |p| p.event == event && p.listener.key() == key)
            }
            Removal::Id { event, id } => {
                remove_first(pending, |p| p.event == event && p.listener.id() == id)
            }
            Removal::All { event } => {
                let before = pending.len();
                pending.retain(|p| event.is_some_and(|e| p.event != e));
                before - pending.len()
            }
        }
    }
}

fn remove_first(
    pending: &mut Vec<PendingSubscription>,
    matches: impl Fn(&PendingSubscription) -> bool,
) -> usize {
    match pending.iter().position(matches) {
        Some(pos) => {
            pending.remove(pos);
            1
        }
        None => 0,
    }
}

/// Token for one relayed registration.
///
/// Cancelling removes exactly that registration, wherever it currently lives
/// (the target's channel, or the registry while the target is not live).
#[derive(Debug, Clone)]
pub struct Subscription {
    registry: Weak<RegistryInner>,
    target: TargetRef,
    event: String,
    id: ListenerId,
}

impl Subscription {
    pub fn id(&self) -> ListenerId {
        self.id
    }

    pub fn event(&self) -> &str {
        &self.event
    }

    pub fn target(&self) -> &TargetRef {
        &self.target
    }

    /// Remove the registration. Returns `false` if it was already gone
    /// (cancelled, fired once, or removed in bulk).
    pub fn cancel(&self) -> bool {
        let removal = Removal::Id {
            event: &self.event,
            id: self.id,
        };
        let registry = Registry::upgrade(&self.registry);
        remove(&self.target, registry, &removal) > 0
    }
}

fn remove(target: &TargetRef, registry: Option<Registry>, removal: &Removal<'_>) -> usize {
    match target.resolve(registry) {
        Resolved::Schema(schema) => removal.apply(schema.channel()),
        Resolved::Named { registry, name } => registry.remove_named(&name, removal),
        Resolved::Detached(_) => 0,
    }
}

impl Schema {
    /// Run `listener` on every `event` of `target`, with this schema's model as
    /// context.
    pub fn listen_to(
        &self,
        target: impl Into<TargetRef>,
        event: &str,
        listener: RelayListener,
    ) -> &Self {
        self.relay(target.into(), event, listener, false);
        self
    }

    /// Like [`Schema::listen_to`], but the registration is dropped after its
    /// first delivery.
    pub fn listen_to_once(
        &self,
        target: impl Into<TargetRef>,
        event: &str,
        listener: RelayListener,
    ) -> &Self {
        self.relay(target.into(), event, listener, true);
        self
    }

    /// [`Schema::listen_to`] returning a cancellable token.
    pub fn subscribe(
        &self,
        target: impl Into<TargetRef>,
        event: &str,
        listener: RelayListener,
    ) -> Subscription {
        self.relay(target.into(), event, listener, false)
    }

    /// [`Schema::listen_to_once`] returning a cancellable token.
    pub fn subscribe_once(
        &self,
        target: impl Into<TargetRef>,
        event: &str,
        listener: RelayListener,
    ) -> Subscription {
        self.relay(target.into(), event, listener, true)
    }

    /// Stop relaying from `target`.
    ///
    /// With both `event` and `listener`, removes the first registration for
    /// `event` that was made from `listener` (same `Arc`). With anything less,
    /// removes every listener for `event`, or for all events when `event` is
    /// `None`, including listeners other schemas registered on the target.
    pub fn stop_listening(
        &self,
        target: impl Into<TargetRef>,
        event: Option<&str>,
        listener: Option<&RelayListener>,
    ) -> &Self {
        let target = target.into();
        let removal = match (event, listener) {
            (Some(event), Some(listener)) => Removal::Key {
                event,
                key: ListenerKey::of(listener),
            },
            (event, _) => Removal::All { event },
        };

        let removed = remove(&target, self.registry(), &removal);
        debug!(subscriber = %self.id(), %target, ?removal, removed, "stopped listening");
        self
    }

    fn relay(
        &self,
        target: TargetRef,
        event: &str,
        listener: RelayListener,
        once: bool,
    ) -> Subscription {
        let bound: Listener<EventArgs> = bind(self, listener);
        let registry = self.registry();
        let weak = registry.as_ref().map(Registry::downgrade).unwrap_or_default();
        let id = match target.resolve(registry) {
            Resolved::Schema(schema) => {
                if once {
                    schema.channel().once(event, bound)
                } else {
                    schema.channel().on(event, bound)
                }
            }
            Resolved::Named { registry, name } => {
                registry.register_or_defer(&name, event, bound, once)
            }
            Resolved::Detached(name) => {
                // Nothing can ever make this name live; the registration is inert.
                warn!(
                    subscriber = %self.id(),
                    target_model = %name,
                    event,
                    "registry dropped, subscription ignored"
                );
                bound.id()
            }
        };

        debug!(subscriber = %self.id(), %target, event, once, %id, "listening");
        Subscription {
            registry: weak,
            target,
            event: event.to_string(),
            id,
        }
    }
}
