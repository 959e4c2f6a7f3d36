//! In-memory event channel.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::trace;

use crate::channel::EventChannel;
use crate::listener::{Listener, ListenerId, ListenerKey};

struct Registration<A> {
    listener: Listener<A>,
    once: bool,
}

/// In-memory event channel.
///
/// - No IO / no async
/// - Listeners run outside the lock, so dispatch is reentrant
/// - A panicking listener never poisons the registry for other callers
pub struct InMemoryChannel<A> {
    events: Mutex<BTreeMap<String, Vec<Registration<A>>>>,
}

impl<A> InMemoryChannel<A> {
    pub fn new() -> Self {
        Self::default()
    }

    fn events(&self) -> MutexGuard<'_, BTreeMap<String, Vec<Registration<A>>>> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn register(&self, event: &str, listener: Listener<A>, once: bool) -> ListenerId {
        let id = listener.id();
        self.events()
            .entry(event.to_string())
            .or_default()
            .push(Registration { listener, once });
        trace!(event, %id, once, "listener registered");
        id
    }

    fn remove_first(&self, event: &str, matches: impl Fn(&Listener<A>) -> bool) -> bool {
        let mut events = self.events();
        let Some(regs) = events.get_mut(event) else {
            return false;
        };
        let Some(pos) = regs.iter().position(|r| matches(&r.listener)) else {
            return false;
        };
        regs.remove(pos);
        if regs.is_empty() {
            events.remove(event);
        }
        true
    }
}

impl<A> Default for InMemoryChannel<A> {
    fn default() -> Self {
        Self {
            events: Mutex::new(BTreeMap::new()),
        }
    }
}

impl<A> core::fmt::Debug for InMemoryChannel<A> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let events = self.events();
        let counts: BTreeMap<&str, usize> =
            events.iter().map(|(k, v)| (k.as_str(), v.len())).collect();
        f.debug_struct("InMemoryChannel")
            .field("listeners", &counts)
            .finish()
    }
}

impl<A> EventChannel<A> for InMemoryChannel<A> {
    fn on(&self, event: &str, listener: Listener<A>) -> ListenerId {
        self.register(event, listener, false)
    }

    fn once(&self, event: &str, listener: Listener<A>) -> ListenerId {
        self.register(event, listener, true)
    }

    fn emit(&self, event: &str, args: &A) -> usize {
        let due: Vec<Listener<A>> = {
            let mut events = self.events();
            let Some(regs) = events.get_mut(event) else {
                trace!(event, "emitted without listeners");
                return 0;
            };
            let due = regs.iter().map(|r| r.listener.clone()).collect();
            // Single-fire registrations leave before anything runs.
            regs.retain(|r| !r.once);
            if regs.is_empty() {
                events.remove(event);
            }
            due
        };

        trace!(event, listeners = due.len(), "emitting");
        for listener in &due {
            listener.invoke(args);
        }
        due.len()
    }

    fn remove_listener(&self, event: &str, key: ListenerKey) -> bool {
        self.remove_first(event, |l| l.key() == key)
    }

    fn remove_by_id(&self, event: &str, id: ListenerId) -> bool {
        self.remove_first(event, |l| l.id() == id)
    }

    fn remove_all_listeners(&self, event: Option<&str>) -> usize {
        let mut events = self.events();
        match event {
            Some(event) => events.remove(event).map(|regs| regs.len()).unwrap_or(0),
            None => {
                let dropped = events.values().map(Vec::len).sum();
                events.clear();
                dropped
            }
        }
    }

    fn listener_count(&self, event: &str) -> usize {
        self.events().get(event).map(Vec::len).unwrap_or(0)
    }

    fn event_names(&self) -> Vec<String> {
        self.events().keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex as StdMutex};

    use crate::listener::Callback;

    fn recorder() -> (Arc<StdMutex<Vec<String>>>, impl Fn(&'static str) -> Listener<u32>) {
        let log = Arc::new(StdMutex::new(Vec::new()));
        let sink = Arc::clone(&log);
        let make = move |tag: &'static str| {
            let sink = Arc::clone(&sink);
            Listener::from_fn(move |n: &u32| sink.lock().unwrap().push(format!("{tag}:{n}")))
        };
        (log, make)
    }

    #[test]
    fn emit_runs_listeners_in_registration_order() {
        let channel = InMemoryChannel::new();
        let (log, make) = recorder();
        channel.on("add", make("a"));
        channel.on("add", make("b"));
        channel.on("remove", make("c"));

        assert_eq!(channel.emit("add", &1), 2);
        assert_eq!(*log.lock().unwrap(), vec!["a:1", "b:1"]);
    }

    #[test]
    fn once_listener_fires_exactly_once() {
        let channel = InMemoryChannel::new();
        let (log, make) = recorder();
        channel.once("add", make("once"));
        channel.on("add", make("always"));

        channel.emit("add", &1);
        channel.emit("add", &2);

        assert_eq!(*log.lock().unwrap(), vec!["once:1", "always:1", "always:2"]);
        assert_eq!(channel.listener_count("add"), 1);
    }

    #[test]
    fn remove_listener_matches_original_key_only() {
        let channel = InMemoryChannel::new();
        let (log, make) = recorder();
        let sink = Arc::clone(&log);
        let original: Callback<u32> =
            Arc::new(move |n: &u32| sink.lock().unwrap().push(format!("removed:{n}")));
        let wrapper = {
            let inner = Arc::clone(&original);
            Listener::derived(ListenerKey::of(&original), Arc::new(move |n: &u32| inner(n)))
        };
        channel.on("add", wrapper);
        channel.on("add", make("kept"));

        assert!(channel.remove_listener("add", ListenerKey::of(&original)));
        assert!(!channel.remove_listener("add", ListenerKey::of(&original)));

        channel.emit("add", &7);
        assert_eq!(*log.lock().unwrap(), vec!["kept:7"]);
    }

    #[test]
    fn remove_by_id_targets_one_registration() {
        let channel = InMemoryChannel::new();
        let (log, make) = recorder();
        let listener = make("twice");
        let first = channel.on("add", listener.clone());
        // Re-registering the same listener reuses its id; removal drops the first.
        channel.on("add", listener);

        assert!(channel.remove_by_id("add", first));
        channel.emit("add", &3);
        assert_eq!(*log.lock().unwrap(), vec!["twice:3"]);
        assert!(!channel.remove_by_id("change", first));
    }

    #[test]
    fn remove_all_listeners_for_one_or_every_event() {
        let channel = InMemoryChannel::new();
        let (_log, make) = recorder();
        channel.on("add", make("a"));
        channel.on("add", make("b"));
        channel.on("change", make("c"));
        channel.on("remove", make("d"));

        assert_eq!(channel.remove_all_listeners(Some("add")), 2);
        assert_eq!(channel.event_names(), vec!["change", "remove"]);
        assert_eq!(channel.remove_all_listeners(None), 2);
        assert!(channel.event_names().is_empty());
        assert_eq!(channel.remove_all_listeners(Some("missing")), 0);
    }

    #[test]
    fn listeners_may_reenter_the_channel() {
        let channel = Arc::new(InMemoryChannel::<u32>::new());
        let (log, make) = recorder();
        channel.on("inner", make("inner"));

        let reentrant = Arc::clone(&channel);
        let late = make("late");
        channel.on(
            "outer",
            Listener::from_fn(move |n: &u32| {
                reentrant.emit("inner", &(n + 1));
                reentrant.on("outer", late.clone());
            }),
        );

        channel.emit("outer", &1);
        assert_eq!(*log.lock().unwrap(), vec!["inner:2"]);
        assert_eq!(channel.listener_count("outer"), 2);
    }

    #[test]
    fn emit_without_listeners_is_a_no_op() {
        let channel = InMemoryChannel::<u32>::new();
        assert_eq!(channel.emit("add", &1), 0);
    }
}
