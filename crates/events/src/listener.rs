//! Listener registrations and their identities.
//!
//! A registration carries two identities:
//!
//! - [`ListenerId`]: unique per registration, handed out as a token so the
//!   registration can be removed exactly.
//! - [`ListenerKey`]: identity of the *original* callback a registration was
//!   derived from. Wrapping layers (context binding, once-wrappers) keep the
//!   key of the callback they wrap, so callers holding only the original can
//!   still find the registration.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Shared callback invoked on emission.
pub type Callback<A> = Arc<dyn Fn(&A) + Send + Sync>;

/// Unique token of one registration.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

impl ListenerId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(&self) -> u64 {
        self.0
    }
}

impl core::fmt::Display for ListenerId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "listener#{}", self.0)
    }
}

/// Identity of an original callback, derived from its `Arc` allocation.
///
/// Two keys are equal iff they were taken from clones of the same `Arc`.
/// A key stays meaningful only while that allocation is alive; registrations
/// hold the original callback, which keeps it alive while they exist.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct ListenerKey(usize);

impl ListenerKey {
    pub fn of<T: ?Sized>(callback: &Arc<T>) -> Self {
        Self(Arc::as_ptr(callback).cast::<()>() as usize)
    }
}

/// A callback ready to be registered on a channel.
pub struct Listener<A> {
    id: ListenerId,
    key: ListenerKey,
    callback: Callback<A>,
}

impl<A> Listener<A> {
    /// Listener whose key is the identity of `callback` itself.
    pub fn new(callback: Callback<A>) -> Self {
        let key = ListenerKey::of(&callback);
        Self {
            id: ListenerId::next(),
            key,
            callback,
        }
    }

    pub fn from_fn(f: impl Fn(&A) + Send + Sync + 'static) -> Self {
        Self::new(Arc::new(f))
    }

    /// Listener wrapping another callback, identified by that callback's key.
    pub fn derived(key: ListenerKey, callback: Callback<A>) -> Self {
        Self {
            id: ListenerId::next(),
            key,
            callback,
        }
    }

    pub fn id(&self) -> ListenerId {
        self.id
    }

    pub fn key(&self) -> ListenerKey {
        self.key
    }

    pub fn invoke(&self, args: &A) {
        (self.callback)(args)
    }
}

impl<A> Clone for Listener<A> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            key: self.key,
            callback: Arc::clone(&self.callback),
        }
    }
}

impl<A> core::fmt::Debug for Listener<A> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Listener")
            .field("id", &self.id)
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn key_follows_the_original_allocation() {
        let original: Arc<dyn Fn(&u32) + Send + Sync> = Arc::new(|_: &u32| {});
        let clone = Arc::clone(&original);
        let other: Arc<dyn Fn(&u32) + Send + Sync> = Arc::new(|_: &u32| {});

        assert_eq!(ListenerKey::of(&original), ListenerKey::of(&clone));
        assert_ne!(ListenerKey::of(&original), ListenerKey::of(&other));
    }

    #[test]
    fn derived_listener_keeps_wrapped_key_but_gets_own_id() {
        let original: Callback<u32> = Arc::new(|_: &u32| {});
        let direct = Listener::new(Arc::clone(&original));
        let wrapped = Listener::derived(ListenerKey::of(&original), Arc::new(|_: &u32| {}));

        assert_eq!(direct.key(), wrapped.key());
        assert_ne!(direct.id(), wrapped.id());
        assert!(wrapped.id().get() > direct.id().get());
        assert_eq!(wrapped.id().to_string(), format!("listener#{}", wrapped.id().get()));
    }

    #[test]
    fn invoke_forwards_arguments() {
        let seen = Arc::new(AtomicUsize::new(0));
        let sink = Arc::clone(&seen);
        let listener = Listener::from_fn(move |n: &usize| {
            sink.fetch_add(*n, Ordering::SeqCst);
        });

        listener.invoke(&3);
        listener.clone().invoke(&4);
        assert_eq!(seen.load(Ordering::SeqCst), 7);
    }
}
