//! Per-schema event channels.
//!
//! The channel primitive ([`EventChannel`], [`InMemoryChannel`]), listener
//! identities used for removal, and the lifecycle event vocabulary.

pub mod channel;
pub mod in_memory_channel;
pub mod lifecycle;
pub mod listener;

pub use channel::EventChannel;
pub use in_memory_channel::InMemoryChannel;
pub use lifecycle::LifecycleEvent;
pub use listener::{Callback, Listener, ListenerId, ListenerKey};
