//! Cross-schema event relay.
//!
//! Every schema owns an event channel. This crate lets one schema subscribe
//! to another's channel by handle or by model name (even before that model
//! is registered), runs relayed listeners with the *subscriber's* model as
//! context, and turns saves and removals into the semantic events `add`,
//! `change`, `change:<field>` and `remove`.
//!
//! ```text
//! Model::save ─► ChangeTracker (pre) ─► DocumentStore ─► LifecycleEmitter (post)
//!                                                              │ emit
//!                                                              ▼
//!                     target schema channel ─► bound listener(subscriber model, args)
//! ```

pub mod args;
pub mod binder;
pub mod document;
pub mod emitter;
pub mod hooks;
pub mod model;
mod plugin;
pub mod registry;
pub mod relay;
pub mod resolver;
pub mod schema;
pub mod store;
pub mod tracker;


pub use args::EventArgs;
pub use binder::{RelayListener, bind, listener};
pub use document::Document;
pub use emitter::LifecycleEmitter;
pub use hooks::{HookError, LifecycleHook};
pub use model::{Model, PersistError};
pub use registry::Registry;
pub use relay::Subscription;
pub use resolver::TargetRef;
pub use schema::{Schema, SchemaDefinition};
pub use store::{DocumentStore, InMemoryDocumentStore, StoreError, StoredDocument};
pub use tracker::ChangeTracker;
