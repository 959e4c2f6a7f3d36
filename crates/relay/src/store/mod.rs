//! Document persistence boundary.
//!
//! The relay only needs a handful of row operations from the persistence
//! layer; this module defines them without making storage assumptions.

pub mod in_memory;
pub mod r#trait;

pub use in_memory::InMemoryDocumentStore;
pub use r#trait::{DocumentStore, StoreError, StoredDocument};
