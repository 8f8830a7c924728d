//! Infrastructure layer: the storage collaborator behind the HTTP handlers.

pub mod store;

pub use store::{AccountStore, InMemoryStore, PostStore, StoreError, StoreResult};
