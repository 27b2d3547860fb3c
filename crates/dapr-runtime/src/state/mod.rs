//! # Transactional State
//!
//! Durable entity state read and written through a session-scoped cache and
//! committed as one etag-checked state store transaction.

pub mod cache;
pub mod entity;
pub mod transaction;
pub mod transactional;

pub use cache::{CacheLookup, EntityCache};
pub use entity::{EntityDescriptor, FieldDescriptor, StateStoreDescriptor, TransactionalEntity};
pub use transaction::Transaction;
pub use transactional::TransactionalState;
