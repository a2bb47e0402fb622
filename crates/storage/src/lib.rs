//! Storage layer for Folio
//!
//! This crate provides the durable key-value origins a page persists into
//! and the reactive [`PersistedValue`] binding over a single slot.
//!
//! An origin is shared by every execution context (browser tab) attached to
//! it. Each context sees the same entries and is notified of writes made by
//! the *other* contexts, which is how cross-tab propagation is modeled.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod hub;

pub mod area;
pub mod kv;
pub mod persisted;

pub use area::{MemoryStorage, MemoryStorageConfig, StorageContext};
pub use kv::{KvConfig, KvError, SledContext, SledStorage};
pub use persisted::{JsonSerializer, PersistError, PersistedValue, Serializer};
