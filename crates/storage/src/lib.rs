//! Storage abstraction and implementations for Fluency.
//!
//! This crate provides a trait-based persistence interface for learner
//! progression stats, with a JSON file reference implementation, an
//! in-memory store, a read-through cache and an optional SQLite backend.

#![warn(missing_docs)]

pub mod trait_;
pub mod json_storage;
pub mod memory;
pub mod cached;

#[cfg(feature = "sqlite")]
pub mod sqlite_storage;

pub use trait_::{Storage, StorageError, Result};
pub use json_storage::JsonStorage;
pub use memory::MemoryStorage;
pub use cached::CachedStorage;

#[cfg(feature = "sqlite")]
pub use sqlite_storage::SqliteStorage;
