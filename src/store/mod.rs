//! Key-value store module
//!
//! The substrate the ledger runs on: a trait for the store primitives
//! (point read, atomic increment, optimistic watch + conditional commit)
//! and an in-process implementation.
//!
//! # Components
//!
//! - `kv` - The `KeyValueStore` trait and protocol value types
//! - `memory` - `MemoryStore`, a DashMap-backed versioned implementation

pub mod kv;
pub mod memory;

pub use kv::{CommitOutcome, FieldWrite, KeyValueStore, WatchSet};
pub use memory::MemoryStore;
