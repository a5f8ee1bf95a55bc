//! Key-value store abstraction
//!
//! This module defines the trait the ledger consumes from its backing
//! store, plus the small value types involved in the optimistic
//! watch-then-commit protocol. Implementations can be in-process (see
//! [`MemoryStore`](super::MemoryStore)) or back onto any store offering a
//! point read, an atomic increment, and a conditional multi-key write.
//!
//! # Optimistic protocol
//!
//! A caller that wants to mutate several records as a unit first calls
//! [`KeyValueStore::watch`] to capture the current version of every key it
//! depends on, then reads those records, computes the new values, and hands
//! the staged writes together with the watch set to
//! [`KeyValueStore::commit_if_unchanged`]. The store applies the writes
//! indivisibly iff none of the watched keys changed since the watch began;
//! otherwise it reports [`CommitOutcome::Conflict`] and applies nothing.
//! A conflict is a normal retry signal, not an error.

use crate::types::StoreError;

/// Versions of a set of records, captured when the watch began
///
/// A key that did not exist at watch time is recorded as `None`; a record
/// created afterwards therefore invalidates the watch just like a modified
/// one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchSet {
    /// Watched keys and the version each had at watch time
    pub entries: Vec<(String, Option<u64>)>,
}

/// One staged field write inside a conditional commit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldWrite {
    /// Record key
    pub key: String,
    /// Field name within the record
    pub field: String,
    /// Value to write
    pub value: String,
}

impl FieldWrite {
    /// Create a staged field write
    pub fn new(key: impl Into<String>, field: impl Into<String>, value: impl Into<String>) -> Self {
        FieldWrite {
            key: key.into(),
            field: field.into(),
            value: value.into(),
        }
    }
}

/// Result of a conditional multi-key write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    /// No watched key changed; all staged writes were applied as a unit
    Committed,
    /// A watched key changed since the watch began; nothing was applied
    Conflict,
}

/// The primitives the ledger consumes from its backing store
///
/// Records are field maps addressed by a string key, mirroring the hash
/// layout of the common key-value stores this trait abstracts over. All
/// methods are safe to call concurrently from many request-handling tasks.
pub trait KeyValueStore: Send + Sync {
    /// Point read of a named field, `None` if the record or field is absent
    fn get_field(&self, key: &str, field: &str) -> Result<Option<String>, StoreError>;

    /// Unconditional write of a named field, creating the record if needed
    fn set_field(&self, key: &str, field: &str, value: &str) -> Result<(), StoreError>;

    /// Atomically increment a numeric field and return the new value
    ///
    /// The increment-and-return is a single indivisible step: two
    /// concurrent callers always observe distinct results. An absent field
    /// starts from zero.
    fn increment(&self, key: &str, field: &str) -> Result<u64, StoreError>;

    /// Capture the current version of each key, opening an optimistic window
    fn watch(&self, keys: &[String]) -> Result<WatchSet, StoreError>;

    /// Apply `writes` as one unit iff no watched key changed since `watch`
    fn commit_if_unchanged(
        &self,
        watch: &WatchSet,
        writes: &[FieldWrite],
    ) -> Result<CommitOutcome, StoreError>;
}
