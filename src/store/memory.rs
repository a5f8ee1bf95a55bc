//! In-process key-value store
//!
//! This module provides `MemoryStore`, a thread-safe implementation of the
//! [`KeyValueStore`] trait backed by a `DashMap` of versioned records.
//!
//! # Design
//!
//! Every record carries a version counter bumped on each mutation. A watch
//! snapshots versions; a conditional commit re-checks them and applies its
//! writes only if none moved, which turns the store's single-key atomicity
//! into a multi-key compare-and-swap.
//!
//! # Thread Safety
//!
//! Point reads and single-key writes take a shared commit latch and rely on
//! `DashMap`'s per-entry locking, so unrelated keys never contend. A
//! conditional commit takes the latch exclusively: while it verifies and
//! applies its writes, no other operation can observe the records, so a
//! reader never sees a multi-key commit half-applied.

use std::collections::HashMap;
use std::sync::RwLock;

use dashmap::DashMap;

use super::kv::{CommitOutcome, FieldWrite, KeyValueStore, WatchSet};
use crate::types::StoreError;

/// A record: a field map plus the version used for conflict detection
#[derive(Debug, Default)]
struct Record {
    /// Bumped on every mutation of this record
    version: u64,
    /// Field name to raw value
    fields: HashMap<String, String>,
}

/// Thread-safe in-process store with versioned conditional commits
///
/// Suitable as the backing store for tests and single-node deployments;
/// anything ACID-capable or optimistic-MVCC slots in behind the same trait.
#[derive(Debug, Default)]
pub struct MemoryStore {
    /// Concurrent map of record keys to versioned field maps
    records: DashMap<String, Record>,
    /// Shared by reads and single-key writes, exclusive for commits
    latch: RwLock<()>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get_field(&self, key: &str, field: &str) -> Result<Option<String>, StoreError> {
        let _shared = self.latch.read().map_err(|_| StoreError::LatchPoisoned)?;

        Ok(self
            .records
            .get(key)
            .and_then(|record| record.fields.get(field).cloned()))
    }

    fn set_field(&self, key: &str, field: &str, value: &str) -> Result<(), StoreError> {
        let _shared = self.latch.read().map_err(|_| StoreError::LatchPoisoned)?;

        let mut record = self.records.entry(key.to_string()).or_default();
        record.version += 1;
        record.fields.insert(field.to_string(), value.to_string());

        Ok(())
    }

    fn increment(&self, key: &str, field: &str) -> Result<u64, StoreError> {
        let _shared = self.latch.read().map_err(|_| StoreError::LatchPoisoned)?;

        // The entry guard serializes concurrent increments of the same key,
        // so the read-add-write below is a single indivisible step.
        let mut record = self.records.entry(key.to_string()).or_default();

        let current = match record.fields.get(field) {
            Some(raw) => raw
                .parse::<u64>()
                .map_err(|_| StoreError::CorruptValue {
                    key: key.to_string(),
                    field: field.to_string(),
                    value: raw.clone(),
                })?,
            None => 0,
        };

        let next = current + 1;
        record.version += 1;
        record.fields.insert(field.to_string(), next.to_string());

        Ok(next)
    }

    fn watch(&self, keys: &[String]) -> Result<WatchSet, StoreError> {
        let _shared = self.latch.read().map_err(|_| StoreError::LatchPoisoned)?;

        let entries = keys
            .iter()
            .map(|key| {
                let version = self.records.get(key).map(|record| record.version);
                (key.clone(), version)
            })
            .collect();

        Ok(WatchSet { entries })
    }

    fn commit_if_unchanged(
        &self,
        watch: &WatchSet,
        writes: &[FieldWrite],
    ) -> Result<CommitOutcome, StoreError> {
        let _exclusive = self.latch.write().map_err(|_| StoreError::LatchPoisoned)?;

        for (key, watched_version) in &watch.entries {
            let current_version = self.records.get(key.as_str()).map(|record| record.version);
            if current_version != *watched_version {
                return Ok(CommitOutcome::Conflict);
            }
        }

        for write in writes {
            let mut record = self.records.entry(write.key.clone()).or_default();
            record.version += 1;
            record
                .fields
                .insert(write.field.clone(), write.value.clone());
        }

        Ok(CommitOutcome::Committed)
    }
}
