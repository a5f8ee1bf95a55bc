//! Transfer Engine Library
//! # Overview
//!
//! This library provides atomic balance transfers between accounts held in
//! a shared key-value store, safe under concurrent access from many
//! callers, using only optimistic store primitives (atomic increment,
//! watch + conditional multi-key commit) — no lock manager.
//!
//! # Architecture
//!
//! The system is organized into several key components:
//!
//! - [`types`] - Core data types (Account, errors)
//! - [`store`] - The key-value substrate: trait plus in-process implementation
//! - [`core`] - Business logic components:
//!   - [`core::repository`] - Account persistence and atomic primitives
//!   - [`core::ledger`] - Transfer validation and the optimistic retry loop
//! - [`http`] - REST transport (routes, status mapping)
//! - [`cli`] - CLI argument parsing
//!
//! # Transfer guarantees
//!
//! - **Conservation**: a committed transfer never changes the sum of the
//!   two balances involved
//! - **Non-negativity**: no committed transfer drives a balance below zero
//! - **Atomicity**: no observer ever sees one side of a transfer applied
//!   without the other
//! - **No lost updates**: transfers racing over a shared account are
//!   serialized by the store's conditional commit; losers retry against
//!   freshly read state

// Module declarations
pub mod cli;
pub mod core;
pub mod http;
pub mod store;
pub mod types;

pub use core::{AccountRepository, KvAccountRepository, LedgerService, RetryPolicy};
pub use http::{build_router, AppState};
pub use store::{KeyValueStore, MemoryStore};
pub use types::{Account, AccountId, StoreError, TransferError};
