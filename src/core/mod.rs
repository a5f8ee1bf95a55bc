//! Core business logic module
//!
//! This module contains the account ledger components:
//! - `traits` - The repository seam between logic and storage
//! - `repository` - Key-value backed account persistence
//! - `ledger` - Transfer validation and the optimistic retry protocol

pub mod ledger;
pub mod repository;
pub mod traits;

pub use ledger::{LedgerService, RetryPolicy};
pub use repository::KvAccountRepository;
pub use traits::AccountRepository;
