//! Types module
//!
//! Contains core data structures used throughout the application.
//! This module organizes types into logical submodules:
//! - `account`: Account-related types
//! - `error`: Error types for the transfer engine

pub mod account;
pub mod error;

pub use account::{Account, AccountId, BalanceUpdate};
pub use error::{StoreError, TransferError};
