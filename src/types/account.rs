//! Account-related types for the transfer engine
//!
//! This module defines the Account structure and the staged balance update
//! used by the conditional multi-account commit.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Account identifier
///
/// Assigned once at creation by the ledger-wide atomic counter, never
/// changed and never reused.
pub type AccountId = u64;

/// A ledger account
///
/// The id is immutable after creation; the balance is the only mutable
/// field and is only ever mutated through the optimistic transfer commit.
/// `Decimal` keeps balances exact across repeated fractional updates —
/// floating-point accumulation is deliberately avoided everywhere.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// The account ID
    pub id: AccountId,

    /// Current balance
    ///
    /// Non-negative for every account mutated exclusively through the
    /// transfer path. Direct creation is a setup affordance and does not
    /// validate the seed balance.
    pub balance: Decimal,
}

impl Account {
    /// Create an account value with the given id and balance
    pub fn new(id: AccountId, balance: Decimal) -> Self {
        Account { id, balance }
    }
}

/// One staged balance write inside a conditional commit
///
/// A transfer stages two of these (debit side and credit side); the store
/// applies them as a single indivisible unit or not at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalanceUpdate {
    /// The account whose balance is replaced
    pub id: AccountId,

    /// The balance to write if no watched account changed
    pub new_balance: Decimal,
}

impl BalanceUpdate {
    /// Create a staged balance write
    pub fn new(id: AccountId, new_balance: Decimal) -> Self {
        BalanceUpdate { id, new_balance }
    }
}
