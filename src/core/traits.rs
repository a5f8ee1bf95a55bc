//! Core trait for account persistence
//!
//! This module defines the seam between the transfer logic and durable
//! storage, so the ledger can run over any store implementation (and tests
//! can inject conflicting or failing doubles).

use rust_decimal::Decimal;

use crate::store::WatchSet;
use crate::types::{Account, AccountId, BalanceUpdate, TransferError};

/// Durable storage and atomic primitives for accounts
///
/// `commit_if_unchanged` is the sole mutation path for balances: two (or
/// more) account records updated as a single indivisible unit from the
/// point of view of any other reader. A rejected commit is not an error;
/// it is the normal signal to retry against freshly re-read state.
pub trait AccountRepository: Send + Sync {
    /// Persist a new account under a fresh, never-reused id
    ///
    /// The id comes from an atomic counter, so concurrent creators never
    /// collide. The initial balance is not sign-validated here; direct
    /// creation is a setup affordance, and validation belongs to the
    /// transfer path.
    fn create(&self, initial_balance: Decimal) -> Result<Account, TransferError>;

    /// Look up an account by id
    ///
    /// An absent balance field means "account does not exist", never
    /// "balance is zero".
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` if no balance is stored under the id.
    fn find_by_id(&self, id: AccountId) -> Result<Account, TransferError>;

    /// Open an optimistic window over the given accounts
    ///
    /// Must be called before the reads it protects: any write to a watched
    /// account after this point causes the eventual commit to be rejected.
    fn watch(&self, ids: &[AccountId]) -> Result<WatchSet, TransferError>;

    /// Attempt the staged balance writes as one indivisible unit
    ///
    /// Returns `true` if the store accepted the write (no watched account
    /// was modified since the watch began), `false` if it detected a
    /// concurrent modification and applied nothing.
    fn commit_if_unchanged(
        &self,
        updates: &[BalanceUpdate],
        watch: &WatchSet,
    ) -> Result<bool, TransferError>;
}
