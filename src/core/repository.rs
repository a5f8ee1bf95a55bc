//! Key-value backed account repository
//!
//! Maps account ids to persisted balance records and implements the atomic
//! primitives the transfer protocol needs on top of the raw store:
//! counter-based id generation and the conditional multi-account commit.
//!
//! # Record layout
//!
//! - `unique_ids` / `author` — the ledger-wide id counter, incremented
//!   atomically per creation
//! - `account:<id>` / `balance` — one record per account, the balance kept
//!   as a decimal string so repeated fractional updates round-trip exactly
//!   (store-native float increments lose precision and are never used)

use std::str::FromStr;
use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::debug;

use super::traits::AccountRepository;
use crate::store::{CommitOutcome, FieldWrite, KeyValueStore, WatchSet};
use crate::types::{Account, AccountId, BalanceUpdate, StoreError, TransferError};

/// Key of the record holding the ledger-wide id counter
const KEY_UNIQUE_IDS: &str = "unique_ids";
/// Field of the id counter within the `unique_ids` record
const FIELD_AUTHOR: &str = "author";
/// Field holding an account's balance
const FIELD_BALANCE: &str = "balance";

/// Build the record key for an account id
fn account_key(id: AccountId) -> String {
    format!("account:{id}")
}

/// Account repository over any [`KeyValueStore`]
pub struct KvAccountRepository<S> {
    /// The backing store, shared with whoever else holds it
    store: Arc<S>,
}

impl<S> KvAccountRepository<S> {
    /// Create a repository over the given store
    pub fn new(store: Arc<S>) -> Self {
        KvAccountRepository { store }
    }
}

impl<S: KeyValueStore> KvAccountRepository<S> {
    /// Parse a persisted balance string back into a `Decimal`
    fn parse_balance(id: AccountId, raw: &str) -> Result<Decimal, TransferError> {
        Decimal::from_str(raw).map_err(|_| {
            TransferError::Store(StoreError::CorruptValue {
                key: account_key(id),
                field: FIELD_BALANCE.to_string(),
                value: raw.to_string(),
            })
        })
    }
}

impl<S: KeyValueStore> AccountRepository for KvAccountRepository<S> {
    fn create(&self, initial_balance: Decimal) -> Result<Account, TransferError> {
        let id = self.store.increment(KEY_UNIQUE_IDS, FIELD_AUTHOR)?;
        self.store.set_field(
            &account_key(id),
            FIELD_BALANCE,
            &initial_balance.to_string(),
        )?;

        let account = Account::new(id, initial_balance);
        debug!(?account, "created account");

        Ok(account)
    }

    fn find_by_id(&self, id: AccountId) -> Result<Account, TransferError> {
        let raw = self
            .store
            .get_field(&account_key(id), FIELD_BALANCE)?
            .ok_or_else(|| TransferError::account_not_found(id))?;

        let account = Account::new(id, Self::parse_balance(id, &raw)?);
        debug!(?account, "found account");

        Ok(account)
    }

    fn watch(&self, ids: &[AccountId]) -> Result<WatchSet, TransferError> {
        let keys: Vec<String> = ids.iter().map(|id| account_key(*id)).collect();

        Ok(self.store.watch(&keys)?)
    }

    fn commit_if_unchanged(
        &self,
        updates: &[BalanceUpdate],
        watch: &WatchSet,
    ) -> Result<bool, TransferError> {
        let writes: Vec<FieldWrite> = updates
            .iter()
            .map(|update| {
                FieldWrite::new(
                    account_key(update.id),
                    FIELD_BALANCE,
                    update.new_balance.to_string(),
                )
            })
            .collect();

        let outcome = self.store.commit_if_unchanged(watch, &writes)?;
        debug!(?updates, ?outcome, "conditional commit");

        Ok(outcome == CommitOutcome::Committed)
    }
}
