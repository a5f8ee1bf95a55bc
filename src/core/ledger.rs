//! Transfer protocol and business-rule validation
//!
//! This module provides `LedgerService`, which owns the business invariants
//! (non-negative balances, distinct accounts) and orchestrates the
//! optimistic read-compute-commit-retry cycle over an [`AccountRepository`].
//!
//! # Concurrency
//!
//! There is no lock manager and no serialization point. Transfers that
//! share no account proceed fully independently; transfers racing over the
//! same account are serialized by the store's conditional commit — at most
//! one racer commits per round, the losers re-read and recompute. Lost
//! commits are invisible to callers: they are retried internally with
//! exponential backoff, and only an exhausted retry cap surfaces as
//! [`TransferError::Contention`].

use std::sync::Arc;
use std::time::Duration;

use rust_decimal::Decimal;
use tracing::debug;

use super::traits::AccountRepository;
use crate::types::{AccountId, BalanceUpdate, TransferError};

/// Retry behavior for conflicted conditional commits
///
/// The backoff doubles after every lost race, bounding the work a transfer
/// can burn under sustained contention instead of spinning forever.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Commit attempts before giving up with `Contention`
    pub max_attempts: u32,
    /// Sleep after the first lost commit; doubles per further loss
    pub initial_backoff: Duration,
    /// Ceiling the doubling backoff never exceeds
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_attempts: 10,
            initial_backoff: Duration::from_millis(1),
            max_backoff: Duration::from_millis(100),
        }
    }
}

/// Validates transfer preconditions and runs the optimistic transfer loop
pub struct LedgerService<R> {
    /// The persistence seam; shared with the transport layer
    repository: Arc<R>,
    /// Conflict retry behavior
    retry: RetryPolicy,
}

impl<R> LedgerService<R> {
    /// Create a ledger service with the default retry policy
    pub fn new(repository: Arc<R>) -> Self {
        Self::with_retry_policy(repository, RetryPolicy::default())
    }

    /// Create a ledger service with an explicit retry policy
    ///
    /// A transfer always gets at least one commit attempt; a zero
    /// `max_attempts` is raised to one.
    pub fn with_retry_policy(repository: Arc<R>, retry: RetryPolicy) -> Self {
        let retry = RetryPolicy {
            max_attempts: retry.max_attempts.max(1),
            ..retry
        };

        LedgerService { repository, retry }
    }
}

impl<R: AccountRepository> LedgerService<R> {
    /// Create a new account seeded with the given balance
    ///
    /// Setup/testing affordance: the seed balance is not sign-validated,
    /// matching the asymmetry of the reference system (only the transfer
    /// path enforces business rules).
    pub fn create_account(&self, initial_balance: Decimal) -> Result<AccountId, TransferError> {
        Ok(self.repository.create(initial_balance)?.id)
    }

    /// Current balance of an account
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` if the account does not exist.
    pub fn balance(&self, id: AccountId) -> Result<Decimal, TransferError> {
        Ok(self.repository.find_by_id(id)?.balance)
    }

    /// Move `sum` from one account to another, atomically
    ///
    /// Guarantees on success: the sum of the two balances is conserved, the
    /// source balance stays non-negative, and no observer ever sees one
    /// side applied without the other.
    ///
    /// # Errors
    ///
    /// - `InvalidAmount` — `sum` is negative (checked before any store access)
    /// - `SameAccount` — `from == to` (checked before any store access)
    /// - `AccountNotFound` — either account is missing; nothing was written
    /// - `NotEnoughFunds` — the debit would go negative; nothing was written
    /// - `Contention` — every commit attempt lost its race
    pub async fn transfer(
        &self,
        sum: Decimal,
        from: AccountId,
        to: AccountId,
    ) -> Result<(), TransferError> {
        if sum < Decimal::ZERO {
            return Err(TransferError::invalid_amount(sum, from, to));
        }
        if from == to {
            return Err(TransferError::same_account(from));
        }

        let mut backoff = self.retry.initial_backoff;

        for attempt in 1..=self.retry.max_attempts {
            // The watch opens before the reads it protects, so any write
            // landing on either account from here on is detected at commit.
            let watch = self.repository.watch(&[from, to])?;

            // Fixed read order (from, then to) keeps behavior deterministic
            // for auditing; the commit is optimistic, so there is no lock
            // ordering to worry about.
            let from_account = self.repository.find_by_id(from)?;
            let to_account = self.repository.find_by_id(to)?;

            let new_from = from_account
                .balance
                .checked_sub(sum)
                .ok_or_else(|| TransferError::arithmetic_overflow("debit", from))?;
            let new_to = to_account
                .balance
                .checked_add(sum)
                .ok_or_else(|| TransferError::arithmetic_overflow("credit", to))?;

            if new_from < Decimal::ZERO {
                return Err(TransferError::not_enough_funds(
                    from,
                    to,
                    from_account.balance,
                    sum,
                    new_from,
                ));
            }

            let accepted = self.repository.commit_if_unchanged(
                &[
                    BalanceUpdate::new(from, new_from),
                    BalanceUpdate::new(to, new_to),
                ],
                &watch,
            )?;

            if accepted {
                return Ok(());
            }

            debug!(attempt, from, to, "commit lost its race, retrying");

            if attempt < self.retry.max_attempts {
                tokio::time::sleep(backoff).await;
                backoff = backoff.saturating_mul(2).min(self.retry.max_backoff);
            }
        }

        Err(TransferError::contention(
            from,
            to,
            self.retry.max_attempts,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::repository::KvAccountRepository;
    use crate::store::{MemoryStore, WatchSet};
    use crate::types::Account;
    use rstest::rstest;
    use rust_decimal::Decimal;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn ledger() -> LedgerService<KvAccountRepository<MemoryStore>> {
        LedgerService::new(Arc::new(KvAccountRepository::new(Arc::new(
            MemoryStore::new(),
        ))))
    }

    #[tokio::test]
    async fn test_transfer_moves_funds_and_conserves_sum() {
        let ledger = ledger();
        let a = ledger.create_account(Decimal::TEN).unwrap();
        let b = ledger.create_account(Decimal::TEN).unwrap();

        ledger.transfer(Decimal::new(250, 2), a, b).await.unwrap();

        assert_eq!(ledger.balance(a).unwrap(), Decimal::new(750, 2));
        assert_eq!(ledger.balance(b).unwrap(), Decimal::new(1250, 2));
        assert_eq!(
            ledger.balance(a).unwrap() + ledger.balance(b).unwrap(),
            Decimal::from(20)
        );
    }

    #[tokio::test]
    async fn test_transfer_of_entire_balance_leaves_zero() {
        let ledger = ledger();
        let a = ledger.create_account(Decimal::TEN).unwrap();
        let b = ledger.create_account(Decimal::ZERO).unwrap();

        ledger.transfer(Decimal::TEN, a, b).await.unwrap();

        assert_eq!(ledger.balance(a).unwrap(), Decimal::ZERO);
        assert_eq!(ledger.balance(b).unwrap(), Decimal::TEN);
    }

    #[tokio::test]
    async fn test_zero_sum_transfer_is_allowed() {
        let ledger = ledger();
        let a = ledger.create_account(Decimal::TEN).unwrap();
        let b = ledger.create_account(Decimal::TEN).unwrap();

        ledger.transfer(Decimal::ZERO, a, b).await.unwrap();

        assert_eq!(ledger.balance(a).unwrap(), Decimal::TEN);
        assert_eq!(ledger.balance(b).unwrap(), Decimal::TEN);
    }

    #[tokio::test]
    async fn test_negative_sum_is_rejected_without_store_access() {
        let ledger = ledger();

        // Accounts 1 and 2 don't even exist; validation fires first
        let result = ledger.transfer(Decimal::from(-1), 1, 2).await;

        assert_eq!(
            result,
            Err(TransferError::invalid_amount(Decimal::from(-1), 1, 2))
        );
    }

    #[tokio::test]
    async fn test_same_account_is_rejected() {
        let ledger = ledger();

        let result = ledger.transfer(Decimal::ONE, 5, 5).await;

        assert_eq!(result, Err(TransferError::same_account(5)));
    }

    #[rstest]
    #[case::missing_source(999, 1)]
    #[case::missing_destination(1, 999)]
    #[tokio::test]
    async fn test_missing_account_aborts_with_no_side_effects(
        #[case] from_id: AccountId,
        #[case] to_id: AccountId,
    ) {
        let ledger = ledger();
        let existing = ledger.create_account(Decimal::TEN).unwrap();
        assert_eq!(existing, 1);

        let result = ledger.transfer(Decimal::TEN, from_id, to_id).await;

        assert_eq!(result, Err(TransferError::account_not_found(999)));
        assert_eq!(ledger.balance(existing).unwrap(), Decimal::TEN);
    }

    #[tokio::test]
    async fn test_overdraft_reports_balances_and_writes_nothing() {
        let ledger = ledger();
        let a = ledger.create_account(Decimal::ONE).unwrap();
        let b = ledger.create_account(Decimal::TEN).unwrap();

        let result = ledger.transfer(Decimal::TEN, a, b).await;

        assert_eq!(
            result,
            Err(TransferError::not_enough_funds(
                a,
                b,
                Decimal::ONE,
                Decimal::TEN,
                Decimal::from(-9)
            ))
        );
        assert_eq!(ledger.balance(a).unwrap(), Decimal::ONE);
        assert_eq!(ledger.balance(b).unwrap(), Decimal::TEN);
    }

    #[tokio::test]
    async fn test_balance_read_is_idempotent() {
        let ledger = ledger();
        let a = ledger.create_account(Decimal::new(1234, 2)).unwrap();

        assert_eq!(ledger.balance(a).unwrap(), ledger.balance(a).unwrap());
    }

    /// Repository double whose conditional commits always lose
    struct AlwaysConflicting {
        inner: KvAccountRepository<MemoryStore>,
        attempts: AtomicU32,
    }

    impl AccountRepository for AlwaysConflicting {
        fn create(&self, initial_balance: Decimal) -> Result<Account, TransferError> {
            self.inner.create(initial_balance)
        }

        fn find_by_id(&self, id: AccountId) -> Result<Account, TransferError> {
            self.inner.find_by_id(id)
        }

        fn watch(&self, ids: &[AccountId]) -> Result<WatchSet, TransferError> {
            self.inner.watch(ids)
        }

        fn commit_if_unchanged(
            &self,
            _updates: &[BalanceUpdate],
            _watch: &WatchSet,
        ) -> Result<bool, TransferError> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            Ok(false)
        }
    }

    #[tokio::test]
    async fn test_exhausted_retries_surface_as_contention() {
        let repository = Arc::new(AlwaysConflicting {
            inner: KvAccountRepository::new(Arc::new(MemoryStore::new())),
            attempts: AtomicU32::new(0),
        });
        let policy = RetryPolicy {
            max_attempts: 4,
            initial_backoff: Duration::ZERO,
            max_backoff: Duration::ZERO,
        };
        let ledger = LedgerService::with_retry_policy(Arc::clone(&repository), policy);

        let a = ledger.create_account(Decimal::TEN).unwrap();
        let b = ledger.create_account(Decimal::TEN).unwrap();

        let result = ledger.transfer(Decimal::ONE, a, b).await;

        assert_eq!(result, Err(TransferError::contention(a, b, 4)));
        assert_eq!(repository.attempts.load(Ordering::SeqCst), 4);
        // Nothing was ever applied
        assert_eq!(ledger.balance(a).unwrap(), Decimal::TEN);
        assert_eq!(ledger.balance(b).unwrap(), Decimal::TEN);
    }

    #[tokio::test]
    async fn test_zero_attempt_policy_is_raised_to_one() {
        let repository = Arc::new(AlwaysConflicting {
            inner: KvAccountRepository::new(Arc::new(MemoryStore::new())),
            attempts: AtomicU32::new(0),
        });
        let policy = RetryPolicy {
            max_attempts: 0,
            initial_backoff: Duration::ZERO,
            max_backoff: Duration::ZERO,
        };
        let ledger = LedgerService::with_retry_policy(Arc::clone(&repository), policy);

        let a = ledger.create_account(Decimal::TEN).unwrap();
        let b = ledger.create_account(Decimal::TEN).unwrap();

        let result = ledger.transfer(Decimal::ONE, a, b).await;

        // The commit was genuinely tried once before contention was reported
        assert_eq!(result, Err(TransferError::contention(a, b, 1)));
        assert_eq!(repository.attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_single_conflict_is_invisible_to_the_caller() {
        /// Loses the first race, then delegates to the real repository
        struct ConflictsOnce {
            inner: KvAccountRepository<MemoryStore>,
            remaining_conflicts: AtomicU32,
        }

        impl AccountRepository for ConflictsOnce {
            fn create(&self, initial_balance: Decimal) -> Result<Account, TransferError> {
                self.inner.create(initial_balance)
            }

            fn find_by_id(&self, id: AccountId) -> Result<Account, TransferError> {
                self.inner.find_by_id(id)
            }

            fn watch(&self, ids: &[AccountId]) -> Result<WatchSet, TransferError> {
                self.inner.watch(ids)
            }

            fn commit_if_unchanged(
                &self,
                updates: &[BalanceUpdate],
                watch: &WatchSet,
            ) -> Result<bool, TransferError> {
                if self
                    .remaining_conflicts
                    .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                    .is_ok()
                {
                    return Ok(false);
                }
                self.inner.commit_if_unchanged(updates, watch)
            }
        }

        let repository = Arc::new(ConflictsOnce {
            inner: KvAccountRepository::new(Arc::new(MemoryStore::new())),
            remaining_conflicts: AtomicU32::new(1),
        });
        let policy = RetryPolicy {
            max_attempts: 10,
            initial_backoff: Duration::ZERO,
            max_backoff: Duration::ZERO,
        };
        let ledger = LedgerService::with_retry_policy(repository, policy);

        let a = ledger.create_account(Decimal::TEN).unwrap();
        let b = ledger.create_account(Decimal::ZERO).unwrap();

        // The lost first round is retried internally and never reported
        ledger.transfer(Decimal::ONE, a, b).await.unwrap();

        assert_eq!(ledger.balance(a).unwrap(), Decimal::from(9));
        assert_eq!(ledger.balance(b).unwrap(), Decimal::ONE);
    }
}
