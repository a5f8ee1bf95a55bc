//! Error types for the transfer engine
//!
//! This module defines all error types that can occur while serving
//! transfers. Errors carry structured diagnostic fields (ids, amounts,
//! pre/post balances) so callers and tests branch on kind instead of
//! parsing messages.
//!
//! # Error Categories
//!
//! - **Validation errors**: negative sum, identical accounts
//! - **Referential errors**: account not found
//! - **Business-rule errors**: not enough funds
//! - **Contention**: the optimistic retry cap was exhausted
//! - **Infrastructure errors**: corrupt or unavailable backing store
//!
//! Optimistic commit rejections below the retry cap are *not* represented
//! here. They are an internal retry signal, fully recovered inside the
//! transfer loop and never observable by any caller.

use rust_decimal::Decimal;
use thiserror::Error;

use super::account::AccountId;

/// Errors surfaced by the backing key-value store
///
/// Distinct from the business taxonomy: these indicate infrastructure
/// trouble (corrupt persisted data, a broken store connection), not a
/// rejected request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// A persisted field could not be parsed back into its expected type
    #[error("Corrupt value for {key}/{field}: '{value}'")]
    CorruptValue {
        /// Record key
        key: String,
        /// Field name within the record
        field: String,
        /// The raw value that failed to parse
        value: String,
    },

    /// A store-internal lock was poisoned by a panicking writer
    #[error("Store latch poisoned")]
    LatchPoisoned,
}

/// Main error type for the transfer engine
///
/// The first four variants are terminal validation/business failures,
/// reported to the caller verbatim and never retried. `Contention` is the
/// deliberate hardening over the reference behavior: rather than retrying
/// a conflicted transfer forever, the loop gives up past a cap.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransferError {
    /// The transfer amount is negative
    #[error("Negative sum: {sum} (from: {from}, to: {to})")]
    InvalidAmount {
        /// The rejected amount
        sum: Decimal,
        /// Debit-side account ID
        from: AccountId,
        /// Credit-side account ID
        to: AccountId,
    },

    /// Source and destination are the same account
    #[error("From and to accounts are the same: {id}")]
    SameAccount {
        /// The account ID given for both sides
        id: AccountId,
    },

    /// No balance field is stored under the given account ID
    #[error("Account not found: {id}")]
    AccountNotFound {
        /// The missing account ID
        id: AccountId,
    },

    /// Debiting the transfer amount would drive the source balance negative
    ///
    /// Carries the pre-transfer balance, the attempted sum and the negative
    /// result for diagnostics. No write was attempted.
    #[error("Not enough money: ({balance} - {requested}) = {new_balance} (from: {from}, to: {to})")]
    NotEnoughFunds {
        /// Debit-side account ID
        from: AccountId,
        /// Credit-side account ID
        to: AccountId,
        /// Pre-transfer balance of the debit side
        balance: Decimal,
        /// The attempted transfer amount
        requested: Decimal,
        /// The negative balance the debit would have produced
        new_balance: Decimal,
    },

    /// Every optimistic commit attempt lost its race
    ///
    /// Reported only after the retry cap with exponential backoff has been
    /// exhausted under sustained contention on one of the two accounts.
    #[error("Transfer (from: {from}, to: {to}) lost {attempts} conditional commits in a row")]
    Contention {
        /// Debit-side account ID
        from: AccountId,
        /// Credit-side account ID
        to: AccountId,
        /// Number of commit attempts made
        attempts: u32,
    },

    /// Checked decimal arithmetic failed
    ///
    /// The transfer is rejected to keep account integrity. Not expected in
    /// practice given `Decimal`'s range.
    #[error("Arithmetic overflow in {operation} for account {id}")]
    ArithmeticOverflow {
        /// Operation that would overflow
        operation: String,
        /// Account ID involved
        id: AccountId,
    },

    /// The backing store failed
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

// Helper functions for creating common errors

impl TransferError {
    /// Create an InvalidAmount error
    pub fn invalid_amount(sum: Decimal, from: AccountId, to: AccountId) -> Self {
        TransferError::InvalidAmount { sum, from, to }
    }

    /// Create a SameAccount error
    pub fn same_account(id: AccountId) -> Self {
        TransferError::SameAccount { id }
    }

    /// Create an AccountNotFound error
    pub fn account_not_found(id: AccountId) -> Self {
        TransferError::AccountNotFound { id }
    }

    /// Create a NotEnoughFunds error
    pub fn not_enough_funds(
        from: AccountId,
        to: AccountId,
        balance: Decimal,
        requested: Decimal,
        new_balance: Decimal,
    ) -> Self {
        TransferError::NotEnoughFunds {
            from,
            to,
            balance,
            requested,
            new_balance,
        }
    }

    /// Create a Contention error
    pub fn contention(from: AccountId, to: AccountId, attempts: u32) -> Self {
        TransferError::Contention { from, to, attempts }
    }

    /// Create an ArithmeticOverflow error
    pub fn arithmetic_overflow(operation: &str, id: AccountId) -> Self {
        TransferError::ArithmeticOverflow {
            operation: operation.to_string(),
            id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal::Decimal;

    #[rstest]
    #[case::invalid_amount(
        TransferError::invalid_amount(Decimal::new(-100, 2), 1, 2),
        "Negative sum: -1.00 (from: 1, to: 2)"
    )]
    #[case::same_account(
        TransferError::same_account(5),
        "From and to accounts are the same: 5"
    )]
    #[case::account_not_found(
        TransferError::account_not_found(999),
        "Account not found: 999"
    )]
    #[case::not_enough_funds(
        TransferError::not_enough_funds(1, 2, Decimal::ONE, Decimal::TEN, Decimal::from(-9)),
        "Not enough money: (1 - 10) = -9 (from: 1, to: 2)"
    )]
    #[case::contention(
        TransferError::contention(1, 2, 10),
        "Transfer (from: 1, to: 2) lost 10 conditional commits in a row"
    )]
    #[case::arithmetic_overflow(
        TransferError::arithmetic_overflow("debit", 1),
        "Arithmetic overflow in debit for account 1"
    )]
    fn test_error_display(#[case] error: TransferError, #[case] expected: &str) {
        assert_eq!(error.to_string(), expected);
    }

    #[test]
    fn test_store_error_conversion() {
        let store_error = StoreError::CorruptValue {
            key: "account:1".to_string(),
            field: "balance".to_string(),
            value: "not-a-number".to_string(),
        };
        let error: TransferError = store_error.into();

        assert!(matches!(error, TransferError::Store(_)));
        assert_eq!(
            error.to_string(),
            "Store error: Corrupt value for account:1/balance: 'not-a-number'"
        );
    }
}
