//! The single operation the ledger can agree on: moving currency between
//! two of the five fixed accounts.

use ledger_primitives::{AccountId, Amount};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A money transfer between two accounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Debited account.
    pub from: AccountId,
    /// Credited account.
    pub to: AccountId,
    /// Amount moved. Always positive.
    pub amount: Amount,
}

/// Reasons a transfer request is rejected before any protocol activity starts.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AdmissionError {
    /// `amount` was zero.
    #[error("transfer amount must be positive")]
    NonPositiveAmount,
    /// The sender does not currently hold enough balance.
    #[error("account {from} has insufficient balance for a transfer of {amount}")]
    InsufficientBalance {
        /// Sender account.
        from: AccountId,
        /// Requested amount.
        amount: Amount,
    },
}

impl Transaction {
    /// Construct a transaction, checking only that the amount is positive.
    /// Account ids are already guaranteed to be in range by [`AccountId`];
    /// balance sufficiency is checked separately against a [`crate::BalanceTable`].
    pub fn new(from: AccountId, to: AccountId, amount: Amount) -> Result<Self, AdmissionError> {
        if amount == 0 {
            return Err(AdmissionError::NonPositiveAmount);
        }
        Ok(Transaction { from, to, amount })
    }

    /// The deterministic, order-stable encoding of this transaction used as
    /// input to the content hash. Always a 3-element array so that hashing
    /// never depends on struct field declaration order.
    pub fn canonical_tuple(&self) -> (u8, u8, Amount) {
        (self.from.get(), self.to.get(), self.amount)
    }

    /// Bytes to hash: `canonical_json(tuple)`.
    pub fn canonical_bytes(&self) -> Vec<u8> {
        ledger_crypto::canonical_json(&self.canonical_tuple())
    }
}
