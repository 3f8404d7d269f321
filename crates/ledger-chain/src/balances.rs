//! The derived account balance table.
//!
//! Authoritative only in the sense that it is *derived*: the chain is the
//! source of truth, and the balance table is rebuilt by replaying every
//! block's transaction in order. It is never mutated except by
//! [`BalanceTable::apply`].

use crate::transaction::{AdmissionError, Transaction};
use ledger_primitives::{AccountId, Amount, GENESIS_BALANCE, NUM_ACCOUNTS};
use std::collections::BTreeMap;

/// Mapping from account id to current balance.
///
/// Invariant: [`BalanceTable::total`] is always `NUM_ACCOUNTS * GENESIS_BALANCE`
/// (500), since every mutation debits one account and credits another by the
/// same amount.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalanceTable {
    balances: BTreeMap<AccountId, Amount>,
}

impl BalanceTable {
    /// The starting table: every one of the five accounts holds
    /// [`GENESIS_BALANCE`].
    pub fn genesis() -> Self {
        let balances = AccountId::all().map(|id| (id, GENESIS_BALANCE)).collect();
        BalanceTable { balances }
    }

    /// Rebuild a table from an explicit account-id to balance mapping, e.g.
    /// one received in a Recovery Reply. Does not validate the total; callers
    /// that need that guarantee should check [`BalanceTable::total`] themselves.
    pub fn from_map(balances: BTreeMap<AccountId, Amount>) -> Self {
        BalanceTable { balances }
    }

    /// The balance of a single account.
    pub fn get(&self, account: AccountId) -> Amount {
        self.balances.get(&account).copied().unwrap_or(0)
    }

    /// All account balances, lowest id first.
    pub fn as_map(&self) -> &BTreeMap<AccountId, Amount> {
        &self.balances
    }

    /// Sum of every account's balance. Should always equal
    /// `NUM_ACCOUNTS as u64 * GENESIS_BALANCE`.
    pub fn total(&self) -> Amount {
        self.balances.values().sum()
    }

    /// Whether the total currently matches the fixed initial supply.
    pub fn total_is_conserved(&self) -> bool {
        self.total() == NUM_ACCOUNTS as u64 * GENESIS_BALANCE
    }

    /// Check whether `transaction` could be admitted against this table right
    /// now: the sender must hold at least `amount`. This check is advisory —
    /// it runs against the proposer's local view before a round even starts,
    /// not against the value a Decision ultimately commits (see the admission
    /// note in the crate's consuming engine).
    pub fn check_admission(&self, transaction: &Transaction) -> Result<(), AdmissionError> {
        if self.get(transaction.from) < transaction.amount {
            return Err(AdmissionError::InsufficientBalance {
                from: transaction.from,
                amount: transaction.amount,
            });
        }
        Ok(())
    }

    /// Apply a decided transaction unconditionally: debit `from`, credit
    /// `to`. Callers are responsible for having already verified the
    /// transaction's containing block; this never fails.
    pub fn apply(&mut self, transaction: &Transaction) {
        let from_balance = self.balances.entry(transaction.from).or_insert(0);
        *from_balance = from_balance.saturating_sub(transaction.amount);
        *self.balances.entry(transaction.to).or_insert(0) += transaction.amount;
    }
}

impl Default for BalanceTable {
    fn default() -> Self {
        BalanceTable::genesis()
    }
}
