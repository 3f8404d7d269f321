//! # ledger-chain
//!
//! The ledger's authoritative in-memory state: transactions, the
//! proof-of-work-style blocks that wrap them, the index-addressable chain of
//! decided blocks, and the derived account balance table.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod balances;
mod block;
mod chain;
mod transaction;

pub use balances::BalanceTable;
pub use block::Block;
pub use chain::Chain;
pub use transaction::{AdmissionError, Transaction};
