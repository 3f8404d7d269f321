//! # ledger-storage
//!
//! Durable persistence for the replicated ledger: one JSON snapshot per
//! peer, holding its chain, balances, and promised ballot, written on every
//! mutation and read back once at startup.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod error;
mod record;

pub use error::{StorageError, StorageResult};
pub use record::{DurableRecord, Store, Variables};
