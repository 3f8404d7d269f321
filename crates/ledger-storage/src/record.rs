//! The durable per-peer snapshot: chain, balances, and promised ballot,
//! written in full on every mutation and read back once at startup.
//!
//! There is deliberately no append-only log or column-family layout here.
//! At this system's scale (five accounts, demonstration-scale chains) a
//! peer only ever needs to persist after an Accept or after a Decision is
//! applied, and rewriting one small JSON document each time is cheap enough
//! that a log-plus-snapshot design would only add bookkeeping the protocol
//! doesn't need.

use crate::error::{StorageError, StorageResult};
use ledger_chain::{BalanceTable, Block, Chain};
use ledger_consensus::Ballot;
use ledger_primitives::{AccountId, Amount};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// The mutable variables alongside the chain: balances and the promised
/// ballot. Kept as a nested object (rather than flattened onto the record)
/// to mirror how the reference durable record groups them apart from the
/// blockchain array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variables {
    /// The current account balances.
    pub account_table: BTreeMap<AccountId, Amount>,
    /// The highest ballot this peer has promised.
    pub promised_ballot: Ballot,
}

/// The full durable state of one peer, serialized as a single JSON document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DurableRecord {
    /// Balances and promised ballot.
    pub variables: Variables,
    /// The decided blockchain, in order.
    pub blockchain: Vec<Block>,
}

impl DurableRecord {
    /// Capture a record from live engine state.
    pub fn capture(chain: &Chain, balances: &BalanceTable, promised_ballot: Ballot) -> Self {
        DurableRecord {
            variables: Variables {
                account_table: balances.as_map().clone(),
                promised_ballot,
            },
            blockchain: chain.as_slice().to_vec(),
        }
    }

    /// Rebuild the chain and balance table this record describes, verifying
    /// the chain's hash linkage in the process.
    pub fn into_state(self) -> StorageResult<(Chain, BalanceTable, Ballot)> {
        let chain = Chain::from_blocks(self.blockchain);
        if !chain.verify() {
            return Err(StorageError::ChainDoesNotVerify);
        }
        let balances = BalanceTable::from_map(self.variables.account_table);
        Ok((chain, balances, self.variables.promised_ballot))
    }
}

/// A peer's durable record on disk, addressed by peer id within a shared
/// data directory.
#[derive(Debug, Clone)]
pub struct Store {
    path: PathBuf,
}

impl Store {
    /// Open a store for `peer_id` rooted at `data_dir`. Does not touch the
    /// filesystem; `data_dir` is created lazily on first [`Store::save`].
    pub fn new(data_dir: impl AsRef<Path>, peer_id: u8) -> Self {
        Store {
            path: data_dir.as_ref().join(format!("peer-{peer_id}.json")),
        }
    }

    /// The path this store reads from and writes to.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether a record currently exists on disk.
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Load and verify the record on disk, if any.
    pub fn load(&self) -> StorageResult<Option<DurableRecord>> {
        if !self.exists() {
            return Ok(None);
        }
        let bytes = fs::read(&self.path)?;
        let record: DurableRecord = serde_json::from_slice(&bytes)?;
        Ok(Some(record))
    }

    /// Write `record` atomically: serialize to a temporary file in the same
    /// directory, then rename it over the real path. A crash mid-write
    /// leaves the previous record (or nothing) intact, never a half-written
    /// file in its place.
    pub fn save(&self, record: &DurableRecord) -> StorageResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let bytes = serde_json::to_vec_pretty(record)?;
        let tmp_path = self.tmp_path();
        fs::write(&tmp_path, &bytes)?;
        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let mut tmp = self.path.clone();
        tmp.set_extension("json.tmp");
        tmp
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ledger_chain::Transaction;

    fn tx(from: u8, to: u8, amount: u64) -> Transaction {
        Transaction::new(AccountId::new(from).unwrap(), AccountId::new(to).unwrap(), amount).unwrap()
    }

    #[test]
    fn round_trip_reproduces_chain_and_balances() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(dir.path(), 1);

        let mut chain = Chain::new();
        let b1 = Block::mine(tx(1, 2, 30), None);
        chain.append(b1.clone());
        let b2 = Block::mine(tx(2, 3, 10), Some(&b1));
        chain.append(b2);

        let mut balances = BalanceTable::genesis();
        balances.apply(&tx(1, 2, 30));
        balances.apply(&tx(2, 3, 10));

        let promised = Ballot::new(4, 1);
        let record = DurableRecord::capture(&chain, &balances, promised);
        store.save(&record).unwrap();

        let loaded = store.load().unwrap().expect("record was written");
        let (loaded_chain, loaded_balances, loaded_ballot) = loaded.into_state().unwrap();

        assert_eq!(loaded_chain.depth(), chain.depth());
        assert!(loaded_chain.verify());
        assert_eq!(loaded_balances, balances);
        assert_eq!(loaded_ballot, promised);
    }

    #[test]
    fn missing_record_loads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(dir.path(), 3);
        assert!(store.load().unwrap().is_none());
        assert!(!store.exists());
    }

    #[test]
    fn save_overwrites_previous_record() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(dir.path(), 2);

        let chain = Chain::new();
        let balances = BalanceTable::genesis();
        store.save(&DurableRecord::capture(&chain, &balances, Ballot::ZERO)).unwrap();

        let mut chain2 = Chain::new();
        chain2.append(Block::mine(tx(1, 2, 5), None));
        store.save(&DurableRecord::capture(&chain2, &balances, Ballot::new(1, 2))).unwrap();

        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded.blockchain.len(), 1);
        assert_eq!(loaded.variables.promised_ballot, Ballot::new(1, 2));
    }

    #[test]
    fn tampered_record_fails_verification_on_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(dir.path(), 4);

        let mut chain = Chain::new();
        chain.append(Block::mine(tx(1, 2, 30), None));
        let mut blocks = chain.as_slice().to_vec();
        blocks.push(Block::mine(tx(2, 3, 5), None)); // no back-pointer, but not the head
        let tampered = DurableRecord {
            blockchain: blocks,
            variables: Variables {
                account_table: BalanceTable::genesis().as_map().clone(),
                promised_ballot: Ballot::ZERO,
            },
        };
        store.save(&tampered).unwrap();

        let loaded = store.load().unwrap().unwrap();
        let err = loaded.into_state().unwrap_err();
        assert!(matches!(err, StorageError::ChainDoesNotVerify));
    }
}
