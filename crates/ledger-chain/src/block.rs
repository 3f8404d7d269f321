//! Block construction and verification: the proof-of-work-style content hash
//! and back-pointer linkage used as the Paxos agreement value.

use crate::transaction::Transaction;
use ledger_crypto::{meets_acceptance_predicate, random_nonce, sha256, sha256_concat};
use ledger_primitives::Hash256;
use serde::{Deserialize, Serialize};

/// An immutable block: a transaction, the nonce that made its hash
/// acceptable, the resulting content hash, and a back-pointer to the
/// predecessor block (absent only for the very first block in a chain).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    /// The transaction this block commits.
    pub transaction: Transaction,
    /// The nonce found during construction.
    pub nonce: String,
    /// `SHA256(canonical_json(transaction) || nonce)`.
    pub hash_value: Hash256,
    /// `SHA256(canonical_json(prev.transaction) || prev.nonce || prev.hash_value)`,
    /// or `None` if this is the first block in the chain.
    pub hash_pointer: Option<Hash256>,
}

impl Block {
    /// Compute the content hash for a `(transaction, nonce)` pair.
    pub fn content_hash(transaction: &Transaction, nonce: &str) -> Hash256 {
        sha256_concat(&[&transaction.canonical_bytes(), nonce.as_bytes()])
    }

    /// Compute the back-pointer hash derived from a predecessor block.
    pub fn back_pointer_of(predecessor: &Block) -> Hash256 {
        sha256_concat(&[
            &predecessor.transaction.canonical_bytes(),
            predecessor.nonce.as_bytes(),
            predecessor.hash_value.as_bytes(),
        ])
    }

    /// Construct a new block for `transaction` atop `predecessor`, searching
    /// for a nonce whose content hash satisfies the acceptance predicate.
    /// This is the block factory's proof-of-work-style search: a handful of
    /// trials on average (~5/16 acceptance probability per trial).
    pub fn mine(transaction: Transaction, predecessor: Option<&Block>) -> Block {
        let hash_pointer = predecessor.map(Block::back_pointer_of);
        loop {
            let nonce = random_nonce();
            let hash_value = Block::content_hash(&transaction, &nonce);
            if meets_acceptance_predicate(&hash_value) {
                return Block {
                    transaction,
                    nonce,
                    hash_value,
                    hash_pointer,
                };
            }
        }
    }

    /// Rebuild a block directly from its stored fields, bypassing the nonce
    /// search. Used when loading from the durable record or from a Recovery
    /// Reply / Accept / Decision payload, where the hash has already been found.
    pub fn reconstruct(
        transaction: Transaction,
        nonce: String,
        hash_value: Hash256,
        hash_pointer: Option<Hash256>,
    ) -> Block {
        Block {
            transaction,
            nonce,
            hash_value,
            hash_pointer,
        }
    }

    /// Whether this block is valid against `predecessor`: its content hash
    /// recomputes correctly, and its back-pointer matches the predecessor's
    /// derived hash (or both are absent when `predecessor` is `None`).
    pub fn is_valid_against(&self, predecessor: Option<&Block>) -> bool {
        if Block::content_hash(&self.transaction, &self.nonce) != self.hash_value {
            return false;
        }
        match (predecessor, self.hash_pointer) {
            (None, None) => true,
            (Some(prev), Some(pointer)) => pointer == Block::back_pointer_of(prev),
            _ => false,
        }
    }
}
