//! # ledger-consensus
//!
//! Single-decree Paxos for the replicated bank ledger: one round of
//! Prepare/Promise/Accept/Accepted per slot, collapsing proposer, acceptor,
//! and learner into a single [`PaxosEngine`] per peer, plus the catch-up
//! (Recovery) protocol used after a crash or an observed depth skew.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod engine;
mod types;

pub use engine::{Effect, PaxosEngine, ProposeError};
pub use types::{Ballot, Message, PeerId, MAJORITY_PEER_REPLIES, PEER_COUNT};
