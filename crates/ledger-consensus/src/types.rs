//! Wire types for the single-decree Paxos protocol: ballots and the tagged
//! message union exchanged between peers.

use ledger_chain::Block;
use ledger_primitives::{AccountId, Amount};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Total number of peers in the fixed group.
pub const PEER_COUNT: u8 = 5;

/// The number of peer replies (not counting the proposer's own implicit
/// vote) needed to reach a majority of `PEER_COUNT`.
///
/// `floor(PEER_COUNT / 2) + 1` is the majority size including the proposer;
/// subtracting the proposer's own vote gives the number of *peer* replies
/// still required.
pub const MAJORITY_PEER_REPLIES: usize = (PEER_COUNT as usize / 2 + 1) - 1;

/// A peer identifier. Always in `[1, PEER_COUNT]`.
pub type PeerId = u8;

/// Lexicographically ordered `(ballot_number, proposer_id)` pair. Tie-break
/// by proposer id makes every ballot globally unique across the group.
///
/// Serializes as a 2-element JSON array `[number, proposer_id]` rather than
/// an object, matching the wire catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ballot {
    /// Monotonically non-decreasing counter chosen by the proposer.
    pub number: u64,
    /// The id of the peer that minted this ballot.
    pub proposer_id: PeerId,
}

impl Serialize for Ballot {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        (self.number, self.proposer_id).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Ballot {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let (number, proposer_id) = <(u64, PeerId)>::deserialize(deserializer)?;
        Ok(Ballot { number, proposer_id })
    }
}

impl Ballot {
    /// The ballot every acceptor starts out having promised: lower than any
    /// ballot a real proposer can mint (proposer ids start at 1).
    pub const ZERO: Ballot = Ballot {
        number: 0,
        proposer_id: 0,
    };

    /// Construct a ballot.
    pub fn new(number: u64, proposer_id: PeerId) -> Self {
        Ballot { number, proposer_id }
    }

    /// The elementwise maximum of two ballots, used when merging
    /// `promised_ballot` during recovery.
    pub fn elementwise_max(a: Ballot, b: Ballot) -> Ballot {
        a.max(b)
    }
}

impl Default for Ballot {
    fn default() -> Self {
        Ballot::ZERO
    }
}

/// The tagged union of every message exchanged between peers. Parsed once at
/// the dispatcher boundary into this type; the engine never sees an untyped
/// JSON value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Message {
    /// Proposer → acceptors: begin a ballot for `depth`.
    Prepare {
        /// Sending peer.
        from: PeerId,
        /// The ballot being opened.
        ballot: Ballot,
        /// The slot this ballot aims to fill.
        depth: u64,
    },
    /// Acceptor → proposer: a pledge not to accept any ballot below `ballot`
    /// at `depth`, carrying along whatever this acceptor had already
    /// accepted for that slot (if anything).
    Promise {
        /// Sending peer.
        from: PeerId,
        /// The ballot being promised.
        ballot: Ballot,
        /// The slot this promise concerns.
        depth: u64,
        /// The highest ballot this acceptor had previously accepted at this
        /// slot, if any.
        accepted_ballot: Option<Ballot>,
        /// The block accepted under `accepted_ballot`, if any.
        accepted_block: Option<Block>,
    },
    /// Proposer → acceptors: accept `block` under `ballot` for `depth`.
    Accept {
        /// Sending peer.
        from: PeerId,
        /// The ballot under which this value is being proposed.
        ballot: Ballot,
        /// The slot this value fills.
        depth: u64,
        /// The candidate block.
        block: Block,
    },
    /// Acceptor → proposer: confirmation that `ballot` was accepted.
    Accepted {
        /// Sending peer.
        from: PeerId,
        /// The accepted ballot.
        ballot: Ballot,
    },
    /// Learner broadcast: `block` has been chosen for `depth`.
    Decision {
        /// Sending peer.
        from: PeerId,
        /// The decided slot.
        depth: u64,
        /// The decided block.
        block: Block,
    },
    /// Request for a catch-up snapshot.
    Recovery {
        /// Sending peer.
        from: PeerId,
    },
    /// Catch-up snapshot reply.
    #[serde(rename = "Recovery Reply")]
    RecoveryReply {
        /// Sending peer.
        from: PeerId,
        /// The replier's full chain.
        blockchain: Vec<Block>,
        /// The replier's account balances.
        account_table: BTreeMap<AccountId, Amount>,
        /// The replier's promised ballot.
        promised_ballot: Ballot,
    },
    /// Round-trip-time probe.
    #[serde(rename = "DEBUG")]
    Debug {
        /// Sending peer.
        from: PeerId,
        /// Arbitrary echoed text.
        text: String,
    },
    /// Reply to a [`Message::Debug`] probe.
    #[serde(rename = "DEBUG REPLY")]
    DebugReply {
        /// Sending peer.
        from: PeerId,
        /// The text that was echoed.
        text: String,
    },
}

impl Message {
    /// The peer that sent this message.
    pub fn from(&self) -> PeerId {
        match self {
            Message::Prepare { from, .. }
            | Message::Promise { from, .. }
            | Message::Accept { from, .. }
            | Message::Accepted { from, .. }
            | Message::Decision { from, .. }
            | Message::Recovery { from }
            | Message::RecoveryReply { from, .. }
            | Message::Debug { from, .. }
            | Message::DebugReply { from, .. } => *from,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn majority_peer_replies_is_two_of_five() {
        assert_eq!(MAJORITY_PEER_REPLIES, 2);
    }

    #[test]
    fn ballot_ordering_is_pairwise() {
        assert!(Ballot::new(1, 5) < Ballot::new(2, 1));
        assert!(Ballot::new(2, 1) < Ballot::new(2, 3));
        assert_eq!(Ballot::new(2, 3), Ballot::new(2, 3));
    }

    #[test]
    fn zero_ballot_is_below_any_real_ballot() {
        assert!(Ballot::ZERO < Ballot::new(1, 1));
    }

    #[test]
    fn elementwise_max_picks_the_higher_ballot() {
        let a = Ballot::new(3, 2);
        let b = Ballot::new(3, 4);
        assert_eq!(Ballot::elementwise_max(a, b), b);
        assert_eq!(Ballot::elementwise_max(b, a), b);
    }

    #[test]
    fn message_from_extracts_sender_for_every_variant() {
        let prepare = Message::Prepare {
            from: 2,
            ballot: Ballot::new(1, 2),
            depth: 1,
        };
        assert_eq!(prepare.from(), 2);

        let recovery = Message::Recovery { from: 4 };
        assert_eq!(recovery.from(), 4);
    }

    #[test]
    fn message_tag_serializes_to_spec_names() {
        let msg = Message::RecoveryReply {
            from: 1,
            blockchain: vec![],
            account_table: BTreeMap::new(),
            promised_ballot: Ballot::ZERO,
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains("\"type\":\"Recovery Reply\""));

        let debug = Message::Debug { from: 1, text: "hi".into() };
        let json = serde_json::to_string(&debug).unwrap();
        assert!(json.contains("\"type\":\"DEBUG\""));
    }

    #[test]
    fn ballot_serializes_as_two_element_array() {
        let ballot = Ballot::new(5, 3);
        let json = serde_json::to_string(&ballot).unwrap();
        assert_eq!(json, "[5,3]");
        let back: Ballot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ballot);
    }

    #[test]
    fn prepare_round_trips_through_json() {
        let msg = Message::Prepare {
            from: 3,
            ballot: Ballot::new(5, 3),
            depth: 2,
        };
        let json = serde_json::to_string(&msg).unwrap();
        let back: Message = serde_json::from_str(&json).unwrap();
        assert_eq!(back.from(), 3);
    }
}
