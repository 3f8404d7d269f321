//! The per-peer single-decree Paxos engine.
//!
//! One [`PaxosEngine`] instance plays proposer, acceptor, and learner for its
//! owning peer. It is deliberately synchronous and side-effect free beyond
//! its own fields: callers drive it by feeding in [`Message`]s and operator
//! requests, and drain queued outbound messages with [`PaxosEngine::take_messages`].
//! All network I/O, persistence, and recovery orchestration live one layer up,
//! in the node and storage crates, so that the protocol logic itself can be
//! exercised deterministically in tests without sockets or threads.

use crate::types::{Ballot, Message, PeerId, MAJORITY_PEER_REPLIES};
use ledger_chain::{AdmissionError, BalanceTable, Block, Chain, Transaction};
use ledger_primitives::{AccountId, Amount};
use std::collections::{BTreeMap, HashSet};

/// Per-round proposer state, encapsulated for the lifetime of a single
/// ballot. Never reused across rounds: a fresh round replaces this wholesale.
#[derive(Debug, Clone)]
struct ProposerRound {
    ballot: Ballot,
    current_depth: u64,
    proposed_block: Block,
    promised_peers: HashSet<PeerId>,
    accepted_peers: HashSet<PeerId>,
    accept_sent: bool,
    decision_sent: bool,
    highest_seen_accepted: Option<(Ballot, Block)>,
}

/// Why [`PaxosEngine::propose`] declined to start a round.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProposeError {
    /// The transfer itself is inadmissible (bad amount or balance).
    #[error(transparent)]
    Admission(#[from] AdmissionError),
    /// This peer is marked dead and cannot originate proposals.
    #[error("this peer is dead and cannot propose")]
    Dead,
}

/// Side effects the caller must act on after [`PaxosEngine::handle`] or
/// [`PaxosEngine::propose`]. Outbound wire messages are not part of this —
/// they accumulate in the engine's internal outbox and are drained
/// separately via [`PaxosEngine::take_messages`], since a single inbound
/// message can produce any number of outbound ones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Nothing the caller needs to act on beyond sending queued messages.
    None,
    /// The acceptor's durable fields (`promised_ballot`, `highest_accepted_*`)
    /// changed; the caller should persist them.
    PersistAcceptorState,
    /// A block was decided and applied to the chain and balances at `depth`;
    /// the caller should persist the new chain tail and balances.
    Decided {
        /// The slot that was just filled.
        depth: u64,
        /// The block that was decided.
        block: Block,
    },
    /// This peer is behind the sender of `pending` by at least one slot. The
    /// caller must run the recovery protocol (optionally targeting a
    /// specific peer) and then re-submit `pending` to [`PaxosEngine::handle`]
    /// once recovery completes.
    RecoveryNeeded {
        /// The peer whose message revealed the skew, a reasonable recovery
        /// target.
        target: PeerId,
        /// The message to re-submit once recovery has caught this peer up.
        pending: Box<Message>,
    },
    /// A Recovery Reply was accepted and applied; the caller should persist
    /// the overwritten chain, balances, and promised ballot.
    RecoveryApplied {
        /// The new chain depth after adopting the reply.
        depth: u64,
    },
}

/// The replicated state machine for one peer: chain, balances, Paxos
/// acceptor bookkeeping, and (when this peer is proposing) the current
/// round's proposer bookkeeping.
#[derive(Debug, Clone)]
pub struct PaxosEngine {
    id: PeerId,
    chain: Chain,
    balances: BalanceTable,
    promised_ballot: Ballot,
    highest_accepted: Option<(Ballot, Block)>,
    next_ballot_num: u64,
    round: Option<ProposerRound>,
    dead: bool,
    outbox: Vec<Message>,
}

impl PaxosEngine {
    /// A freshly initialized peer: empty chain, genesis balances, no
    /// promises made yet.
    pub fn new(id: PeerId) -> Self {
        PaxosEngine {
            id,
            chain: Chain::new(),
            balances: BalanceTable::genesis(),
            promised_ballot: Ballot::ZERO,
            highest_accepted: None,
            next_ballot_num: 0,
            round: None,
            dead: false,
            outbox: Vec::new(),
        }
    }

    /// Rebuild a peer's engine from durable state (loaded from the storage
    /// crate's snapshot, or applied by recovery).
    pub fn from_snapshot(id: PeerId, chain: Chain, balances: BalanceTable, promised_ballot: Ballot) -> Self {
        PaxosEngine {
            id,
            chain,
            balances,
            promised_ballot,
            highest_accepted: None,
            next_ballot_num: promised_ballot.number,
            round: None,
            dead: false,
            outbox: Vec::new(),
        }
    }

    /// This peer's id.
    pub fn id(&self) -> PeerId {
        self.id
    }

    /// The current chain.
    pub fn chain(&self) -> &Chain {
        &self.chain
    }

    /// The current balance table.
    pub fn balances(&self) -> &BalanceTable {
        &self.balances
    }

    /// The highest ballot this peer has promised.
    pub fn promised_ballot(&self) -> Ballot {
        self.promised_ballot
    }

    /// Whether this peer is currently marked dead (crashed).
    pub fn is_dead(&self) -> bool {
        self.dead
    }

    /// Mark this peer dead: subsequent `handle` calls become no-ops.
    pub fn kill(&mut self) {
        self.dead = true;
        self.round = None;
    }

    /// Clear the dead flag. Callers that want a full catch-up should follow
    /// this with a Recovery request.
    pub fn revive(&mut self) {
        self.dead = false;
    }

    /// Drain and return every message queued for sending since the last call.
    pub fn take_messages(&mut self) -> Vec<Message> {
        std::mem::take(&mut self.outbox)
    }

    /// Whether this peer is currently running a proposer round.
    pub fn is_proposing(&self) -> bool {
        self.round.is_some()
    }

    /// Build a Recovery Reply payload describing this peer's full state.
    pub fn recovery_reply(&self) -> Message {
        Message::RecoveryReply {
            from: self.id,
            blockchain: self.chain.as_slice().to_vec(),
            account_table: self.balances.as_map().clone(),
            promised_ballot: self.promised_ballot,
        }
    }

    /// Queue a Recovery request addressed to `target` (or broadcast, by the
    /// caller sending it to every peer — the engine doesn't care).
    pub fn request_recovery(&mut self) {
        if self.dead {
            return;
        }
        self.outbox.push(Message::Recovery { from: self.id });
    }

    // ---- Proposer path ----------------------------------------------

    /// Begin a new round proposing `transaction`. Fails immediately if the
    /// transfer is inadmissible against the current local balances or this
    /// peer is dead; does not touch the network beyond queuing a Prepare.
    pub fn propose(&mut self, transaction: Transaction) -> Result<(), ProposeError> {
        if self.dead {
            return Err(ProposeError::Dead);
        }
        self.balances.check_admission(&transaction)?;

        let block = Block::mine(transaction, self.chain.tail());
        let ballot_num = self.next_ballot_num.max(self.promised_ballot.number) + 1;
        self.next_ballot_num = ballot_num;
        let ballot = Ballot::new(ballot_num, self.id);
        let depth = self.chain.depth() + 1;

        self.round = Some(ProposerRound {
            ballot,
            current_depth: depth,
            proposed_block: block,
            promised_peers: HashSet::new(),
            accepted_peers: HashSet::new(),
            accept_sent: false,
            decision_sent: false,
            highest_seen_accepted: None,
        });

        self.outbox.push(Message::Prepare {
            from: self.id,
            ballot,
            depth,
        });
        Ok(())
    }

    // ---- Inbound dispatch ---------------------------------------------

    /// Feed one inbound message to the engine. Returns the side effect the
    /// caller must act on; queued outbound messages are drained separately.
    pub fn handle(&mut self, message: Message) -> Effect {
        if self.dead {
            return Effect::None;
        }
        match message {
            Message::Prepare { from, ballot, depth } => self.on_prepare(from, ballot, depth),
            Message::Promise {
                from,
                ballot,
                depth,
                accepted_ballot,
                accepted_block,
            } => self.on_promise(from, ballot, depth, accepted_ballot, accepted_block),
            Message::Accept { from, ballot, depth, block } => self.on_accept(from, ballot, depth, block),
            Message::Accepted { from, ballot } => self.on_accepted(from, ballot),
            Message::Decision { from, depth, block } => self.on_decision(from, depth, block),
            Message::Recovery { from } => self.on_recovery_request(from),
            Message::RecoveryReply {
                from,
                blockchain,
                account_table,
                promised_ballot,
            } => self.on_recovery_reply(from, blockchain, account_table, promised_ballot),
            Message::Debug { from, text } => self.on_debug(from, text),
            Message::DebugReply { .. } => Effect::None,
        }
    }

    fn on_prepare(&mut self, from: PeerId, ballot: Ballot, depth: u64) -> Effect {
        if depth < self.chain.depth() + 1 {
            return Effect::None;
        }
        if ballot < self.promised_ballot {
            return Effect::None;
        }
        self.promised_ballot = ballot;
        let (accepted_ballot, accepted_block) = match &self.highest_accepted {
            Some((b, blk)) => (Some(*b), Some(blk.clone())),
            None => (None, None),
        };
        self.outbox.push(Message::Promise {
            from: self.id,
            ballot,
            depth,
            accepted_ballot,
            accepted_block,
        });
        Effect::PersistAcceptorState
    }

    fn on_promise(
        &mut self,
        from: PeerId,
        ballot: Ballot,
        _depth: u64,
        accepted_ballot: Option<Ballot>,
        accepted_block: Option<Block>,
    ) -> Effect {
        let Some(round) = self.round.as_mut() else {
            return Effect::None;
        };
        if ballot != round.ballot {
            return Effect::None;
        }
        round.promised_peers.insert(from);

        if let (Some(ab), Some(block)) = (accepted_ballot, accepted_block) {
            let adopt = match &round.highest_seen_accepted {
                Some((seen_ballot, _)) => ab > *seen_ballot,
                None => true,
            };
            if adopt {
                round.highest_seen_accepted = Some((ab, block));
            }
        }

        if round.promised_peers.len() >= MAJORITY_PEER_REPLIES && !round.accept_sent {
            round.accept_sent = true;
            if let Some((_, block)) = round.highest_seen_accepted.clone() {
                round.proposed_block = block;
            }
            self.outbox.push(Message::Accept {
                from: self.id,
                ballot: round.ballot,
                depth: round.current_depth,
                block: round.proposed_block.clone(),
            });
        }
        Effect::None
    }

    fn on_accept(&mut self, from: PeerId, ballot: Ballot, depth: u64, block: Block) -> Effect {
        let expected_depth = self.chain.depth() + 1;
        if depth < expected_depth {
            return Effect::None;
        }
        if depth > expected_depth {
            return Effect::RecoveryNeeded {
                target: from,
                pending: Box::new(Message::Accept { from, ballot, depth, block }),
            };
        }
        if ballot < self.promised_ballot {
            return Effect::None;
        }
        if !block.is_valid_against(self.chain.tail()) {
            tracing::warn!(peer = self.id, %from, "rejected Accept with invalid block");
            return Effect::None;
        }
        self.promised_ballot = ballot;
        self.highest_accepted = Some((ballot, block));
        self.outbox.push(Message::Accepted { from: self.id, ballot });
        Effect::PersistAcceptorState
    }

    fn on_accepted(&mut self, from: PeerId, ballot: Ballot) -> Effect {
        let Some(round) = self.round.as_mut() else {
            return Effect::None;
        };
        if ballot != round.ballot {
            return Effect::None;
        }
        round.accepted_peers.insert(from);
        if round.accepted_peers.len() >= MAJORITY_PEER_REPLIES && !round.decision_sent {
            round.decision_sent = true;
            let depth = round.current_depth;
            let block = round.proposed_block.clone();
            self.outbox.push(Message::Decision {
                from: self.id,
                depth,
                block: block.clone(),
            });
            self.apply_decision(&block);
            self.round = None;
            return Effect::Decided { depth, block };
        }
        Effect::None
    }

    fn on_decision(&mut self, from: PeerId, depth: u64, block: Block) -> Effect {
        let expected_depth = self.chain.depth() + 1;
        if depth < expected_depth {
            return Effect::None;
        }
        if depth > expected_depth {
            return Effect::RecoveryNeeded {
                target: from,
                pending: Box::new(Message::Decision { from, depth, block }),
            };
        }
        if !block.is_valid_against(self.chain.tail()) {
            tracing::warn!(peer = self.id, %from, "rejected Decision with invalid block");
            return Effect::None;
        }
        self.apply_decision(&block);
        Effect::Decided { depth, block }
    }

    fn on_recovery_request(&mut self, _from: PeerId) -> Effect {
        let reply = self.recovery_reply();
        self.outbox.push(reply);
        Effect::None
    }

    fn on_recovery_reply(
        &mut self,
        from: PeerId,
        blockchain: Vec<Block>,
        account_table: BTreeMap<AccountId, Amount>,
        promised_ballot: Ballot,
    ) -> Effect {
        let incoming_len = blockchain.len() as u64;
        let local_len = self.chain.depth();
        if incoming_len < local_len || (incoming_len == local_len && from < self.id) {
            return Effect::None;
        }
        let candidate = Chain::from_blocks(blockchain);
        if !candidate.verify() {
            tracing::warn!(peer = self.id, %from, "discarding recovery reply with unverifiable chain");
            return Effect::None;
        }
        self.chain = candidate;
        self.balances = BalanceTable::from_map(account_table);
        self.promised_ballot = Ballot::elementwise_max(self.promised_ballot, promised_ballot);
        self.next_ballot_num = self.next_ballot_num.max(self.promised_ballot.number);
        self.highest_accepted = None;
        self.round = None;
        Effect::RecoveryApplied { depth: self.chain.depth() }
    }

    fn on_debug(&mut self, _from: PeerId, text: String) -> Effect {
        self.outbox.push(Message::DebugReply { from: self.id, text });
        Effect::None
    }

    fn apply_decision(&mut self, block: &Block) {
        self.chain.append(block.clone());
        self.balances.apply(&block.transaction);
        self.highest_accepted = None;
        self.round = None;
    }
}
