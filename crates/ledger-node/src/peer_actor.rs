//! The single owner of one peer's `PaxosEngine` and durable record.
//!
//! All engine mutation happens on this task: it reads events off one
//! channel (inbound wire frames and operator commands, interleaved) and
//! handles them one at a time, in receipt order. Network I/O and
//! persistence are invoked from here but never block the event loop for
//! longer than a single local operation — sends are fire-and-forget tasks
//! at the transport layer, and persistence is a local file write.
//!
//! Recovery does not use a suspend/resume signal the way a thread-per-peer
//! design would. Since this task never blocks waiting on another message,
//! a round that triggers `Effect::RecoveryNeeded` simply stashes the
//! triggering message and keeps draining the channel; when the matching
//! `Effect::RecoveryApplied` later fires, every stashed message is
//! replayed against the now-caught-up engine. This reaches the same
//! outcome as a suspended handler without needing a separate dispatch path
//! for Recovery Replies.

use crate::commands::Command;
use ledger_chain::Transaction;
use ledger_consensus::{Effect, Message, PaxosEngine, PeerId, ProposeError};
use ledger_primitives::AccountId;
use ledger_storage::{DurableRecord, Store, StorageError};
use tokio::sync::mpsc;

/// One event the actor's channel carries.
#[derive(Debug)]
pub enum ActorEvent {
    /// A frame decoded off the network.
    Wire(Message),
    /// A line the operator typed at the REPL.
    Operator(Command),
}

/// Owns the engine and durable record for one peer.
pub struct PeerActor {
    engine: PaxosEngine,
    store: Store,
    debug_mode: bool,
    pending_recovery: Vec<Message>,
}

impl PeerActor {
    /// Load the durable record for `id` from `store`, or start from
    /// genesis if none exists yet.
    pub fn load(id: PeerId, store: Store, debug_mode: bool) -> Result<Self, StorageError> {
        let engine = match store.load()? {
            Some(record) => {
                let (chain, balances, promised_ballot) = record.into_state()?;
                PaxosEngine::from_snapshot(id, chain, balances, promised_ballot)
            }
            None => PaxosEngine::new(id),
        };
        Ok(PeerActor { engine, store, debug_mode, pending_recovery: Vec::new() })
    }

    /// Drive the actor until `events` closes.
    pub async fn run(mut self, mut events: mpsc::Receiver<ActorEvent>) {
        while let Some(event) = events.recv().await {
            match event {
                ActorEvent::Wire(message) => self.handle_wire(message).await,
                ActorEvent::Operator(command) => self.handle_operator(command).await,
            }
        }
    }

    async fn handle_wire(&mut self, message: Message) {
        let mut queue = vec![message];
        while let Some(msg) = queue.pop() {
            let from = msg.from();
            let effect = self.engine.handle(msg);
            self.flush_outbox();
            match effect {
                Effect::None => {}
                Effect::PersistAcceptorState => self.persist(),
                Effect::Decided { depth, block } => {
                    tracing::info!(peer = self.engine.id(), depth, tx = ?block.transaction, "block decided");
                    self.persist();
                }
                Effect::RecoveryNeeded { target, pending } => {
                    tracing::info!(peer = self.engine.id(), %target, source = from, "behind peer, requesting recovery");
                    self.pending_recovery.push(*pending);
                    let request = Message::Recovery { from: self.engine.id() };
                    tokio::spawn(async move { ledger_network::send_logged(target, &request).await });
                }
                Effect::RecoveryApplied { depth } => {
                    tracing::info!(peer = self.engine.id(), depth, "recovery applied, caught up");
                    self.persist();
                    queue.extend(std::mem::take(&mut self.pending_recovery));
                }
            }
        }
    }

    /// Hand every queued outbound message to its own short-lived send task and
    /// return immediately. A slow or unreachable peer connection therefore
    /// never blocks the owner task from draining the next inbound event.
    fn flush_outbox(&mut self) {
        let outbound = self.engine.take_messages();
        let id = self.engine.id();
        for message in outbound {
            tokio::spawn(async move { ledger_network::broadcast_logged(id, &message).await });
        }
    }

    fn persist(&self) {
        let record = DurableRecord::capture(self.engine.chain(), self.engine.balances(), self.engine.promised_ballot());
        if let Err(err) = self.store.save(&record) {
            tracing::error!(peer = self.engine.id(), %err, "failed to persist durable record");
        }
    }

    async fn handle_operator(&mut self, command: Command) {
        if self.engine.is_dead() && command != Command::Fix {
            println!("this process is dead");
            return;
        }
        match command {
            Command::Fail => {
                self.engine.kill();
                tracing::info!(peer = self.engine.id(), "peer marked dead");
                println!("process failed");
            }
            Command::Fix => {
                self.engine.revive();
                self.engine.request_recovery();
                self.flush_outbox();
                tracing::info!(peer = self.engine.id(), "peer revived, recovery requested");
                println!("process fixed");
            }
            Command::PrintBlockchain => self.print_blockchain(),
            Command::PrintBalance => self.print_balance(),
            Command::MoneyTransfer { from, to, amount } => self.propose_transfer(from, to, amount),
            Command::DebugMessage { to, text } => self.send_debug(to, text),
            Command::Unknown => println!("unknown command"),
        }
    }

    fn print_blockchain(&self) {
        for (depth, block) in self.engine.chain().iter().enumerate() {
            println!(
                "{depth}: {}->{} amount={} nonce={} hash={}",
                block.transaction.from,
                block.transaction.to,
                block.transaction.amount,
                block.nonce,
                block.hash_value.to_hex(),
            );
        }
    }

    fn print_balance(&self) {
        for id in AccountId::all() {
            println!("{id}: {}", self.engine.balances().get(id));
        }
    }

    fn propose_transfer(&mut self, from: u8, to: u8, amount: u64) {
        let transaction = match (AccountId::new(from), AccountId::new(to)) {
            (Ok(from), Ok(to)) => Transaction::new(from, to, amount),
            (Err(err), _) | (_, Err(err)) => {
                println!("invalid account: {err}");
                return;
            }
        };
        let transaction = match transaction {
            Ok(tx) => tx,
            Err(err) => {
                println!("transfer rejected: {err}");
                return;
            }
        };
        match self.engine.propose(transaction) {
            Ok(()) => self.flush_outbox(),
            Err(ProposeError::Admission(err)) => println!("transfer rejected: {err}"),
            Err(ProposeError::Dead) => println!("this process is dead"),
        }
    }

    fn send_debug(&mut self, to: u8, text: String) {
        if !self.debug_mode {
            println!("debug mode is disabled");
            return;
        }
        let from = self.engine.id();
        tokio::spawn(async move { ledger_network::send_logged(to, &Message::Debug { from, text }).await });
    }
}
