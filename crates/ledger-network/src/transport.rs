//! Outbound sends: one short-lived TCP connection per message.
//!
//! There is no persistent outbound connection to maintain. Each send opens a
//! fresh socket, writes one frame, and drops it, matching the protocol's
//! tolerance for lost sends: a failed connect or write is logged and
//! swallowed by [`send_logged`]/[`broadcast_logged`] rather than propagated,
//! since the engine relies on retransmission (a later Prepare, a recovery
//! round) rather than delivery guarantees from the transport.

use crate::address_book::addr_for;
use crate::error::NetworkResult;
use crate::framing::write_message;
use ledger_consensus::{Message, PeerId, PEER_COUNT};
use tokio::net::TcpStream;

/// Connect to `to` and write one framed message, propagating any failure.
pub async fn send(to: PeerId, message: &Message) -> NetworkResult<()> {
    let mut stream = TcpStream::connect(addr_for(to)).await?;
    write_message(&mut stream, message).await
}

/// As [`send`], but logs and discards failures instead of returning them.
pub async fn send_logged(to: PeerId, message: &Message) {
    if let Err(err) = send(to, message).await {
        tracing::warn!(to, %err, "send failed, message dropped");
    }
}

/// Send `message` to every peer in `[1, PEER_COUNT]` except `from`.
pub async fn broadcast_logged(from: PeerId, message: &Message) {
    for to in 1..=PEER_COUNT {
        if to == from {
            continue;
        }
        send_logged(to, message).await;
    }
}
