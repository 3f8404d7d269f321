//! Inbound accept loop: binds this peer's derived port and forwards every
//! decoded frame to the dispatcher's single inbound channel.

use crate::address_book::addr_for;
use crate::error::NetworkResult;
use crate::framing::read_message;
use ledger_consensus::{Message, PeerId};
use std::net::SocketAddr;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, watch};
use tokio::time::Duration;

/// The bound listening socket for one peer's inbound connections.
pub struct Listener {
    id: PeerId,
    listener: TcpListener,
}

impl Listener {
    /// Bind the listening socket for peer `id` at its derived address.
    pub async fn bind(id: PeerId) -> NetworkResult<Self> {
        Self::bind_at(id, addr_for(id)).await
    }

    async fn bind_at(id: PeerId, addr: SocketAddr) -> NetworkResult<Self> {
        let listener = TcpListener::bind(addr).await?;
        Ok(Listener { id, listener })
    }

    /// The address this listener is actually bound to.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Run the accept loop until `shutdown` reports `true`. Every decoded
    /// frame is forwarded to `inbound` in the order it was read off its
    /// connection; a connection that sends several frames before closing has
    /// each one forwarded in turn. `simulated_delay`, when set, is applied
    /// before each forwarded frame — a deliberately simple stand-in for
    /// variable network latency, off by default.
    pub async fn run(self, inbound: mpsc::Sender<Message>, mut shutdown: watch::Receiver<bool>, simulated_delay: Option<Duration>) {
        loop {
            tokio::select! {
                accepted = self.listener.accept() => {
                    match accepted {
                        Ok((stream, addr)) => {
                            tracing::debug!(peer = self.id, %addr, "inbound connection");
                            let inbound = inbound.clone();
                            tokio::spawn(Self::serve_connection(stream, inbound, simulated_delay));
                        }
                        Err(err) => {
                            tracing::warn!(peer = self.id, %err, "accept failed");
                        }
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        tracing::info!(peer = self.id, "listener shutting down");
                        break;
                    }
                }
            }
        }
    }

    async fn serve_connection(mut stream: TcpStream, inbound: mpsc::Sender<Message>, simulated_delay: Option<Duration>) {
        loop {
            match read_message(&mut stream).await {
                Ok(message) => {
                    if let Some(delay) = simulated_delay {
                        tokio::time::sleep(delay).await;
                    }
                    if inbound.send(message).await.is_err() {
                        break;
                    }
                }
                Err(_) => break,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framing::write_message;
    use ledger_consensus::Ballot;

    #[tokio::test]
    async fn a_connected_frame_reaches_the_inbound_channel() {
        let listener = Listener::bind_at(1, "127.0.0.1:0".parse().unwrap()).await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, mut rx) = mpsc::channel(8);
        let (_shutdown_tx, shutdown_rx) = watch::channel(false);
        tokio::spawn(listener.run(tx, shutdown_rx, None));

        let mut stream = TcpStream::connect(addr).await.unwrap();
        let msg = Message::Recovery { from: 3 };
        write_message(&mut stream, &msg).await.unwrap();

        let received = rx.recv().await.unwrap();
        assert_eq!(received, msg);
    }

    #[tokio::test]
    async fn shutdown_signal_stops_the_accept_loop() {
        let listener = Listener::bind_at(2, "127.0.0.1:0".parse().unwrap()).await.unwrap();
        let (tx, _rx) = mpsc::channel(8);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = tokio::spawn(listener.run(tx, shutdown_rx, None));

        shutdown_tx.send(true).unwrap();
        tokio::time::timeout(Duration::from_secs(1), handle).await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn multiple_frames_on_one_connection_arrive_in_order() {
        let listener = Listener::bind_at(3, "127.0.0.1:0".parse().unwrap()).await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, mut rx) = mpsc::channel(8);
        let (_shutdown_tx, shutdown_rx) = watch::channel(false);
        tokio::spawn(listener.run(tx, shutdown_rx, None));

        let mut stream = TcpStream::connect(addr).await.unwrap();
        let first = Message::Prepare { from: 1, ballot: Ballot::new(1, 1), depth: 1 };
        let second = Message::Recovery { from: 1 };
        write_message(&mut stream, &first).await.unwrap();
        write_message(&mut stream, &second).await.unwrap();

        assert_eq!(rx.recv().await.unwrap(), first);
        assert_eq!(rx.recv().await.unwrap(), second);
    }
}
