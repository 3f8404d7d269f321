//! Fixed id to TCP endpoint derivation for the five-peer group.
//!
//! The peer set and its addressing are not configurable: every process
//! derives every peer's listen address, including its own, from the peer
//! id alone. There is no discovery or bootstrap handshake.

use ledger_consensus::PeerId;
use std::net::SocketAddr;

/// Port multiplier used by the reference derivation: peer `k` listens on
/// `k * PORT_MULTIPLIER`.
const PORT_MULTIPLIER: u16 = 1234;

/// The loopback TCP endpoint `peer` listens on.
pub fn addr_for(peer: PeerId) -> SocketAddr {
    let port = peer as u16 * PORT_MULTIPLIER;
    SocketAddr::from(([127, 0, 0, 1], port))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn port_is_id_times_multiplier() {
        assert_eq!(addr_for(1).port(), 1234);
        assert_eq!(addr_for(5).port(), 6170);
    }

    #[test]
    fn every_peer_gets_a_distinct_port() {
        let ports: HashSet<u16> = (1..=5u8).map(|id| addr_for(id).port()).collect();
        assert_eq!(ports.len(), 5);
    }
}
