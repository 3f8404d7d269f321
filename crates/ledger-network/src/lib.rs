//! # ledger-network
//!
//! Length-framed JSON transport between the five fixed peers. Outbound
//! sends open one TCP connection per message; the listener accepts inbound
//! connections and forwards every decoded frame to the dispatcher's inbound
//! channel. There is no peer discovery: the address book is a pure
//! function of peer id.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod address_book;
mod error;
mod framing;
mod listener;
mod transport;

pub use address_book::addr_for;
pub use error::{NetworkError, NetworkResult};
pub use framing::{read_message, write_message, MAX_FRAME_BYTES};
pub use listener::Listener;
pub use transport::{broadcast_logged, send, send_logged};
