//! The top-level error type the binary exits on. Only startup failures
//! reach here — everything the protocol itself can encounter in steady
//! state (transport errors, rejected blocks, malformed frames) is logged
//! and handled in place, one layer down.

use ledger_storage::StorageError;
use thiserror::Error;

/// Fatal startup failures for the `ledger-node` binary.
#[derive(Debug, Error)]
pub enum NodeError {
    /// The `--id` flag was outside `[1, PEER_COUNT]`.
    #[error("peer id {0} is out of range 1..=5")]
    InvalidPeerId(u8),
    /// Failed to bind the listening socket for this peer's derived port.
    #[error("failed to bind listen socket: {0}")]
    Bind(#[source] std::io::Error),
    /// The durable record on disk failed to load or did not verify.
    #[error("durable record could not be loaded: {0}")]
    Storage(#[from] StorageError),
}
