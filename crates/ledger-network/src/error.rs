//! Transport error types.

use thiserror::Error;

/// Errors raised while connecting, framing, or parsing a message on the wire.
#[derive(Debug, Error)]
pub enum NetworkError {
    /// The underlying TCP connection failed to establish, read, or write.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// A length prefix claimed more bytes than this transport accepts.
    #[error("frame of {0} bytes exceeds the maximum accepted size")]
    FrameTooLarge(usize),
    /// The frame body did not parse as a wire message.
    #[error("malformed message frame: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Shorthand result alias for this crate.
pub type NetworkResult<T> = Result<T, NetworkError>;
