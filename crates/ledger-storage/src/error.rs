//! Storage error types.

use thiserror::Error;

/// Storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Failed to read, write, or rename the durable record on disk.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The on-disk record was not valid JSON, or didn't match the expected
    /// shape.
    #[error("malformed durable record: {0}")]
    Malformed(#[from] serde_json::Error),

    /// The record parsed, but its embedded chain failed verification
    /// (tampered or truncated back-pointers).
    #[error("durable record's chain does not verify")]
    ChainDoesNotVerify,
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;
