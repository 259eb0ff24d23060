//! Error types for the Vaultlink engine

use thiserror::Error;

use crate::bridge::BridgeError;
use crate::storage::StorageError;

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;

/// Errors that terminate a connect run
///
/// Per-action failures (declined, missing item, limit reached) are not
/// errors here; they become typed rejection replies and the session
/// continues. Only session-fatal conditions surface through this type.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Pairing session failed signature verification; never retried
    #[error("Invalid pairing session")]
    InvalidSession,

    /// Transport-level failure, possibly recoverable by the caller
    #[error("Transport error: {0}")]
    Transport(String),

    /// Unrecoverable decode failure on an incoming frame
    #[error("Protocol decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// Fatal storage failure (e.g. corrupted vault)
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// The engine was cancelled by its owner
    #[error("Cancelled")]
    Cancelled,

    /// Continuation bridge misuse or closure
    #[error("Bridge error: {0}")]
    Bridge(#[from] BridgeError),

    /// IO error on the channel stream
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
