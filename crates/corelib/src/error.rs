//! Error types for the core library.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for the core library.
pub type Result<T> = std::result::Result<T, Error>;

/// Reasons a candidate peer key is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PeerKeyError {
    /// Payload is not exactly 64 bytes long.
    #[error("peer key has length {0}, expected 64")]
    WrongLength(usize),
    /// Payload is 64 bytes but contains bytes outside `[a-f0-9]`.
    #[error("peer key contains illegal characters")]
    IllegalCharacters,
}

/// Errors that can occur in the core library.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid peer key
    #[error("Invalid peer key: {0}")]
    InvalidPeerKey(#[from] PeerKeyError),
    /// Identity key file is malformed
    #[error("Invalid identity key length: expected 32 bytes, got {0}")]
    InvalidIdentityKey(usize),
    /// Filesystem operation failed on a specific path
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// Configuration rejected by validation
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}
