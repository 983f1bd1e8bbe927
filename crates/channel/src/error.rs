//! Error types for the peer channel.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ChannelError>;

#[derive(Debug, Error)]
pub enum ChannelError {
    /// The underlying transport failed to read or write a frame.
    #[error("transport error: {0}")]
    Transport(String),
    /// No frame arrived within the configured read timeout.
    #[error("no frame received within {0:?}")]
    ReadTimeout(std::time::Duration),
    #[error(transparent)]
    Core(#[from] corelib::Error),
    /// Binding or serving the listener failed.
    #[error("server error: {0}")]
    Server(#[from] std::io::Error),
}
