//! Peer channel protocol for the karai coordinator.
//!
//! This crate provides the duplex channel peers join through:
//! - Frame classification into tagged messages
//! - The JOIN handshake and status query dispatch
//! - Per-connection sessions
//! - The WebSocket acceptor and the HTTP status surface

pub mod acceptor;
pub mod api;
pub mod dispatch;
pub mod error;
pub mod events;
pub mod protocol;
pub mod session;

pub use acceptor::{ChannelAcceptor, WsChannel};
pub use dispatch::{Action, Dispatcher};
pub use error::{ChannelError, Result};
pub use events::{ChannelEvents, CloseReason, Remote, TracingEvents};
pub use protocol::{Frame, FrameKind, Message};
pub use session::{FrameChannel, Session, SessionState};
