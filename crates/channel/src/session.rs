//! Connection session.
//!
//! One session owns one channel for its whole life. It reads frames in
//! arrival order, hands each to the dispatcher, and writes any answer back
//! with the same frame kind. It ends on a read error, end of stream, idle
//! timeout, or a close action from the dispatcher.
//!
//! ```text
//! Open --frame handled--> Open
//! Open --read error / EOF / timeout / violation--> Closed
//! ```

use crate::dispatch::{Action, Dispatcher};
use crate::error::{ChannelError, Result};
use crate::events::{CloseReason, Remote};
use crate::protocol::{Frame, Message};
use async_trait::async_trait;
use std::time::Duration;

/// Transport seam: a bidirectional, message-framed connection.
///
/// Control frames (ping/pong) stay inside the implementation; a close frame
/// from the peer is reported as end of stream (`None`).
#[async_trait]
pub trait FrameChannel: Send {
    async fn recv_frame(&mut self) -> Option<Result<Frame>>;

    async fn send_frame(&mut self, frame: Frame) -> Result<()>;

    /// Best-effort close; errors are irrelevant once we are leaving.
    async fn close(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Open,
    Closed,
}

pub struct Session<C: FrameChannel> {
    channel: C,
    remote: Remote,
    dispatcher: Dispatcher,
    read_timeout: Option<Duration>,
    state: SessionState,
    joined: bool,
}

impl<C: FrameChannel> Session<C> {
    pub fn new(channel: C, remote: Remote, dispatcher: Dispatcher) -> Self {
        Self {
            channel,
            remote,
            dispatcher,
            read_timeout: None,
            state: SessionState::Open,
            joined: false,
        }
    }

    pub fn with_read_timeout(mut self, read_timeout: Option<Duration>) -> Self {
        self.read_timeout = read_timeout;
        self
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Whether a JOIN has succeeded on this channel.
    pub fn joined(&self) -> bool {
        self.joined
    }

    /// Drive the session until it closes, returning why it closed.
    pub async fn run(&mut self) -> CloseReason {
        let reason = loop {
            let frame = match self.next_frame().await {
                Ok(Some(frame)) => frame,
                Ok(None) => break CloseReason::Disconnected,
                Err(ChannelError::ReadTimeout(_)) => break CloseReason::Idle,
                Err(e) => {
                    tracing::debug!(remote = %self.remote, error = %e, "channel read failed");
                    break CloseReason::Disconnected;
                }
            };

            let message = Message::parse(&frame.payload);
            let reply = match self.dispatcher.dispatch(self.remote, message).await {
                Action::Joined(payload) => {
                    self.joined = true;
                    payload
                }
                Action::Reply(payload) => payload,
                Action::Ignore => continue,
                Action::Close(reason) => break reason,
            };

            if let Err(e) = self.channel.send_frame(frame.reply(reply)).await {
                tracing::debug!(remote = %self.remote, error = %e, "channel write failed");
                break CloseReason::Disconnected;
            }
        };

        self.channel.close().await;
        self.state = SessionState::Closed;
        self.dispatcher.events().closed(self.remote, &reason);
        reason
    }

    async fn next_frame(&mut self) -> Result<Option<Frame>> {
        let received = match self.read_timeout {
            Some(limit) => tokio::time::timeout(limit, self.channel.recv_frame())
                .await
                .map_err(|_| ChannelError::ReadTimeout(limit))?,
            None => self.channel.recv_frame().await,
        };
        received.transpose()
    }
}
