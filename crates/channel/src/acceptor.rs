//! Channel acceptor.
//!
//! Upgrades an inbound HTTP request to a WebSocket and starts exactly one
//! [`Session`] on it. Every origin is accepted: the JOIN handshake, not the
//! upgrade, is the trust boundary. A failed upgrade is dropped without a
//! session or an event.

use crate::dispatch::Dispatcher;
use crate::error::{ChannelError, Result};
use crate::events::{CloseReason, Remote};
use crate::protocol::{Frame, FrameKind};
use crate::session::{FrameChannel, Session};
use async_trait::async_trait;
use axum::extract::ws::{Message as WsMessage, WebSocket, WebSocketUpgrade};
use axum::extract::{ConnectInfo, State};
use axum::response::Response;
use std::net::SocketAddr;
use std::time::Duration;

/// [`FrameChannel`] over an axum WebSocket.
pub struct WsChannel {
    socket: WebSocket,
}

impl WsChannel {
    pub fn new(socket: WebSocket) -> Self {
        Self { socket }
    }
}

#[async_trait]
impl FrameChannel for WsChannel {
    async fn recv_frame(&mut self) -> Option<Result<Frame>> {
        loop {
            let msg = match self.socket.recv().await? {
                Ok(msg) => msg,
                Err(e) => return Some(Err(ChannelError::Transport(e.to_string()))),
            };
            match msg {
                WsMessage::Text(text) => return Some(Ok(Frame::text(text))),
                WsMessage::Binary(bytes) => return Some(Ok(Frame::binary(bytes))),
                WsMessage::Close(_) => return None,
                // Pongs are queued by the socket itself.
                WsMessage::Ping(_) | WsMessage::Pong(_) => continue,
            }
        }
    }

    async fn send_frame(&mut self, frame: Frame) -> Result<()> {
        let msg = match frame.kind {
            FrameKind::Binary => WsMessage::Binary(frame.payload),
            FrameKind::Text => WsMessage::Text(
                String::from_utf8(frame.payload)
                    .unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned()),
            ),
        };
        self.socket
            .send(msg)
            .await
            .map_err(|e| ChannelError::Transport(e.to_string()))
    }

    async fn close(&mut self) {
        let _ = self.socket.send(WsMessage::Close(None)).await;
    }
}

/// Hands accepted channels to new sessions.
#[derive(Clone)]
pub struct ChannelAcceptor {
    dispatcher: Dispatcher,
    read_timeout: Option<Duration>,
}

impl ChannelAcceptor {
    pub fn new(dispatcher: Dispatcher, read_timeout: Option<Duration>) -> Self {
        Self {
            dispatcher,
            read_timeout,
        }
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Run one session on `channel` to completion.
    pub async fn accept<C: FrameChannel>(&self, channel: C, remote: Remote) -> CloseReason {
        self.dispatcher.events().opened(remote);
        Session::new(channel, remote, self.dispatcher.clone())
            .with_read_timeout(self.read_timeout)
            .run()
            .await
    }
}

/// `GET /api/v1/channel`
pub async fn channel_upgrade(
    ws: WebSocketUpgrade,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    State(acceptor): State<ChannelAcceptor>,
) -> Response {
    ws.on_failed_upgrade(|_: axum::Error| {})
        .on_upgrade(move |socket| async move {
            acceptor.accept(WsChannel::new(socket), Remote::from(addr)).await;
        })
}
