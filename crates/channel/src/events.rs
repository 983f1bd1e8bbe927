//! Channel lifecycle events.
//!
//! Sessions report what happens to them through [`ChannelEvents`] instead of
//! formatting log lines inline. [`TracingEvents`] is the production
//! observer: structured `tracing` records plus `metrics` counters.

use corelib::{PeerKey, PeerKeyError};
use metrics::counter;
use std::fmt;
use std::net::SocketAddr;

/// Where a channel came from, for logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Remote {
    Addr(SocketAddr),
    Unknown,
}

impl From<SocketAddr> for Remote {
    fn from(addr: SocketAddr) -> Self {
        Remote::Addr(addr)
    }
}

impl fmt::Display for Remote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Remote::Addr(addr) => write!(f, "{addr}"),
            Remote::Unknown => f.write_str("unknown"),
        }
    }
}

/// Why a session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloseReason {
    /// Peer went away or the transport failed.
    Disconnected,
    /// Read timeout elapsed.
    Idle,
    /// JOIN payload failed validation.
    Rejected(PeerKeyError),
    /// Attestation could not be recorded.
    PersistenceFailed,
}

impl fmt::Display for CloseReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CloseReason::Disconnected => f.write_str("disconnected"),
            CloseReason::Idle => f.write_str("idle timeout"),
            CloseReason::Rejected(e) => write!(f, "join rejected: {e}"),
            CloseReason::PersistenceFailed => f.write_str("attestation not recorded"),
        }
    }
}

/// Observer invoked at defined points of a session's life.
pub trait ChannelEvents: Send + Sync + 'static {
    fn opened(&self, remote: Remote);

    fn closed(&self, remote: Remote, reason: &CloseReason);

    fn join_accepted(&self, remote: Remote, key: &PeerKey, newly_recorded: bool);

    /// JOIN payload rejected. Only the length is passed on; the content
    /// is never logged or echoed.
    fn join_rejected(&self, remote: Remote, error: &PeerKeyError, payload_len: usize);

    fn persistence_failed(&self, remote: Remote, key: &PeerKey, error: &corelib::Error);

    /// A status collaborator could not answer.
    fn status_failed(&self, remote: Remote, tag: &'static str, error: &corelib::Error);

    /// A frame with no handler (CAST or unknown tag).
    fn ignored(&self, remote: Remote, tag: &'static str);
}

/// Default observer: `tracing` + `metrics`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingEvents;

impl ChannelEvents for TracingEvents {
    fn opened(&self, remote: Remote) {
        counter!("channel_sessions_opened_total").increment(1);
        tracing::info!(%remote, "peer channel opened");
    }

    fn closed(&self, remote: Remote, reason: &CloseReason) {
        counter!("channel_sessions_closed_total").increment(1);
        tracing::info!(%remote, %reason, "peer channel closed");
    }

    fn join_accepted(&self, remote: Remote, key: &PeerKey, newly_recorded: bool) {
        counter!("channel_joins_total").increment(1);
        tracing::info!(%remote, peer_key = %key, newly_recorded, "peer joined");
    }

    fn join_rejected(&self, remote: Remote, error: &PeerKeyError, payload_len: usize) {
        counter!("channel_join_rejections_total").increment(1);
        tracing::error!(%remote, %error, payload_len, "rejecting join");
    }

    fn persistence_failed(&self, remote: Remote, key: &PeerKey, error: &corelib::Error) {
        tracing::error!(%remote, peer_key = %key, %error, "failed to record attestation");
    }

    fn status_failed(&self, remote: Remote, tag: &'static str, error: &corelib::Error) {
        tracing::warn!(%remote, tag, %error, "status query failed");
    }

    fn ignored(&self, remote: Remote, tag: &'static str) {
        tracing::debug!(%remote, tag, "ignoring frame without handler");
    }
}
