//! Frame and message types for the peer channel.
//!
//! A frame is classified exactly once into a [`Message`] by testing its
//! opening bytes against fixed ASCII tags:
//!
//! ```text
//! JOIN <64 hex chars>
//! VERSION
//! PEER
//! TRANSACTIONS
//! CAST <payload>
//! ```
//!
//! Tags are matched as prefixes in the order JOIN, VERSION, PEER,
//! TRANSACTIONS, CAST. Anything else is [`Message::Unknown`].

/// Whether a frame travelled as text or binary.
///
/// Responses reuse the kind of the frame they answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    Text,
    Binary,
}

/// One discrete message unit read from or written to a channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub kind: FrameKind,
    pub payload: Vec<u8>,
}

impl Frame {
    pub fn text(payload: impl Into<String>) -> Self {
        Self {
            kind: FrameKind::Text,
            payload: payload.into().into_bytes(),
        }
    }

    pub fn binary(payload: impl Into<Vec<u8>>) -> Self {
        Self {
            kind: FrameKind::Binary,
            payload: payload.into(),
        }
    }

    /// A response frame of the same kind as `self`.
    pub fn reply(&self, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            kind: self.kind,
            payload: payload.into(),
        }
    }
}

pub const JOIN_TAG: &[u8] = b"JOIN";
pub const VERSION_TAG: &[u8] = b"VERSION";
pub const PEER_TAG: &[u8] = b"PEER";
pub const TRANSACTIONS_TAG: &[u8] = b"TRANSACTIONS";
pub const CAST_TAG: &[u8] = b"CAST";

/// Literal token stripped from a JOIN frame ahead of the key.
const JOIN_PREFIX: &[u8] = b"JOIN ";
const CAST_PREFIX: &[u8] = b"CAST ";

/// A classified frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    /// Join request; carries the candidate key, not yet validated.
    Join(Vec<u8>),
    /// Recognized but has no handler.
    Cast(Vec<u8>),
    Version,
    Peer,
    Transactions,
    Unknown,
}

impl Message {
    /// Classify raw frame bytes.
    pub fn parse(frame: &[u8]) -> Self {
        if frame.starts_with(JOIN_TAG) {
            Message::Join(join_payload(frame).to_vec())
        } else if frame.starts_with(VERSION_TAG) {
            Message::Version
        } else if frame.starts_with(PEER_TAG) {
            Message::Peer
        } else if frame.starts_with(TRANSACTIONS_TAG) {
            Message::Transactions
        } else if frame.starts_with(CAST_TAG) {
            let body = frame.strip_prefix(CAST_PREFIX).unwrap_or(&frame[CAST_TAG.len()..]);
            Message::Cast(body.to_vec())
        } else {
            Message::Unknown
        }
    }

    /// Short tag for logs.
    pub fn tag(&self) -> &'static str {
        match self {
            Message::Join(_) => "JOIN",
            Message::Cast(_) => "CAST",
            Message::Version => "VERSION",
            Message::Peer => "PEER",
            Message::Transactions => "TRANSACTIONS",
            Message::Unknown => "UNKNOWN",
        }
    }
}

/// Candidate key carried by a JOIN frame.
///
/// Strips one trailing newline, then the literal `"JOIN "` token. Only the
/// literal token is removed: a key that itself begins with `J`, `O`, `I`,
/// `N` or a space keeps those bytes. Without the space, everything after
/// `JOIN` is the candidate.
fn join_payload(frame: &[u8]) -> &[u8] {
    let frame = frame.strip_suffix(b"\n").unwrap_or(frame);
    frame
        .strip_prefix(JOIN_PREFIX)
        .unwrap_or(&frame[JOIN_TAG.len()..])
}
