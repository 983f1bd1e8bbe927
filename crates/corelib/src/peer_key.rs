//! Peer key abstraction.
//!
//! A `PeerKey` is a peer's 32-byte public key in its canonical wire form: a
//! 64-character lowercase hex string. It is the unit of identity for the join
//! handshake and the file name of the peer's attestation record.

use crate::error::PeerKeyError;
use regex::bytes::Regex;
use std::fmt;
use std::sync::OnceLock;

/// Length of the canonical hex form.
pub const PEER_KEY_HEX_LEN: usize = 64;

fn peer_key_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[a-f0-9]{64}$").expect("static peer key pattern"))
}

/// Validated peer public key.
///
/// Construction goes through [`PeerKey::parse`], so every value satisfies
/// `^[a-f0-9]{64}$`.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct PeerKey(String);

impl PeerKey {
    /// Validate a candidate payload.
    ///
    /// The length is checked before the content so callers can tell the two
    /// rejection reasons apart.
    pub fn parse(candidate: &[u8]) -> Result<Self, PeerKeyError> {
        if candidate.len() != PEER_KEY_HEX_LEN {
            return Err(PeerKeyError::WrongLength(candidate.len()));
        }
        if !peer_key_pattern().is_match(candidate) {
            return Err(PeerKeyError::IllegalCharacters);
        }
        // The pattern only admits ASCII.
        let hex = String::from_utf8_lossy(candidate).into_owned();
        Ok(PeerKey(hex))
    }

    /// Canonical hex representation.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PeerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for PeerKey {
    type Err = PeerKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s.as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_lowercase_hex() {
        let key = PeerKey::parse(&[b'a'; 64]).unwrap();
        assert_eq!(key.as_str(), "a".repeat(64));
        assert_eq!(key.to_string(), key.as_str());
    }

    #[test]
    fn test_rejects_wrong_length() {
        assert_eq!(PeerKey::parse(b"short"), Err(PeerKeyError::WrongLength(5)));
        assert_eq!(
            PeerKey::parse(&[b'0'; 65]),
            Err(PeerKeyError::WrongLength(65))
        );
    }

    #[test]
    fn test_rejects_uppercase_and_non_hex() {
        let upper = "A".repeat(64);
        assert_eq!(
            PeerKey::parse(upper.as_bytes()),
            Err(PeerKeyError::IllegalCharacters)
        );

        let mut mixed = "0".repeat(63);
        mixed.push('g');
        assert_eq!(
            mixed.parse::<PeerKey>(),
            Err(PeerKeyError::IllegalCharacters)
        );
    }

    #[test]
    fn test_rejects_trailing_newline_inside_length() {
        let mut with_newline = "f".repeat(63);
        with_newline.push('\n');
        assert_eq!(
            PeerKey::parse(with_newline.as_bytes()),
            Err(PeerKeyError::IllegalCharacters)
        );
    }
}
