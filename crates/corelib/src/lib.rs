//! Core library for the karai coordinator.
//!
//! This crate provides the domain pieces the peer channel is built on:
//! - Peer keys and their validation
//! - The coordinator identity and its self-signature
//! - The peer attestation ledger
//! - Status collaborators (peer identity, transaction listing)
//! - The coordinator configuration value

pub mod config;
pub mod error;
pub mod identity;
pub mod ledger;
pub mod peer_key;
pub mod status;

pub use config::CoordinatorConfig;
pub use error::{Error, PeerKeyError, Result};
pub use identity::Identity;
pub use ledger::{AttestationLedger, FileLedger, MemoryLedger, RecordOutcome};
pub use peer_key::PeerKey;
pub use status::{FsStatus, StatusSource};
