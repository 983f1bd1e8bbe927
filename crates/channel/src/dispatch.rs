//! Message dispatcher.
//!
//! Maps one classified [`Message`] to the [`Action`] its session should
//! take. Reads the identity, writes the ledger, and queries the status
//! collaborators; never touches the channel itself.

use crate::events::{ChannelEvents, CloseReason, Remote};
use crate::protocol::Message;
use corelib::{AttestationLedger, Identity, PeerKey, RecordOutcome, StatusSource};
use std::sync::Arc;

/// What a session does after a frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Successful JOIN; write the attestation hex back.
    Joined(Vec<u8>),
    /// Write this payload back.
    Reply(Vec<u8>),
    /// Send nothing and keep reading.
    Ignore,
    /// Close the channel without a response.
    Close(CloseReason),
}

/// Shared, read-only dispatch context. Cheap to clone.
#[derive(Clone)]
pub struct Dispatcher {
    identity: Arc<Identity>,
    ledger: Arc<dyn AttestationLedger>,
    status: Arc<dyn StatusSource>,
    events: Arc<dyn ChannelEvents>,
}

impl Dispatcher {
    pub fn new(
        identity: Arc<Identity>,
        ledger: Arc<dyn AttestationLedger>,
        status: Arc<dyn StatusSource>,
        events: Arc<dyn ChannelEvents>,
    ) -> Self {
        Self {
            identity,
            ledger,
            status,
            events,
        }
    }

    pub fn events(&self) -> &Arc<dyn ChannelEvents> {
        &self.events
    }

    pub fn status(&self) -> &Arc<dyn StatusSource> {
        &self.status
    }

    pub async fn dispatch(&self, remote: Remote, message: Message) -> Action {
        match message {
            Message::Join(candidate) => self.join(remote, &candidate).await,
            Message::Version => Action::Reply(self.status.version().as_bytes().to_vec()),
            Message::Peer => match self.status.peer_id().await {
                Ok(id) => Action::Reply(id.into_bytes()),
                Err(e) => {
                    self.events.status_failed(remote, "PEER", &e);
                    Action::Ignore
                }
            },
            Message::Transactions => match self.status.transactions().await {
                Ok(txs) => Action::Reply(txs.into_bytes()),
                Err(e) => {
                    self.events.status_failed(remote, "TRANSACTIONS", &e);
                    Action::Ignore
                }
            },
            // TODO: route CAST payloads once the broadcast pipeline exists.
            msg @ (Message::Cast(_) | Message::Unknown) => {
                self.events.ignored(remote, msg.tag());
                Action::Ignore
            }
        }
    }

    /// Validate the key, record the attestation, then answer with its hex.
    ///
    /// The record is written before the answer so a peer never holds an
    /// attestation that was not stored.
    async fn join(&self, remote: Remote, candidate: &[u8]) -> Action {
        let key = match PeerKey::parse(candidate) {
            Ok(key) => key,
            Err(e) => {
                self.events.join_rejected(remote, &e, candidate.len());
                return Action::Close(CloseReason::Rejected(e));
            }
        };

        let outcome = match self
            .ledger
            .record_if_absent(&key, &self.identity.signed_key())
            .await
        {
            Ok(outcome) => outcome,
            Err(e) => {
                self.events.persistence_failed(remote, &key, &e);
                return Action::Close(CloseReason::PersistenceFailed);
            }
        };

        self.events
            .join_accepted(remote, &key, outcome == RecordOutcome::Created);
        Action::Joined(self.identity.signed_key_hex().into_bytes())
    }
}
