//! Peer attestation ledger.
//!
//! Maps a peer key to the coordinator's attestation for it. Records are
//! append-only by key: the first successful JOIN for a key creates the
//! record, later JOINs leave it untouched, and nothing here deletes one.
//!
//! Creation is a single create-if-absent step, never a check followed by a
//! create, so two sessions joining with the same key at the same moment
//! still produce exactly one record. A record never becomes visible before
//! its contents are complete, so `AlreadyPresent` always means stored.

use crate::error::{Error, Result};
use crate::peer_key::PeerKey;
use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::io::AsyncWriteExt;

/// File suffix of an on-disk attestation record.
pub const ATTESTATION_SUFFIX: &str = "pubkey";

const STAGING_SUFFIX: &str = ".tmp";

/// Result of [`AttestationLedger::record_if_absent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    /// This call created the record.
    Created,
    /// A record already existed and was left as is.
    AlreadyPresent,
}

/// Storage for attestation records.
///
/// Implementations must be safe to share across sessions and must make
/// `record_if_absent` atomic per key.
#[async_trait]
pub trait AttestationLedger: Send + Sync + 'static {
    /// Store `attestation` for `key` unless a record already exists.
    async fn record_if_absent(&self, key: &PeerKey, attestation: &[u8]) -> Result<RecordOutcome>;

    /// Read back the stored attestation, if any.
    async fn attestation(&self, key: &PeerKey) -> Result<Option<Vec<u8>>>;

    /// Backend name for logging.
    fn name(&self) -> &'static str;
}

/// One file per peer under a directory, named `<hex key>.pubkey`.
///
/// File contents are the raw attestation bytes, not hex.
#[derive(Debug, Clone)]
pub struct FileLedger {
    dir: PathBuf,
}

impl FileLedger {
    /// Open the ledger, creating `dir` if it does not exist.
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| Error::io(&dir, e))?;
        Ok(Self { dir })
    }

    /// Path of the record for `key`.
    pub fn record_path(&self, key: &PeerKey) -> PathBuf {
        self.dir
            .join(format!("{}.{}", key.as_str(), ATTESTATION_SUFFIX))
    }

    /// Unique scratch file for one write attempt on `key`.
    fn staging_path(&self, key: &PeerKey) -> PathBuf {
        static NEXT: AtomicU64 = AtomicU64::new(0);
        let n = NEXT.fetch_add(1, Ordering::Relaxed);
        self.dir
            .join(format!(".{}.{}-{}{}", key.as_str(), std::process::id(), n, STAGING_SUFFIX))
    }
}

async fn write_synced(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = tokio::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .await?;
    file.write_all(bytes).await?;
    file.sync_all().await
}

async fn discard(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        if e.kind() != ErrorKind::NotFound {
            tracing::warn!(path = %path.display(), error = %e, "failed to remove staged attestation");
        }
    }
}

#[async_trait]
impl AttestationLedger for FileLedger {
    async fn record_if_absent(&self, key: &PeerKey, attestation: &[u8]) -> Result<RecordOutcome> {
        let path = self.record_path(key);
        if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            return Ok(RecordOutcome::AlreadyPresent);
        }

        // Stage the full record, then link it into place. The link fails if
        // the name exists, so a record is only ever visible once complete.
        let staging = self.staging_path(key);
        if let Err(e) = write_synced(&staging, attestation).await {
            discard(&staging).await;
            return Err(Error::io(&staging, e));
        }

        let linked = tokio::fs::hard_link(&staging, &path).await;
        discard(&staging).await;
        match linked {
            Ok(()) => Ok(RecordOutcome::Created),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => Ok(RecordOutcome::AlreadyPresent),
            Err(e) => Err(Error::io(&path, e)),
        }
    }

    async fn attestation(&self, key: &PeerKey) -> Result<Option<Vec<u8>>> {
        let path = self.record_path(key);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::io(&path, e)),
        }
    }

    fn name(&self) -> &'static str {
        "FileLedger"
    }
}

/// In-memory ledger with the same first-writer-wins semantics.
#[derive(Debug, Default)]
pub struct MemoryLedger {
    records: DashMap<PeerKey, Vec<u8>>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl AttestationLedger for MemoryLedger {
    async fn record_if_absent(&self, key: &PeerKey, attestation: &[u8]) -> Result<RecordOutcome> {
        match self.records.entry(key.clone()) {
            Entry::Occupied(_) => Ok(RecordOutcome::AlreadyPresent),
            Entry::Vacant(slot) => {
                slot.insert(attestation.to_vec());
                Ok(RecordOutcome::Created)
            }
        }
    }

    async fn attestation(&self, key: &PeerKey) -> Result<Option<Vec<u8>>> {
        Ok(self.records.get(key).map(|r| r.value().clone()))
    }

    fn name(&self) -> &'static str {
        "MemoryLedger"
    }
}
