//! Tests for peer keys and the attestation ledger.
//!
//! # Test Strategy
//!
//! 1. **Key validation**: length and charset properties over arbitrary input
//! 2. **Idempotence**: repeated records for one key never overwrite
//! 3. **Concurrency**: distinct keys and same-key races across tasks

use corelib::identity::Identity;
use corelib::ledger::{AttestationLedger, FileLedger, MemoryLedger, RecordOutcome};
use corelib::{PeerKey, PeerKeyError};
use proptest::prelude::*;
use std::sync::Arc;

fn key_from_index(i: usize) -> PeerKey {
    format!("{:064x}", i).parse().unwrap()
}

// ============================================================================
// Key Validation Properties
// ============================================================================

proptest! {
    #[test]
    fn prop_lowercase_hex_of_len_64_is_accepted(s in "[a-f0-9]{64}") {
        let key = PeerKey::parse(s.as_bytes()).unwrap();
        prop_assert_eq!(key.as_str(), s.as_str());
    }

    #[test]
    fn prop_wrong_length_is_rejected(bytes in proptest::collection::vec(any::<u8>(), 0..200)) {
        prop_assume!(bytes.len() != 64);
        prop_assert_eq!(PeerKey::parse(&bytes), Err(PeerKeyError::WrongLength(bytes.len())));
    }

    #[test]
    fn prop_non_hex_byte_is_rejected(
        s in "[a-f0-9]{64}",
        pos in 0usize..64,
        bad in any::<u8>().prop_filter("non-hex", |b| !matches!(*b, b'a'..=b'f' | b'0'..=b'9')),
    ) {
        let mut bytes = s.into_bytes();
        bytes[pos] = bad;
        prop_assert_eq!(PeerKey::parse(&bytes), Err(PeerKeyError::IllegalCharacters));
    }
}

// ============================================================================
// Idempotence Tests
// ============================================================================

#[tokio::test]
async fn test_repeat_record_keeps_first_contents() {
    let dir = tempfile::tempdir().unwrap();
    let ledger = FileLedger::open(dir.path()).await.unwrap();
    let identity = Identity::generate();
    let key = key_from_index(42);

    ledger.record_if_absent(&key, &identity.signed_key()).await.unwrap();
    let after_first = std::fs::read(ledger.record_path(&key)).unwrap();

    // A different coordinator signature must not replace the stored one
    let other = Identity::generate();
    let outcome = ledger.record_if_absent(&key, &other.signed_key()).await.unwrap();
    assert_eq!(outcome, RecordOutcome::AlreadyPresent);

    let after_second = std::fs::read(ledger.record_path(&key)).unwrap();
    assert_eq!(after_first, after_second);
    assert_eq!(after_first, identity.signed_key().to_vec(), "stored raw, not hex");
}

// ============================================================================
// Concurrency Tests
// ============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_distinct_keys_each_get_one_record() {
    let dir = tempfile::tempdir().unwrap();
    let ledger = Arc::new(FileLedger::open(dir.path()).await.unwrap());
    let attestation = Identity::generate().signed_key();

    let mut handles = Vec::new();
    for i in 0..64 {
        let ledger = Arc::clone(&ledger);
        handles.push(tokio::spawn(async move {
            ledger.record_if_absent(&key_from_index(i), &attestation).await
        }));
    }
    for handle in handles {
        assert_eq!(handle.await.unwrap().unwrap(), RecordOutcome::Created);
    }

    let files = std::fs::read_dir(dir.path()).unwrap().count();
    assert_eq!(files, 64);
    for i in 0..64 {
        let stored = ledger.attestation(&key_from_index(i)).await.unwrap();
        assert_eq!(stored.as_deref(), Some(&attestation[..]));
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_same_key_creates_exactly_once() {
    let dir = tempfile::tempdir().unwrap();
    let file_ledger: Arc<dyn AttestationLedger> = Arc::new(FileLedger::open(dir.path()).await.unwrap());
    let memory_ledger: Arc<dyn AttestationLedger> = Arc::new(MemoryLedger::new());

    for ledger in [file_ledger, memory_ledger] {
        let key = key_from_index(7);
        let mut handles = Vec::new();
        for i in 0..32u8 {
            let ledger = Arc::clone(&ledger);
            let key = key.clone();
            handles.push(tokio::spawn(async move {
                ledger.record_if_absent(&key, &[i; 64]).await
            }));
        }

        let mut created = 0;
        for handle in handles {
            if handle.await.unwrap().unwrap() == RecordOutcome::Created {
                created += 1;
            }
        }
        assert_eq!(created, 1, "{} created more than one record", ledger.name());

        let stored = ledger.attestation(&key).await.unwrap().unwrap();
        assert_eq!(stored.len(), 64);
        assert!(stored.iter().all(|b| *b == stored[0]), "record must not be interleaved");
    }

    // Only the finished record remains; no scratch files from the losers
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
}
