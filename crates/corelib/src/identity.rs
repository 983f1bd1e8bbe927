//! Coordinator identity.
//!
//! The coordinator holds an Ed25519 keypair and a signature over its own
//! public key (the "signed key"). The signed key is what a joining peer
//! receives as its attestation. Everything here is immutable once built and
//! is shared read-only across sessions.

use crate::error::{Error, Result};
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use rand::rngs::OsRng;
use std::fs;
use std::io::Write;
use std::path::Path;
use zeroize::Zeroizing;

/// File name of the persisted private key inside the config directory.
pub const IDENTITY_KEY_FILE: &str = "identity.key";

/// The coordinator's keypair plus its pre-computed self-signature.
#[derive(Clone)]
pub struct Identity {
    signing_key: SigningKey,
    self_signature: Signature,
}

impl Identity {
    /// Generate a fresh random identity.
    pub fn generate() -> Self {
        Self::from_signing_key(SigningKey::generate(&mut OsRng))
    }

    /// Build an identity from an existing signing key.
    pub fn from_signing_key(signing_key: SigningKey) -> Self {
        let public = signing_key.verifying_key().to_bytes();
        let self_signature = signing_key.sign(&public);
        Self {
            signing_key,
            self_signature,
        }
    }

    /// Load the identity from `path`, or generate one and persist it there.
    pub fn load_or_generate(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            let identity = Self::generate();
            identity.save(path)?;
            tracing::info!(path = %path.display(), "generated new coordinator identity");
            Ok(identity)
        }
    }

    /// Load a 32-byte raw private key file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = Zeroizing::new(fs::read(path).map_err(|e| Error::io(path, e))?);
        if bytes.len() != 32 {
            return Err(Error::InvalidIdentityKey(bytes.len()));
        }
        let mut key_bytes = Zeroizing::new([0u8; 32]);
        key_bytes.copy_from_slice(&bytes);
        Ok(Self::from_signing_key(SigningKey::from_bytes(&key_bytes)))
    }

    /// Persist the private key, creating parent directories as needed.
    ///
    /// On unix the file is owner read/write only.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }
        let mut options = fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        let mut file = options.open(path).map_err(|e| Error::io(path, e))?;
        // `mode` only applies on creation; tighten a pre-existing file too.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.set_permissions(fs::Permissions::from_mode(0o600))
                .map_err(|e| Error::io(path, e))?;
        }
        file.write_all(self.signing_key.as_bytes())
            .map_err(|e| Error::io(path, e))?;
        Ok(())
    }

    pub fn verifying_key(&self) -> VerifyingKey {
        self.signing_key.verifying_key()
    }

    /// Raw public key bytes.
    pub fn public_key(&self) -> [u8; 32] {
        self.verifying_key().to_bytes()
    }

    /// Raw bytes of the signature over our own public key.
    ///
    /// This is the on-disk content of every attestation record.
    pub fn signed_key(&self) -> [u8; 64] {
        self.self_signature.to_bytes()
    }

    /// Lowercase hex of [`Identity::signed_key`], as sent on the wire.
    pub fn signed_key_hex(&self) -> String {
        hex::encode(self.signed_key())
    }

    /// Check that the self-signature verifies against our public key.
    pub fn verify_self_signature(&self) -> bool {
        self.verifying_key()
            .verify(&self.public_key(), &self.self_signature)
            .is_ok()
    }
}

impl std::fmt::Debug for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Identity")
            .field("public_key", &hex::encode(self.public_key()))
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_self_signature_verifies() {
        let identity = Identity::generate();
        assert!(identity.verify_self_signature());
        assert_eq!(identity.signed_key_hex().len(), 128);
    }

    #[test]
    fn test_signed_key_is_deterministic_for_a_key() {
        let key = SigningKey::from_bytes(&[7u8; 32]);
        let a = Identity::from_signing_key(key.clone());
        let b = Identity::from_signing_key(key);
        assert_eq!(a.signed_key(), b.signed_key());
    }

    #[test]
    fn test_load_or_generate_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(IDENTITY_KEY_FILE);

        let first = Identity::load_or_generate(&path).unwrap();
        let second = Identity::load_or_generate(&path).unwrap();
        assert_eq!(first.public_key(), second.public_key());
        assert_eq!(first.signed_key(), second.signed_key());
    }

    #[cfg(unix)]
    #[test]
    fn test_key_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(IDENTITY_KEY_FILE);
        Identity::load_or_generate(&path).unwrap();
        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o077, 0, "identity key mode {:o}", mode & 0o777);

        // Saving over a loose file tightens it
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644)).unwrap();
        Identity::generate().save(&path).unwrap();
        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_load_rejects_truncated_key() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(IDENTITY_KEY_FILE);
        std::fs::write(&path, [1u8; 10]).unwrap();

        match Identity::load(&path) {
            Err(Error::InvalidIdentityKey(10)) => {}
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
