//! Signing capability used by the transaction protocol.
//!
//! The protocol only needs a public key and the ability to sign bytes, so it
//! talks to a [`Signer`] rather than to key material directly. Hardware or
//! remote signers can implement the same trait.

use crate::crypto::ed25519::{KeyPair, KEY_LENGTH, SIGNATURE_LENGTH};
use crate::error::{Result, SdkError};
use async_trait::async_trait;
use subtle::ConstantTimeEq;

/// Something that can sign on behalf of one or more Ed25519 keys.
#[async_trait]
pub trait Signer: Send + Sync {
    /// The public key this signer signs with by default.
    async fn public_key(&self) -> Result<[u8; KEY_LENGTH]>;

    /// Sign `message` with the default key.
    async fn sign(&self, message: &[u8]) -> Result<[u8; SIGNATURE_LENGTH]>;

    /// Sign `message` with the key matching `public_key`.
    async fn sign_for(
        &self,
        message: &[u8],
        public_key: &[u8; KEY_LENGTH],
    ) -> Result<[u8; SIGNATURE_LENGTH]>;
}

/// A signer backed by a single in-memory key pair.
#[derive(Debug, Clone)]
pub struct KeyPairSigner {
    key_pair: KeyPair,
}

impl KeyPairSigner {
    pub fn new(key_pair: KeyPair) -> Self {
        Self { key_pair }
    }

    pub fn key_pair(&self) -> &KeyPair {
        &self.key_pair
    }

    fn holds(&self, public_key: &[u8; KEY_LENGTH]) -> bool {
        let held = self.key_pair.public_hex();
        let requested = hex::encode(public_key);
        held.as_bytes().ct_eq(requested.as_bytes()).into()
    }
}

#[async_trait]
impl Signer for KeyPairSigner {
    async fn public_key(&self) -> Result<[u8; KEY_LENGTH]> {
        Ok(self.key_pair.public_bytes())
    }

    async fn sign(&self, message: &[u8]) -> Result<[u8; SIGNATURE_LENGTH]> {
        Ok(self.key_pair.sign(message))
    }

    async fn sign_for(
        &self,
        message: &[u8],
        public_key: &[u8; KEY_LENGTH],
    ) -> Result<[u8; SIGNATURE_LENGTH]> {
        if !self.holds(public_key) {
            return Err(SdkError::KeyMismatch {
                requested: hex::encode(public_key),
                held: self.key_pair.public_hex(),
            });
        }
        Ok(self.key_pair.sign(message))
    }
}
