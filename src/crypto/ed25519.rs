//! Ed25519 key operations.
//!
//! Convex accounts are controlled by Ed25519 keys: a 32-byte private seed and
//! the 32-byte public key derived from it.

use crate::error::{Result, SdkError};
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use rand::rngs::OsRng;
use std::fmt;

/// Length of both the private seed and the public key.
pub const KEY_LENGTH: usize = 32;

/// Length of a detached signature.
pub const SIGNATURE_LENGTH: usize = 64;

/// An Ed25519 key pair. Immutable once constructed.
#[derive(Clone)]
pub struct KeyPair {
    secret: SigningKey,
    public: VerifyingKey,
}

impl KeyPair {
    fn from_secret(secret: SigningKey) -> Self {
        let public = secret.verifying_key();
        Self { secret, public }
    }

    /// Generate a new key pair from the operating system's CSPRNG.
    ///
    /// # Example
    ///
    /// ```
    /// use convex_sdk::crypto::ed25519::KeyPair;
    ///
    /// let key_pair = KeyPair::generate();
    /// assert_eq!(key_pair.public_bytes().len(), 32);
    /// ```
    pub fn generate() -> Self {
        Self::from_secret(SigningKey::generate(&mut OsRng))
    }

    /// Derive a key pair from a 32-byte seed. Deterministic.
    pub fn from_seed(seed: &[u8]) -> Result<Self> {
        let bytes = to_key_array(seed, "private seed")?;
        Ok(Self::from_secret(SigningKey::from_bytes(&bytes)))
    }

    /// Rebuild a key pair from stored private and public bytes.
    ///
    /// Fails if either part is not 32 bytes or the public key does not
    /// belong to the private seed.
    pub fn from_parts(private: &[u8], public: &[u8]) -> Result<Self> {
        let key_pair = Self::from_seed(private)?;
        let public = to_key_array(public, "public key")?;
        if key_pair.public_bytes() != public {
            return Err(SdkError::InvalidKey(
                "Public key does not match private seed".to_string(),
            ));
        }
        Ok(key_pair)
    }

    /// Import a key pair from a hex-encoded seed, with or without `0x`.
    pub fn from_hex(seed_hex: &str) -> Result<Self> {
        let bytes = decode_hex(seed_hex)?;
        Self::from_seed(&bytes)
    }

    /// Get the public key as bytes.
    pub fn public_bytes(&self) -> [u8; KEY_LENGTH] {
        self.public.to_bytes()
    }

    /// Get the private seed as bytes.
    pub fn private_bytes(&self) -> [u8; KEY_LENGTH] {
        self.secret.to_bytes()
    }

    /// Lowercase hex of the public key.
    pub fn public_hex(&self) -> String {
        hex::encode(self.public_bytes())
    }

    /// Sign a message.
    pub fn sign(&self, message: &[u8]) -> [u8; SIGNATURE_LENGTH] {
        self.secret.sign(message).to_bytes()
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("public", &self.public_hex())
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

impl PartialEq for KeyPair {
    fn eq(&self, other: &Self) -> bool {
        self.secret.to_bytes() == other.secret.to_bytes()
    }
}

impl Eq for KeyPair {}

/// Verify a detached signature against a public key.
///
/// Returns `false` for malformed keys or signatures as well as for
/// signatures that do not verify.
pub fn verify(message: &[u8], signature: &[u8], public_key: &[u8]) -> bool {
    let Ok(public) = to_key_array(public_key, "public key") else {
        return false;
    };
    let Ok(verifying_key) = VerifyingKey::from_bytes(&public) else {
        return false;
    };
    let Ok(signature) = Signature::from_slice(signature) else {
        return false;
    };
    verifying_key.verify(message, &signature).is_ok()
}

/// Decode hex with an optional `0x` prefix.
pub fn decode_hex(input: &str) -> Result<Vec<u8>> {
    let stripped = input
        .strip_prefix("0x")
        .or_else(|| input.strip_prefix("0X"))
        .unwrap_or(input);
    hex::decode(stripped).map_err(|e| SdkError::InvalidKey(format!("Invalid hex string: {}", e)))
}

fn to_key_array(bytes: &[u8], what: &str) -> Result<[u8; KEY_LENGTH]> {
    <[u8; KEY_LENGTH]>::try_from(bytes).map_err(|_| {
        SdkError::InvalidKey(format!(
            "Expected {} bytes for Ed25519 {}, got {}",
            KEY_LENGTH,
            what,
            bytes.len()
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_produces_valid_keys() {
        let key_pair = KeyPair::generate();

        assert_eq!(key_pair.public_bytes().len(), KEY_LENGTH);
        assert_eq!(key_pair.private_bytes().len(), KEY_LENGTH);

        let derived = KeyPair::from_seed(&key_pair.private_bytes()).unwrap();
        assert_eq!(derived.public_bytes(), key_pair.public_bytes());
    }

    #[test]
    fn test_generate_produces_different_keys() {
        let key_pair1 = KeyPair::generate();
        let key_pair2 = KeyPair::generate();

        assert_ne!(key_pair1.public_bytes(), key_pair2.public_bytes());
    }

    #[test]
    fn test_from_seed_is_deterministic() {
        let seed = [7u8; 32];
        let a = KeyPair::from_seed(&seed).unwrap();
        let b = KeyPair::from_seed(&seed).unwrap();
        assert_eq!(a.public_bytes(), b.public_bytes());
    }

    #[test]
    fn test_from_seed_invalid_length() {
        match KeyPair::from_seed(&[0u8; 16]) {
            Err(SdkError::InvalidKey(msg)) => assert!(msg.contains("Expected 32 bytes")),
            other => panic!("Expected InvalidKey, got {:?}", other),
        }
    }

    #[test]
    fn test_from_parts_checks_lengths_and_consistency() {
        let key_pair = KeyPair::generate();
        let rebuilt =
            KeyPair::from_parts(&key_pair.private_bytes(), &key_pair.public_bytes()).unwrap();
        assert_eq!(rebuilt, key_pair);

        assert!(KeyPair::from_parts(&key_pair.private_bytes(), &[0u8; 31]).is_err());
        assert!(KeyPair::from_parts(&[0u8; 33], &key_pair.public_bytes()).is_err());

        let other = KeyPair::generate();
        assert!(KeyPair::from_parts(&key_pair.private_bytes(), &other.public_bytes()).is_err());
    }

    #[test]
    fn test_from_hex() {
        let key_pair = KeyPair::generate();
        let imported = KeyPair::from_hex(&format!("0x{}", hex::encode(key_pair.private_bytes())))
            .unwrap();
        assert_eq!(imported.public_bytes(), key_pair.public_bytes());

        assert!(KeyPair::from_hex("not-valid-hex").is_err());
    }

    #[test]
    fn test_sign_and_verify() {
        let key_pair = KeyPair::generate();
        let message = b"transaction hash";

        let signature = key_pair.sign(message);
        assert!(verify(message, &signature, &key_pair.public_bytes()));
    }

    #[test]
    fn test_verify_detects_tampering() {
        let key_pair = KeyPair::generate();
        let message = b"transaction hash".to_vec();
        let signature = key_pair.sign(&message);

        for i in 0..SIGNATURE_LENGTH {
            let mut bad = signature;
            bad[i] ^= 0x01;
            assert!(!verify(&message, &bad, &key_pair.public_bytes()));
        }

        for i in 0..message.len() {
            let mut bad = message.clone();
            bad[i] ^= 0x01;
            assert!(!verify(&bad, &signature, &key_pair.public_bytes()));
        }

        let other = KeyPair::generate();
        assert!(!verify(&message, &signature, &other.public_bytes()));
    }

    #[test]
    fn test_debug_redacts_secret() {
        let key_pair = KeyPair::generate();
        let printed = format!("{:?}", key_pair);
        assert!(printed.contains("REDACTED"));
        assert!(!printed.contains(&hex::encode(key_pair.private_bytes())));
    }
}
