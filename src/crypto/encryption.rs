//! Key encryption and decryption using AES-GCM.
//!
//! Private keys are sealed with AES-256-GCM under a key derived from the
//! user's password with PBKDF2. Salt, IV and iteration count travel with the
//! ciphertext so the same key can be derived again on decryption.

use crate::crypto::password::{derive_key, generate_salt, SALT_LENGTH};
use crate::error::{Result, SdkError};
use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use rand::RngCore;

/// The length of the IV used for AES-GCM encryption.
pub const IV_LENGTH: usize = 12;

/// Ciphertext plus everything needed to decrypt it except the password.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedKey {
    pub salt: [u8; SALT_LENGTH],
    pub iv: [u8; IV_LENGTH],
    pub ciphertext: Vec<u8>,
    pub iterations: u32,
}

/// Encrypt a private key using a password.
///
/// A fresh salt and IV are drawn for every call.
///
/// # Example
///
/// ```
/// use convex_sdk::crypto::encryption::{encrypt_private_key, decrypt_private_key};
///
/// let key = [9u8; 32];
/// let encrypted = encrypt_private_key(&key, "secure-password", 1_000).unwrap();
/// let decrypted = decrypt_private_key(&encrypted, "secure-password").unwrap();
///
/// assert_eq!(key.as_slice(), decrypted.as_slice());
/// ```
pub fn encrypt_private_key(key: &[u8], password: &str, iterations: u32) -> Result<EncryptedKey> {
    let salt = generate_salt();
    let derived_key = derive_key(password, &salt, iterations)?;

    let mut iv = [0u8; IV_LENGTH];
    rand::thread_rng().fill_bytes(&mut iv);

    let cipher = Aes256Gcm::new_from_slice(&derived_key)
        .map_err(|e| SdkError::Encryption(format!("Invalid key length: {}", e)))?;
    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&iv), key)
        .map_err(|e| SdkError::Encryption(format!("Encryption failed: {}", e)))?;

    Ok(EncryptedKey {
        salt,
        iv,
        ciphertext,
        iterations,
    })
}

/// Decrypt a private key using a password.
///
/// Authentication failure (wrong password, tampered data) is reported as
/// [`SdkError::Encryption`]; the key store maps it to "not found".
pub fn decrypt_private_key(encrypted: &EncryptedKey, password: &str) -> Result<Vec<u8>> {
    let derived_key = derive_key(password, &encrypted.salt, encrypted.iterations)?;

    let cipher = Aes256Gcm::new_from_slice(&derived_key)
        .map_err(|e| SdkError::Encryption(format!("Invalid key length: {}", e)))?;

    cipher
        .decrypt(Nonce::from_slice(&encrypted.iv), encrypted.ciphertext.as_slice())
        .map_err(|_| SdkError::Encryption("Decryption failed: wrong password or corrupted data".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const FAST: u32 = 1_000;

    #[test]
    fn test_encrypt_decrypt_roundtrip() {
        let key = [42u8; 32];

        let encrypted = encrypt_private_key(&key, "secure-password", FAST).unwrap();
        let decrypted = decrypt_private_key(&encrypted, "secure-password").unwrap();

        assert_eq!(key.as_slice(), decrypted.as_slice());
    }

    #[test]
    fn test_encrypt_produces_different_output() {
        let key = [1u8; 32];

        let encrypted1 = encrypt_private_key(&key, "password", FAST).unwrap();
        let encrypted2 = encrypt_private_key(&key, "password", FAST).unwrap();

        assert_ne!(encrypted1.salt, encrypted2.salt);
        assert_ne!(encrypted1.iv, encrypted2.iv);
        assert_ne!(encrypted1.ciphertext, encrypted2.ciphertext);
    }

    #[test]
    fn test_ciphertext_does_not_contain_plaintext() {
        let key = [0xABu8; 32];
        let encrypted = encrypt_private_key(&key, "password", FAST).unwrap();

        // 32 bytes plus the 16-byte GCM tag
        assert_eq!(encrypted.ciphertext.len(), 48);
        assert!(!encrypted.ciphertext.windows(32).any(|w| w == key));
        assert_eq!(encrypted.iterations, FAST);
    }

    #[test]
    fn test_decrypt_wrong_password() {
        let encrypted = encrypt_private_key(&[3u8; 32], "correct-password", FAST).unwrap();

        match decrypt_private_key(&encrypted, "wrong-password") {
            Err(SdkError::Encryption(_)) => {}
            other => panic!("Expected Encryption error, got {:?}", other),
        }
    }

    #[test]
    fn test_decrypt_corrupted_data() {
        let mut encrypted = encrypt_private_key(&[3u8; 32], "password", FAST).unwrap();

        let len = encrypted.ciphertext.len();
        encrypted.ciphertext[len - 1] ^= 0xFF;
        assert!(decrypt_private_key(&encrypted, "password").is_err());
    }

    #[test]
    fn test_decrypt_with_altered_iterations_fails() {
        let mut encrypted = encrypt_private_key(&[3u8; 32], "password", FAST).unwrap();
        encrypted.iterations += 1;
        assert!(decrypt_private_key(&encrypted, "password").is_err());
    }
}
