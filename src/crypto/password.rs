//! Password-based key derivation.
//!
//! Keys are derived with PBKDF2-HMAC-SHA256 from a password and a random salt.

use crate::error::{Result, SdkError};
use hmac::Hmac;
use pbkdf2::pbkdf2;
use rand::RngCore;
use sha2::Sha256;

/// The length of the salt used for key derivation.
pub const SALT_LENGTH: usize = 16;

/// The length of the derived key.
pub const KEY_LENGTH: usize = 32;

/// Default PBKDF2 iteration count.
pub const DEFAULT_ITERATIONS: u32 = 100_000;

/// Upper bound on the iteration count, for stored records as well as new ones.
pub const MAX_ITERATIONS: u32 = 10_000_000;

/// Generate a random salt for key derivation.
///
/// # Example
///
/// ```
/// use convex_sdk::crypto::password::{generate_salt, SALT_LENGTH};
///
/// let salt = generate_salt();
/// assert_eq!(salt.len(), SALT_LENGTH);
/// ```
pub fn generate_salt() -> [u8; SALT_LENGTH] {
    let mut salt = [0u8; SALT_LENGTH];
    rand::thread_rng().fill_bytes(&mut salt);
    salt
}

/// Derive an encryption key from a password, salt and iteration count.
///
/// # Example
///
/// ```
/// use convex_sdk::crypto::password::{derive_key, generate_salt, KEY_LENGTH};
///
/// let salt = generate_salt();
/// let key = derive_key("secure-password", &salt, 1_000).unwrap();
/// assert_eq!(key.len(), KEY_LENGTH);
/// ```
pub fn derive_key(password: &str, salt: &[u8], iterations: u32) -> Result<[u8; KEY_LENGTH]> {
    if salt.len() != SALT_LENGTH {
        return Err(SdkError::KeyDerivation(format!(
            "Salt must be {} bytes, got {}",
            SALT_LENGTH,
            salt.len()
        )));
    }
    if iterations == 0 {
        return Err(SdkError::KeyDerivation(
            "Iteration count must be positive".to_string(),
        ));
    }
    if iterations > MAX_ITERATIONS {
        return Err(SdkError::KeyDerivation(format!(
            "Iteration count {} exceeds {}",
            iterations, MAX_ITERATIONS
        )));
    }

    let mut output = [0u8; KEY_LENGTH];
    pbkdf2::<Hmac<Sha256>>(password.as_bytes(), salt, iterations, &mut output);

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FAST: u32 = 1_000;

    #[test]
    fn test_generate_salt_produces_different_values() {
        assert_ne!(generate_salt(), generate_salt());
    }

    #[test]
    fn test_derive_key_same_inputs_same_key() {
        let salt = generate_salt();

        let key1 = derive_key("test-password", &salt, FAST).unwrap();
        let key2 = derive_key("test-password", &salt, FAST).unwrap();

        assert_eq!(key1, key2);
    }

    #[test]
    fn test_derive_key_varies_with_inputs() {
        let salt = generate_salt();
        let base = derive_key("password1", &salt, FAST).unwrap();

        assert_ne!(base, derive_key("password2", &salt, FAST).unwrap());
        assert_ne!(base, derive_key("password1", &generate_salt(), FAST).unwrap());
        assert_ne!(base, derive_key("password1", &salt, FAST + 1).unwrap());
    }

    #[test]
    fn test_derive_key_single_iteration() {
        let key = derive_key("password", b"saltsaltsaltsalt", 1).unwrap();
        let again = derive_key("password", b"saltsaltsaltsalt", 1).unwrap();
        assert_eq!(key, again);
        assert_ne!(key, [0u8; KEY_LENGTH]);
    }

    #[test]
    fn test_derive_key_invalid_salt_length() {
        match derive_key("test-password", &[0u8; 32], FAST) {
            Err(SdkError::KeyDerivation(msg)) => assert!(msg.contains("Salt must be")),
            other => panic!("Expected KeyDerivation, got {:?}", other),
        }
    }

    #[test]
    fn test_derive_key_zero_iterations() {
        assert!(derive_key("pw", &generate_salt(), 0).is_err());
    }

    #[test]
    fn test_derive_key_rejects_excessive_iterations() {
        match derive_key("pw", &generate_salt(), u32::MAX) {
            Err(SdkError::KeyDerivation(msg)) => assert!(msg.contains("exceeds")),
            other => panic!("expected KeyDerivation error, got {:?}", other),
        }
    }

    #[test]
    fn test_derive_key_empty_password() {
        assert!(derive_key("", &generate_salt(), FAST).is_ok());
    }
}
