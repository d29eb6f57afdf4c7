//! Cryptographic operations module.
//!
//! - Ed25519 key pairs, signing and verification
//! - PBKDF2 password-based key derivation
//! - AES-GCM encryption of private keys
//!
//! # Example
//!
//! ```rust
//! use convex_sdk::crypto::ed25519::KeyPair;
//! use convex_sdk::crypto::encryption::{encrypt_private_key, decrypt_private_key};
//!
//! # fn example() -> convex_sdk::error::Result<()> {
//! let key_pair = KeyPair::generate();
//!
//! let encrypted = encrypt_private_key(&key_pair.private_bytes(), "secure-password", 10_000)?;
//! let decrypted = decrypt_private_key(&encrypted, "secure-password")?;
//! assert_eq!(key_pair.private_bytes().as_slice(), decrypted.as_slice());
//! # Ok(())
//! # }
//! ```

pub mod ed25519;
pub mod encryption;
pub mod password;
