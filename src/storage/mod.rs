//! Key storage module.
//!
//! Encrypted storage for Ed25519 key pairs by alias, plus a separate tier
//! for key pairs the user has unlocked.

pub mod backend;
pub mod keystore;
pub mod record;
