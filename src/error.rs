//! Error types for the Convex SDK.
//!
//! Errors are grouped by where they originate. Validation errors are raised
//! before any I/O, protocol errors signal misuse of the client, transport
//! errors come from the HTTP layer, and ledger errors wrap a peer `Result`
//! that carried an `errorCode`. Only the last kind is a [`ConvexError`].

use crate::result::ConvexError;
use std::time::Duration;
use thiserror::Error;

/// The main error type for SDK operations.
#[derive(Error, Debug)]
pub enum SdkError {
    /// Malformed numeric or named account reference
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// Negative, fractional or non-numeric amount
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// CNS name that does not match the name pattern
    #[error("Invalid name: {0}")]
    InvalidName(String),

    /// Address or signer missing when a transaction was requested
    #[error("No account configured: set an address and a signer before transacting")]
    NoAccount,

    /// The peer answered but the response lacks a required field
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Connection failure, non-success status or unreadable body
    #[error("Transport error: {0}")]
    Transport(String),

    /// A network round trip exceeded the configured timeout
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The ledger reported an error code
    #[error(transparent)]
    Ledger(#[from] ConvexError),

    /// Cryptographic operation failed
    #[error("Cryptographic error: {0}")]
    Crypto(String),

    /// Invalid key format or content
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// Key derivation failed
    #[error("Key derivation error: {0}")]
    KeyDerivation(String),

    /// Encryption or decryption failed
    #[error("Encryption/decryption error: {0}")]
    Encryption(String),

    /// A signer was asked to sign for a key it does not hold
    #[error("Signer key mismatch: requested {requested}, signer holds {held}")]
    KeyMismatch { requested: String, held: String },

    /// Keystore operation failed
    #[error("Keystore error: {0}")]
    Keystore(String),

    /// Storage I/O error
    #[error("Storage I/O error: {0}")]
    Storage(#[from] std::io::Error),

    /// Invalid configuration value
    #[error("Configuration error: {0}")]
    Config(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),
}

impl SdkError {
    /// Whether this error came back from the ledger rather than the client.
    pub fn is_ledger_error(&self) -> bool {
        matches!(self, SdkError::Ledger(_))
    }

    /// The ledger error code, if this is a ledger error.
    pub fn ledger_code(&self) -> Option<&str> {
        match self {
            SdkError::Ledger(err) => Some(err.code()),
            _ => None,
        }
    }
}

/// A specialized Result type for SDK operations.
pub type Result<T> = std::result::Result<T, SdkError>;
