//! The prepare → sign → submit transaction protocol.
//!
//! Each step is its own type, so a transaction can only be signed once it
//! has been prepared and only be submitted once it has been signed:
//!
//! ```text
//! Session ──prepare──▶ PreparedTransaction ──sign──▶ SignedTransaction ──submit──▶ ConvexResult
//! ```
//!
//! Every step is exactly one network round trip (signing may be one too, for
//! remote signers). Nothing is retried here: replaying a signed hash must stay
//! under the caller's control.

use crate::codec::address::{to_numeric_address, AddressRef};
use crate::crypto::ed25519::{decode_hex, KEY_LENGTH, SIGNATURE_LENGTH};
use crate::error::{Result, SdkError};
use crate::net::client::Transport;
use crate::result::{throw_if_error, ConvexResult};
use crate::signer::Signer;
use serde_json::{json, Value};
use std::fmt;
use std::sync::Arc;

pub const PREPARE_PATH: &str = "/api/v1/transaction/prepare";
pub const SUBMIT_PATH: &str = "/api/v1/transaction/submit";

/// The account a transaction is made from and the signer that authorizes it.
#[derive(Clone)]
pub struct Session {
    address: u64,
    signer: Arc<dyn Signer>,
}

impl Session {
    /// Bind a numeric account to a signer.
    pub fn new(address: impl AddressRef, signer: Arc<dyn Signer>) -> Result<Self> {
        Ok(Self {
            address: to_numeric_address(address)?,
            signer,
        })
    }

    pub fn address(&self) -> u64 {
        self.address
    }

    pub fn signer(&self) -> &Arc<dyn Signer> {
        &self.signer
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

/// A transaction the peer has accepted for signing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedTransaction {
    hash: String,
    hash_bytes: Vec<u8>,
}

/// A prepared transaction with its signature attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    hash: String,
    signature: [u8; SIGNATURE_LENGTH],
    public_key: [u8; KEY_LENGTH],
}

/// Ask the peer to prepare `source` for execution by `session`'s account.
pub async fn prepare(
    transport: &dyn Transport,
    session: &Session,
    source: &str,
) -> Result<PreparedTransaction> {
    tracing::debug!(address = session.address, "preparing transaction");

    let response = transport
        .post(
            PREPARE_PATH,
            json!({ "address": session.address, "source": source }),
        )
        .await?;
    reject_ledger_error(&response)?;

    let hash = match response.get("hash") {
        Some(Value::String(hash)) if !hash.is_empty() => hash.clone(),
        _ => {
            return Err(SdkError::Protocol(
                "Prepare response did not include a transaction hash".to_string(),
            ))
        }
    };
    let hash_bytes = decode_hex(&hash)
        .map_err(|_| SdkError::Protocol(format!("Transaction hash '{}' is not hex", hash)))?;

    Ok(PreparedTransaction { hash, hash_bytes })
}

impl PreparedTransaction {
    /// The hash as returned by the peer.
    pub fn hash(&self) -> &str {
        &self.hash
    }

    /// The raw hash bytes that get signed.
    pub fn hash_bytes(&self) -> &[u8] {
        &self.hash_bytes
    }

    pub async fn sign(self, signer: &dyn Signer) -> Result<SignedTransaction> {
        let public_key = signer.public_key().await?;
        let signature = signer.sign(&self.hash_bytes).await?;

        tracing::debug!(hash = %self.hash, "signed transaction");

        Ok(SignedTransaction {
            hash: self.hash,
            signature,
            public_key,
        })
    }
}

impl SignedTransaction {
    pub fn signature(&self) -> &[u8; SIGNATURE_LENGTH] {
        &self.signature
    }

    pub fn public_key(&self) -> &[u8; KEY_LENGTH] {
        &self.public_key
    }

    /// Submit the signed transaction and check the ledger's verdict.
    pub async fn submit(self, transport: &dyn Transport) -> Result<ConvexResult> {
        tracing::debug!(hash = %self.hash, "submitting transaction");

        let response = transport
            .post(
                SUBMIT_PATH,
                json!({
                    "hash": self.hash,
                    "sig": hex::encode(self.signature),
                    "accountKey": hex::encode(self.public_key),
                }),
            )
            .await?;

        let result: ConvexResult = serde_json::from_value(response)?;
        Ok(throw_if_error(result)?)
    }
}

/// Run the whole protocol for one source string.
pub async fn transact(
    transport: &dyn Transport,
    session: &Session,
    source: &str,
) -> Result<ConvexResult> {
    let prepared = prepare(transport, session, source).await?;
    let signed = prepared.sign(session.signer.as_ref()).await?;
    signed.submit(transport).await
}

/// A prepare response can itself be a ledger rejection, e.g. a syntax error.
fn reject_ledger_error(response: &Value) -> Result<()> {
    if response.get("errorCode").map_or(false, |code| !code.is_null()) {
        let result: ConvexResult = serde_json::from_value(response.clone())?;
        throw_if_error(result)?;
    }
    Ok(())
}
