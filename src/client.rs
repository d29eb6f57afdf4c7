//! The top-level Convex client.
//!
//! A [`Convex`] owns the transport and the optional active account (address
//! plus signer). Queries need neither; transactions need both and fail with
//! [`SdkError::NoAccount`] before touching the network otherwise.

use crate::codec::address::{to_address, to_numeric_address, Address, AddressRef};
use crate::codec::amount::{format_balance, Amount};
use crate::crypto::ed25519::{decode_hex, KeyPair, KEY_LENGTH};
use crate::error::{Result, SdkError};
use crate::handles::{AccountHandle, AssetHandle, CnsHandle, FungibleHandle};
use crate::net::client::{HttpTransport, Transport};
use crate::net::config::ClientConfig;
use crate::protocol::{self, Session};
use crate::result::{throw_if_error, ConvexResult};
use crate::signer::{KeyPairSigner, Signer};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{json, Map, Value};
use std::fmt;
use std::sync::Arc;

pub const QUERY_PATH: &str = "/api/v1/query";
pub const CREATE_ACCOUNT_PATH: &str = "/api/v1/createAccount";
pub const FAUCET_PATH: &str = "/api/v1/faucet";
pub const ACCOUNTS_PATH: &str = "/api/v1/accounts";

/// Response of `createAccount`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedAccount {
    #[serde(deserialize_with = "numeric_address")]
    pub address: u64,
    #[serde(default)]
    pub balance: Option<u64>,
}

/// Account record served by `/api/v1/accounts/{address}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountInfo {
    #[serde(deserialize_with = "numeric_address")]
    pub address: u64,
    #[serde(default)]
    pub balance: u64,
    #[serde(default)]
    pub sequence: u64,
    #[serde(default)]
    pub key: Option<String>,
}

/// Peers report addresses either as numbers or as `#n` strings.
fn numeric_address<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<u64, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::Number(n) => n
            .as_u64()
            .ok_or_else(|| serde::de::Error::custom("address must be a non-negative integer")),
        Value::String(s) => to_numeric_address(s.as_str()).map_err(serde::de::Error::custom),
        other => Err(serde::de::Error::custom(format!("unexpected address {}", other))),
    }
}

/// Client for one Convex peer.
pub struct Convex {
    transport: Arc<dyn Transport>,
    config: ClientConfig,
    address: Option<u64>,
    signer: Option<Arc<dyn Signer>>,
}

impl fmt::Debug for Convex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Convex")
            .field("peer_url", &self.config.peer_url)
            .field("address", &self.address)
            .field("has_signer", &self.signer.is_some())
            .finish()
    }
}

impl Convex {
    /// Connect to the peer named in `config` over HTTP(S).
    pub fn connect(config: ClientConfig) -> Result<Self> {
        let transport = HttpTransport::new(&config)?;
        Ok(Self::with_transport(Arc::new(transport), config))
    }

    /// Use an existing transport, e.g. [`crate::net::mock::MockTransport`].
    pub fn with_transport(transport: Arc<dyn Transport>, config: ClientConfig) -> Self {
        Self {
            transport,
            config,
            address: None,
            signer: None,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// The active account, if one is set.
    pub fn address(&self) -> Option<u64> {
        self.address
    }

    pub fn set_address(&mut self, address: impl AddressRef) -> Result<()> {
        self.address = Some(to_numeric_address(address)?);
        Ok(())
    }

    pub fn set_signer(&mut self, signer: Arc<dyn Signer>) {
        self.signer = Some(signer);
    }

    /// Sign with an in-memory key pair.
    pub fn set_key_pair(&mut self, key_pair: KeyPair) {
        self.set_signer(Arc::new(KeyPairSigner::new(key_pair)));
    }

    pub fn clear_account(&mut self) {
        self.address = None;
        self.signer = None;
    }

    /// The active account as an explicit session.
    pub fn session(&self) -> Result<Session> {
        match (self.address, &self.signer) {
            (Some(address), Some(signer)) => Session::new(address, Arc::clone(signer)),
            _ => Err(SdkError::NoAccount),
        }
    }

    /// Run a read-only query as the active account (or anonymously).
    pub async fn query(&self, source: &str) -> Result<ConvexResult> {
        self.run_query(source, self.address).await
    }

    /// Run a read-only query as `address`.
    pub async fn query_as(&self, source: &str, address: impl AddressRef) -> Result<ConvexResult> {
        let address = to_numeric_address(address)?;
        self.run_query(source, Some(address)).await
    }

    async fn run_query(&self, source: &str, address: Option<u64>) -> Result<ConvexResult> {
        let mut body = Map::new();
        body.insert("source".to_string(), Value::from(source));
        if let Some(address) = address {
            body.insert("address".to_string(), Value::from(address));
        }

        tracing::debug!(?address, "query");
        let response = self.transport.post(QUERY_PATH, Value::Object(body)).await?;
        let result: ConvexResult = serde_json::from_value(response)?;
        Ok(throw_if_error(result)?)
    }

    /// Execute `source` as a signed transaction from the active account.
    pub async fn transact(&self, source: &str) -> Result<ConvexResult> {
        let session = self.session()?;
        self.transact_as(&session, source).await
    }

    /// Execute `source` as a signed transaction from an explicit session.
    pub async fn transact_as(&self, session: &Session, source: &str) -> Result<ConvexResult> {
        protocol::transact(self.transport.as_ref(), session, source).await
    }

    /// Register a new account controlled by `public_key`.
    pub async fn create_account(
        &self,
        public_key: &[u8; KEY_LENGTH],
        faucet: Option<u64>,
    ) -> Result<CreatedAccount> {
        let mut body = json!({ "accountKey": hex::encode(public_key) });
        if let Some(amount) = faucet {
            body["faucet"] = Value::from(amount);
        }

        let response = self.transport.post(CREATE_ACCOUNT_PATH, body).await?;
        reject_error_envelope(&response)?;
        let created: CreatedAccount = serde_json::from_value(response)?;

        tracing::info!(address = created.address, "created account");
        Ok(created)
    }

    /// Create an account for `key_pair` and make it the active account.
    pub async fn new_account(
        &mut self,
        key_pair: KeyPair,
        faucet: Option<u64>,
    ) -> Result<CreatedAccount> {
        let created = self.create_account(&key_pair.public_bytes(), faucet).await?;
        self.address = Some(created.address);
        self.set_key_pair(key_pair);
        Ok(created)
    }

    /// Request coins from the peer's faucet.
    pub async fn faucet(
        &self,
        address: impl AddressRef,
        amount: impl Into<Amount>,
    ) -> Result<ConvexResult> {
        let address = to_numeric_address(address)?;
        let amount = format_balance(&amount.into())?
            .parse::<u64>()
            .map_err(|_| SdkError::InvalidAmount("faucet amount exceeds 64 bits".to_string()))?;

        let response = self
            .transport
            .post(FAUCET_PATH, json!({ "address": address, "amount": amount }))
            .await?;
        let result: ConvexResult = serde_json::from_value(response)?;
        Ok(throw_if_error(result)?)
    }

    /// Fetch the peer's record for a numeric account.
    pub async fn account_info(&self, address: impl AddressRef) -> Result<AccountInfo> {
        let address = to_numeric_address(address)?;
        let response = self
            .transport
            .get(&format!("{}/{}", ACCOUNTS_PATH, address))
            .await?;
        reject_error_envelope(&response)?;
        Ok(serde_json::from_value(response)?)
    }

    /// Coin balance of the active account.
    pub async fn balance(&self) -> Result<ConvexResult> {
        self.query("*balance*").await
    }

    /// Coin balance of any account.
    pub async fn balance_of(&self, address: impl AddressRef) -> Result<ConvexResult> {
        let source = format!("(balance {})", to_address(address)?);
        self.query(&source).await
    }

    /// Transfer coins from the active account.
    pub async fn transfer(
        &self,
        to: impl AddressRef,
        amount: impl Into<Amount>,
    ) -> Result<ConvexResult> {
        let source = format!(
            "(transfer {} {})",
            to_address(to)?,
            format_balance(&amount.into())?
        );
        self.transact(&source).await
    }

    /// Public key of the active signer, decoded from the account record if no signer is set.
    pub async fn public_key(&self) -> Result<[u8; KEY_LENGTH]> {
        if let Some(signer) = &self.signer {
            return signer.public_key().await;
        }
        let address = self.address.ok_or(SdkError::NoAccount)?;
        let info = self.account_info(address).await?;
        let key = info
            .key
            .ok_or_else(|| SdkError::NotFound(format!("Account #{} has no key", address)))?;
        let bytes = decode_hex(&key)?;
        <[u8; KEY_LENGTH]>::try_from(bytes.as_slice())
            .map_err(|_| SdkError::InvalidKey(format!("Account key '{}' is not 32 bytes", key)))
    }

    /// Handle for a generic asset.
    pub fn asset(&self, token: impl AddressRef) -> Result<AssetHandle<'_>> {
        Ok(AssetHandle::new(self, token.to_address()?))
    }

    /// Handle for a fungible token.
    pub fn fungible(&self, token: impl AddressRef) -> Result<FungibleHandle<'_>> {
        Ok(FungibleHandle::new(self, token.to_address()?))
    }

    /// Handle for an account.
    pub fn account(&self, address: impl AddressRef) -> Result<AccountHandle<'_>> {
        Ok(AccountHandle::new(self, address.to_address()?))
    }

    /// Handle for a CNS name.
    pub fn cns(&self, name: &str) -> Result<CnsHandle<'_>> {
        CnsHandle::new(self, name)
    }

    /// Whether `address` is the active account. Names never are.
    pub(crate) fn is_own(&self, address: &Address) -> bool {
        match (address.as_numeric(), self.address) {
            (Some(bound), Some(own)) => bound == own,
            _ => false,
        }
    }
}

/// Some endpoints answer failures with a result envelope instead of their usual shape.
fn reject_error_envelope(response: &Value) -> Result<()> {
    if response.get("errorCode").map_or(false, |code| !code.is_null()) {
        let result: ConvexResult = serde_json::from_value(response.clone())?;
        throw_if_error(result)?;
    }
    Ok(())
}
