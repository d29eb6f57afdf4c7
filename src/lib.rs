//! Convex SDK: a client for Convex peers.
//!
//! This library lets an application talk to a Convex peer over its JSON API:
//!
//! - Run read-only queries and signed transactions
//! - Generate ledger source for accounts, assets, fungible tokens and CNS names
//! - Hold Ed25519 keys in a password-encrypted key store
//!
//! # Architecture
//!
//! Input values (addresses, amounts, names) are validated by [`codec`] before
//! any source text is built. Transactions go through the two-step
//! prepare/submit protocol in [`protocol`]; signing is delegated to a
//! [`Signer`], so keys may live outside the process. All operations return
//! `Result` types; ledger failures arrive as [`SdkError::Ledger`].
//!
//! # Example
//!
//! ```rust,no_run
//! use convex_sdk::{ClientConfig, Convex, KeyPair, Result, TokenHandle};
//!
//! async fn example() -> Result<()> {
//!     convex_sdk::init();
//!
//!     let mut convex = Convex::connect(ClientConfig::from_env()?)?;
//!     convex.new_account(KeyPair::generate(), Some(1_000_000)).await?;
//!
//!     let balance = convex.balance().await?;
//!     println!("balance: {:?}", balance.value);
//!
//!     convex.fungible("#128")?.transfer("#13".parse()?, 100u64.into()).await?;
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod codec;
pub mod crypto;
pub mod error;
pub mod handles;
pub mod net;
pub mod protocol;
pub mod result;
pub mod signer;
pub mod storage;

// Re-export commonly used types
pub use client::Convex;
pub use codec::{Address, Amount};
pub use crypto::ed25519::KeyPair;
pub use error::{Result, SdkError};
pub use handles::TokenHandle;
pub use net::ClientConfig;
pub use result::{throw_if_error, ConvexError, ConvexResult};
pub use signer::{KeyPairSigner, Signer};
pub use storage::keystore::KeyStore;

/// Install the process-wide rustls crypto provider.
///
/// Safe to call more than once; later calls are no-ops.
pub fn init() {
    let _ = rustls::crypto::ring::default_provider().install_default();
}
