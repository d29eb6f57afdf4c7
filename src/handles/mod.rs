//! Handles: lightweight objects bound to an address or name that generate
//! ledger source and run it through the client.
//!
//! Creating a handle never touches the network. Every method validates its
//! inputs through [`crate::codec`], builds one source expression and issues
//! exactly one query or transaction. Ledger errors surface uniformly as
//! [`crate::error::SdkError::Ledger`].
//!
//! Generic assets and fungible tokens share the [`TokenHandle`] capability
//! set; which one applies is chosen by the caller through
//! [`crate::Convex::asset`] or [`crate::Convex::fungible`].

pub mod account;
pub mod asset;
pub mod cns;
pub mod fungible;

pub use account::AccountHandle;
pub use asset::AssetHandle;
pub use cns::CnsHandle;
pub use fungible::FungibleHandle;

use crate::codec::address::{is_valid_name, Address};
use crate::codec::amount::Amount;
use crate::error::{Result, SdkError};
use crate::result::ConvexResult;
use async_trait::async_trait;

/// Default library for generic assets.
pub const ASSET_LIBRARY: &str = "convex.asset";

/// Default library for fungible tokens.
pub const FUNGIBLE_LIBRARY: &str = "convex.fungible";

/// Default library for the name registry.
pub const CNS_LIBRARY: &str = "convex.cns";

/// Operations shared by every kind of token.
#[async_trait]
pub trait TokenHandle: Send + Sync {
    /// The token's address.
    fn token(&self) -> &Address;

    /// Balance of `holder`, or of the querying account when `None`.
    async fn balance(&self, holder: Option<Address>) -> Result<ConvexResult>;

    /// Transfer `quantity` of the token to `to`.
    async fn transfer(&self, to: Address, quantity: Amount) -> Result<ConvexResult>;
}

/// Validate a library path before it is spliced into source as `@<library>`.
pub(crate) fn check_library(library: &str) -> Result<String> {
    if is_valid_name(library) {
        Ok(library.to_string())
    } else {
        Err(SdkError::InvalidName(format!(
            "'{}' is not a valid library path",
            library
        )))
    }
}

/// `*address*` for the caller's own account, else the holder's address.
pub(crate) fn holder_expr(holder: Option<&Address>) -> String {
    holder.map_or_else(|| "*address*".to_string(), Address::to_string)
}
