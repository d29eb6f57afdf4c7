//! Generic-asset handle.
//!
//! Quantities for generic assets are not always integers (a set of NFT ids is
//! a quantity too), so text quantities are passed through unvalidated. When
//! such text ends up in a transaction it is wrapped in `(query ...)`, which
//! evaluates it and discards any state change it tries to make.

use crate::client::Convex;
use crate::codec::address::{Address, AddressRef};
use crate::codec::amount::{format_quantity, Amount};
use crate::error::Result;
use crate::handles::{check_library, holder_expr, TokenHandle, ASSET_LIBRARY};
use crate::result::ConvexResult;
use async_trait::async_trait;

#[derive(Debug, Clone)]
pub struct AssetHandle<'a> {
    client: &'a Convex,
    token: Address,
    library: String,
}

/// Quantity for a transacting call: raw text is sandboxed.
fn sandboxed_quantity(quantity: &Amount) -> Result<String> {
    let formatted = format_quantity(quantity)?;
    if quantity.is_text() {
        Ok(format!("(query {})", formatted))
    } else {
        Ok(formatted)
    }
}

impl<'a> AssetHandle<'a> {
    pub fn new(client: &'a Convex, token: Address) -> Self {
        Self {
            client,
            token,
            library: ASSET_LIBRARY.to_string(),
        }
    }

    pub fn with_library(mut self, library: &str) -> Result<Self> {
        self.library = check_library(library)?;
        Ok(self)
    }

    pub fn balance_source(&self, holder: Option<&Address>) -> String {
        format!(
            "(@{}/balance {} {})",
            self.library,
            self.token,
            holder_expr(holder)
        )
    }

    pub fn transfer_source(&self, to: &Address, quantity: &Amount) -> Result<String> {
        self.write_source("transfer", to, quantity)
    }

    pub fn offer_source(&self, to: &Address, quantity: &Amount) -> Result<String> {
        self.write_source("offer", to, quantity)
    }

    pub fn accept_source(&self, from: &Address, quantity: &Amount) -> Result<String> {
        self.write_source("accept", from, quantity)
    }

    /// Read-only, so raw text is not sandboxed.
    pub fn owns_source(&self, holder: &Address, quantity: &Amount) -> Result<String> {
        Ok(format!(
            "(@{}/owns? {} {} {})",
            self.library,
            holder,
            self.token,
            format_quantity(quantity)?
        ))
    }

    fn write_source(&self, op: &str, counterparty: &Address, quantity: &Amount) -> Result<String> {
        Ok(format!(
            "(@{}/{} {} {} {})",
            self.library,
            op,
            counterparty,
            self.token,
            sandboxed_quantity(quantity)?
        ))
    }

    /// Offer `quantity` to `to`, who can then [`accept`](Self::accept) it.
    pub async fn offer(
        &self,
        to: impl AddressRef,
        quantity: impl Into<Amount>,
    ) -> Result<ConvexResult> {
        let source = self.offer_source(&to.to_address()?, &quantity.into())?;
        self.client.transact(&source).await
    }

    /// Accept a quantity previously offered by `from`.
    pub async fn accept(
        &self,
        from: impl AddressRef,
        quantity: impl Into<Amount>,
    ) -> Result<ConvexResult> {
        let source = self.accept_source(&from.to_address()?, &quantity.into())?;
        self.client.transact(&source).await
    }

    /// Whether `holder` owns at least `quantity`.
    pub async fn owns(
        &self,
        holder: impl AddressRef,
        quantity: impl Into<Amount>,
    ) -> Result<ConvexResult> {
        let source = self.owns_source(&holder.to_address()?, &quantity.into())?;
        self.client.query(&source).await
    }
}

#[async_trait]
impl<'a> TokenHandle for AssetHandle<'a> {
    fn token(&self) -> &Address {
        &self.token
    }

    async fn balance(&self, holder: Option<Address>) -> Result<ConvexResult> {
        self.client
            .query(&self.balance_source(holder.as_ref()))
            .await
    }

    async fn transfer(&self, to: Address, quantity: Amount) -> Result<ConvexResult> {
        let source = self.transfer_source(&to, &quantity)?;
        self.client.transact(&source).await
    }
}
