//! Fungible-token handle.
//!
//! Every quantity is a validated balance, so no sandboxing is needed.

use crate::client::Convex;
use crate::codec::address::{Address, AddressRef};
use crate::codec::amount::{format_balance, Amount};
use crate::error::Result;
use crate::handles::{check_library, holder_expr, TokenHandle, FUNGIBLE_LIBRARY};
use crate::result::ConvexResult;
use async_trait::async_trait;

#[derive(Debug, Clone)]
pub struct FungibleHandle<'a> {
    client: &'a Convex,
    token: Address,
    library: String,
}

impl<'a> FungibleHandle<'a> {
    pub fn new(client: &'a Convex, token: Address) -> Self {
        Self {
            client,
            token,
            library: FUNGIBLE_LIBRARY.to_string(),
        }
    }

    /// Use a different fungible library, e.g. a fork deployed under another name.
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

    pub fn transfer_source(&self, to: &Address, amount: &Amount) -> Result<String> {
        Ok(format!(
            "(@{}/transfer {} {} {})",
            self.library,
            self.token,
            to,
            format_balance(amount)?
        ))
    }

    pub fn mint_source(&self, amount: &Amount) -> Result<String> {
        Ok(format!(
            "(@{}/mint {} {})",
            self.library,
            self.token,
            format_balance(amount)?
        ))
    }

    pub fn burn_source(&self, amount: &Amount) -> Result<String> {
        Ok(format!(
            "(@{}/burn {} {})",
            self.library,
            self.token,
            format_balance(amount)?
        ))
    }

    pub fn supply_source(&self) -> String {
        format!("(@{}/total-supply {})", self.library, self.token)
    }

    pub fn decimals_source(&self) -> String {
        format!("(@{}/decimals {})", self.library, self.token)
    }

    /// Create new supply. Only the token's controller may mint.
    pub async fn mint(&self, amount: impl Into<Amount>) -> Result<ConvexResult> {
        let source = self.mint_source(&amount.into())?;
        self.client.transact(&source).await
    }

    /// Destroy supply held by the caller.
    pub async fn burn(&self, amount: impl Into<Amount>) -> Result<ConvexResult> {
        let source = self.burn_source(&amount.into())?;
        self.client.transact(&source).await
    }

    pub async fn supply(&self) -> Result<ConvexResult> {
        self.client.query(&self.supply_source()).await
    }

    pub async fn decimals(&self) -> Result<ConvexResult> {
        self.client.query(&self.decimals_source()).await
    }

    /// Balance of an address given in any accepted form.
    pub async fn balance_of(&self, holder: impl AddressRef) -> Result<ConvexResult> {
        self.balance(Some(holder.to_address()?)).await
    }
}

#[async_trait]
impl<'a> TokenHandle for FungibleHandle<'a> {
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
