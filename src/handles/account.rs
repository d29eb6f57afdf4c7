//! Account handle.
//!
//! Reads work for any account. Writes are authorized in one of two ways: the
//! bound account is the client's own, so the operation runs directly, or the
//! client controls it, so the operation runs inside `eval-as`. Name-bound
//! handles always take the controller path.

use crate::client::Convex;
use crate::codec::address::{Address, AddressRef};
use crate::crypto::ed25519::KEY_LENGTH;
use crate::error::Result;
use crate::result::ConvexResult;

#[derive(Debug, Clone)]
pub struct AccountHandle<'a> {
    client: &'a Convex,
    address: Address,
}

impl<'a> AccountHandle<'a> {
    pub fn new(client: &'a Convex, address: Address) -> Self {
        Self { client, address }
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    pub fn balance_source(&self) -> String {
        format!("(balance {})", self.address)
    }

    pub fn sequence_source(&self) -> String {
        format!("(:sequence (account {}))", self.address)
    }

    pub fn controller_source(&self) -> String {
        format!("(:controller (account {}))", self.address)
    }

    pub fn key_source(&self) -> String {
        format!("(:key (account {}))", self.address)
    }

    pub fn set_controller_source(&self, controller: &Address) -> String {
        self.authorized(&format!("(set-controller {})", controller))
    }

    pub fn set_key_source(&self, public_key: &[u8; KEY_LENGTH]) -> String {
        self.authorized(&format!("(set-key 0x{})", hex::encode(public_key)))
    }

    fn authorized(&self, op: &str) -> String {
        if self.client.is_own(&self.address) {
            op.to_string()
        } else {
            format!("(eval-as {} '{})", self.address, op)
        }
    }

    pub async fn balance(&self) -> Result<ConvexResult> {
        self.client.query(&self.balance_source()).await
    }

    pub async fn sequence(&self) -> Result<ConvexResult> {
        self.client.query(&self.sequence_source()).await
    }

    pub async fn controller(&self) -> Result<ConvexResult> {
        self.client.query(&self.controller_source()).await
    }

    pub async fn key(&self) -> Result<ConvexResult> {
        self.client.query(&self.key_source()).await
    }

    pub async fn set_controller(&self, controller: impl AddressRef) -> Result<ConvexResult> {
        let source = self.set_controller_source(&controller.to_address()?);
        self.client.transact(&source).await
    }

    /// Rotate the account's public key.
    pub async fn set_key(&self, public_key: &[u8; KEY_LENGTH]) -> Result<ConvexResult> {
        self.client.transact(&self.set_key_source(public_key)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::config::ClientConfig;
    use crate::net::mock::MockTransport;
    use std::sync::Arc;

    fn client_at(address: Option<u64>) -> Convex {
        let mut client =
            Convex::with_transport(Arc::new(MockTransport::new()), ClientConfig::default());
        if let Some(address) = address {
            client.set_address(address).unwrap();
        }
        client
    }

    #[test]
    fn test_read_sources() {
        let client = client_at(None);
        let account = client.account("#13").unwrap();

        assert_eq!(account.balance_source(), "(balance #13)");
        assert_eq!(account.sequence_source(), "(:sequence (account #13))");
        assert_eq!(account.controller_source(), "(:controller (account #13))");
        assert_eq!(account.key_source(), "(:key (account #13))");
    }

    #[test]
    fn test_own_account_writes_directly() {
        let client = client_at(Some(13));
        let account = client.account(13u64).unwrap();

        assert_eq!(
            account.set_controller_source(&Address::Numeric(20)),
            "(set-controller #20)"
        );
        assert_eq!(
            account.set_key_source(&[0xab; 32]),
            format!("(set-key 0x{})", "ab".repeat(32))
        );
    }

    #[test]
    fn test_other_account_writes_via_eval_as() {
        let client = client_at(Some(12));
        let account = client.account("#13").unwrap();

        assert_eq!(
            account.set_controller_source(&Address::Numeric(12)),
            "(eval-as #13 '(set-controller #12))"
        );
    }

    #[test]
    fn test_names_and_unset_client_take_controller_path() {
        let client = client_at(Some(12));
        let named = client.account("@user.alice").unwrap();
        assert_eq!(
            named.set_controller_source(&Address::Numeric(12)),
            "(eval-as @user.alice '(set-controller #12))"
        );

        let anonymous = client_at(None);
        let account = anonymous.account(12u64).unwrap();
        assert!(account
            .set_controller_source(&Address::Numeric(1))
            .starts_with("(eval-as #12 "));
    }

    #[test]
    fn test_invalid_address_rejected() {
        let client = client_at(None);
        assert!(client.account("#1 (evil)").is_err());
    }
}
