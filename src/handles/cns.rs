//! Name-registry (CNS) handle.
//!
//! The bound name is validated once at construction and spliced into source
//! as a quoted symbol, e.g. `'user.alice`.

use crate::client::Convex;
use crate::codec::address::{Address, AddressRef, CnsName};
use crate::error::Result;
use crate::handles::{check_library, CNS_LIBRARY};
use crate::result::ConvexResult;

#[derive(Debug, Clone)]
pub struct CnsHandle<'a> {
    client: &'a Convex,
    name: CnsName,
    library: String,
}

impl<'a> CnsHandle<'a> {
    /// Bind to `name`, given with or without a leading `@`.
    pub fn new(client: &'a Convex, name: &str) -> Result<Self> {
        let bare = name.strip_prefix('@').unwrap_or(name);
        Ok(Self {
            client,
            name: CnsName::new(bare)?,
            library: CNS_LIBRARY.to_string(),
        })
    }

    pub fn with_library(mut self, library: &str) -> Result<Self> {
        self.library = check_library(library)?;
        Ok(self)
    }

    /// The bound name without `@`.
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    pub fn resolve_source(&self) -> String {
        format!("(@{}/resolve '{})", self.library, self.name)
    }

    pub fn set_source(&self, target: &Address) -> String {
        format!("(@{}/update '{} {})", self.library, self.name, target)
    }

    pub fn set_controller_source(&self, controller: &Address) -> String {
        format!("(@{}/control '{} {})", self.library, self.name, controller)
    }

    /// Look up the address the name points to.
    pub async fn resolve(&self) -> Result<ConvexResult> {
        self.client.query(&self.resolve_source()).await
    }

    /// Point the name at `target`. Requires control of the name.
    pub async fn set(&self, target: impl AddressRef) -> Result<ConvexResult> {
        let source = self.set_source(&target.to_address()?);
        self.client.transact(&source).await
    }

    /// Hand control of the name to `controller`.
    pub async fn set_controller(&self, controller: impl AddressRef) -> Result<ConvexResult> {
        let source = self.set_controller_source(&controller.to_address()?);
        self.client.transact(&source).await
    }
}
