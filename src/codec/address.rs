//! Account reference parsing and validation.
//!
//! An address is either numeric (`#42`) or a CNS name (`@convex.core`).
//! Every address that reaches generated source passes through here first.
//!
//! Valid names:
//! - Must start with an ASCII letter
//! - May continue with ASCII letters, digits, `.`, `_` or `-`

use crate::error::{Result, SdkError};
use std::fmt;
use std::str::FromStr;

/// A CNS name without the leading `@`.
///
/// Only [`CnsName::new`] builds one, so every value matches the name pattern.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CnsName(String);

impl CnsName {
    pub fn new(name: &str) -> Result<Self> {
        validate_cns_name(name)?;
        Ok(Self(name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CnsName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A validated account reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Address {
    /// Numeric account, serialized as `#<n>`.
    Numeric(u64),
    /// CNS name, serialized as `@<name>`.
    Name(CnsName),
}

impl Address {
    /// A name address from a bare name (no `@`).
    pub fn name(name: &str) -> Result<Self> {
        CnsName::new(name).map(Address::Name)
    }

    /// The numeric account id, if this is a numeric address.
    pub fn as_numeric(&self) -> Option<u64> {
        match self {
            Address::Numeric(n) => Some(*n),
            Address::Name(_) => None,
        }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Address::Numeric(n) => write!(f, "#{}", n),
            Address::Name(name) => write!(f, "@{}", name),
        }
    }
}

impl FromStr for Address {
    type Err = SdkError;

    fn from_str(input: &str) -> Result<Self> {
        if let Some(name) = input.strip_prefix('@') {
            return CnsName::new(name).map(Address::Name).map_err(|_| {
                SdkError::InvalidAddress(format!("'{}' is not a valid CNS name", input))
            });
        }

        parse_numeric(input).map(Address::Numeric)
    }
}

impl From<u64> for Address {
    fn from(n: u64) -> Self {
        Address::Numeric(n)
    }
}

/// Anything that can be turned into a validated [`Address`].
pub trait AddressRef {
    fn to_address(self) -> Result<Address>;
}

impl AddressRef for Address {
    fn to_address(self) -> Result<Address> {
        Ok(self)
    }
}

impl AddressRef for &Address {
    fn to_address(self) -> Result<Address> {
        Ok(self.clone())
    }
}

impl AddressRef for u64 {
    fn to_address(self) -> Result<Address> {
        Ok(Address::Numeric(self))
    }
}

impl AddressRef for u32 {
    fn to_address(self) -> Result<Address> {
        Ok(Address::Numeric(u64::from(self)))
    }
}

impl AddressRef for i64 {
    fn to_address(self) -> Result<Address> {
        u64::try_from(self)
            .map(Address::Numeric)
            .map_err(|_| SdkError::InvalidAddress(format!("{} is negative", self)))
    }
}

impl AddressRef for i32 {
    fn to_address(self) -> Result<Address> {
        i64::from(self).to_address()
    }
}

impl AddressRef for &str {
    fn to_address(self) -> Result<Address> {
        self.parse()
    }
}

impl AddressRef for String {
    fn to_address(self) -> Result<Address> {
        self.parse()
    }
}

impl AddressRef for &String {
    fn to_address(self) -> Result<Address> {
        self.parse()
    }
}

/// Normalize an address to its canonical source form.
///
/// Numeric input becomes `#<n>`; name input (`@...`) is returned unchanged
/// once it has been validated.
///
/// # Example
///
/// ```
/// use convex_sdk::codec::address::to_address;
///
/// assert_eq!(to_address(12u64).unwrap(), "#12");
/// assert_eq!(to_address("12").unwrap(), "#12");
/// assert_eq!(to_address("@convex.core").unwrap(), "@convex.core");
/// assert!(to_address("#12a").is_err());
/// ```
pub fn to_address(input: impl AddressRef) -> Result<String> {
    input.to_address().map(|address| address.to_string())
}

/// Resolve an address to its numeric account id.
///
/// Names are always rejected: they can only be resolved by the ledger itself.
pub fn to_numeric_address(input: impl AddressRef) -> Result<u64> {
    match input.to_address()? {
        Address::Numeric(n) => Ok(n),
        Address::Name(name) => Err(SdkError::InvalidAddress(format!(
            "@{} is a name; a numeric address is required",
            name
        ))),
    }
}

/// Validate a bare CNS name (without the leading `@`).
pub fn validate_cns_name(name: &str) -> Result<()> {
    if is_valid_name(name) {
        Ok(())
    } else {
        Err(SdkError::InvalidName(format!(
            "'{}' must start with a letter and contain only letters, digits, '.', '_' or '-'",
            name
        )))
    }
}

/// Whether `name` matches the CNS name pattern.
pub fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
}

fn parse_numeric(input: &str) -> Result<u64> {
    let digits = input.strip_prefix('#').unwrap_or(input);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(SdkError::InvalidAddress(format!(
            "'{}' is not a numeric address",
            input
        )));
    }
    digits
        .parse::<u64>()
        .map_err(|_| SdkError::InvalidAddress(format!("'{}' is out of range", input)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_numeric_forms() {
        assert_eq!(to_address(0u64).unwrap(), "#0");
        assert_eq!(to_address("#13").unwrap(), "#13");
        assert_eq!(to_address("13").unwrap(), "#13");
        assert_eq!(to_address(String::from("#9")).unwrap(), "#9");
        assert_eq!(to_address(7i32).unwrap(), "#7");
    }

    #[test]
    fn test_rejects_malformed_numeric() {
        for bad in ["", "#", "#-1", "-1", "1.5", "#12a", " 12", "##12", "0x10"] {
            match to_address(bad) {
                Err(SdkError::InvalidAddress(_)) => {}
                other => panic!("expected InvalidAddress for {:?}, got {:?}", bad, other),
            }
        }
        assert!(to_address(-4i64).is_err());
        assert!(to_address("#18446744073709551616").is_err());
    }

    #[test]
    fn test_name_forms() {
        assert_eq!(to_address("@convex.fungible").unwrap(), "@convex.fungible");
        assert_eq!(to_address("@user_1-test").unwrap(), "@user_1-test");
        assert!(to_address("@").is_err());
        assert!(to_address("@1abc").is_err());
        assert!(to_address("@bad name").is_err());
        assert!(to_address("@x)(transfer #1 1000").is_err());
    }

    #[test]
    fn test_numeric_address_rejects_names() {
        assert_eq!(to_numeric_address("#128").unwrap(), 128);
        assert_eq!(to_numeric_address(Address::Numeric(5)).unwrap(), 5);
        match to_numeric_address("@convex.core") {
            Err(SdkError::InvalidAddress(msg)) => assert!(msg.contains("numeric")),
            other => panic!("expected InvalidAddress, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_cns_name() {
        assert!(validate_cns_name("user.alice").is_ok());
        assert!(validate_cns_name("A").is_ok());
        assert!(validate_cns_name("").is_err());
        assert!(validate_cns_name("@user").is_err());
        assert!(validate_cns_name("user'").is_err());
        match validate_cns_name("9lives") {
            Err(SdkError::InvalidName(_)) => {}
            other => panic!("expected InvalidName, got {:?}", other),
        }
    }

    #[test]
    fn test_name_addresses_are_validated() {
        let forged = "x #256 1) (transfer #666 999999999) (do";
        assert!(matches!(Address::name(forged), Err(SdkError::InvalidName(_))));
        assert!(CnsName::new("").is_err());

        let address = Address::name("user.alice").unwrap();
        assert_eq!(address.to_string(), "@user.alice");
        assert_eq!(address.as_numeric(), None);
        assert_eq!("@user.alice".parse::<Address>().unwrap(), address);
    }

    proptest! {
        #[test]
        fn prop_numeric_roundtrip(n in any::<u64>()) {
            let canonical = to_address(n).unwrap();
            prop_assert_eq!(to_numeric_address(canonical.as_str()).unwrap(), n);
        }

        #[test]
        fn prop_name_normalize_is_identity(name in "[a-zA-Z][a-zA-Z0-9._-]{0,24}") {
            let input = format!("@{}", name);
            prop_assert_eq!(to_address(input.as_str()).unwrap(), input);
        }
    }
}
