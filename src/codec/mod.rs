//! Validation and formatting of values interpolated into ledger source.
//!
//! No caller-supplied address, name or balance reaches generated source
//! without passing through this module. The single exception is a raw
//! generic-asset quantity, see [`amount::format_quantity`].

pub mod address;
pub mod amount;

pub use address::{to_address, to_numeric_address, validate_cns_name, Address, AddressRef, CnsName};
pub use amount::{format_balance, format_quantity, Amount};
