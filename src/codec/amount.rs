//! Balance and quantity formatting.
//!
//! Balances are non-negative integers and are validated before they are
//! written into source. Generic-asset quantities may also be raw ledger
//! expressions, which [`format_quantity`] passes through untouched; callers
//! that transact with such text must sandbox it.

use crate::error::{Result, SdkError};
use num_bigint::{BigInt, BigUint, Sign};

/// An amount as supplied by the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum Amount {
    /// Native integer.
    Int(i128),
    /// Floating point number; only finite, integral, non-negative values are valid balances.
    Float(f64),
    /// Arbitrary-precision integer.
    Big(BigInt),
    /// Digit string, or a raw ledger expression for generic assets.
    Text(String),
}

impl Amount {
    /// Whether this amount is caller-supplied text.
    pub fn is_text(&self) -> bool {
        matches!(self, Amount::Text(_))
    }
}

macro_rules! amount_from_int {
    ($($t:ty),*) => {
        $(impl From<$t> for Amount {
            fn from(n: $t) -> Self {
                Amount::Int(i128::from(n))
            }
        })*
    };
}

amount_from_int!(u8, u16, u32, u64, i8, i16, i32, i64, i128);

impl From<u128> for Amount {
    fn from(n: u128) -> Self {
        Amount::Big(BigInt::from(n))
    }
}

impl From<f64> for Amount {
    fn from(n: f64) -> Self {
        Amount::Float(n)
    }
}

impl From<BigInt> for Amount {
    fn from(n: BigInt) -> Self {
        Amount::Big(n)
    }
}

impl From<BigUint> for Amount {
    fn from(n: BigUint) -> Self {
        Amount::Big(BigInt::from(n))
    }
}

impl From<&str> for Amount {
    fn from(s: &str) -> Self {
        Amount::Text(s.to_string())
    }
}

impl From<String> for Amount {
    fn from(s: String) -> Self {
        Amount::Text(s)
    }
}

/// Format a validated balance as a decimal string.
///
/// # Example
///
/// ```
/// use convex_sdk::codec::amount::{format_balance, Amount};
///
/// assert_eq!(format_balance(&Amount::from(1000u64)).unwrap(), "1000");
/// assert_eq!(format_balance(&Amount::from("99999999999999999999")).unwrap(), "99999999999999999999");
/// assert!(format_balance(&Amount::from(-1i64)).is_err());
/// assert!(format_balance(&Amount::from("1e6")).is_err());
/// ```
pub fn format_balance(amount: &Amount) -> Result<String> {
    match amount {
        Amount::Text(s) => {
            if is_digit_string(s) {
                Ok(s.clone())
            } else {
                Err(SdkError::InvalidAmount(format!(
                    "'{}' is not a non-negative integer",
                    s
                )))
            }
        }
        other => format_number(other),
    }
}

/// Format a generic-asset quantity.
///
/// Numbers are validated like balances. Text is returned verbatim and
/// unvalidated.
pub fn format_quantity(amount: &Amount) -> Result<String> {
    match amount {
        Amount::Text(s) => Ok(s.clone()),
        other => format_number(other),
    }
}

fn format_number(amount: &Amount) -> Result<String> {
    match amount {
        Amount::Int(n) if *n >= 0 => Ok(n.to_string()),
        Amount::Int(n) => Err(SdkError::InvalidAmount(format!("{} is negative", n))),
        Amount::Big(n) if n.sign() != Sign::Minus => Ok(n.to_string()),
        Amount::Big(n) => Err(SdkError::InvalidAmount(format!("{} is negative", n))),
        Amount::Float(f) => format_float(*f),
        Amount::Text(s) => Ok(s.clone()),
    }
}

fn format_float(f: f64) -> Result<String> {
    if !f.is_finite() {
        return Err(SdkError::InvalidAmount(format!("{} is not finite", f)));
    }
    if f.fract() != 0.0 {
        return Err(SdkError::InvalidAmount(format!("{} is not an integer", f)));
    }
    if f < 0.0 {
        return Err(SdkError::InvalidAmount(format!("{} is negative", f)));
    }
    // -0.0 passes the checks above and prints without a sign here
    Ok(format!("{:.0}", f.abs()))
}

fn is_digit_string(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn assert_invalid(amount: Amount) {
        match format_balance(&amount) {
            Err(SdkError::InvalidAmount(_)) => {}
            other => panic!("expected InvalidAmount for {:?}, got {:?}", amount, other),
        }
    }

    #[test]
    fn test_balance_accepts_integers() {
        assert_eq!(format_balance(&Amount::from(0u64)).unwrap(), "0");
        assert_eq!(format_balance(&Amount::from(u64::MAX)).unwrap(), "18446744073709551615");
        assert_eq!(format_balance(&Amount::from(250.0)).unwrap(), "250");
        assert_eq!(format_balance(&Amount::from(u128::MAX)).unwrap(), u128::MAX.to_string());
        assert_eq!(format_balance(&Amount::from("0")).unwrap(), "0");
    }

    #[test]
    fn test_balance_rejects_invalid() {
        assert_invalid(Amount::from(-1i32));
        assert_invalid(Amount::from(1.5));
        assert_invalid(Amount::from(-3.0));
        assert_invalid(Amount::from(f64::NAN));
        assert_invalid(Amount::from(f64::INFINITY));
        assert_invalid(Amount::from(BigInt::from(-10)));
        assert_invalid(Amount::from(""));
        assert_invalid(Amount::from("12 "));
        assert_invalid(Amount::from("-5"));
        assert_invalid(Amount::from("100) (transfer #1 1"));
    }

    #[test]
    fn test_quantity_passes_text_through() {
        assert_eq!(format_quantity(&Amount::from("#{:foo :bar}")).unwrap(), "#{:foo :bar}");
        assert_eq!(format_quantity(&Amount::from(12u8)).unwrap(), "12");
        assert!(format_quantity(&Amount::from(-2i64)).is_err());
    }

    proptest! {
        #[test]
        fn prop_digit_strings_pass_through(digits in "[0-9]{1,60}") {
            prop_assert_eq!(format_balance(&Amount::from(digits.as_str())).unwrap(), digits);
        }

        #[test]
        fn prop_negative_integers_rejected(n in i64::MIN..0i64) {
            prop_assert!(format_balance(&Amount::from(n)).is_err());
        }
    }
}
