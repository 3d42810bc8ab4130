//! Exact decimal values for prices, volumes and balances

use crate::error::{ExchangeError, Result};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Sub;
use std::str::FromStr;

/// Decimal number with an exact string view and a derived f64 view
///
/// Two numbers are equal when their exact strings are equal, so `1.50` and
/// `1.5` are distinct values. Use [`Number::value`] for numeric comparison.
#[derive(Clone, Copy, Debug, Default)]
pub struct Number(Decimal);

impl Number {
    pub const ZERO: Number = Number(Decimal::ZERO);

    pub fn value(&self) -> Decimal {
        self.0
    }

    /// Exact decimal text, scale preserved
    pub fn as_string(&self) -> String {
        self.0.to_string()
    }

    /// Float view derived from the decimal
    pub fn as_f64(&self) -> f64 {
        self.0.to_f64().unwrap_or(f64::NAN)
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }

    /// Parses a venue decimal string, rejecting negative values
    ///
    /// `field` names the value in the error message.
    pub fn parse_non_negative(raw: &str, field: &str) -> Result<Number> {
        let n: Number = raw
            .parse()
            .map_err(|e: ExchangeError| ExchangeError::parse(format!("{}: {}", field, e)))?;
        if n.is_negative() {
            return Err(ExchangeError::parse(format!("{} is negative: {}", field, raw)));
        }
        Ok(n)
    }

    /// Exact product, or `Parse` when it does not fit a decimal
    pub fn checked_mul(&self, rhs: Number) -> Result<Number> {
        self.0
            .checked_mul(rhs.0)
            .map(Number)
            .ok_or_else(|| ExchangeError::parse(format!("{} * {} overflows", self, rhs)))
    }
}

impl FromStr for Number {
    type Err = ExchangeError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        Decimal::from_str(trimmed)
            .or_else(|_| Decimal::from_scientific(trimmed))
            .map(Number)
            .map_err(|_| ExchangeError::parse(format!("not a decimal: {:?}", s)))
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        self.0.mantissa() == other.0.mantissa() && self.0.scale() == other.0.scale()
    }
}

impl Eq for Number {}

impl Hash for Number {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.mantissa().hash(state);
        self.0.scale().hash(state);
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Sub for Number {
    type Output = Number;

    fn sub(self, rhs: Number) -> Number {
        Number(self.0 - rhs.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_exact_string() {
        let n: Number = "0.00002150".parse().unwrap();
        assert_eq!(n.as_string(), "0.00002150");
        assert!((n.as_f64() - 0.0000215).abs() < 1e-12);
    }

    #[test]
    fn equality_is_on_the_exact_string() {
        let a: Number = "1.50".parse().unwrap();
        let b: Number = "1.5".parse().unwrap();
        assert_ne!(a, b);
        assert_eq!(a.value(), b.value());
        assert_eq!(a, "1.50".parse::<Number>().unwrap());
    }

    #[test]
    fn rejects_garbage_and_negatives() {
        assert!("abc".parse::<Number>().is_err());
        let err = Number::parse_non_negative("-1.0", "volume").unwrap_err();
        assert!(err.to_string().contains("volume is negative"));
        assert!(Number::parse_non_negative("0", "balance").unwrap().is_zero());
    }

    #[test]
    fn arithmetic_stays_exact() {
        let price: Number = "0.1".parse().unwrap();
        let volume: Number = "0.2".parse().unwrap();
        assert_eq!(price.checked_mul(volume).unwrap().as_string(), "0.02");
        assert_eq!((volume - price).as_string(), "0.1");
    }

    #[test]
    fn oversized_product_is_a_parse_error() {
        let huge: Number = "79228162514264337593543950335".parse().unwrap();
        let two: Number = "2.0".parse().unwrap();
        let err = huge.checked_mul(two).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Parse);
    }
}
