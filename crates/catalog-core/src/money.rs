//! # Money Module
//!
//! Provides the `Money` type for product prices.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  The `price` column is `numeric`, the REST API sends it as a JSON      │
//! │  number:  { "price": 9.99 }                                             │
//! │                                                                         │
//! │  As f64:  9.99 is really 9.9900000000000002131628...  ❌               │
//! │                                                                         │
//! │  OUR SOLUTION: parse the decimal text into integer cents               │
//! │    "9.99"  → 999 cents                                                  │
//! │    "9.995" → 1000 cents (half-up)                                       │
//! │  and write it back as a two-place decimal.                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use catalog_core::money::Money;
//!
//! let price = Money::from_cents(999);
//! assert_eq!(price.to_string(), "$9.99");
//!
//! let parsed = Money::parse_decimal("9.99").unwrap();
//! assert_eq!(parsed, price);
//! ```

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (cents).
///
/// ## Wire Format
/// Serializes as a JSON decimal number (`9.99`). Deserializes from a JSON
/// number or a decimal string (`"9.99"`), rounding half-up past two places.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    ///
    /// ## Example
    /// ```rust
    /// use catalog_core::money::Money;
    ///
    /// let price = Money::from_cents(1099); // $10.99
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Parses a decimal string such as `"9.99"`, `"10"`, or `"-0.5"`.
    ///
    /// ## Rules
    /// - Optional leading sign
    /// - Digits with at most one `.`
    /// - No exponent, no thousands separators
    /// - Digits past the second decimal place round half-up
    ///
    /// Returns `None` for anything else, or on overflow.
    ///
    /// ## Example
    /// ```rust
    /// use catalog_core::money::Money;
    ///
    /// assert_eq!(Money::parse_decimal("9.99").unwrap().cents(), 999);
    /// assert_eq!(Money::parse_decimal("9.995").unwrap().cents(), 1000);
    /// assert_eq!(Money::parse_decimal("12").unwrap().cents(), 1200);
    /// assert!(Money::parse_decimal("1e3").is_none());
    /// ```
    pub fn parse_decimal(text: &str) -> Option<Money> {
        let text = text.trim();
        let (negative, unsigned) = match text.as_bytes().first()? {
            b'-' => (true, &text[1..]),
            b'+' => (false, &text[1..]),
            _ => (false, text),
        };

        let (whole, fraction) = match unsigned.split_once('.') {
            Some((whole, fraction)) => (whole, fraction),
            None => (unsigned, ""),
        };

        if whole.is_empty() && fraction.is_empty() {
            return None;
        }
        if !whole.bytes().all(|b| b.is_ascii_digit())
            || !fraction.bytes().all(|b| b.is_ascii_digit())
        {
            return None;
        }

        let mut cents: i64 = 0;
        for digit in whole.bytes() {
            cents = cents.checked_mul(10)?.checked_add(i64::from(digit - b'0'))?;
        }

        let mut digits = fraction.bytes();
        for _ in 0..2 {
            let digit = digits.next().map_or(0, |d| i64::from(d - b'0'));
            cents = cents.checked_mul(10)?.checked_add(digit)?;
        }

        // Half-up on the third decimal place
        if matches!(digits.next(), Some(d) if d >= b'5') {
            cents = cents.checked_add(1)?;
        }

        Some(Money(if negative { -cents } else { cents }))
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit (dollars) portion.
    #[inline]
    pub const fn dollars(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit (cents) portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Renders the value as a plain two-place decimal (`"9.99"`, `"-5.50"`).
    pub fn to_decimal_string(&self) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        format!("{}{}.{:02}", sign, self.dollars().abs(), self.cents_part())
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display shows money for humans (`$9.99`).
///
/// ## Note
/// This is for logs and CLI output. Front ends format prices themselves.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(
            f,
            "{}${}.{:02}",
            sign,
            self.dollars().abs(),
            self.cents_part()
        )
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.0 as f64 / 100.0)
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(MoneyVisitor)
    }
}

struct MoneyVisitor;

impl<'de> Visitor<'de> for MoneyVisitor {
    type Value = Money;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a decimal number or decimal string")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Money, E> {
        v.checked_mul(100)
            .map(Money)
            .ok_or_else(|| E::custom("price out of range"))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Money, E> {
        i64::try_from(v)
            .ok()
            .and_then(|v| v.checked_mul(100))
            .map(Money)
            .ok_or_else(|| E::custom("price out of range"))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Money, E> {
        if !v.is_finite() {
            return Err(E::custom("price must be finite"));
        }
        // f64 Display gives the shortest round-trip text, never an exponent
        self.visit_str(&v.to_string())
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Money, E> {
        Money::parse_decimal(v).ok_or_else(|| E::invalid_value(de::Unexpected::Str(v), &self))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cents() {
        let money = Money::from_cents(1099);
        assert_eq!(money.cents(), 1099);
        assert_eq!(money.dollars(), 10);
        assert_eq!(money.cents_part(), 99);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_cents(1099)), "$10.99");
        assert_eq!(format!("{}", Money::from_cents(500)), "$5.00");
        assert_eq!(format!("{}", Money::from_cents(-550)), "-$5.50");
        assert_eq!(format!("{}", Money::from_cents(0)), "$0.00");
    }

    #[test]
    fn test_parse_decimal() {
        assert_eq!(Money::parse_decimal("9.99"), Some(Money::from_cents(999)));
        assert_eq!(Money::parse_decimal("9.9"), Some(Money::from_cents(990)));
        assert_eq!(Money::parse_decimal("9"), Some(Money::from_cents(900)));
        assert_eq!(Money::parse_decimal(".5"), Some(Money::from_cents(50)));
        assert_eq!(Money::parse_decimal("-0.5"), Some(Money::from_cents(-50)));
        assert_eq!(Money::parse_decimal(" 3.10 "), Some(Money::from_cents(310)));
    }

    #[test]
    fn test_parse_decimal_rounds_half_up() {
        assert_eq!(Money::parse_decimal("9.994"), Some(Money::from_cents(999)));
        assert_eq!(Money::parse_decimal("9.995"), Some(Money::from_cents(1000)));
        assert_eq!(Money::parse_decimal("-9.995"), Some(Money::from_cents(-1000)));
    }

    #[test]
    fn test_parse_decimal_rejects_garbage() {
        assert!(Money::parse_decimal("").is_none());
        assert!(Money::parse_decimal("-").is_none());
        assert!(Money::parse_decimal(".").is_none());
        assert!(Money::parse_decimal("1e3").is_none());
        assert!(Money::parse_decimal("1,000").is_none());
        assert!(Money::parse_decimal("abc").is_none());
        assert!(Money::parse_decimal("1.2.3").is_none());
        assert!(Money::parse_decimal("99999999999999999999").is_none());
    }

    #[test]
    fn test_deserialize_from_json_number_and_string() {
        let from_float: Money = serde_json::from_str("9.99").unwrap();
        assert_eq!(from_float.cents(), 999);

        let from_int: Money = serde_json::from_str("12").unwrap();
        assert_eq!(from_int.cents(), 1200);

        let from_str: Money = serde_json::from_str("\"0.10\"").unwrap();
        assert_eq!(from_str.cents(), 10);

        assert!(serde_json::from_str::<Money>("\"ten\"").is_err());
        assert!(serde_json::from_str::<Money>("true").is_err());
    }

    #[test]
    fn test_serialize_as_decimal_number() {
        assert_eq!(serde_json::to_string(&Money::from_cents(999)).unwrap(), "9.99");
        assert_eq!(serde_json::to_string(&Money::from_cents(1000)).unwrap(), "10.0");
        assert_eq!(serde_json::to_value(Money::from_cents(5)).unwrap(), serde_json::json!(0.05));
    }

    #[test]
    fn test_to_decimal_string() {
        assert_eq!(Money::from_cents(999).to_decimal_string(), "9.99");
        assert_eq!(Money::from_cents(-550).to_decimal_string(), "-5.50");
        assert_eq!(Money::zero().to_decimal_string(), "0.00");
    }

    #[test]
    fn test_zero_and_checks() {
        assert!(Money::zero().is_zero());
        assert!(!Money::zero().is_negative());
        assert!(Money::from_cents(-1).is_negative());
    }
}
