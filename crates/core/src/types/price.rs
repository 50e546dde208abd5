//! Type-safe price representation using decimal arithmetic.
//!
//! Documents store prices as plain JSON numbers; in memory they are
//! [`Decimal`] so totals never drift.

use core::fmt;
use core::iter::Sum;
use core::ops::{Add, Mul, Sub};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Currency symbol used when rendering prices.
pub const CURRENCY_SYMBOL: &str = "₹";

/// An amount of money in rupees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(#[serde(with = "rust_decimal::serde::float")] Decimal);

impl Price {
    /// Zero rupees.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a price from a decimal amount.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Create a price from a whole number of rupees.
    #[must_use]
    pub fn from_rupees(rupees: i64) -> Self {
        Self(Decimal::from(rupees))
    }

    /// Parse a price from form input such as `"1299"` or `"49.50"`.
    ///
    /// Returns `None` for unparseable or negative input.
    #[must_use]
    pub fn parse(input: &str) -> Option<Self> {
        let amount: Decimal = input.trim().parse().ok()?;
        (!amount.is_sign_negative()).then_some(Self(amount))
    }

    /// The underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Multiply by a quantity.
    #[must_use]
    pub fn times(self, quantity: u32) -> Self {
        Self(self.0 * Decimal::from(quantity))
    }

    /// Round to two decimal places for display and storage.
    #[must_use]
    pub fn rounded(self) -> Self {
        Self(self.0.round_dp(2))
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{CURRENCY_SYMBOL}{:.2}", self.0.round_dp(2))
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Price {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self(self.0 - rhs.0)
    }
}

impl Mul<Decimal> for Price {
    type Output = Self;

    fn mul(self, rhs: Decimal) -> Self {
        Self(self.0 * rhs)
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl From<Decimal> for Price {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_display_uses_rupee_and_two_places() {
        assert_eq!(Price::from_rupees(190).to_string(), "₹190.00");
        assert_eq!(Price::parse("4.5").unwrap().to_string(), "₹4.50");
    }

    #[test]
    fn test_parse_rejects_negative_and_garbage() {
        assert!(Price::parse("-1").is_none());
        assert!(Price::parse("abc").is_none());
        assert_eq!(Price::parse(" 12.25 "), Some(Price::new(Decimal::new(1225, 2))));
    }

    #[test]
    fn test_serializes_as_json_number() {
        let json = serde_json::to_value(Price::from_rupees(100)).unwrap();
        assert!(json.is_number());
        let back: Price = serde_json::from_value(serde_json::json!(99.5)).unwrap();
        assert_eq!(back, Price::new(Decimal::new(995, 1)));
    }

    #[test]
    fn test_times_and_sum() {
        let total: Price = [Price::from_rupees(100).times(2), Price::from_rupees(5)]
            .into_iter()
            .sum();
        assert_eq!(total, Price::from_rupees(205));
    }
}
