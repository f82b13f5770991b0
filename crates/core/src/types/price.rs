//! Type-safe price representation using decimal arithmetic.
//!
//! Prices are stored as `Decimal` in the currency's standard unit (rupees)
//! and converted to integer paise for range-indexed search fields.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

/// A price in Indian rupees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// Create a new price from a decimal rupee amount.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Create a price from integer paise (e.g., 249_900 -> 2499.00).
    #[must_use]
    pub fn from_paise(paise: i64) -> Self {
        Self(Decimal::new(paise, 2))
    }

    /// The decimal rupee amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Convert to integer paise, saturating at zero for negative values.
    ///
    /// Used for the search index's fast range field, which is unsigned.
    #[must_use]
    pub fn as_paise(&self) -> u64 {
        (self.0 * Decimal::new(100, 0))
            .round()
            .to_u64()
            .unwrap_or(0)
    }

    /// Whether this price is negative (never valid for catalog entries).
    #[must_use]
    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }
}

impl From<Decimal> for Price {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl std::fmt::Display for Price {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "₹{:.2}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paise_roundtrip() {
        let price = Price::from_paise(249_900);
        assert_eq!(price.as_paise(), 249_900);
        assert_eq!(price.amount(), Decimal::new(2499, 0));
    }

    #[test]
    fn test_negative_price_detected() {
        let price = Price::new(Decimal::new(-100, 2));
        assert!(price.is_negative());
        assert!(!Price::from_paise(0).is_negative());
    }

    #[test]
    fn test_negative_paise_saturates() {
        let price = Price::new(Decimal::new(-500, 0));
        assert_eq!(price.as_paise(), 0);
    }

    #[test]
    fn test_display() {
        assert_eq!(Price::from_paise(149_950).to_string(), "₹1499.50");
    }
}
