//! Order domain types.
//!
//! Line items snapshot the product price at purchase time; the order total
//! is computed from those snapshots, never re-read from the catalog.

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use shilpkaar_core::{
    OrderId, OrderItemId, OrderStatus, PaymentMethod, PaymentStatus, Price, ProductId, UserId,
};

use crate::validate::{Validate, ValidationError, Violations};

/// A customer order (domain type).
#[derive(Debug, Clone, Serialize)]
pub struct Order {
    pub id: OrderId,
    /// Human-facing order number. Assigned exactly once at creation,
    /// unique, immutable.
    pub order_number: String,
    pub customer_id: UserId,
    pub items: Vec<OrderItem>,
    /// Sum of `unit_price * quantity` over items.
    pub total: Price,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub payment_method: PaymentMethod,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A single order line item.
#[derive(Debug, Clone, Serialize)]
pub struct OrderItem {
    pub id: OrderItemId,
    pub product_id: ProductId,
    pub quantity: i32,
    /// Product price at the moment the order was placed.
    pub unit_price: Price,
}

/// Write payload for placing an order.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    pub items: Vec<NewOrderItem>,
    #[serde(default)]
    pub payment_method: PaymentMethod,
}

/// A requested line item; the price snapshot is taken server-side.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrderItem {
    pub product_id: ProductId,
    pub quantity: i32,
}

impl Validate for NewOrder {
    fn validate(&self) -> Result<(), ValidationError> {
        let mut v = Violations::new();

        if self.items.is_empty() {
            v.add("items", "must contain at least one item");
        }
        if self.items.iter().any(|i| i.quantity < 1) {
            v.add("items.quantity", "must be at least 1");
        }

        v.finish()
    }
}

/// Alphabet for the random order-number suffix. Excludes 0/O and 1/I to keep
/// numbers readable over the phone.
const SUFFIX_ALPHABET: &[u8] = b"23456789ABCDEFGHJKLMNPQRSTUVWXYZ";
const SUFFIX_LEN: usize = 6;

/// Generate a candidate order number, e.g. `ORD-20260830-K7Q2MX`.
///
/// Uniqueness is enforced by the database constraint; on collision the
/// repository retries with a fresh candidate.
#[must_use]
pub fn generate_order_number(now: DateTime<Utc>, rng: &mut impl Rng) -> String {
    let suffix: String = (0..SUFFIX_LEN)
        .map(|_| {
            let idx = rng.random_range(0..SUFFIX_ALPHABET.len());
            char::from(SUFFIX_ALPHABET.get(idx).copied().unwrap_or(b'Z'))
        })
        .collect();
    format!("ORD-{}-{suffix}", now.format("%Y%m%d"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_order_number_format() {
        let now = Utc.with_ymd_and_hms(2026, 8, 30, 12, 0, 0).single().expect("valid");
        let number = generate_order_number(now, &mut rand::rng());
        assert!(number.starts_with("ORD-20260830-"));
        assert_eq!(number.len(), "ORD-20260830-".len() + SUFFIX_LEN);
        assert!(
            number
                .rsplit('-')
                .next()
                .expect("suffix")
                .bytes()
                .all(|b| SUFFIX_ALPHABET.contains(&b))
        );
    }

    #[test]
    fn test_empty_order_rejected() {
        let order = NewOrder {
            items: vec![],
            payment_method: PaymentMethod::Cod,
        };
        let err = order.validate().expect_err("must fail");
        assert_eq!(err.violations[0].field, "items");
    }

    #[test]
    fn test_zero_quantity_rejected() {
        let order = NewOrder {
            items: vec![NewOrderItem {
                product_id: ProductId::new(1),
                quantity: 0,
            }],
            payment_method: PaymentMethod::Upi,
        };
        let err = order.validate().expect_err("must fail");
        assert_eq!(err.violations[0].field, "items.quantity");
    }
}
