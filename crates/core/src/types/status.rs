//! Status enums for orders, payments, and user roles.

use serde::{Deserialize, Serialize};

/// Order lifecycle status.
///
/// Legal transitions: `Pending -> Confirmed -> Shipped -> Delivered`.
/// Any non-terminal status may move to `Cancelled`. `Delivered` and
/// `Cancelled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "marketplace.order_status", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    Confirmed,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// Check whether a transition from `self` to `next` is legal.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Confirmed)
                | (Self::Confirmed, Self::Shipped)
                | (Self::Shipped, Self::Delivered)
                | (
                    Self::Pending | Self::Confirmed | Self::Shipped,
                    Self::Cancelled
                )
        )
    }

    /// Whether this status is terminal (no further transitions).
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }

    /// Stable string form used in query parameters and the database.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        }
    }
}

/// Order payment status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "marketplace.payment_status", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Paid,
    Failed,
    Refunded,
}

/// Payment method chosen at checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "marketplace.payment_method", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    #[default]
    Cod,
    Upi,
    Card,
    NetBanking,
}

/// Marketplace user role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "marketplace.user_role", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    #[default]
    Customer,
    Artisan,
}

impl UserRole {
    /// Parse from a request header or query value.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "customer" => Some(Self::Customer),
            "artisan" => Some(Self::Artisan),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path_transitions() {
        assert!(OrderStatus::Pending.can_transition_to(OrderStatus::Confirmed));
        assert!(OrderStatus::Confirmed.can_transition_to(OrderStatus::Shipped));
        assert!(OrderStatus::Shipped.can_transition_to(OrderStatus::Delivered));
    }

    #[test]
    fn test_cancellation_from_non_terminal() {
        assert!(OrderStatus::Pending.can_transition_to(OrderStatus::Cancelled));
        assert!(OrderStatus::Confirmed.can_transition_to(OrderStatus::Cancelled));
        assert!(OrderStatus::Shipped.can_transition_to(OrderStatus::Cancelled));
        assert!(!OrderStatus::Delivered.can_transition_to(OrderStatus::Cancelled));
    }

    #[test]
    fn test_terminal_states_are_frozen() {
        for next in [
            OrderStatus::Pending,
            OrderStatus::Confirmed,
            OrderStatus::Shipped,
            OrderStatus::Delivered,
            OrderStatus::Cancelled,
        ] {
            assert!(!OrderStatus::Delivered.can_transition_to(next));
            assert!(!OrderStatus::Cancelled.can_transition_to(next));
        }
        assert!(OrderStatus::Delivered.is_terminal());
        assert!(OrderStatus::Cancelled.is_terminal());
    }

    #[test]
    fn test_no_skipping_stages() {
        assert!(!OrderStatus::Pending.can_transition_to(OrderStatus::Shipped));
        assert!(!OrderStatus::Pending.can_transition_to(OrderStatus::Delivered));
        assert!(!OrderStatus::Confirmed.can_transition_to(OrderStatus::Delivered));
    }

    #[test]
    fn test_role_parse() {
        assert_eq!(UserRole::parse("artisan"), Some(UserRole::Artisan));
        assert_eq!(UserRole::parse("customer"), Some(UserRole::Customer));
        assert_eq!(UserRole::parse("admin"), None);
    }
}
