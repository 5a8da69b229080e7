use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::money::Money;

/// Catalog product. Immutable at runtime; the catalog module owns the list.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub name: String,
    pub price: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_price: Option<Money>,
    pub image: String,
    pub sizes: Vec<String>,
    pub category: String,
}

/// Shipping details captured on the checkout address step. Field names on
/// the wire match the persisted order record.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    pub full_name: String,
    pub phone: String,
    pub email: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub pincode: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Confirmed,
    Shipped,
    Delivered,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "confirmed" => Some(OrderStatus::Confirmed),
            "shipped" => Some(OrderStatus::Shipped),
            "delivered" => Some(OrderStatus::Delivered),
            _ => None,
        }
    }

    /// Position in the lifecycle; drives the customer-facing timeline.
    pub fn ordinal(&self) -> u8 {
        match self {
            OrderStatus::Confirmed => 0,
            OrderStatus::Shipped => 1,
            OrderStatus::Delivered => 2,
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A line of an order, snapshotted from the cart at creation time. Carries
/// its own copy of the product name/image/price so later catalog changes
/// never rewrite a receipt.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_id: String,
    pub product_name: String,
    pub product_image: String,
    pub size: String,
    pub quantity: i32,
    pub price: Money,
}

/// Persisted order record. `id` is ours (`ORD-<epoch_ms>-<4 base36 chars>`);
/// `order_id` is the gateway's identifier for the same payment. The two
/// identifier spaces stay separate fields.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    pub items: Vec<OrderItem>,
    pub address: ShippingAddress,
    pub total: Money,
    pub status: OrderStatus,
    pub payment_id: String,
    pub order_id: String,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_strings() {
        for s in ["confirmed", "shipped", "delivered"] {
            assert_eq!(OrderStatus::parse(s).unwrap().as_str(), s);
        }
        assert!(OrderStatus::parse("refunded").is_none());
    }

    #[test]
    fn status_ordinals_are_monotonic() {
        assert!(OrderStatus::Confirmed.ordinal() < OrderStatus::Shipped.ordinal());
        assert!(OrderStatus::Shipped.ordinal() < OrderStatus::Delivered.ordinal());
    }
}
