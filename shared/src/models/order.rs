//! Order Model
//!
//! The order record is the authoritative document of a purchase. Identity
//! fields (items, total, timestamps) are fixed at creation; only `status`,
//! the rider reference and derived loyalty effects ever change afterwards.

use serde::{Deserialize, Serialize};

/// Order lifecycle states
///
/// `Processing -> Packed -> OutForDelivery -> Delivered` (terminal), plus
/// `Cancelled` (terminal, reachable only from `Processing`).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Processing,
    Packed,
    OutForDelivery,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// Forward states an admin may set; cancellation goes through `cancel`
    pub fn is_forward(&self) -> bool {
        !matches!(self, Self::Cancelled)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }

    /// Display label used in customer-facing messages
    pub fn label(&self) -> &'static str {
        match self {
            Self::Processing => "Processing",
            Self::Packed => "Packed",
            Self::OutForDelivery => "Out for Delivery",
            Self::Delivered => "Delivered",
            Self::Cancelled => "Cancelled",
        }
    }
}

/// How the order was paid
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    /// Cash on delivery
    Cod,
    /// Online payment via the gateway
    Online,
}

impl PaymentMethod {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Cod => "Cash on Delivery",
            Self::Online => "Online Payment",
        }
    }
}

/// A cart line snapshotted into an order at purchase time.
///
/// `price` is the resolved unit price for the selected unit, which may
/// differ from the product's base price (e.g. "500g" of a per-kg product).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LineItem {
    pub product_id: String,
    /// English name snapshot (invoices and messages)
    pub name: String,
    /// e.g. "500g", "1kg", "1pc"
    pub selected_unit: String,
    /// Resolved unit price, whole rupees. Always > 0.
    pub price: i64,
    /// Always >= 1
    pub quantity: u32,
}

impl LineItem {
    pub fn line_total(&self) -> i64 {
        self.price * i64::from(self.quantity)
    }
}

/// Order record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    /// Human-readable unique id, e.g. `GB-482913`
    pub id: String,
    /// Account id or `"guest"`
    pub user_id: String,
    /// Creation time, UTC millis. Drives the cancellation window.
    pub created_at: i64,
    /// Amount actually charged: grand total minus redeemed points.
    /// Fixed at creation, never recomputed.
    pub total: i64,
    pub status: OrderStatus,
    pub items: Vec<LineItem>,
    pub payment_method: PaymentMethod,
    pub address: String,
    pub customer_name: String,
    pub customer_phone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_slot_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coupon_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rider_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rider_name: Option<String>,
    /// Points spent on this order (1 point = ₹1), fixed at creation
    #[serde(default)]
    pub points_redeemed: i64,
    /// Points earned from this order, fixed at creation
    #[serde(default)]
    pub points_earned: i64,
}

impl Order {
    /// Sum of line totals (before discount, surcharge and redemption)
    pub fn subtotal(&self) -> i64 {
        self.items.iter().map(LineItem::line_total).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_total_multiplies_price_by_quantity() {
        let item = LineItem {
            product_id: "p1".into(),
            name: "Spinach".into(),
            selected_unit: "500g".into(),
            price: 25,
            quantity: 3,
        };
        assert_eq!(item.line_total(), 75);
    }

    #[test]
    fn cancelled_is_not_a_forward_state() {
        assert!(!OrderStatus::Cancelled.is_forward());
        assert!(OrderStatus::Delivered.is_forward());
        assert!(OrderStatus::Delivered.is_terminal());
        assert!(!OrderStatus::Packed.is_terminal());
    }

    #[test]
    fn status_serializes_screaming_snake() {
        let s = serde_json::to_string(&OrderStatus::OutForDelivery).unwrap();
        assert_eq!(s, "\"OUT_FOR_DELIVERY\"");
    }
}
