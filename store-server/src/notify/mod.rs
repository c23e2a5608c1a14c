//! Outbound notifications
//!
//! The order core composes a [`Notification`] for every completed
//! transition and hands it to the [`NotifyQueue`]; a background worker
//! delivers through the [`NotificationDispatcher`] seam with a bounded
//! retry policy. Order processing never waits on delivery.

pub mod queue;
pub mod whatsapp;

pub use queue::NotifyQueue;
pub use whatsapp::WhatsAppDispatcher;

use async_trait::async_trait;
use serde::Serialize;
use shared::models::{Order, OrderStatus};
use thiserror::Error;

use crate::catalog::COMPANY_INFO;

/// Who the message is addressed to
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Audience {
    Customer,
    Company,
}

/// Which lifecycle event the message announces
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TemplateKind {
    OrderPlaced,
    StatusChanged,
    Cancelled,
}

/// One outbound message
#[derive(Debug, Clone, Serialize)]
pub struct Notification {
    pub id: String,
    pub audience: Audience,
    pub kind: TemplateKind,
    pub order_id: String,
    /// Destination phone, digits only
    pub phone: String,
    pub text: String,
}

impl Notification {
    fn new(
        audience: Audience,
        kind: TemplateKind,
        order_id: &str,
        phone: &str,
        text: String,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            audience,
            kind,
            order_id: order_id.to_string(),
            phone: phone.to_string(),
            text,
        }
    }

    /// Order-placed pair: one to the company desk, one to the customer
    pub fn order_placed(order: &Order) -> Vec<Self> {
        let items = order
            .items
            .iter()
            .map(|i| format!("{}x {}", i.quantity, i.name))
            .collect::<Vec<_>>()
            .join(", ");
        let text = format!(
            "New Order Placed! Order ID: {} Customer: {} Phone: {} Address: {} Items: {} Total: ₹{}",
            order.id, order.customer_name, order.customer_phone, order.address, items, order.total
        );
        vec![
            Self::new(
                Audience::Company,
                TemplateKind::OrderPlaced,
                &order.id,
                COMPANY_INFO.whatsapp,
                text.clone(),
            ),
            Self::new(
                Audience::Customer,
                TemplateKind::OrderPlaced,
                &order.id,
                &order.customer_phone,
                text,
            ),
        ]
    }

    pub fn status_changed(order: &Order, status: OrderStatus) -> Self {
        let text = format!(
            "Hi {}, your {} order {} is now {}.",
            order.customer_name,
            COMPANY_INFO.name,
            order.id,
            status.label()
        );
        Self::new(
            Audience::Customer,
            TemplateKind::StatusChanged,
            &order.id,
            &order.customer_phone,
            text,
        )
    }

    /// Cancellation pair, company and customer
    pub fn cancelled(order: &Order) -> Vec<Self> {
        let text = format!("Order {} has been CANCELLED by the user.", order.id);
        vec![
            Self::new(
                Audience::Company,
                TemplateKind::Cancelled,
                &order.id,
                COMPANY_INFO.whatsapp,
                text.clone(),
            ),
            Self::new(
                Audience::Customer,
                TemplateKind::Cancelled,
                &order.id,
                &order.customer_phone,
                text,
            ),
        ]
    }
}

/// Delivery failures reported by a dispatcher
#[derive(Debug, Error)]
#[error("Delivery failed: {0}")]
pub struct DispatchError(pub String);

/// Delivery seam. Adapters own the transport (deep link, HTTP API, ...).
#[async_trait]
pub trait NotificationDispatcher: Send + Sync {
    async fn deliver(&self, notification: &Notification) -> Result<(), DispatchError>;
}

/// Dispatcher that records every delivery instead of sending it. Test
/// double for asserting what the order core enqueues.
#[derive(Default)]
pub struct RecordingDispatcher {
    sent: parking_lot::Mutex<Vec<Notification>>,
}

impl RecordingDispatcher {
    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().clone()
    }

    /// Wait for the background worker to deliver at least `count`
    /// messages, then return the full delivery log. Gives up after a
    /// couple of seconds so a missing message fails the assertion
    /// instead of hanging the test.
    pub async fn wait_for(&self, count: usize) -> Vec<Notification> {
        for _ in 0..200 {
            let sent = self.sent();
            if sent.len() >= count {
                return sent;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        self.sent()
    }
}

#[async_trait]
impl NotificationDispatcher for RecordingDispatcher {
    async fn deliver(&self, notification: &Notification) -> Result<(), DispatchError> {
        self.sent.lock().push(notification.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::{LineItem, PaymentMethod};

    fn sample_order() -> Order {
        Order {
            id: "GB-123456".into(),
            user_id: "u1".into(),
            created_at: 0,
            total: 400,
            status: OrderStatus::Processing,
            items: vec![LineItem {
                product_id: "p2".into(),
                name: "Tomato".into(),
                selected_unit: "1kg".into(),
                price: 40,
                quantity: 2,
            }],
            payment_method: PaymentMethod::Cod,
            address: "12 Lake Road".into(),
            customer_name: "Asha".into(),
            customer_phone: "9000000000".into(),
            delivery_slot_id: None,
            coupon_code: None,
            rider_id: None,
            rider_name: None,
            points_redeemed: 0,
            points_earned: 20,
        }
    }

    #[test]
    fn order_placed_goes_to_company_and_customer() {
        let pair = Notification::order_placed(&sample_order());
        assert_eq!(pair.len(), 2);
        assert_eq!(pair[0].audience, Audience::Company);
        assert_eq!(pair[1].audience, Audience::Customer);
        assert!(pair[0].text.contains("2x Tomato"));
        assert!(pair[0].text.contains("₹400"));
    }

    #[test]
    fn status_message_uses_display_label() {
        let n = Notification::status_changed(&sample_order(), OrderStatus::OutForDelivery);
        assert!(n.text.contains("is now Out for Delivery"));
        assert_eq!(n.phone, "9000000000");
    }
}
