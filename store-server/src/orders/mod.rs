//! Order Module
//!
//! Checkout and the order lifecycle:
//! - [`OrderManager`] - creation, status transitions, rider assignment,
//!   cancellation
//! - [`Checkout`] / [`CheckoutReceipt`] - checkout input and result
//!
//! Lifecycle: `Processing -> Packed -> OutForDelivery -> Delivered`, with
//! `Cancelled` reachable from `Processing` inside the cancellation window.
//! A cancelled order is immutable.

pub mod manager;

pub use manager::OrderManager;

use serde::Serialize;
use shared::models::{LineItem, Order, OrderStatus, PaymentMethod};
use thiserror::Error;

use crate::catalog::RiderClaimError;
use crate::db::RepoError;
use crate::pricing::CouponError;
use crate::utils::AppError;

/// Cancellation is only offered for this long after creation (inclusive)
pub const CANCELLATION_WINDOW_MS: i64 = 5 * 60 * 1000;

/// Checkout input, assembled by the API layer from the session cart and
/// the authenticated actor
#[derive(Debug, Clone)]
pub struct Checkout {
    pub user_id: String,
    pub items: Vec<LineItem>,
    pub payment_method: PaymentMethod,
    pub address: String,
    pub customer_name: String,
    pub customer_phone: String,
    pub delivery_slot_id: Option<String>,
    pub coupon_code: Option<String>,
    pub points_to_redeem: i64,
    /// Client-chosen key; a repeated key replays the original order
    /// instead of creating a second one
    pub idempotency_key: Option<String>,
}

/// Result of a checkout
#[derive(Debug, Serialize)]
pub struct CheckoutReceipt {
    pub order: Order,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_reference: Option<String>,
    /// True when an idempotency key matched a previously created order
    pub replayed: bool,
}

/// Result of a cancellation
#[derive(Debug, Serialize)]
pub struct CancellationReceipt {
    pub order: Order,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refund_note: Option<String>,
}

/// Order operation failures
#[derive(Debug, Error)]
pub enum OrderError {
    // ========== Checkout validation ==========
    #[error("Cart is empty")]
    EmptyCart,

    #[error("Invalid line item: {0}")]
    InvalidItem(String),

    #[error(transparent)]
    Coupon(#[from] CouponError),

    #[error("Unknown delivery slot: {0}")]
    UnknownSlot(String),

    #[error("Unknown user: {0}")]
    UnknownUser(String),

    #[error("Guest checkout cannot redeem points")]
    GuestRedeem,

    #[error("Insufficient points: {available} available")]
    InsufficientPoints { available: i64 },

    #[error("Cannot redeem more points than the order total (₹{grand_total})")]
    RedeemExceedsTotal { grand_total: i64 },

    #[error("Payment declined: {0}")]
    PaymentDeclined(String),

    // ========== Lifecycle ==========
    #[error("Order not found: {0}")]
    NotFound(String),

    #[error("Not your order")]
    NotOwner,

    #[error("A cancelled order cannot be modified")]
    CancelledImmutable,

    #[error("Use the cancel operation to cancel an order")]
    CancelNotAStatus,

    #[error("Cancellation window of 5 minutes has expired")]
    WindowExpired,

    #[error("Only a processing order can be cancelled (current: {0:?})")]
    NotCancellable(OrderStatus),

    #[error("Order {0} is no longer active")]
    OrderInactive(String),

    #[error(transparent)]
    Rider(#[from] RiderClaimError),

    #[error(transparent)]
    Repo(#[from] RepoError),
}

impl From<OrderError> for AppError {
    fn from(err: OrderError) -> Self {
        match err {
            OrderError::EmptyCart
            | OrderError::InvalidItem(_)
            | OrderError::UnknownSlot(_)
            | OrderError::GuestRedeem
            | OrderError::InsufficientPoints { .. }
            | OrderError::RedeemExceedsTotal { .. }
            | OrderError::CancelNotAStatus => AppError::Validation(err.to_string()),

            OrderError::Coupon(_) | OrderError::PaymentDeclined(_) => {
                AppError::BusinessRule(err.to_string())
            }

            OrderError::UnknownUser(_) => AppError::Unauthorized,
            OrderError::NotFound(id) => AppError::NotFound(id),
            OrderError::NotOwner => AppError::Forbidden("order belongs to another account".into()),

            OrderError::CancelledImmutable
            | OrderError::WindowExpired
            | OrderError::NotCancellable(_)
            | OrderError::OrderInactive(_) => AppError::PreconditionFailed(err.to_string()),

            OrderError::Rider(RiderClaimError::NotFound(id)) => AppError::NotFound(id),
            OrderError::Rider(unavailable) => AppError::BusinessRule(unavailable.to_string()),

            OrderError::Repo(RepoError::NotFound(what)) => AppError::NotFound(what),
            OrderError::Repo(other) => AppError::Storage(other.to_string()),
        }
    }
}
