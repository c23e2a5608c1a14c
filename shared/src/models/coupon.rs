//! Coupon Model

use serde::{Deserialize, Serialize};

/// Discount kind carried by a coupon
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", content = "value", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiscountType {
    /// Flat amount off, whole rupees
    Flat(i64),
    /// Percentage off the subtotal (0-100)
    Percent(u32),
}

/// Coupon reference data, looked up by code (case-insensitive)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Coupon {
    pub id: String,
    /// Unique, stored upper-case
    pub code: String,
    pub discount: DiscountType,
    /// Minimum cart subtotal for the coupon to apply
    pub min_order: i64,
    pub description: String,
    pub is_active: bool,
}

impl Coupon {
    /// Case-insensitive code match
    pub fn matches(&self, code: &str) -> bool {
        self.code.eq_ignore_ascii_case(code)
    }
}
