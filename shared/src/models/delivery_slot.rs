//! Delivery Slot Model

use serde::{Deserialize, Serialize};

/// A named delivery time window with an optional surcharge
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliverySlot {
    pub id: String,
    /// e.g. "Early Morning"
    pub label: String,
    /// e.g. "6:00 AM - 9:00 AM"
    pub window: String,
    /// 0 = free delivery
    pub surcharge: i64,
    pub available: bool,
}
