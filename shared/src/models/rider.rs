//! Rider Model

use serde::{Deserialize, Serialize};

/// Rider availability state
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiderStatus {
    Available,
    Busy,
    Offline,
}

/// Delivery rider entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rider {
    pub id: String,
    pub name: String,
    pub phone: String,
    pub status: RiderStatus,
    /// Order currently assigned, only while `Busy`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_order_id: Option<String>,
    pub rating: f32,
    pub vehicle: String,
}
