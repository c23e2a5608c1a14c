//! User Account Model

use serde::{Deserialize, Serialize};

/// User id used for anonymous checkout
pub const GUEST_USER_ID: &str = "guest";

/// Registered user account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserAccount {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default)]
    pub is_admin: bool,
    /// Loyalty points, 1 point = ₹1. Never negative.
    #[serde(default)]
    pub points_balance: i64,
    #[serde(default)]
    pub wallet_balance: i64,
}
