//! Data models
//!
//! Shared between store-server and clients (via API).
//! All monetary amounts are whole rupees (`i64`); no fractional currency.

pub mod coupon;
pub mod delivery_slot;
pub mod order;
pub mod product;
pub mod rider;
pub mod user;

// Re-exports
pub use coupon::*;
pub use delivery_slot::*;
pub use order::*;
pub use product::*;
pub use rider::*;
pub use user::*;
