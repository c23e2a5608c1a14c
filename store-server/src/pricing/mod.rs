//! Pricing module
//!
//! - [`coupon`]: coupon validation and discount computation
//! - [`cart`]: per-session carts and their invariants
//! - [`totals`]: subtotal / discount / surcharge / grand total math

pub mod cart;
pub mod coupon;
pub mod totals;

pub use cart::{CartService, CartView};
pub use coupon::{AppliedCoupon, CouponEngine, CouponError};
pub use totals::CartTotals;
