//! API route modules
//!
//! # Structure
//!
//! - [`health`] - health check
//! - [`catalog`] - products, coupons, delivery slots, riders
//! - [`cart`] - session cart and coupon attachment
//! - [`orders`] - checkout and order lifecycle
//! - [`wishlist`] - per-account wishlist
//!
//! Every resource contributes its own `router()`; [`router`] merges them
//! and applies the state.

pub mod cart;
pub mod catalog;
pub mod health;
pub mod orders;
pub mod wishlist;

// Re-export common types for handlers
pub use crate::utils::{AppResponse, AppResult};

use axum::Router;

use crate::core::ServerState;

/// Build the application router
pub fn router(state: ServerState) -> Router {
    Router::new()
        .merge(health::router())
        .merge(catalog::router())
        .merge(cart::router())
        .merge(orders::router())
        .merge(wishlist::router())
        .with_state(state)
}
