//! Order API Module
//!
//! Checkout plus the order lifecycle. All mutations go through
//! [`crate::orders::OrderManager`]; handlers only translate HTTP.

mod handler;

use axum::{
    Router,
    routing::{get, patch, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/orders", post(handler::checkout).get(handler::list))
        .route("/api/orders/{id}", get(handler::get_by_id))
        .route("/api/orders/{id}/status", patch(handler::update_status))
        .route("/api/orders/{id}/cancel", post(handler::cancel))
        .route("/api/orders/{id}/rider", post(handler::assign_rider))
        .route("/api/orders/{id}/invoice", get(handler::invoice))
}
