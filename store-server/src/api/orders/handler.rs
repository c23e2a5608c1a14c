//! Order API Handlers

use axum::{
    Json,
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use shared::models::{Order, OrderStatus, PaymentMethod};

use crate::auth::Actor;
use crate::core::ServerState;
use crate::invoice::InvoiceDocument;
use crate::orders::{CancellationReceipt, Checkout, CheckoutReceipt};
use crate::utils::{AppError, AppResponse, AppResult, ok, ok_with_message};

/// Checkout request. Items and coupon come from the session cart, not the
/// payload.
#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    pub payment_method: PaymentMethod,
    pub address: String,
    pub customer_name: String,
    pub customer_phone: String,
    pub delivery_slot_id: Option<String>,
    #[serde(default)]
    pub points_to_redeem: i64,
    pub idempotency_key: Option<String>,
}

/// Create an order from the session cart
pub async fn checkout(
    State(state): State<ServerState>,
    actor: Actor,
    Json(payload): Json<CheckoutRequest>,
) -> AppResult<Json<AppResponse<CheckoutReceipt>>> {
    let slot = match &payload.delivery_slot_id {
        Some(id) => Some(
            state
                .catalog
                .slot(id)
                .cloned()
                .ok_or_else(|| AppError::NotFound(format!("Delivery slot {id} not found")))?,
        ),
        None => None,
    };

    let cart = state.carts.checkout_snapshot(&actor.session, slot.as_ref());
    let receipt = state
        .orders
        .create(Checkout {
            user_id: actor.id.clone(),
            items: cart.items,
            payment_method: payload.payment_method,
            address: payload.address,
            customer_name: payload.customer_name,
            customer_phone: payload.customer_phone,
            delivery_slot_id: payload.delivery_slot_id,
            coupon_code: cart.coupon_code,
            points_to_redeem: payload.points_to_redeem,
            idempotency_key: payload.idempotency_key,
        })
        .await?;

    if !receipt.replayed {
        state.carts.clear(&actor.session);
    }
    Ok(ok_with_message(receipt, "Order placed"))
}

/// Own orders; admins see all
pub async fn list(
    State(state): State<ServerState>,
    actor: Actor,
) -> AppResult<Json<AppResponse<Vec<Order>>>> {
    let orders = state.orders.list_for(&actor.id, actor.is_admin).await?;
    Ok(ok(orders))
}

pub async fn get_by_id(
    State(state): State<ServerState>,
    actor: Actor,
    Path(id): Path<String>,
) -> AppResult<Json<AppResponse<Order>>> {
    let order = state.orders.get(&id, &actor.id, actor.is_admin).await?;
    Ok(ok(order))
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: OrderStatus,
}

/// Admin: move an order to a forward state
pub async fn update_status(
    State(state): State<ServerState>,
    actor: Actor,
    Path(id): Path<String>,
    Json(payload): Json<UpdateStatusRequest>,
) -> AppResult<Json<AppResponse<Order>>> {
    actor.require_admin()?;
    let order = state.orders.update_status(&id, payload.status).await?;
    Ok(ok(order))
}

/// Cancel inside the 5-minute window
pub async fn cancel(
    State(state): State<ServerState>,
    actor: Actor,
    Path(id): Path<String>,
) -> AppResult<Json<AppResponse<CancellationReceipt>>> {
    let receipt = state.orders.cancel(&id, &actor.id, actor.is_admin).await?;
    Ok(ok_with_message(receipt, "Order cancelled"))
}

#[derive(Debug, Deserialize)]
pub struct AssignRiderRequest {
    pub rider_id: String,
}

/// Admin: dispatch a rider
pub async fn assign_rider(
    State(state): State<ServerState>,
    actor: Actor,
    Path(id): Path<String>,
    Json(payload): Json<AssignRiderRequest>,
) -> AppResult<Json<AppResponse<Order>>> {
    actor.require_admin()?;
    let order = state.orders.assign_rider(&id, &payload.rider_id).await?;
    Ok(ok(order))
}

/// Download the invoice for an order
pub async fn invoice(
    State(state): State<ServerState>,
    actor: Actor,
    Path(id): Path<String>,
) -> AppResult<Response> {
    let order = state.orders.get(&id, &actor.id, actor.is_admin).await?;
    let doc = InvoiceDocument::from_order(&order);
    let body = state.invoices.render(&doc);

    let headers = [
        (
            header::CONTENT_TYPE,
            state.invoices.content_type().to_string(),
        ),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", state.invoices.file_name(&doc)),
        ),
    ];
    Ok((headers, body).into_response())
}
