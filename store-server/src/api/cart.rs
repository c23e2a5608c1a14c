//! Cart API
//!
//! Carts are keyed by the actor's session. Prices always come from the
//! catalog; a client cannot submit its own.

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::{get, post},
};
use serde::Deserialize;
use shared::models::LineItem;

use crate::auth::Actor;
use crate::core::ServerState;
use crate::pricing::cart::CartError;
use crate::pricing::{CartView, CouponError};
use crate::utils::{AppError, AppResponse, AppResult, ok, ok_with_message};

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/cart", get(view).delete(clear))
        .route(
            "/api/cart/items",
            post(add_item).patch(update_quantity).delete(remove_item),
        )
        .route("/api/cart/coupon", post(apply_coupon).delete(remove_coupon))
}

#[derive(Debug, Deserialize)]
struct ViewQuery {
    /// Delivery slot whose surcharge should be included in totals
    slot: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AddItemRequest {
    product_id: String,
    /// Defaults to the product's base unit
    selected_unit: Option<String>,
    #[serde(default = "one")]
    quantity: u32,
}

fn one() -> u32 {
    1
}

#[derive(Debug, Deserialize)]
struct UpdateQuantityRequest {
    product_id: String,
    selected_unit: String,
    quantity: u32,
}

#[derive(Debug, Deserialize)]
struct RemoveItemRequest {
    product_id: String,
    selected_unit: String,
}

#[derive(Debug, Deserialize)]
struct ApplyCouponRequest {
    code: String,
}

async fn view(
    State(state): State<ServerState>,
    actor: Actor,
    Query(query): Query<ViewQuery>,
) -> AppResult<Json<AppResponse<CartView>>> {
    let slot = resolve_slot(&state, query.slot.as_deref())?;
    Ok(ok(state.carts.view(&actor.session, slot.as_ref())))
}

async fn add_item(
    State(state): State<ServerState>,
    actor: Actor,
    Json(payload): Json<AddItemRequest>,
) -> AppResult<Json<AppResponse<CartView>>> {
    let product = state
        .catalog
        .product(&payload.product_id)
        .ok_or_else(|| AppError::NotFound(format!("Product {} not found", payload.product_id)))?;

    let item = LineItem {
        product_id: product.id.clone(),
        name: product.name.en.clone(),
        selected_unit: payload
            .selected_unit
            .unwrap_or_else(|| product.base_unit.clone()),
        price: product.price,
        quantity: payload.quantity,
    };
    state
        .carts
        .add_item(&actor.session, item)
        .map_err(cart_error)?;
    Ok(ok(state.carts.view(&actor.session, None)))
}

async fn update_quantity(
    State(state): State<ServerState>,
    actor: Actor,
    Json(payload): Json<UpdateQuantityRequest>,
) -> AppResult<Json<AppResponse<CartView>>> {
    state
        .carts
        .update_quantity(
            &actor.session,
            &payload.product_id,
            &payload.selected_unit,
            payload.quantity,
        )
        .map_err(cart_error)?;
    Ok(ok(state.carts.view(&actor.session, None)))
}

async fn remove_item(
    State(state): State<ServerState>,
    actor: Actor,
    Json(payload): Json<RemoveItemRequest>,
) -> AppResult<Json<AppResponse<CartView>>> {
    if !state
        .carts
        .remove_item(&actor.session, &payload.product_id, &payload.selected_unit)
    {
        return Err(AppError::NotFound(format!(
            "Item {} not in cart",
            payload.product_id
        )));
    }
    Ok(ok(state.carts.view(&actor.session, None)))
}

async fn clear(
    State(state): State<ServerState>,
    actor: Actor,
) -> Json<AppResponse<CartView>> {
    state.carts.clear(&actor.session);
    ok(state.carts.view(&actor.session, None))
}

async fn apply_coupon(
    State(state): State<ServerState>,
    actor: Actor,
    Json(payload): Json<ApplyCouponRequest>,
) -> AppResult<Json<AppResponse<CartView>>> {
    let discount = state
        .carts
        .apply_coupon(&actor.session, &payload.code)
        .map_err(coupon_error)?;
    Ok(ok_with_message(
        state.carts.view(&actor.session, None),
        format!("Coupon applied, you save ₹{discount}"),
    ))
}

async fn remove_coupon(
    State(state): State<ServerState>,
    actor: Actor,
) -> Json<AppResponse<CartView>> {
    state.carts.remove_coupon(&actor.session);
    ok(state.carts.view(&actor.session, None))
}

fn resolve_slot(
    state: &ServerState,
    slot_id: Option<&str>,
) -> Result<Option<shared::models::DeliverySlot>, AppError> {
    match slot_id {
        Some(id) => {
            let slot = state
                .catalog
                .slot(id)
                .cloned()
                .ok_or_else(|| AppError::NotFound(format!("Delivery slot {id} not found")))?;
            Ok(Some(slot))
        }
        None => Ok(None),
    }
}

fn cart_error(err: CartError) -> AppError {
    match err {
        CartError::ItemNotFound(id) => AppError::NotFound(format!("Item {id} not in cart")),
        other => AppError::Validation(other.to_string()),
    }
}

fn coupon_error(err: CouponError) -> AppError {
    match err {
        CouponError::InvalidCode => AppError::NotFound("Invalid coupon code".into()),
        other => AppError::BusinessRule(other.to_string()),
    }
}
