//! Catalog API
//!
//! Read-only reference data. Riders are back-office data and require an
//! admin actor; everything else is public.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use shared::models::{Coupon, DeliverySlot, Product, Rider};

use crate::auth::Actor;
use crate::core::ServerState;
use crate::utils::{AppError, AppResponse, AppResult, ok};

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/products", get(list_products))
        .route("/api/products/{id}", get(get_product))
        .route("/api/coupons", get(list_coupons))
        .route("/api/slots", get(list_slots))
        .route("/api/riders", get(list_riders))
}

async fn list_products(State(state): State<ServerState>) -> Json<AppResponse<Vec<Product>>> {
    ok(state.catalog.products().to_vec())
}

async fn get_product(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<AppResponse<Product>>> {
    let product = state
        .catalog
        .product(&id)
        .cloned()
        .ok_or_else(|| AppError::NotFound(format!("Product {id} not found")))?;
    Ok(ok(product))
}

/// Active coupons only
async fn list_coupons(State(state): State<ServerState>) -> Json<AppResponse<Vec<Coupon>>> {
    ok(state
        .catalog
        .active_coupons()
        .into_iter()
        .cloned()
        .collect())
}

async fn list_slots(State(state): State<ServerState>) -> Json<AppResponse<Vec<DeliverySlot>>> {
    ok(state
        .catalog
        .available_slots()
        .into_iter()
        .cloned()
        .collect())
}

async fn list_riders(
    State(state): State<ServerState>,
    actor: Actor,
) -> AppResult<Json<AppResponse<Vec<Rider>>>> {
    actor.require_admin()?;
    Ok(ok(state.catalog.riders()))
}
