//! Wishlist API
//!
//! Product ids saved per account (guests get a shared guest list, matching
//! the storefront's local-storage behaviour).

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use shared::models::Product;

use crate::auth::Actor;
use crate::core::ServerState;
use crate::utils::{AppError, AppResponse, AppResult, ok, ok_with_message};

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/wishlist", get(list))
        .route("/api/wishlist/{product_id}", post(add).delete(remove))
}

/// Wishlist as full products; ids whose product vanished are skipped
async fn list(
    State(state): State<ServerState>,
    actor: Actor,
) -> AppResult<Json<AppResponse<Vec<Product>>>> {
    let ids = state
        .wishlist
        .list(&actor.id)
        .await
        .map_err(|e| AppError::Storage(e.to_string()))?;
    let products = ids
        .iter()
        .filter_map(|id| state.catalog.product(id).cloned())
        .collect();
    Ok(ok(products))
}

async fn add(
    State(state): State<ServerState>,
    actor: Actor,
    Path(product_id): Path<String>,
) -> AppResult<Json<AppResponse<Vec<String>>>> {
    if state.catalog.product(&product_id).is_none() {
        return Err(AppError::NotFound(format!("Product {product_id} not found")));
    }

    let added = state
        .wishlist
        .add(&actor.id, &product_id)
        .await
        .map_err(|e| AppError::Storage(e.to_string()))?;
    let ids = state
        .wishlist
        .list(&actor.id)
        .await
        .map_err(|e| AppError::Storage(e.to_string()))?;

    let message = if added {
        "Added to wishlist"
    } else {
        "Already in wishlist"
    };
    Ok(ok_with_message(ids, message))
}

async fn remove(
    State(state): State<ServerState>,
    actor: Actor,
    Path(product_id): Path<String>,
) -> AppResult<Json<AppResponse<Vec<String>>>> {
    if !state
        .wishlist
        .remove(&actor.id, &product_id)
        .await
        .map_err(|e| AppError::Storage(e.to_string()))?
    {
        return Err(AppError::NotFound(format!(
            "Product {product_id} not in wishlist"
        )));
    }
    let ids = state
        .wishlist
        .list(&actor.id)
        .await
        .map_err(|e| AppError::Storage(e.to_string()))?;
    Ok(ok_with_message(ids, "Removed from wishlist"))
}
