//! Cart route handlers.
//!
//! All routes require a user. Delete routes take a PRODUCT id, mirroring
//! the storefront's contract: one decrements (removing at quantity 1), the
//! `all` variant drops the row outright.

use std::collections::HashMap;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;

use tricity_core::ProductId;

use crate::db::cart::RemoveOutcome;
use crate::db::{CartRepository, ProductRepository};
use crate::error::{AppError, Result};
use crate::middleware::RequireUser;
use crate::models::cart::{CartItem, CartItemView};
use crate::models::product::ProductView;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartRequest {
    pub product_id: Option<i32>,
    pub quantity: Option<i32>,
}

/// Embed products (with categories) into cart rows.
async fn with_products(state: &AppState, items: Vec<CartItem>) -> Result<Vec<CartItemView>> {
    let product_ids: Vec<i32> = items.iter().map(|i| i.product_id.as_i32()).collect();
    let products = ProductRepository::new(state.pool())
        .list_with_relations_by_ids(&product_ids)
        .await?;

    let mut by_id: HashMap<i32, ProductView> = products
        .into_iter()
        .map(|p| (p.product.id.as_i32(), ProductView::from(p)))
        .collect();

    items
        .into_iter()
        .map(|item| {
            let product = by_id.remove(&item.product_id.as_i32()).ok_or_else(|| {
                AppError::Internal(format!("cart references missing product {}", item.product_id))
            })?;
            Ok(CartItemView { item, product })
        })
        .collect()
}

/// POST /api/cart
pub async fn add(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Json(body): Json<AddToCartRequest>,
) -> Result<impl IntoResponse> {
    let product_id = body.product_id;
    let quantity = body.quantity.unwrap_or(0);

    let Some(product_id) = product_id else {
        return Err(AppError::Validation("Invalid product or quantity".to_owned()));
    };
    if quantity < 1 {
        return Err(AppError::Validation("Invalid product or quantity".to_owned()));
    }

    let (item, created) = CartRepository::new(state.pool())
        .add(user.id, ProductId::new(product_id), quantity)
        .await?;

    let mut views = with_products(&state, vec![item]).await?;
    let view = views
        .pop()
        .ok_or_else(|| AppError::Internal("cart row vanished".to_owned()))?;

    let status = if created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };

    Ok((status, Json(view)))
}

/// GET /api/cart
pub async fn list(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<impl IntoResponse> {
    let items = CartRepository::new(state.pool())
        .list_for_user(user.id)
        .await?;
    let views = with_products(&state, items).await?;

    Ok(Json(views))
}

/// DELETE /api/cart/{product_id}
pub async fn remove_one(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(product_id): Path<i32>,
) -> Result<impl IntoResponse> {
    let outcome = CartRepository::new(state.pool())
        .remove_one(user.id, ProductId::new(product_id))
        .await
        .map_err(|e| match e {
            crate::db::RepositoryError::NotFound => {
                AppError::NotFound("Cart item not found".to_owned())
            }
            other => AppError::Repository(other),
        })?;

    let message = match outcome {
        RemoveOutcome::Removed => "Item removed",
        RemoveOutcome::Decremented => "Item quantity decremented",
    };

    Ok(Json(json!({ "message": message })))
}

/// DELETE /api/cart/all/{product_id}
pub async fn remove_all(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(product_id): Path<i32>,
) -> Result<impl IntoResponse> {
    let deleted = CartRepository::new(state.pool())
        .remove_all(user.id, ProductId::new(product_id))
        .await?;

    if deleted == 0 {
        return Err(AppError::NotFound(
            "No cart items found to delete".to_owned(),
        ));
    }

    Ok(Json(json!({
        "message": "All items removed from cart",
        "deletedCount": deleted,
    })))
}
