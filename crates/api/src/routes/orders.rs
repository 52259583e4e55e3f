//! Order route handlers.

use std::collections::HashMap;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;

use tricity_core::{AddressId, OrderId, OrderStatus, ProductId};

use crate::db::{OrderRepository, ProductRepository};
use crate::error::{AppError, Result};
use crate::middleware::{RequireAdmin, RequireUser};
use crate::models::order::{Order, OrderItem, OrderItemView, OrderView};
use crate::models::product::ProductView;
use crate::services::orders::{DirectOrderItem, OrderService};
use crate::state::AppState;

// =============================================================================
// Request Types
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct DirectItemBody {
    #[serde(alias = "productId")]
    pub product_id: i32,
    pub quantity: i32,
    pub price: Decimal,
}

#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub total_amount: Option<Decimal>,
    #[serde(alias = "addressId")]
    pub address_id: Option<i32>,
    pub payment_method: Option<String>,
    pub order_items: Option<Vec<DirectItemBody>>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: Option<String>,
}

/// Embed products (with categories) into order lines.
pub(crate) async fn items_with_products(
    state: &AppState,
    items: Vec<OrderItem>,
) -> Result<Vec<OrderItemView>> {
    let product_ids: Vec<i32> = items.iter().map(|i| i.product_id.as_i32()).collect();
    let products = ProductRepository::new(state.pool())
        .list_with_relations_by_ids(&product_ids)
        .await?;

    let by_id: HashMap<i32, ProductView> = products
        .into_iter()
        .map(|p| (p.product.id.as_i32(), ProductView::from(p)))
        .collect();

    Ok(items
        .into_iter()
        .map(|item| {
            let product = by_id.get(&item.product_id.as_i32()).cloned();
            OrderItemView { item, product }
        })
        .collect())
}

// =============================================================================
// Handlers
// =============================================================================

/// POST /api/orders
///
/// With `total_amount` and `order_items` present, the explicit lines and
/// the client-computed total are persisted as sent. Otherwise the order is
/// assembled from the cart at tax-inclusive prices, and the cart is cleared
/// in the same transaction.
pub async fn create(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Json(body): Json<CreateOrderRequest>,
) -> Result<impl IntoResponse> {
    let address_id = body.address_id.map(AddressId::new);
    let service = OrderService::new(state.pool());

    let (order, items) = match (body.total_amount, &body.order_items) {
        (Some(total_amount), Some(order_items)) => {
            let direct: Vec<DirectOrderItem> = order_items
                .iter()
                .map(|item| DirectOrderItem {
                    product_id: ProductId::new(item.product_id),
                    quantity: item.quantity,
                    price: item.price,
                })
                .collect();

            service
                .create_direct(
                    user.id,
                    total_amount,
                    &direct,
                    address_id,
                    body.payment_method.as_deref(),
                )
                .await?
        }
        _ => service.create_from_cart(user.id, address_id).await?,
    };

    let item_views = items_with_products(&state, items).await?;

    Ok((
        StatusCode::CREATED,
        Json(OrderView::new(order, item_views)),
    ))
}

/// GET /api/orders
pub async fn list(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<impl IntoResponse> {
    let repo = OrderRepository::new(state.pool());
    let orders = repo.list_for_user(user.id).await?;

    let order_ids: Vec<i32> = orders.iter().map(|o| o.id.as_i32()).collect();
    let all_items = repo.items_for_orders(&order_ids).await?;

    let mut items_by_order: HashMap<i32, Vec<OrderItem>> = HashMap::new();
    for item in all_items {
        items_by_order
            .entry(item.order_id.as_i32())
            .or_default()
            .push(item);
    }

    let mut views = Vec::with_capacity(orders.len());
    for order in orders {
        let items = items_by_order.remove(&order.id.as_i32()).unwrap_or_default();
        let item_views = items_with_products(&state, items).await?;
        views.push(OrderView::new(order, item_views));
    }

    Ok(Json(views))
}

/// PUT /api/orders/{id}/status (admin)
pub async fn update_status(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<i32>,
    Json(body): Json<UpdateStatusRequest>,
) -> Result<impl IntoResponse> {
    let status = body
        .status
        .as_deref()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::Validation("Status is required".to_owned()))?;

    let status: OrderStatus = status
        .parse()
        .map_err(|e: String| AppError::Validation(e))?;

    let order: Order = OrderRepository::new(state.pool())
        .update_status(OrderId::new(id), status)
        .await
        .map_err(|e| match e {
            crate::db::RepositoryError::NotFound => AppError::NotFound(
                "Order not found or could not update status".to_owned(),
            ),
            other => AppError::Repository(other),
        })?;

    Ok(Json(order))
}
