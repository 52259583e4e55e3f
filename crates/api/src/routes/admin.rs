//! Admin route handlers.
//!
//! Listings are read-only aggregates; the only write here is the pincode
//! delivery-price upsert.

use std::collections::HashMap;

use axum::{
    Json,
    extract::{Query, State},
    response::IntoResponse,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;

use crate::db::{
    AddressRepository, OrderRepository, PaymentRepository, PincodeRepository, ProductRepository,
    UserRepository,
};
use crate::db::products::ProductFilter;
use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::models::address::Address;
use crate::models::order::{AdminOrderView, OrderItem};
use crate::models::payment::Payment;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertPincodeRequest {
    pub pincode: Option<i32>,
    #[serde(alias = "delivery_price")]
    pub delivery_price: Option<Decimal>,
}

/// GET /api/admin/users
pub async fn list_users(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(query): Query<PageQuery>,
) -> Result<impl IntoResponse> {
    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(50).max(1);
    let offset = (page - 1) * limit;

    let repo = UserRepository::new(state.pool());
    let users = repo.list_summaries(limit, offset).await?;
    let total = repo.count().await?;

    Ok(Json(json!({
        "users": users,
        "pagination": {
            "currentPage": page,
            "totalPages": total.div_ceil(limit),
            "totalUsers": total,
            "limit": limit,
        },
    })))
}

/// GET /api/admin/orders
///
/// Undelivered orders, newest first, with buyer, lines, latest payment, and
/// the delivery address expanded.
pub async fn list_orders(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(query): Query<PageQuery>,
) -> Result<impl IntoResponse> {
    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(20).max(1);
    let offset = (page - 1) * limit;

    let orders_repo = OrderRepository::new(state.pool());
    let orders = orders_repo.list_undelivered(limit, offset).await?;
    let total = orders_repo.count_undelivered().await?;

    let order_ids: Vec<i32> = orders.iter().map(|(o, _)| o.id.as_i32()).collect();

    let mut items_by_order: HashMap<i32, Vec<OrderItem>> = HashMap::new();
    for item in orders_repo.items_for_orders(&order_ids).await? {
        items_by_order
            .entry(item.order_id.as_i32())
            .or_default()
            .push(item);
    }

    let payments_by_order: HashMap<i32, Payment> = PaymentRepository::new(state.pool())
        .latest_for_orders(&order_ids)
        .await?
        .into_iter()
        .map(|p| (p.order_id.as_i32(), p))
        .collect();

    let addresses_repo = AddressRepository::new(state.pool());
    let mut addresses_by_id: HashMap<i32, Address> = HashMap::new();
    for (order, _) in &orders {
        let Some(address_id) = order.address_id else {
            continue;
        };
        if addresses_by_id.contains_key(&address_id.as_i32()) {
            continue;
        }
        if let Some(address) = addresses_repo.get(address_id).await? {
            addresses_by_id.insert(address_id.as_i32(), address);
        }
    }

    let mut views = Vec::with_capacity(orders.len());
    for (order, user) in orders {
        let items = items_by_order.remove(&order.id.as_i32()).unwrap_or_default();
        let item_views = super::orders::items_with_products(&state, items).await?;
        let payment = payments_by_order.get(&order.id.as_i32()).cloned();
        let delivery_address = order
            .address_id
            .and_then(|id| addresses_by_id.get(&id.as_i32()).cloned());

        views.push(AdminOrderView {
            total_amount: order.total_amount,
            order,
            user,
            items: item_views,
            payment,
            delivery_address,
        });
    }

    Ok(Json(json!({
        "orders": views,
        "pagination": {
            "currentPage": page,
            "totalPages": total.div_ceil(limit),
            "totalOrders": total,
            "limit": limit,
        },
    })))
}

/// GET /api/admin/dashboard/stats
///
/// Counts and the revenue sum; an empty orders table reports zero revenue.
pub async fn dashboard_stats(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<impl IntoResponse> {
    let total_users = UserRepository::new(state.pool()).count().await?;
    let orders = OrderRepository::new(state.pool());
    let total_orders = orders.count().await?;
    let total_revenue = orders.revenue_sum().await?;
    let total_products = ProductRepository::new(state.pool())
        .count(&ProductFilter::default())
        .await?;

    Ok(Json(json!({
        "totalUsers": total_users,
        "totalOrders": total_orders,
        "totalProducts": total_products,
        "totalRevenue": total_revenue,
    })))
}

/// POST /api/admin/pincode
pub async fn upsert_pincode_price(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Json(body): Json<UpsertPincodeRequest>,
) -> Result<impl IntoResponse> {
    let (Some(code), Some(delivery_price)) = (body.pincode, body.delivery_price) else {
        return Err(AppError::Validation(
            "Pincode and delivery price are required".to_owned(),
        ));
    };

    let pincode = PincodeRepository::new(state.pool())
        .upsert_price(code, delivery_price)
        .await?;

    Ok(Json(json!({
        "message": "Pincode delivery price updated successfully",
        "pincode": pincode.code,
        "deliveryPrice": pincode.delivery_price,
    })))
}

/// GET /api/admin/pincodes
pub async fn list_pincodes(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(query): Query<PageQuery>,
) -> Result<impl IntoResponse> {
    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(50).clamp(1, 100);
    let offset = (page - 1) * limit;

    let repo = PincodeRepository::new(state.pool());
    let pincodes = repo.list(limit, offset).await?;
    let total = repo.count().await?;
    let total_pages = total.div_ceil(limit);

    Ok(Json(json!({
        "pincodes": pincodes,
        "pagination": {
            "currentPage": page,
            "totalPages": total_pages,
            "totalPincodes": total,
            "hasNextPage": page < total_pages,
            "hasPreviousPage": page > 1,
        },
    })))
}
