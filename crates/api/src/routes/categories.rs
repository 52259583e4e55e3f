//! Category route handlers.
//!
//! Public reads, admin writes.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;

use tricity_core::CategoryId;

use crate::db::{CategoryRepository, ProductRepository};
use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::models::category::CategoryView;
use crate::models::product::ProductView;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CategoryBody {
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(alias = "imageUrl")]
    pub image_url: Option<String>,
}

/// GET /api/categories
pub async fn list(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let categories = CategoryRepository::new(state.pool()).list().await?;
    let views: Vec<CategoryView> = categories.into_iter().map(CategoryView::from).collect();

    Ok(Json(views))
}

/// GET /api/categories/{id}
///
/// The category with all of its products embedded.
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse> {
    let id = CategoryId::new(id);

    let category = CategoryRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Category not found".to_owned()))?;

    let products = ProductRepository::new(state.pool())
        .list_bare_by_category(id)
        .await?;
    let product_views: Vec<ProductView> = products.into_iter().map(ProductView::bare).collect();

    let mut value = serde_json::to_value(CategoryView::from(category))
        .map_err(|e| AppError::Internal(e.to_string()))?;
    if let Some(object) = value.as_object_mut() {
        object.insert(
            "products".to_owned(),
            serde_json::to_value(product_views).map_err(|e| AppError::Internal(e.to_string()))?,
        );
    }

    Ok(Json(value))
}

/// POST /api/categories (admin)
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Json(body): Json<CategoryBody>,
) -> Result<impl IntoResponse> {
    let name = body
        .name
        .as_deref()
        .filter(|n| !n.is_empty())
        .ok_or_else(|| AppError::Validation("Name is required".to_owned()))?;

    let category = CategoryRepository::new(state.pool())
        .create(name, body.description.as_deref(), body.image_url.as_deref())
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "category": CategoryView::from(category) })),
    ))
}

/// PUT /api/categories/{id} (admin)
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<i32>,
    Json(body): Json<CategoryBody>,
) -> Result<impl IntoResponse> {
    let category = CategoryRepository::new(state.pool())
        .update(
            CategoryId::new(id),
            body.name.as_deref(),
            body.description.as_deref(),
            body.image_url.as_deref(),
        )
        .await?;

    Ok(Json(CategoryView::from(category)))
}

/// DELETE /api/categories/{id} (admin)
pub async fn remove(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse> {
    CategoryRepository::new(state.pool())
        .delete(CategoryId::new(id))
        .await?;

    Ok(Json(json!({ "message": "Category deleted" })))
}
