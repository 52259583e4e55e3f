//! Product route handlers.
//!
//! Public reads with filters and pagination; admin writes including the
//! image sub-routes. Image URLs are accepted as strings; hosting is the
//! media host's problem.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use tricity_core::{CategoryId, ProductId, ProductImageId};

use crate::db::products::{NewProduct, NewProductImage, ProductChanges, ProductFilter};
use crate::db::ProductRepository;
use crate::error::{AppError, Result};
use crate::middleware::{RequireAdmin, RequireUser};
use crate::models::product::{ProductImageView, ProductView};
use crate::state::AppState;

const DEFAULT_PAGE_SIZE: i64 = 10;
const MAX_PAGE_SIZE: i64 = 50;

// =============================================================================
// Request Types
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub category: Option<i32>,
    #[serde(alias = "categoryId")]
    pub category_id: Option<i32>,
    pub search: Option<String>,
    #[serde(alias = "isFeatured")]
    pub is_featured: Option<bool>,
    #[serde(alias = "isBestseller")]
    pub is_bestseller: Option<bool>,
    #[serde(alias = "isPipe")]
    pub is_pipe: Option<bool>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// An image in a create/update payload: either a bare URL or an object.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ImageInput {
    Url(String),
    Object {
        #[serde(alias = "imageUrl")]
        image_url: String,
        #[serde(alias = "altText")]
        alt_text: Option<String>,
        #[serde(alias = "sortOrder")]
        sort_order: Option<i32>,
    },
}

#[derive(Debug, Default, Deserialize)]
pub struct ProductBody {
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(alias = "imageUrl")]
    pub image_url: Option<String>,
    pub price: Option<Decimal>,
    #[serde(alias = "originalPrice")]
    pub original_price: Option<Decimal>,
    #[serde(alias = "isFeatured")]
    pub is_featured: Option<bool>,
    #[serde(alias = "isBestseller")]
    pub is_bestseller: Option<bool>,
    #[serde(alias = "isPipe")]
    pub is_pipe: Option<bool>,
    #[serde(alias = "categoryId")]
    pub category_id: Option<i32>,
    #[serde(alias = "availableStock")]
    pub available_stock: Option<i32>,
    #[serde(alias = "stockQuantity")]
    pub stock_quantity: Option<i32>,
    pub rating: Option<Decimal>,
    #[serde(alias = "reviewsCount")]
    pub reviews_count: Option<i32>,
    #[serde(alias = "taxPercent")]
    pub tax_percent: Option<Decimal>,
    #[serde(alias = "itemCode")]
    pub item_code: Option<String>,
    #[serde(alias = "brandGroup")]
    pub brand_group: Option<String>,
    pub sdp: Option<Decimal>,
    pub nrp: Option<Decimal>,
    pub mrp: Option<Decimal>,
    pub hsn: Option<String>,
    pub sgst: Option<Decimal>,
    pub cgst: Option<Decimal>,
    pub igst: Option<Decimal>,
    pub cess: Option<Decimal>,
    pub images: Option<Vec<ImageInput>>,
    #[serde(alias = "imageUrls")]
    pub image_urls: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub struct AddImageBody {
    #[serde(alias = "imageUrl")]
    pub image_url: Option<String>,
    #[serde(alias = "altText")]
    pub alt_text: Option<String>,
    #[serde(alias = "sortOrder")]
    pub sort_order: Option<i32>,
}

/// Normalize the two accepted image payload shapes into insert rows,
/// numbering `sort_order` by position where absent.
fn collect_images(body: &ProductBody, product_name: &str) -> Option<Vec<NewProductImage>> {
    let items: Vec<(String, Option<String>, Option<i32>)> = if let Some(images) = &body.images {
        images
            .iter()
            .map(|input| match input {
                ImageInput::Url(url) => (url.clone(), None, None),
                ImageInput::Object {
                    image_url,
                    alt_text,
                    sort_order,
                } => (image_url.clone(), alt_text.clone(), *sort_order),
            })
            .collect()
    } else if let Some(urls) = &body.image_urls {
        urls.iter().map(|url| (url.clone(), None, None)).collect()
    } else {
        return None;
    };

    Some(
        items
            .into_iter()
            .enumerate()
            .map(|(index, (image_url, alt_text, sort_order))| NewProductImage {
                image_url,
                alt_text: alt_text.or_else(|| Some(format!("{product_name} image {}", index + 1))),
                sort_order: sort_order.unwrap_or_else(|| i32::try_from(index).unwrap_or(i32::MAX)),
            })
            .collect(),
    )
}

// =============================================================================
// Public Handlers
// =============================================================================

/// GET /api/products
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse> {
    let page = query.page.unwrap_or(1).max(1);
    let limit = query
        .limit
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .clamp(1, MAX_PAGE_SIZE);
    let offset = (page - 1) * limit;

    let filter = ProductFilter {
        category_id: query.category.or(query.category_id).map(CategoryId::new),
        search: query.search.clone().filter(|s| !s.is_empty()),
        is_featured: query.is_featured,
        is_bestseller: query.is_bestseller,
        is_pipe: query.is_pipe,
    };

    let repo = ProductRepository::new(state.pool());
    let total = repo.count(&filter).await?;
    let products = repo.list(&filter, limit, offset).await?;
    let views: Vec<ProductView> = products.into_iter().map(ProductView::from).collect();

    let total_pages = total.div_ceil(limit);

    Ok(Json(json!({
        "products": views,
        "pagination": {
            "currentPage": page,
            "totalPages": total_pages,
            "totalProducts": total,
            "hasNextPage": page < total_pages,
            "hasPreviousPage": page > 1,
            "limit": limit,
        },
    })))
}

/// GET /api/products/{id}
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse> {
    let product = ProductRepository::new(state.pool())
        .get(ProductId::new(id))
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".to_owned()))?;

    Ok(Json(ProductView::from(product)))
}

// =============================================================================
// Admin Handlers
// =============================================================================

/// POST /api/products (admin)
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Json(body): Json<ProductBody>,
) -> Result<impl IntoResponse> {
    let name = body
        .name
        .as_deref()
        .filter(|n| !n.is_empty())
        .ok_or_else(|| AppError::Validation("Name and categoryId are required".to_owned()))?;
    let category_id = body
        .category_id
        .ok_or_else(|| AppError::Validation("Name and categoryId are required".to_owned()))?;

    // The catalog feed requires an item code; generate one when absent.
    let item_code = body
        .item_code
        .clone()
        .filter(|c| !c.is_empty())
        .unwrap_or_else(|| format!("ITEM-{}", Uuid::new_v4().simple()));

    let stock = body.stock_quantity.or(body.available_stock).unwrap_or(0);

    let new = NewProduct {
        name: name.to_owned(),
        description: body.description.clone(),
        image_url: body.image_url.clone(),
        price: body.price.unwrap_or(Decimal::ZERO),
        original_price: body.original_price,
        category_id: CategoryId::new(category_id),
        available_stock: stock,
        stock_quantity: stock,
        rating: body.rating.unwrap_or(Decimal::ZERO),
        reviews_count: body.reviews_count.unwrap_or(0),
        tax_percent: body.tax_percent.unwrap_or(Decimal::ZERO),
        is_featured: body.is_featured.unwrap_or(false),
        is_bestseller: body.is_bestseller.unwrap_or(false),
        is_pipe: body.is_pipe.unwrap_or(false),
        item_code,
        brand_group: body.brand_group.clone(),
        sdp: body.sdp,
        nrp: body.nrp,
        mrp: body.mrp,
        hsn: body.hsn.clone(),
        sgst: body.sgst,
        cgst: body.cgst,
        igst: body.igst,
        cess: body.cess,
    };

    let repo = ProductRepository::new(state.pool());
    let product = repo.create(&new).await?;

    if let Some(images) = collect_images(&body, &product.name) {
        repo.add_images(product.id, &images).await?;
    }

    let full = repo
        .get(product.id)
        .await?
        .ok_or_else(|| AppError::Internal("created product vanished".to_owned()))?;

    Ok((StatusCode::CREATED, Json(ProductView::from(full))))
}

/// PUT /api/products/{id} (admin)
///
/// Partial update; an images array replaces the image set wholesale in the
/// same transaction.
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<i32>,
    Json(body): Json<ProductBody>,
) -> Result<impl IntoResponse> {
    let id = ProductId::new(id);
    let stock = body.stock_quantity.or(body.available_stock);

    let changes = ProductChanges {
        name: body.name.clone(),
        description: body.description.clone(),
        image_url: body.image_url.clone(),
        price: body.price,
        original_price: body.original_price,
        category_id: body.category_id.map(CategoryId::new),
        available_stock: stock,
        stock_quantity: stock,
        rating: body.rating,
        reviews_count: body.reviews_count,
        tax_percent: body.tax_percent,
        is_featured: body.is_featured,
        is_bestseller: body.is_bestseller,
        is_pipe: body.is_pipe,
        item_code: body.item_code.clone(),
        brand_group: body.brand_group.clone(),
        sdp: body.sdp,
        nrp: body.nrp,
        mrp: body.mrp,
        hsn: body.hsn.clone(),
        sgst: body.sgst,
        cgst: body.cgst,
        igst: body.igst,
        cess: body.cess,
    };

    let repo = ProductRepository::new(state.pool());
    let images = collect_images(&body, changes.name.as_deref().unwrap_or("Product"));
    repo.update(id, &changes, images.as_deref()).await?;

    let full = repo
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".to_owned()))?;

    Ok(Json(ProductView::from(full)))
}

/// DELETE /api/products/{id} (admin)
pub async fn remove(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse> {
    let (product, deleted_images) = ProductRepository::new(state.pool())
        .delete(ProductId::new(id))
        .await
        .map_err(|e| match e {
            crate::db::RepositoryError::NotFound => {
                AppError::NotFound("Product not found".to_owned())
            }
            other => AppError::Repository(other),
        })?;

    Ok(Json(json!({
        "message": "Product deleted successfully",
        "product": ProductView::bare(product),
        "deletedImagesCount": deleted_images,
    })))
}

// =============================================================================
// Image Sub-route Handlers
// =============================================================================

/// GET /api/products/{id}/images (auth)
pub async fn list_images(
    State(state): State<AppState>,
    RequireUser(_user): RequireUser,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse> {
    let images = ProductRepository::new(state.pool())
        .images(ProductId::new(id))
        .await?;
    let views: Vec<ProductImageView> = images.into_iter().map(ProductImageView::from).collect();

    Ok(Json(json!({ "images": views })))
}

/// POST /api/products/{id}/images (admin)
pub async fn add_image(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<i32>,
    Json(body): Json<AddImageBody>,
) -> Result<impl IntoResponse> {
    let id = ProductId::new(id);
    let repo = ProductRepository::new(state.pool());

    if repo.get(id).await?.is_none() {
        return Err(AppError::NotFound("Product not found".to_owned()));
    }

    let image_url = body
        .image_url
        .filter(|u| !u.is_empty())
        .ok_or_else(|| AppError::Validation("Image URL is required".to_owned()))?;

    let image = repo
        .add_image(
            id,
            &NewProductImage {
                image_url,
                alt_text: body.alt_text.or_else(|| Some("Product image".to_owned())),
                sort_order: body.sort_order.unwrap_or(0),
            },
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Image added successfully",
            "image": ProductImageView::from(image),
        })),
    ))
}

/// DELETE /api/products/images/{image_id} (admin)
pub async fn remove_image(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(image_id): Path<i32>,
) -> Result<impl IntoResponse> {
    let deleted = ProductRepository::new(state.pool())
        .delete_image(ProductImageId::new(image_id))
        .await
        .map_err(|e| match e {
            crate::db::RepositoryError::NotFound => {
                AppError::NotFound("Image not found".to_owned())
            }
            other => AppError::Repository(other),
        })?;

    Ok(Json(json!({
        "message": "Image deleted successfully",
        "deletedImage": ProductImageView::from(deleted),
    })))
}
