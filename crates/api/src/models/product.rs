//! Product and product image models.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use tricity_core::{CategoryId, ProductId, ProductImageId};

use super::category::{Category, CategoryView};

/// A catalog product.
///
/// The supplier/tax block (`item_code` through `cess`) is imported from the
/// external catalog feed; `item_code` is always present and generated when
/// the feed omits it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub price: Decimal,
    pub original_price: Option<Decimal>,
    pub category_id: CategoryId,
    pub available_stock: i32,
    pub stock_quantity: i32,
    pub rating: Decimal,
    pub reviews_count: i32,
    pub tax_percent: Decimal,
    pub is_featured: bool,
    pub is_bestseller: bool,
    pub is_pipe: bool,
    pub item_code: String,
    pub brand_group: Option<String>,
    pub sdp: Option<Decimal>,
    pub nrp: Option<Decimal>,
    pub mrp: Option<Decimal>,
    pub hsn: Option<String>,
    pub sgst: Option<Decimal>,
    pub cgst: Option<Decimal>,
    pub igst: Option<Decimal>,
    pub cess: Option<Decimal>,
    pub created_at: DateTime<Utc>,
}

/// An image owned by a product, deleted with it (cascade) or when the
/// product's image set is replaced wholesale.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductImage {
    pub id: ProductImageId,
    pub product_id: ProductId,
    pub image_url: String,
    pub alt_text: Option<String>,
    pub sort_order: i32,
}

/// A product together with its category and ordered images.
#[derive(Debug, Clone)]
pub struct ProductWithRelations {
    pub product: Product,
    pub category: Option<Category>,
    pub images: Vec<ProductImage>,
}

/// Frontend-facing product image: both camelCase fields and the legacy
/// snake_case aliases.
#[derive(Debug, Clone, Serialize)]
pub struct ProductImageView {
    pub id: ProductImageId,
    #[serde(rename = "imageUrl")]
    pub image_url_camel: String,
    pub image_url: String,
    #[serde(rename = "altText")]
    pub alt_text_camel: Option<String>,
    pub alt_text: Option<String>,
    #[serde(rename = "sortOrder")]
    pub sort_order_camel: i32,
    pub sort_order: i32,
}

impl From<ProductImage> for ProductImageView {
    fn from(image: ProductImage) -> Self {
        Self {
            id: image.id,
            image_url_camel: image.image_url.clone(),
            image_url: image.image_url,
            alt_text_camel: image.alt_text.clone(),
            alt_text: image.alt_text,
            sort_order_camel: image.sort_order,
            sort_order: image.sort_order,
        }
    }
}

/// Frontend-facing product: the full camelCase entity plus the snake_case
/// aliases the storefront reads (`image_url`, `stock_quantity`,
/// `original_price`, `reviews_count`, `is_pipe`).
#[derive(Debug, Clone, Serialize)]
pub struct ProductView {
    #[serde(flatten)]
    pub product: Product,
    pub image_url: Option<String>,
    pub stock_quantity: i32,
    pub original_price: Option<Decimal>,
    pub reviews_count: i32,
    pub is_pipe: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<CategoryView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<ProductImageView>>,
}

impl ProductView {
    /// Shape a bare product (no relations embedded).
    #[must_use]
    pub fn bare(product: Product) -> Self {
        Self {
            image_url: product.image_url.clone(),
            stock_quantity: product.available_stock,
            original_price: product.original_price,
            reviews_count: product.reviews_count,
            is_pipe: product.is_pipe,
            product,
            category: None,
            images: None,
        }
    }
}

impl From<ProductWithRelations> for ProductView {
    fn from(full: ProductWithRelations) -> Self {
        let mut view = Self::bare(full.product);
        view.category = full.category.map(CategoryView::from);
        view.images = Some(full.images.into_iter().map(ProductImageView::from).collect());
        view
    }
}
