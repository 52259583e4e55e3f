//! Product and product image repository.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, QueryBuilder};

use tricity_core::{CategoryId, ProductId, ProductImageId};

use super::RepositoryError;
use crate::models::category::Category;
use crate::models::product::{Product, ProductImage, ProductWithRelations};

/// Filters for the public product listing.
#[derive(Debug, Default, Clone)]
pub struct ProductFilter {
    pub category_id: Option<CategoryId>,
    /// Case-insensitive substring match on name, description, and item code.
    pub search: Option<String>,
    pub is_featured: Option<bool>,
    pub is_bestseller: Option<bool>,
    pub is_pipe: Option<bool>,
}

/// Fields required to insert a new product.
#[derive(Debug, Clone)]
pub struct NewProduct {
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
}

/// Partial update; `None` fields keep their stored value.
#[derive(Debug, Default, Clone)]
pub struct ProductChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub price: Option<Decimal>,
    pub original_price: Option<Decimal>,
    pub category_id: Option<CategoryId>,
    pub available_stock: Option<i32>,
    pub stock_quantity: Option<i32>,
    pub rating: Option<Decimal>,
    pub reviews_count: Option<i32>,
    pub tax_percent: Option<Decimal>,
    pub is_featured: Option<bool>,
    pub is_bestseller: Option<bool>,
    pub is_pipe: Option<bool>,
    pub item_code: Option<String>,
    pub brand_group: Option<String>,
    pub sdp: Option<Decimal>,
    pub nrp: Option<Decimal>,
    pub mrp: Option<Decimal>,
    pub hsn: Option<String>,
    pub sgst: Option<Decimal>,
    pub cgst: Option<Decimal>,
    pub igst: Option<Decimal>,
    pub cess: Option<Decimal>,
}

/// A product image to insert.
#[derive(Debug, Clone)]
pub struct NewProductImage {
    pub image_url: String,
    pub alt_text: Option<String>,
    pub sort_order: i32,
}

/// Internal row type for `products` queries.
#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: i32,
    name: String,
    description: Option<String>,
    image_url: Option<String>,
    price: Decimal,
    original_price: Option<Decimal>,
    category_id: i32,
    available_stock: i32,
    stock_quantity: i32,
    rating: Decimal,
    reviews_count: i32,
    tax_percent: Decimal,
    is_featured: bool,
    is_bestseller: bool,
    is_pipe: bool,
    item_code: String,
    brand_group: Option<String>,
    sdp: Option<Decimal>,
    nrp: Option<Decimal>,
    mrp: Option<Decimal>,
    hsn: Option<String>,
    sgst: Option<Decimal>,
    cgst: Option<Decimal>,
    igst: Option<Decimal>,
    cess: Option<Decimal>,
    created_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: ProductId::new(row.id),
            name: row.name,
            description: row.description,
            image_url: row.image_url,
            price: row.price,
            original_price: row.original_price,
            category_id: CategoryId::new(row.category_id),
            available_stock: row.available_stock,
            stock_quantity: row.stock_quantity,
            rating: row.rating,
            reviews_count: row.reviews_count,
            tax_percent: row.tax_percent,
            is_featured: row.is_featured,
            is_bestseller: row.is_bestseller,
            is_pipe: row.is_pipe,
            item_code: row.item_code,
            brand_group: row.brand_group,
            sdp: row.sdp,
            nrp: row.nrp,
            mrp: row.mrp,
            hsn: row.hsn,
            sgst: row.sgst,
            cgst: row.cgst,
            igst: row.igst,
            cess: row.cess,
            created_at: row.created_at,
        }
    }
}

/// Internal row type for `product_images` queries.
#[derive(Debug, sqlx::FromRow)]
struct ImageRow {
    id: i32,
    product_id: i32,
    image_url: String,
    alt_text: Option<String>,
    sort_order: i32,
}

impl From<ImageRow> for ProductImage {
    fn from(row: ImageRow) -> Self {
        Self {
            id: ProductImageId::new(row.id),
            product_id: ProductId::new(row.product_id),
            image_url: row.image_url,
            alt_text: row.alt_text,
            sort_order: row.sort_order,
        }
    }
}

fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, filter: &ProductFilter) {
    builder.push(" WHERE TRUE");

    if let Some(category_id) = filter.category_id {
        builder.push(" AND category_id = ");
        builder.push_bind(category_id.as_i32());
    }
    if let Some(search) = &filter.search {
        let pattern = format!("%{search}%");
        builder.push(" AND (name ILIKE ");
        builder.push_bind(pattern.clone());
        builder.push(" OR description ILIKE ");
        builder.push_bind(pattern.clone());
        builder.push(" OR item_code ILIKE ");
        builder.push_bind(pattern);
        builder.push(")");
    }
    if let Some(is_featured) = filter.is_featured {
        builder.push(" AND is_featured = ");
        builder.push_bind(is_featured);
    }
    if let Some(is_bestseller) = filter.is_bestseller {
        builder.push(" AND is_bestseller = ");
        builder.push_bind(is_bestseller);
    }
    if let Some(is_pipe) = filter.is_pipe {
        builder.push(" AND is_pipe = ");
        builder.push_bind(is_pipe);
    }
}

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Count products matching a filter.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self, filter: &ProductFilter) -> Result<i64, RepositoryError> {
        let mut builder = QueryBuilder::new("SELECT COUNT(*) FROM products");
        push_filters(&mut builder, filter);

        let count: i64 = builder.build_query_scalar().fetch_one(self.pool).await?;

        Ok(count)
    }

    /// Filtered page of products, newest first, with category and images
    /// embedded.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list(
        &self,
        filter: &ProductFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ProductWithRelations>, RepositoryError> {
        let mut builder = QueryBuilder::new("SELECT * FROM products");
        push_filters(&mut builder, filter);
        builder.push(" ORDER BY created_at DESC LIMIT ");
        builder.push_bind(limit);
        builder.push(" OFFSET ");
        builder.push_bind(offset);

        let rows: Vec<ProductRow> = builder.build_query_as().fetch_all(self.pool).await?;
        let products: Vec<Product> = rows.into_iter().map(Product::from).collect();

        self.attach_relations(products).await
    }

    /// Get a product with its category and ordered images.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get(&self, id: ProductId) -> Result<Option<ProductWithRelations>, RepositoryError> {
        let row: Option<ProductRow> = sqlx::query_as("SELECT * FROM products WHERE id = $1")
            .bind(id.as_i32())
            .fetch_optional(self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let mut full = self.attach_relations(vec![Product::from(row)]).await?;
        Ok(full.pop())
    }

    /// Bare products in a category (no relations embedded).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_bare_by_category(
        &self,
        category_id: CategoryId,
    ) -> Result<Vec<Product>, RepositoryError> {
        let rows: Vec<ProductRow> =
            sqlx::query_as("SELECT * FROM products WHERE category_id = $1 ORDER BY created_at DESC")
                .bind(category_id.as_i32())
                .fetch_all(self.pool)
                .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    /// Bare products by id, for embedding into cart/order lines.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_bare_by_ids(
        &self,
        ids: &[i32],
    ) -> Result<Vec<Product>, RepositoryError> {
        let rows: Vec<ProductRow> = sqlx::query_as("SELECT * FROM products WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(self.pool)
            .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    /// Products by id with category and images embedded, for cart and
    /// order lines.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list_with_relations_by_ids(
        &self,
        ids: &[i32],
    ) -> Result<Vec<ProductWithRelations>, RepositoryError> {
        let rows: Vec<ProductRow> = sqlx::query_as("SELECT * FROM products WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(self.pool)
            .await?;

        self.attach_relations(rows.into_iter().map(Product::from).collect())
            .await
    }

    /// Insert a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, new: &NewProduct) -> Result<Product, RepositoryError> {
        let row: ProductRow = sqlx::query_as(
            "INSERT INTO products (name, description, image_url, price, original_price,
                 category_id, available_stock, stock_quantity, rating, reviews_count,
                 tax_percent, is_featured, is_bestseller, is_pipe, item_code, brand_group,
                 sdp, nrp, mrp, hsn, sgst, cgst, igst, cess)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16,
                 $17, $18, $19, $20, $21, $22, $23, $24)
             RETURNING *",
        )
        .bind(&new.name)
        .bind(&new.description)
        .bind(&new.image_url)
        .bind(new.price)
        .bind(new.original_price)
        .bind(new.category_id.as_i32())
        .bind(new.available_stock)
        .bind(new.stock_quantity)
        .bind(new.rating)
        .bind(new.reviews_count)
        .bind(new.tax_percent)
        .bind(new.is_featured)
        .bind(new.is_bestseller)
        .bind(new.is_pipe)
        .bind(&new.item_code)
        .bind(&new.brand_group)
        .bind(new.sdp)
        .bind(new.nrp)
        .bind(new.mrp)
        .bind(&new.hsn)
        .bind(new.sgst)
        .bind(new.cgst)
        .bind(new.igst)
        .bind(new.cess)
        .fetch_one(self.pool)
        .await?;

        Ok(Product::from(row))
    }

    /// Apply a partial update and, when `images` is present, replace the
    /// product's image set wholesale. Both steps commit atomically.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    pub async fn update(
        &self,
        id: ProductId,
        changes: &ProductChanges,
        images: Option<&[NewProductImage]>,
    ) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            "UPDATE products SET
                 name = COALESCE($1, name),
                 description = COALESCE($2, description),
                 image_url = COALESCE($3, image_url),
                 price = COALESCE($4, price),
                 original_price = COALESCE($5, original_price),
                 category_id = COALESCE($6, category_id),
                 available_stock = COALESCE($7, available_stock),
                 stock_quantity = COALESCE($8, stock_quantity),
                 rating = COALESCE($9, rating),
                 reviews_count = COALESCE($10, reviews_count),
                 tax_percent = COALESCE($11, tax_percent),
                 is_featured = COALESCE($12, is_featured),
                 is_bestseller = COALESCE($13, is_bestseller),
                 is_pipe = COALESCE($14, is_pipe),
                 item_code = COALESCE($15, item_code),
                 brand_group = COALESCE($16, brand_group),
                 sdp = COALESCE($17, sdp),
                 nrp = COALESCE($18, nrp),
                 mrp = COALESCE($19, mrp),
                 hsn = COALESCE($20, hsn),
                 sgst = COALESCE($21, sgst),
                 cgst = COALESCE($22, cgst),
                 igst = COALESCE($23, igst),
                 cess = COALESCE($24, cess)
             WHERE id = $25",
        )
        .bind(&changes.name)
        .bind(&changes.description)
        .bind(&changes.image_url)
        .bind(changes.price)
        .bind(changes.original_price)
        .bind(changes.category_id.map(|c| c.as_i32()))
        .bind(changes.available_stock)
        .bind(changes.stock_quantity)
        .bind(changes.rating)
        .bind(changes.reviews_count)
        .bind(changes.tax_percent)
        .bind(changes.is_featured)
        .bind(changes.is_bestseller)
        .bind(changes.is_pipe)
        .bind(&changes.item_code)
        .bind(&changes.brand_group)
        .bind(changes.sdp)
        .bind(changes.nrp)
        .bind(changes.mrp)
        .bind(&changes.hsn)
        .bind(changes.sgst)
        .bind(changes.cgst)
        .bind(changes.igst)
        .bind(changes.cess)
        .bind(id.as_i32())
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        if let Some(images) = images {
            sqlx::query("DELETE FROM product_images WHERE product_id = $1")
                .bind(id.as_i32())
                .execute(&mut *tx)
                .await?;

            for image in images {
                sqlx::query(
                    "INSERT INTO product_images (product_id, image_url, alt_text, sort_order)
                     VALUES ($1, $2, $3, $4)",
                )
                .bind(id.as_i32())
                .bind(&image.image_url)
                .bind(&image.alt_text)
                .bind(image.sort_order)
                .execute(&mut *tx)
                .await?;
            }
        }

        tx.commit().await?;

        Ok(())
    }

    /// Delete a product; images cascade.
    ///
    /// Returns the deleted product and how many images went with it.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    pub async fn delete(&self, id: ProductId) -> Result<(Product, i64), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let image_count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM product_images WHERE product_id = $1")
                .bind(id.as_i32())
                .fetch_one(&mut *tx)
                .await?;

        let row: Option<ProductRow> =
            sqlx::query_as("DELETE FROM products WHERE id = $1 RETURNING *")
                .bind(id.as_i32())
                .fetch_optional(&mut *tx)
                .await?;

        let Some(row) = row else {
            return Err(RepositoryError::NotFound);
        };

        tx.commit().await?;

        Ok((Product::from(row), image_count))
    }

    /// Ordered images for a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn images(&self, product_id: ProductId) -> Result<Vec<ProductImage>, RepositoryError> {
        let rows: Vec<ImageRow> = sqlx::query_as(
            "SELECT id, product_id, image_url, alt_text, sort_order
             FROM product_images
             WHERE product_id = $1
             ORDER BY sort_order ASC",
        )
        .bind(product_id.as_i32())
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(ProductImage::from).collect())
    }

    /// Append one image to a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn add_image(
        &self,
        product_id: ProductId,
        image: &NewProductImage,
    ) -> Result<ProductImage, RepositoryError> {
        let row: ImageRow = sqlx::query_as(
            "INSERT INTO product_images (product_id, image_url, alt_text, sort_order)
             VALUES ($1, $2, $3, $4)
             RETURNING id, product_id, image_url, alt_text, sort_order",
        )
        .bind(product_id.as_i32())
        .bind(&image.image_url)
        .bind(&image.alt_text)
        .bind(image.sort_order)
        .fetch_one(self.pool)
        .await?;

        Ok(ProductImage::from(row))
    }

    /// Insert a batch of images for a product, `sort_order` following the
    /// slice order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if an insert fails.
    pub async fn add_images(
        &self,
        product_id: ProductId,
        images: &[NewProductImage],
    ) -> Result<(), RepositoryError> {
        for image in images {
            self.add_image(product_id, image).await?;
        }

        Ok(())
    }

    /// Delete one image by its ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the image doesn't exist.
    pub async fn delete_image(&self, id: ProductImageId) -> Result<ProductImage, RepositoryError> {
        let row: Option<ImageRow> = sqlx::query_as(
            "DELETE FROM product_images WHERE id = $1
             RETURNING id, product_id, image_url, alt_text, sort_order",
        )
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        row.map(ProductImage::from).ok_or(RepositoryError::NotFound)
    }

    /// Fetch categories and images for a set of products and zip them on.
    async fn attach_relations(
        &self,
        products: Vec<Product>,
    ) -> Result<Vec<ProductWithRelations>, RepositoryError> {
        if products.is_empty() {
            return Ok(Vec::new());
        }

        let product_ids: Vec<i32> = products.iter().map(|p| p.id.as_i32()).collect();
        let category_ids: Vec<i32> = products.iter().map(|p| p.category_id.as_i32()).collect();

        #[derive(sqlx::FromRow)]
        struct CategoryRow {
            id: i32,
            name: String,
            description: Option<String>,
            image_url: Option<String>,
        }

        let category_rows: Vec<CategoryRow> = sqlx::query_as(
            "SELECT id, name, description, image_url FROM categories WHERE id = ANY($1)",
        )
        .bind(&category_ids)
        .fetch_all(self.pool)
        .await?;

        let categories: HashMap<i32, Category> = category_rows
            .into_iter()
            .map(|r| {
                (
                    r.id,
                    Category {
                        id: CategoryId::new(r.id),
                        name: r.name,
                        description: r.description,
                        image_url: r.image_url,
                    },
                )
            })
            .collect();

        let image_rows: Vec<ImageRow> = sqlx::query_as(
            "SELECT id, product_id, image_url, alt_text, sort_order
             FROM product_images
             WHERE product_id = ANY($1)
             ORDER BY sort_order ASC",
        )
        .bind(&product_ids)
        .fetch_all(self.pool)
        .await?;

        let mut images_by_product: HashMap<i32, Vec<ProductImage>> = HashMap::new();
        for row in image_rows {
            images_by_product
                .entry(row.product_id)
                .or_default()
                .push(ProductImage::from(row));
        }

        Ok(products
            .into_iter()
            .map(|product| {
                let category = categories.get(&product.category_id.as_i32()).cloned();
                let images = images_by_product
                    .remove(&product.id.as_i32())
                    .unwrap_or_default();
                ProductWithRelations {
                    product,
                    category,
                    images,
                }
            })
            .collect())
    }
}
