//! Cart repository.
//!
//! One logical row per (user, product), enforced by a unique constraint.
//! Removal decrements the quantity and deletes the row at 1; the bulk
//! variant deletes the row outright.

use sqlx::PgPool;

use tricity_core::{CartItemId, ProductId, UserId};

use super::RepositoryError;
use crate::models::cart::CartItem;

/// Internal row type for `cart_items` queries.
#[derive(Debug, sqlx::FromRow)]
struct CartItemRow {
    id: i32,
    user_id: i32,
    product_id: i32,
    quantity: i32,
}

impl From<CartItemRow> for CartItem {
    fn from(row: CartItemRow) -> Self {
        Self {
            id: CartItemId::new(row.id),
            user_id: UserId::new(row.user_id),
            product_id: ProductId::new(row.product_id),
            quantity: row.quantity,
        }
    }
}

/// What `remove_one` did to the row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveOutcome {
    /// Quantity was 1; the row is gone.
    Removed,
    /// Quantity was above 1 and has been decremented.
    Decremented,
}

/// Repository for cart database operations.
pub struct CartRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CartRepository<'a> {
    /// Create a new cart repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// All cart rows for a user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<CartItem>, RepositoryError> {
        let rows: Vec<CartItemRow> = sqlx::query_as(
            "SELECT id, user_id, product_id, quantity FROM cart_items
             WHERE user_id = $1
             ORDER BY id",
        )
        .bind(user_id.as_i32())
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(CartItem::from).collect())
    }

    /// Add `quantity` of a product, incrementing the existing row if the
    /// product is already in the cart.
    ///
    /// Returns the resulting row and whether it was newly created.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn add(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: i32,
    ) -> Result<(CartItem, bool), RepositoryError> {
        let existing: Option<CartItemRow> = sqlx::query_as(
            "SELECT id, user_id, product_id, quantity FROM cart_items
             WHERE user_id = $1 AND product_id = $2",
        )
        .bind(user_id.as_i32())
        .bind(product_id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        if let Some(existing) = existing {
            let row: CartItemRow = sqlx::query_as(
                "UPDATE cart_items SET quantity = quantity + $1
                 WHERE id = $2
                 RETURNING id, user_id, product_id, quantity",
            )
            .bind(quantity)
            .bind(existing.id)
            .fetch_one(self.pool)
            .await?;

            return Ok((CartItem::from(row), false));
        }

        let row: CartItemRow = sqlx::query_as(
            "INSERT INTO cart_items (user_id, product_id, quantity)
             VALUES ($1, $2, $3)
             RETURNING id, user_id, product_id, quantity",
        )
        .bind(user_id.as_i32())
        .bind(product_id.as_i32())
        .bind(quantity)
        .fetch_one(self.pool)
        .await?;

        Ok((CartItem::from(row), true))
    }

    /// Decrement a product's quantity, removing the row when it reaches
    /// zero.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product isn't in the cart.
    pub async fn remove_one(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<RemoveOutcome, RepositoryError> {
        let existing: Option<CartItemRow> = sqlx::query_as(
            "SELECT id, user_id, product_id, quantity FROM cart_items
             WHERE user_id = $1 AND product_id = $2",
        )
        .bind(user_id.as_i32())
        .bind(product_id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        let Some(existing) = existing else {
            return Err(RepositoryError::NotFound);
        };

        if existing.quantity <= 1 {
            sqlx::query("DELETE FROM cart_items WHERE id = $1")
                .bind(existing.id)
                .execute(self.pool)
                .await?;

            return Ok(RemoveOutcome::Removed);
        }

        sqlx::query("UPDATE cart_items SET quantity = quantity - 1 WHERE id = $1")
            .bind(existing.id)
            .execute(self.pool)
            .await?;

        Ok(RemoveOutcome::Decremented)
    }

    /// Remove a product from the cart entirely, regardless of quantity.
    ///
    /// Returns how many rows were deleted.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn remove_all(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM cart_items WHERE user_id = $1 AND product_id = $2")
            .bind(user_id.as_i32())
            .bind(product_id.as_i32())
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
