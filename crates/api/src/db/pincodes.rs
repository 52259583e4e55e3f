//! Pincode repository.
//!
//! Pincodes are created lazily on first reference from an address or a
//! price lookup. The get-or-create path is the one genuine race in the
//! system: two concurrent first-time requests for the same code may both
//! attempt the insert, so the loser's unique violation is caught and the
//! existing row re-read.

use rust_decimal::Decimal;
use sqlx::PgPool;

use tricity_core::PincodeId;

use super::RepositoryError;
use crate::models::address::Pincode;

/// Delivery price assigned to a pincode on first use.
pub const DEFAULT_DELIVERY_PRICE: Decimal = Decimal::from_parts(1000, 0, 0, false, 1);

/// Internal row type for `pincodes` queries.
#[derive(Debug, sqlx::FromRow)]
struct PincodeRow {
    id: i32,
    code: i32,
    delivery_price: Decimal,
}

impl From<PincodeRow> for Pincode {
    fn from(row: PincodeRow) -> Self {
        Self {
            id: PincodeId::new(row.id),
            code: row.code,
            delivery_price: row.delivery_price,
        }
    }
}

/// Repository for pincode database operations.
pub struct PincodeRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> PincodeRepository<'a> {
    /// Create a new pincode repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a pincode by its ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: PincodeId) -> Result<Option<Pincode>, RepositoryError> {
        let row: Option<PincodeRow> =
            sqlx::query_as("SELECT id, code, delivery_price FROM pincodes WHERE id = $1")
                .bind(id.as_i32())
                .fetch_optional(self.pool)
                .await?;

        Ok(row.map(Pincode::from))
    }

    /// Get a pincode by its numeric code.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_code(&self, code: i32) -> Result<Option<Pincode>, RepositoryError> {
        let row: Option<PincodeRow> =
            sqlx::query_as("SELECT id, code, delivery_price FROM pincodes WHERE code = $1")
                .bind(code)
                .fetch_optional(self.pool)
                .await?;

        Ok(row.map(Pincode::from))
    }

    /// Get the row for a code, inserting it with the default delivery price
    /// on first use.
    ///
    /// A concurrent first-time lookup may win the insert; that unique
    /// violation is treated as "already exists" and the row re-read.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get_or_create(&self, code: i32) -> Result<Pincode, RepositoryError> {
        if let Some(existing) = self.get_by_code(code).await? {
            return Ok(existing);
        }

        let inserted: Result<PincodeRow, sqlx::Error> = sqlx::query_as(
            "INSERT INTO pincodes (code, delivery_price)
             VALUES ($1, $2)
             RETURNING id, code, delivery_price",
        )
        .bind(code)
        .bind(DEFAULT_DELIVERY_PRICE)
        .fetch_one(self.pool)
        .await;

        match inserted {
            Ok(row) => Ok(Pincode::from(row)),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => self
                .get_by_code(code)
                .await?
                .ok_or(RepositoryError::NotFound),
            Err(e) => Err(RepositoryError::Database(e)),
        }
    }

    /// Set a code's delivery price, creating the row if needed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn upsert_price(
        &self,
        code: i32,
        delivery_price: Decimal,
    ) -> Result<Pincode, RepositoryError> {
        let row: PincodeRow = sqlx::query_as(
            "INSERT INTO pincodes (code, delivery_price)
             VALUES ($1, $2)
             ON CONFLICT (code) DO UPDATE SET delivery_price = EXCLUDED.delivery_price
             RETURNING id, code, delivery_price",
        )
        .bind(code)
        .bind(delivery_price)
        .fetch_one(self.pool)
        .await?;

        Ok(Pincode::from(row))
    }

    /// Paginated pincode listing, ordered by code.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, limit: i64, offset: i64) -> Result<Vec<Pincode>, RepositoryError> {
        let rows: Vec<PincodeRow> = sqlx::query_as(
            "SELECT id, code, delivery_price FROM pincodes
             ORDER BY code ASC
             LIMIT $1 OFFSET $2",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Pincode::from).collect())
    }

    /// Count all pincodes.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self) -> Result<i64, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM pincodes")
            .fetch_one(self.pool)
            .await?;

        Ok(count)
    }
}
