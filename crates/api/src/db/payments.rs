//! Payment repository.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use tricity_core::{OrderId, PaymentId};

use super::RepositoryError;
use crate::models::payment::Payment;

/// Internal row type for `payments` queries.
#[derive(Debug, sqlx::FromRow)]
struct PaymentRow {
    id: i32,
    order_id: i32,
    order_ref: String,
    payment_id: String,
    signature: String,
    amount: Decimal,
    status: String,
    created_at: DateTime<Utc>,
}

impl From<PaymentRow> for Payment {
    fn from(row: PaymentRow) -> Self {
        Self {
            id: PaymentId::new(row.id),
            order_id: OrderId::new(row.order_id),
            order_ref: row.order_ref,
            payment_id: row.payment_id,
            signature: row.signature,
            amount: row.amount,
            status: row.status,
            created_at: row.created_at,
        }
    }
}

/// Repository for payment database operations.
pub struct PaymentRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> PaymentRepository<'a> {
    /// Create a new payment repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Record a signature-verified payment attempt.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(
        &self,
        order_id: OrderId,
        order_ref: &str,
        payment_id: &str,
        signature: &str,
        amount: Decimal,
        status: &str,
    ) -> Result<Payment, RepositoryError> {
        let row: PaymentRow = sqlx::query_as(
            "INSERT INTO payments (order_id, order_ref, payment_id, signature, amount, status)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING id, order_id, order_ref, payment_id, signature, amount, status, created_at",
        )
        .bind(order_id.as_i32())
        .bind(order_ref)
        .bind(payment_id)
        .bind(signature)
        .bind(amount)
        .bind(status)
        .fetch_one(self.pool)
        .await?;

        Ok(Payment::from(row))
    }

    /// Most recent payment per order, for a set of orders.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn latest_for_orders(
        &self,
        order_ids: &[i32],
    ) -> Result<Vec<Payment>, RepositoryError> {
        let rows: Vec<PaymentRow> = sqlx::query_as(
            "SELECT DISTINCT ON (order_id)
                 id, order_id, order_ref, payment_id, signature, amount, status, created_at
             FROM payments
             WHERE order_id = ANY($1)
             ORDER BY order_id, created_at DESC",
        )
        .bind(order_ids)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Payment::from).collect())
    }
}
