//! Order repository.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use tricity_core::{AddressId, OrderId, OrderItemId, OrderStatus, ProductId, UserId};

use super::RepositoryError;
use crate::models::order::{AdminOrderUser, Order, OrderItem};

/// A line to capture on a new order. `price` is the tax-inclusive unit
/// price being charged.
#[derive(Debug, Clone)]
pub struct NewOrderItem {
    pub product_id: ProductId,
    pub quantity: i32,
    pub price: Decimal,
}

/// Internal row type for `orders` queries.
#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: i32,
    user_id: i32,
    total_price: Decimal,
    total_amount: Decimal,
    address_id: Option<i32>,
    payment_method: Option<String>,
    payment_id: Option<String>,
    status: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<OrderRow> for Order {
    type Error = RepositoryError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        let status: OrderStatus = row.status.parse().map_err(RepositoryError::DataCorruption)?;

        Ok(Self {
            id: OrderId::new(row.id),
            user_id: UserId::new(row.user_id),
            total_price: row.total_price,
            total_amount: row.total_amount,
            address_id: row.address_id.map(AddressId::new),
            payment_method: row.payment_method,
            payment_id: row.payment_id,
            status,
            created_at: row.created_at,
        })
    }
}

/// Internal row type for `order_items` queries.
#[derive(Debug, sqlx::FromRow)]
struct OrderItemRow {
    id: i32,
    order_id: i32,
    product_id: i32,
    quantity: i32,
    price: Decimal,
}

impl From<OrderItemRow> for OrderItem {
    fn from(row: OrderItemRow) -> Self {
        Self {
            id: OrderItemId::new(row.id),
            order_id: OrderId::new(row.order_id),
            product_id: ProductId::new(row.product_id),
            quantity: row.quantity,
            price: row.price,
        }
    }
}

const ORDER_COLUMNS: &str = "id, user_id, total_price, total_amount, address_id, \
     payment_method, payment_id, status, created_at";

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Persist an order with its lines, optionally clearing the user's cart
    /// in the same transaction.
    ///
    /// The cart clear and the order insert commit atomically; there is no
    /// observable window where the order exists but the cart still holds
    /// its items.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any statement fails; nothing
    /// is persisted in that case.
    pub async fn create_with_items(
        &self,
        user_id: UserId,
        total: Decimal,
        address_id: Option<AddressId>,
        payment_method: Option<&str>,
        items: &[NewOrderItem],
        clear_cart: bool,
    ) -> Result<(Order, Vec<OrderItem>), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let order_row: OrderRow = sqlx::query_as(&format!(
            "INSERT INTO orders (user_id, total_price, total_amount, address_id, payment_method)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {ORDER_COLUMNS}"
        ))
        .bind(user_id.as_i32())
        .bind(total)
        .bind(total)
        .bind(address_id.map(|a| a.as_i32()))
        .bind(payment_method)
        .fetch_one(&mut *tx)
        .await?;

        let mut item_rows = Vec::with_capacity(items.len());
        for item in items {
            let row: OrderItemRow = sqlx::query_as(
                "INSERT INTO order_items (order_id, product_id, quantity, price)
                 VALUES ($1, $2, $3, $4)
                 RETURNING id, order_id, product_id, quantity, price",
            )
            .bind(order_row.id)
            .bind(item.product_id.as_i32())
            .bind(item.quantity)
            .bind(item.price)
            .fetch_one(&mut *tx)
            .await?;

            item_rows.push(row);
        }

        if clear_cart {
            sqlx::query("DELETE FROM cart_items WHERE user_id = $1")
                .bind(user_id.as_i32())
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        let order = Order::try_from(order_row)?;
        let items = item_rows.into_iter().map(OrderItem::from).collect();

        Ok((order, items))
    }

    /// Get an order by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let row: Option<OrderRow> = sqlx::query_as(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"
        ))
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        row.map(Order::try_from).transpose()
    }

    /// A user's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Order>, RepositoryError> {
        let rows: Vec<OrderRow> = sqlx::query_as(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders
             WHERE user_id = $1
             ORDER BY created_at DESC"
        ))
        .bind(user_id.as_i32())
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(Order::try_from).collect()
    }

    /// Lines for a set of orders.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn items_for_orders(
        &self,
        order_ids: &[i32],
    ) -> Result<Vec<OrderItem>, RepositoryError> {
        let rows: Vec<OrderItemRow> = sqlx::query_as(
            "SELECT id, order_id, product_id, quantity, price FROM order_items
             WHERE order_id = ANY($1)
             ORDER BY id",
        )
        .bind(order_ids)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(OrderItem::from).collect())
    }

    /// Transition an order's status.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order doesn't exist.
    pub async fn update_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<Order, RepositoryError> {
        let row: Option<OrderRow> = sqlx::query_as(&format!(
            "UPDATE orders SET status = $1 WHERE id = $2 RETURNING {ORDER_COLUMNS}"
        ))
        .bind(status.as_str())
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        row.map(Order::try_from)
            .transpose()?
            .ok_or(RepositoryError::NotFound)
    }

    /// Paginated admin listing: undelivered orders, newest first, with the
    /// buyer summary joined on.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_undelivered(
        &self,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<(Order, AdminOrderUser)>, RepositoryError> {
        #[derive(sqlx::FromRow)]
        struct JoinedRow {
            #[sqlx(flatten)]
            order: OrderRow,
            user_name: String,
            user_email: String,
        }

        let rows: Vec<JoinedRow> = sqlx::query_as(&format!(
            "SELECT o.id, o.user_id, o.total_price, o.total_amount, o.address_id,
                    o.payment_method, o.payment_id, o.status, o.created_at,
                    u.name AS user_name, u.email AS user_email
             FROM orders o
             JOIN users u ON u.id = o.user_id
             WHERE o.status <> '{}'
             ORDER BY o.created_at DESC
             LIMIT $1 OFFSET $2",
            OrderStatus::Delivered.as_str()
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter()
            .map(|r| {
                let user = AdminOrderUser {
                    id: UserId::new(r.order.user_id),
                    name: r.user_name,
                    email: r.user_email,
                };
                Ok((Order::try_from(r.order)?, user))
            })
            .collect()
    }

    /// Count undelivered orders.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count_undelivered(&self) -> Result<i64, RepositoryError> {
        let count: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM orders WHERE status <> '{}'",
            OrderStatus::Delivered.as_str()
        ))
        .fetch_one(self.pool)
        .await?;

        Ok(count)
    }

    /// Count all orders.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self) -> Result<i64, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
            .fetch_one(self.pool)
            .await?;

        Ok(count)
    }

    /// Sum of all order totals; zero when there are no orders.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn revenue_sum(&self) -> Result<Decimal, RepositoryError> {
        let sum: Decimal = sqlx::query_scalar("SELECT COALESCE(SUM(total_price), 0) FROM orders")
            .fetch_one(self.pool)
            .await?;

        Ok(sum)
    }
}
