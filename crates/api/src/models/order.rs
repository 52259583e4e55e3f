//! Order and order item models.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use tricity_core::{AddressId, OrderId, OrderItemId, OrderStatus, ProductId, UserId};

use super::address::Address;
use super::payment::Payment;
use super::product::ProductView;

/// A placed order. Immutable once created except for status transitions.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub total_price: Decimal,
    pub total_amount: Decimal,
    pub address_id: Option<AddressId>,
    pub payment_method: Option<String>,
    pub payment_id: Option<String>,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

/// A line of an order. `price` is the tax-inclusive unit price actually
/// charged, captured at order time and decoupled from the product's current
/// price.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub id: OrderItemId,
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub quantity: i32,
    pub price: Decimal,
}

/// Frontend-facing order line, optionally embedding the product.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemView {
    #[serde(flatten)]
    pub item: OrderItem,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product: Option<ProductView>,
}

/// Frontend-facing order: camelCase entity plus the snake_case aliases the
/// storefront reads, with items embedded.
#[derive(Debug, Clone, Serialize)]
pub struct OrderView {
    #[serde(flatten)]
    pub order: Order,
    pub total_amount: Decimal,
    pub address_id: Option<AddressId>,
    pub payment_method: Option<String>,
    pub payment_id: Option<String>,
    pub items: Vec<OrderItemView>,
}

impl OrderView {
    /// Shape an order with its lines.
    #[must_use]
    pub fn new(order: Order, items: Vec<OrderItemView>) -> Self {
        Self {
            total_amount: order.total_amount,
            address_id: order.address_id,
            payment_method: order.payment_method.clone(),
            payment_id: order.payment_id.clone(),
            order,
            items,
        }
    }
}

/// Admin order listing entry: the order plus the buyer, payment record, and
/// the delivery address expanded from `address_id`.
#[derive(Debug, Clone, Serialize)]
pub struct AdminOrderView {
    #[serde(flatten)]
    pub order: Order,
    pub total_amount: Decimal,
    pub user: AdminOrderUser,
    pub items: Vec<OrderItemView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment: Option<Payment>,
    pub delivery_address: Option<Address>,
}

/// Buyer summary embedded in admin order listings.
#[derive(Debug, Clone, Serialize)]
pub struct AdminOrderUser {
    pub id: UserId,
    pub name: String,
    pub email: String,
}
