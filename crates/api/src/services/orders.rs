//! Pricing and order assembly.
//!
//! Turns either the user's cart or an explicit client-priced line list into
//! a persisted order. Cart-sourced orders price each line at the
//! tax-inclusive unit price and clear the cart in the same transaction as
//! the insert.

use std::collections::HashMap;

use rust_decimal::Decimal;
use sqlx::PgPool;

use tricity_core::{AddressId, ProductId, UserId};

use crate::db::orders::{NewOrderItem, OrderRepository};
use crate::db::{AddressRepository, CartRepository, ProductRepository};
use crate::error::{AppError, Result};
use crate::models::order::{Order, OrderItem};

/// Tax-inclusive unit price: `price + price * tax_percent / 100`.
#[must_use]
pub fn unit_price_with_tax(price: Decimal, tax_percent: Decimal) -> Decimal {
    price + price * tax_percent / Decimal::ONE_HUNDRED
}

/// An explicit, client-priced order line.
#[derive(Debug, Clone)]
pub struct DirectOrderItem {
    pub product_id: ProductId,
    pub quantity: i32,
    pub price: Decimal,
}

/// Order assembly service.
pub struct OrderService<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderService<'a> {
    /// Create a new order service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Persist an order from an explicit line list with a client-computed
    /// total (typically already including delivery).
    ///
    /// The total is trusted as sent and not recomputed against the line
    /// prices; see DESIGN.md for the recorded integrity gap. The cart is
    /// untouched.
    ///
    /// # Errors
    ///
    /// Fails with a validation error if `address_id` doesn't resolve to an
    /// address owned by the user; no order is created in that case.
    pub async fn create_direct(
        &self,
        user_id: UserId,
        total_amount: Decimal,
        items: &[DirectOrderItem],
        address_id: Option<AddressId>,
        payment_method: Option<&str>,
    ) -> Result<(Order, Vec<OrderItem>)> {
        self.validate_address(user_id, address_id).await?;

        let new_items: Vec<NewOrderItem> = items
            .iter()
            .map(|item| NewOrderItem {
                product_id: item.product_id,
                quantity: item.quantity,
                price: item.price,
            })
            .collect();

        let (order, items) = OrderRepository::new(self.pool)
            .create_with_items(
                user_id,
                total_amount,
                address_id,
                payment_method,
                &new_items,
                false,
            )
            .await?;

        Ok((order, items))
    }

    /// Persist an order from the user's cart, pricing each line at the
    /// tax-inclusive unit price, then clear the cart - all in one
    /// transaction.
    ///
    /// # Errors
    ///
    /// Fails with a validation error if the cart is empty (a zero-item
    /// order is never created) or if `address_id` isn't owned by the user.
    pub async fn create_from_cart(
        &self,
        user_id: UserId,
        address_id: Option<AddressId>,
    ) -> Result<(Order, Vec<OrderItem>)> {
        self.validate_address(user_id, address_id).await?;

        let cart_items = CartRepository::new(self.pool).list_for_user(user_id).await?;
        if cart_items.is_empty() {
            return Err(AppError::Validation("Cart is empty".to_owned()));
        }

        let product_ids: Vec<i32> = cart_items.iter().map(|i| i.product_id.as_i32()).collect();
        let products = ProductRepository::new(self.pool)
            .list_bare_by_ids(&product_ids)
            .await?;
        let prices: HashMap<i32, (Decimal, Decimal)> = products
            .into_iter()
            .map(|p| (p.id.as_i32(), (p.price, p.tax_percent)))
            .collect();

        let mut total = Decimal::ZERO;
        let mut new_items = Vec::with_capacity(cart_items.len());

        for item in &cart_items {
            let (price, tax_percent) =
                prices.get(&item.product_id.as_i32()).copied().ok_or_else(|| {
                    AppError::Internal(format!(
                        "cart references missing product {}",
                        item.product_id
                    ))
                })?;

            let unit_price = unit_price_with_tax(price, tax_percent);
            total += unit_price * Decimal::from(item.quantity);

            new_items.push(NewOrderItem {
                product_id: item.product_id,
                quantity: item.quantity,
                price: unit_price,
            });
        }

        let (order, items) = OrderRepository::new(self.pool)
            .create_with_items(user_id, total, address_id, None, &new_items, true)
            .await?;

        Ok((order, items))
    }

    /// A supplied address must exist and belong to the ordering user.
    async fn validate_address(
        &self,
        user_id: UserId,
        address_id: Option<AddressId>,
    ) -> Result<()> {
        let Some(address_id) = address_id else {
            return Ok(());
        };

        let address = AddressRepository::new(self.pool).get(address_id).await?;

        match address {
            Some(address) if address.user_id == user_id => Ok(()),
            _ => Err(AppError::Validation("Invalid address selected".to_owned())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().expect("valid decimal")
    }

    #[test]
    fn tax_inclusive_price_adds_the_percentage() {
        assert_eq!(unit_price_with_tax(dec("100"), dec("18")), dec("118.00"));
        assert_eq!(unit_price_with_tax(dec("250.50"), dec("12")), dec("280.5600"));
    }

    #[test]
    fn zero_tax_leaves_the_price_unchanged() {
        assert_eq!(unit_price_with_tax(dec("99.99"), Decimal::ZERO), dec("99.99"));
    }

    #[test]
    fn cart_total_is_the_sum_of_priced_lines() {
        // Two of a 100 + 18% item, one of a 50 + 5% item.
        let lines = [(dec("100"), dec("18"), 2), (dec("50"), dec("5"), 1)];
        let total: Decimal = lines
            .iter()
            .map(|(price, tax, qty)| unit_price_with_tax(*price, *tax) * Decimal::from(*qty))
            .sum();

        assert_eq!(total, dec("288.50"));
    }
}
