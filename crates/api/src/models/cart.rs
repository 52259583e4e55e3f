//! Cart item model.

use serde::Serialize;

use tricity_core::{CartItemId, ProductId, UserId};

use super::product::ProductView;

/// One logical cart row per (user, product); re-adding increments the
/// quantity, removing decrements it or deletes the row at quantity 1.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub id: CartItemId,
    pub user_id: UserId,
    pub product_id: ProductId,
    pub quantity: i32,
}

/// Frontend-facing cart item with the product (and its category) embedded.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItemView {
    #[serde(flatten)]
    pub item: CartItem,
    pub product: ProductView,
}
