//! Payment record model.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use tricity_core::{OrderId, PaymentId};

/// A verified payment attempt against an order.
///
/// Rows exist only for attempts whose gateway signature checked out.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: PaymentId,
    pub order_id: OrderId,
    /// Gateway-side order reference.
    pub order_ref: String,
    /// Gateway-side payment id.
    pub payment_id: String,
    pub signature: String,
    pub amount: Decimal,
    pub status: String,
    pub created_at: DateTime<Utc>,
}
