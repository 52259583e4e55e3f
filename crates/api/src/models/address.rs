//! Address and pincode models.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use tricity_core::{AddressId, PincodeId, UserId};

/// A postal code carrying a delivery price.
///
/// Created lazily on first reference; many addresses share one row.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pincode {
    pub id: PincodeId,
    pub code: i32,
    pub delivery_price: Decimal,
}

/// A saved delivery address, owned exclusively by its user.
///
/// Cannot be deleted while any order references it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub id: AddressId,
    pub user_id: UserId,
    pub label: String,
    pub house: String,
    pub street: String,
    pub landmark: Option<String>,
    pub address1: Option<String>,
    pub city: String,
    pub pincode_id: PincodeId,
    pub created_at: DateTime<Utc>,
}

/// Frontend-facing address: the entity plus the resolved pincode value and
/// its delivery price.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressView {
    #[serde(flatten)]
    pub address: Address,
    pub delivery_price: Decimal,
    pub pincode_value: i32,
}

impl AddressView {
    /// Combine an address with its pincode row.
    #[must_use]
    pub fn new(address: Address, pincode: &Pincode) -> Self {
        Self {
            address,
            delivery_price: pincode.delivery_price,
            pincode_value: pincode.code,
        }
    }
}
