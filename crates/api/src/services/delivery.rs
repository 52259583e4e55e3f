//! Delivery pricing.
//!
//! Resolves pincodes to delivery prices. Read-only lookups fall back to the
//! default price without creating a row; address creation and updates go
//! through the race-safe get-or-create in the pincode repository.

use rust_decimal::Decimal;
use sqlx::PgPool;

use tricity_core::{AddressId, UserId};

use crate::db::pincodes::DEFAULT_DELIVERY_PRICE;
use crate::db::{AddressRepository, PincodeRepository};
use crate::error::{AppError, Result};
use crate::models::address::{Address, Pincode};

/// A price lookup result.
#[derive(Debug, Clone, Copy)]
pub struct DeliveryQuote {
    pub delivery_price: Decimal,
    /// Whether a stored row backed the price (false means the default).
    pub found: bool,
}

/// Delivery pricing service.
pub struct DeliveryService<'a> {
    pool: &'a PgPool,
}

impl<'a> DeliveryService<'a> {
    /// Create a new delivery service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Quote the delivery price for a pincode without creating a row.
    ///
    /// # Errors
    ///
    /// Fails only on database errors.
    pub async fn quote_for_pincode(&self, code: i32) -> Result<DeliveryQuote> {
        let pincode = PincodeRepository::new(self.pool).get_by_code(code).await?;

        Ok(match pincode {
            Some(pincode) => DeliveryQuote {
                delivery_price: pincode.delivery_price,
                found: true,
            },
            None => DeliveryQuote {
                delivery_price: DEFAULT_DELIVERY_PRICE,
                found: false,
            },
        })
    }

    /// Resolve a pincode row, creating it with the default price on first
    /// use.
    ///
    /// # Errors
    ///
    /// Fails only on database errors.
    pub async fn resolve_pincode(&self, code: i32) -> Result<Pincode> {
        Ok(PincodeRepository::new(self.pool).get_or_create(code).await?)
    }

    /// The delivery price for one of the caller's addresses.
    ///
    /// # Errors
    ///
    /// Returns a not-found error if the address doesn't exist or belongs to
    /// someone else.
    pub async fn quote_for_address(
        &self,
        user_id: UserId,
        address_id: AddressId,
    ) -> Result<(Address, Pincode)> {
        let address = AddressRepository::new(self.pool)
            .get(address_id)
            .await?
            .filter(|a| a.user_id == user_id)
            .ok_or_else(|| AppError::NotFound("Address not found".to_owned()))?;

        let pincode = PincodeRepository::new(self.pool)
            .get_by_id(address.pincode_id)
            .await?
            .ok_or_else(|| {
                AppError::Internal(format!("address {address_id} references missing pincode"))
            })?;

        Ok((address, pincode))
    }
}
