//! Address repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use tricity_core::{AddressId, PincodeId, UserId};

use super::RepositoryError;
use crate::models::address::Address;

/// Fields required to insert a new address.
#[derive(Debug)]
pub struct NewAddress<'a> {
    pub user_id: UserId,
    pub label: &'a str,
    pub house: &'a str,
    pub street: &'a str,
    pub landmark: Option<&'a str>,
    pub address1: Option<&'a str>,
    pub city: &'a str,
    pub pincode_id: PincodeId,
}

/// Partial update; `None` fields keep their stored value.
#[derive(Debug, Default)]
pub struct AddressChanges<'a> {
    pub label: Option<&'a str>,
    pub house: Option<&'a str>,
    pub street: Option<&'a str>,
    pub landmark: Option<&'a str>,
    pub address1: Option<&'a str>,
    pub city: Option<&'a str>,
    pub pincode_id: Option<PincodeId>,
}

/// Internal row type for `addresses` queries.
#[derive(Debug, sqlx::FromRow)]
struct AddressRow {
    id: i32,
    user_id: i32,
    label: String,
    house: String,
    street: String,
    landmark: Option<String>,
    address1: Option<String>,
    city: String,
    pincode_id: i32,
    created_at: DateTime<Utc>,
}

impl From<AddressRow> for Address {
    fn from(row: AddressRow) -> Self {
        Self {
            id: AddressId::new(row.id),
            user_id: UserId::new(row.user_id),
            label: row.label,
            house: row.house,
            street: row.street,
            landmark: row.landmark,
            address1: row.address1,
            city: row.city,
            pincode_id: PincodeId::new(row.pincode_id),
            created_at: row.created_at,
        }
    }
}

const ADDRESS_COLUMNS: &str =
    "id, user_id, label, house, street, landmark, address1, city, pincode_id, created_at";

/// Repository for address database operations.
pub struct AddressRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AddressRepository<'a> {
    /// Create a new address repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert an address.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, new: &NewAddress<'_>) -> Result<Address, RepositoryError> {
        let row: AddressRow = sqlx::query_as(&format!(
            "INSERT INTO addresses (user_id, label, house, street, landmark, address1, city, pincode_id)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {ADDRESS_COLUMNS}"
        ))
        .bind(new.user_id.as_i32())
        .bind(new.label)
        .bind(new.house)
        .bind(new.street)
        .bind(new.landmark)
        .bind(new.address1)
        .bind(new.city)
        .bind(new.pincode_id.as_i32())
        .fetch_one(self.pool)
        .await?;

        Ok(Address::from(row))
    }

    /// All addresses owned by a user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Address>, RepositoryError> {
        let rows: Vec<AddressRow> = sqlx::query_as(&format!(
            "SELECT {ADDRESS_COLUMNS} FROM addresses WHERE user_id = $1 ORDER BY id"
        ))
        .bind(user_id.as_i32())
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Address::from).collect())
    }

    /// Get an address by ID.
    ///
    /// Ownership is the caller's concern; every resource-scoped handler
    /// checks `user_id` itself.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: AddressId) -> Result<Option<Address>, RepositoryError> {
        let row: Option<AddressRow> = sqlx::query_as(&format!(
            "SELECT {ADDRESS_COLUMNS} FROM addresses WHERE id = $1"
        ))
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Address::from))
    }

    /// Apply a partial update.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the address doesn't exist.
    pub async fn update(
        &self,
        id: AddressId,
        changes: &AddressChanges<'_>,
    ) -> Result<Address, RepositoryError> {
        let row: Option<AddressRow> = sqlx::query_as(&format!(
            "UPDATE addresses SET
                 label = COALESCE($1, label),
                 house = COALESCE($2, house),
                 street = COALESCE($3, street),
                 landmark = COALESCE($4, landmark),
                 address1 = COALESCE($5, address1),
                 city = COALESCE($6, city),
                 pincode_id = COALESCE($7, pincode_id)
             WHERE id = $8
             RETURNING {ADDRESS_COLUMNS}"
        ))
        .bind(changes.label)
        .bind(changes.house)
        .bind(changes.street)
        .bind(changes.landmark)
        .bind(changes.address1)
        .bind(changes.city)
        .bind(changes.pincode_id.map(|p| p.as_i32()))
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        row.map(Address::from).ok_or(RepositoryError::NotFound)
    }

    /// Delete an address.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the address doesn't exist.
    pub async fn delete(&self, id: AddressId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM addresses WHERE id = $1")
            .bind(id.as_i32())
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Whether any order references this address.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn is_referenced_by_order(&self, id: AddressId) -> Result<bool, RepositoryError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM orders WHERE address_id = $1)")
                .bind(id.as_i32())
                .fetch_one(self.pool)
                .await?;

        Ok(exists)
    }
}
