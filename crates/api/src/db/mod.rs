//! Database operations for the commerce `PostgreSQL` database.
//!
//! ## Tables
//!
//! - `users` - Accounts, roles, and the service-area flag
//! - `categories` / `products` / `product_images` - Catalog
//! - `pincodes` / `addresses` - Delivery locations and pricing
//! - `cart_items` - One row per (user, product)
//! - `orders` / `order_items` - Placed orders with captured prices
//! - `payments` - Verified gateway payment attempts
//!
//! # Migrations
//!
//! Migrations live in `crates/api/migrations/` and are embedded via
//! `sqlx::migrate!`, applied at startup by `main`.
//!
//! Queries use the runtime `query_as`/`FromRow` API so builds never need a
//! live database.

pub mod addresses;
pub mod cart;
pub mod categories;
pub mod orders;
pub mod payments;
pub mod pincodes;
pub mod products;
pub mod users;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use addresses::AddressRepository;
pub use cart::CartRepository;
pub use categories::CategoryRepository;
pub use orders::OrderRepository;
pub use payments::PaymentRepository;
pub use pincodes::PincodeRepository;
pub use products::ProductRepository;
pub use users::UserRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
