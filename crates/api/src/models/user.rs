//! User account model.

use chrono::{DateTime, Utc};
use serde::Serialize;

use tricity_core::{Email, Role, UserId};

/// A registered account.
///
/// The password hash never leaves the repository layer; this struct is safe
/// to serialize straight into responses.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: Email,
    pub phone: String,
    pub city: String,
    /// Legacy free-form profile address (`PUT /api/auth/address`).
    pub address: Option<String>,
    pub role: Role,
    pub is_tricity: bool,
    pub is_blocked: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Trimmed account row for the admin user listing.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub is_blocked: bool,
}
