//! Authentication extractors.
//!
//! Bearer tokens come in on the `Authorization` header; the extractor
//! verifies the signature and re-reads the user row, so revoked accounts
//! fall out as soon as their row is gone.
//!
//! # Example
//!
//! ```rust,ignore
//! async fn protected_handler(
//!     RequireUser(user): RequireUser,
//! ) -> impl IntoResponse {
//!     format!("Hello, {}!", user.name)
//! }
//! ```

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};

use tricity_core::UserId;

use crate::db::UserRepository;
use crate::error::AppError;
use crate::models::user::User;
use crate::state::AppState;

/// Extractor that requires a valid bearer token and a live account.
pub struct RequireUser(pub User);

impl FromRequestParts<AppState> for RequireUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(header::AUTHORIZATION)
            .ok_or_else(|| AppError::Unauthorized("No token provided".to_owned()))?
            .to_str()
            .map_err(|_| AppError::Unauthorized("Invalid token".to_owned()))?;

        let token = header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::Unauthorized("Invalid token".to_owned()))?;

        let claims = state
            .tokens()
            .verify(token)
            .map_err(|_| AppError::Unauthorized("Invalid token".to_owned()))?;

        let user = UserRepository::new(state.pool())
            .get_by_id(UserId::new(claims.sub))
            .await?
            .ok_or_else(|| AppError::Unauthorized("User not found".to_owned()))?;

        Ok(Self(user))
    }
}

/// Extractor that additionally requires the admin role.
pub struct RequireAdmin(pub User);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let RequireUser(user) = RequireUser::from_request_parts(parts, state).await?;

        if !user.role.is_admin() {
            return Err(AppError::Forbidden("Access denied: Admins only".to_owned()));
        }

        Ok(Self(user))
    }
}
