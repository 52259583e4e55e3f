//! Authentication error types.

use axum::http::StatusCode;
use thiserror::Error;

use tricity_core::EmailError;

use crate::db::RepositoryError;

/// Errors from registration, login, and password reset.
///
/// Display strings double as client-facing messages, so they match what the
/// frontend expects word for word.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The email failed structural validation.
    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// Registration against an email that already has an account.
    #[error("User already exists")]
    UserAlreadyExists,

    /// Login against an unknown email.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Login with a password that doesn't match the stored hash.
    #[error("Wrong password")]
    WrongPassword,

    /// Operation against an email with no account.
    #[error("User not found")]
    UserNotFound,

    /// Password hashing or verification machinery failed.
    #[error("password hash error: {0}")]
    Hash(String),

    /// Token signing failed.
    #[error("token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    /// Underlying repository failure.
    #[error("repository error: {0}")]
    Repository(#[from] RepositoryError),
}

impl AuthError {
    /// HTTP status this error maps to.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::InvalidEmail(_)
            | Self::UserAlreadyExists
            | Self::InvalidCredentials
            | Self::WrongPassword => StatusCode::BAD_REQUEST,
            Self::UserNotFound => StatusCode::NOT_FOUND,
            Self::Hash(_) | Self::Token(_) | Self::Repository(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}
