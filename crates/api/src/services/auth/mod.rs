//! Authentication service.
//!
//! Registration, login, and password reset against the `users` table, with
//! argon2 password hashing and bearer-token issuance.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sqlx::PgPool;

use tricity_core::Email;

use crate::db::users::{NewUser, UserRepository};
use crate::models::user::User;
use crate::services::tokens::TokenKeys;

/// The three-city service area. Registrations from other cities are
/// accepted but flagged out of area.
pub const TRICITY_CITIES: [&str; 3] = ["Chandigarh", "Mohali", "Panchkula"];

/// Fields accepted at registration.
#[derive(Debug)]
pub struct RegisterInput<'a> {
    pub name: &'a str,
    pub phone: &'a str,
    pub email: &'a str,
    pub password: &'a str,
    pub city: &'a str,
}

/// Authentication service.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
    tokens: &'a TokenKeys,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool, tokens: &'a TokenKeys) -> Self {
        Self {
            users: UserRepository::new(pool),
            tokens,
        }
    }

    /// Register a new account and issue its first token.
    ///
    /// The city decides the `is_tricity` flag; out-of-area cities register
    /// fine but are marked unserviceable.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` if the email is malformed and
    /// `AuthError::UserAlreadyExists` if the email is taken.
    pub async fn register(&self, input: &RegisterInput<'_>) -> Result<(User, String), AuthError> {
        let email = Email::parse(input.email)?;

        if self.users.get_by_email(&email).await?.is_some() {
            return Err(AuthError::UserAlreadyExists);
        }

        let is_tricity = TRICITY_CITIES.contains(&input.city);
        let password_hash = hash_password(input.password)?;

        let user = self
            .users
            .create(&NewUser {
                name: input.name,
                email: &email,
                password_hash: &password_hash,
                phone: input.phone,
                city: input.city,
                is_tricity,
            })
            .await?;

        let token = self.tokens.issue(&user)?;

        Ok((user, token))
    }

    /// Login with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` for an unknown email and
    /// `AuthError::WrongPassword` for a bad password.
    pub async fn login(&self, email: &str, password: &str) -> Result<(User, String), AuthError> {
        let email = Email::parse(email)?;

        let (user, password_hash) = self
            .users
            .get_with_password_hash(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &password_hash)?;

        let token = self.tokens.issue(&user)?;

        Ok((user, token))
    }

    /// Replace a user's password with a freshly salted hash.
    ///
    /// Token bookkeeping (the single-use reset token) is the caller's
    /// concern; this only flips the stored hash.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserNotFound` if no account exists for the email.
    pub async fn reset_password(&self, email: &Email, new_password: &str) -> Result<(), AuthError> {
        if self.users.get_by_email(email).await?.is_none() {
            return Err(AuthError::UserNotFound);
        }

        let password_hash = hash_password(new_password)?;
        self.users.update_password(email, &password_hash).await?;

        Ok(())
    }
}

/// Hash a password with argon2 and a fresh random salt.
///
/// # Errors
///
/// Returns `AuthError::Hash` if the hasher fails.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AuthError::Hash(e.to_string()))?;

    Ok(hash.to_string())
}

/// Verify a password against a stored argon2 hash.
///
/// # Errors
///
/// Returns `AuthError::WrongPassword` on mismatch and `AuthError::Hash` if
/// the stored hash cannot be parsed.
pub fn verify_password(password: &str, stored_hash: &str) -> Result<(), AuthError> {
    let parsed = PasswordHash::new(stored_hash).map_err(|e| AuthError::Hash(e.to_string()))?;

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .map_err(|_| AuthError::WrongPassword)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashing_salts_freshly_each_time() {
        let first = hash_password("hunter2hunter2").expect("hash");
        let second = hash_password("hunter2hunter2").expect("hash");
        assert_ne!(first, second);
    }

    #[test]
    fn verification_accepts_the_right_password() {
        let hash = hash_password("correct horse battery").expect("hash");
        assert!(verify_password("correct horse battery", &hash).is_ok());
    }

    #[test]
    fn verification_rejects_the_wrong_password() {
        let hash = hash_password("correct horse battery").expect("hash");
        assert!(matches!(
            verify_password("incorrect horse", &hash),
            Err(AuthError::WrongPassword)
        ));
    }

    #[test]
    fn tricity_check_is_exact_match() {
        assert!(TRICITY_CITIES.contains(&"Mohali"));
        assert!(!TRICITY_CITIES.contains(&"mohali"));
        assert!(!TRICITY_CITIES.contains(&"Delhi"));
    }
}
