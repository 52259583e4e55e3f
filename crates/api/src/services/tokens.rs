//! Bearer token issuance and verification.
//!
//! HS256 JWTs carrying the user id and role. Logout is client-side token
//! disposal; nothing is tracked server-side.

use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::models::user::User;

/// Token lifetime.
const TOKEN_TTL_DAYS: i64 = 7;

/// Claims carried by every bearer token.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User id.
    pub sub: i32,
    /// Role string at issue time; the extractor re-reads the user anyway.
    pub role: String,
    pub iat: i64,
    pub exp: i64,
}

/// Signing and verification keys, derived once from the configured secret.
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl TokenKeys {
    /// Derive keys from the configured secret.
    #[must_use]
    pub fn new(secret: &SecretString) -> Self {
        let bytes = secret.expose_secret().as_bytes();
        Self {
            encoding: EncodingKey::from_secret(bytes),
            decoding: DecodingKey::from_secret(bytes),
        }
    }

    /// Issue a token for a user.
    ///
    /// # Errors
    ///
    /// Returns a `jsonwebtoken` error if signing fails.
    pub fn issue(&self, user: &User) -> Result<String, jsonwebtoken::errors::Error> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.id.as_i32(),
            role: user.role.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::days(TOKEN_TTL_DAYS)).timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding)
    }

    /// Verify a token and return its claims.
    ///
    /// # Errors
    ///
    /// Returns a `jsonwebtoken` error for bad signatures and expired tokens.
    pub fn verify(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        let data = decode::<Claims>(token, &self.decoding, &Validation::default())?;
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use secrecy::SecretString;

    use tricity_core::{Email, Role, UserId};

    use super::*;

    fn sample_user() -> User {
        User {
            id: UserId::new(11),
            name: "Asha".to_owned(),
            email: Email::parse("asha@example.com").expect("valid email"),
            phone: "9876500000".to_owned(),
            city: "Mohali".to_owned(),
            address: None,
            role: Role::Customer,
            is_tricity: true,
            is_blocked: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn issued_tokens_verify() {
        let keys = TokenKeys::new(&SecretString::from(
            "0123456789abcdef0123456789abcdef".to_owned(),
        ));
        let token = keys.issue(&sample_user()).expect("issue");
        let claims = keys.verify(&token).expect("verify");
        assert_eq!(claims.sub, 11);
        assert_eq!(claims.role, "customer");
    }

    #[test]
    fn tokens_from_another_secret_fail() {
        let keys = TokenKeys::new(&SecretString::from(
            "0123456789abcdef0123456789abcdef".to_owned(),
        ));
        let other = TokenKeys::new(&SecretString::from(
            "fedcba9876543210fedcba9876543210".to_owned(),
        ));
        let token = keys.issue(&sample_user()).expect("issue");
        assert!(other.verify(&token).is_err());
    }

    #[test]
    fn garbage_tokens_fail() {
        let keys = TokenKeys::new(&SecretString::from(
            "0123456789abcdef0123456789abcdef".to_owned(),
        ));
        assert!(keys.verify("not-a-token").is_err());
    }
}
