//! API configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `API_DATABASE_URL` - `PostgreSQL` connection string
//! - `API_JWT_SECRET` - Bearer-token signing secret (min 32 chars, high entropy)
//! - `GATEWAY_KEY_ID` - Payment gateway key id
//! - `GATEWAY_KEY_SECRET` - Payment gateway key secret
//!
//! ## Optional
//! - `API_HOST` - Bind address (default: 127.0.0.1)
//! - `API_PORT` - Listen port (default: 3000)
//! - `GATEWAY_BASE_URL` - Gateway endpoint (default: https://api.razorpay.com)
//! - `SMTP_HOST` / `SMTP_USERNAME` / `SMTP_PASSWORD` / `SMTP_FROM` - outbound
//!   email; without all four the mailer logs codes instead of sending
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment tag
//! - `WHATSAPP_NUMBER` - Support contact surfaced to out-of-area users

use std::net::{IpAddr, SocketAddr};

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

use crate::services::gateway::GatewayConfig;
use crate::services::mailer::SmtpConfig;

const MIN_JWT_SECRET_LENGTH: usize = 32;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// API application configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Bearer-token signing secret
    pub jwt_secret: SecretString,
    /// Payment gateway settings
    pub gateway: GatewayConfig,
    /// Outbound email settings; `None` logs codes instead of sending
    pub smtp: Option<SmtpConfig>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment tag
    pub sentry_environment: Option<String>,
    /// Support contact surfaced to out-of-area users
    pub whatsapp_number: Option<String>,
}

impl ApiConfig {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a required variable is missing, malformed,
    /// or an obvious placeholder.
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url = SecretString::from(required("API_DATABASE_URL")?);

        let host: IpAddr = optional("API_HOST")
            .unwrap_or_else(|| "127.0.0.1".to_owned())
            .parse()
            .map_err(|e| ConfigError::InvalidEnvVar("API_HOST".to_owned(), format!("{e}")))?;

        let port: u16 = optional("API_PORT")
            .unwrap_or_else(|| "3000".to_owned())
            .parse()
            .map_err(|e| ConfigError::InvalidEnvVar("API_PORT".to_owned(), format!("{e}")))?;

        let jwt_secret = required("API_JWT_SECRET")?;
        validate_secret("API_JWT_SECRET", &jwt_secret)?;

        let gateway = GatewayConfig {
            key_id: required("GATEWAY_KEY_ID")?,
            key_secret: SecretString::from(required("GATEWAY_KEY_SECRET")?),
            base_url: optional("GATEWAY_BASE_URL")
                .unwrap_or_else(|| "https://api.razorpay.com".to_owned()),
        };

        let smtp = match (
            optional("SMTP_HOST"),
            optional("SMTP_USERNAME"),
            optional("SMTP_PASSWORD"),
            optional("SMTP_FROM"),
        ) {
            (Some(host), Some(username), Some(password), Some(from)) => Some(SmtpConfig {
                host,
                username,
                password: SecretString::from(password),
                from,
            }),
            _ => None,
        };

        Ok(Self {
            database_url,
            host,
            port,
            jwt_secret: SecretString::from(jwt_secret),
            gateway,
            smtp,
            sentry_dsn: optional("SENTRY_DSN"),
            sentry_environment: optional("SENTRY_ENVIRONMENT"),
            whatsapp_number: optional("WHATSAPP_NUMBER"),
        })
    }

    /// The socket address to bind.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn required(name: &str) -> Result<String, ConfigError> {
    std::env::var(name).map_err(|_| ConfigError::MissingEnvVar(name.to_owned()))
}

fn optional(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

/// Length and placeholder checks for signing secrets.
fn validate_secret(name: &str, value: &str) -> Result<(), ConfigError> {
    if value.len() < MIN_JWT_SECRET_LENGTH {
        return Err(ConfigError::InsecureSecret(
            name.to_owned(),
            format!("must be at least {MIN_JWT_SECRET_LENGTH} characters"),
        ));
    }

    let lowered = value.to_lowercase();
    for pattern in PLACEHOLDER_PATTERNS {
        if lowered.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                name.to_owned(),
                format!("looks like a placeholder (contains {pattern:?})"),
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_secrets_are_rejected() {
        assert!(matches!(
            validate_secret("API_JWT_SECRET", "short"),
            Err(ConfigError::InsecureSecret(_, _))
        ));
    }

    #[test]
    fn placeholder_secrets_are_rejected() {
        assert!(matches!(
            validate_secret(
                "API_JWT_SECRET",
                "changeme-changeme-changeme-changeme-changeme"
            ),
            Err(ConfigError::InsecureSecret(_, _))
        ));
    }

    #[test]
    fn random_looking_secrets_pass() {
        assert!(validate_secret("API_JWT_SECRET", "q8Xv2mLpW7kJd4Rt9nFh3bZc6gYs1aVu").is_ok());
    }
}
