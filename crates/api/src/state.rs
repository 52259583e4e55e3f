//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::ApiConfig;
use crate::services::codes::CodeStore;
use crate::services::gateway::GatewayClient;
use crate::services::mailer::{Mailer, MailerError};
use crate::services::tokens::TokenKeys;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`; the single process-wide home for the
/// connection pool, token keys, one-time-code store, gateway client, and
/// mailer.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ApiConfig,
    pool: PgPool,
    tokens: TokenKeys,
    codes: CodeStore,
    gateway: GatewayClient,
    mailer: Mailer,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the mailer configuration is invalid.
    pub fn new(config: ApiConfig, pool: PgPool) -> Result<Self, MailerError> {
        let tokens = TokenKeys::new(&config.jwt_secret);
        let codes = CodeStore::new();
        let gateway = GatewayClient::new(config.gateway.clone());
        let mailer = Mailer::from_config(config.smtp.as_ref())?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                tokens,
                codes,
                gateway,
                mailer,
            }),
        })
    }

    /// Get a reference to the configuration.
    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the token keys.
    #[must_use]
    pub fn tokens(&self) -> &TokenKeys {
        &self.inner.tokens
    }

    /// Get a reference to the one-time-code store.
    #[must_use]
    pub fn codes(&self) -> &CodeStore {
        &self.inner.codes
    }

    /// Get a reference to the payment gateway client.
    #[must_use]
    pub fn gateway(&self) -> &GatewayClient {
        &self.inner.gateway
    }

    /// Get a reference to the mailer.
    #[must_use]
    pub fn mailer(&self) -> &Mailer {
        &self.inner.mailer
    }
}
