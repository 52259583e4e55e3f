//! Business services over the repository layer.

pub mod auth;
pub mod codes;
pub mod delivery;
pub mod gateway;
pub mod mailer;
pub mod orders;
pub mod tokens;

pub use auth::{AuthError, AuthService};
pub use codes::{CodeStore, VerifyOutcome};
pub use delivery::DeliveryService;
pub use gateway::{GatewayClient, GatewayConfig, GatewayError};
pub use mailer::{Mailer, MailerError, SmtpConfig};
pub use orders::OrderService;
pub use tokens::TokenKeys;
