//! Payment gateway client.
//!
//! Thin JSON client for a Razorpay-compatible REST gateway: order creation
//! (amounts in paise) and HMAC-SHA256 signature verification of completed
//! payments. Capture itself happens on the gateway side.

use hmac::{Hmac, Mac};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;
use uuid::Uuid;

type HmacSha256 = Hmac<Sha256>;

/// Gateway connection settings.
#[derive(Clone)]
pub struct GatewayConfig {
    pub key_id: String,
    pub key_secret: SecretString,
    pub base_url: String,
}

impl std::fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("key_id", &self.key_id)
            .field("key_secret", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// Errors talking to the gateway.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Transport-level failure.
    #[error("gateway request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The gateway answered with a non-success status.
    #[error("gateway rejected request: status {status}, body {body}")]
    Rejected { status: u16, body: String },
}

/// A gateway-side order, relayed to the frontend as-is.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayOrder {
    pub id: String,
    /// Paise.
    pub amount: i64,
    pub currency: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receipt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

#[derive(Debug, Serialize)]
struct CreateOrderBody<'a> {
    /// Paise.
    amount: i64,
    currency: &'a str,
    receipt: String,
}

/// Payment gateway client.
pub struct GatewayClient {
    http: reqwest::Client,
    config: GatewayConfig,
}

impl GatewayClient {
    /// Create a new gateway client.
    #[must_use]
    pub fn new(config: GatewayConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    /// Create a gateway order for an amount in rupees.
    ///
    /// The gateway wants paise, so the amount is scaled by 100 before the
    /// call; the receipt id is generated per attempt.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::Http` on transport failures and
    /// `GatewayError::Rejected` when the gateway answers non-2xx.
    pub async fn create_order(&self, amount_rupees: Decimal) -> Result<GatewayOrder, GatewayError> {
        let paise = (amount_rupees * Decimal::ONE_HUNDRED)
            .round()
            .to_i64()
            .unwrap_or(0);

        let body = CreateOrderBody {
            amount: paise,
            currency: "INR",
            receipt: format!("receipt_order_{}", Uuid::new_v4().simple()),
        };

        let response = self
            .http
            .post(format!("{}/v1/orders", self.config.base_url))
            .basic_auth(&self.config.key_id, Some(self.config.key_secret.expose_secret()))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json().await?)
    }

    /// Verify a completed payment's signature.
    ///
    /// The gateway signs `"{order_ref}|{payment_id}"` with the key secret;
    /// the hex HMAC-SHA256 must match exactly.
    #[must_use]
    pub fn verify_signature(&self, order_ref: &str, payment_id: &str, signature: &str) -> bool {
        let Ok(mut mac) =
            HmacSha256::new_from_slice(self.config.key_secret.expose_secret().as_bytes())
        else {
            return false;
        };

        mac.update(format!("{order_ref}|{payment_id}").as_bytes());

        let computed = hex::encode(mac.finalize().into_bytes());

        computed == signature
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> GatewayClient {
        GatewayClient::new(GatewayConfig {
            key_id: "rzp_test_key".to_owned(),
            key_secret: SecretString::from("test_secret".to_owned()),
            base_url: "https://gateway.invalid".to_owned(),
        })
    }

    fn sign(secret: &str, message: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).expect("hmac accepts any key");
        mac.update(message.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    #[test]
    fn accepts_a_correctly_signed_payment() {
        let client = client();
        let signature = sign("test_secret", "order_abc|pay_xyz");
        assert!(client.verify_signature("order_abc", "pay_xyz", &signature));
    }

    #[test]
    fn rejects_a_tampered_signature() {
        let client = client();
        let mut signature = sign("test_secret", "order_abc|pay_xyz");
        signature.replace_range(0..1, if signature.starts_with('0') { "1" } else { "0" });
        assert!(!client.verify_signature("order_abc", "pay_xyz", &signature));
    }

    #[test]
    fn rejects_a_signature_for_a_different_payment() {
        let client = client();
        let signature = sign("test_secret", "order_abc|pay_other");
        assert!(!client.verify_signature("order_abc", "pay_xyz", &signature));
    }
}
