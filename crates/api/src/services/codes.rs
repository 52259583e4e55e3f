//! One-time-code store.
//!
//! Two independent TTL caches keyed by email: 6-digit verification codes
//! (10 minutes) and password-reset tokens (15 minutes). Issuing overwrites
//! any prior entry; a successful verify consumes the entry; a mismatch
//! leaves it in place so the user can retry within the TTL.

use std::time::Duration;

use moka::future::Cache;
use rand::Rng;

use tricity_core::Email;

/// Verification codes live for 10 minutes.
const OTP_TTL: Duration = Duration::from_secs(10 * 60);

/// Reset tokens live for 15 minutes.
const RESET_TTL: Duration = Duration::from_secs(15 * 60);

const CAPACITY: u64 = 100_000;

/// Result of checking a presented code or token against the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyOutcome {
    /// Nothing stored for this email (never issued, expired, or consumed).
    Missing,
    /// An entry exists but the presented value doesn't match. The entry is
    /// kept so the user can retry.
    Mismatch,
    /// Matched; the entry has been consumed.
    Verified,
}

/// In-process store for verification codes and reset tokens.
pub struct CodeStore {
    otp: Cache<String, String>,
    reset: Cache<String, String>,
}

impl CodeStore {
    /// Create the store with production TTLs.
    #[must_use]
    pub fn new() -> Self {
        Self {
            otp: Cache::builder()
                .max_capacity(CAPACITY)
                .time_to_live(OTP_TTL)
                .build(),
            reset: Cache::builder()
                .max_capacity(CAPACITY)
                .time_to_live(RESET_TTL)
                .build(),
        }
    }

    /// Issue a fresh 6-digit code for an email, overwriting any prior code.
    pub async fn issue_otp(&self, email: &Email) -> String {
        let code = generate_otp();
        self.otp.insert(email.as_str().to_owned(), code.clone()).await;
        code
    }

    /// Check a presented code, consuming it on success.
    pub async fn verify_otp(&self, email: &Email, code: &str) -> VerifyOutcome {
        match self.otp.get(email.as_str()).await {
            None => VerifyOutcome::Missing,
            Some(stored) if stored != code => VerifyOutcome::Mismatch,
            Some(_) => {
                self.otp.invalidate(email.as_str()).await;
                VerifyOutcome::Verified
            }
        }
    }

    /// Issue a fresh reset token for an email, overwriting any prior token.
    ///
    /// Only called after a successful OTP verify in the forgot-password
    /// flow.
    pub async fn issue_reset_token(&self, email: &Email) -> String {
        let token = generate_reset_token();
        self.reset
            .insert(email.as_str().to_owned(), token.clone())
            .await;
        token
    }

    /// Check a presented reset token, consuming it on success.
    pub async fn verify_reset_token(&self, email: &Email, token: &str) -> VerifyOutcome {
        match self.reset.get(email.as_str()).await {
            None => VerifyOutcome::Missing,
            Some(stored) if stored != token => VerifyOutcome::Mismatch,
            Some(_) => {
                self.reset.invalidate(email.as_str()).await;
                VerifyOutcome::Verified
            }
        }
    }
}

impl Default for CodeStore {
    fn default() -> Self {
        Self::new()
    }
}

/// A 6-digit numeric code.
fn generate_otp() -> String {
    let code: u32 = rand::rng().random_range(100_000..=999_999);
    code.to_string()
}

/// 32 random bytes as hex.
fn generate_reset_token() -> String {
    let mut bytes = [0u8; 32];
    rand::rng().fill(&mut bytes);
    hex::encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn email() -> Email {
        Email::parse("user@x.com").expect("valid email")
    }

    #[test]
    fn otp_is_six_digits() {
        for _ in 0..32 {
            let code = generate_otp();
            assert_eq!(code.len(), 6);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn reset_token_is_256_bits_of_hex() {
        let token = generate_reset_token();
        assert_eq!(token.len(), 64);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[tokio::test]
    async fn verify_consumes_the_code() {
        let store = CodeStore::new();
        let code = store.issue_otp(&email()).await;

        assert_eq!(
            store.verify_otp(&email(), &code).await,
            VerifyOutcome::Verified
        );
        // Second use of the same code finds nothing.
        assert_eq!(
            store.verify_otp(&email(), &code).await,
            VerifyOutcome::Missing
        );
    }

    #[tokio::test]
    async fn mismatch_keeps_the_code_for_retry() {
        let store = CodeStore::new();
        let code = store.issue_otp(&email()).await;

        assert_eq!(
            store.verify_otp(&email(), "000000").await,
            VerifyOutcome::Mismatch
        );
        // The original code still works.
        assert_eq!(
            store.verify_otp(&email(), &code).await,
            VerifyOutcome::Verified
        );
    }

    #[tokio::test]
    async fn reissuing_overwrites_the_previous_code() {
        let store = CodeStore::new();
        let first = store.issue_otp(&email()).await;
        let second = store.issue_otp(&email()).await;

        if first != second {
            assert_eq!(
                store.verify_otp(&email(), &first).await,
                VerifyOutcome::Mismatch
            );
        }
        assert_eq!(
            store.verify_otp(&email(), &second).await,
            VerifyOutcome::Verified
        );
    }

    #[tokio::test]
    async fn reset_token_is_single_use() {
        let store = CodeStore::new();
        let token = store.issue_reset_token(&email()).await;

        assert_eq!(
            store.verify_reset_token(&email(), "deadbeef").await,
            VerifyOutcome::Mismatch
        );
        assert_eq!(
            store.verify_reset_token(&email(), &token).await,
            VerifyOutcome::Verified
        );
        assert_eq!(
            store.verify_reset_token(&email(), &token).await,
            VerifyOutcome::Missing
        );
    }

    #[tokio::test]
    async fn otp_and_reset_slots_are_independent() {
        let store = CodeStore::new();
        let code = store.issue_otp(&email()).await;

        assert_eq!(
            store.verify_reset_token(&email(), &code).await,
            VerifyOutcome::Missing
        );
    }
}
