//! One-time-code flow contracts.
//!
//! Each email has two independent slots - a 6-digit OTP and a reset token -
//! with issue-overwrites, consume-on-success, and retry-on-mismatch
//! semantics.

use tricity_core::Email;

use tricity_api::services::codes::{CodeStore, VerifyOutcome};

fn email(addr: &str) -> Email {
    Email::parse(addr).expect("valid email")
}

#[tokio::test]
async fn verifying_an_issued_code_succeeds_once() {
    let store = CodeStore::new();
    let user = email("user@x.com");

    let code = store.issue_otp(&user).await;
    assert_eq!(store.verify_otp(&user, &code).await, VerifyOutcome::Verified);

    // The code was consumed; a replay reports "not found", not "invalid".
    assert_eq!(store.verify_otp(&user, &code).await, VerifyOutcome::Missing);
}

#[tokio::test]
async fn never_issued_codes_report_missing() {
    let store = CodeStore::new();
    assert_eq!(
        store.verify_otp(&email("nobody@x.com"), "123456").await,
        VerifyOutcome::Missing
    );
}

#[tokio::test]
async fn a_mismatch_does_not_consume_the_code() {
    let store = CodeStore::new();
    let user = email("user@x.com");

    let code = store.issue_otp(&user).await;

    for _ in 0..3 {
        assert_eq!(
            store.verify_otp(&user, "wrong!").await,
            VerifyOutcome::Mismatch
        );
    }

    assert_eq!(store.verify_otp(&user, &code).await, VerifyOutcome::Verified);
}

#[tokio::test]
async fn codes_are_scoped_per_email() {
    let store = CodeStore::new();
    let alice = email("alice@x.com");
    let bob = email("bob@x.com");

    let alice_code = store.issue_otp(&alice).await;

    assert_eq!(
        store.verify_otp(&bob, &alice_code).await,
        VerifyOutcome::Missing
    );
    assert_eq!(
        store.verify_otp(&alice, &alice_code).await,
        VerifyOutcome::Verified
    );
}

#[tokio::test]
async fn forgot_password_trades_an_otp_for_a_reset_token() {
    let store = CodeStore::new();
    let user = email("user@x.com");

    // Step 1: OTP issued and verified (consumed).
    let code = store.issue_otp(&user).await;
    assert_eq!(store.verify_otp(&user, &code).await, VerifyOutcome::Verified);

    // Step 2: reset token issued; the consumed OTP buys nothing further.
    let token = store.issue_reset_token(&user).await;
    assert_eq!(store.verify_otp(&user, &code).await, VerifyOutcome::Missing);

    // Step 3: the exact token resets once and cannot be replayed.
    assert_eq!(
        store.verify_reset_token(&user, &token).await,
        VerifyOutcome::Verified
    );
    assert_eq!(
        store.verify_reset_token(&user, &token).await,
        VerifyOutcome::Missing
    );
}

#[tokio::test]
async fn an_otp_is_not_a_reset_token() {
    let store = CodeStore::new();
    let user = email("user@x.com");

    let code = store.issue_otp(&user).await;
    assert_eq!(
        store.verify_reset_token(&user, &code).await,
        VerifyOutcome::Missing
    );
}

#[tokio::test]
async fn reissuing_a_reset_token_invalidates_the_previous_one() {
    let store = CodeStore::new();
    let user = email("user@x.com");

    let first = store.issue_reset_token(&user).await;
    let second = store.issue_reset_token(&user).await;

    // 256-bit random tokens never collide in practice.
    assert_ne!(first, second);
    assert_eq!(
        store.verify_reset_token(&user, &first).await,
        VerifyOutcome::Mismatch
    );
    assert_eq!(
        store.verify_reset_token(&user, &second).await,
        VerifyOutcome::Verified
    );
}
