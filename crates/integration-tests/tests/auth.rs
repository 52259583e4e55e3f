//! Credential and token contracts.

use chrono::Utc;
use secrecy::SecretString;

use tricity_core::{Email, Role, UserId};

use tricity_api::models::user::User;
use tricity_api::services::auth::{hash_password, verify_password};
use tricity_api::services::tokens::TokenKeys;

fn user(role: Role) -> User {
    User {
        id: UserId::new(5),
        name: "Ravi".to_owned(),
        email: Email::parse("ravi@x.com").expect("valid email"),
        phone: "9876500001".to_owned(),
        city: "Panchkula".to_owned(),
        address: None,
        role,
        is_tricity: true,
        is_blocked: false,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn keys() -> TokenKeys {
    TokenKeys::new(&SecretString::from(
        "k3q8Xv2mLpW7kJd4Rt9nFh3bZc6gYs1a".to_owned(),
    ))
}

#[test]
fn password_hashes_verify_and_differ_per_salt() {
    let first = hash_password("s3cure-enough").expect("hash");
    let second = hash_password("s3cure-enough").expect("hash");

    // Fresh salt every time, so a reset genuinely rotates the hash.
    assert_ne!(first, second);
    assert!(verify_password("s3cure-enough", &first).is_ok());
    assert!(verify_password("s3cure-enough", &second).is_ok());
    assert!(verify_password("nope", &first).is_err());
}

#[test]
fn tokens_carry_the_role_claim() {
    let keys = keys();

    let customer_token = keys.issue(&user(Role::Customer)).expect("issue");
    let admin_token = keys.issue(&user(Role::Admin)).expect("issue");

    assert_eq!(keys.verify(&customer_token).expect("verify").role, "customer");
    assert_eq!(keys.verify(&admin_token).expect("verify").role, "admin");
}

#[test]
fn only_the_admin_role_clears_the_admin_gate() {
    assert!(Role::Admin.is_admin());
    assert!(!Role::Customer.is_admin());
    assert_eq!("admin".parse::<Role>(), Ok(Role::Admin));
    assert!("root".parse::<Role>().is_err());
}

#[test]
fn tampered_tokens_are_rejected() {
    let keys = keys();
    let mut token = keys.issue(&user(Role::Customer)).expect("issue");

    // Flip a character in the signature segment.
    let flipped = if token.ends_with('a') { 'b' } else { 'a' };
    token.pop();
    token.push(flipped);

    assert!(keys.verify(&token).is_err());
}
