use domain::TokenScope;
use shelf_auth::{TOKEN_PLAINTEXT_LEN, generate_token, hash_token, is_well_formed};
use std::time::Duration;

#[test]
fn generated_token_is_url_safe_and_fixed_length() {
    let issued = generate_token("u-1", TokenScope::Activation, Duration::from_secs(60), 1_000)
        .expect("token");
    assert_eq!(issued.plaintext.len(), TOKEN_PLAINTEXT_LEN);
    assert!(is_well_formed(&issued.plaintext));
    assert_eq!(issued.record.expires_at_ms, 61_000);
    assert_eq!(issued.record.created_at_ms, 1_000);
    assert_eq!(issued.record.scope, TokenScope::Activation);
}

#[test]
fn record_stores_digest_not_plaintext() {
    let issued = generate_token("u-1", TokenScope::Authentication, Duration::from_secs(1), 0)
        .expect("token");
    assert_eq!(issued.record.hash.len(), 32);
    assert_eq!(issued.record.hash, hash_token(&issued.plaintext));
    assert_ne!(issued.record.hash, issued.plaintext.as_bytes());
}

#[test]
fn tokens_do_not_repeat() {
    let first = generate_token("u-1", TokenScope::PasswordReset, Duration::ZERO, 0).expect("token");
    let second =
        generate_token("u-1", TokenScope::PasswordReset, Duration::ZERO, 0).expect("token");
    assert_ne!(first.plaintext, second.plaintext);
}

#[test]
fn malformed_plaintext_is_rejected() {
    assert!(!is_well_formed(""));
    assert!(!is_well_formed("too-short"));
    assert!(!is_well_formed("AAAAAAAAAAAAAAAAAAAA+/"));
    assert!(is_well_formed("AAAAAAAAAAAAAAAAAAAA-_"));
}
