use shelf_auth::{AuthError, PasswordParams, hash_password, verify_password};

fn fast() -> PasswordParams {
    PasswordParams {
        m_cost: 8,
        t_cost: 1,
        p_cost: 1,
    }
}

#[test]
fn argon2_hash_verifies() {
    let hash = hash_password(&fast(), "pa55word-long").expect("hash");
    assert!(hash.starts_with("$argon2id$"));
    assert!(verify_password(&hash, "pa55word-long").expect("verify"));
}

#[test]
fn wrong_password_rejected() {
    let hash = hash_password(&fast(), "pa55word-long").expect("hash");
    assert!(!verify_password(&hash, "pa55word-wrong").expect("verify"));
}

#[test]
fn same_password_hashes_differently() {
    let first = hash_password(&fast(), "pa55word-long").expect("hash");
    let second = hash_password(&fast(), "pa55word-long").expect("hash");
    assert_ne!(first, second);
}

#[test]
fn unparsable_hash_is_internal_error() {
    let err = verify_password("not-a-phc-string", "pa55word-long").expect_err("invalid hash");
    assert!(matches!(err, AuthError::Fatal(_)));
}
