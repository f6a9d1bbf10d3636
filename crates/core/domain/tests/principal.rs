use domain::{AccountContext, Principal, TokenScope};

#[test]
fn principal_defaults_to_anonymous() {
    let principal = Principal::default();
    assert!(principal.is_anonymous());
    assert!(principal.account().is_none());
}

#[test]
fn principal_exposes_account() {
    let principal = Principal::Account(AccountContext::new("user-1", "a@x.com", true));
    let account = principal.account().expect("account");
    assert_eq!(account.user_id, "user-1");
    assert_eq!(account.email, "a@x.com");
    assert!(account.activated);
}

#[test]
fn token_scope_round_trips_storage_names() {
    for scope in [
        TokenScope::Activation,
        TokenScope::Authentication,
        TokenScope::PasswordReset,
    ] {
        assert_eq!(scope.as_str().parse::<TokenScope>(), Ok(scope));
    }
    assert_eq!(TokenScope::PasswordReset.to_string(), "password-reset");
    assert!("refresh".parse::<TokenScope>().is_err());
}
