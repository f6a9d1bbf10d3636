use shelf_auth::{
    AuthError, ValidationErrors, validate_email, validate_password_plaintext,
    validate_token_plaintext,
};

#[test]
fn first_error_per_field_wins() {
    let mut v = ValidationErrors::new();
    validate_email(&mut v, "");
    assert_eq!(v.get("email"), Some("must be provided"));
    assert_eq!(v.fields().len(), 1);
}

#[test]
fn password_length_bounds() {
    let mut short = ValidationErrors::new();
    validate_password_plaintext(&mut short, "1234567");
    assert_eq!(short.get("password"), Some("must be at least 8 bytes long"));

    let mut long = ValidationErrors::new();
    validate_password_plaintext(&mut long, &"x".repeat(73));
    assert_eq!(long.get("password"), Some("must not be more than 72 bytes long"));

    let mut ok = ValidationErrors::new();
    validate_password_plaintext(&mut ok, &"x".repeat(72));
    assert!(ok.is_empty());
}

#[test]
fn email_shape_is_checked() {
    let mut v = ValidationErrors::new();
    validate_email(&mut v, "not-an-email");
    assert_eq!(v.get("email"), Some("must be a valid email address"));

    let mut ok = ValidationErrors::new();
    validate_email(&mut ok, "alice@example.com");
    assert!(ok.is_empty());
}

#[test]
fn token_must_have_fixed_length() {
    let mut v = ValidationErrors::new();
    validate_token_plaintext(&mut v, "abc");
    assert_eq!(v.get("token"), Some("must be 22 bytes long"));
}

#[test]
fn into_result_wraps_errors() {
    assert!(ValidationErrors::new().into_result().is_ok());
    let err = ValidationErrors::single("email", "taken")
        .into_result()
        .expect_err("errors");
    assert!(matches!(err, AuthError::Validation(errors) if errors.get("email") == Some("taken")));
}
