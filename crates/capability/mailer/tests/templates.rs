use serde_json::json;
use shelf_mailer::{MailError, MailTemplate, Mailer, RecordingMailer, render, spawn_mail};
use std::sync::Arc;
use std::time::Duration;

#[test]
fn welcome_mail_carries_activation_token() {
    let data = json!({"userId": "u-1", "activationToken": "AbCdEfGhIjKlMnOpQrStUv"});
    let mail = render(MailTemplate::UserWelcome, &data).expect("render");
    assert!(mail.subject.contains("Welcome"));
    assert!(mail.plain_body.contains("AbCdEfGhIjKlMnOpQrStUv"));
    assert!(mail.html_body.contains("AbCdEfGhIjKlMnOpQrStUv"));
}

#[test]
fn reset_mail_requires_token_field() {
    let err = render(MailTemplate::PasswordReset, &json!({"userId": "u-1"})).expect_err("missing");
    assert!(matches!(err, MailError::Template(_)));
}

#[test]
fn html_body_escapes_interpolated_values() {
    let data = json!({"userId": "<script>", "activationToken": "t"});
    let mail = render(MailTemplate::UserWelcome, &data).expect("render");
    assert!(mail.html_body.contains("&lt;script&gt;"));
    assert!(!mail.html_body.contains("<script>"));
}

#[tokio::test]
async fn spawned_mail_reaches_recording_mailer() {
    let mailer = Arc::new(RecordingMailer::new());
    let handle = spawn_mail(
        mailer.clone(),
        "alice@example.com".to_string(),
        MailTemplate::PasswordReset,
        json!({"passwordResetToken": "AbCdEfGhIjKlMnOpQrStUv"}),
    );
    let sent = mailer.wait_for(1, Duration::from_secs(1)).await;
    handle.await.expect("task");
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].recipient, "alice@example.com");
    assert_eq!(sent[0].template, MailTemplate::PasswordReset);
}

#[tokio::test]
async fn recording_mailer_rejects_unrenderable_data() {
    let mailer = RecordingMailer::new();
    let result = mailer
        .send("alice@example.com", MailTemplate::UserWelcome, &json!({}))
        .await;
    assert!(result.is_err());
    assert!(mailer.sent().is_empty());
}
