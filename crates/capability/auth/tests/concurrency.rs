use shelf_auth::{AccountConfig, AccountService, AuthError, PasswordParams, RegisterInput};
use shelf_mailer::RecordingMailer;
use shelf_storage::{InMemoryTokenStore, InMemoryUserStore, UserStore};
use std::sync::Arc;
use std::time::Duration;

fn service() -> (Arc<AccountService>, Arc<InMemoryUserStore>, Arc<RecordingMailer>) {
    let users = Arc::new(InMemoryUserStore::new());
    let tokens = Arc::new(InMemoryTokenStore::new(users.clone()));
    let mailer = Arc::new(RecordingMailer::new());
    let config = AccountConfig {
        password: PasswordParams {
            m_cost: 8,
            t_cost: 1,
            p_cost: 1,
        },
        ..AccountConfig::default()
    };
    let service = AccountService::new(users.clone(), tokens, mailer.clone(), config);
    (Arc::new(service), users, mailer)
}

fn mailed(mailer: &RecordingMailer, index: usize, key: &str) -> String {
    mailer.sent()[index].data[key]
        .as_str()
        .expect("token in mail")
        .to_string()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn concurrent_resets_with_one_token_apply_once() {
    let (service, users, mailer) = service();
    service
        .register(RegisterInput {
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            password: "pa55word-1".to_string(),
        })
        .await
        .expect("register");
    mailer.wait_for(1, Duration::from_secs(2)).await;
    service
        .activate(&mailed(&mailer, 0, "activationToken"))
        .await
        .expect("activate");
    service
        .request_password_reset("alice@example.com")
        .await
        .expect("accepted");
    mailer.wait_for(2, Duration::from_secs(2)).await;
    let token = mailed(&mailer, 1, "passwordResetToken");

    let first = {
        let service = service.clone();
        let token = token.clone();
        tokio::spawn(async move { service.reset_password(&token, "first-pa55word").await })
    };
    let second = {
        let service = service.clone();
        let token = token.clone();
        tokio::spawn(async move { service.reset_password(&token, "second-pa55word").await })
    };
    let results = [first.await.expect("task"), second.await.expect("task")];

    // 两个请求可能读到同一 version（一方冲突），也可能后者在 token 删除后才查找（not found）
    let applied = results.iter().filter(|result| result.is_ok()).count() as i64;
    assert!(applied >= 1);
    for result in &results {
        if let Err(err) = result {
            assert!(matches!(err, AuthError::EditConflict | AuthError::TokenNotFound));
        }
    }

    let user = users
        .find_user_by_email("alice@example.com")
        .await
        .expect("query")
        .expect("user");
    assert_eq!(user.version, 2 + applied);
    let replay = service
        .reset_password(&token, "third-pa55word")
        .await
        .expect_err("burned");
    assert!(matches!(replay, AuthError::TokenNotFound));
}

#[tokio::test]
async fn concurrent_activations_with_one_token_apply_once() {
    let (service, users, mailer) = service();
    service
        .register(RegisterInput {
            username: "bob".to_string(),
            email: "bob@example.com".to_string(),
            password: "pa55word-1".to_string(),
        })
        .await
        .expect("register");
    mailer.wait_for(1, Duration::from_secs(2)).await;
    let token = mailed(&mailer, 0, "activationToken");

    let (first, second) = tokio::join!(service.activate(&token), service.activate(&token));
    let applied = [first.is_ok(), second.is_ok()]
        .iter()
        .filter(|ok| **ok)
        .count();
    assert_eq!(applied, 1);
    let failure = if first.is_err() { first } else { second };
    assert!(matches!(
        failure,
        Err(AuthError::EditConflict | AuthError::TokenNotFound)
    ));

    let user = users
        .find_user_by_email("bob@example.com")
        .await
        .expect("query")
        .expect("user");
    assert!(user.activated);
    assert_eq!(user.version, 2);
}
