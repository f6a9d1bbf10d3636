//! 路由级测试：内存存储 + 记录型 Mailer，驱动真实 Router。

use crate::{AppState, Stores, routes::create_router};
use axum::{
    Router,
    body::Body,
    http::{HeaderMap, Method, Request, StatusCode, header},
};
use bytes::Bytes;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use shelf_auth::{AccountConfig, PasswordParams};
use shelf_mailer::{MailTemplate, RecordingMailer};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

const PASSWORD: &str = "pa55word-long";

struct TestApp {
    router: Router,
    mailer: Arc<RecordingMailer>,
}

struct Reply {
    status: StatusCode,
    headers: HeaderMap,
    raw: Bytes,
    body: Value,
}

fn test_app() -> TestApp {
    let mailer = Arc::new(RecordingMailer::new());
    let config = AccountConfig {
        password: PasswordParams {
            m_cost: 8,
            t_cost: 1,
            p_cost: 1,
        },
        ..AccountConfig::default()
    };
    let state = AppState::new(Stores::in_memory(), mailer.clone(), config, None, "test");
    TestApp {
        router: create_router(state),
        mailer,
    }
}

impl TestApp {
    async fn send(&self, method: Method, uri: &str, body: Option<Value>, token: Option<&str>) -> Reply {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let body = match body {
            Some(body) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(body.to_string())
            }
            None => Body::empty(),
        };
        self.dispatch(builder.body(body).unwrap()).await
    }

    async fn dispatch(&self, request: Request<Body>) -> Reply {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let raw = response.into_body().collect().await.unwrap().to_bytes();
        let body = serde_json::from_slice(&raw).unwrap_or(Value::Null);
        Reply {
            status,
            headers,
            raw,
            body,
        }
    }

    /// 注册并返回邮件中的激活 token。
    async fn register(&self, name: &str, email: &str) -> String {
        let reply = self
            .send(
                Method::POST,
                "/v1/users",
                Some(json!({ "username": name, "email": email, "password": PASSWORD })),
                None,
            )
            .await;
        assert_eq!(reply.status, StatusCode::CREATED, "{}", reply.body);
        assert_eq!(reply.body["data"]["activated"], json!(false));
        self.mail_token(email, MailTemplate::UserWelcome, "activationToken")
            .await
    }

    /// 邮件在独立任务中发送，轮询直到出现匹配的邮件。
    async fn mail_token(&self, email: &str, template: MailTemplate, key: &str) -> String {
        for _ in 0..200 {
            let token = self
                .mailer
                .sent()
                .iter()
                .rev()
                .find(|mail| mail.recipient == email && mail.template == template)
                .and_then(|mail| mail.data[key].as_str().map(str::to_string));
            if let Some(token) = token {
                return token;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("no {template} mail for {email}");
    }

    async fn login(&self, email: &str) -> String {
        let reply = self
            .send(
                Method::POST,
                "/v1/tokens/authentication",
                Some(json!({ "email": email, "password": PASSWORD })),
                None,
            )
            .await;
        assert_eq!(reply.status, StatusCode::CREATED, "{}", reply.body);
        reply.body["data"]["token"].as_str().unwrap().to_string()
    }

    /// 注册 + 激活 + 登录，返回认证 token。
    async fn activated_user(&self, name: &str, email: &str) -> String {
        let activation = self.register(name, email).await;
        let reply = self
            .send(
                Method::PUT,
                "/v1/users/activated",
                Some(json!({ "token": activation })),
                None,
            )
            .await;
        assert_eq!(reply.status, StatusCode::OK, "{}", reply.body);
        assert_eq!(reply.body["data"]["activated"], json!(true));
        self.login(email).await
    }

    async fn create_book(&self, token: &str, title: &str) -> Value {
        let reply = self
            .send(
                Method::POST,
                "/api/v1/books",
                Some(json!({
                    "title": title,
                    "authors": ["Ursula K. Le Guin"],
                    "isbn": "9780441478125",
                    "publicationDate": "1969-03-01",
                    "genre": "science fiction",
                    "description": "An envoy on a winter planet."
                })),
                Some(token),
            )
            .await;
        assert_eq!(reply.status, StatusCode::CREATED, "{}", reply.body);
        reply.body["data"].clone()
    }
}

fn error_code(reply: &Reply) -> &str {
    reply.body["error"]["code"].as_str().unwrap_or_default()
}

#[tokio::test]
async fn healthcheck_is_public_and_tagged() {
    let app = test_app();
    let reply = app.send(Method::GET, "/v1/healthcheck", None, None).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["data"]["status"], json!("available"));
    assert_eq!(reply.body["data"]["environment"], json!("test"));
    assert_eq!(reply.headers[header::VARY], "Authorization");
    assert!(reply.headers.contains_key("x-request-id"));
    assert!(reply.headers.contains_key("x-trace-id"));
}

#[tokio::test]
async fn malformed_bearer_is_rejected_even_on_public_routes() {
    let app = test_app();
    for value in ["Bearer short", "Basic dXNlcjpwYXNz", "Bearer "] {
        let request = Request::builder()
            .uri("/v1/healthcheck")
            .header(header::AUTHORIZATION, value)
            .body(Body::empty())
            .unwrap();
        let reply = app.dispatch(request).await;
        assert_eq!(reply.status, StatusCode::UNAUTHORIZED, "{value}");
        assert_eq!(error_code(&reply), "AUTH.INVALID_TOKEN");
        assert_eq!(reply.headers[header::WWW_AUTHENTICATE], "Bearer");
        assert_eq!(reply.headers[header::VARY], "Authorization");
    }
}

#[tokio::test]
async fn unknown_bearer_token_is_rejected() {
    let app = test_app();
    let reply = app
        .send(
            Method::GET,
            "/v1/healthcheck",
            None,
            Some("AAAAAAAAAAAAAAAAAAAAAA"),
        )
        .await;
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(&reply), "AUTH.INVALID_TOKEN");
}

#[tokio::test]
async fn catalog_rejects_anonymous_and_unactivated_callers() {
    let app = test_app();
    let reply = app.send(Method::GET, "/api/v1/books", None, None).await;
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(&reply), "AUTH.AUTHENTICATION_REQUIRED");

    app.register("bob", "bob@example.com").await;
    let token = app.login("bob@example.com").await;

    let reply = app.send(Method::GET, "/api/v1/books", None, Some(&token)).await;
    assert_eq!(reply.status, StatusCode::FORBIDDEN);
    assert_eq!(error_code(&reply), "AUTH.NOT_ACTIVATED");

    let reply = app.send(Method::GET, "/v1/users/me", None, Some(&token)).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["data"]["email"], json!("bob@example.com"));
    assert_eq!(reply.body["data"]["activated"], json!(false));
}

#[tokio::test]
async fn register_reports_bad_json_and_field_errors() {
    let app = test_app();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/v1/users")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"email\": "))
        .unwrap();
    let reply = app.dispatch(request).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&reply), "INVALID.REQUEST");

    let reply = app
        .send(
            Method::POST,
            "/v1/users",
            Some(json!({ "username": "", "email": "nope", "password": "short" })),
            None,
        )
        .await;
    assert_eq!(reply.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(error_code(&reply), "VALIDATION.FAILED");
    let fields = &reply.body["error"]["fields"];
    assert_eq!(fields["username"], json!("must be provided"));
    assert_eq!(fields["email"], json!("must be a valid email address"));
    assert_eq!(fields["password"], json!("must be at least 8 bytes long"));
}

#[tokio::test]
async fn duplicate_email_is_a_field_error() {
    let app = test_app();
    app.register("alice", "alice@example.com").await;
    let reply = app
        .send(
            Method::POST,
            "/v1/users",
            Some(json!({ "username": "alice2", "email": "ALICE@example.com", "password": PASSWORD })),
            None,
        )
        .await;
    assert_eq!(reply.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        reply.body["error"]["fields"]["email"],
        json!("a user with this email address already exists")
    );
}

#[tokio::test]
async fn activation_token_is_single_use() {
    let app = test_app();
    let activation = app.register("alice", "alice@example.com").await;
    let body = json!({ "token": activation });

    let first = app
        .send(Method::PUT, "/v1/users/activated", Some(body.clone()), None)
        .await;
    assert_eq!(first.status, StatusCode::OK);

    let replay = app
        .send(Method::PUT, "/v1/users/activated", Some(body), None)
        .await;
    assert_eq!(replay.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        replay.body["error"]["fields"]["token"],
        json!("invalid or expired activation token")
    );
}

#[tokio::test]
async fn wrong_password_and_unknown_email_look_the_same() {
    let app = test_app();
    app.activated_user("alice", "alice@example.com").await;

    let wrong = app
        .send(
            Method::POST,
            "/v1/tokens/authentication",
            Some(json!({ "email": "alice@example.com", "password": "not-the-password" })),
            None,
        )
        .await;
    let unknown = app
        .send(
            Method::POST,
            "/v1/tokens/authentication",
            Some(json!({ "email": "nobody@example.com", "password": "not-the-password" })),
            None,
        )
        .await;
    assert_eq!(wrong.status, StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(&wrong), "AUTH.INVALID_CREDENTIALS");
    assert_eq!(wrong.raw, unknown.raw);
}

#[tokio::test]
async fn password_reset_request_does_not_reveal_accounts() {
    let app = test_app();
    app.activated_user("alice", "alice@example.com").await;

    let known = app
        .send(
            Method::POST,
            "/v1/tokens/password-reset",
            Some(json!({ "email": "alice@example.com" })),
            None,
        )
        .await;
    let unknown = app
        .send(
            Method::POST,
            "/v1/tokens/password-reset",
            Some(json!({ "email": "ghost@example.com" })),
            None,
        )
        .await;
    assert_eq!(known.status, StatusCode::OK);
    assert_eq!(known.status, unknown.status);
    assert_eq!(known.raw, unknown.raw);
}

#[tokio::test]
async fn password_reset_flow_replaces_the_password() {
    let app = test_app();
    app.activated_user("alice", "alice@example.com").await;

    let reply = app
        .send(
            Method::POST,
            "/v1/tokens/password-reset",
            Some(json!({ "email": "alice@example.com" })),
            None,
        )
        .await;
    assert_eq!(reply.status, StatusCode::OK);
    let reset = app
        .mail_token(
            "alice@example.com",
            MailTemplate::PasswordReset,
            "passwordResetToken",
        )
        .await;

    let reply = app
        .send(
            Method::PUT,
            "/v1/users/password",
            Some(json!({ "token": reset, "password": "brand-new-secret" })),
            None,
        )
        .await;
    assert_eq!(reply.status, StatusCode::OK, "{}", reply.body);

    let old = app
        .send(
            Method::POST,
            "/v1/tokens/authentication",
            Some(json!({ "email": "alice@example.com", "password": PASSWORD })),
            None,
        )
        .await;
    assert_eq!(old.status, StatusCode::UNAUTHORIZED);
    let new = app
        .send(
            Method::POST,
            "/v1/tokens/authentication",
            Some(json!({ "email": "alice@example.com", "password": "brand-new-secret" })),
            None,
        )
        .await;
    assert_eq!(new.status, StatusCode::CREATED);

    let replay = app
        .send(
            Method::PUT,
            "/v1/users/password",
            Some(json!({ "token": reset, "password": "another-secret" })),
            None,
        )
        .await;
    assert_eq!(replay.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        replay.body["error"]["fields"]["token"],
        json!("invalid or expired token")
    );
}

#[tokio::test]
async fn book_lifecycle_with_version_guard() {
    let app = test_app();
    let token = app.activated_user("alice", "alice@example.com").await;

    let book = app.create_book(&token, "The Left Hand of Darkness").await;
    let book_id = book["bookId"].as_str().unwrap().to_string();
    assert_eq!(book["version"], json!(1));

    let reply = app
        .send(Method::GET, &format!("/api/v1/books/{book_id}"), None, Some(&token))
        .await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["data"]["title"], json!("The Left Hand of Darkness"));

    let reply = app
        .send(
            Method::PUT,
            &format!("/api/v1/books/{book_id}"),
            Some(json!({ "genre": "classic", "version": 1 })),
            Some(&token),
        )
        .await;
    assert_eq!(reply.status, StatusCode::OK, "{}", reply.body);
    assert_eq!(reply.body["data"]["version"], json!(2));
    assert_eq!(reply.body["data"]["genre"], json!("classic"));

    let stale = app
        .send(
            Method::PUT,
            &format!("/api/v1/books/{book_id}"),
            Some(json!({ "genre": "fantasy", "version": 1 })),
            Some(&token),
        )
        .await;
    assert_eq!(stale.status, StatusCode::CONFLICT);
    assert_eq!(error_code(&stale), "RESOURCE.EDIT_CONFLICT");

    let invalid = app
        .send(
            Method::PUT,
            &format!("/api/v1/books/{book_id}"),
            Some(json!({ "authors": [] })),
            Some(&token),
        )
        .await;
    assert_eq!(invalid.status, StatusCode::UNPROCESSABLE_ENTITY);

    let reply = app
        .send(Method::DELETE, &format!("/api/v1/books/{book_id}"), None, Some(&token))
        .await;
    assert_eq!(reply.status, StatusCode::OK);
    let reply = app
        .send(Method::GET, &format!("/api/v1/books/{book_id}"), None, Some(&token))
        .await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);
    assert_eq!(error_code(&reply), "RESOURCE.NOT_FOUND");
}

#[tokio::test]
async fn create_book_sets_location_and_lists_with_metadata() {
    let app = test_app();
    let token = app.activated_user("alice", "alice@example.com").await;

    let empty = app
        .send(Method::GET, "/api/v1/books", None, Some(&token))
        .await;
    assert_eq!(empty.status, StatusCode::OK);
    assert_eq!(empty.body["data"]["metadata"], json!({}));

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/v1/books")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({
                "title": "Dune",
                "authors": ["Frank Herbert"],
                "isbn": "9780441013593",
                "publicationDate": "1965-08-01",
                "genre": "science fiction",
                "description": "Desert planet politics."
            })
            .to_string(),
        ))
        .unwrap();
    let reply = app.dispatch(request).await;
    assert_eq!(reply.status, StatusCode::CREATED);
    let book_id = reply.body["data"]["bookId"].as_str().unwrap();
    assert_eq!(
        reply.headers[header::LOCATION],
        format!("/api/v1/books/{book_id}").as_str()
    );
    app.create_book(&token, "Another Book").await;

    let reply = app
        .send(
            Method::GET,
            "/api/v1/books?author=herbert&page_size=1&sort=-title",
            None,
            Some(&token),
        )
        .await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["data"]["books"][0]["title"], json!("Dune"));
    assert_eq!(reply.body["data"]["metadata"]["totalRecords"], json!(1));
    assert_eq!(reply.body["data"]["metadata"]["lastPage"], json!(1));

    let reply = app
        .send(Method::GET, "/api/v1/books?sort=isbn", None, Some(&token))
        .await;
    assert_eq!(reply.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        reply.body["error"]["fields"]["sort"],
        json!("invalid sort value")
    );

    let reply = app
        .send(Method::GET, "/api/v1/books-search?genre=SCIENCE", None, Some(&token))
        .await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["data"].as_array().map(Vec::len), Some(2));
}

#[tokio::test]
async fn reviews_belong_to_their_author() {
    let app = test_app();
    let alice = app.activated_user("alice", "alice@example.com").await;
    let bob = app.activated_user("bob", "bob@example.com").await;
    let book = app.create_book(&alice, "Dune").await;
    let book_id = book["bookId"].as_str().unwrap();

    let missing = app
        .send(
            Method::POST,
            "/api/v1/books/does-not-exist/reviews",
            Some(json!({ "rating": 4, "review": "good" })),
            Some(&alice),
        )
        .await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);

    let invalid = app
        .send(
            Method::POST,
            &format!("/api/v1/books/{book_id}/reviews"),
            Some(json!({ "rating": 9, "review": "" })),
            Some(&alice),
        )
        .await;
    assert_eq!(invalid.status, StatusCode::UNPROCESSABLE_ENTITY);

    let created = app
        .send(
            Method::POST,
            &format!("/api/v1/books/{book_id}/reviews"),
            Some(json!({ "rating": 4.5, "review": "Spice must flow." })),
            Some(&alice),
        )
        .await;
    assert_eq!(created.status, StatusCode::CREATED, "{}", created.body);
    let review_id = created.body["data"]["reviewId"].as_str().unwrap();

    let foreign = app
        .send(
            Method::DELETE,
            &format!("/api/v1/reviews/{review_id}"),
            None,
            Some(&bob),
        )
        .await;
    assert_eq!(foreign.status, StatusCode::NOT_FOUND);

    let updated = app
        .send(
            Method::PUT,
            &format!("/api/v1/reviews/{review_id}"),
            Some(json!({ "rating": 5 })),
            Some(&alice),
        )
        .await;
    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(updated.body["data"]["rating"], json!(5.0));
    assert_eq!(updated.body["data"]["review"], json!("Spice must flow."));

    let listed = app
        .send(
            Method::GET,
            &format!("/api/v1/books/{book_id}/reviews"),
            None,
            Some(&bob),
        )
        .await;
    assert_eq!(listed.status, StatusCode::OK);
    assert_eq!(listed.body["data"].as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn deleting_a_book_removes_its_reviews() {
    let app = test_app();
    let alice = app.activated_user("alice", "alice@example.com").await;
    let book = app.create_book(&alice, "The Dispossessed").await;
    let book_id = book["bookId"].as_str().unwrap();

    let created = app
        .send(
            Method::POST,
            &format!("/api/v1/books/{book_id}/reviews"),
            Some(json!({ "rating": 4, "review": "ok" })),
            Some(&alice),
        )
        .await;
    assert_eq!(created.status, StatusCode::CREATED, "{}", created.body);
    let review_id = created.body["data"]["reviewId"].as_str().unwrap().to_string();

    let deleted = app
        .send(
            Method::DELETE,
            &format!("/api/v1/books/{book_id}"),
            None,
            Some(&alice),
        )
        .await;
    assert_eq!(deleted.status, StatusCode::OK);

    let mine = app
        .send(Method::GET, "/v1/users/me", None, Some(&alice))
        .await;
    let alice_id = mine.body["data"]["userId"].as_str().unwrap();
    let reviews = app
        .send(
            Method::GET,
            &format!("/api/v1/users/{alice_id}/reviews"),
            None,
            Some(&alice),
        )
        .await;
    assert_eq!(reviews.status, StatusCode::OK);
    assert_eq!(reviews.body["data"].as_array().map(Vec::len), Some(0));

    let orphan = app
        .send(
            Method::PUT,
            &format!("/api/v1/reviews/{review_id}"),
            Some(json!({ "rating": 5 })),
            Some(&alice),
        )
        .await;
    assert_eq!(orphan.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn reading_lists_deduplicate_books_and_guard_owner() {
    let app = test_app();
    let alice = app.activated_user("alice", "alice@example.com").await;
    let bob = app.activated_user("bob", "bob@example.com").await;
    let book = app.create_book(&alice, "Dune").await;
    let book_id = book["bookId"].as_str().unwrap();

    let invalid = app
        .send(
            Method::POST,
            "/api/v1/lists",
            Some(json!({ "name": "Summer", "description": "beach reads", "status": "abandoned" })),
            Some(&alice),
        )
        .await;
    assert_eq!(invalid.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(invalid.body["error"]["fields"]["status"].is_string());

    let created = app
        .send(
            Method::POST,
            "/api/v1/lists",
            Some(json!({ "name": "Summer", "description": "beach reads", "status": "currently reading" })),
            Some(&alice),
        )
        .await;
    assert_eq!(created.status, StatusCode::CREATED, "{}", created.body);
    let list_id = created.body["data"]["listId"].as_str().unwrap();
    let books_uri = format!("/api/v1/lists/{list_id}/books");

    for _ in 0..2 {
        let added = app
            .send(
                Method::POST,
                &books_uri,
                Some(json!({ "bookId": book_id })),
                Some(&alice),
            )
            .await;
        assert_eq!(added.status, StatusCode::OK);
        assert_eq!(added.body["data"]["books"], json!([book_id]));
    }

    let foreign = app
        .send(
            Method::POST,
            &books_uri,
            Some(json!({ "bookId": book_id })),
            Some(&bob),
        )
        .await;
    assert_eq!(foreign.status, StatusCode::NOT_FOUND);

    let missing_book = app
        .send(
            Method::POST,
            &books_uri,
            Some(json!({ "bookId": "no-such-book" })),
            Some(&alice),
        )
        .await;
    assert_eq!(missing_book.status, StatusCode::NOT_FOUND);

    let removed = app
        .send(
            Method::DELETE,
            &books_uri,
            Some(json!({ "bookId": book_id })),
            Some(&alice),
        )
        .await;
    assert_eq!(removed.status, StatusCode::OK);
    assert_eq!(removed.body["data"]["books"], json!([]));

    let mine = app
        .send(Method::GET, "/v1/users/me", None, Some(&alice))
        .await;
    let alice_id = mine.body["data"]["userId"].as_str().unwrap();
    let lists = app
        .send(
            Method::GET,
            &format!("/api/v1/users/{alice_id}/lists"),
            None,
            Some(&bob),
        )
        .await;
    assert_eq!(lists.status, StatusCode::OK);
    assert_eq!(lists.body["data"][0]["status"], json!("currently reading"));
}

#[tokio::test]
async fn metrics_require_activation() {
    let app = test_app();
    let anonymous = app.send(Method::GET, "/v1/metrics", None, None).await;
    assert_eq!(anonymous.status, StatusCode::UNAUTHORIZED);

    let token = app.activated_user("alice", "alice@example.com").await;
    let reply = app.send(Method::GET, "/v1/metrics", None, Some(&token)).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert!(reply.body["data"]["tokensIssued"].as_u64().unwrap_or_default() >= 2);
}

#[tokio::test]
async fn unknown_routes_are_not_found() {
    let app = test_app();
    let reply = app.send(Method::GET, "/v1/nothing-here", None, None).await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);
    assert_eq!(error_code(&reply), "RESOURCE.NOT_FOUND");
}
