//! 路由定义
//!
//! 集中管理所有 API 路由，将路径映射到对应的 handlers。
//! 路由分三组：
//! - 公开：/v1/healthcheck, /livez, /readyz, 注册/激活/登录/重置口令
//! - 已认证：/v1/users/me
//! - 已激活：/v1/metrics 与 /api/v1/* 目录接口
//!
//! 全局中间件（由外到内）：request_context → trace → panic 兜底 → authenticate

use super::AppState;
use super::handlers::*;
use crate::middleware::{
    authenticate, request_context, require_activated_user, require_authenticated_user,
};
use crate::utils::response::internal_error;
use axum::{
    Router, middleware,
    response::Response,
    routing::{get, post, put},
};
use std::any::Any;
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};

/// 创建完整路由（含全局中间件与状态）
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(public_routes())
        .merge(authenticated_routes())
        .merge(activated_routes())
        .fallback(fallback)
        .layer(middleware::from_fn_with_state(state.clone(), authenticate))
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(request_context))
        .with_state(state)
}

fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/v1/healthcheck", get(healthcheck))
        .route("/livez", get(livez))
        .route("/readyz", get(readyz))
        .route("/v1/users", post(register_user))
        .route("/v1/users/activated", put(activate_user))
        .route("/v1/users/password", put(update_user_password))
        .route("/v1/tokens/authentication", post(create_authentication_token))
        .route("/v1/tokens/password-reset", post(create_password_reset_token))
}

fn authenticated_routes() -> Router<AppState> {
    Router::new()
        .route("/v1/users/me", get(get_current_user))
        .route_layer(middleware::from_fn(require_authenticated_user))
}

fn activated_routes() -> Router<AppState> {
    Router::new()
        .route("/v1/metrics", get(get_metrics))
        .route("/api/v1/books", get(list_books).post(create_book))
        .route("/api/v1/books-search", get(search_books))
        .route(
            "/api/v1/books/:book_id",
            get(get_book).put(update_book).delete(delete_book),
        )
        .route(
            "/api/v1/books/:book_id/reviews",
            get(list_reviews).post(create_review),
        )
        .route(
            "/api/v1/reviews/:review_id",
            put(update_review).delete(delete_review),
        )
        .route(
            "/api/v1/lists",
            get(list_reading_lists).post(create_reading_list),
        )
        .route(
            "/api/v1/lists/:list_id",
            get(get_reading_list)
                .put(update_reading_list)
                .delete(delete_reading_list),
        )
        .route(
            "/api/v1/lists/:list_id/books",
            post(add_book_to_list).delete(remove_book_from_list),
        )
        .route("/api/v1/users/:user_id", get(get_user_profile))
        .route("/api/v1/users/:user_id/lists", get(get_user_reading_lists))
        .route("/api/v1/users/:user_id/reviews", get(get_user_reviews))
        .route_layer(middleware::from_fn(require_activated_user))
}

/// handler panic 时返回 500，连接不中断
fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(message) = err.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = err.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    };
    internal_error(format!("handler panicked: {detail}"))
}
