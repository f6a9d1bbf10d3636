//! 认证和授权中间件
//!
//! 提供以下中间件和辅助函数：
//! - request_context：请求上下文中间件，注入 request_id/trace_id
//! - bearer_token：从 Authorization 头提取 Bearer token
//! - authenticate：识别请求主体（匿名或账户），写入请求扩展
//! - require_authenticated_user：拒绝匿名请求
//! - require_activated_user：拒绝匿名与未激活账户
//!
//! 认证流程：
//! 1. request_context：在所有请求前注入追踪 ID
//! 2. authenticate：无 Authorization 头视为匿名；头格式错误或 token 无效直接 401
//! 3. require_*：路由层守卫，通过后注入 AccountContext 供 handler 使用

use axum::{
    body::Body,
    extract::{Request, State},
    http::{HeaderMap, HeaderValue, header},
    middleware::Next,
    response::Response,
};
use domain::{Principal, TokenScope};
use shelf_auth::{AuthError, is_well_formed};
use shelf_telemetry::new_request_ids;
use tracing::{Instrument, info_span, warn};

use crate::AppState;
use crate::utils::response::{
    authentication_required_error, internal_error, invalid_token_error, not_activated_error,
};

/// 请求上下文中间件：注入 request_id/trace_id
pub async fn request_context(mut req: Request<Body>, next: Next) -> Response {
    let ids = new_request_ids();
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    req.extensions_mut().insert(ids.clone());

    let span = info_span!(
        "request",
        request_id = %ids.request_id,
        trace_id = %ids.trace_id,
        method = %method,
        path = %path
    );

    let mut response = next.run(req).instrument(span).await;
    response.headers_mut().insert(
        "x-request-id",
        HeaderValue::from_str(&ids.request_id).unwrap_or_else(|_| HeaderValue::from_static("")),
    );
    response.headers_mut().insert(
        "x-trace-id",
        HeaderValue::from_str(&ids.trace_id).unwrap_or_else(|_| HeaderValue::from_static("")),
    );
    response
}

/// 从请求头中提取 Bearer token
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let header_value = headers.get(header::AUTHORIZATION)?;
    let auth_str = header_value.to_str().ok()?;
    auth_str.strip_prefix("Bearer ")
}

/// 识别请求主体并写入请求扩展
///
/// 响应总是带 `Vary: Authorization`。
pub async fn authenticate(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let identified = identify(&state, req.headers()).await;
    let mut response = match identified {
        Ok(principal) => {
            req.extensions_mut().insert(principal);
            next.run(req).await
        }
        Err(response) => response,
    };
    response
        .headers_mut()
        .append(header::VARY, HeaderValue::from_static("Authorization"));
    response
}

async fn identify(state: &AppState, headers: &HeaderMap) -> Result<Principal, Response> {
    if !headers.contains_key(header::AUTHORIZATION) {
        return Ok(Principal::Anonymous);
    }
    let token = match bearer_token(headers) {
        Some(token) if is_well_formed(token) => token,
        _ => return Err(invalid_token_error()),
    };
    match state
        .accounts
        .resolve_token(token, TokenScope::Authentication)
        .await
    {
        Ok(user) => Ok(Principal::Account(user.to_account_context())),
        Err(AuthError::TokenNotFound) => {
            warn!(target: "shelf.api", "bearer_token_rejected");
            Err(invalid_token_error())
        }
        Err(err) => Err(internal_error(err)),
    }
}

/// 守卫：必须是已识别账户
pub async fn require_authenticated_user(mut req: Request<Body>, next: Next) -> Response {
    let account = match req.extensions().get::<Principal>().and_then(Principal::account) {
        Some(account) => account.clone(),
        None => return authentication_required_error(),
    };
    req.extensions_mut().insert(account);
    next.run(req).await
}

/// 守卫：必须是已激活账户
pub async fn require_activated_user(mut req: Request<Body>, next: Next) -> Response {
    let account = match req.extensions().get::<Principal>().and_then(Principal::account) {
        Some(account) => account.clone(),
        None => return authentication_required_error(),
    };
    if !account.activated {
        return not_activated_error();
    }
    req.extensions_mut().insert(account);
    next.run(req).await
}
