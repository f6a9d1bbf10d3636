//! token 签发 handlers
//!
//! - `POST /v1/tokens/authentication`：邮箱 + 口令换取认证 token（明文只返回一次）
//! - `POST /v1/tokens/password-reset`：申请重置口令；邮箱不存在与正常受理的响应相同

use crate::AppState;
use crate::utils::response::account_error;
use crate::utils::validation::read_json;
use api_contract::{
    ApiResponse, AuthenticationRequest, AuthenticationTokenDto, MessageDto, PasswordResetRequest,
};
use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use shelf_auth::ResetRequestOutcome;

const RESET_ACCEPTED_MESSAGE: &str =
    "an email will be sent to you containing password reset instructions";

/// 签发认证 token
pub async fn create_authentication_token(
    State(state): State<AppState>,
    payload: Result<Json<AuthenticationRequest>, JsonRejection>,
) -> Response {
    let req = match read_json(payload) {
        Ok(req) => req,
        Err(response) => return response,
    };
    match state
        .accounts
        .authenticate(req.email.trim(), &req.password)
        .await
    {
        Ok(token) => (
            StatusCode::CREATED,
            Json(ApiResponse::success(AuthenticationTokenDto {
                token: token.plaintext,
                expiry: token.expires_at_ms,
            })),
        )
            .into_response(),
        Err(err) => account_error(err, "invalid token"),
    }
}

/// 申请重置口令
pub async fn create_password_reset_token(
    State(state): State<AppState>,
    payload: Result<Json<PasswordResetRequest>, JsonRejection>,
) -> Response {
    let req = match read_json(payload) {
        Ok(req) => req,
        Err(response) => return response,
    };
    match state.accounts.request_password_reset(req.email.trim()).await {
        Ok(ResetRequestOutcome::Accepted) => (
            StatusCode::OK,
            Json(ApiResponse::success(MessageDto::new(RESET_ACCEPTED_MESSAGE))),
        )
            .into_response(),
        Err(err) => account_error(err, "invalid token"),
    }
}
