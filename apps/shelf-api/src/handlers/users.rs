//! 账户相关 handlers
//!
//! ## 公开端点（无需认证）
//! - `POST /v1/users`：注册未激活账户，激活 token 通过邮件发出（响应中不返回）
//! - `PUT /v1/users/activated`：兑现激活 token
//! - `PUT /v1/users/password`：兑现重置 token，写入新口令
//!
//! ## 私有端点
//! - `GET /v1/users/me`：当前账户（已认证即可，未激活也能查看自己的状态）
//! - `GET /api/v1/users/:user_id`、`/lists`、`/reviews`：账户资料（需已激活）

use crate::AppState;
use crate::utils::response::{
    account_error, not_found_error, reading_list_to_dto, review_to_dto, storage_error,
    user_to_dto,
};
use crate::utils::validation::read_json;
use api_contract::{
    ActivateRequest, ApiResponse, MessageDto, ReadingListDto, RegisterRequest,
    ResetPasswordRequest, ReviewDto,
};
use axum::{
    Extension, Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use domain::AccountContext;
use shelf_auth::RegisterInput;
use shelf_storage::UserRecord;

const ACTIVATION_TOKEN_MESSAGE: &str = "invalid or expired activation token";
const RESET_TOKEN_MESSAGE: &str = "invalid or expired token";

#[derive(serde::Deserialize)]
pub struct UserPath {
    user_id: String,
}

/// 注册账户
pub async fn register_user(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Response {
    let req = match read_json(payload) {
        Ok(req) => req,
        Err(response) => return response,
    };
    let input = RegisterInput {
        username: req.username.trim().to_string(),
        email: req.email.trim().to_string(),
        password: req.password,
    };
    match state.accounts.register(input).await {
        Ok(user) => (
            StatusCode::CREATED,
            Json(ApiResponse::success(user_to_dto(user))),
        )
            .into_response(),
        Err(err) => account_error(err, ACTIVATION_TOKEN_MESSAGE),
    }
}

/// 激活账户
pub async fn activate_user(
    State(state): State<AppState>,
    payload: Result<Json<ActivateRequest>, JsonRejection>,
) -> Response {
    let req = match read_json(payload) {
        Ok(req) => req,
        Err(response) => return response,
    };
    match state.accounts.activate(&req.token).await {
        Ok(user) => (StatusCode::OK, Json(ApiResponse::success(user_to_dto(user)))).into_response(),
        Err(err) => account_error(err, ACTIVATION_TOKEN_MESSAGE),
    }
}

/// 重置口令
pub async fn update_user_password(
    State(state): State<AppState>,
    payload: Result<Json<ResetPasswordRequest>, JsonRejection>,
) -> Response {
    let req = match read_json(payload) {
        Ok(req) => req,
        Err(response) => return response,
    };
    match state.accounts.reset_password(&req.token, &req.password).await {
        Ok(_) => (
            StatusCode::OK,
            Json(ApiResponse::success(MessageDto::new(
                "your password was successfully reset",
            ))),
        )
            .into_response(),
        Err(err) => account_error(err, RESET_TOKEN_MESSAGE),
    }
}

/// 当前账户
pub async fn get_current_user(
    State(state): State<AppState>,
    Extension(account): Extension<AccountContext>,
) -> Response {
    match find_user(&state, &account.user_id).await {
        Ok(user) => (StatusCode::OK, Json(ApiResponse::success(user_to_dto(user)))).into_response(),
        Err(response) => response,
    }
}

/// 账户资料
pub async fn get_user_profile(
    State(state): State<AppState>,
    Path(path): Path<UserPath>,
) -> Response {
    match find_user(&state, &path.user_id).await {
        Ok(user) => (StatusCode::OK, Json(ApiResponse::success(user_to_dto(user)))).into_response(),
        Err(response) => response,
    }
}

/// 账户创建的书单
pub async fn get_user_reading_lists(
    State(state): State<AppState>,
    Path(path): Path<UserPath>,
) -> Response {
    if let Err(response) = find_user(&state, &path.user_id).await {
        return response;
    }
    match state.lists.list_reading_lists_by_user(&path.user_id).await {
        Ok(lists) => {
            let data: Vec<ReadingListDto> = lists.into_iter().map(reading_list_to_dto).collect();
            (StatusCode::OK, Json(ApiResponse::success(data))).into_response()
        }
        Err(err) => storage_error(err),
    }
}

/// 账户写的书评（最新在前）
pub async fn get_user_reviews(
    State(state): State<AppState>,
    Path(path): Path<UserPath>,
) -> Response {
    if let Err(response) = find_user(&state, &path.user_id).await {
        return response;
    }
    match state.reviews.list_reviews_by_user(&path.user_id).await {
        Ok(reviews) => {
            let data: Vec<ReviewDto> = reviews.into_iter().map(review_to_dto).collect();
            (StatusCode::OK, Json(ApiResponse::success(data))).into_response()
        }
        Err(err) => storage_error(err),
    }
}

async fn find_user(state: &AppState, user_id: &str) -> Result<UserRecord, Response> {
    match state.users.find_user(user_id).await {
        Ok(Some(user)) => Ok(user),
        Ok(None) => Err(not_found_error()),
        Err(err) => Err(storage_error(err)),
    }
}
