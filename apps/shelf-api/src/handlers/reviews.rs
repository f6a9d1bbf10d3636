//! 书评 handlers
//!
//! - GET /api/v1/books/:book_id/reviews - 图书书评（最新在前）
//! - POST /api/v1/books/:book_id/reviews - 发表书评，作者为当前账户
//! - PUT /api/v1/reviews/:review_id - 修改书评
//! - DELETE /api/v1/reviews/:review_id - 删除书评
//!
//! 只有作者能修改或删除书评；其他账户看到的是 404。

use crate::AppState;
use crate::utils::response::{
    created_at, not_found_error, review_to_dto, storage_error, validation_error,
};
use crate::utils::validation::{normalize, normalize_optional, read_json, validate_review};
use crate::utils::now_ms;
use api_contract::{
    ApiResponse, CreateReviewRequest, MessageDto, ReviewDto, UpdateReviewRequest,
};
use axum::{
    Extension, Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use domain::AccountContext;
use shelf_auth::ValidationErrors;
use shelf_storage::{ReviewRecord, ReviewUpdate};
use uuid::Uuid;

#[derive(serde::Deserialize)]
pub struct ReviewBookPath {
    book_id: String,
}

#[derive(serde::Deserialize)]
pub struct ReviewPath {
    review_id: String,
}

/// 列出图书书评
pub async fn list_reviews(State(state): State<AppState>, Path(path): Path<ReviewBookPath>) -> Response {
    match state.books.find_book(&path.book_id).await {
        Ok(Some(_)) => {}
        Ok(None) => return not_found_error(),
        Err(err) => return storage_error(err),
    }
    match state.reviews.list_reviews_for_book(&path.book_id).await {
        Ok(reviews) => {
            let data: Vec<ReviewDto> = reviews.into_iter().map(review_to_dto).collect();
            (StatusCode::OK, Json(ApiResponse::success(data))).into_response()
        }
        Err(err) => storage_error(err),
    }
}

/// 发表书评
pub async fn create_review(
    State(state): State<AppState>,
    Extension(account): Extension<AccountContext>,
    Path(path): Path<ReviewBookPath>,
    payload: Result<Json<CreateReviewRequest>, JsonRejection>,
) -> Response {
    let req = match read_json(payload) {
        Ok(req) => req,
        Err(response) => return response,
    };
    let review = normalize(req.review);
    let mut v = ValidationErrors::new();
    validate_review(&mut v, req.rating, &review);
    if !v.is_empty() {
        return validation_error(v);
    }
    match state.books.find_book(&path.book_id).await {
        Ok(Some(_)) => {}
        Ok(None) => return not_found_error(),
        Err(err) => return storage_error(err),
    }

    let record = ReviewRecord {
        review_id: Uuid::new_v4().to_string(),
        book_id: path.book_id,
        user_id: account.user_id,
        rating: req.rating,
        review,
        review_date_ms: now_ms(),
    };
    match state.reviews.insert_review(record).await {
        Ok(review) => {
            let location = format!("/api/v1/reviews/{}", review.review_id);
            created_at(&location, review_to_dto(review))
        }
        Err(err) => storage_error(err),
    }
}

/// 修改书评
pub async fn update_review(
    State(state): State<AppState>,
    Extension(account): Extension<AccountContext>,
    Path(path): Path<ReviewPath>,
    payload: Result<Json<UpdateReviewRequest>, JsonRejection>,
) -> Response {
    let req = match read_json(payload) {
        Ok(req) => req,
        Err(response) => return response,
    };
    let current = match state.reviews.find_review(&path.review_id).await {
        Ok(Some(review)) if review.user_id == account.user_id => review,
        Ok(_) => return not_found_error(),
        Err(err) => return storage_error(err),
    };
    let update = ReviewUpdate {
        rating: req.rating,
        review: normalize_optional(req.review),
    };
    let mut v = ValidationErrors::new();
    validate_review(
        &mut v,
        update.rating.unwrap_or(current.rating),
        update.review.as_deref().unwrap_or(&current.review),
    );
    if !v.is_empty() {
        return validation_error(v);
    }

    match state
        .reviews
        .update_review(&path.review_id, &account.user_id, update)
        .await
    {
        Ok(Some(review)) => {
            (StatusCode::OK, Json(ApiResponse::success(review_to_dto(review)))).into_response()
        }
        Ok(None) => not_found_error(),
        Err(err) => storage_error(err),
    }
}

/// 删除书评
pub async fn delete_review(
    State(state): State<AppState>,
    Extension(account): Extension<AccountContext>,
    Path(path): Path<ReviewPath>,
) -> Response {
    match state
        .reviews
        .delete_review(&path.review_id, &account.user_id)
        .await
    {
        Ok(true) => (
            StatusCode::OK,
            Json(ApiResponse::success(MessageDto::new(
                "review successfully deleted",
            ))),
        )
            .into_response(),
        Ok(false) => not_found_error(),
        Err(err) => storage_error(err),
    }
}
