//! HTTP 响应辅助函数和 DTO 转换
//!
//! 提供统一的错误响应构造函数和 DTO 转换函数：
//! - 错误响应：invalid_token_error, authentication_required_error, not_activated_error,
//!   validation_error, edit_conflict_error, not_found_error, bad_request_error, internal_error
//! - 错误映射：account_error（AuthError）, storage_error（StorageError）
//! - DTO 转换：user_to_dto, book_to_dto, metadata_to_dto, review_to_dto, reading_list_to_dto
//!
//! 设计原则：
//! - 所有错误返回统一的 ApiResponse 格式
//! - HTTP 状态码与错误码对应
//! - 内部错误只写日志，响应体使用固定文案

use api_contract::{
    ApiResponse, BookDto, MetadataDto, ReadingListDto, ReviewDto, UserDto,
};
use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use shelf_auth::{AuthError, ValidationErrors};
use shelf_storage::{
    BookRecord, PageMetadata, ReadingListRecord, ReviewRecord, StorageError, UserRecord,
};
use std::fmt::Display;
use tracing::error;

const INTERNAL_MESSAGE: &str = "the server encountered a problem and could not process your request";

/// Bearer token 格式错误或无效
pub fn invalid_token_error() -> Response {
    let mut response = (
        StatusCode::UNAUTHORIZED,
        Json(ApiResponse::<()>::error(
            "AUTH.INVALID_TOKEN",
            "invalid or missing authentication token",
        )),
    )
        .into_response();
    response
        .headers_mut()
        .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
    response
}

/// 匿名访问受保护资源
pub fn authentication_required_error() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(ApiResponse::<()>::error(
            "AUTH.AUTHENTICATION_REQUIRED",
            "you must be authenticated to access this resource",
        )),
    )
        .into_response()
}

/// 账户未激活
pub fn not_activated_error() -> Response {
    (
        StatusCode::FORBIDDEN,
        Json(ApiResponse::<()>::error(
            "AUTH.NOT_ACTIVATED",
            "your user account must be activated to access this resource",
        )),
    )
        .into_response()
}

/// 邮箱或口令错误
pub fn invalid_credentials_error() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(ApiResponse::<()>::error(
            "AUTH.INVALID_CREDENTIALS",
            "invalid authentication credentials",
        )),
    )
        .into_response()
}

/// 错误请求响应
pub fn bad_request_error(message: impl Into<String>) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ApiResponse::<()>::error("INVALID.REQUEST", message.into())),
    )
        .into_response()
}

/// 资源未找到错误响应
pub fn not_found_error() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(ApiResponse::<()>::error(
            "RESOURCE.NOT_FOUND",
            "the requested resource could not be found",
        )),
    )
        .into_response()
}

/// 乐观并发冲突
pub fn edit_conflict_error() -> Response {
    (
        StatusCode::CONFLICT,
        Json(ApiResponse::<()>::error(
            "RESOURCE.EDIT_CONFLICT",
            "unable to update the record due to an edit conflict, please try again",
        )),
    )
        .into_response()
}

/// 逐字段校验失败
pub fn validation_error(errors: ValidationErrors) -> Response {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(ApiResponse::<()>::field_errors(
            "VALIDATION.FAILED",
            "validation failed",
            errors.into_fields(),
        )),
    )
        .into_response()
}

/// 内部错误：细节写日志，响应只给固定文案
pub fn internal_error(detail: impl Display) -> Response {
    error!(target: "shelf.api", error = %detail, "internal_error");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiResponse::<()>::error("INTERNAL.ERROR", INTERNAL_MESSAGE)),
    )
        .into_response()
}

/// 账户流程错误映射
///
/// `token_message` 是请求体 token 无效时返回给 `token` 字段的文案。
pub fn account_error(err: AuthError, token_message: &str) -> Response {
    match err {
        AuthError::TokenNotFound => validation_error(ValidationErrors::single("token", token_message)),
        AuthError::InvalidCredentials => invalid_credentials_error(),
        AuthError::Validation(errors) => validation_error(errors),
        AuthError::EditConflict => edit_conflict_error(),
        AuthError::Storage(detail) => internal_error(detail),
        AuthError::Fatal(detail) => internal_error(format!("fatal: {detail}")),
    }
}

/// 存储错误映射
pub fn storage_error(err: StorageError) -> Response {
    match err {
        StorageError::EditConflict => {
            shelf_telemetry::record_edit_conflict();
            edit_conflict_error()
        }
        other => internal_error(other),
    }
}

/// UserRecord 转 UserDto
pub fn user_to_dto(record: UserRecord) -> UserDto {
    UserDto {
        user_id: record.user_id,
        username: record.username,
        email: record.email,
        activated: record.activated,
        created_at: record.created_at_ms,
    }
}

/// BookRecord 转 BookDto
pub fn book_to_dto(record: BookRecord) -> BookDto {
    BookDto {
        book_id: record.book_id,
        title: record.title,
        authors: record.authors,
        isbn: record.isbn,
        publication_date: record.publication_date,
        genre: record.genre,
        description: record.description,
        created_at: record.created_at_ms,
        version: record.version,
    }
}

/// 分页元数据；无记录时返回空对象
pub fn metadata_to_dto(metadata: PageMetadata) -> MetadataDto {
    if metadata.total_records == 0 {
        return MetadataDto::default();
    }
    MetadataDto {
        current_page: Some(metadata.current_page),
        page_size: Some(metadata.page_size),
        first_page: Some(metadata.first_page),
        last_page: Some(metadata.last_page),
        total_records: Some(metadata.total_records),
    }
}

/// ReviewRecord 转 ReviewDto
pub fn review_to_dto(record: ReviewRecord) -> ReviewDto {
    ReviewDto {
        review_id: record.review_id,
        book_id: record.book_id,
        user_id: record.user_id,
        rating: record.rating,
        review: record.review,
        review_date: record.review_date_ms,
    }
}

/// ReadingListRecord 转 ReadingListDto
pub fn reading_list_to_dto(record: ReadingListRecord) -> ReadingListDto {
    ReadingListDto {
        list_id: record.list_id,
        name: record.name,
        description: record.description,
        created_by: record.created_by,
        books: record.books,
        status: record.status.as_str().to_string(),
        created_at: record.created_at_ms,
    }
}

/// 201 + Location
pub fn created_at<T: serde::Serialize>(location: &str, data: T) -> Response {
    let mut response = (StatusCode::CREATED, Json(ApiResponse::success(data))).into_response();
    if let Ok(value) = HeaderValue::from_str(location) {
        response.headers_mut().insert(header::LOCATION, value);
    }
    response
}
