//! 图书 CRUD handlers
//!
//! 提供图书资源的增删改查接口：
//! - GET /api/v1/books - 过滤、排序、分页列出图书
//! - GET /api/v1/books-search - 按条件搜索（最多 100 条）
//! - POST /api/v1/books - 创建图书（201 + Location）
//! - GET /api/v1/books/:book_id - 获取图书详情
//! - PUT /api/v1/books/:book_id - 更新图书（带 version 乐观并发校验）
//! - DELETE /api/v1/books/:book_id - 删除图书
//!
//! 权限要求：所有接口需要已激活账户

use crate::AppState;
use crate::utils::response::{
    book_to_dto, created_at, metadata_to_dto, not_found_error, storage_error, validation_error,
};
use crate::utils::validation::{
    BookQuery, book_filter, normalize, normalize_optional, read_json, search_filter,
    validate_book,
};
use crate::utils::now_ms;
use api_contract::{
    ApiResponse, BookDto, BookListDto, CreateBookRequest, MessageDto, UpdateBookRequest,
};
use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use shelf_auth::ValidationErrors;
use shelf_storage::{BookRecord, BookUpdate};
use tracing::info;
use uuid::Uuid;

#[derive(serde::Deserialize)]
pub struct BookPath {
    book_id: String,
}

/// 列出图书
pub async fn list_books(State(state): State<AppState>, Query(query): Query<BookQuery>) -> Response {
    let filter = match book_filter(query) {
        Ok(filter) => filter,
        Err(errors) => return validation_error(errors),
    };
    match state.books.list_books(&filter).await {
        Ok((books, metadata)) => {
            let data = BookListDto {
                books: books.into_iter().map(book_to_dto).collect(),
                metadata: metadata_to_dto(metadata),
            };
            (StatusCode::OK, Json(ApiResponse::success(data))).into_response()
        }
        Err(err) => storage_error(err),
    }
}

/// 搜索图书
pub async fn search_books(
    State(state): State<AppState>,
    Query(query): Query<BookQuery>,
) -> Response {
    match state.books.list_books(&search_filter(query)).await {
        Ok((books, _)) => {
            let data: Vec<BookDto> = books.into_iter().map(book_to_dto).collect();
            (StatusCode::OK, Json(ApiResponse::success(data))).into_response()
        }
        Err(err) => storage_error(err),
    }
}

/// 创建图书
pub async fn create_book(
    State(state): State<AppState>,
    payload: Result<Json<CreateBookRequest>, JsonRejection>,
) -> Response {
    let req = match read_json(payload) {
        Ok(req) => req,
        Err(response) => return response,
    };
    let record = BookRecord {
        book_id: Uuid::new_v4().to_string(),
        title: normalize(req.title),
        authors: req.authors.into_iter().map(normalize).collect(),
        isbn: normalize(req.isbn),
        publication_date: normalize(req.publication_date),
        genre: normalize(req.genre),
        description: normalize(req.description),
        created_at_ms: now_ms(),
        version: 1,
    };
    let mut v = ValidationErrors::new();
    validate_book(&mut v, &record);
    if !v.is_empty() {
        return validation_error(v);
    }
    match state.books.insert_book(record).await {
        Ok(book) => {
            info!(target: "shelf.api", book_id = %book.book_id, "book_created");
            let location = format!("/api/v1/books/{}", book.book_id);
            created_at(&location, book_to_dto(book))
        }
        Err(err) => storage_error(err),
    }
}

/// 获取图书详情
pub async fn get_book(State(state): State<AppState>, Path(path): Path<BookPath>) -> Response {
    match state.books.find_book(&path.book_id).await {
        Ok(Some(book)) => {
            (StatusCode::OK, Json(ApiResponse::success(book_to_dto(book)))).into_response()
        }
        Ok(None) => not_found_error(),
        Err(err) => storage_error(err),
    }
}

/// 更新图书
///
/// 请求体带 `version` 时以它为期望版本，否则以刚读到的版本为准；
/// 版本不匹配返回 409。
pub async fn update_book(
    State(state): State<AppState>,
    Path(path): Path<BookPath>,
    payload: Result<Json<UpdateBookRequest>, JsonRejection>,
) -> Response {
    let req = match read_json(payload) {
        Ok(req) => req,
        Err(response) => return response,
    };
    let current = match state.books.find_book(&path.book_id).await {
        Ok(Some(book)) => book,
        Ok(None) => return not_found_error(),
        Err(err) => return storage_error(err),
    };
    let expected_version = req.version.unwrap_or(current.version);
    let update = BookUpdate {
        title: normalize_optional(req.title),
        authors: req
            .authors
            .map(|authors| authors.into_iter().map(normalize).collect()),
        isbn: normalize_optional(req.isbn),
        publication_date: normalize_optional(req.publication_date),
        genre: normalize_optional(req.genre),
        description: normalize_optional(req.description),
    };

    let mut candidate = current;
    update.clone().apply(&mut candidate);
    let mut v = ValidationErrors::new();
    validate_book(&mut v, &candidate);
    if !v.is_empty() {
        return validation_error(v);
    }

    match state
        .books
        .update_book(&path.book_id, expected_version, update)
        .await
    {
        Ok(book) => {
            (StatusCode::OK, Json(ApiResponse::success(book_to_dto(book)))).into_response()
        }
        Err(err) => storage_error(err),
    }
}

/// 删除图书
pub async fn delete_book(State(state): State<AppState>, Path(path): Path<BookPath>) -> Response {
    match state.books.delete_book(&path.book_id).await {
        Ok(true) => {
            info!(target: "shelf.api", book_id = %path.book_id, "book_deleted");
            (
                StatusCode::OK,
                Json(ApiResponse::success(MessageDto::new(
                    "book successfully deleted",
                ))),
            )
                .into_response()
        }
        Ok(false) => not_found_error(),
        Err(err) => storage_error(err),
    }
}
