//! 书单 handlers
//!
//! - GET /api/v1/lists - 列出全部书单
//! - POST /api/v1/lists - 创建书单，创建者为当前账户
//! - GET /api/v1/lists/:list_id - 书单详情
//! - PUT /api/v1/lists/:list_id - 修改书单
//! - DELETE /api/v1/lists/:list_id - 删除书单
//! - POST /api/v1/lists/:list_id/books - 加入图书（已在书单中则不变）
//! - DELETE /api/v1/lists/:list_id/books - 移除图书
//!
//! 修改类接口只对创建者开放；书单或图书不存在、非创建者都返回 404。

use crate::AppState;
use crate::utils::response::{
    created_at, not_found_error, reading_list_to_dto, storage_error, validation_error,
};
use crate::utils::validation::{
    normalize, normalize_optional, parse_status, read_json, validate_reading_list,
};
use crate::utils::now_ms;
use api_contract::{
    ApiResponse, CreateReadingListRequest, MessageDto, ReadingListBookRequest, ReadingListDto,
    UpdateReadingListRequest,
};
use axum::{
    Extension, Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use domain::AccountContext;
use shelf_auth::ValidationErrors;
use shelf_storage::{ReadingListRecord, ReadingListUpdate};
use uuid::Uuid;

#[derive(serde::Deserialize)]
pub struct ListPath {
    list_id: String,
}

fn list_ok(list: ReadingListRecord) -> Response {
    (
        StatusCode::OK,
        Json(ApiResponse::success(reading_list_to_dto(list))),
    )
        .into_response()
}

/// 列出书单
pub async fn list_reading_lists(State(state): State<AppState>) -> Response {
    match state.lists.list_reading_lists().await {
        Ok(lists) => {
            let data: Vec<ReadingListDto> = lists.into_iter().map(reading_list_to_dto).collect();
            (StatusCode::OK, Json(ApiResponse::success(data))).into_response()
        }
        Err(err) => storage_error(err),
    }
}

/// 创建书单
pub async fn create_reading_list(
    State(state): State<AppState>,
    Extension(account): Extension<AccountContext>,
    payload: Result<Json<CreateReadingListRequest>, JsonRejection>,
) -> Response {
    let req = match read_json(payload) {
        Ok(req) => req,
        Err(response) => return response,
    };
    let name = normalize(req.name);
    let description = normalize(req.description);
    let mut v = ValidationErrors::new();
    validate_reading_list(&mut v, &name, &description);
    let status = match parse_status(&mut v, req.status.trim()) {
        Some(status) if v.is_empty() => status,
        _ => return validation_error(v),
    };

    let record = ReadingListRecord {
        list_id: Uuid::new_v4().to_string(),
        name,
        description,
        created_by: account.user_id,
        books: Vec::new(),
        status,
        created_at_ms: now_ms(),
    };
    match state.lists.insert_reading_list(record).await {
        Ok(list) => {
            let location = format!("/api/v1/lists/{}", list.list_id);
            created_at(&location, reading_list_to_dto(list))
        }
        Err(err) => storage_error(err),
    }
}

/// 书单详情
pub async fn get_reading_list(
    State(state): State<AppState>,
    Path(path): Path<ListPath>,
) -> Response {
    match state.lists.find_reading_list(&path.list_id).await {
        Ok(Some(list)) => list_ok(list),
        Ok(None) => not_found_error(),
        Err(err) => storage_error(err),
    }
}

/// 修改书单
pub async fn update_reading_list(
    State(state): State<AppState>,
    Extension(account): Extension<AccountContext>,
    Path(path): Path<ListPath>,
    payload: Result<Json<UpdateReadingListRequest>, JsonRejection>,
) -> Response {
    let req = match read_json(payload) {
        Ok(req) => req,
        Err(response) => return response,
    };
    let current = match state.lists.find_reading_list(&path.list_id).await {
        Ok(Some(list)) if list.created_by == account.user_id => list,
        Ok(_) => return not_found_error(),
        Err(err) => return storage_error(err),
    };

    let name = normalize_optional(req.name);
    let description = normalize_optional(req.description);
    let mut v = ValidationErrors::new();
    validate_reading_list(
        &mut v,
        name.as_deref().unwrap_or(&current.name),
        description.as_deref().unwrap_or(&current.description),
    );
    let status = match req.status {
        Some(status) => parse_status(&mut v, status.trim()),
        None => None,
    };
    if !v.is_empty() {
        return validation_error(v);
    }

    let update = ReadingListUpdate {
        name,
        description,
        status,
    };
    match state
        .lists
        .update_reading_list(&path.list_id, &account.user_id, update)
        .await
    {
        Ok(Some(list)) => list_ok(list),
        Ok(None) => not_found_error(),
        Err(err) => storage_error(err),
    }
}

/// 删除书单
pub async fn delete_reading_list(
    State(state): State<AppState>,
    Extension(account): Extension<AccountContext>,
    Path(path): Path<ListPath>,
) -> Response {
    match state
        .lists
        .delete_reading_list(&path.list_id, &account.user_id)
        .await
    {
        Ok(true) => (
            StatusCode::OK,
            Json(ApiResponse::success(MessageDto::new(
                "reading list successfully deleted",
            ))),
        )
            .into_response(),
        Ok(false) => not_found_error(),
        Err(err) => storage_error(err),
    }
}

/// 向书单加入图书
pub async fn add_book_to_list(
    State(state): State<AppState>,
    Extension(account): Extension<AccountContext>,
    Path(path): Path<ListPath>,
    payload: Result<Json<ReadingListBookRequest>, JsonRejection>,
) -> Response {
    let book_id = match read_book_id(&state, payload).await {
        Ok(book_id) => book_id,
        Err(response) => return response,
    };
    match state
        .lists
        .add_book_to_list(&path.list_id, &account.user_id, &book_id)
        .await
    {
        Ok(Some(list)) => list_ok(list),
        Ok(None) => not_found_error(),
        Err(err) => storage_error(err),
    }
}

/// 从书单移除图书
pub async fn remove_book_from_list(
    State(state): State<AppState>,
    Extension(account): Extension<AccountContext>,
    Path(path): Path<ListPath>,
    payload: Result<Json<ReadingListBookRequest>, JsonRejection>,
) -> Response {
    let book_id = match read_book_id(&state, payload).await {
        Ok(book_id) => book_id,
        Err(response) => return response,
    };
    match state
        .lists
        .remove_book_from_list(&path.list_id, &account.user_id, &book_id)
        .await
    {
        Ok(Some(list)) => list_ok(list),
        Ok(None) => not_found_error(),
        Err(err) => storage_error(err),
    }
}

/// 解析请求体中的 bookId，并确认图书存在
async fn read_book_id(
    state: &AppState,
    payload: Result<Json<ReadingListBookRequest>, JsonRejection>,
) -> Result<String, Response> {
    let req = read_json(payload)?;
    let book_id = normalize(req.book_id);
    if book_id.is_empty() {
        return Err(validation_error(ValidationErrors::single(
            "bookId",
            "must be provided",
        )));
    }
    match state.books.find_book(&book_id).await {
        Ok(Some(_)) => Ok(book_id),
        Ok(None) => Err(not_found_error()),
        Err(err) => Err(storage_error(err)),
    }
}
