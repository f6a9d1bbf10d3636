//! 稳定的 DTO 与 API 响应契约。

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 标准 API 响应封装。
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<ApiError>,
}

/// 失败响应的错误体。
///
/// 校验失败时 `fields` 给出逐字段的错误信息。
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<BTreeMap<String, String>>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(ApiError {
                code: code.into(),
                message: message.into(),
                fields: None,
            }),
        }
    }

    /// 带逐字段错误的失败响应。
    pub fn field_errors(
        code: impl Into<String>,
        message: impl Into<String>,
        fields: BTreeMap<String, String>,
    ) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(ApiError {
                code: code.into(),
                message: message.into(),
                fields: Some(fields),
            }),
        }
    }
}

/// 注册请求体。缺失字段按空串处理，交给校验逻辑报错。
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// 激活请求体。
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ActivateRequest {
    pub token: String,
}

/// 登录（签发认证 token）请求体。
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AuthenticationRequest {
    pub email: String,
    pub password: String,
}

/// 认证 token 响应体；明文只在此处返回一次。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticationTokenDto {
    pub token: String,
    /// 过期时间（epoch 毫秒）。
    pub expiry: i64,
}

/// 申请重置口令请求体。
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PasswordResetRequest {
    pub email: String,
}

/// 重置口令请求体。
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResetPasswordRequest {
    pub token: String,
    pub password: String,
}

/// 账户返回结构（不含口令哈希与 version）。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    pub user_id: String,
    pub username: String,
    pub email: String,
    pub activated: bool,
    pub created_at: i64,
}

/// 纯文本消息返回结构。
#[derive(Debug, Serialize)]
pub struct MessageDto {
    pub message: String,
}

impl MessageDto {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// 图书创建请求体。
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateBookRequest {
    pub title: String,
    pub authors: Vec<String>,
    pub isbn: String,
    pub publication_date: String,
    pub genre: String,
    pub description: String,
}

/// 图书更新请求体；`version` 缺省时以读取到的版本为准。
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBookRequest {
    pub title: Option<String>,
    pub authors: Option<Vec<String>>,
    pub isbn: Option<String>,
    pub publication_date: Option<String>,
    pub genre: Option<String>,
    pub description: Option<String>,
    pub version: Option<i64>,
}

/// 图书返回结构。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookDto {
    pub book_id: String,
    pub title: String,
    pub authors: Vec<String>,
    pub isbn: String,
    pub publication_date: String,
    pub genre: String,
    pub description: String,
    pub created_at: i64,
    pub version: i64,
}

/// 分页元数据；无记录时所有字段省略。
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataDto {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_records: Option<u64>,
}

/// 图书列表返回结构。
#[derive(Debug, Serialize)]
pub struct BookListDto {
    pub books: Vec<BookDto>,
    pub metadata: MetadataDto,
}

/// 书评创建请求体。
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateReviewRequest {
    pub rating: f64,
    pub review: String,
}

/// 书评更新请求体。
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateReviewRequest {
    pub rating: Option<f64>,
    pub review: Option<String>,
}

/// 书评返回结构。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewDto {
    pub review_id: String,
    pub book_id: String,
    pub user_id: String,
    pub rating: f64,
    pub review: String,
    pub review_date: i64,
}

/// 书单创建请求体。
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateReadingListRequest {
    pub name: String,
    pub description: String,
    pub status: String,
}

/// 书单更新请求体。
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateReadingListRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
}

/// 书单加入/移除图书请求体。
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReadingListBookRequest {
    pub book_id: String,
}

/// 书单返回结构。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadingListDto {
    pub list_id: String,
    pub name: String,
    pub description: String,
    pub created_by: String,
    pub books: Vec<String>,
    pub status: String,
    pub created_at: i64,
}

/// 健康检查返回结构。
#[derive(Debug, Serialize)]
pub struct HealthDto {
    pub status: String,
    pub environment: String,
    pub version: String,
}

/// 认证相关计数快照。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthMetricsDto {
    pub tokens_issued: u64,
    pub tokens_redeemed: u64,
    pub login_failures: u64,
    pub mails_sent: u64,
    pub mails_failed: u64,
    pub edit_conflicts: u64,
}
