//! 运维端点：健康检查与存活/就绪探针
//!
//! - `GET /v1/healthcheck`：状态、运行环境、版本号
//! - `GET /livez`：只反映进程存活
//! - `GET /readyz`：配置了 Postgres 时检查连接

use crate::AppState;
use crate::utils::response::not_found_error;
use api_contract::{ApiResponse, HealthDto};
use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::warn;

/// 健康检查端点（无需认证）
pub async fn healthcheck(State(state): State<AppState>) -> Response {
    let health = HealthDto {
        status: "available".to_string(),
        environment: state.environment.clone(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    };
    (StatusCode::OK, Json(ApiResponse::success(health))).into_response()
}

/// Liveness 探针：只反映进程存活，不做外部依赖检查。
pub async fn livez() -> impl IntoResponse {
    Json(serde_json::json!({ "ok": true }))
}

/// Readiness 探针：用于反映关键依赖是否就绪（当前检查 Postgres 连接）。
pub async fn readyz(State(state): State<AppState>) -> Response {
    let Some(pool) = state.db_pool.as_ref() else {
        return (StatusCode::OK, Json(serde_json::json!({ "ok": true }))).into_response();
    };

    match sqlx::query_scalar::<_, i32>("select 1").fetch_one(pool).await {
        Ok(_) => (StatusCode::OK, Json(serde_json::json!({ "ok": true }))).into_response(),
        Err(err) => {
            warn!(target: "shelf.api", error = %err, "readyz_check_failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(serde_json::json!({ "ok": false })),
            )
                .into_response()
        }
    }
}

/// 未匹配路由
pub async fn fallback() -> Response {
    not_found_error()
}
