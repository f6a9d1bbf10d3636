//! 认证指标快照。
//!
//! - GET /v1/metrics（需已激活账户）

use api_contract::{ApiResponse, AuthMetricsDto};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use shelf_telemetry::metrics;

pub async fn get_metrics() -> Response {
    let snapshot = metrics().snapshot();
    (
        StatusCode::OK,
        Json(ApiResponse::success(AuthMetricsDto {
            tokens_issued: snapshot.tokens_issued,
            tokens_redeemed: snapshot.tokens_redeemed,
            login_failures: snapshot.login_failures,
            mails_sent: snapshot.mails_sent,
            mails_failed: snapshot.mails_failed,
            edit_conflicts: snapshot.edit_conflicts,
        })),
    )
        .into_response()
}
