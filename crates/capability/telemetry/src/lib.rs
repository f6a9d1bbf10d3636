//! 追踪、请求 ID 生成与认证指标。

use std::sync::OnceLock;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing_subscriber::{EnvFilter, fmt};

/// 请求级追踪标识。
#[derive(Debug, Clone)]
pub struct RequestIds {
    pub request_id: String,
    pub trace_id: String,
}

/// 认证指标快照。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub tokens_issued: u64,
    pub tokens_redeemed: u64,
    pub login_failures: u64,
    pub mails_sent: u64,
    pub mails_failed: u64,
    pub edit_conflicts: u64,
}

/// 认证指标计数器（进程内累计）。
pub struct TelemetryMetrics {
    tokens_issued: AtomicU64,
    tokens_redeemed: AtomicU64,
    login_failures: AtomicU64,
    mails_sent: AtomicU64,
    mails_failed: AtomicU64,
    edit_conflicts: AtomicU64,
}

impl TelemetryMetrics {
    pub fn new() -> Self {
        Self {
            tokens_issued: AtomicU64::new(0),
            tokens_redeemed: AtomicU64::new(0),
            login_failures: AtomicU64::new(0),
            mails_sent: AtomicU64::new(0),
            mails_failed: AtomicU64::new(0),
            edit_conflicts: AtomicU64::new(0),
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            tokens_issued: self.tokens_issued.load(Ordering::Relaxed),
            tokens_redeemed: self.tokens_redeemed.load(Ordering::Relaxed),
            login_failures: self.login_failures.load(Ordering::Relaxed),
            mails_sent: self.mails_sent.load(Ordering::Relaxed),
            mails_failed: self.mails_failed.load(Ordering::Relaxed),
            edit_conflicts: self.edit_conflicts.load(Ordering::Relaxed),
        }
    }
}

impl Default for TelemetryMetrics {
    fn default() -> Self {
        Self::new()
    }
}

static METRICS: OnceLock<TelemetryMetrics> = OnceLock::new();

/// 获取全局指标实例。
pub fn metrics() -> &'static TelemetryMetrics {
    METRICS.get_or_init(TelemetryMetrics::new)
}

/// 初始化 tracing（默认 info）。
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).try_init();
}

/// 生成新的 request_id 与 trace_id。
pub fn new_request_ids() -> RequestIds {
    RequestIds {
        request_id: uuid::Uuid::new_v4().to_string(),
        trace_id: uuid::Uuid::new_v4().to_string(),
    }
}

/// 记录 token 签发次数（任意作用域）。
pub fn record_token_issued() {
    metrics().tokens_issued.fetch_add(1, Ordering::Relaxed);
}

/// 记录一次性 token 兑现次数（激活、重置口令）。
pub fn record_token_redeemed() {
    metrics().tokens_redeemed.fetch_add(1, Ordering::Relaxed);
}

/// 记录登录失败次数。
pub fn record_login_failure() {
    metrics().login_failures.fetch_add(1, Ordering::Relaxed);
}

pub fn record_mail_sent() {
    metrics().mails_sent.fetch_add(1, Ordering::Relaxed);
}

pub fn record_mail_failed() {
    metrics().mails_failed.fetch_add(1, Ordering::Relaxed);
}

/// 记录乐观并发冲突次数。
pub fn record_edit_conflict() {
    metrics().edit_conflicts.fetch_add(1, Ordering::Relaxed);
}
