//! 数据库连接管理
//!
//! 提供数据库连接池初始化与存储调用超时：
//! - connect_pool：建立 Postgres 连接池
//! - bounded：为单次存储调用加上固定时限
//!
//! 设计原则：
//! - 获取连接与执行查询共用同一个时限
//! - 超时返回 StorageError::Timeout，不无限挂起请求

use crate::error::StorageError;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::future::Future;
use std::time::Duration;

/// 连接池参数。
#[derive(Debug, Clone)]
pub struct PoolSettings {
    pub max_connections: u32,
    pub store_timeout: Duration,
}

/// 建立 Postgres 连接池
///
/// # 参数
/// - `database_url`：Postgres 连接字符串
/// - `settings`：最大连接数与获取连接时限
pub async fn connect_pool(
    database_url: &str,
    settings: &PoolSettings,
) -> Result<PgPool, StorageError> {
    let pool = PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .acquire_timeout(settings.store_timeout)
        .connect(database_url)
        .await?;
    Ok(pool)
}

/// 为存储调用加时限；超时即取消该调用。
pub async fn bounded<T, E, F>(limit: Duration, fut: F) -> Result<T, StorageError>
where
    F: Future<Output = Result<T, E>>,
    E: Into<StorageError>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result.map_err(Into::into),
        Err(_) => Err(StorageError::Timeout),
    }
}
