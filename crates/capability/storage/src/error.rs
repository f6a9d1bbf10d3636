//! 存储层错误类型
//!
//! 定义统一的存储错误类型，用于封装底层错误：
//! - 唯一约束冲突（邮箱重复）
//! - 乐观并发冲突（version 不匹配）
//! - 存储调用超时
//! - 其他 SQL / 连接错误

/// Postgres 唯一约束冲突 SQLSTATE。
const UNIQUE_VIOLATION: &str = "23505";

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("duplicate email")]
    DuplicateEmail,
    #[error("edit conflict")]
    EditConflict,
    #[error("storage timeout")]
    Timeout,
    #[error("{0}")]
    Backend(String),
}

impl StorageError {
    pub fn new(message: impl Into<String>) -> Self {
        Self::Backend(message.into())
    }
}

impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db_err)
                if db_err.code().as_deref() == Some(UNIQUE_VIOLATION)
                    && db_err.constraint() == Some("users_email_key") =>
            {
                Self::DuplicateEmail
            }
            sqlx::Error::PoolTimedOut => Self::Timeout,
            _ => Self::Backend(err.to_string()),
        }
    }
}
