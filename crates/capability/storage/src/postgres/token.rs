//! Postgres token 存储实现
//!
//! 查找条件：`hash = $1 and scope = $2 and expires_at_ms > $3`，
//! 摘要列为主键，查找走索引。

use crate::connection::bounded;
use crate::error::StorageError;
use crate::models::{TokenRecord, UserRecord};
use crate::postgres::user::user_from_row;
use crate::traits::TokenStore;
use domain::TokenScope;
use sqlx::PgPool;
use std::time::Duration;

pub struct PgTokenStore {
    pub pool: PgPool,
    timeout: Duration,
}

impl PgTokenStore {
    pub fn new(pool: PgPool, timeout: Duration) -> Self {
        Self { pool, timeout }
    }
}

#[async_trait::async_trait]
impl TokenStore for PgTokenStore {
    async fn insert_token(&self, token: TokenRecord) -> Result<(), StorageError> {
        bounded(
            self.timeout,
            sqlx::query(
                "insert into tokens (hash, user_id, scope, expires_at_ms, created_at_ms) \
                 values ($1, $2, $3, $4, $5)",
            )
            .bind(&token.hash)
            .bind(&token.user_id)
            .bind(token.scope.as_str())
            .bind(token.expires_at_ms)
            .bind(token.created_at_ms)
            .execute(&self.pool),
        )
        .await?;
        Ok(())
    }

    async fn find_user_for_token(
        &self,
        hash: &[u8],
        scope: TokenScope,
        now_ms: i64,
    ) -> Result<Option<UserRecord>, StorageError> {
        let row = bounded(
            self.timeout,
            sqlx::query(
                "select u.user_id, u.username, u.email::text as email, u.password_hash, \
                        u.activated, u.version, u.created_at_ms \
                 from users u \
                 join tokens t on t.user_id = u.user_id \
                 where t.hash = $1 and t.scope = $2 and t.expires_at_ms > $3",
            )
            .bind(hash)
            .bind(scope.as_str())
            .bind(now_ms)
            .fetch_optional(&self.pool),
        )
        .await?;
        let Some(row) = row else {
            return Ok(None);
        };
        Ok(Some(user_from_row(&row)?))
    }

    async fn delete_tokens_for_user(
        &self,
        scope: TokenScope,
        user_id: &str,
    ) -> Result<u64, StorageError> {
        let result = bounded(
            self.timeout,
            sqlx::query("delete from tokens where scope = $1 and user_id = $2")
                .bind(scope.as_str())
                .bind(user_id)
                .execute(&self.pool),
        )
        .await?;
        Ok(result.rows_affected())
    }
}
