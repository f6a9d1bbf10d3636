//! Postgres 账户存储实现
//!
//! 设计要点：
//! - email 列为 citext：查找与唯一约束都大小写不敏感
//! - 条件更新：`where user_id = $ and version = $expected`

use crate::connection::bounded;
use crate::error::StorageError;
use crate::models::{NewUser, UserRecord, UserUpdate};
use crate::traits::UserStore;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use std::time::Duration;

const USER_COLUMNS: &str =
    "user_id, username, email::text as email, password_hash, activated, version, created_at_ms";

pub struct PgUserStore {
    pub pool: PgPool,
    timeout: Duration,
}

impl PgUserStore {
    pub fn new(pool: PgPool, timeout: Duration) -> Self {
        Self { pool, timeout }
    }
}

pub(crate) fn user_from_row(row: &PgRow) -> Result<UserRecord, sqlx::Error> {
    Ok(UserRecord {
        user_id: row.try_get("user_id")?,
        username: row.try_get("username")?,
        email: row.try_get("email")?,
        password_hash: row.try_get("password_hash")?,
        activated: row.try_get("activated")?,
        version: row.try_get("version")?,
        created_at_ms: row.try_get("created_at_ms")?,
    })
}

#[async_trait::async_trait]
impl UserStore for PgUserStore {
    async fn insert_user(&self, user: NewUser) -> Result<UserRecord, StorageError> {
        let sql = format!(
            "insert into users (user_id, username, email, password_hash, activated, version, created_at_ms) \
             values ($1, $2, $3::citext, $4, false, 1, $5) \
             returning {USER_COLUMNS}"
        );
        let row = bounded(
            self.timeout,
            sqlx::query(&sql)
                .bind(&user.user_id)
                .bind(&user.username)
                .bind(&user.email)
                .bind(&user.password_hash)
                .bind(user.created_at_ms)
                .fetch_one(&self.pool),
        )
        .await?;
        Ok(user_from_row(&row)?)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, StorageError> {
        let sql = format!("select {USER_COLUMNS} from users where email = $1::citext");
        let row = bounded(
            self.timeout,
            sqlx::query(&sql).bind(email).fetch_optional(&self.pool),
        )
        .await?;
        let Some(row) = row else {
            return Ok(None);
        };
        Ok(Some(user_from_row(&row)?))
    }

    async fn find_user(&self, user_id: &str) -> Result<Option<UserRecord>, StorageError> {
        let sql = format!("select {USER_COLUMNS} from users where user_id = $1");
        let row = bounded(
            self.timeout,
            sqlx::query(&sql).bind(user_id).fetch_optional(&self.pool),
        )
        .await?;
        let Some(row) = row else {
            return Ok(None);
        };
        Ok(Some(user_from_row(&row)?))
    }

    async fn update_user(
        &self,
        user_id: &str,
        expected_version: i64,
        update: UserUpdate,
    ) -> Result<UserRecord, StorageError> {
        let sql = format!(
            "update users set \
             activated = coalesce($1, activated), \
             password_hash = coalesce($2, password_hash), \
             username = coalesce($3, username), \
             version = version + 1 \
             where user_id = $4 and version = $5 \
             returning {USER_COLUMNS}"
        );
        let row = bounded(
            self.timeout,
            sqlx::query(&sql)
                .bind(update.activated)
                .bind(update.password_hash)
                .bind(update.username)
                .bind(user_id)
                .bind(expected_version)
                .fetch_optional(&self.pool),
        )
        .await?;
        // 0 行：version 已变或账户已删除，一律视为冲突
        let Some(row) = row else {
            return Err(StorageError::EditConflict);
        };
        Ok(user_from_row(&row)?)
    }
}
