//! Postgres 书单存储实现
//!
//! 书单中的图书 ID 存为 `text[]`，加入/移除用 `array_append` / `array_remove`。

use crate::connection::bounded;
use crate::error::StorageError;
use crate::models::{ReadingListRecord, ReadingListStatus, ReadingListUpdate};
use crate::traits::ReadingListStore;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use std::time::Duration;

const LIST_COLUMNS: &str = "list_id, name, description, created_by, books, status, created_at_ms";

pub struct PgReadingListStore {
    pub pool: PgPool,
    timeout: Duration,
}

impl PgReadingListStore {
    pub fn new(pool: PgPool, timeout: Duration) -> Self {
        Self { pool, timeout }
    }

    async fn fetch_many(
        &self,
        sql: &str,
        user_id: Option<&str>,
    ) -> Result<Vec<ReadingListRecord>, StorageError> {
        let mut query = sqlx::query(sql);
        if let Some(user_id) = user_id {
            query = query.bind(user_id);
        }
        let rows = bounded(self.timeout, query.fetch_all(&self.pool)).await?;
        let mut lists = Vec::with_capacity(rows.len());
        for row in rows {
            lists.push(list_from_row(&row)?);
        }
        Ok(lists)
    }

    /// 执行创建者限定的更新语句：$1 = list_id，$2 = created_by，$3 = 附加参数。
    async fn update_owned(
        &self,
        set_clause: &str,
        list_id: &str,
        user_id: &str,
        value: &str,
    ) -> Result<Option<ReadingListRecord>, StorageError> {
        let sql = format!(
            "update reading_lists set {set_clause} \
             where list_id = $1 and created_by = $2 \
             returning {LIST_COLUMNS}"
        );
        let row = bounded(
            self.timeout,
            sqlx::query(&sql)
                .bind(list_id)
                .bind(user_id)
                .bind(value)
                .fetch_optional(&self.pool),
        )
        .await?;
        let Some(row) = row else {
            return Ok(None);
        };
        Ok(Some(list_from_row(&row)?))
    }
}

fn list_from_row(row: &PgRow) -> Result<ReadingListRecord, StorageError> {
    let status: String = row.try_get("status")?;
    let status = ReadingListStatus::parse(&status)
        .ok_or_else(|| StorageError::new(format!("invalid reading list status: {status}")))?;
    Ok(ReadingListRecord {
        list_id: row.try_get("list_id")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        created_by: row.try_get("created_by")?,
        books: row.try_get("books")?,
        status,
        created_at_ms: row.try_get("created_at_ms")?,
    })
}

#[async_trait::async_trait]
impl ReadingListStore for PgReadingListStore {
    async fn list_reading_lists(&self) -> Result<Vec<ReadingListRecord>, StorageError> {
        let sql = format!("select {LIST_COLUMNS} from reading_lists order by created_at_ms, list_id");
        self.fetch_many(&sql, None).await
    }

    async fn list_reading_lists_by_user(
        &self,
        user_id: &str,
    ) -> Result<Vec<ReadingListRecord>, StorageError> {
        let sql = format!(
            "select {LIST_COLUMNS} from reading_lists where created_by = $1 \
             order by created_at_ms, list_id"
        );
        self.fetch_many(&sql, Some(user_id)).await
    }

    async fn find_reading_list(
        &self,
        list_id: &str,
    ) -> Result<Option<ReadingListRecord>, StorageError> {
        let sql = format!("select {LIST_COLUMNS} from reading_lists where list_id = $1");
        let row = bounded(
            self.timeout,
            sqlx::query(&sql).bind(list_id).fetch_optional(&self.pool),
        )
        .await?;
        let Some(row) = row else {
            return Ok(None);
        };
        Ok(Some(list_from_row(&row)?))
    }

    async fn insert_reading_list(
        &self,
        list: ReadingListRecord,
    ) -> Result<ReadingListRecord, StorageError> {
        let sql = format!(
            "insert into reading_lists ({LIST_COLUMNS}) values ($1, $2, $3, $4, $5, $6, $7) \
             returning {LIST_COLUMNS}"
        );
        let row = bounded(
            self.timeout,
            sqlx::query(&sql)
                .bind(&list.list_id)
                .bind(&list.name)
                .bind(&list.description)
                .bind(&list.created_by)
                .bind(&list.books)
                .bind(list.status.as_str())
                .bind(list.created_at_ms)
                .fetch_one(&self.pool),
        )
        .await?;
        list_from_row(&row)
    }

    async fn update_reading_list(
        &self,
        list_id: &str,
        user_id: &str,
        update: ReadingListUpdate,
    ) -> Result<Option<ReadingListRecord>, StorageError> {
        let sql = format!(
            "update reading_lists set \
             name = coalesce($1, name), \
             description = coalesce($2, description), \
             status = coalesce($3, status) \
             where list_id = $4 and created_by = $5 \
             returning {LIST_COLUMNS}"
        );
        let row = bounded(
            self.timeout,
            sqlx::query(&sql)
                .bind(update.name)
                .bind(update.description)
                .bind(update.status.map(|status| status.as_str()))
                .bind(list_id)
                .bind(user_id)
                .fetch_optional(&self.pool),
        )
        .await?;
        let Some(row) = row else {
            return Ok(None);
        };
        Ok(Some(list_from_row(&row)?))
    }

    async fn delete_reading_list(
        &self,
        list_id: &str,
        user_id: &str,
    ) -> Result<bool, StorageError> {
        let result = bounded(
            self.timeout,
            sqlx::query("delete from reading_lists where list_id = $1 and created_by = $2")
                .bind(list_id)
                .bind(user_id)
                .execute(&self.pool),
        )
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn add_book_to_list(
        &self,
        list_id: &str,
        user_id: &str,
        book_id: &str,
    ) -> Result<Option<ReadingListRecord>, StorageError> {
        self.update_owned(
            "books = case when $3 = any(books) then books else array_append(books, $3) end",
            list_id,
            user_id,
            book_id,
        )
        .await
    }

    async fn remove_book_from_list(
        &self,
        list_id: &str,
        user_id: &str,
        book_id: &str,
    ) -> Result<Option<ReadingListRecord>, StorageError> {
        self.update_owned("books = array_remove(books, $3)", list_id, user_id, book_id)
            .await
    }
}
