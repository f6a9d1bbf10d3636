//! Postgres 图书存储实现
//!
//! 设计要点：
//! - 过滤参数为空串时不生效（`$1 = '' or title ilike ...`）
//! - 排序列来自 `SortColumn` 白名单，book_id 升序兜底
//! - `count(*) over()` 在同一查询中返回命中总数

use crate::connection::bounded;
use crate::error::StorageError;
use crate::models::{BookFilter, BookRecord, BookUpdate, PageMetadata};
use crate::traits::BookStore;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use std::time::Duration;

const BOOK_COLUMNS: &str =
    "book_id, title, authors, isbn, publication_date, genre, description, created_at_ms, version";

pub struct PgBookStore {
    pub pool: PgPool,
    timeout: Duration,
}

impl PgBookStore {
    pub fn new(pool: PgPool, timeout: Duration) -> Self {
        Self { pool, timeout }
    }
}

fn book_from_row(row: &PgRow) -> Result<BookRecord, sqlx::Error> {
    Ok(BookRecord {
        book_id: row.try_get("book_id")?,
        title: row.try_get("title")?,
        authors: row.try_get("authors")?,
        isbn: row.try_get("isbn")?,
        publication_date: row.try_get("publication_date")?,
        genre: row.try_get("genre")?,
        description: row.try_get("description")?,
        created_at_ms: row.try_get("created_at_ms")?,
        version: row.try_get("version")?,
    })
}

#[async_trait::async_trait]
impl BookStore for PgBookStore {
    async fn list_books(
        &self,
        filter: &BookFilter,
    ) -> Result<(Vec<BookRecord>, PageMetadata), StorageError> {
        let direction = if filter.sort.descending { "desc" } else { "asc" };
        let sql = format!(
            "select count(*) over() as total_records, {BOOK_COLUMNS} \
             from books \
             where ($1 = '' or title ilike '%' || $1 || '%') \
               and ($2 = '' or exists (select 1 from unnest(authors) as author where author ilike '%' || $2 || '%')) \
               and ($3 = '' or genre ilike '%' || $3 || '%') \
             order by {} {direction}, book_id asc \
             limit $4 offset $5",
            filter.sort.column.column()
        );
        let rows = bounded(
            self.timeout,
            sqlx::query(&sql)
                .bind(&filter.title)
                .bind(&filter.author)
                .bind(&filter.genre)
                .bind(filter.page.limit())
                .bind(filter.page.offset())
                .fetch_all(&self.pool),
        )
        .await?;
        let mut total: i64 = 0;
        let mut books = Vec::with_capacity(rows.len());
        for row in rows {
            total = row.try_get("total_records")?;
            books.push(book_from_row(&row)?);
        }
        let total = u64::try_from(total).unwrap_or(0);
        Ok((books, PageMetadata::calculate(total, filter.page)))
    }

    async fn find_book(&self, book_id: &str) -> Result<Option<BookRecord>, StorageError> {
        let sql = format!("select {BOOK_COLUMNS} from books where book_id = $1");
        let row = bounded(
            self.timeout,
            sqlx::query(&sql).bind(book_id).fetch_optional(&self.pool),
        )
        .await?;
        let Some(row) = row else {
            return Ok(None);
        };
        Ok(Some(book_from_row(&row)?))
    }

    async fn insert_book(&self, book: BookRecord) -> Result<BookRecord, StorageError> {
        let sql = format!(
            "insert into books ({BOOK_COLUMNS}) \
             values ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             returning {BOOK_COLUMNS}"
        );
        let row = bounded(
            self.timeout,
            sqlx::query(&sql)
                .bind(&book.book_id)
                .bind(&book.title)
                .bind(&book.authors)
                .bind(&book.isbn)
                .bind(&book.publication_date)
                .bind(&book.genre)
                .bind(&book.description)
                .bind(book.created_at_ms)
                .bind(book.version)
                .fetch_one(&self.pool),
        )
        .await?;
        Ok(book_from_row(&row)?)
    }

    async fn update_book(
        &self,
        book_id: &str,
        expected_version: i64,
        update: BookUpdate,
    ) -> Result<BookRecord, StorageError> {
        let sql = format!(
            "update books set \
             title = coalesce($1, title), \
             authors = coalesce($2, authors), \
             isbn = coalesce($3, isbn), \
             publication_date = coalesce($4, publication_date), \
             genre = coalesce($5, genre), \
             description = coalesce($6, description), \
             version = version + 1 \
             where book_id = $7 and version = $8 \
             returning {BOOK_COLUMNS}"
        );
        let row = bounded(
            self.timeout,
            sqlx::query(&sql)
                .bind(update.title)
                .bind(update.authors)
                .bind(update.isbn)
                .bind(update.publication_date)
                .bind(update.genre)
                .bind(update.description)
                .bind(book_id)
                .bind(expected_version)
                .fetch_optional(&self.pool),
        )
        .await?;
        let Some(row) = row else {
            return Err(StorageError::EditConflict);
        };
        Ok(book_from_row(&row)?)
    }

    async fn delete_book(&self, book_id: &str) -> Result<bool, StorageError> {
        let result = bounded(
            self.timeout,
            sqlx::query("delete from books where book_id = $1")
                .bind(book_id)
                .execute(&self.pool),
        )
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
