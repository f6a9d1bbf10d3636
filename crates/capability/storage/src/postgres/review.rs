//! Postgres 书评存储实现

use crate::connection::bounded;
use crate::error::StorageError;
use crate::models::{ReviewRecord, ReviewUpdate};
use crate::traits::ReviewStore;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use std::time::Duration;

const REVIEW_COLUMNS: &str = "review_id, book_id, user_id, rating, review, review_date_ms";

pub struct PgReviewStore {
    pub pool: PgPool,
    timeout: Duration,
}

impl PgReviewStore {
    pub fn new(pool: PgPool, timeout: Duration) -> Self {
        Self { pool, timeout }
    }

    async fn list_where(&self, column: &str, value: &str) -> Result<Vec<ReviewRecord>, StorageError> {
        let sql = format!(
            "select {REVIEW_COLUMNS} from reviews where {column} = $1 \
             order by review_date_ms desc, review_id asc"
        );
        let rows = bounded(
            self.timeout,
            sqlx::query(&sql).bind(value).fetch_all(&self.pool),
        )
        .await?;
        let mut reviews = Vec::with_capacity(rows.len());
        for row in rows {
            reviews.push(review_from_row(&row)?);
        }
        Ok(reviews)
    }
}

fn review_from_row(row: &PgRow) -> Result<ReviewRecord, sqlx::Error> {
    Ok(ReviewRecord {
        review_id: row.try_get("review_id")?,
        book_id: row.try_get("book_id")?,
        user_id: row.try_get("user_id")?,
        rating: row.try_get("rating")?,
        review: row.try_get("review")?,
        review_date_ms: row.try_get("review_date_ms")?,
    })
}

#[async_trait::async_trait]
impl ReviewStore for PgReviewStore {
    async fn list_reviews_for_book(
        &self,
        book_id: &str,
    ) -> Result<Vec<ReviewRecord>, StorageError> {
        self.list_where("book_id", book_id).await
    }

    async fn list_reviews_by_user(
        &self,
        user_id: &str,
    ) -> Result<Vec<ReviewRecord>, StorageError> {
        self.list_where("user_id", user_id).await
    }

    async fn find_review(&self, review_id: &str) -> Result<Option<ReviewRecord>, StorageError> {
        let sql = format!("select {REVIEW_COLUMNS} from reviews where review_id = $1");
        let row = bounded(
            self.timeout,
            sqlx::query(&sql).bind(review_id).fetch_optional(&self.pool),
        )
        .await?;
        let Some(row) = row else {
            return Ok(None);
        };
        Ok(Some(review_from_row(&row)?))
    }

    async fn insert_review(&self, review: ReviewRecord) -> Result<ReviewRecord, StorageError> {
        let sql = format!(
            "insert into reviews ({REVIEW_COLUMNS}) values ($1, $2, $3, $4, $5, $6) \
             returning {REVIEW_COLUMNS}"
        );
        let row = bounded(
            self.timeout,
            sqlx::query(&sql)
                .bind(&review.review_id)
                .bind(&review.book_id)
                .bind(&review.user_id)
                .bind(review.rating)
                .bind(&review.review)
                .bind(review.review_date_ms)
                .fetch_one(&self.pool),
        )
        .await?;
        Ok(review_from_row(&row)?)
    }

    async fn update_review(
        &self,
        review_id: &str,
        user_id: &str,
        update: ReviewUpdate,
    ) -> Result<Option<ReviewRecord>, StorageError> {
        let sql = format!(
            "update reviews set \
             rating = coalesce($1, rating), \
             review = coalesce($2, review) \
             where review_id = $3 and user_id = $4 \
             returning {REVIEW_COLUMNS}"
        );
        let row = bounded(
            self.timeout,
            sqlx::query(&sql)
                .bind(update.rating)
                .bind(update.review)
                .bind(review_id)
                .bind(user_id)
                .fetch_optional(&self.pool),
        )
        .await?;
        let Some(row) = row else {
            return Ok(None);
        };
        Ok(Some(review_from_row(&row)?))
    }

    async fn delete_review(&self, review_id: &str, user_id: &str) -> Result<bool, StorageError> {
        let result = bounded(
            self.timeout,
            sqlx::query("delete from reviews where review_id = $1 and user_id = $2")
                .bind(review_id)
                .bind(user_id)
                .execute(&self.pool),
        )
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
