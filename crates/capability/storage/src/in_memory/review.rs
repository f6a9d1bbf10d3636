//! 书评内存存储实现

use crate::error::StorageError;
use crate::models::{ReviewRecord, ReviewUpdate};
use crate::traits::ReviewStore;
use std::collections::HashMap;
use std::sync::RwLock;

#[derive(Default)]
pub struct InMemoryReviewStore {
    reviews: RwLock<HashMap<String, ReviewRecord>>,
}

impl InMemoryReviewStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn collect_newest_first(
        &self,
        predicate: impl Fn(&ReviewRecord) -> bool,
    ) -> Result<Vec<ReviewRecord>, StorageError> {
        let map = self
            .reviews
            .read()
            .map_err(|_| StorageError::new("lock failed"))?;
        let mut reviews: Vec<ReviewRecord> =
            map.values().filter(|review| predicate(review)).cloned().collect();
        reviews.sort_by(|left, right| {
            right
                .review_date_ms
                .cmp(&left.review_date_ms)
                .then_with(|| left.review_id.cmp(&right.review_id))
        });
        Ok(reviews)
    }

    /// 删除某本图书的全部书评（图书删除时调用）。
    pub(crate) fn remove_reviews_for_book(&self, book_id: &str) -> Result<(), StorageError> {
        let mut map = self
            .reviews
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        map.retain(|_, review| review.book_id != book_id);
        Ok(())
    }
}

#[async_trait::async_trait]
impl ReviewStore for InMemoryReviewStore {
    async fn list_reviews_for_book(
        &self,
        book_id: &str,
    ) -> Result<Vec<ReviewRecord>, StorageError> {
        self.collect_newest_first(|review| review.book_id == book_id)
    }

    async fn list_reviews_by_user(
        &self,
        user_id: &str,
    ) -> Result<Vec<ReviewRecord>, StorageError> {
        self.collect_newest_first(|review| review.user_id == user_id)
    }

    async fn find_review(&self, review_id: &str) -> Result<Option<ReviewRecord>, StorageError> {
        let map = self
            .reviews
            .read()
            .map_err(|_| StorageError::new("lock failed"))?;
        Ok(map.get(review_id).cloned())
    }

    async fn insert_review(&self, review: ReviewRecord) -> Result<ReviewRecord, StorageError> {
        let mut map = self
            .reviews
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        map.insert(review.review_id.clone(), review.clone());
        Ok(review)
    }

    async fn update_review(
        &self,
        review_id: &str,
        user_id: &str,
        update: ReviewUpdate,
    ) -> Result<Option<ReviewRecord>, StorageError> {
        let mut map = self
            .reviews
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        let review = match map.get_mut(review_id) {
            Some(review) if review.user_id == user_id => review,
            _ => return Ok(None),
        };
        if let Some(rating) = update.rating {
            review.rating = rating;
        }
        if let Some(text) = update.review {
            review.review = text;
        }
        Ok(Some(review.clone()))
    }

    async fn delete_review(&self, review_id: &str, user_id: &str) -> Result<bool, StorageError> {
        let mut map = self
            .reviews
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        match map.get(review_id) {
            Some(review) if review.user_id == user_id => {
                map.remove(review_id);
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
