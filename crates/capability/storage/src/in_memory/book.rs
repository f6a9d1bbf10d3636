//! 图书内存存储实现

use crate::error::StorageError;
use crate::in_memory::InMemoryReviewStore;
use crate::models::{BookFilter, BookRecord, BookUpdate, PageMetadata, SortColumn};
use crate::traits::BookStore;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// 图书内存存储
///
/// 持有共享的 InMemoryReviewStore，删除图书时一并删除其书评。
pub struct InMemoryBookStore {
    books: RwLock<HashMap<String, BookRecord>>,
    reviews: Arc<InMemoryReviewStore>,
}

impl InMemoryBookStore {
    pub fn new(reviews: Arc<InMemoryReviewStore>) -> Self {
        Self {
            books: RwLock::new(HashMap::new()),
            reviews,
        }
    }
}

fn compare(column: SortColumn, left: &BookRecord, right: &BookRecord) -> Ordering {
    match column {
        SortColumn::Id => left.book_id.cmp(&right.book_id),
        SortColumn::Title => left.title.cmp(&right.title),
        SortColumn::Genre => left.genre.cmp(&right.genre),
    }
}

#[async_trait::async_trait]
impl BookStore for InMemoryBookStore {
    async fn list_books(
        &self,
        filter: &BookFilter,
    ) -> Result<(Vec<BookRecord>, PageMetadata), StorageError> {
        let mut matched: Vec<BookRecord> = {
            let map = self
                .books
                .read()
                .map_err(|_| StorageError::new("lock failed"))?;
            map.values()
                .filter(|book| filter.matches(book))
                .cloned()
                .collect()
        };
        // 主排序字段按方向排序，book_id 升序兜底保证稳定
        matched.sort_by(|left, right| {
            let primary = compare(filter.sort.column, left, right);
            let primary = if filter.sort.descending {
                primary.reverse()
            } else {
                primary
            };
            primary.then_with(|| left.book_id.cmp(&right.book_id))
        });
        let total = matched.len() as u64;
        let offset = usize::try_from(filter.page.offset()).unwrap_or(usize::MAX);
        let books = matched
            .into_iter()
            .skip(offset)
            .take(filter.page.page_size as usize)
            .collect();
        Ok((books, PageMetadata::calculate(total, filter.page)))
    }

    async fn find_book(&self, book_id: &str) -> Result<Option<BookRecord>, StorageError> {
        let map = self
            .books
            .read()
            .map_err(|_| StorageError::new("lock failed"))?;
        Ok(map.get(book_id).cloned())
    }

    async fn insert_book(&self, book: BookRecord) -> Result<BookRecord, StorageError> {
        let mut map = self
            .books
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        if map.contains_key(&book.book_id) {
            return Err(StorageError::new("book exists"));
        }
        map.insert(book.book_id.clone(), book.clone());
        Ok(book)
    }

    async fn update_book(
        &self,
        book_id: &str,
        expected_version: i64,
        update: BookUpdate,
    ) -> Result<BookRecord, StorageError> {
        let mut map = self
            .books
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        let book = match map.get_mut(book_id) {
            Some(book) if book.version == expected_version => book,
            _ => return Err(StorageError::EditConflict),
        };
        update.apply(book);
        book.version += 1;
        Ok(book.clone())
    }

    async fn delete_book(&self, book_id: &str) -> Result<bool, StorageError> {
        let removed = {
            let mut map = self
                .books
                .write()
                .map_err(|_| StorageError::new("lock failed"))?;
            map.remove(book_id).is_some()
        };
        if removed {
            self.reviews.remove_reviews_for_book(book_id)?;
        }
        Ok(removed)
    }
}
