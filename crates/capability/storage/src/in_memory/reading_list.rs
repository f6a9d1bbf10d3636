//! 书单内存存储实现

use crate::error::StorageError;
use crate::models::{ReadingListRecord, ReadingListUpdate};
use crate::traits::ReadingListStore;
use std::collections::HashMap;
use std::sync::RwLock;

#[derive(Default)]
pub struct InMemoryReadingListStore {
    lists: RwLock<HashMap<String, ReadingListRecord>>,
}

impl InMemoryReadingListStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn sorted(
        &self,
        predicate: impl Fn(&ReadingListRecord) -> bool,
    ) -> Result<Vec<ReadingListRecord>, StorageError> {
        let mut lists: Vec<ReadingListRecord> = self
            .lists
            .read()
            .map_err(|_| StorageError::new("lock failed"))?
            .values()
            .filter(|list| predicate(list))
            .cloned()
            .collect();
        lists.sort_by(|left, right| {
            left.created_at_ms
                .cmp(&right.created_at_ms)
                .then_with(|| left.list_id.cmp(&right.list_id))
        });
        Ok(lists)
    }

    /// 在写锁内修改创建者自己的书单；非创建者返回 None。
    fn modify_owned(
        &self,
        list_id: &str,
        user_id: &str,
        apply: impl FnOnce(&mut ReadingListRecord),
    ) -> Result<Option<ReadingListRecord>, StorageError> {
        let mut map = self
            .lists
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        match map.get_mut(list_id) {
            Some(list) if list.created_by == user_id => {
                apply(list);
                Ok(Some(list.clone()))
            }
            _ => Ok(None),
        }
    }
}

#[async_trait::async_trait]
impl ReadingListStore for InMemoryReadingListStore {
    async fn list_reading_lists(&self) -> Result<Vec<ReadingListRecord>, StorageError> {
        self.sorted(|_| true)
    }

    async fn list_reading_lists_by_user(
        &self,
        user_id: &str,
    ) -> Result<Vec<ReadingListRecord>, StorageError> {
        self.sorted(|list| list.created_by == user_id)
    }

    async fn find_reading_list(
        &self,
        list_id: &str,
    ) -> Result<Option<ReadingListRecord>, StorageError> {
        let map = self
            .lists
            .read()
            .map_err(|_| StorageError::new("lock failed"))?;
        Ok(map.get(list_id).cloned())
    }

    async fn insert_reading_list(
        &self,
        list: ReadingListRecord,
    ) -> Result<ReadingListRecord, StorageError> {
        let mut map = self
            .lists
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        map.insert(list.list_id.clone(), list.clone());
        Ok(list)
    }

    async fn update_reading_list(
        &self,
        list_id: &str,
        user_id: &str,
        update: ReadingListUpdate,
    ) -> Result<Option<ReadingListRecord>, StorageError> {
        self.modify_owned(list_id, user_id, |list| {
            if let Some(name) = update.name {
                list.name = name;
            }
            if let Some(description) = update.description {
                list.description = description;
            }
            if let Some(status) = update.status {
                list.status = status;
            }
        })
    }

    async fn delete_reading_list(
        &self,
        list_id: &str,
        user_id: &str,
    ) -> Result<bool, StorageError> {
        let mut map = self
            .lists
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        match map.get(list_id) {
            Some(list) if list.created_by == user_id => {
                map.remove(list_id);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn add_book_to_list(
        &self,
        list_id: &str,
        user_id: &str,
        book_id: &str,
    ) -> Result<Option<ReadingListRecord>, StorageError> {
        self.modify_owned(list_id, user_id, |list| {
            if !list.books.iter().any(|existing| existing == book_id) {
                list.books.push(book_id.to_string());
            }
        })
    }

    async fn remove_book_from_list(
        &self,
        list_id: &str,
        user_id: &str,
        book_id: &str,
    ) -> Result<Option<ReadingListRecord>, StorageError> {
        self.modify_owned(list_id, user_id, |list| {
            list.books.retain(|existing| existing != book_id);
        })
    }
}
