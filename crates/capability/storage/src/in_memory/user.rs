//! 账户内存存储实现
//!
//! 功能：
//! - 邮箱唯一（大小写不敏感）
//! - 基于 version 的条件更新

use crate::error::StorageError;
use crate::models::{NewUser, UserRecord, UserUpdate};
use crate::traits::UserStore;
use std::collections::HashMap;
use std::sync::RwLock;

/// 账户内存存储
///
/// 使用 RwLock + HashMap 提供线程安全的内存存储，key 为 user_id。
#[derive(Default)]
pub struct InMemoryUserStore {
    users: RwLock<HashMap<String, UserRecord>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 同步读取账户（供 InMemoryTokenStore 关联查询）。
    pub(crate) fn get(&self, user_id: &str) -> Result<Option<UserRecord>, StorageError> {
        let map = self
            .users
            .read()
            .map_err(|_| StorageError::new("lock failed"))?;
        Ok(map.get(user_id).cloned())
    }
}

#[async_trait::async_trait]
impl UserStore for InMemoryUserStore {
    async fn insert_user(&self, user: NewUser) -> Result<UserRecord, StorageError> {
        let mut map = self
            .users
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        if map
            .values()
            .any(|existing| existing.email.eq_ignore_ascii_case(&user.email))
        {
            return Err(StorageError::DuplicateEmail);
        }
        let record = UserRecord {
            user_id: user.user_id,
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            activated: false,
            version: 1,
            created_at_ms: user.created_at_ms,
        };
        map.insert(record.user_id.clone(), record.clone());
        Ok(record)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, StorageError> {
        let map = self
            .users
            .read()
            .map_err(|_| StorageError::new("lock failed"))?;
        Ok(map
            .values()
            .find(|user| user.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn find_user(&self, user_id: &str) -> Result<Option<UserRecord>, StorageError> {
        self.get(user_id)
    }

    async fn update_user(
        &self,
        user_id: &str,
        expected_version: i64,
        update: UserUpdate,
    ) -> Result<UserRecord, StorageError> {
        let mut map = self
            .users
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        let user = match map.get_mut(user_id) {
            Some(user) if user.version == expected_version => user,
            _ => return Err(StorageError::EditConflict),
        };
        if let Some(activated) = update.activated {
            user.activated = activated;
        }
        if let Some(password_hash) = update.password_hash {
            user.password_hash = password_hash;
        }
        if let Some(username) = update.username {
            user.username = username;
        }
        user.version += 1;
        Ok(user.clone())
    }
}
