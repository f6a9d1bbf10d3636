//! token 内存存储实现
//!
//! 摘要比较使用常量时间比较，不因前缀相同而提前返回。

use crate::error::StorageError;
use crate::in_memory::InMemoryUserStore;
use crate::models::{TokenRecord, UserRecord};
use crate::traits::TokenStore;
use domain::TokenScope;
use std::sync::{Arc, RwLock};
use subtle::ConstantTimeEq;

/// token 内存存储
///
/// 通过共享的 InMemoryUserStore 完成「token → 账户」关联。
pub struct InMemoryTokenStore {
    tokens: RwLock<Vec<TokenRecord>>,
    users: Arc<InMemoryUserStore>,
}

impl InMemoryTokenStore {
    pub fn new(users: Arc<InMemoryUserStore>) -> Self {
        Self {
            tokens: RwLock::new(Vec::new()),
            users,
        }
    }

    /// 当前持有的 token 数量（含已过期但未删除的）。
    pub fn len(&self) -> usize {
        self.tokens.read().map(|tokens| tokens.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait::async_trait]
impl TokenStore for InMemoryTokenStore {
    async fn insert_token(&self, token: TokenRecord) -> Result<(), StorageError> {
        let mut tokens = self
            .tokens
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        tokens.push(token);
        Ok(())
    }

    async fn find_user_for_token(
        &self,
        hash: &[u8],
        scope: TokenScope,
        now_ms: i64,
    ) -> Result<Option<UserRecord>, StorageError> {
        let user_id = {
            let tokens = self
                .tokens
                .read()
                .map_err(|_| StorageError::new("lock failed"))?;
            tokens
                .iter()
                .find(|token| {
                    bool::from(token.hash.as_slice().ct_eq(hash))
                        && token.scope == scope
                        && token.expires_at_ms > now_ms
                })
                .map(|token| token.user_id.clone())
        };
        match user_id {
            Some(user_id) => self.users.get(&user_id),
            None => Ok(None),
        }
    }

    async fn delete_tokens_for_user(
        &self,
        scope: TokenScope,
        user_id: &str,
    ) -> Result<u64, StorageError> {
        let mut tokens = self
            .tokens
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        let before = tokens.len();
        tokens.retain(|token| !(token.scope == scope && token.user_id == user_id));
        Ok((before - tokens.len()) as u64)
    }
}
