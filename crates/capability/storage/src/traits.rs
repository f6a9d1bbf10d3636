//! 存储接口 Trait 定义
//!
//! 定义所有资源存储的异步接口：
//! - UserStore：账户存储（含乐观并发更新）
//! - TokenStore：不透明 token 存储（按摘要 + 作用域 + 过期时间查找）
//! - BookStore：图书存储
//! - ReviewStore：书评存储
//! - ReadingListStore：书单存储
//!
//! 设计原则：
//! - 所有接口返回 StorageError
//! - 使用 async_trait 支持动态分发
//! - 「不存在」用 Option / bool 表达，不作为错误

use crate::error::StorageError;
use crate::models::{
    BookFilter, BookRecord, BookUpdate, NewUser, PageMetadata, ReadingListRecord,
    ReadingListUpdate, ReviewRecord, ReviewUpdate, TokenRecord, UserRecord, UserUpdate,
};
use async_trait::async_trait;
use domain::TokenScope;

/// 账户存储接口
#[async_trait]
pub trait UserStore: Send + Sync {
    /// 新建未激活账户（version = 1）
    ///
    /// 邮箱已存在（大小写不敏感）返回 `StorageError::DuplicateEmail`。
    async fn insert_user(&self, user: NewUser) -> Result<UserRecord, StorageError>;

    /// 根据邮箱查找账户（大小写不敏感）
    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, StorageError>;

    /// 根据账户 ID 查找账户
    async fn find_user(&self, user_id: &str) -> Result<Option<UserRecord>, StorageError>;

    /// 条件更新账户
    ///
    /// 仅当当前 version 等于 `expected_version` 时应用补丁并 version+1；
    /// 否则（含账户已不存在）返回 `StorageError::EditConflict`。
    async fn update_user(
        &self,
        user_id: &str,
        expected_version: i64,
        update: UserUpdate,
    ) -> Result<UserRecord, StorageError>;
}

/// token 存储接口
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// 持久化 token 记录
    async fn insert_token(&self, token: TokenRecord) -> Result<(), StorageError>;

    /// 根据摘要、作用域查找未过期 token 所属账户
    ///
    /// 摘要不符、作用域不符、已过期三种情况一律返回 None。
    async fn find_user_for_token(
        &self,
        hash: &[u8],
        scope: TokenScope,
        now_ms: i64,
    ) -> Result<Option<UserRecord>, StorageError>;

    /// 删除账户在指定作用域下的全部 token，返回删除数量
    async fn delete_tokens_for_user(
        &self,
        scope: TokenScope,
        user_id: &str,
    ) -> Result<u64, StorageError>;
}

/// 图书存储接口
#[async_trait]
pub trait BookStore: Send + Sync {
    /// 按条件分页查询图书
    async fn list_books(
        &self,
        filter: &BookFilter,
    ) -> Result<(Vec<BookRecord>, PageMetadata), StorageError>;

    /// 查找指定图书
    async fn find_book(&self, book_id: &str) -> Result<Option<BookRecord>, StorageError>;

    /// 新建图书
    async fn insert_book(&self, book: BookRecord) -> Result<BookRecord, StorageError>;

    /// 条件更新图书（version 不匹配返回 EditConflict）
    async fn update_book(
        &self,
        book_id: &str,
        expected_version: i64,
        update: BookUpdate,
    ) -> Result<BookRecord, StorageError>;

    /// 删除图书（级联删除书评）
    async fn delete_book(&self, book_id: &str) -> Result<bool, StorageError>;
}

/// 书评存储接口
///
/// 更新与删除都带作者 ID：非作者视为不存在。
#[async_trait]
pub trait ReviewStore: Send + Sync {
    /// 列出图书书评（最新在前）
    async fn list_reviews_for_book(&self, book_id: &str)
    -> Result<Vec<ReviewRecord>, StorageError>;

    /// 列出用户写的书评（最新在前）
    async fn list_reviews_by_user(&self, user_id: &str)
    -> Result<Vec<ReviewRecord>, StorageError>;

    async fn find_review(&self, review_id: &str) -> Result<Option<ReviewRecord>, StorageError>;

    async fn insert_review(&self, review: ReviewRecord) -> Result<ReviewRecord, StorageError>;

    async fn update_review(
        &self,
        review_id: &str,
        user_id: &str,
        update: ReviewUpdate,
    ) -> Result<Option<ReviewRecord>, StorageError>;

    async fn delete_review(&self, review_id: &str, user_id: &str) -> Result<bool, StorageError>;
}

/// 书单存储接口
///
/// 修改类操作都带创建者 ID：非创建者视为不存在。
#[async_trait]
pub trait ReadingListStore: Send + Sync {
    /// 列出全部书单
    async fn list_reading_lists(&self) -> Result<Vec<ReadingListRecord>, StorageError>;

    /// 列出用户创建的书单
    async fn list_reading_lists_by_user(
        &self,
        user_id: &str,
    ) -> Result<Vec<ReadingListRecord>, StorageError>;

    async fn find_reading_list(
        &self,
        list_id: &str,
    ) -> Result<Option<ReadingListRecord>, StorageError>;

    async fn insert_reading_list(
        &self,
        list: ReadingListRecord,
    ) -> Result<ReadingListRecord, StorageError>;

    async fn update_reading_list(
        &self,
        list_id: &str,
        user_id: &str,
        update: ReadingListUpdate,
    ) -> Result<Option<ReadingListRecord>, StorageError>;

    async fn delete_reading_list(&self, list_id: &str, user_id: &str)
    -> Result<bool, StorageError>;

    /// 向书单加入图书（已存在则保持不变）
    async fn add_book_to_list(
        &self,
        list_id: &str,
        user_id: &str,
        book_id: &str,
    ) -> Result<Option<ReadingListRecord>, StorageError>;

    /// 从书单移除图书
    async fn remove_book_from_list(
        &self,
        list_id: &str,
        user_id: &str,
        book_id: &str,
    ) -> Result<Option<ReadingListRecord>, StorageError>;
}
