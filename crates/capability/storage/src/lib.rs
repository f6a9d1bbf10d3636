//! # Shelf Storage 模块
//!
//! 本模块提供统一的数据存储抽象层，支持 PostgreSQL 与内存两种后端。
//!
//! ## 架构设计
//!
//! 1. **接口抽象层** (`traits.rs`)：定义所有资源存储的异步 Trait 接口
//! 2. **数据模型层** (`models.rs`)：记录、补丁、过滤与分页结构
//! 3. **错误处理层** (`error.rs`)：统一的存储错误类型
//! 4. **连接管理层** (`connection.rs`)：连接池与单次调用时限
//! 5. **实现层**：
//!    - `in_memory/`：内存存储实现（未配置数据库时使用，也用于测试）
//!    - `postgres/`：PostgreSQL 存储实现（生产环境使用）
//!
//! ## 核心约束
//!
//! - **乐观并发**：账户与图书的更新都携带期望 version，不匹配返回
//!   `StorageError::EditConflict`，从不静默覆盖
//! - **token 只存摘要**：`TokenRecord.hash` 为明文的 SHA-256，明文不落库
//! - **作用域隔离**：token 查找同时匹配摘要、作用域与过期时间
//! - **调用时限**：Postgres 实现的每次查询都受 `store_timeout` 约束
//!
//! ## 使用示例
//!
//! ```rust,ignore
//! use shelf_storage::{InMemoryTokenStore, InMemoryUserStore, UserStore};
//! use std::sync::Arc;
//!
//! let users = Arc::new(InMemoryUserStore::new());
//! let tokens = InMemoryTokenStore::new(users.clone());
//! let user = users.find_user_by_email("alice@example.com").await?;
//! ```

pub mod connection;
pub mod error;
pub mod in_memory;
pub mod models;
pub mod postgres;
pub mod traits;

pub use connection::*;
pub use error::*;
pub use models::*;
pub use traits::*;

pub use in_memory::{
    InMemoryBookStore, InMemoryReadingListStore, InMemoryReviewStore, InMemoryTokenStore,
    InMemoryUserStore,
};

pub use postgres::{PgBookStore, PgReadingListStore, PgReviewStore, PgTokenStore, PgUserStore};
