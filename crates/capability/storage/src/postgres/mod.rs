//! # PostgreSQL 存储实现模块
//!
//! 本模块提供所有存储接口的 PostgreSQL 实现，用于生产环境。
//!
//! ## 设计原则
//!
//! 1. **参数化查询**：所有 SQL 查询使用参数绑定，排序字段只来自白名单枚举
//! 2. **调用时限**：每次查询都经 [`crate::connection::bounded`] 包裹，超时返回 `StorageError::Timeout`
//! 3. **乐观并发**：账户和图书更新使用 `where version = $expected`，0 行即冲突
//! 4. **RETURNING**：更新/插入后直接返回最新数据，避免额外查询
//!
//! ## 包含的实现
//!
//! - **UserStore** (`user.rs`)
//! - **TokenStore** (`token.rs`)：与 users 表 join 完成 token → 账户查找
//! - **BookStore** (`book.rs`)：过滤、排序、分页（`count(*) over()` 同时返回总数）
//! - **ReviewStore** (`review.rs`)
//! - **ReadingListStore** (`reading_list.rs`)：图书 ID 存为 `text[]`
//!
//! ## 数据库模式要求
//!
//! 见 `migrations/0001_init.sql`：
//! - `users`：email 为 citext，唯一约束名 `users_email_key`
//! - `tokens`：主键为摘要（bytea），`(user_id, scope)` 索引
//! - `books` / `reviews` / `reading_lists`

pub mod book;
pub mod reading_list;
pub mod review;
pub mod token;
pub mod user;

pub use book::*;
pub use reading_list::*;
pub use review::*;
pub use token::*;
pub use user::*;
