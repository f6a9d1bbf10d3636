//! 内存存储实现模块
//!
//! 未配置数据库时由 API 进程使用，也用于测试。
//!
//! 包含以下实现：
//! - UserStore: InMemoryUserStore
//! - TokenStore: InMemoryTokenStore（与 InMemoryUserStore 共享账户表）
//! - BookStore: InMemoryBookStore
//! - ReviewStore: InMemoryReviewStore
//! - ReadingListStore: InMemoryReadingListStore

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
