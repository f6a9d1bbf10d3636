//! 数据模型
//!
//! 定义所有存储相关的数据模型和更新结构：
//! - 账户模型：UserRecord, NewUser, UserUpdate
//! - token 模型：TokenRecord（仅持久化摘要）
//! - 图书模型：BookRecord, BookUpdate, BookFilter
//! - 书评模型：ReviewRecord, ReviewUpdate
//! - 书单模型：ReadingListRecord, ReadingListUpdate
//! - 分页：Page, PageMetadata

use domain::{AccountContext, TokenScope};

/// 账户记录。
///
/// `version` 从 1 开始，每次成功修改 +1，用于乐观并发校验。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub user_id: String,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub activated: bool,
    pub version: i64,
    pub created_at_ms: i64,
}

impl UserRecord {
    /// 将账户记录转换为请求上下文。
    pub fn to_account_context(&self) -> AccountContext {
        AccountContext::new(self.user_id.clone(), self.email.clone(), self.activated)
    }
}

/// 新建账户输入（口令已哈希）。
#[derive(Debug, Clone)]
pub struct NewUser {
    pub user_id: String,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub created_at_ms: i64,
}

/// 账户补丁：None 表示保持不变。
#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    pub activated: Option<bool>,
    pub password_hash: Option<String>,
    pub username: Option<String>,
}

/// token 记录：只保存明文的 SHA-256 摘要。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenRecord {
    pub hash: Vec<u8>,
    pub user_id: String,
    pub scope: TokenScope,
    pub expires_at_ms: i64,
    pub created_at_ms: i64,
}

/// 图书记录。
#[derive(Debug, Clone, PartialEq)]
pub struct BookRecord {
    pub book_id: String,
    pub title: String,
    pub authors: Vec<String>,
    pub isbn: String,
    pub publication_date: String,
    pub genre: String,
    pub description: String,
    pub created_at_ms: i64,
    pub version: i64,
}

/// 图书补丁。
#[derive(Debug, Clone, Default)]
pub struct BookUpdate {
    pub title: Option<String>,
    pub authors: Option<Vec<String>>,
    pub isbn: Option<String>,
    pub publication_date: Option<String>,
    pub genre: Option<String>,
    pub description: Option<String>,
}

impl BookUpdate {
    /// 将补丁应用到记录（不修改 version）。
    pub fn apply(self, book: &mut BookRecord) {
        if let Some(title) = self.title {
            book.title = title;
        }
        if let Some(authors) = self.authors {
            book.authors = authors;
        }
        if let Some(isbn) = self.isbn {
            book.isbn = isbn;
        }
        if let Some(publication_date) = self.publication_date {
            book.publication_date = publication_date;
        }
        if let Some(genre) = self.genre {
            book.genre = genre;
        }
        if let Some(description) = self.description {
            book.description = description;
        }
    }
}

/// 排序字段（白名单）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortColumn {
    #[default]
    Id,
    Title,
    Genre,
}

impl SortColumn {
    pub fn column(&self) -> &'static str {
        match self {
            SortColumn::Id => "book_id",
            SortColumn::Title => "title",
            SortColumn::Genre => "genre",
        }
    }
}

/// 排序方式：字段 + 方向。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Sort {
    pub column: SortColumn,
    pub descending: bool,
}

impl Sort {
    /// 解析 `id` / `-title` 形式的排序参数；不在白名单内返回 None。
    pub fn parse(value: &str) -> Option<Self> {
        let (descending, name) = match value.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, value),
        };
        let column = match name {
            "id" => SortColumn::Id,
            "title" => SortColumn::Title,
            "genre" => SortColumn::Genre,
            _ => return None,
        };
        Some(Self { column, descending })
    }
}

/// 分页参数（已校验：page >= 1，page_size 1..=100）。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub page: u32,
    pub page_size: u32,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: 10,
        }
    }
}

impl Page {
    pub fn limit(&self) -> i64 {
        i64::from(self.page_size)
    }

    pub fn offset(&self) -> i64 {
        (i64::from(self.page) - 1) * i64::from(self.page_size)
    }
}

/// 分页元数据；无记录时为全默认值。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PageMetadata {
    pub current_page: u32,
    pub page_size: u32,
    pub first_page: u32,
    pub last_page: u32,
    pub total_records: u64,
}

impl PageMetadata {
    pub fn calculate(total_records: u64, page: Page) -> Self {
        if total_records == 0 {
            return Self::default();
        }
        let page_size = u64::from(page.page_size);
        let last_page = total_records.div_ceil(page_size);
        Self {
            current_page: page.page,
            page_size: page.page_size,
            first_page: 1,
            last_page: u32::try_from(last_page).unwrap_or(u32::MAX),
            total_records,
        }
    }
}

/// 图书查询条件：大小写不敏感的子串匹配，空串表示不过滤。
#[derive(Debug, Clone, Default)]
pub struct BookFilter {
    pub title: String,
    pub author: String,
    pub genre: String,
    pub sort: Sort,
    pub page: Page,
}

impl BookFilter {
    /// 内存实现使用的匹配逻辑（与 SQL 的 ILIKE 语义一致）。
    pub fn matches(&self, book: &BookRecord) -> bool {
        contains_ci(&book.title, &self.title)
            && contains_ci(&book.genre, &self.genre)
            && (self.author.is_empty()
                || book
                    .authors
                    .iter()
                    .any(|author| contains_ci(author, &self.author)))
    }
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    needle.is_empty() || haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// 书评记录。
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewRecord {
    pub review_id: String,
    pub book_id: String,
    pub user_id: String,
    pub rating: f64,
    pub review: String,
    pub review_date_ms: i64,
}

/// 书评补丁。
#[derive(Debug, Clone, Default)]
pub struct ReviewUpdate {
    pub rating: Option<f64>,
    pub review: Option<String>,
}

/// 书单状态。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadingListStatus {
    CurrentlyReading,
    Completed,
}

impl ReadingListStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReadingListStatus::CurrentlyReading => "currently reading",
            ReadingListStatus::Completed => "completed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "currently reading" => Some(ReadingListStatus::CurrentlyReading),
            "completed" => Some(ReadingListStatus::Completed),
            _ => None,
        }
    }
}

/// 书单记录。
#[derive(Debug, Clone, PartialEq)]
pub struct ReadingListRecord {
    pub list_id: String,
    pub name: String,
    pub description: String,
    pub created_by: String,
    pub books: Vec<String>,
    pub status: ReadingListStatus,
    pub created_at_ms: i64,
}

/// 书单补丁。
#[derive(Debug, Clone, Default)]
pub struct ReadingListUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<ReadingListStatus>,
}
