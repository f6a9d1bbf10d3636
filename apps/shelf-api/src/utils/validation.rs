//! 输入验证辅助函数
//!
//! - read_json：请求体解析失败统一返回 400
//! - normalize / normalize_optional：去除首尾空格
//! - validate_book / validate_review / validate_reading_list：逐字段校验目录资源
//! - book_filter / search_filter：解析图书查询参数（分页、排序白名单）
//!
//! 校验规则按字节长度计算，错误收集到 `ValidationErrors`，由 handler 返回 422。

use crate::utils::response::bad_request_error;
use axum::{Json, extract::rejection::JsonRejection, response::Response};
use serde::Deserialize;
use shelf_auth::ValidationErrors;
use shelf_storage::{BookFilter, BookRecord, Page, ReadingListStatus, Sort};

const MAX_PAGE: i64 = 10_000_000;
const MAX_PAGE_SIZE: i64 = 100;
/// books-search 返回的最大条数。
pub const SEARCH_LIMIT: u32 = 100;

/// 解析 JSON 请求体；语法错误、类型错误、缺少 Content-Type 都返回 400
pub fn read_json<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, Response> {
    match payload {
        Ok(Json(value)) => Ok(value),
        Err(rejection) => Err(bad_request_error(rejection.body_text())),
    }
}

/// 去除首尾空格
pub fn normalize(value: String) -> String {
    let trimmed = value.trim();
    if trimmed.len() == value.len() {
        value
    } else {
        trimmed.to_string()
    }
}

/// 可选字段：提供时去除首尾空格
pub fn normalize_optional(value: Option<String>) -> Option<String> {
    value.map(normalize)
}

/// 校验完整的图书记录（创建时与合并补丁后都调用）
pub fn validate_book(v: &mut ValidationErrors, book: &BookRecord) {
    v.check(!book.title.is_empty(), "title", "must be provided");
    v.check(
        book.title.len() <= 200,
        "title",
        "must not be more than 200 bytes long",
    );
    v.check(
        !book.authors.is_empty(),
        "authors",
        "at least one author must be provided",
    );
    v.check(
        book.authors.iter().all(|author| !author.trim().is_empty()),
        "authors",
        "must not contain empty values",
    );
    v.check(!book.isbn.is_empty(), "isbn", "must be provided");
    v.check(book.isbn.len() <= 13, "isbn", "must not be more than 13 bytes");
    v.check(!book.genre.is_empty(), "genre", "must be provided");
    v.check(book.genre.len() <= 50, "genre", "must not be more than 50 bytes");
    v.check(!book.description.is_empty(), "description", "must be provided");
    v.check(
        book.description.len() <= 500,
        "description",
        "must not be more than 500 bytes",
    );
}

pub fn validate_review(v: &mut ValidationErrors, rating: f64, review: &str) {
    v.check(
        (1.0..=5.0).contains(&rating),
        "rating",
        "must be between 1 and 5",
    );
    v.check(!review.is_empty(), "review", "must not be empty");
}

pub fn validate_reading_list(v: &mut ValidationErrors, name: &str, description: &str) {
    v.check(!name.is_empty(), "name", "must be provided");
    v.check(
        name.len() <= 200,
        "name",
        "must not be more than 200 characters long",
    );
    v.check(!description.is_empty(), "description", "must be provided");
    v.check(
        description.len() <= 500,
        "description",
        "must not be more than 500 characters long",
    );
}

/// 解析书单状态；非法值记录到 `status` 字段
pub fn parse_status(v: &mut ValidationErrors, status: &str) -> Option<ReadingListStatus> {
    let parsed = ReadingListStatus::parse(status);
    v.check(
        parsed.is_some(),
        "status",
        "must be 'currently reading' or 'completed'",
    );
    parsed
}

/// 图书列表查询参数（原样接收字符串，由 book_filter 校验）
#[derive(Debug, Default, Deserialize)]
pub struct BookQuery {
    pub title: Option<String>,
    pub author: Option<String>,
    pub genre: Option<String>,
    pub page: Option<String>,
    pub page_size: Option<String>,
    pub sort: Option<String>,
}

/// 查询参数 → BookFilter；分页越界、排序不在白名单时返回逐字段错误
pub fn book_filter(query: BookQuery) -> Result<BookFilter, ValidationErrors> {
    let mut v = ValidationErrors::new();
    let defaults = Page::default();
    let page = read_int(&mut v, query.page.as_deref(), "page", i64::from(defaults.page));
    let page_size = read_int(
        &mut v,
        query.page_size.as_deref(),
        "page_size",
        i64::from(defaults.page_size),
    );
    v.check(page > 0, "page", "must be greater than zero");
    v.check(page <= MAX_PAGE, "page", "must be a maximum of 10 million");
    v.check(page_size > 0, "page_size", "must be greater than zero");
    v.check(
        page_size <= MAX_PAGE_SIZE,
        "page_size",
        "must be a maximum of 100",
    );
    let sort = match query.sort.as_deref() {
        None | Some("") => Some(Sort::default()),
        Some(value) => Sort::parse(value),
    };
    v.check(sort.is_some(), "sort", "invalid sort value");

    if !v.is_empty() {
        return Err(v);
    }
    Ok(BookFilter {
        title: query.title.unwrap_or_default(),
        author: query.author.unwrap_or_default(),
        genre: query.genre.unwrap_or_default(),
        sort: sort.unwrap_or_default(),
        page: Page {
            page: u32::try_from(page).unwrap_or(1),
            page_size: u32::try_from(page_size).unwrap_or(defaults.page_size),
        },
    })
}

/// books-search：只取过滤条件，固定返回第一页的前 100 条
pub fn search_filter(query: BookQuery) -> BookFilter {
    BookFilter {
        title: query.title.unwrap_or_default(),
        author: query.author.unwrap_or_default(),
        genre: query.genre.unwrap_or_default(),
        sort: Sort::default(),
        page: Page {
            page: 1,
            page_size: SEARCH_LIMIT,
        },
    }
}

fn read_int(v: &mut ValidationErrors, raw: Option<&str>, field: &str, default: i64) -> i64 {
    match raw {
        None | Some("") => default,
        Some(raw) => match raw.parse::<i64>() {
            Ok(value) => value,
            Err(_) => {
                v.add(field, "must be an integer value");
                default
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shelf_storage::SortColumn;

    fn query(page: &str, page_size: &str, sort: &str) -> BookQuery {
        BookQuery {
            page: Some(page.to_string()),
            page_size: Some(page_size.to_string()),
            sort: Some(sort.to_string()),
            ..BookQuery::default()
        }
    }

    #[test]
    fn book_filter_defaults() {
        let filter = book_filter(BookQuery::default()).expect("defaults are valid");
        assert_eq!(filter.page, Page::default());
        assert_eq!(filter.sort, Sort::default());
        assert!(filter.title.is_empty());
    }

    #[test]
    fn book_filter_parses_descending_sort() {
        let filter = book_filter(query("2", "5", "-title")).expect("valid query");
        assert_eq!(filter.page.page, 2);
        assert_eq!(filter.page.page_size, 5);
        assert_eq!(filter.sort.column, SortColumn::Title);
        assert!(filter.sort.descending);
    }

    #[test]
    fn book_filter_rejects_out_of_range_values() {
        let errors = book_filter(query("0", "101", "-isbn")).expect_err("invalid query");
        assert_eq!(errors.get("page"), Some("must be greater than zero"));
        assert_eq!(errors.get("page_size"), Some("must be a maximum of 100"));
        assert_eq!(errors.get("sort"), Some("invalid sort value"));
    }

    #[test]
    fn book_filter_rejects_non_integer_page() {
        let errors = book_filter(query("two", "10", "id")).expect_err("invalid query");
        assert_eq!(errors.get("page"), Some("must be an integer value"));
        assert!(errors.get("page_size").is_none());
    }

    #[test]
    fn review_rating_bounds() {
        let mut v = ValidationErrors::new();
        validate_review(&mut v, 5.5, "");
        assert_eq!(v.get("rating"), Some("must be between 1 and 5"));
        assert_eq!(v.get("review"), Some("must not be empty"));

        let mut v = ValidationErrors::new();
        validate_review(&mut v, 1.0, "fine");
        assert!(v.is_empty());
    }

    #[test]
    fn status_must_be_known() {
        let mut v = ValidationErrors::new();
        assert_eq!(
            parse_status(&mut v, "completed"),
            Some(ReadingListStatus::Completed)
        );
        assert!(parse_status(&mut v, "abandoned").is_none());
        assert!(v.get("status").is_some());
    }
}
