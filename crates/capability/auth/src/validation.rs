//! 输入校验：逐字段收集错误信息。

use crate::AuthError;
use crate::token::TOKEN_PLAINTEXT_LEN;
use regex::Regex;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

const MAX_TEXT_BYTES: usize = 500;
const MIN_PASSWORD_BYTES: usize = 8;
/// bcrypt/argon2 常见上限，超出部分没有意义。
const MAX_PASSWORD_BYTES: usize = 72;

static EMAIL_RX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$",
    )
    .expect("email pattern compiles")
});

/// 字段名 → 错误信息；每个字段只保留第一条。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: BTreeMap<String, String>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// 只有一个字段出错时的便捷构造。
    pub fn single(field: &str, message: &str) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: &str, message: &str) {
        self.errors
            .entry(field.to_string())
            .or_insert_with(|| message.to_string());
    }

    /// `ok` 为 false 时记录错误。
    pub fn check(&mut self, ok: bool, field: &str, message: &str) {
        if !ok {
            self.add(field, message);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.errors.get(field).map(String::as_str)
    }

    pub fn fields(&self) -> &BTreeMap<String, String> {
        &self.errors
    }

    pub fn into_fields(self) -> BTreeMap<String, String> {
        self.errors
    }

    /// 无错误返回 Ok，否则转为 `AuthError::Validation`。
    pub fn into_result(self) -> Result<(), AuthError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(AuthError::Validation(self))
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in &self.errors {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {message}")?;
            first = false;
        }
        Ok(())
    }
}

pub fn validate_email(v: &mut ValidationErrors, email: &str) {
    v.check(!email.is_empty(), "email", "must be provided");
    v.check(
        email.len() <= MAX_TEXT_BYTES,
        "email",
        "must not be more than 500 bytes long",
    );
    v.check(EMAIL_RX.is_match(email), "email", "must be a valid email address");
}

pub fn validate_password_plaintext(v: &mut ValidationErrors, password: &str) {
    v.check(!password.is_empty(), "password", "must be provided");
    v.check(
        password.len() >= MIN_PASSWORD_BYTES,
        "password",
        "must be at least 8 bytes long",
    );
    v.check(
        password.len() <= MAX_PASSWORD_BYTES,
        "password",
        "must not be more than 72 bytes long",
    );
}

pub fn validate_token_plaintext(v: &mut ValidationErrors, token: &str) {
    v.check(!token.is_empty(), "token", "must be provided");
    v.check(
        token.len() == TOKEN_PLAINTEXT_LEN,
        "token",
        "must be 22 bytes long",
    );
}

pub fn validate_username(v: &mut ValidationErrors, username: &str) {
    v.check(!username.is_empty(), "username", "must be provided");
    v.check(
        username.len() <= MAX_TEXT_BYTES,
        "username",
        "must not be more than 500 bytes long",
    );
}
