//! 领域模型：请求主体（Principal）与 token 作用域。

use std::fmt;
use std::str::FromStr;

/// 已识别账户的请求上下文：认证中间件解析 token 后注入请求扩展。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountContext {
    pub user_id: String,
    pub email: String,
    pub activated: bool,
}

impl AccountContext {
    /// 构造账户上下文。
    pub fn new(user_id: impl Into<String>, email: impl Into<String>, activated: bool) -> Self {
        Self {
            user_id: user_id.into(),
            email: email.into(),
            activated,
        }
    }
}

/// 请求主体：匿名或已识别账户。
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Principal {
    #[default]
    Anonymous,
    Account(AccountContext),
}

impl Principal {
    pub fn is_anonymous(&self) -> bool {
        matches!(self, Principal::Anonymous)
    }

    /// 已识别账户（匿名时返回 None）。
    pub fn account(&self) -> Option<&AccountContext> {
        match self {
            Principal::Anonymous => None,
            Principal::Account(account) => Some(account),
        }
    }
}

/// token 作用域：每个 token 只在签发时的作用域内有效。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenScope {
    Activation,
    Authentication,
    PasswordReset,
}

impl TokenScope {
    /// 持久化使用的作用域字符串。
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenScope::Activation => "activation",
            TokenScope::Authentication => "authentication",
            TokenScope::PasswordReset => "password-reset",
        }
    }
}

impl fmt::Display for TokenScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 未知作用域字符串。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownScope(pub String);

impl fmt::Display for UnknownScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown token scope: {}", self.0)
    }
}

impl std::error::Error for UnknownScope {}

impl FromStr for TokenScope {
    type Err = UnknownScope;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "activation" => Ok(TokenScope::Activation),
            "authentication" => Ok(TokenScope::Authentication),
            "password-reset" => Ok(TokenScope::PasswordReset),
            other => Err(UnknownScope(other.to_string())),
        }
    }
}
