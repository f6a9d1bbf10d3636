//! 请求上下文与认证中间件。

pub mod auth;

pub use auth::*;
