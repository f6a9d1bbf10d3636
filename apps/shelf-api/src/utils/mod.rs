//! 响应构造、DTO 转换与输入校验。

pub mod response;
pub mod validation;

pub use response::*;
pub use validation::*;

use shelf_auth::{Clock, SystemClock};

/// 当前时间（epoch 毫秒），用于目录资源的创建时间。
pub fn now_ms() -> i64 {
    SystemClock.now_ms()
}
