//! Handlers 模块

pub mod books;
pub mod health;
pub mod metrics;
pub mod reading_lists;
pub mod reviews;
pub mod tokens;
pub mod users;

pub use books::*;
pub use health::*;
pub use metrics::*;
pub use reading_lists::*;
pub use reviews::*;
pub use tokens::*;
pub use users::*;
