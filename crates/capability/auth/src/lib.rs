//! 账户认证能力：口令哈希、不透明 token 签发/校验与账户生命周期。
//!
//! - [`password`]：Argon2id 哈希与校验（在阻塞线程池执行）
//! - [`token`]：随机 token 明文、SHA-256 摘要
//! - [`validation`]：逐字段输入校验
//! - [`AccountService`]：注册→激活、登录→认证 token、忘记口令→重置

mod account;
mod password;
mod token;
mod validation;

use shelf_storage::StorageError;

pub use account::{
    AccountConfig, AccountService, AuthenticationToken, Clock, RegisterInput,
    ResetRequestOutcome, SystemClock,
};
pub use password::{
    PasswordParams, hash_password, hash_password_blocking, verify_password,
    verify_password_blocking,
};
pub use token::{IssuedToken, TOKEN_PLAINTEXT_LEN, generate_token, hash_token, is_well_formed};
pub use validation::{
    ValidationErrors, validate_email, validate_password_plaintext, validate_token_plaintext,
    validate_username,
};

/// 认证相关错误。
///
/// token 摘要不符、作用域不符、已过期统一为 `TokenNotFound`。
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("token not found")]
    TokenNotFound,
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("validation failed: {0}")]
    Validation(ValidationErrors),
    #[error("edit conflict")]
    EditConflict,
    #[error("storage error: {0}")]
    Storage(String),
    /// 随机源、哈希等内部故障。
    #[error("fatal error: {0}")]
    Fatal(String),
}

impl From<StorageError> for AuthError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::EditConflict => AuthError::EditConflict,
            StorageError::DuplicateEmail => AuthError::Validation(ValidationErrors::single(
                "email",
                "a user with this email address already exists",
            )),
            other => AuthError::Storage(other.to_string()),
        }
    }
}
