//! 口令哈希（Argon2id）与校验。

use crate::AuthError;
use argon2::password_hash::{self, SaltString};
use argon2::{Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version};
use rand_core::OsRng;

/// Argon2 成本参数；默认取 argon2 推荐值。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordParams {
    pub m_cost: u32,
    pub t_cost: u32,
    pub p_cost: u32,
}

impl Default for PasswordParams {
    fn default() -> Self {
        Self {
            m_cost: Params::DEFAULT_M_COST,
            t_cost: Params::DEFAULT_T_COST,
            p_cost: Params::DEFAULT_P_COST,
        }
    }
}

impl PasswordParams {
    fn hasher(&self) -> Result<Argon2<'static>, AuthError> {
        let params = Params::new(self.m_cost, self.t_cost, self.p_cost, None)
            .map_err(|err| AuthError::Fatal(format!("argon2 params: {err}")))?;
        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }
}

/// 使用随机盐生成 PHC 格式哈希。
pub fn hash_password(params: &PasswordParams, password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = params
        .hasher()?
        .hash_password(password.as_bytes(), &salt)
        .map_err(|err| AuthError::Fatal(err.to_string()))?;
    Ok(hash.to_string())
}

/// 校验口令；不匹配返回 `Ok(false)`，哈希无法解析视为内部错误。
pub fn verify_password(stored_password_hash: &str, password: &str) -> Result<bool, AuthError> {
    let parsed = PasswordHash::new(stored_password_hash)
        .map_err(|err| AuthError::Fatal(format!("stored password hash: {err}")))?;
    // 校验参数取自哈希串本身
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(password_hash::Error::Password) => Ok(false),
        Err(err) => Err(AuthError::Fatal(err.to_string())),
    }
}

/// 在阻塞线程池中哈希口令，不占用异步工作线程。
pub async fn hash_password_blocking(
    params: PasswordParams,
    password: String,
) -> Result<String, AuthError> {
    tokio::task::spawn_blocking(move || hash_password(&params, &password))
        .await
        .map_err(|err| AuthError::Fatal(err.to_string()))?
}

/// 在阻塞线程池中校验口令。
pub async fn verify_password_blocking(
    stored_password_hash: String,
    password: String,
) -> Result<bool, AuthError> {
    tokio::task::spawn_blocking(move || verify_password(&stored_password_hash, &password))
        .await
        .map_err(|err| AuthError::Fatal(err.to_string()))?
}
